//! # Structured Logging
//!
//! Subscriber setup and span helpers built on the tracing ecosystem.
//!
//! `RUST_LOG` takes precedence over the configured level. Audit records are
//! emitted under the `aegis::audit` target, so they can be routed or filtered
//! independently, e.g. `RUST_LOG=info,aegis::audit=info`.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, ObservabilityConfig};
use crate::errors::{Error, Result};

/// Create a tracing span around one audited secret operation.
///
/// ```rust,ignore
/// let span = audit_span!("fetch", correlation_id);
/// ```
#[macro_export]
macro_rules! audit_span {
    ($operation:expr, $correlation_id:expr) => {
        tracing::info_span!(
            "secret_operation",
            operation = %$operation,
            correlation_id = %$correlation_id
        )
    };
    ($operation:expr, $correlation_id:expr, $($field:tt)*) => {
        tracing::info_span!(
            "secret_operation",
            operation = %$operation,
            correlation_id = %$correlation_id,
            $($field)*
        )
    };
}

/// Install the global tracing subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed, which is the
/// normal case in tests and when embedded in a larger process.
pub fn init_logging(config: &ObservabilityConfig) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            Error::config(format!("Invalid log level '{}': {}", config.log_level, e))
        })?,
    };

    let installed = if config.json_logs {
        fmt().json().with_env_filter(filter).with_current_span(true).try_init().is_ok()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
    };

    Ok(installed)
}

/// Log configuration at startup
pub fn log_config_info(config: &Config) {
    tracing::info!(
        sentinel_prefix = %config.svid.sentinel_prefix,
        safe_prefix = %config.svid.safe_prefix,
        workload_prefix = %config.svid.workload_prefix,
        safe_endpoint = %config.endpoints.safe_endpoint_url,
        backing_store = %config.safe.backing_store,
        json_logs = %config.observability.json_logs,
        "Aegis configuration loaded"
    );
}
