//! # Observability Infrastructure
//!
//! Structured logging and metrics for identity classification and the audit
//! journal.

pub mod logging;
pub mod metrics;

pub use self::logging::{init_logging, log_config_info};
pub use self::metrics::{describe_metrics, record_audit_event, record_classification};

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::debug;

/// Initialize all observability components
pub fn init_observability(config: &ObservabilityConfig) -> Result<()> {
    let installed = init_logging(config)?;
    describe_metrics();

    debug!(
        log_level = %config.log_level,
        json_logs = %config.json_logs,
        subscriber_installed = installed,
        "Observability initialized"
    );

    Ok(())
}
