//! # Configuration Management
//!
//! Configuration is resolved once at startup into an immutable [`Config`] and
//! passed explicitly to the identity classifier and the audited service.
//! Values come from a [`ConfigProvider`]; the process environment is the
//! production provider. Unset or empty values fall back to documented literal
//! defaults.
//!
//! # Prefix Invariant
//!
//! The sentinel and safe SVID prefixes must not overlap: if one is a prefix
//! of the other, a single SVID would hold both the orchestrator and the
//! storage role. [`Config::validate`] rejects that. The workload prefix is
//! allowed to be an umbrella over both (the defaults are built that way).

pub mod settings;

use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;
use validator::Validate;

use crate::errors::{Error, Result};
use crate::identity::{IdentityClassifier, TrustRole};

pub use settings::{EndpointConfig, ObservabilityConfig, ProbeConfig, SafeConfig, SvidConfig};

/// Source of named, string-valued configuration entries.
pub trait ConfigProvider {
    /// Raw value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Value for `key`, or `default` when unset or empty.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).filter(|value| !value.is_empty()).unwrap_or_else(|| default.to_string())
    }

    /// `true` only when the value is `true` in any letter case.
    fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }
}

impl dyn ConfigProvider + '_ {
    /// Parsed value for `key`, or `default` when unset, empty or unparsable.
    pub fn parse_or<T: FromStr>(&self, key: &str, default: T) -> T {
        parse_value(self.get(key), key, default)
    }
}

fn parse_value<T: FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw.filter(|value| !value.is_empty()) {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(key = %key, "Ignoring unparsable configuration value, using default");
            default
        }),
    }
}

/// Reads configuration from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfigProvider;

impl ConfigProvider for EnvConfigProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigProvider for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Immutable configuration snapshot
#[derive(Debug, Clone, Default, Serialize, Validate, PartialEq, Eq)]
pub struct Config {
    #[validate(nested)]
    pub svid: SvidConfig,

    pub endpoints: EndpointConfig,

    pub probes: ProbeConfig,

    #[validate(nested)]
    pub safe: SafeConfig,

    pub observability: ObservabilityConfig,
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&EnvConfigProvider)
    }

    /// Create configuration from any provider and validate it
    pub fn from_provider(provider: &dyn ConfigProvider) -> Result<Self> {
        let config = Self {
            svid: SvidConfig::from_provider(provider),
            endpoints: EndpointConfig::from_provider(provider),
            probes: ProbeConfig::from_provider(provider),
            safe: SafeConfig::from_provider(provider),
            observability: ObservabilityConfig::from_provider(provider),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate field rules and the prefix invariant
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        let classifier = self.classifier();
        for (a, b) in classifier.overlaps() {
            if a == TrustRole::Workload || b == TrustRole::Workload {
                continue;
            }
            return Err(Error::validation_field(
                format!(
                    "SVID prefixes for the {} and {} roles overlap ('{}' / '{}')",
                    a,
                    b,
                    classifier.prefix(a),
                    classifier.prefix(b)
                ),
                "svid",
            ));
        }

        Ok(())
    }

    /// Identity classifier over this configuration's SVID prefixes
    pub fn classifier(&self) -> IdentityClassifier {
        IdentityClassifier::from_config(&self.svid)
    }
}
