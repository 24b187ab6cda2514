//! # Configuration Settings
//!
//! Configuration sections, their environment keys and literal defaults.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use super::ConfigProvider;
use crate::domain::{BackingStore, SecretMeta};

pub const ENV_SENTINEL_SVID_PREFIX: &str = "AEGIS_SENTINEL_SVID_PREFIX";
pub const ENV_SAFE_SVID_PREFIX: &str = "AEGIS_SAFE_SVID_PREFIX";
pub const ENV_WORKLOAD_SVID_PREFIX: &str = "AEGIS_WORKLOAD_SVID_PREFIX";
pub const ENV_SPIFFE_ENDPOINT_SOCKET: &str = "SPIFFE_ENDPOINT_SOCKET";
pub const ENV_SAFE_ENDPOINT_URL: &str = "AEGIS_SAFE_ENDPOINT_URL";
pub const ENV_PROBE_LIVENESS_PORT: &str = "AEGIS_PROBE_LIVENESS_PORT";
pub const ENV_PROBE_READINESS_PORT: &str = "AEGIS_PROBE_READINESS_PORT";
pub const ENV_SAFE_SECRET_BUFFER_SIZE: &str = "AEGIS_SAFE_SECRET_BUFFER_SIZE";
pub const ENV_SAFE_BACKING_STORE: &str = "AEGIS_SAFE_BACKING_STORE";
pub const ENV_SAFE_USE_KUBERNETES_SECRETS: &str = "AEGIS_SAFE_USE_KUBERNETES_SECRETS";
pub const ENV_SAFE_SECRET_BACKUP_COUNT: &str = "AEGIS_SAFE_SECRET_BACKUP_COUNT";
pub const ENV_SAFE_DATA_PATH: &str = "AEGIS_SAFE_DATA_PATH";
pub const ENV_SAFE_AGE_KEY_PATH: &str = "AEGIS_SAFE_AGE_KEY_PATH";
pub const ENV_SAFE_SVID_RETRIEVAL_TIMEOUT: &str = "AEGIS_SAFE_SVID_RETRIEVAL_TIMEOUT";
pub const ENV_SAFE_AGE_KEY_SECRET_NAME: &str = "AEGIS_SAFE_AGE_KEY_SECRET_NAME";
pub const ENV_SAFE_SECRET_NAME_PREFIX: &str = "AEGIS_SAFE_SECRET_NAME_PREFIX";
pub const ENV_LOG_LEVEL: &str = "AEGIS_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "AEGIS_LOG_JSON";

pub const DEFAULT_SENTINEL_SVID_PREFIX: &str =
    "spiffe://aegis.z2h.dev/workload/aegis-sentinel/ns/aegis-system/sa/aegis-sentinel/n/";
pub const DEFAULT_SAFE_SVID_PREFIX: &str =
    "spiffe://aegis.z2h.dev/workload/aegis-safe/ns/aegis-system/sa/aegis-safe/n/";
pub const DEFAULT_WORKLOAD_SVID_PREFIX: &str = "spiffe://aegis.z2h.dev/workload/";
pub const DEFAULT_SPIFFE_ENDPOINT_SOCKET: &str = "unix:///spire-agent-socket/agent.sock";
pub const DEFAULT_SAFE_ENDPOINT_URL: &str =
    "https://aegis-safe.aegis-system.svc.cluster.local:8443/";
pub const DEFAULT_PROBE_LIVENESS_PORT: &str = ":8081";
pub const DEFAULT_PROBE_READINESS_PORT: &str = ":8082";
pub const DEFAULT_SAFE_SECRET_BUFFER_SIZE: usize = 10;
pub const DEFAULT_SAFE_SECRET_BACKUP_COUNT: u32 = 3;
pub const DEFAULT_SAFE_DATA_PATH: &str = "/data";
pub const DEFAULT_SAFE_AGE_KEY_PATH: &str = "/key/key.txt";
pub const DEFAULT_SAFE_SVID_RETRIEVAL_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SAFE_AGE_KEY_SECRET_NAME: &str = "aegis-safe-age-key";
pub const DEFAULT_SAFE_SECRET_NAME_PREFIX: &str = "aegis-secret-";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// SVID prefixes that identify each trust role
#[derive(Debug, Clone, Serialize, Validate, PartialEq, Eq)]
pub struct SvidConfig {
    /// Prefix of Aegis Sentinel (orchestrator) SVIDs
    #[validate(length(min = 1, message = "Sentinel SVID prefix cannot be empty"))]
    pub sentinel_prefix: String,

    /// Prefix of Aegis Safe (storage) SVIDs
    #[validate(length(min = 1, message = "Safe SVID prefix cannot be empty"))]
    pub safe_prefix: String,

    /// Prefix shared by all workload SVIDs
    #[validate(length(min = 1, message = "Workload SVID prefix cannot be empty"))]
    pub workload_prefix: String,
}

impl Default for SvidConfig {
    fn default() -> Self {
        Self {
            sentinel_prefix: DEFAULT_SENTINEL_SVID_PREFIX.to_string(),
            safe_prefix: DEFAULT_SAFE_SVID_PREFIX.to_string(),
            workload_prefix: DEFAULT_WORKLOAD_SVID_PREFIX.to_string(),
        }
    }
}

impl SvidConfig {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        Self {
            sentinel_prefix: provider
                .get_or(ENV_SENTINEL_SVID_PREFIX, DEFAULT_SENTINEL_SVID_PREFIX),
            safe_prefix: provider.get_or(ENV_SAFE_SVID_PREFIX, DEFAULT_SAFE_SVID_PREFIX),
            workload_prefix: provider
                .get_or(ENV_WORKLOAD_SVID_PREFIX, DEFAULT_WORKLOAD_SVID_PREFIX),
        }
    }
}

/// Addresses of the SPIRE agent and the safe
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EndpointConfig {
    /// SPIFFE Workload API socket
    pub spiffe_socket_url: String,

    /// Base URL of Aegis Safe
    pub safe_endpoint_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            spiffe_socket_url: DEFAULT_SPIFFE_ENDPOINT_SOCKET.to_string(),
            safe_endpoint_url: DEFAULT_SAFE_ENDPOINT_URL.to_string(),
        }
    }
}

impl EndpointConfig {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        Self {
            spiffe_socket_url: provider
                .get_or(ENV_SPIFFE_ENDPOINT_SOCKET, DEFAULT_SPIFFE_ENDPOINT_SOCKET),
            safe_endpoint_url: provider.get_or(ENV_SAFE_ENDPOINT_URL, DEFAULT_SAFE_ENDPOINT_URL),
        }
    }
}

/// Listen addresses of the liveness and readiness probes
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProbeConfig {
    pub liveness_port: String,
    pub readiness_port: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            liveness_port: DEFAULT_PROBE_LIVENESS_PORT.to_string(),
            readiness_port: DEFAULT_PROBE_READINESS_PORT.to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        Self {
            liveness_port: provider.get_or(ENV_PROBE_LIVENESS_PORT, DEFAULT_PROBE_LIVENESS_PORT),
            readiness_port: provider.get_or(ENV_PROBE_READINESS_PORT, DEFAULT_PROBE_READINESS_PORT),
        }
    }
}

/// Aegis Safe storage settings
#[derive(Debug, Clone, Serialize, Validate, PartialEq, Eq)]
pub struct SafeConfig {
    /// Capacity of the safe's secret write queue
    #[validate(range(min = 1, message = "Secret buffer size must be at least 1"))]
    pub secret_buffer_size: usize,

    /// Store used when an upsert does not pick one
    pub backing_store: BackingStore,

    /// Mirror secrets into plain Kubernetes `Secret` objects (legacy consumers)
    pub use_kubernetes_secrets: bool,

    /// Number of backups kept per secret
    pub secret_backup_count: u32,

    pub data_path: PathBuf,

    pub age_key_path: PathBuf,

    /// How long the safe waits for its own SVID before giving up
    #[validate(range(min = 1, message = "SVID retrieval timeout must be at least 1ms"))]
    pub svid_retrieval_timeout_ms: u64,

    pub age_key_secret_name: String,

    /// Name prefix of Kubernetes `Secret` objects created by the safe
    pub secret_name_prefix: String,
}

impl Default for SafeConfig {
    fn default() -> Self {
        Self {
            secret_buffer_size: DEFAULT_SAFE_SECRET_BUFFER_SIZE,
            backing_store: BackingStore::File,
            use_kubernetes_secrets: false,
            secret_backup_count: DEFAULT_SAFE_SECRET_BACKUP_COUNT,
            data_path: PathBuf::from(DEFAULT_SAFE_DATA_PATH),
            age_key_path: PathBuf::from(DEFAULT_SAFE_AGE_KEY_PATH),
            svid_retrieval_timeout_ms: DEFAULT_SAFE_SVID_RETRIEVAL_TIMEOUT_MS,
            age_key_secret_name: DEFAULT_SAFE_AGE_KEY_SECRET_NAME.to_string(),
            secret_name_prefix: DEFAULT_SAFE_SECRET_NAME_PREFIX.to_string(),
        }
    }
}

impl SafeConfig {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        Self {
            secret_buffer_size: provider
                .parse_or(ENV_SAFE_SECRET_BUFFER_SIZE, DEFAULT_SAFE_SECRET_BUFFER_SIZE),
            backing_store: provider
                .get(ENV_SAFE_BACKING_STORE)
                .map(|value| BackingStore::from_config_value(&value))
                .unwrap_or_default(),
            use_kubernetes_secrets: provider.flag(ENV_SAFE_USE_KUBERNETES_SECRETS),
            secret_backup_count: provider
                .parse_or(ENV_SAFE_SECRET_BACKUP_COUNT, DEFAULT_SAFE_SECRET_BACKUP_COUNT),
            data_path: PathBuf::from(provider.get_or(ENV_SAFE_DATA_PATH, DEFAULT_SAFE_DATA_PATH)),
            age_key_path: PathBuf::from(
                provider.get_or(ENV_SAFE_AGE_KEY_PATH, DEFAULT_SAFE_AGE_KEY_PATH),
            ),
            svid_retrieval_timeout_ms: provider
                .parse_or(ENV_SAFE_SVID_RETRIEVAL_TIMEOUT, DEFAULT_SAFE_SVID_RETRIEVAL_TIMEOUT_MS),
            age_key_secret_name: provider
                .get_or(ENV_SAFE_AGE_KEY_SECRET_NAME, DEFAULT_SAFE_AGE_KEY_SECRET_NAME),
            secret_name_prefix: provider
                .get_or(ENV_SAFE_SECRET_NAME_PREFIX, DEFAULT_SAFE_SECRET_NAME_PREFIX),
        }
    }

    pub fn svid_retrieval_timeout(&self) -> Duration {
        Duration::from_millis(self.svid_retrieval_timeout_ms)
    }

    /// Metadata applied to an upsert that leaves placement unspecified.
    pub fn default_secret_meta(&self) -> SecretMeta {
        SecretMeta {
            use_kubernetes_secret: self.use_kubernetes_secrets,
            backing_store: self.backing_store,
            ..Default::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: DEFAULT_LOG_LEVEL.to_string(), json_logs: false }
    }
}

impl ObservabilityConfig {
    pub fn from_provider(provider: &dyn ConfigProvider) -> Self {
        Self {
            log_level: provider.get_or(ENV_LOG_LEVEL, DEFAULT_LOG_LEVEL),
            json_logs: provider.flag(ENV_LOG_JSON),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn provider(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_svid_defaults_when_unset() {
        let config = SvidConfig::from_provider(&provider(&[]));
        assert_eq!(config, SvidConfig::default());
        assert_eq!(config.workload_prefix, "spiffe://aegis.z2h.dev/workload/");
    }

    #[test]
    fn test_svid_empty_values_fall_back() {
        let config = SvidConfig::from_provider(&provider(&[
            (ENV_SENTINEL_SVID_PREFIX, ""),
            (ENV_SAFE_SVID_PREFIX, ""),
            (ENV_WORKLOAD_SVID_PREFIX, ""),
        ]));
        assert_eq!(config, SvidConfig::default());
    }

    #[test]
    fn test_svid_overrides() {
        let config = SvidConfig::from_provider(&provider(&[(
            ENV_WORKLOAD_SVID_PREFIX,
            "spiffe://example.org/apps/",
        )]));
        assert_eq!(config.workload_prefix, "spiffe://example.org/apps/");
        assert_eq!(config.sentinel_prefix, DEFAULT_SENTINEL_SVID_PREFIX);
    }

    #[test]
    fn test_safe_numeric_values_fall_back_on_garbage() {
        let config = SafeConfig::from_provider(&provider(&[
            (ENV_SAFE_SECRET_BUFFER_SIZE, "lots"),
            (ENV_SAFE_SECRET_BACKUP_COUNT, "-1"),
            (ENV_SAFE_SVID_RETRIEVAL_TIMEOUT, "soon"),
        ]));
        assert_eq!(config.secret_buffer_size, 10);
        assert_eq!(config.secret_backup_count, 3);
        assert_eq!(config.svid_retrieval_timeout(), Duration::from_millis(30_000));
    }

    #[test]
    fn test_safe_overrides() {
        let config = SafeConfig::from_provider(&provider(&[
            (ENV_SAFE_SECRET_BUFFER_SIZE, "64"),
            (ENV_SAFE_BACKING_STORE, "memory"),
            (ENV_SAFE_USE_KUBERNETES_SECRETS, "TRUE"),
            (ENV_SAFE_SVID_RETRIEVAL_TIMEOUT, "1500"),
            (ENV_SAFE_DATA_PATH, "/var/lib/aegis"),
        ]));
        assert_eq!(config.secret_buffer_size, 64);
        assert_eq!(config.backing_store, BackingStore::Memory);
        assert!(config.use_kubernetes_secrets);
        assert_eq!(config.svid_retrieval_timeout(), Duration::from_millis(1500));
        assert_eq!(config.data_path, PathBuf::from("/var/lib/aegis"));
    }

    #[test]
    fn test_backing_store_and_flag_leniency() {
        let config = SafeConfig::from_provider(&provider(&[
            (ENV_SAFE_BACKING_STORE, "persistent"),
            (ENV_SAFE_USE_KUBERNETES_SECRETS, "yes"),
        ]));
        assert_eq!(config.backing_store, BackingStore::File);
        assert!(!config.use_kubernetes_secrets);
    }

    #[test]
    fn test_default_secret_meta_follows_safe_settings() {
        let config = SafeConfig {
            backing_store: BackingStore::Cluster,
            use_kubernetes_secrets: true,
            ..Default::default()
        };
        let meta = config.default_secret_meta();
        assert_eq!(meta.backing_store, BackingStore::Cluster);
        assert!(meta.use_kubernetes_secret);
        assert_eq!(meta.namespace, "aegis-system");
    }

    #[test]
    fn test_endpoint_and_probe_defaults() {
        let endpoints = EndpointConfig::from_provider(&provider(&[]));
        assert_eq!(endpoints.spiffe_socket_url, "unix:///spire-agent-socket/agent.sock");
        assert_eq!(
            endpoints.safe_endpoint_url,
            "https://aegis-safe.aegis-system.svc.cluster.local:8443/"
        );

        let probes = ProbeConfig::from_provider(&provider(&[(ENV_PROBE_LIVENESS_PORT, ":9000")]));
        assert_eq!(probes.liveness_port, ":9000");
        assert_eq!(probes.readiness_port, ":8082");
    }

    #[test]
    fn test_observability_config() {
        let config = ObservabilityConfig::from_provider(&provider(&[
            (ENV_LOG_LEVEL, "debug"),
            (ENV_LOG_JSON, "true"),
        ]));
        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
        assert_eq!(ObservabilityConfig::default().log_level, "info");
    }
}
