//! Secret domain types shared by the sentinel, safe and sidecar roles
//!
//! ## Types
//!
//! - **BackingStore**: where the safe persists a secret (memory, file, cluster)
//! - **SecretFormat**: how the plaintext is reshaped at delivery time
//! - **SecretMeta**: per-write placement and delivery metadata
//! - **Secret**: the summary returned by list operations
//! - **SecretStored**: a stored secret as the safe hands it back

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::time::JsonTime;
use crate::secrets::SecretString;

/// Namespace used when an upsert does not name one.
pub const DEFAULT_NAMESPACE: &str = "aegis-system";

/// Persistence medium selected for a secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackingStore {
    /// Kept in process memory only
    Memory,
    /// Local persistent store
    #[default]
    File,
    /// Clustered store
    Cluster,
}

impl BackingStore {
    /// Get the wire representation of this backing store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Cluster => "cluster",
        }
    }

    /// Lenient parse used for configuration values: anything that is not
    /// `memory` or `cluster` selects the file store.
    pub fn from_config_value(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for BackingStore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "cluster" => Ok(Self::Cluster),
            _ => Err(format!("Unknown backing store: {}", s)),
        }
    }
}

impl fmt::Display for BackingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload format of a secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretFormat {
    Json,
    Yaml,
    /// Delivered as stored
    #[default]
    None,
}

impl SecretFormat {
    /// Get the wire representation of this format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::None => "none",
        }
    }
}

impl FromStr for SecretFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            "none" => Ok(Self::None),
            _ => Err(format!("Unknown secret format: {}", s)),
        }
    }
}

impl fmt::Display for SecretFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// Placement and delivery metadata attached to a secret at write time.
///
/// Built from an upsert request and never mutated afterwards; the safe
/// consumes it once when applying the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMeta {
    /// Also create a plain Kubernetes `Secret` for legacy consumers
    #[serde(rename = "k8s", default)]
    pub use_kubernetes_secret: bool,

    /// Overrides the safe's configured backing store
    #[serde(rename = "storage", default)]
    pub backing_store: BackingStore,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Template applied to the plaintext on delivery, e.g.
    /// `{"USER":"{{.username}}", "PASS":"{{.password}}"}`
    #[serde(default)]
    pub template: String,

    #[serde(rename = "Format", default)]
    pub format: SecretFormat,

    /// The value was encrypted with the safe's public key before upload
    #[serde(rename = "Encrypted", default)]
    pub encrypted: bool,
}

impl Default for SecretMeta {
    fn default() -> Self {
        Self {
            use_kubernetes_secret: false,
            backing_store: BackingStore::default(),
            namespace: default_namespace(),
            template: String::new(),
            format: SecretFormat::default(),
            encrypted: false,
        }
    }
}

/// Secret summary as listed by the safe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub created: JsonTime,
    pub updated: JsonTime,
}

/// A secret as held by the storage role.
///
/// Deliberately not `Serialize`: the value only leaves through the fetch
/// response contract.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretStored {
    pub name: String,
    pub value: SecretString,
    pub meta: SecretMeta,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl SecretStored {
    /// Create a freshly written secret.
    pub fn new(name: impl Into<String>, value: SecretString, meta: SecretMeta) -> Self {
        let now = Utc::now();
        Self { name: name.into(), value, meta, created: now, updated: now }
    }

    /// The listable summary of this secret.
    pub fn summary(&self) -> Secret {
        Secret {
            name: self.name.clone(),
            created: self.created.into(),
            updated: self.updated.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_store_roundtrip_strings() {
        for store in [BackingStore::Memory, BackingStore::File, BackingStore::Cluster] {
            assert_eq!(store.as_str().parse::<BackingStore>().unwrap(), store);
        }
        assert!("disk".parse::<BackingStore>().is_err());
    }

    #[test]
    fn test_backing_store_config_value_is_lenient() {
        assert_eq!(BackingStore::from_config_value("memory"), BackingStore::Memory);
        assert_eq!(BackingStore::from_config_value("cluster"), BackingStore::Cluster);
        assert_eq!(BackingStore::from_config_value("persistent"), BackingStore::File);
        assert_eq!(BackingStore::from_config_value(""), BackingStore::File);
    }

    #[test]
    fn test_secret_format_wire_names() {
        assert_eq!(serde_json::to_string(&SecretFormat::Yaml).unwrap(), "\"yaml\"");
        assert_eq!(SecretFormat::default(), SecretFormat::None);
        assert_eq!("none".parse::<SecretFormat>().unwrap(), SecretFormat::None);
    }

    #[test]
    fn test_secret_meta_json_tags() {
        let meta = SecretMeta {
            use_kubernetes_secret: true,
            backing_store: BackingStore::Cluster,
            template: "{{.password}}".to_string(),
            format: SecretFormat::Json,
            encrypted: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["k8s"], true);
        assert_eq!(json["storage"], "cluster");
        assert_eq!(json["namespace"], DEFAULT_NAMESPACE);
        assert_eq!(json["template"], "{{.password}}");
        assert_eq!(json["Format"], "json");
        assert_eq!(json["Encrypted"], true);
    }

    #[test]
    fn test_secret_meta_defaults_when_absent() {
        let meta: SecretMeta = serde_json::from_str("{}").unwrap();
        assert_eq!(meta, SecretMeta::default());
        assert_eq!(meta.namespace, "aegis-system");
    }

    #[test]
    fn test_stored_secret_summary_hides_value() {
        let stored =
            SecretStored::new("billing", SecretString::new("hunter2"), SecretMeta::default());
        let summary = stored.summary();
        assert_eq!(summary.name, "billing");
        assert_eq!(summary.created, summary.updated);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!format!("{:?}", stored).contains("hunter2"));
    }
}
