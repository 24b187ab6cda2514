//! Version 1 wire shapes.
//!
//! Field names are part of the protocol spoken by existing sidecars and SDKs
//! and must not change.

use serde::{Deserialize, Serialize};

use super::{empty_as_none, null_as_default, Contract, Outcome};
use crate::domain::{
    BackingStore, JsonTime, Secret, SecretFormat, SecretMeta, SecretStored, DEFAULT_NAMESPACE,
};
use crate::secrets::types::exposed;
use crate::secrets::SecretString;

macro_rules! impl_outcome {
    ($($shape:ty),+ $(,)?) => {
        $(
            impl Outcome for $shape {
                fn err(&self) -> &str {
                    &self.err
                }
            }
        )+
    };
}

/// Orchestrator request to create or replace a workload's secret
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretUpsertRequest {
    #[serde(rename = "key")]
    pub workload_id: String,

    #[serde(rename = "backingStore", default, with = "empty_as_none")]
    pub backing_store: Option<BackingStore>,

    #[serde(rename = "useKubernetes", default, deserialize_with = "null_as_default")]
    pub use_kubernetes: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub namespace: String,

    #[serde(serialize_with = "exposed::serialize")]
    pub value: SecretString,

    #[serde(default, deserialize_with = "null_as_default")]
    pub template: String,

    #[serde(default, with = "empty_as_none")]
    pub format: Option<SecretFormat>,

    /// The value is already encrypted with the safe's public key
    #[serde(rename = "bool", alias = "encrypt", default)]
    pub encrypt: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub err: String,
}

impl SecretUpsertRequest {
    pub fn new(workload_id: impl Into<String>, value: impl Into<SecretString>) -> Self {
        Self { workload_id: workload_id.into(), value: value.into(), ..Default::default() }
    }

    /// Metadata for this write. Unset fields fall back to `defaults`; the
    /// Kubernetes mirror is enabled if either side asks for it.
    pub fn meta(&self, defaults: &SecretMeta) -> SecretMeta {
        let namespace = if !self.namespace.is_empty() {
            self.namespace.clone()
        } else if !defaults.namespace.is_empty() {
            defaults.namespace.clone()
        } else {
            DEFAULT_NAMESPACE.to_string()
        };

        SecretMeta {
            use_kubernetes_secret: self.use_kubernetes || defaults.use_kubernetes_secret,
            backing_store: self.backing_store.unwrap_or(defaults.backing_store),
            namespace,
            template: if self.template.is_empty() {
                defaults.template.clone()
            } else {
                self.template.clone()
            },
            format: self.format.unwrap_or(defaults.format),
            encrypted: self.encrypt,
        }
    }
}

impl Contract for SecretUpsertRequest {
    const KIND: &'static str = "SecretUpsertRequest";
    const FIELDS: &'static [&'static str] = &[
        "key",
        "backingStore",
        "useKubernetes",
        "namespace",
        "value",
        "template",
        "format",
        "bool",
        "encrypt",
        "err",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretUpsertResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub err: String,
}

impl SecretUpsertResponse {
    pub fn failure(err: impl Into<String>) -> Self {
        Self { err: err.into() }
    }
}

impl Contract for SecretUpsertResponse {
    const KIND: &'static str = "SecretUpsertResponse";
    const FIELDS: &'static [&'static str] = &["err"];
}

/// Workload request for its own secret; the workload is named by its SVID
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretFetchRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub err: String,
}

impl Contract for SecretFetchRequest {
    const KIND: &'static str = "SecretFetchRequest";
    const FIELDS: &'static [&'static str] = &["err"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretFetchResponse {
    #[serde(default, serialize_with = "exposed::serialize")]
    pub data: SecretString,

    #[serde(default)]
    pub created: JsonTime,

    #[serde(default)]
    pub updated: JsonTime,

    #[serde(default, deserialize_with = "null_as_default")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub err: String,
}

impl SecretFetchResponse {
    pub fn failure(err: impl Into<String>) -> Self {
        Self { err: err.into(), ..Default::default() }
    }
}

impl From<&SecretStored> for SecretFetchResponse {
    fn from(stored: &SecretStored) -> Self {
        Self {
            data: stored.value.clone(),
            created: stored.created.into(),
            updated: stored.updated.into(),
            err: String::new(),
        }
    }
}

impl Contract for SecretFetchResponse {
    const KIND: &'static str = "SecretFetchResponse";
    const FIELDS: &'static [&'static str] = &["data", "created", "updated", "err"];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretListRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub err: String,
}

impl Contract for SecretListRequest {
    const KIND: &'static str = "SecretListRequest";
    const FIELDS: &'static [&'static str] = &["err"];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub secrets: Vec<Secret>,

    #[serde(default, deserialize_with = "null_as_default")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub err: String,
}

impl SecretListResponse {
    pub fn new(secrets: Vec<Secret>) -> Self {
        Self { secrets, err: String::new() }
    }

    pub fn failure(err: impl Into<String>) -> Self {
        Self { err: err.into(), ..Default::default() }
    }
}

impl Contract for SecretListResponse {
    const KIND: &'static str = "SecretListResponse";
    const FIELDS: &'static [&'static str] = &["secrets", "err"];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub err: String,
}

impl Contract for GenericRequest {
    const KIND: &'static str = "GenericRequest";
    const FIELDS: &'static [&'static str] = &["err"];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub err: String,
}

impl GenericResponse {
    pub fn failure(err: impl Into<String>) -> Self {
        Self { err: err.into() }
    }
}

impl Contract for GenericResponse {
    const KIND: &'static str = "GenericResponse";
    const FIELDS: &'static [&'static str] = &["err"];
}

impl_outcome!(
    SecretUpsertRequest,
    SecretUpsertResponse,
    SecretFetchRequest,
    SecretFetchResponse,
    SecretListRequest,
    SecretListResponse,
    GenericRequest,
    GenericResponse,
);
