//! Common test utilities for all integration tests.
//!
//! Provides SVID fixtures, an in-memory audit buffer and handler doubles.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use aegis_core::audit::JsonLinesSink;
use aegis_core::domain::{Secret, SecretMeta, SecretStored};
use aegis_core::secrets::{SecretHandler, SecretString, SecretsError};
use async_trait::async_trait;
use std::io::Write;
use std::sync::{Arc, Mutex};

pub const SENTINEL_SVID: &str =
    "spiffe://aegis.z2h.dev/workload/aegis-sentinel/ns/aegis-system/sa/aegis-sentinel/n/node-1";
pub const SAFE_SVID: &str =
    "spiffe://aegis.z2h.dev/workload/aegis-safe/ns/aegis-system/sa/aegis-safe/n/node-1";
pub const BILLING_SVID: &str =
    "spiffe://aegis.z2h.dev/workload/billing/ns/default/sa/billing/n/node-1";
pub const FOREIGN_SVID: &str = "spiffe://example.org/workload/billing/ns/default/sa/billing/n/x";

/// Cloneable writer over a shared byte buffer.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Every line parsed as a JSON object.
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.lines().iter().map(|line| serde_json::from_str(line).unwrap()).collect()
    }

    pub fn sink(&self) -> JsonLinesSink<SharedBuffer> {
        JsonLinesSink::new(self.clone())
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Handler that fails every call with the same error.
pub struct FailingHandler(pub SecretsError);

#[async_trait]
impl SecretHandler for FailingHandler {
    async fn fetch(&self, _workload_id: &str) -> aegis_core::secrets::Result<SecretStored> {
        Err(self.0.clone())
    }

    async fn upsert(
        &self,
        _workload_id: &str,
        _value: SecretString,
        _meta: SecretMeta,
    ) -> aegis_core::secrets::Result<()> {
        Err(self.0.clone())
    }

    async fn list(&self) -> aegis_core::secrets::Result<Vec<Secret>> {
        Err(self.0.clone())
    }
}

/// Handler that records the metadata of every upsert it receives.
#[derive(Default)]
pub struct RecordingHandler {
    pub upserts: Mutex<Vec<(String, String, SecretMeta)>>,
}

#[async_trait]
impl SecretHandler for RecordingHandler {
    async fn fetch(&self, workload_id: &str) -> aegis_core::secrets::Result<SecretStored> {
        Err(SecretsError::not_found(workload_id))
    }

    async fn upsert(
        &self,
        workload_id: &str,
        value: SecretString,
        meta: SecretMeta,
    ) -> aegis_core::secrets::Result<()> {
        self.upserts.lock().unwrap().push((
            workload_id.to_string(),
            value.expose_secret().to_string(),
            meta,
        ));
        Ok(())
    }

    async fn list(&self) -> aegis_core::secrets::Result<Vec<Secret>> {
        Ok(Vec::new())
    }
}
