//! Storage seam behind the audited secret service.

use async_trait::async_trait;

use super::error::Result;
use super::types::SecretString;
use crate::domain::{Secret, SecretMeta, SecretStored};

/// Role-specific secret storage, implemented by the safe.
///
/// Implementations MUST NOT log secret values. Errors are reported back to
/// callers through the response `err` field, so their messages must not
/// carry values either.
#[async_trait]
pub trait SecretHandler: Send + Sync {
    /// The secret registered for a workload.
    async fn fetch(&self, workload_id: &str) -> Result<SecretStored>;

    /// Create or replace a workload's secret.
    async fn upsert(&self, workload_id: &str, value: SecretString, meta: SecretMeta) -> Result<()>;

    /// Summaries of every stored secret, in storage order.
    async fn list(&self) -> Result<Vec<Secret>>;
}
