//! In-process secret handler for the `memory` backing store.
//!
//! Nothing is persisted; contents are lost when the handler is dropped.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;

use super::error::{Result, SecretsError};
use super::handler::SecretHandler;
use super::types::SecretString;
use crate::domain::{Secret, SecretMeta, SecretStored};

/// Keeps secrets in insertion order behind a lock.
#[derive(Debug, Default)]
pub struct MemorySecretHandler {
    secrets: RwLock<Vec<SecretStored>>,
}

impl MemorySecretHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.secrets.read().map(|secrets| secrets.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> SecretsError {
    SecretsError::internal("memory store lock poisoned")
}

#[async_trait]
impl SecretHandler for MemorySecretHandler {
    async fn fetch(&self, workload_id: &str) -> Result<SecretStored> {
        let secrets = self.secrets.read().map_err(|_| poisoned())?;
        secrets
            .iter()
            .find(|secret| secret.name == workload_id)
            .cloned()
            .ok_or_else(|| SecretsError::not_found(workload_id))
    }

    async fn upsert(&self, workload_id: &str, value: SecretString, meta: SecretMeta) -> Result<()> {
        if workload_id.is_empty() {
            return Err(SecretsError::invalid_key(workload_id, "workload id cannot be empty"));
        }

        let mut secrets = self.secrets.write().map_err(|_| poisoned())?;
        match secrets.iter_mut().find(|secret| secret.name == workload_id) {
            Some(existing) => {
                existing.value = value;
                existing.meta = meta;
                existing.updated = Utc::now();
            }
            None => secrets.push(SecretStored::new(workload_id, value, meta)),
        }

        tracing::debug!(workload_id = %workload_id, "Stored secret in memory");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Secret>> {
        let secrets = self.secrets.read().map_err(|_| poisoned())?;
        Ok(secrets.iter().map(SecretStored::summary).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_missing_secret() {
        let handler = MemorySecretHandler::new();
        let err = handler.fetch("billing").await.unwrap_err();
        assert_eq!(err, SecretsError::not_found("billing"));
    }

    #[tokio::test]
    async fn test_upsert_then_fetch() {
        let handler = MemorySecretHandler::new();
        handler.upsert("billing", "v1".into(), SecretMeta::default()).await.unwrap();
        let stored = handler.fetch("billing").await.unwrap();
        assert_eq!(stored.value.expose_secret(), "v1");
        assert_eq!(stored.created, stored.updated);
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_keeps_created() {
        let handler = MemorySecretHandler::new();
        handler.upsert("billing", "v1".into(), SecretMeta::default()).await.unwrap();
        let first = handler.fetch("billing").await.unwrap();
        handler.upsert("billing", "v2".into(), SecretMeta::default()).await.unwrap();
        let second = handler.fetch("billing").await.unwrap();

        assert_eq!(second.value.expose_secret(), "v2");
        assert_eq!(second.created, first.created);
        assert!(second.updated >= first.updated);
        assert_eq!(handler.len(), 1);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let handler = MemorySecretHandler::new();
        for name in ["payments", "billing", "audit"] {
            handler.upsert(name, "v".into(), SecretMeta::default()).await.unwrap();
        }
        let names: Vec<String> =
            handler.list().await.unwrap().into_iter().map(|secret| secret.name).collect();
        assert_eq!(names, vec!["payments", "billing", "audit"]);
    }

    #[test]
    fn test_list_empty_store() {
        let handler = MemorySecretHandler::new();
        let secrets = tokio_test::block_on(handler.list()).unwrap();
        assert!(secrets.is_empty());
    }

    #[tokio::test]
    async fn test_empty_workload_id_rejected() {
        let handler = MemorySecretHandler::new();
        let err = handler.upsert("", "v".into(), SecretMeta::default()).await.unwrap_err();
        assert!(matches!(err, SecretsError::InvalidKey { .. }));
        assert!(handler.is_empty());
    }
}
