//! Error types reported by secret storage handlers.

use thiserror::Error;

use crate::audit::AuditEvent;

/// Result type for secret handler operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors a storage handler can report back to the audited service.
///
/// Display strings end up in the `err` field of responses and in audit
/// lines, so no variant carries a secret value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretsError {
    /// Secret not found in the backing store.
    #[error("secret not found: {key}")]
    NotFound { key: String },

    /// Workload key rejected by the store.
    #[error("invalid secret key: {key} - {reason}")]
    InvalidKey { key: String, reason: String },

    /// Secret value rejected by the store.
    #[error("invalid secret value: {reason}")]
    InvalidValue { reason: String },

    /// Backing store failure.
    #[error("backend error: {message}")]
    Backend { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl SecretsError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into(), reason: reason.into() }
    }

    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue { reason: reason.into() }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Audit event recorded when a handler fails with this error.
    pub fn audit_event(&self) -> AuditEvent {
        match self {
            Self::NotFound { .. } | Self::Backend { .. } | Self::Internal { .. } => {
                AuditEvent::NoSecret
            }
            Self::InvalidKey { .. } => AuditEvent::NoWorkloadId,
            Self::InvalidValue { .. } => AuditEvent::BrokenBody,
        }
    }
}
