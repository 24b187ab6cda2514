//! Secret values and the audited secret service.
//!
//! # Architecture
//!
//! Storage is an external collaborator behind the [`SecretHandler`] trait:
//! - **fetch**: the secret registered for a workload
//! - **upsert**: create or replace a workload's secret
//! - **list**: summaries of every stored secret
//!
//! [`AuditedSecretService`] sits in front of a handler. It checks the
//! caller's trust role, decodes the request body strictly, calls the handler
//! and audits the call. [`MemorySecretHandler`] backs the `memory` store.
//!
//! # Security
//!
//! Secret values are carried in [`SecretString`], which redacts itself in
//! `Debug`, `Display` and default serialization and is zeroed on drop.

pub mod audited;
pub mod error;
pub mod handler;
pub mod memory;
pub mod types;

pub use audited::{AuditedSecretService, CallContext};
pub use error::{Result, SecretsError};
pub use handler::SecretHandler;
pub use memory::MemorySecretHandler;
pub use types::{SecretString, REDACTED};
