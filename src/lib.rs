//! # Aegis Core
//!
//! Shared building blocks of the Aegis secrets manager: deciding which trust
//! role a caller holds from its SPIFFE identity, the wire contracts exchanged
//! between workloads, Aegis Sentinel and Aegis Safe, and the audit journal
//! that records every secret operation.
//!
//! ## Architecture
//!
//! ```text
//! caller SVID → IdentityClassifier → decode(body) → SecretHandler → response
//!                     ↓                   ↓               ↓            ↓
//!                               Journal (one Enter + one terminal record)
//! ```
//!
//! ## Core Components
//!
//! - **identity**: prefix-based SVID classification into trust roles
//! - **reqres**: request/response contracts with strict decoding
//! - **audit**: event taxonomy, journal and sinks
//! - **secrets**: redacting secret values and the audited secret service
//! - **config**: environment-driven configuration with literal defaults
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use aegis_core::{Config, IdentityClassifier, Result};
//!
//! fn main() -> Result<()> {
//!     let config = Config::from_env()?;
//!     let classifier: IdentityClassifier = config.classifier();
//!     let svid = "spiffe://aegis.z2h.dev/workload/billing/ns/default/sa/billing/n/node-1";
//!     assert!(classifier.is_workload(svid));
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod identity;
pub mod observability;
pub mod reqres;
pub mod secrets;

// Re-export commonly used types and traits
pub use audit::{AuditEvent, Journal, JournalEntry};
pub use config::Config;
pub use errors::{Error, Result};
pub use identity::{IdentityClassifier, TrustRole};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
