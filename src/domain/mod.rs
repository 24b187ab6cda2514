//! # Domain Types
//!
//! Secret metadata, backing-store and format enumerations, and the wire
//! timestamp shared by every role.

pub mod secret;
pub mod time;

pub use secret::{
    BackingStore, Secret, SecretFormat, SecretMeta, SecretStored, DEFAULT_NAMESPACE,
};
pub use time::{JsonTime, RUBY_DATE_FORMAT};
