//! Secure wrapper for secret values.
//!
//! Secret values travel inside upsert requests and fetch responses. Those
//! shapes are also handed to the audit journal and to `tracing`, so the value
//! type itself must refuse to show up in `Debug`, `Display` or default
//! serialization.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Placeholder written wherever a secret value would otherwise appear.
pub const REDACTED: &str = "[REDACTED]";

/// A string that redacts itself in Debug, Display and default serialization.
///
/// - Debug prints `SecretString([REDACTED])`, Display prints `[REDACTED]`
/// - `Serialize` writes `"[REDACTED]"`
/// - Deserialization accepts the real value
/// - Wire contracts that must carry the real value opt in per field with
///   `#[serde(serialize_with = "exposed::serialize")]`
/// - Memory is zeroed on drop
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value.
    ///
    /// Only call this to hand the value to the storage engine or the wire.
    /// Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString({})", REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Serializer for wire fields that must carry the plaintext.
pub mod exposed {
    use super::SecretString;
    use serde::Serializer;

    pub fn serialize<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(secret.expose_secret())
    }
}
