//! Audit event taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Outcome tag attached to every audit record.
///
/// The string tags are consumed by log pipelines and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditEvent {
    /// A call entered the service
    #[serde(rename = "aegis-enter")]
    Enter,
    /// The caller's SVID does not hold the required role
    #[serde(rename = "aegis-bad-svid")]
    BadSvid,
    /// The request body failed to parse
    #[serde(rename = "aegis-broken-body")]
    BrokenBody,
    /// The body parsed but is not the expected contract
    #[serde(rename = "aegis-request-type-mismatch")]
    RequestTypeMismatch,
    /// An outbound peer presented an unexpected SVID
    #[serde(rename = "aegis-bad-peer-svid")]
    BadPeerSvid,
    /// The secret was not found or could not be served
    #[serde(rename = "aegis-no-secret")]
    NoSecret,
    #[serde(rename = "aegis-ok")]
    Success,
    /// No workload identifier could be determined
    #[serde(rename = "aegis-no-workload-id")]
    NoWorkloadId,
}

/// A tag outside the audit taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown audit event: {tag}")]
pub struct UnknownAuditEvent {
    pub tag: String,
}

impl AuditEvent {
    pub const ALL: [AuditEvent; 8] = [
        AuditEvent::Enter,
        AuditEvent::BadSvid,
        AuditEvent::BrokenBody,
        AuditEvent::RequestTypeMismatch,
        AuditEvent::BadPeerSvid,
        AuditEvent::NoSecret,
        AuditEvent::Success,
        AuditEvent::NoWorkloadId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "aegis-enter",
            Self::BadSvid => "aegis-bad-svid",
            Self::BrokenBody => "aegis-broken-body",
            Self::RequestTypeMismatch => "aegis-request-type-mismatch",
            Self::BadPeerSvid => "aegis-bad-peer-svid",
            Self::NoSecret => "aegis-no-secret",
            Self::Success => "aegis-ok",
            Self::NoWorkloadId => "aegis-no-workload-id",
        }
    }

    /// True for the events that end a call.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Enter)
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditEvent {
    type Err = UnknownAuditEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| UnknownAuditEvent { tag: s.to_string() })
    }
}
