//! Closed union of the shapes the audit journal knows how to summarise.

use super::v1::{
    GenericRequest, GenericResponse, SecretFetchRequest, SecretFetchResponse, SecretListRequest,
    SecretListResponse, SecretUpsertRequest, SecretUpsertResponse,
};
use super::Outcome;

/// An operation payload attached to an audit entry.
///
/// `Unrecognized` stands in for a payload of a kind this crate does not
/// define; it is logged as such rather than dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    SecretUpsertRequest(SecretUpsertRequest),
    SecretUpsertResponse(SecretUpsertResponse),
    SecretFetchRequest(SecretFetchRequest),
    SecretFetchResponse(SecretFetchResponse),
    SecretListRequest(SecretListRequest),
    SecretListResponse(SecretListResponse),
    GenericRequest(GenericRequest),
    GenericResponse(GenericResponse),
    Unrecognized,
}

/// The audit-safe fields of an entity.
///
/// Secret values have no slot here, so they cannot reach an audit line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitySummary {
    /// Only the error text
    Err(String),
    /// Error text plus timestamps, for fetch responses
    Timestamped { err: String, created: String, updated: String },
    Unrecognized,
}

impl Entity {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SecretUpsertRequest(_) => "SecretUpsertRequest",
            Self::SecretUpsertResponse(_) => "SecretUpsertResponse",
            Self::SecretFetchRequest(_) => "SecretFetchRequest",
            Self::SecretFetchResponse(_) => "SecretFetchResponse",
            Self::SecretListRequest(_) => "SecretListRequest",
            Self::SecretListResponse(_) => "SecretListResponse",
            Self::GenericRequest(_) => "GenericRequest",
            Self::GenericResponse(_) => "GenericResponse",
            Self::Unrecognized => "Unrecognized",
        }
    }

    pub fn summary(&self) -> EntitySummary {
        match self {
            Self::SecretUpsertRequest(v) => EntitySummary::Err(v.err.clone()),
            Self::SecretUpsertResponse(v) => EntitySummary::Err(v.err.clone()),
            Self::SecretFetchRequest(v) => EntitySummary::Err(v.err.clone()),
            Self::SecretFetchResponse(v) => EntitySummary::Timestamped {
                err: v.err.clone(),
                created: v.created.to_string(),
                updated: v.updated.to_string(),
            },
            Self::SecretListRequest(v) => EntitySummary::Err(v.err.clone()),
            Self::SecretListResponse(v) => EntitySummary::Err(v.err.clone()),
            Self::GenericRequest(v) => EntitySummary::Err(v.err.clone()),
            Self::GenericResponse(v) => EntitySummary::Err(v.err.clone()),
            Self::Unrecognized => EntitySummary::Unrecognized,
        }
    }

    /// The entity's `err` field; `None` for unrecognized payloads.
    pub fn err(&self) -> Option<&str> {
        match self {
            Self::SecretUpsertRequest(v) => Some(v.err()),
            Self::SecretUpsertResponse(v) => Some(v.err()),
            Self::SecretFetchRequest(v) => Some(v.err()),
            Self::SecretFetchResponse(v) => Some(v.err()),
            Self::SecretListRequest(v) => Some(v.err()),
            Self::SecretListResponse(v) => Some(v.err()),
            Self::GenericRequest(v) => Some(v.err()),
            Self::GenericResponse(v) => Some(v.err()),
            Self::Unrecognized => None,
        }
    }
}

macro_rules! impl_from_shape {
    ($($shape:ident),+ $(,)?) => {
        $(
            impl From<$shape> for Entity {
                fn from(value: $shape) -> Self {
                    Self::$shape(value)
                }
            }
        )+
    };
}

impl_from_shape!(
    SecretUpsertRequest,
    SecretUpsertResponse,
    SecretFetchRequest,
    SecretFetchResponse,
    SecretListRequest,
    SecretListResponse,
    GenericRequest,
    GenericResponse,
);
