//! # Operation Contracts
//!
//! Request/response shapes exchanged between workloads, sidecars, the sentinel
//! and the safe, plus strict decoding of raw request bodies.
//!
//! Decoding happens in two phases so a failure can be audited precisely:
//!
//! 1. The body is parsed as JSON. Syntax errors (including an empty body) are
//!    [`ContractError::Malformed`].
//! 2. The value is checked against the contract's field list. A non-object or
//!    an object carrying a field the contract does not define is
//!    [`ContractError::TypeMismatch`]. Wrong field types and missing required
//!    fields are [`ContractError::InvalidField`], naming the field.
//!
//! Error messages never contain body content. `serde_json` errors can quote
//! the offending value, so only positions and field names are kept.
//!
//! Peers serialize empty lists and strings as `null`; fields tagged with
//! [`null_as_default`] read that as the type's default.

pub mod entity;
pub mod v1;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::audit::AuditEvent;

pub use entity::Entity;
pub use v1::{
    GenericRequest, GenericResponse, SecretFetchRequest, SecretFetchResponse, SecretListRequest,
    SecretListResponse, SecretUpsertRequest, SecretUpsertResponse,
};

/// A wire shape with a fixed set of JSON fields.
pub trait Contract: Serialize + DeserializeOwned + Default {
    /// Human-readable shape name used in error messages
    const KIND: &'static str;

    /// Every JSON field name the shape accepts, aliases included
    const FIELDS: &'static [&'static str];
}

/// Success/failure view shared by every shape: a non-empty `err` is a failure.
pub trait Outcome {
    fn err(&self) -> &str;

    fn is_success(&self) -> bool {
        self.err().is_empty()
    }
}

/// Reasons a body does not satisfy a contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Not JSON
    #[error("malformed {kind} body (line {line}, column {column})")]
    Malformed { kind: &'static str, line: usize, column: usize },

    /// Valid JSON object whose fields do not decode. `field` is `None` when
    /// no single field is to blame.
    #[error("malformed {kind} body: {}", describe_field(.problem, .field.as_deref()))]
    InvalidField { kind: &'static str, problem: FieldProblem, field: Option<String> },

    /// Valid JSON of the wrong shape
    #[error("body is not a {kind}: {reason}")]
    TypeMismatch { kind: &'static str, reason: String },
}

impl ContractError {
    /// Audit event recorded when a body is rejected with this error.
    pub fn audit_event(&self) -> AuditEvent {
        match self {
            Self::Malformed { .. } | Self::InvalidField { .. } => AuditEvent::BrokenBody,
            Self::TypeMismatch { .. } => AuditEvent::RequestTypeMismatch,
        }
    }
}

/// Decode a raw body into contract `T`.
pub fn decode<T: Contract>(body: &[u8]) -> Result<T, ContractError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| ContractError::Malformed {
        kind: T::KIND,
        line: e.line(),
        column: e.column(),
    })?;

    let object = match &value {
        Value::Object(object) => object,
        other => {
            return Err(ContractError::TypeMismatch {
                kind: T::KIND,
                reason: format!("expected a JSON object, found {}", json_type_name(other)),
            })
        }
    };

    let mut unknown: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|key| !T::FIELDS.iter().any(|field| field == key))
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(ContractError::TypeMismatch {
            kind: T::KIND,
            reason: format!("unexpected field(s) {}", unknown.join(", ")),
        });
    }

    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(e) => Err(invalid_field::<T>(&e, &value)),
    }
}

/// What went wrong with a field of an otherwise well-formed object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    Duplicate,
    Invalid,
}

fn describe_field(problem: &FieldProblem, field: Option<&str>) -> String {
    match (problem, field) {
        (FieldProblem::Missing, Some(field)) => format!("missing field `{}`", field),
        (FieldProblem::Duplicate, Some(field)) => format!("duplicate field `{}`", field),
        (_, Some(field)) => format!("invalid value for field `{}`", field),
        (_, None) => "fields do not decode together".to_string(),
    }
}

/// Attribute a decode failure to a field without quoting the body.
///
/// Missing and duplicate fields are named by `serde_json` itself. For a bad
/// value, each body field is tried alone on top of the contract's minimal
/// valid object; the first that fails is blamed.
fn invalid_field<T: Contract>(err: &serde_json::Error, body: &Value) -> ContractError {
    let message = err.to_string();
    for (prefix, problem) in
        [("missing field `", FieldProblem::Missing), ("duplicate field `", FieldProblem::Duplicate)]
    {
        let field = quoted_field(&message, prefix)
            .filter(|field| T::FIELDS.iter().any(|known| *known == field.as_str()));
        if let Some(field) = field {
            return ContractError::InvalidField { kind: T::KIND, problem, field: Some(field) };
        }
    }

    let field = match (minimal_object::<T>(), body) {
        (Some(minimal), Value::Object(object)) => {
            let mut keys: Vec<&String> = object.keys().collect();
            keys.sort_unstable();
            keys.into_iter()
                .find(|key| {
                    let mut candidate = minimal.clone();
                    candidate.insert((*key).clone(), object[key.as_str()].clone());
                    serde_json::from_value::<T>(Value::Object(candidate)).is_err()
                })
                .cloned()
        }
        _ => None,
    };
    ContractError::InvalidField { kind: T::KIND, problem: FieldProblem::Invalid, field }
}

fn quoted_field(message: &str, prefix: &str) -> Option<String> {
    let rest = message.strip_prefix(prefix)?;
    Some(rest[..rest.find('`')?].to_string())
}

/// The default value of `T` reduced to the fields it cannot decode without.
fn minimal_object<T: Contract>() -> Option<Map<String, Value>> {
    let Value::Object(full) = serde_json::to_value(T::default()).ok()? else {
        return None;
    };
    let required = full
        .iter()
        .filter(|(key, _)| {
            let mut without = full.clone();
            without.remove(key.as_str());
            serde_json::from_value::<T>(Value::Object(without)).is_err()
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Some(required)
}

/// Encode a contract value for the wire.
pub fn encode<T: Contract>(value: &T) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(value)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Deserialize `null` as `T::default()`.
///
/// Use together with `#[serde(default)]` so a missing field also reads as the
/// default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde helper for enum fields where an empty string means "unset".
///
/// `None` serializes as `""`; `""`, `null` and a missing field decode as
/// `None`.
pub mod empty_as_none {
    use serde::de::{self, Deserialize, Deserializer};
    use serde::Serializer;
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(value) => serializer.collect_str(value),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| de::Error::custom("unrecognised enumeration value")),
        }
    }
}
