//! # Audit Journal
//!
//! Every call into the secret service produces audit records: one `Enter`
//! record when the call arrives and one terminal record describing its
//! outcome. Records are rendered to a single line carrying the correlation
//! id, method, URL, caller SVID and a `msg` field.
//!
//! # Security
//!
//! The `msg` field is built from [`Entity::summary`](crate::reqres::Entity::summary),
//! which has no slot for secret values. Upsert request values and fetch
//! response data can therefore never reach a sink.

pub mod event;
pub mod journal;
pub mod sink;

pub use event::{AuditEvent, UnknownAuditEvent};
pub use journal::{new_correlation_id, AuditLine, Journal, JournalEntry, UNKNOWN_ENTITY_MESSAGE};
pub use sink::{AuditSink, AuditSinkError, JsonLinesSink, TracingAuditSink, AUDIT_TARGET};
