//! Audit journal entries and their rendering.

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::event::AuditEvent;
use super::sink::{AuditSink, TracingAuditSink};
use crate::observability::metrics;
use crate::reqres::entity::{Entity, EntitySummary};

/// `msg` body written for payloads of an unknown kind.
pub const UNKNOWN_ENTITY_MESSAGE: &str = "UNKNOWN ENTITY IN AUDIT LOG";

/// One audit record as supplied by the caller.
///
/// The correlation id is untrusted input: it is logged verbatim and never
/// parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub correlation_id: String,
    pub method: String,
    pub url: String,
    pub svid: String,
    pub event: AuditEvent,
    pub entity: Option<Entity>,
}

impl JournalEntry {
    pub fn new(
        correlation_id: impl Into<String>,
        method: impl Into<String>,
        url: impl Into<String>,
        svid: impl Into<String>,
        event: AuditEvent,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            method: method.into(),
            url: url.into(),
            svid: svid.into(),
            event,
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<Entity>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_event(mut self, event: AuditEvent) -> Self {
        self.event = event;
        self
    }

    /// The `msg` field: the bare event tag without an entity, otherwise the
    /// entity's audit-safe fields followed by the tag.
    pub fn message(&self) -> String {
        let tag = self.event.as_str();
        match self.entity.as_ref().map(Entity::summary) {
            None => tag.to_string(),
            Some(EntitySummary::Err(err)) => format!("e:{} m:{}", err, tag),
            Some(EntitySummary::Timestamped { err, created, updated }) => {
                format!("e:{} c:{} u:{} m:{}", err, created, updated, tag)
            }
            Some(EntitySummary::Unrecognized) => {
                format!("e:{} m:{}", UNKNOWN_ENTITY_MESSAGE, tag)
            }
        }
    }

    pub fn line(&self) -> AuditLine<'_> {
        AuditLine {
            correlation_id: &self.correlation_id,
            method: &self.method,
            url: &self.url,
            svid: &self.svid,
            msg: self.message(),
        }
    }
}

/// A rendered audit line. Field order is the output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditLine<'a> {
    pub correlation_id: &'a str,
    pub method: &'a str,
    pub url: &'a str,
    pub svid: &'a str,
    pub msg: String,
}

/// Write-only audit log.
///
/// Immutable after construction and cheap to clone; recording never fails
/// from the caller's point of view.
#[derive(Clone)]
pub struct Journal {
    sink: Arc<dyn AuditSink>,
}

impl Journal {
    pub fn new(sink: impl AuditSink + 'static) -> Self {
        Self { sink: Arc::new(sink) }
    }

    pub fn from_shared(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Record one entry as exactly one line.
    pub fn record(&self, entry: &JournalEntry) {
        metrics::record_audit_event(entry.event);

        if let Err(e) = self.sink.write(&entry.line()) {
            warn!(
                error = %e,
                correlation_id = %entry.correlation_id,
                event = %entry.event,
                "Failed to write audit line"
            );
        }
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new(TracingAuditSink)
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal").finish_non_exhaustive()
    }
}

/// A fresh correlation id for calls that arrive without one.
pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reqres::{SecretFetchRequest, SecretFetchResponse, SecretUpsertResponse};

    fn entry(event: AuditEvent) -> JournalEntry {
        JournalEntry::new("corr-1", "POST", "/workload/v1/secrets", "spiffe://x/workload/a", event)
    }

    #[test]
    fn test_message_without_entity_is_the_tag() {
        assert_eq!(entry(AuditEvent::Enter).message(), "aegis-enter");
    }

    #[test]
    fn test_message_with_err_entity() {
        let e = entry(AuditEvent::Success).with_entity(SecretUpsertResponse::default());
        assert_eq!(e.message(), "e: m:aegis-ok");

        let e = entry(AuditEvent::NoSecret)
            .with_entity(SecretFetchRequest { err: "not found".to_string() });
        assert_eq!(e.message(), "e:not found m:aegis-no-secret");
    }

    #[test]
    fn test_message_for_fetch_response_has_timestamps_not_data() {
        let response = SecretFetchResponse { data: "hunter2".into(), ..Default::default() };
        let e = entry(AuditEvent::Success).with_entity(response);
        assert_eq!(
            e.message(),
            "e: c:Thu Jan 01 00:00:00 +0000 1970 u:Thu Jan 01 00:00:00 +0000 1970 m:aegis-ok"
        );
    }

    #[test]
    fn test_message_for_unrecognized_entity() {
        let mut e = entry(AuditEvent::Success);
        e.entity = Some(Entity::Unrecognized);
        assert_eq!(e.message(), "e:UNKNOWN ENTITY IN AUDIT LOG m:aegis-ok");
    }

    #[test]
    fn test_line_borrows_entry_fields() {
        let e = entry(AuditEvent::BadSvid);
        let line = e.line();
        assert_eq!(line.correlation_id, "corr-1");
        assert_eq!(line.method, "POST");
        assert_eq!(line.msg, "aegis-bad-svid");
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        assert_ne!(new_correlation_id(), new_correlation_id());
    }
}
