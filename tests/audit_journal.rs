mod common;

use aegis_core::audit::{AuditEvent, Journal, JournalEntry, TracingAuditSink};
use aegis_core::domain::JsonTime;
use aegis_core::reqres::{
    Entity, SecretFetchRequest, SecretFetchResponse, SecretUpsertRequest, SecretUpsertResponse,
};
use common::SharedBuffer;
use proptest::prelude::*;
use tracing_test::traced_test;

fn entry(event: AuditEvent) -> JournalEntry {
    JournalEntry::new("corr-42", "POST", "/sentinel/v1/secrets", common::SENTINEL_SVID, event)
}

#[traced_test]
#[test]
fn upsert_response_success_is_logged_without_value() {
    let journal = Journal::new(TracingAuditSink);
    journal.record(&entry(AuditEvent::Success).with_entity(SecretUpsertResponse::default()));

    assert!(logs_contain("correlation_id=\"corr-42\""));
    assert!(logs_contain("e: m:aegis-ok"));
    assert!(!logs_contain("value"));
}

#[traced_test]
#[test]
fn fetch_request_failure_is_logged_with_error_and_tag() {
    let journal = Journal::default();
    let request = SecretFetchRequest { err: "not found".to_string() };
    journal.record(&entry(AuditEvent::NoSecret).with_entity(request));

    assert!(logs_contain("e:not found"));
    assert!(logs_contain("aegis-no-secret"));
    assert!(!logs_contain("data"));
}

#[test]
fn lines_carry_fields_in_order() {
    let buffer = SharedBuffer::default();
    let journal = Journal::new(buffer.sink());
    journal.record(&entry(AuditEvent::Enter));

    assert_eq!(
        buffer.lines(),
        vec![format!(
            "{{\"correlation_id\":\"corr-42\",\"method\":\"POST\",\"url\":\"/sentinel/v1/secrets\",\"svid\":\"{}\",\"msg\":\"aegis-enter\"}}",
            common::SENTINEL_SVID
        )]
    );
}

#[test]
fn newlines_in_caller_fields_stay_on_one_line() {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let forged =
        "c1\n2026-10-19T00:00:00Z  INFO aegis::audit: audit correlation_id=forged msg=aegis-ok";
    tracing::subscriber::with_default(subscriber, || {
        let entry =
            JournalEntry::new(forged, "POST", "/x\r\n", common::BILLING_SVID, AuditEvent::Enter);
        Journal::new(TracingAuditSink).record(&entry);
    });

    let lines = buffer.lines();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].contains("correlation_id=\"c1\\n2026-10-19T00:00:00Z"));
    assert!(lines[0].contains("msg=\"aegis-enter\""));
}

#[test]
fn recording_twice_yields_two_identical_lines() {
    let buffer = SharedBuffer::default();
    let journal = Journal::new(buffer.sink());
    let e = entry(AuditEvent::Success).with_entity(SecretUpsertResponse::failure("denied"));
    journal.record(&e);
    journal.record(&e);

    let lines = buffer.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], lines[1]);
}

#[test]
fn unknown_entity_yields_exactly_one_tagged_line() {
    let buffer = SharedBuffer::default();
    let journal = Journal::new(buffer.sink());
    let mut e = entry(AuditEvent::Success);
    e.entity = Some(Entity::Unrecognized);
    journal.record(&e);

    let records = buffer.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["msg"], "e:UNKNOWN ENTITY IN AUDIT LOG m:aegis-ok");
}

#[test]
fn no_entity_msg_is_the_bare_tag() {
    let buffer = SharedBuffer::default();
    let journal = Journal::new(buffer.sink());
    for event in AuditEvent::ALL {
        journal.record(&entry(event));
    }

    let msgs: Vec<String> =
        buffer.records().iter().map(|r| r["msg"].as_str().unwrap().to_string()).collect();
    let tags: Vec<String> = AuditEvent::ALL.iter().map(|e| e.to_string()).collect();
    assert_eq!(msgs, tags);
}

#[traced_test]
#[test]
fn sink_failures_are_swallowed_and_warned() {
    struct Broken;
    impl std::io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk gone"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let journal = Journal::new(aegis_core::audit::JsonLinesSink::new(Broken));
    journal.record(&entry(AuditEvent::Enter));
    assert!(logs_contain("Failed to write audit line"));
}

proptest! {
    #[test]
    fn upsert_request_values_never_reach_the_log(value in "[A-Za-z0-9!#%&()*+,.:;<=>?@^_{|}~-]{12,48}") {
        let buffer = SharedBuffer::default();
        let journal = Journal::new(buffer.sink());
        let request = SecretUpsertRequest::new("billing", value.as_str());
        journal.record(&entry(AuditEvent::Success).with_entity(request));

        prop_assert!(!buffer.contents().contains(&value));
    }

    #[test]
    fn fetch_response_data_never_reaches_the_log(value in "[A-Za-z0-9!#%&()*+,.:;<=>?@^_{|}~-]{12,48}") {
        let buffer = SharedBuffer::default();
        let journal = Journal::new(buffer.sink());
        let response = SecretFetchResponse {
            data: value.as_str().into(),
            created: JsonTime::now(),
            updated: JsonTime::now(),
            err: String::new(),
        };
        journal.record(&entry(AuditEvent::Success).with_entity(response));

        prop_assert!(!buffer.contents().contains(&value));
        prop_assert_eq!(buffer.lines().len(), 1);
    }
}
