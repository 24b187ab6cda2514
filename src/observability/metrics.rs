//! # Metrics Collection
//!
//! Counters for identity classification and audit records. They go through
//! the `metrics` facade, so they cost nothing until the embedding process
//! installs a recorder (for example a Prometheus exporter).

use metrics::{counter, describe_counter, Unit};

use crate::audit::AuditEvent;
use crate::identity::TrustRole;

pub const IDENTITY_CLASSIFICATIONS_TOTAL: &str = "aegis_identity_classifications_total";
pub const AUDIT_RECORDS_TOTAL: &str = "aegis_audit_records_total";

/// Register metric descriptions so exporters list them before events occur.
pub fn describe_metrics() {
    describe_counter!(
        IDENTITY_CLASSIFICATIONS_TOTAL,
        Unit::Count,
        "SVIDs classified, labelled by the resolved trust role"
    );
    describe_counter!(
        AUDIT_RECORDS_TOTAL,
        Unit::Count,
        "Audit records emitted, labelled by event tag"
    );
}

/// Record the outcome of resolving an SVID to its primary role
pub fn record_classification(role: Option<TrustRole>) {
    let role = role.map_or("none", |role| role.as_str());
    counter!(IDENTITY_CLASSIFICATIONS_TOTAL, "role" => role).increment(1);
}

/// Record one emitted audit record
pub fn record_audit_event(event: AuditEvent) {
    counter!(AUDIT_RECORDS_TOTAL, "event" => event.as_str()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        describe_metrics();
        record_classification(Some(TrustRole::Workload));
        record_classification(None);
        for event in AuditEvent::ALL {
            record_audit_event(event);
        }
    }
}
