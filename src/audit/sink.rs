//! Destinations for audit lines.

use std::io::Write;
use std::sync::Mutex;
use thiserror::Error;

use super::journal::AuditLine;

/// Target under which the tracing sink emits audit records.
pub const AUDIT_TARGET: &str = "aegis::audit";

#[derive(Error, Debug)]
pub enum AuditSinkError {
    #[error("failed to write audit line: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode audit line: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("audit sink lock poisoned")]
    Poisoned,
}

/// Receives one rendered line per journal entry.
pub trait AuditSink: Send + Sync {
    fn write(&self, line: &AuditLine<'_>) -> Result<(), AuditSinkError>;
}

/// Emits audit lines as `tracing` events at `info` level.
///
/// Fields are recorded with `Debug`, so control characters in caller-supplied
/// values are escaped and every entry stays on one physical line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn write(&self, line: &AuditLine<'_>) -> Result<(), AuditSinkError> {
        tracing::info!(
            target: AUDIT_TARGET,
            correlation_id = ?line.correlation_id,
            method = ?line.method,
            url = ?line.url,
            svid = ?line.svid,
            msg = ?line.msg,
            "audit"
        );
        Ok(())
    }
}

/// Writes each audit line as one JSON object followed by a newline.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    /// Recover the writer, e.g. to inspect a buffer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> AuditSink for JsonLinesSink<W> {
    fn write(&self, line: &AuditLine<'_>) -> Result<(), AuditSinkError> {
        let mut encoded = serde_json::to_vec(line)?;
        encoded.push(b'\n');

        let mut writer = self.writer.lock().map_err(|_| AuditSinkError::Poisoned)?;
        writer.write_all(&encoded)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn line() -> AuditLine<'static> {
        AuditLine {
            correlation_id: "corr-1",
            method: "POST",
            url: "/sentinel/v1/secrets",
            svid: "spiffe://aegis.z2h.dev/workload/billing",
            msg: "e: m:aegis-ok".to_string(),
        }
    }

    #[test]
    fn test_json_lines_field_order() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.write(&line()).unwrap();
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            "{\"correlation_id\":\"corr-1\",\"method\":\"POST\",\"url\":\"/sentinel/v1/secrets\",\
             \"svid\":\"spiffe://aegis.z2h.dev/workload/billing\",\"msg\":\"e: m:aegis-ok\"}\n"
        );
    }

    #[test]
    fn test_json_lines_propagates_io_errors() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk gone"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err = JsonLinesSink::new(Broken).write(&line()).unwrap_err();
        assert!(matches!(err, AuditSinkError::Io(_)));
    }

    #[traced_test]
    #[test]
    fn test_tracing_sink_emits_fields() {
        TracingAuditSink.write(&line()).unwrap();
        assert!(logs_contain("correlation_id=\"corr-1\""));
        assert!(logs_contain("msg=\"e: m:aegis-ok\""));
    }
}
