// voice-gateway-mcp/src/audit.rs
// ============================================================================
// Module: Gateway Audit Logging
// Description: Structured audit events for dispatch and connections.
// Purpose: Keep internal diagnostics out of responses but not out of logs.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are JSON lines. Tool-call events carry the internal
//! diagnostic detail (backend error text, panic messages) that is withheld
//! from callers. Sinks are selected by the `[audit]` config section.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::config::AuditConfig;
use crate::error::ErrorKind;
use crate::session::CloseReason;
use crate::session::ConnectionState;
use crate::session::TransportKind;
use crate::telemetry::GatewayOutcome;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Audit record for one dispatched tool call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallAuditEvent {
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Transport the call arrived on.
    pub transport: TransportKind,
    /// Connection or session identifier.
    pub connection_id: String,
    /// Request id rendered as a string.
    pub request_id: String,
    /// Requested tool name.
    pub tool: String,
    /// Caller subject.
    pub subject: String,
    /// Outcome.
    pub outcome: GatewayOutcome,
    /// Error kind for error outcomes.
    pub error_kind: Option<ErrorKind>,
    /// Dispatch latency in milliseconds.
    pub latency_ms: u128,
    /// Internal diagnostic detail, never sent to the caller.
    pub detail: Option<String>,
}

/// Audit record for a connection state change.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleAuditEvent {
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Transport.
    pub transport: TransportKind,
    /// Connection or session identifier.
    pub connection_id: String,
    /// Caller subject when known.
    pub subject: Option<String>,
    /// New state.
    pub state: ConnectionState,
    /// Close reason when closing.
    pub reason: Option<CloseReason>,
    /// Requests cancelled by this transition.
    pub cancelled: usize,
}

impl LifecycleAuditEvent {
    /// Builds a lifecycle event stamped with the current time.
    #[must_use]
    pub fn new(transport: TransportKind, connection_id: &str, state: ConnectionState) -> Self {
        Self {
            timestamp_ms: now_ms(),
            transport,
            connection_id: connection_id.to_string(),
            subject: None,
            state,
            reason: None,
            cancelled: 0,
        }
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Sets the close reason.
    #[must_use]
    pub const fn with_reason(mut self, reason: CloseReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Sets the number of cancelled requests.
    #[must_use]
    pub const fn with_cancelled(mut self, cancelled: usize) -> Self {
        self.cancelled = cancelled;
        self
    }
}

/// Any audit event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Tool call record.
    ToolCall(ToolCallAuditEvent),
    /// Connection lifecycle record.
    ConnectionLifecycle(LifecycleAuditEvent),
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for gateway events.
pub trait AuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &AuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let mut stderr = io::stderr().lock();
            let _ = writeln!(stderr, "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Audit sink that drops everything.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

/// Builds the sink selected by config.
///
/// # Errors
///
/// Returns an error when the configured audit file cannot be opened.
pub fn sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match config.path.as_deref() {
        Some(path) => Ok(Arc::new(FileAuditSink::new(Path::new(path))?)),
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_millis()).unwrap_or(0)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only audit file assertions."
    )]

    use serde_json::Value;

    use super::*;

    #[test]
    fn file_sink_appends_tagged_json_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("audit.jsonl");
        let sink = sink_from_config(&AuditConfig {
            enabled: true,
            path: Some(path.display().to_string()),
        })
        .expect("sink");
        let event = LifecycleAuditEvent::new(TransportKind::Pipe, "pipe-1", ConnectionState::Closing)
            .with_reason(CloseReason::IdleTimeout)
            .with_cancelled(2);
        sink.record(&AuditEvent::ConnectionLifecycle(event.clone()));
        sink.record(&AuditEvent::ConnectionLifecycle(event));

        let contents = std::fs::read_to_string(&path).expect("read audit");
        let lines: Vec<Value> =
            contents.lines().map(|line| serde_json::from_str(line).expect("json line")).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "connection_lifecycle");
        assert_eq!(lines[0]["reason"], "idle_timeout");
        assert_eq!(lines[0]["transport"], "pipe");
        assert_eq!(lines[0]["cancelled"], 2);
    }
}
