// voice-gateway-mcp/src/transport/mod.rs
// ============================================================================
// Module: Transport Adapters
// Description: Local-pipe and remote-stream adapters over one dispatch engine.
// Purpose: Frame and deframe protocol messages per transport.
// Dependencies: axum, tokio
// ============================================================================

//! ## Overview
//! Both adapters share the [`crate::session`] lifecycle and in-flight model
//! and hold the same [`crate::dispatch::DispatchEngine`]. Framing errors are
//! answered by the adapter directly; everything else goes through dispatch.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod stdio;
pub mod stream;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use stdio::PipeAdapter;
pub use stdio::PipeLimits;
pub use stdio::SessionSummary;
pub use stream::SessionHub;
pub use stream::StreamLimits;

use thiserror::Error;

use crate::audit::AuditEvent;
use crate::audit::AuditSink;
use crate::audit::LifecycleAuditEvent;
use crate::session::CloseReason;
use crate::session::ConnectionContext;
use crate::session::ConnectionState;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Transport failures that end a connection or listener.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Underlying I/O failure.
    #[error("transport io error: {0}")]
    Io(String),
    /// Caller could not be authenticated.
    #[error("transport auth error: {0}")]
    Auth(String),
    /// Listener could not be bound or served.
    #[error("transport listener error: {0}")]
    Listener(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Emits a lifecycle audit event for a connection.
pub(crate) fn record_transition(
    audit: &dyn AuditSink,
    context: &ConnectionContext,
    state: ConnectionState,
    reason: Option<CloseReason>,
    cancelled: usize,
) {
    let mut event = LifecycleAuditEvent::new(context.transport, &context.connection_id, state)
        .with_subject(context.credentials.subject())
        .with_cancelled(cancelled);
    if let Some(reason) = reason {
        event = event.with_reason(reason);
    }
    audit.record(&AuditEvent::ConnectionLifecycle(event));
}
