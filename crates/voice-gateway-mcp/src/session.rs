// voice-gateway-mcp/src/session.rs
// ============================================================================
// Module: Connection State
// Description: Connection lifecycle and in-flight request tracking.
// Purpose: Share one connection model between the pipe and stream adapters.
// Dependencies: tokio-util, thiserror
// ============================================================================

//! ## Overview
//! Every connection walks the same lifecycle:
//! `Connecting -> Ready -> Active -> Closing -> Closed`, with
//! `Connecting -> Closed` for a failed handshake. [`Lifecycle`] enforces the
//! allowed transitions. [`InflightTable`] tracks request ids that have been
//! dispatched but not yet answered, rejects duplicates, and owns one
//! cancellation token per request, all children of a connection-wide token so
//! teardown cancels everything the connection started.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::auth::CredentialContext;
use crate::error::ToolError;
use crate::protocol::RequestId;

// ============================================================================
// SECTION: Connection Identity
// ============================================================================

/// Transport a connection arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Local newline-delimited pipe.
    Pipe,
    /// Remote event stream.
    Stream,
}

impl TransportKind {
    /// Returns a stable label for the transport.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pipe => "pipe",
            Self::Stream => "stream",
        }
    }
}

/// Immutable per-connection context handed to the dispatch engine.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    /// Connection or session identifier.
    pub connection_id: String,
    /// Transport kind.
    pub transport: TransportKind,
    /// Caller credentials resolved at connect time.
    pub credentials: CredentialContext,
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Awaiting handshake.
    Connecting,
    /// Handshake complete, no request seen yet.
    Ready,
    /// At least one request exchanged.
    Active,
    /// Draining outstanding responses.
    Closing,
    /// Terminal.
    Closed,
}

impl ConnectionState {
    /// Returns a stable label for the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::Active => "active",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }

    /// Returns true when `next` is a legal successor of this state.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::Ready | Self::Closed)
                | (Self::Ready, Self::Active | Self::Closing)
                | (Self::Active, Self::Active | Self::Closing)
                | (Self::Closing, Self::Closed)
        )
    }

    /// Returns true while the connection may accept new requests.
    #[must_use]
    pub const fn accepts_requests(self) -> bool {
        matches!(self, Self::Ready | Self::Active)
    }
}

/// Rejected lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal connection transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    /// Current state.
    pub from: ConnectionState,
    /// Requested state.
    pub to: ConnectionState,
}

/// Close reason reported in `closing` events and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Handshake was malformed or missing.
    HandshakeFailed,
    /// Client sent `close`.
    ClientClose,
    /// Input reached end of stream.
    EndOfStream,
    /// No traffic within the idle timeout.
    IdleTimeout,
    /// Client violated the protocol after the handshake.
    ProtocolViolation,
    /// Session expired while detached or idle.
    Reaped,
    /// Gateway is shutting down.
    Shutdown,
}

impl CloseReason {
    /// Returns a stable label for the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HandshakeFailed => "handshake_failed",
            Self::ClientClose => "client_close",
            Self::EndOfStream => "end_of_stream",
            Self::IdleTimeout => "idle_timeout",
            Self::ProtocolViolation => "protocol_violation",
            Self::Reaped => "reaped",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Lifecycle state holder enforcing legal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    /// Current state.
    state: ConnectionState,
}

impl Lifecycle {
    /// Starts a new lifecycle in `Connecting`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ConnectionState::Connecting,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when `next` is not a legal successor.
    pub const fn advance(&mut self, next: ConnectionState) -> Result<ConnectionState, InvalidTransition> {
        if self.state.can_advance_to(next) {
            let previous = self.state;
            self.state = next;
            Ok(previous)
        } else {
            Err(InvalidTransition {
                from: self.state,
                to: next,
            })
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: In-Flight Tracking
// ============================================================================

/// In-flight request table for one connection.
#[derive(Debug)]
pub struct InflightTable {
    /// Request id to per-request cancellation token.
    entries: Mutex<HashMap<RequestId, CancellationToken>>,
    /// Maximum concurrent in-flight requests.
    limit: usize,
    /// Parent token cancelled on connection teardown.
    teardown: CancellationToken,
}

impl InflightTable {
    /// Creates a table admitting at most `limit` in-flight requests.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            limit,
            teardown: CancellationToken::new(),
        }
    }

    /// Registers a request id and returns its cancellation token.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` when the id is already in flight, and
    /// `overloaded` when the connection is at its in-flight limit. Neither
    /// case changes the table.
    pub fn begin(&self, id: &RequestId) -> Result<CancellationToken, ToolError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(id) {
            return Err(ToolError::duplicate_id());
        }
        if entries.len() >= self.limit {
            return Err(ToolError::overloaded());
        }
        let token = self.teardown.child_token();
        entries.insert(id.clone(), token.clone());
        drop(entries);
        Ok(token)
    }

    /// Removes a completed request. Returns false when the id was not in
    /// flight, which means its response must be discarded.
    pub fn finish(&self, id: &RequestId) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(id).is_some()
    }

    /// Signals cancellation for one in-flight request.
    pub fn cancel(&self, id: &RequestId) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(token) = entries.get(id) else {
            return false;
        };
        token.cancel();
        true
    }

    /// Cancels every in-flight request and clears the table.
    pub fn cancel_all(&self) -> usize {
        self.teardown.cancel();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let count = entries.len();
        entries.clear();
        count
    }

    /// Returns true once [`Self::cancel_all`] has run.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.teardown.is_cancelled()
    }

    /// Returns the number of in-flight requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only lifecycle assertions."
    )]

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn lifecycle_follows_happy_path() {
        let mut lifecycle = Lifecycle::new();
        for next in [
            ConnectionState::Ready,
            ConnectionState::Active,
            ConnectionState::Active,
            ConnectionState::Closing,
            ConnectionState::Closed,
        ] {
            lifecycle.advance(next).expect("legal transition");
        }
        assert_eq!(lifecycle.state(), ConnectionState::Closed);
    }

    #[test]
    fn failed_handshake_goes_straight_to_closed() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(ConnectionState::Closed).expect("handshake failure");
        let err = lifecycle.advance(ConnectionState::Ready).expect_err("closed is terminal");
        assert_eq!(err.from, ConnectionState::Closed);
    }

    #[test]
    fn closing_requires_ready_or_active() {
        let mut lifecycle = Lifecycle::new();
        assert!(lifecycle.advance(ConnectionState::Closing).is_err());
        assert!(lifecycle.advance(ConnectionState::Active).is_err());
        assert_eq!(lifecycle.state(), ConnectionState::Connecting);
    }

    #[test]
    fn duplicate_ids_are_rejected_without_side_effects() {
        let table = InflightTable::new(8);
        let id = RequestId::from("req-1");
        let token = table.begin(&id).expect("first");
        let err = table.begin(&id).expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
        assert_eq!(table.len(), 1);
        assert!(!token.is_cancelled());
        assert!(table.finish(&id));
        table.begin(&id).expect("id reusable after completion");
    }

    #[test]
    fn limit_rejects_excess_requests() {
        let table = InflightTable::new(1);
        table.begin(&RequestId::Number(1)).expect("first");
        let err = table.begin(&RequestId::Number(2)).expect_err("limit");
        assert_eq!(err.kind, ErrorKind::Overloaded);
    }

    #[test]
    fn cancel_all_cancels_children_and_drops_late_results() {
        let table = InflightTable::new(4);
        let first = table.begin(&RequestId::Number(1)).expect("first");
        let second = table.begin(&RequestId::Number(2)).expect("second");
        assert_eq!(table.cancel_all(), 2);
        assert!(first.is_cancelled() && second.is_cancelled());
        assert!(!table.finish(&RequestId::Number(1)));
        assert!(table.is_torn_down());
    }

    #[test]
    fn cancel_targets_one_request() {
        let table = InflightTable::new(4);
        let first = table.begin(&RequestId::Number(1)).expect("first");
        let second = table.begin(&RequestId::Number(2)).expect("second");
        assert!(table.cancel(&RequestId::Number(1)));
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!table.cancel(&RequestId::Number(9)));
    }
}
