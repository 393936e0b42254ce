// voice-gateway-mcp/src/error.rs
// ============================================================================
// Module: Tool Errors
// Description: Caller-visible error taxonomy for tool responses.
// Purpose: Keep error kinds stable across both transports.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every failure that reaches a caller is expressed as a [`ToolError`]: a
//! stable [`ErrorKind`] plus a caller-safe message. Backend diagnostics never
//! travel in a [`ToolError`]; they are routed to the audit sink instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Error Kinds
// ============================================================================

/// Stable error classification carried in error responses.
///
/// # Invariants
/// - Variants and their serialized labels are stable wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown tool name.
    NotFound,
    /// Caller lacks the tool's required permission.
    Forbidden,
    /// Arguments or handler output violate a schema.
    ValidationError,
    /// Request id already in flight on the connection.
    InvalidRequest,
    /// Execution bridge or connection at capacity.
    Overloaded,
    /// Handler exceeded its allotted time.
    Timeout,
    /// Handler failed or returned a contract-violating value.
    UpstreamError,
    /// Malformed transport message.
    ProtocolError,
    /// Request was cancelled before it produced a result.
    Cancelled,
}

impl ErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::ValidationError => "validation_error",
            Self::InvalidRequest => "invalid_request",
            Self::Overloaded => "overloaded",
            Self::Timeout => "timeout",
            Self::UpstreamError => "upstream_error",
            Self::ProtocolError => "protocol_error",
            Self::Cancelled => "cancelled",
        }
    }
}

// ============================================================================
// SECTION: Tool Error
// ============================================================================

/// Caller-visible tool failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct ToolError {
    /// Stable error kind.
    pub kind: ErrorKind,
    /// Caller-safe message.
    pub message: String,
}

impl ToolError {
    /// Builds an error from a kind and caller-safe message.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Unknown tool.
    #[must_use]
    pub fn not_found(tool: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("unknown tool: {tool}"))
    }

    /// Permission denied.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(ErrorKind::Forbidden, "caller lacks required permission")
    }

    /// Argument validation failure.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    /// Duplicate in-flight request id.
    #[must_use]
    pub fn duplicate_id() -> Self {
        Self::new(ErrorKind::InvalidRequest, "request id already in flight on this connection")
    }

    /// Capacity exhausted.
    #[must_use]
    pub fn overloaded() -> Self {
        Self::new(ErrorKind::Overloaded, "gateway at capacity, retry later")
    }

    /// Handler timed out.
    #[must_use]
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, "tool did not complete in time")
    }

    /// Handler failure. The message is fixed so backend text never leaks.
    #[must_use]
    pub fn upstream() -> Self {
        Self::new(ErrorKind::UpstreamError, "tool backend failed")
    }

    /// Malformed frame.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProtocolError, message)
    }

    /// Cancelled before completion.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "request cancelled")
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
