// voice-gateway-mcp/src/protocol.rs
// ============================================================================
// Module: Wire Protocol
// Description: Client and server frames shared by both transports.
// Purpose: Keep request/response shapes identical on every transport.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A frame is one JSON object. Client frames are either tool calls
//! (`{id, tool, arguments}`) or control frames tagged by `op`. Server frames
//! are responses (`{id, result}` or `{id, error}`) or events tagged by `op`.
//!
//! Decoding never panics: [`decode_client_frame`] returns a [`FrameError`]
//! carrying the request id when one could be extracted, so the adapter can
//! answer with a `protocol_error` response without involving dispatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::ToolError;
use crate::registry::ToolDefinition;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Protocol version negotiated in the `hello` handshake.
pub const PROTOCOL_VERSION: u32 = 1;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Caller-supplied request correlation token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Integer id.
    Number(i64),
    /// String id.
    Text(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

// ============================================================================
// SECTION: Client Frames
// ============================================================================

/// Tool call request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolRequest {
    /// Correlation id, unique among in-flight requests on the connection.
    pub id: RequestId,
    /// Tool name.
    pub tool: String,
    /// Tool arguments.
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

impl ToolRequest {
    /// Builds a tool request.
    #[must_use]
    pub fn new(id: impl Into<RequestId>, tool: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            arguments,
        }
    }
}

/// Out-of-band client control frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ControlFrame {
    /// Opening handshake.
    Hello {
        /// Protocol version the client speaks.
        protocol: u32,
        /// Optional client label.
        #[serde(default)]
        client: Option<String>,
    },
    /// Tool enumeration request.
    ListTools {
        /// Correlation id for the listing response.
        id: RequestId,
    },
    /// Cancels an in-flight request.
    Cancel {
        /// Id of the request to cancel.
        id: RequestId,
    },
    /// Graceful close.
    Close,
    /// Liveness check.
    Ping,
}

/// Any decoded client frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientFrame {
    /// Tool call.
    Call(ToolRequest),
    /// Control frame.
    Control(ControlFrame),
}

/// Frame that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameError {
    /// Request id, when one could be extracted.
    pub id: Option<RequestId>,
    /// Caller-safe reason.
    pub message: String,
}

impl FrameError {
    /// Returns the `protocol_error` response for this failure.
    #[must_use]
    pub fn into_response(self) -> ToolResponse {
        ToolResponse::failure(self.id, ToolError::protocol(self.message))
    }
}

/// Decodes one client frame.
///
/// # Errors
///
/// Returns [`FrameError`] when the bytes are not JSON, not an object, or do
/// not match any known frame shape.
pub fn decode_client_frame(bytes: &[u8]) -> Result<ClientFrame, FrameError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|err| FrameError {
        id: None,
        message: format!("malformed frame: {err}"),
    })?;
    let Value::Object(object) = value else {
        return Err(FrameError {
            id: None,
            message: "frame must be a JSON object".to_string(),
        });
    };
    let id = extract_id(&object);
    if object.contains_key("op") {
        serde_json::from_value::<ControlFrame>(Value::Object(object))
            .map(ClientFrame::Control)
            .map_err(|err| FrameError {
                id,
                message: format!("unrecognized control frame: {err}"),
            })
    } else {
        serde_json::from_value::<ToolRequest>(Value::Object(object))
            .map(ClientFrame::Call)
            .map_err(|err| FrameError {
                id,
                message: format!("unrecognized request shape: {err}"),
            })
    }
}

// ============================================================================
// SECTION: Server Frames
// ============================================================================

/// Response outcome: exactly one of result or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    /// Successful result.
    Result(Value),
    /// Failure.
    Error(ToolError),
}

/// Response to a tool call or listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Echoed request id; `null` when the id could not be extracted.
    pub id: Option<RequestId>,
    /// Result or error.
    #[serde(flatten)]
    pub outcome: ToolOutcome,
}

impl ToolResponse {
    /// Builds a success response.
    #[must_use]
    pub const fn success(id: RequestId, result: Value) -> Self {
        Self {
            id: Some(id),
            outcome: ToolOutcome::Result(result),
        }
    }

    /// Builds an error response.
    #[must_use]
    pub const fn failure(id: Option<RequestId>, error: ToolError) -> Self {
        Self {
            id,
            outcome: ToolOutcome::Error(error),
        }
    }

    /// Returns the error, if this is an error response.
    #[must_use]
    pub const fn error(&self) -> Option<&ToolError> {
        match &self.outcome {
            ToolOutcome::Error(error) => Some(error),
            ToolOutcome::Result(_) => None,
        }
    }

    /// Returns the result, if this is a success response.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match &self.outcome {
            ToolOutcome::Result(value) => Some(value),
            ToolOutcome::Error(_) => None,
        }
    }
}

/// Tool listing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolListing {
    /// Tool definitions in registration order.
    pub tools: Vec<ToolDefinition>,
}

/// Unsolicited server event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Handshake accepted.
    Ready {
        /// Session identifier.
        session: String,
        /// Protocol version.
        protocol: u32,
    },
    /// Reply to `ping`.
    Pong,
    /// Connection is closing.
    Closing {
        /// Close reason label.
        reason: String,
    },
}

/// Any server frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerFrame {
    /// Unsolicited event.
    Event(ServerEvent),
    /// Request response.
    Response(ToolResponse),
}

impl From<ToolResponse> for ServerFrame {
    fn from(response: ToolResponse) -> Self {
        Self::Response(response)
    }
}

impl From<ServerEvent> for ServerFrame {
    fn from(event: ServerEvent) -> Self {
        Self::Event(event)
    }
}

impl ServerFrame {
    /// Serializes the frame as a single JSON line without a trailing newline.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"id":null,"error":{"kind":"protocol_error","message":"response encoding failed"}}"#
                .to_string()
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default arguments for calls that omit them.
fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

/// Extracts a well-formed request id from a raw frame object.
fn extract_id(object: &Map<String, Value>) -> Option<RequestId> {
    object.get("id").cloned().and_then(|value| serde_json::from_value(value).ok())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only frame assertions."
    )]

    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn decodes_call_with_default_arguments() {
        let frame = decode_client_frame(br#"{"id":7,"tool":"list_voices"}"#).expect("decode");
        assert_eq!(frame, ClientFrame::Call(ToolRequest::new(7_i64, "list_voices", json!({}))));
    }

    #[test]
    fn decodes_control_frames() {
        let hello = decode_client_frame(br#"{"op":"hello","protocol":1}"#).expect("hello");
        assert_eq!(
            hello,
            ClientFrame::Control(ControlFrame::Hello {
                protocol: 1,
                client: None,
            })
        );
        let cancel = decode_client_frame(br#"{"op":"cancel","id":"a"}"#).expect("cancel");
        assert_eq!(cancel, ClientFrame::Control(ControlFrame::Cancel { id: "a".into() }));
    }

    #[test]
    fn malformed_json_has_no_id() {
        let error = decode_client_frame(b"{not json").expect_err("malformed");
        assert_eq!(error.id, None);
        let response = ServerFrame::from(error.into_response()).encode();
        let value: Value = serde_json::from_str(&response).expect("json");
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["kind"], json!("protocol_error"));
    }

    #[test]
    fn unknown_shape_echoes_extractable_id() {
        let error = decode_client_frame(br#"{"id":"r1","tool":"x","extra":true}"#)
            .expect_err("unknown field");
        assert_eq!(error.id, Some(RequestId::from("r1")));
        let error = decode_client_frame(br#"{"op":"teleport","id":3}"#).expect_err("unknown op");
        assert_eq!(error.id, Some(RequestId::Number(3)));
    }

    #[test]
    fn responses_carry_exactly_one_outcome() {
        let ok = ServerFrame::from(ToolResponse::success(RequestId::Number(1), json!("fine"))).encode();
        let ok: Value = serde_json::from_str(&ok).expect("json");
        assert_eq!(ok, json!({"id": 1, "result": "fine"}));

        let err = ServerFrame::from(ToolResponse::failure(
            Some("x".into()),
            ToolError::new(ErrorKind::NotFound, "unknown tool: y"),
        ))
        .encode();
        let err: Value = serde_json::from_str(&err).expect("json");
        assert_eq!(
            err,
            json!({"id": "x", "error": {"kind": "not_found", "message": "unknown tool: y"}})
        );
    }

    #[test]
    fn server_frames_decode_back_by_shape() {
        let pong: ServerFrame = serde_json::from_str(r#"{"op":"pong"}"#).expect("pong");
        assert_eq!(pong, ServerFrame::Event(ServerEvent::Pong));
        let response: ServerFrame =
            serde_json::from_str(r#"{"id":2,"result":{"ok":true}}"#).expect("response");
        assert!(matches!(response, ServerFrame::Response(_)));
    }
}
