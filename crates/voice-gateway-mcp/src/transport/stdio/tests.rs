// voice-gateway-mcp/src/transport/stdio/tests.rs
// ============================================================================
// Module: Local-Pipe Transport Unit Tests
// Description: Framing and connection lifecycle over in-memory streams.
// Purpose: Validate line framing, handshake, and close handling.
// Dependencies: voice-gateway-mcp, tokio
// ============================================================================

//! ## Overview
//! Drives [`PipeAdapter::serve`] with byte-slice input and a duplex output
//! stream, then inspects the emitted JSON lines.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only framing assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use tokio::io::AsyncReadExt;

use super::*;
use crate::auth::ConfigCredentialProvider;
use crate::auth::PermissionChecker;
use crate::bridge::ExecutionBridge;
use crate::config::AuthConfig;
use crate::registry::HandlerError;
use crate::registry::RegistryBuilder;
use crate::registry::ToolDescriptor;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn limits() -> PipeLimits {
    PipeLimits {
        max_frame_bytes: 256,
        max_inflight: 4,
        idle_timeout: Duration::from_secs(5),
        close_grace: Duration::from_secs(2),
    }
}

fn adapter() -> PipeAdapter {
    let mut builder = RegistryBuilder::new();
    builder.register(ToolDescriptor {
        name: "echo".to_string(),
        description: "echo text".to_string(),
        input_schema: json!({
            "type": "object",
            "required": ["text"],
            "properties": { "text": { "type": "string" } }
        }),
        output_schema: json!({ "type": "string" }),
        required_permission: None,
        timeout: None,
        handler: Arc::new(|arguments: Value| -> Result<Value, HandlerError> {
            Ok(arguments["text"].clone())
        }),
    });
    let engine = DispatchEngine::new(
        builder.build().expect("registry"),
        PermissionChecker::default(),
        ExecutionBridge::new(2, 4),
        Duration::from_secs(1),
    );
    PipeAdapter::new(
        Arc::new(engine),
        Arc::new(ConfigCredentialProvider::from_config(&AuthConfig::default())),
        limits(),
    )
}

/// Serves `input` to completion and returns the summary and output frames.
async fn run(input: &str) -> (SessionSummary, Vec<Value>) {
    let (mut client, server) = tokio::io::duplex(1 << 20);
    let summary = adapter().serve(input.as_bytes(), server).await.expect("serve");
    let mut output = String::new();
    client.read_to_string(&mut output).await.expect("read output");
    let frames = output
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    (summary, frames)
}

fn find_by_id<'a>(frames: &'a [Value], id: &Value) -> &'a Value {
    frames.iter().find(|frame| frame.get("id") == Some(id)).expect("frame with id")
}

// ============================================================================
// SECTION: Framing Tests
// ============================================================================

#[tokio::test]
async fn read_frame_splits_lines_across_small_buffers() {
    let input = b"first\r\nsecond\nthird";
    let mut reader = BufReader::with_capacity(3, &input[..]);
    let mut lines = Vec::new();
    loop {
        match read_frame(&mut reader, 64).await.expect("read") {
            FrameRead::Line(bytes) => lines.push(String::from_utf8(bytes).expect("utf8")),
            FrameRead::Oversized => panic!("unexpected oversized frame"),
            FrameRead::Eof => break,
        }
    }
    assert_eq!(lines, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn oversized_frame_is_consumed_without_losing_framing() {
    let input = format!("{}\nnext\n", "x".repeat(40));
    let mut reader = BufReader::with_capacity(8, input.as_bytes());
    assert!(matches!(read_frame(&mut reader, 16).await.expect("read"), FrameRead::Oversized));
    match read_frame(&mut reader, 16).await.expect("read") {
        FrameRead::Line(bytes) => assert_eq!(bytes, b"next"),
        _ => panic!("expected next line"),
    }
    assert!(matches!(read_frame(&mut reader, 16).await.expect("read"), FrameRead::Eof));
}

#[test]
fn blank_lines_are_detected() {
    assert!(is_blank(b""));
    assert!(is_blank(b" \t "));
    assert!(!is_blank(b" {}"));
}

// ============================================================================
// SECTION: Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn first_frame_must_be_hello() {
    let (summary, frames) = run("{\"id\":1,\"tool\":\"echo\",\"arguments\":{\"text\":\"hi\"}}\n").await;
    assert_eq!(summary.close_reason, Some(CloseReason::HandshakeFailed));
    assert_eq!(summary.requests, 0);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["id"], Value::Null);
    assert_eq!(frames[0]["error"]["kind"], "protocol_error");
}

#[tokio::test]
async fn unsupported_protocol_version_fails_handshake() {
    let (summary, frames) = run("{\"op\":\"hello\",\"protocol\":99}\n").await;
    assert_eq!(summary.close_reason, Some(CloseReason::HandshakeFailed));
    assert_eq!(frames[0]["error"]["kind"], "protocol_error");
}

#[tokio::test]
async fn session_serves_calls_controls_and_malformed_lines() {
    let input = [
        r#"{"op":"hello","protocol":1,"client":"unit"}"#,
        r#"{"id":"a","tool":"echo","arguments":{"text":"hello"}}"#,
        "not json at all",
        "",
        r#"{"op":"list_tools","id":7}"#,
        r#"{"op":"ping"}"#,
        r#"{"op":"close"}"#,
    ]
    .join("\n");
    let (summary, frames) = run(&format!("{input}\n")).await;

    assert_eq!(frames[0]["op"], "ready");
    assert_eq!(frames[0]["protocol"], 1);
    assert_eq!(find_by_id(&frames, &json!("a"))["result"], "hello");
    assert_eq!(find_by_id(&frames, &json!(7))["result"]["tools"][0]["name"], "echo");
    let malformed = find_by_id(&frames, &Value::Null);
    assert_eq!(malformed["error"]["kind"], "protocol_error");
    assert!(frames.iter().any(|frame| frame["op"] == "pong"));
    let closing = frames.iter().find(|frame| frame["op"] == "closing").expect("closing event");
    assert_eq!(closing["reason"], "client_close");

    assert_eq!(summary.requests, 1);
    assert_eq!(summary.protocol_errors, 1);
    assert_eq!(summary.close_reason, Some(CloseReason::ClientClose));
}

#[tokio::test]
async fn second_hello_is_a_protocol_violation() {
    let input = concat!(
        "{\"op\":\"hello\",\"protocol\":1}\n",
        "{\"op\":\"hello\",\"protocol\":1}\n",
        "{\"id\":1,\"tool\":\"echo\",\"arguments\":{\"text\":\"late\"}}\n",
    );
    let (summary, frames) = run(input).await;
    assert_eq!(summary.close_reason, Some(CloseReason::ProtocolViolation));
    assert_eq!(summary.requests, 0);
    assert!(frames.iter().all(|frame| frame.get("result").is_none()));
}

#[tokio::test]
async fn end_of_stream_drains_inflight_calls() {
    let input = concat!(
        "{\"op\":\"hello\",\"protocol\":1}\n",
        "{\"id\":1,\"tool\":\"echo\",\"arguments\":{\"text\":\"one\"}}\n",
        "{\"id\":2,\"tool\":\"echo\",\"arguments\":{\"text\":\"two\"}}\n",
    );
    let (summary, frames) = run(input).await;
    assert_eq!(summary.close_reason, Some(CloseReason::EndOfStream));
    assert_eq!(summary.cancelled, 0);
    assert_eq!(find_by_id(&frames, &json!(1))["result"], "one");
    assert_eq!(find_by_id(&frames, &json!(2))["result"], "two");
}

#[tokio::test]
async fn oversized_line_yields_protocol_error_and_reading_resumes() {
    let input = format!(
        "{{\"op\":\"hello\",\"protocol\":1}}\n{{\"id\":1,\"tool\":\"echo\",\"arguments\":{{\"text\":\"{}\"}}}}\n{{\"id\":2,\"tool\":\"echo\",\"arguments\":{{\"text\":\"ok\"}}}}\n",
        "y".repeat(400)
    );
    let (summary, frames) = run(&input).await;
    assert_eq!(summary.protocol_errors, 1);
    assert_eq!(find_by_id(&frames, &Value::Null)["error"]["kind"], "protocol_error");
    assert_eq!(find_by_id(&frames, &json!(2))["result"], "ok");
}
