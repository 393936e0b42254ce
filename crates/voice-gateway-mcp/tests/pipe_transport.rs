// voice-gateway-mcp/tests/pipe_transport.rs
// ============================================================================
// Module: Local-Pipe Transport Tests
// Description: Full gateway sessions over in-memory duplex streams.
// Purpose: Validate the pipe adapter against the built-in tool surface.
// Dependencies: voice-gateway-mcp, tokio
// ============================================================================

//! ## Overview
//! Each test serves one scripted session through [`GatewayServer::pipe`] and
//! inspects the JSON lines written back.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only pipe assertions."
)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use tokio::io::AsyncReadExt;
use voice_gateway_mcp::Capabilities;
use voice_gateway_mcp::GatewayServer;
use voice_gateway_mcp::PermissionChecker;
use voice_gateway_mcp::audit::NoopAuditSink;
use voice_gateway_mcp::capabilities::CapabilityError;
use voice_gateway_mcp::capabilities::SpeechSynthesizer;
use voice_gateway_mcp::capabilities::SynthesizedAudio;
use voice_gateway_mcp::capabilities::VoiceDescriptor;
use voice_gateway_mcp::session::CloseReason;
use voice_gateway_mcp::transport::SessionSummary;

use crate::common::quiet_config;

/// Synthesizer that blocks long enough to keep a request in flight.
struct SlowSynthesizer(Duration);

impl SpeechSynthesizer for SlowSynthesizer {
    fn synthesize(
        &self,
        _text: &str,
        _voice: &VoiceDescriptor,
    ) -> Result<SynthesizedAudio, CapabilityError> {
        std::thread::sleep(self.0);
        Ok(SynthesizedAudio {
            bytes: vec![1, 2, 3],
            mime_type: "audio/wav",
        })
    }
}

async fn run(server: &GatewayServer, lines: &[&str]) -> (SessionSummary, Vec<Value>) {
    let input = format!("{}\n", lines.join("\n"));
    let (mut client, writer) = tokio::io::duplex(1 << 20);
    let summary = server.pipe().serve(input.as_bytes(), writer).await.expect("serve");
    let mut output = String::new();
    client.read_to_string(&mut output).await.expect("read");
    let frames = output.lines().map(|line| serde_json::from_str(line).expect("json")).collect();
    (summary, frames)
}

fn by_id<'a>(frames: &'a [Value], id: &Value) -> Vec<&'a Value> {
    frames.iter().filter(|frame| frame.get("id") == Some(id)).collect()
}

#[tokio::test]
async fn built_in_session_round_trip() {
    let server = GatewayServer::from_config(quiet_config()).expect("server");
    let (summary, frames) = run(
        &server,
        &[
            r#"{"op":"hello","protocol":1,"client":"it"}"#,
            r#"{"op":"list_tools","id":"tools"}"#,
            r#"{"id":1,"tool":"get_server_status"}"#,
            r#"{"id":2,"tool":"list_voices","arguments":{}}"#,
            r#"{"id":3,"tool":"generate_speech","arguments":{"text":"hi","voice_id":"voice_b"}}"#,
            r#"{"id":4,"tool":"transcribe","arguments":{}}"#,
            r#"{"op":"close"}"#,
        ],
    )
    .await;

    assert_eq!(frames[0]["op"], "ready");
    let listing = by_id(&frames, &json!("tools"))[0];
    let names: Vec<&str> = listing["result"]["tools"]
        .as_array()
        .expect("tools")
        .iter()
        .filter_map(|tool| tool["name"].as_str())
        .collect();
    assert_eq!(names, vec!["list_voices", "generate_speech", "get_server_status"]);

    assert_eq!(by_id(&frames, &json!(1))[0]["result"], "voice gateway operational");
    assert_eq!(by_id(&frames, &json!(2))[0]["result"][1]["id"], "voice_b");
    assert_eq!(by_id(&frames, &json!(3))[0]["result"]["voice_id"], "voice_b");
    assert_eq!(by_id(&frames, &json!(4))[0]["error"]["kind"], "not_found");

    assert_eq!(summary.requests, 4);
    assert_eq!(summary.protocol_errors, 0);
    assert_eq!(summary.close_reason, Some(CloseReason::ClientClose));
}

#[tokio::test]
async fn duplicate_inflight_id_is_rejected_without_dispatch() {
    let mut capabilities = Capabilities::from_config(&quiet_config().tools);
    capabilities.synthesizer = Arc::new(SlowSynthesizer(Duration::from_millis(300)));
    let server = GatewayServer::create(
        &capabilities,
        PermissionChecker::default(),
        Arc::new(NoopAuditSink),
        quiet_config(),
    )
    .expect("server");
    let (_summary, frames) = run(
        &server,
        &[
            r#"{"op":"hello","protocol":1}"#,
            r#"{"id":"dup","tool":"generate_speech","arguments":{"text":"one"}}"#,
            r#"{"id":"dup","tool":"generate_speech","arguments":{"text":"two"}}"#,
        ],
    )
    .await;
    let responses = by_id(&frames, &json!("dup"));
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["kind"], "invalid_request");
    assert!(responses[1].get("result").is_some());
}

#[tokio::test]
async fn teardown_cancels_work_past_the_grace_period() {
    let mut config = quiet_config();
    config.session.close_grace_ms = 50;
    let mut capabilities = Capabilities::from_config(&config.tools);
    capabilities.synthesizer = Arc::new(SlowSynthesizer(Duration::from_millis(500)));
    let server =
        GatewayServer::create(&capabilities, PermissionChecker::default(), Arc::new(NoopAuditSink), config)
            .expect("server");
    let (summary, frames) = run(
        &server,
        &[
            r#"{"op":"hello","protocol":1}"#,
            r#"{"id":9,"tool":"generate_speech","arguments":{"text":"slow"}}"#,
            r#"{"op":"close"}"#,
        ],
    )
    .await;
    assert_eq!(summary.close_reason, Some(CloseReason::ClientClose));
    assert_eq!(summary.cancelled, 1);
    assert!(by_id(&frames, &json!(9)).is_empty());
}

#[tokio::test]
async fn malformed_lines_do_not_end_the_session() {
    let server = GatewayServer::from_config(quiet_config()).expect("server");
    let (summary, frames) = run(
        &server,
        &[
            r#"{"op":"hello","protocol":1}"#,
            r"[1,2,3]",
            r#"{"id":5,"bogus":true}"#,
            r#"{"id":6,"tool":"get_server_status"}"#,
        ],
    )
    .await;
    assert_eq!(summary.protocol_errors, 2);
    assert_eq!(by_id(&frames, &Value::Null)[0]["error"]["kind"], "protocol_error");
    assert_eq!(by_id(&frames, &json!(5))[0]["error"]["kind"], "protocol_error");
    assert!(by_id(&frames, &json!(6))[0].get("result").is_some());
    assert_eq!(summary.close_reason, Some(CloseReason::EndOfStream));
}
