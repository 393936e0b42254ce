// voice-gateway-mcp/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared fixtures for gateway integration tests.
// Purpose: Build engines, callers, and observable fake handlers.
// Dependencies: voice-gateway-mcp
// ============================================================================

//! ## Overview
//! Fake handlers count their invocations so tests can assert that rejected
//! requests never reach a capability. The recording audit and metrics sinks
//! capture events in memory.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use voice_gateway_mcp::CredentialContext;
use voice_gateway_mcp::DispatchEngine;
use voice_gateway_mcp::ExecutionBridge;
use voice_gateway_mcp::Permission;
use voice_gateway_mcp::PermissionChecker;
use voice_gateway_mcp::RegistryBuilder;
use voice_gateway_mcp::ToolDescriptor;
use voice_gateway_mcp::audit::AuditEvent;
use voice_gateway_mcp::audit::AuditSink;
use voice_gateway_mcp::config::GatewayConfig;
use voice_gateway_mcp::registry::HandlerError;
use voice_gateway_mcp::registry::ToolHandler;
use voice_gateway_mcp::session::ConnectionContext;
use voice_gateway_mcp::session::TransportKind;
use voice_gateway_mcp::telemetry::GatewayMetricEvent;
use voice_gateway_mcp::telemetry::GatewayMetrics;

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handler that counts calls and returns a fixed value after an optional nap.
pub struct CountingHandler {
    /// Invocation count.
    pub calls: AtomicUsize,
    /// Value returned on every call.
    pub output: Value,
    /// Simulated blocking work.
    pub delay: Duration,
}

impl CountingHandler {
    /// Creates a handler returning `output` immediately.
    pub fn new(output: Value) -> Arc<Self> {
        Self::slow(output, Duration::ZERO)
    }

    /// Creates a handler that blocks for `delay` before returning.
    pub fn slow(output: Value, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            output,
            delay,
        })
    }

    /// Returns the number of invocations so far.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ToolHandler for CountingHandler {
    fn call(&self, _arguments: Value) -> Result<Value, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(self.output.clone())
    }
}

/// Descriptor for a counting tool with a single required `text` argument.
pub fn counting_tool(
    name: &str,
    permission: Option<&str>,
    handler: &Arc<CountingHandler>,
) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_string(),
        description: format!("counting tool {name}"),
        input_schema: json!({
            "type": "object",
            "required": ["text"],
            "properties": { "text": { "type": "string", "minLength": 1 } },
            "additionalProperties": false
        }),
        output_schema: json!({ "type": "string" }),
        required_permission: permission.map(Permission::new),
        timeout: None,
        handler: Arc::clone(handler) as Arc<dyn ToolHandler>,
    }
}

// ============================================================================
// SECTION: Engines and Callers
// ============================================================================

/// Builds an engine over `descriptors` with the given bridge sizing.
pub fn engine(
    descriptors: Vec<ToolDescriptor>,
    workers: usize,
    queue_capacity: usize,
    timeout: Duration,
) -> DispatchEngine {
    let mut builder = RegistryBuilder::new();
    for descriptor in descriptors {
        builder.register(descriptor);
    }
    DispatchEngine::new(
        builder.build().expect("registry"),
        PermissionChecker::default(),
        ExecutionBridge::new(workers, queue_capacity),
        timeout,
    )
}

/// Connection context for a pipe caller holding `permissions`.
pub fn caller(permissions: &[&str]) -> ConnectionContext {
    ConnectionContext {
        connection_id: "test-connection".to_string(),
        transport: TransportKind::Pipe,
        credentials: CredentialContext::new(
            "tester",
            permissions.iter().copied().map(Permission::new),
        ),
    }
}

/// Default config with audit output disabled.
pub fn quiet_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.audit.enabled = false;
    config
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Captured events.
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns a snapshot of captured events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Metrics sink that keeps request events in memory.
#[derive(Default)]
pub struct RecordingMetrics {
    /// Captured request events.
    requests: Mutex<Vec<GatewayMetricEvent>>,
    /// Number of latency observations.
    latencies: AtomicUsize,
}

impl RecordingMetrics {
    /// Returns a snapshot of captured request events.
    pub fn requests(&self) -> Vec<GatewayMetricEvent> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the number of latency observations.
    pub fn latency_count(&self) -> usize {
        self.latencies.load(Ordering::SeqCst)
    }
}

impl GatewayMetrics for RecordingMetrics {
    fn record_request(&self, event: GatewayMetricEvent) {
        self.requests.lock().unwrap().push(event);
    }

    fn record_latency(&self, _event: GatewayMetricEvent, _latency: Duration) {
        self.latencies.fetch_add(1, Ordering::SeqCst);
    }
}
