// voice-gateway-mcp/src/telemetry.rs
// ============================================================================
// Module: Gateway Telemetry
// Description: Metric hooks for tool dispatch.
// Purpose: Provide request counters and latency buckets without hard deps.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A thin metrics interface so deployments can plug in Prometheus or
//! OpenTelemetry. Labels are stable strings; tool names are only recorded when
//! they resolved to a registered tool, so caller-supplied garbage never
//! becomes a metric label.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;

use crate::error::ErrorKind;
use crate::session::TransportKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Latency buckets in milliseconds for dispatch histograms.
pub const GATEWAY_LATENCY_BUCKETS_MS: &[u64] =
    &[1, 2, 5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000, 60_000];

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Request method classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMethod {
    /// Tool call.
    CallTool,
    /// Tool listing.
    ListTools,
    /// Frame that failed to decode.
    Invalid,
}

impl GatewayMethod {
    /// Returns a stable label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CallTool => "call_tool",
            Self::ListTools => "list_tools",
            Self::Invalid => "invalid",
        }
    }
}

/// Request outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayOutcome {
    /// Result response.
    Ok,
    /// Error response.
    Error,
}

/// Metric event for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayMetricEvent {
    /// Transport the request arrived on.
    pub transport: TransportKind,
    /// Method classification.
    pub method: GatewayMethod,
    /// Resolved tool name.
    pub tool: Option<String>,
    /// Outcome.
    pub outcome: GatewayOutcome,
    /// Error kind for error outcomes.
    pub error_kind: Option<ErrorKind>,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for dispatch.
pub trait GatewayMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: GatewayMetricEvent);
    /// Records a latency observation.
    fn record_latency(&self, event: GatewayMetricEvent, latency: Duration);
}

/// Metrics sink that discards everything.
pub struct NoopMetrics;

impl GatewayMetrics for NoopMetrics {
    fn record_request(&self, _event: GatewayMetricEvent) {}

    fn record_latency(&self, _event: GatewayMetricEvent, _latency: Duration) {}
}

/// Returns the index of the bucket a latency falls into. Latencies above the
/// last bound land in the overflow bucket at `GATEWAY_LATENCY_BUCKETS_MS.len()`.
#[must_use]
pub fn latency_bucket(latency: Duration) -> usize {
    let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
    GATEWAY_LATENCY_BUCKETS_MS
        .iter()
        .position(|bound| millis <= *bound)
        .unwrap_or(GATEWAY_LATENCY_BUCKETS_MS.len())
}
