// voice-gateway-mcp/src/dispatch.rs
// ============================================================================
// Module: Dispatch Engine
// Description: Transport-agnostic resolve/authorize/execute pipeline.
// Purpose: Turn every request into exactly one response, never a crash.
// Dependencies: serde_json, tokio-util
// ============================================================================

//! ## Overview
//! [`DispatchEngine::handle`] runs one request through a fixed pipeline:
//! 1. resolve the tool (`not_found`);
//! 2. check the required permission (`forbidden`);
//! 3. validate arguments against the input schema (`validation_error`);
//! 4. run the handler through the [`ExecutionBridge`] with the tool's timeout;
//! 5. validate the result against the output schema (`upstream_error`).
//!
//! The handler is never invoked when steps 1-3 fail. Bridge failures map to
//! `overloaded`, `timeout`, `cancelled`, or `upstream_error`; backend error
//! text goes to the audit sink only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::audit::AuditEvent;
use crate::audit::AuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::ToolCallAuditEvent;
use crate::audit::now_ms;
use crate::auth::PermissionChecker;
use crate::bridge::BridgeError;
use crate::bridge::ExecutionBridge;
use crate::error::ToolError;
use crate::protocol::RequestId;
use crate::protocol::ToolListing;
use crate::protocol::ToolRequest;
use crate::protocol::ToolResponse;
use crate::registry::HandlerError;
use crate::registry::ToolRegistry;
use crate::session::ConnectionContext;
use crate::telemetry::GatewayMethod;
use crate::telemetry::GatewayMetricEvent;
use crate::telemetry::GatewayMetrics;
use crate::telemetry::GatewayOutcome;
use crate::telemetry::NoopMetrics;

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Shared dispatch engine.
pub struct DispatchEngine {
    /// Frozen tool registry.
    registry: Arc<ToolRegistry>,
    /// Permission checker.
    checker: PermissionChecker,
    /// Execution bridge.
    bridge: ExecutionBridge,
    /// Timeout for tools without an override.
    default_timeout: Duration,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
    /// Metrics sink.
    metrics: Arc<dyn GatewayMetrics>,
}

/// Dispatch failure with optional internal detail.
struct Failure {
    /// Caller-visible error.
    error: ToolError,
    /// Internal diagnostic detail for the audit log.
    detail: Option<String>,
}

impl From<ToolError> for Failure {
    fn from(error: ToolError) -> Self {
        Self {
            error,
            detail: None,
        }
    }
}

impl DispatchEngine {
    /// Creates an engine with no-op audit and metrics sinks.
    #[must_use]
    pub fn new(
        registry: Arc<ToolRegistry>,
        checker: PermissionChecker,
        bridge: ExecutionBridge,
        default_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            checker,
            bridge,
            default_timeout,
            audit: Arc::new(NoopAuditSink),
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn GatewayMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the frozen registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Returns the audit sink shared with transport adapters.
    #[must_use]
    pub fn audit(&self) -> Arc<dyn AuditSink> {
        Arc::clone(&self.audit)
    }

    /// Returns the execution bridge.
    #[must_use]
    pub const fn bridge(&self) -> &ExecutionBridge {
        &self.bridge
    }

    /// Returns the tool listing in registration order.
    #[must_use]
    pub fn list_tools(&self) -> ToolListing {
        ToolListing {
            tools: self.registry.definitions(),
        }
    }

    /// Answers a `list_tools` control frame.
    #[must_use]
    pub fn list_tools_response(&self, connection: &ConnectionContext, id: RequestId) -> ToolResponse {
        let response = match serde_json::to_value(self.list_tools()) {
            Ok(listing) => ToolResponse::success(id, listing),
            Err(_) => ToolResponse::failure(Some(id), ToolError::upstream()),
        };
        self.record_metrics(connection, GatewayMethod::ListTools, None, &response, Duration::ZERO);
        response
    }

    /// Records a frame that failed to decode.
    pub fn record_protocol_error(&self, connection: &ConnectionContext, response: &ToolResponse) {
        self.record_metrics(connection, GatewayMethod::Invalid, None, response, Duration::ZERO);
    }

    /// Handles one tool call. Always returns a response.
    pub async fn handle(
        &self,
        connection: &ConnectionContext,
        request: ToolRequest,
        cancel: CancellationToken,
    ) -> ToolResponse {
        let started = Instant::now();
        let ToolRequest {
            id,
            tool,
            arguments,
        } = request;
        let (response, detail) = match self.execute(connection, &tool, arguments, cancel).await {
            Ok(result) => (ToolResponse::success(id.clone(), result), None),
            Err(failure) => (ToolResponse::failure(Some(id.clone()), failure.error), failure.detail),
        };
        let latency = started.elapsed();
        let resolved = self.registry.resolve(&tool).map(|entry| entry.name().to_string());
        self.record_metrics(connection, GatewayMethod::CallTool, resolved, &response, latency);
        self.audit.record(&AuditEvent::ToolCall(ToolCallAuditEvent {
            timestamp_ms: now_ms(),
            transport: connection.transport,
            connection_id: connection.connection_id.clone(),
            request_id: id.to_string(),
            tool,
            subject: connection.credentials.subject().to_string(),
            outcome: outcome_of(&response),
            error_kind: response.error().map(|error| error.kind),
            latency_ms: latency.as_millis(),
            detail,
        }));
        response
    }

    /// Runs the dispatch pipeline.
    async fn execute(
        &self,
        connection: &ConnectionContext,
        tool: &str,
        arguments: Value,
        cancel: CancellationToken,
    ) -> Result<Value, Failure> {
        let entry = self.registry.resolve(tool).ok_or_else(|| ToolError::not_found(tool))?;
        let descriptor = entry.descriptor();
        if !self.checker.allows(&connection.credentials, descriptor.required_permission.as_ref()) {
            return Err(ToolError::forbidden().into());
        }
        entry
            .validate_input(&arguments)
            .map_err(|violations| ToolError::validation(join_violations("arguments", &violations)))?;

        let timeout = descriptor.timeout.unwrap_or(self.default_timeout);
        let result = self
            .bridge
            .submit(Arc::clone(&descriptor.handler), arguments, timeout, cancel)
            .await
            .map_err(map_bridge_error)?;

        entry.validate_output(&result).map_err(|violations| Failure {
            error: ToolError::upstream(),
            detail: Some(join_violations("result", &violations)),
        })?;
        Ok(result)
    }

    /// Emits request and latency metrics.
    fn record_metrics(
        &self,
        connection: &ConnectionContext,
        method: GatewayMethod,
        tool: Option<String>,
        response: &ToolResponse,
        latency: Duration,
    ) {
        let event = GatewayMetricEvent {
            transport: connection.transport,
            method,
            tool,
            outcome: outcome_of(response),
            error_kind: response.error().map(|error| error.kind),
        };
        self.metrics.record_request(event.clone());
        self.metrics.record_latency(event, latency);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps bridge failures to caller-visible errors.
fn map_bridge_error(error: BridgeError) -> Failure {
    match error {
        BridgeError::Overloaded => ToolError::overloaded().into(),
        BridgeError::Timeout => ToolError::timeout().into(),
        BridgeError::Cancelled => ToolError::cancelled().into(),
        BridgeError::Failed(HandlerError::InvalidArguments(message)) => {
            ToolError::validation(message).into()
        }
        BridgeError::Failed(err @ HandlerError::Backend(_)) => Failure {
            error: ToolError::upstream(),
            detail: Some(err.to_string()),
        },
        err @ BridgeError::Panicked(_) => Failure {
            error: ToolError::upstream(),
            detail: Some(err.to_string()),
        },
    }
}

/// Joins schema violations into one message.
fn join_violations(subject: &str, violations: &[String]) -> String {
    format!("{subject} failed schema validation: {}", violations.join("; "))
}

/// Classifies a response.
const fn outcome_of(response: &ToolResponse) -> GatewayOutcome {
    if response.error().is_some() { GatewayOutcome::Error } else { GatewayOutcome::Ok }
}
