// voice-gateway-mcp/src/lib.rs
// ============================================================================
// Module: Voice Gateway Library
// Description: Tool-serving gateway over local-pipe and remote-stream transports.
// Purpose: Expose voice capabilities as schema-typed, permission-gated tools.
// Dependencies: axum, jsonschema, serde, tokio, voice-gateway-config
// ============================================================================

//! ## Overview
//! `voice-gateway-mcp` resolves tool calls against a frozen registry,
//! authorizes them per request, validates arguments and results against JSON
//! schemas, and runs handlers on a bounded blocking pool. The same dispatch
//! engine serves newline-delimited JSON over stdin/stdout and an HTTP
//! event-stream transport.
//!
//! Security posture: every inbound frame is untrusted. Failures are returned
//! as typed error responses; internal detail goes to the audit sink only.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod bridge;
pub mod capabilities;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod tools;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth::CredentialContext;
pub use auth::Permission;
pub use auth::PermissionChecker;
pub use bridge::ExecutionBridge;
pub use dispatch::DispatchEngine;
pub use error::ErrorKind;
pub use error::ToolError;
pub use protocol::RequestId;
pub use protocol::ToolRequest;
pub use protocol::ToolResponse;
pub use registry::RegistryBuilder;
pub use registry::ToolDescriptor;
pub use registry::ToolRegistry;
pub use server::GatewayError;
pub use server::GatewayServer;
pub use tools::Capabilities;
pub use transport::PipeAdapter;
pub use transport::SessionHub;
