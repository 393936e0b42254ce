// voice-gateway-mcp/src/config.rs
// ============================================================================
// Module: Gateway Configuration (Re-export)
// Description: Re-export canonical voice gateway config types.
// Purpose: Keep one source of truth for config semantics.
// Dependencies: voice-gateway-config
// ============================================================================

//! ## Overview
//! Re-exports the configuration model from `voice-gateway-config` so gateway
//! modules and downstream callers share one definition.

/// Re-export canonical config types and helpers.
pub use voice_gateway_config::*;
