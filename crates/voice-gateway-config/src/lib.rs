// voice-gateway-config/src/lib.rs
// ============================================================================
// Module: Voice Gateway Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for voice-gateway.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `voice-gateway-config` defines the canonical configuration model for the
//! voice tool gateway. It provides strict, fail-closed validation so a
//! misconfigured process never starts serving.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
