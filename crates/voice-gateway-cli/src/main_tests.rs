// voice-gateway-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and config overrides.
// Purpose: Ensure CLI overrides are re-validated and fail closed.
// Dependencies: voice-gateway-cli main helpers
// ============================================================================

//! ## Overview
//! Validates subcommand parsing and the `--transport` override path.
//!
//! Security posture: CLI inputs are untrusted; overrides must not bypass
//! config validation.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write as _;

use clap::Parser;
use voice_gateway_config::GatewayConfig;
use voice_gateway_config::TransportSelection;

use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::ToolsCommand;
use super::TransportArg;
use super::apply_transport_override;
use super::load_config;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn serve_parses_transport_override() {
    let cli = Cli::try_parse_from(["voice-gateway", "serve", "--transport", "both"]).expect("parse");
    let Some(Commands::Serve(command)) = cli.command else {
        panic!("expected serve command");
    };
    assert_eq!(command.transport, Some(TransportArg::Both));
    assert!(command.config.is_none());
}

#[test]
fn unknown_transport_is_rejected() {
    assert!(Cli::try_parse_from(["voice-gateway", "serve", "--transport", "udp"]).is_err());
}

#[test]
fn nested_subcommands_parse() {
    let cli = Cli::try_parse_from(["voice-gateway", "config", "validate", "--config", "gw.toml"])
        .expect("parse");
    let Some(Commands::Config {
        command: ConfigCommand::Validate(args),
    }) = cli.command
    else {
        panic!("expected config validate");
    };
    assert_eq!(args.config.as_deref(), Some(std::path::Path::new("gw.toml")));

    let cli = Cli::try_parse_from(["voice-gateway", "tools", "list"]).expect("parse");
    assert!(matches!(
        cli.command,
        Some(Commands::Tools {
            command: ToolsCommand::List(_)
        })
    ));
}

#[test]
fn version_flag_needs_no_subcommand() {
    let cli = Cli::try_parse_from(["voice-gateway", "--version"]).expect("parse");
    assert!(cli.show_version);
    assert!(cli.command.is_none());
}

#[test]
fn transport_arg_maps_to_selection() {
    assert_eq!(TransportSelection::from(TransportArg::Stdio), TransportSelection::Stdio);
    assert_eq!(TransportSelection::from(TransportArg::Stream), TransportSelection::Stream);
    assert_eq!(TransportSelection::from(TransportArg::Both), TransportSelection::Both);
}

#[test]
fn stream_override_without_bind_fails_validation() {
    let mut config = GatewayConfig::default();
    let err = apply_transport_override(&mut config, Some(TransportArg::Stream))
        .expect_err("stream without bind");
    assert!(err.to_string().contains("bind"));
}

#[test]
fn stream_override_with_loopback_bind_is_accepted() {
    let mut config = GatewayConfig::default();
    config.server.bind = Some("127.0.0.1:0".to_string());
    apply_transport_override(&mut config, Some(TransportArg::Both)).expect("override");
    assert_eq!(config.server.transport, TransportSelection::Both);
}

#[test]
fn load_config_reads_file_and_applies_override() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[server]\nbind = \"127.0.0.1:0\"").expect("write");
    let config = load_config(Some(file.path()), Some(TransportArg::Stream)).expect("load");
    assert_eq!(config.server.transport, TransportSelection::Stream);

    let err = load_config(Some(&file.path().with_extension("missing")), None).expect_err("missing");
    assert!(err.to_string().starts_with("failed to load config"));
}
