//! Config validation tests for voice-gateway-config.
// voice-gateway-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Validate defaults, cross-field rules, and file loading.
// Purpose: Ensure invalid configuration fails closed before startup.
// =============================================================================

use std::io::Write;

use voice_gateway_config::ConfigError;
use voice_gateway_config::GatewayConfig;
use voice_gateway_config::TokenConfig;
use voice_gateway_config::ToolTimeoutConfig;
use voice_gateway_config::TransportSelection;
use voice_gateway_config::VoiceConfig;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn defaults_are_valid() -> TestResult {
    let config = GatewayConfig::default();
    config.validate().map_err(|err| err.to_string())?;
    if config.server.transport != TransportSelection::Stdio {
        return Err("default transport should be stdio".to_string());
    }
    if config.tools.voices.len() != 2 {
        return Err("default catalog should hold two voices".to_string());
    }
    if config.session.replay_window_ms != 30_000 {
        return Err("default replay window should be 30s".to_string());
    }
    Ok(())
}

#[test]
fn empty_document_parses_to_defaults() -> TestResult {
    let config = GatewayConfig::parse("").map_err(|err| err.to_string())?;
    if config.bridge.workers != 4 || config.bridge.queue_capacity != 16 {
        return Err("bridge defaults not applied".to_string());
    }
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() -> TestResult {
    match GatewayConfig::parse("[server]\ntransprot = \"stdio\"\n") {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn stream_transport_requires_bind() -> TestResult {
    let mut config = GatewayConfig::default();
    config.server.transport = TransportSelection::Stream;
    assert_invalid(config.validate(), "stream transport requires bind address")
}

#[test]
fn non_loopback_bind_requires_tokens() -> TestResult {
    let mut config = GatewayConfig::default();
    config.server.transport = TransportSelection::Both;
    config.server.bind = Some("0.0.0.0:8080".to_string());
    assert_invalid(config.validate(), "non-loopback bind disallowed")?;
    config.auth.tokens = vec![TokenConfig {
        token: "secret-token-value".to_string(),
        subject: "studio".to_string(),
        permissions: vec!["voices:read".to_string()],
    }];
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn bridge_workers_must_be_positive() -> TestResult {
    let mut config = GatewayConfig::default();
    config.bridge.workers = 0;
    assert_invalid(config.validate(), "bridge.workers must be between 1")
}

#[test]
fn bridge_timeout_is_bounded() -> TestResult {
    let mut config = GatewayConfig::default();
    config.bridge.default_timeout_ms = 1;
    assert_invalid(config.validate(), "bridge.default_timeout_ms must be between")
}

#[test]
fn duplicate_tokens_are_rejected() -> TestResult {
    let mut config = GatewayConfig::default();
    let token = TokenConfig {
        token: "abc123".to_string(),
        subject: "one".to_string(),
        permissions: Vec::new(),
    };
    config.auth.tokens = vec![token.clone(), token];
    assert_invalid(config.validate(), "duplicate auth token")
}

#[test]
fn tokens_reject_whitespace() -> TestResult {
    let mut config = GatewayConfig::default();
    config.auth.tokens = vec![TokenConfig {
        token: "abc 123".to_string(),
        subject: "one".to_string(),
        permissions: Vec::new(),
    }];
    assert_invalid(config.validate(), "must not contain whitespace")
}

#[test]
fn permissions_reject_invalid_characters() -> TestResult {
    let mut config = GatewayConfig::default();
    config.auth.stdio_permissions = vec!["speech generate".to_string()];
    assert_invalid(config.validate(), "auth.stdio_permissions contains invalid characters")
}

#[test]
fn default_voice_must_exist() -> TestResult {
    let mut config = GatewayConfig::default();
    config.tools.default_voice = "voice_z".to_string();
    assert_invalid(config.validate(), "tools.default_voice must name a configured voice")
}

#[test]
fn voice_ids_must_be_unique() -> TestResult {
    let mut config = GatewayConfig::default();
    config.tools.voices.push(VoiceConfig {
        id: "voice_a".to_string(),
        display_name: "Again".to_string(),
        locale: "en-GB".to_string(),
    });
    assert_invalid(config.validate(), "duplicate voice id: voice_a")
}

#[test]
fn timeout_overrides_are_unique_and_resolvable() -> TestResult {
    let mut config = GatewayConfig::default();
    config.tools.timeouts = vec![ToolTimeoutConfig {
        name: "generate_speech".to_string(),
        timeout_ms: 2_000,
    }];
    config.validate().map_err(|err| err.to_string())?;
    let resolved = config.tools.timeout_for("generate_speech").map(|d| d.as_millis());
    if resolved != Some(2_000) {
        return Err(format!("unexpected override {resolved:?}"));
    }
    config.tools.timeouts.push(ToolTimeoutConfig {
        name: "generate_speech".to_string(),
        timeout_ms: 3_000,
    });
    assert_invalid(config.validate(), "duplicate timeout override: generate_speech")
}

#[test]
fn replay_buffer_depth_is_bounded() -> TestResult {
    let mut config = GatewayConfig::default();
    config.session.replay_max_responses = 0;
    assert_invalid(config.validate(), "session.replay_max_responses must be between 1")
}

#[test]
fn load_reads_toml_from_disk() -> TestResult {
    let mut file = tempfile::NamedTempFile::new().map_err(|err| err.to_string())?;
    let contents = r#"
[server]
transport = "both"
bind = "127.0.0.1:7410"

[bridge]
workers = 2
queue_capacity = 0

[session]
replay_window_ms = 5000

[[auth.tokens]]
token = "studio-token"
subject = "studio"
permissions = ["voices:read", "speech:generate"]

[tools]
default_voice = "narrator"
status_message = "all systems nominal"

[[tools.voices]]
id = "narrator"
display_name = "Narrator"
locale = "en-US"
"#;
    file.write_all(contents.as_bytes()).map_err(|err| err.to_string())?;
    let config = GatewayConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.server.transport != TransportSelection::Both {
        return Err("transport not parsed".to_string());
    }
    if config.bridge.queue_capacity != 0 || config.bridge.workers != 2 {
        return Err("bridge not parsed".to_string());
    }
    if config.tools.voices.len() != 1 || config.tools.default_voice != "narrator" {
        return Err("voices not parsed".to_string());
    }
    if config.auth.tokens.first().map(|token| token.subject.as_str()) != Some("studio") {
        return Err("tokens not parsed".to_string());
    }
    Ok(())
}

#[test]
fn load_reports_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let missing = dir.path().join("absent.toml");
    match GatewayConfig::load(Some(&missing)) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}
