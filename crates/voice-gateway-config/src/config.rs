// voice-gateway-config/src/config.rs
// ============================================================================
// Module: Voice Gateway Configuration
// Description: Configuration loading and validation for the voice gateway.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed: the gateway refuses to start
//! rather than serving with a partially understood policy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "voice-gateway.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "VOICE_GATEWAY_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured bearer tokens.
pub(crate) const MAX_AUTH_TOKENS: usize = 64;
/// Maximum length of a bearer token.
pub(crate) const MAX_AUTH_TOKEN_LENGTH: usize = 256;
/// Maximum length of a permission or subject label.
pub(crate) const MAX_LABEL_LENGTH: usize = 128;
/// Maximum number of permissions attached to a single credential.
pub(crate) const MAX_PERMISSIONS: usize = 64;
/// Maximum number of bridge workers.
pub(crate) const MAX_BRIDGE_WORKERS: usize = 256;
/// Maximum bridge queue capacity.
pub(crate) const MAX_BRIDGE_QUEUE: usize = 4096;
/// Minimum handler timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 10;
/// Maximum handler timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 600_000;
/// Maximum number of buffered responses per detached stream session.
pub(crate) const MAX_REPLAY_RESPONSES: usize = 65_536;
/// Maximum number of catalog voices.
pub(crate) const MAX_VOICES: usize = 1024;
/// Maximum frame size accepted on any transport.
pub(crate) const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Voice gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Server transport configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Execution bridge sizing.
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Connection lifecycle timers and replay buffering.
    #[serde(default)]
    pub session: SessionConfig,
    /// Credential configuration for both transports.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Built-in tool configuration.
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl GatewayConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::parse(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate(&self.auth)?;
        self.bridge.validate()?;
        self.session.validate()?;
        self.auth.validate()?;
        self.audit.validate()?;
        self.tools.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Transports activated at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportSelection {
    /// Local pipe over stdin/stdout only.
    #[default]
    Stdio,
    /// Remote HTTP event stream only.
    Stream,
    /// Both transports share one registry and dispatch engine.
    Both,
}

impl TransportSelection {
    /// Returns true when the local pipe transport is active.
    #[must_use]
    pub const fn includes_stdio(self) -> bool {
        matches!(self, Self::Stdio | Self::Both)
    }

    /// Returns true when the remote stream transport is active.
    #[must_use]
    pub const fn includes_stream(self) -> bool {
        matches!(self, Self::Stream | Self::Both)
    }
}

/// Server transport configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Transports to activate.
    #[serde(default)]
    pub transport: TransportSelection,
    /// Bind address for the stream transport.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum size of a single inbound frame in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Maximum in-flight requests on a single connection.
    #[serde(default = "default_max_inflight")]
    pub max_inflight_per_connection: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportSelection::Stdio,
            bind: None,
            max_frame_bytes: default_max_frame_bytes(),
            max_inflight_per_connection: default_max_inflight(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the address cannot be parsed.
    pub fn bind_addr(&self) -> Result<Option<SocketAddr>, ConfigError> {
        let Some(bind) = self.bind.as_deref() else {
            return Ok(None);
        };
        let trimmed = bind.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<SocketAddr>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid("invalid bind address".to_string()))
    }

    /// Validates server transport configuration.
    fn validate(&self, auth: &AuthConfig) -> Result<(), ConfigError> {
        if self.max_frame_bytes == 0 || self.max_frame_bytes > MAX_FRAME_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_frame_bytes must be between 1 and {MAX_FRAME_BYTES}"
            )));
        }
        if self.max_inflight_per_connection == 0 {
            return Err(ConfigError::Invalid(
                "server.max_inflight_per_connection must be greater than zero".to_string(),
            ));
        }
        let addr = self.bind_addr()?;
        if self.transport.includes_stream() {
            let addr = addr.ok_or_else(|| {
                ConfigError::Invalid("stream transport requires bind address".to_string())
            })?;
            if !addr.ip().is_loopback() && auth.tokens.is_empty() {
                return Err(ConfigError::Invalid(
                    "non-loopback bind disallowed without bearer tokens".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Execution Bridge
// ============================================================================

/// Execution bridge sizing.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Number of workers allowed to run blocking handlers concurrently.
    #[serde(default = "default_bridge_workers")]
    pub workers: usize,
    /// Number of submissions allowed to wait for a worker.
    #[serde(default = "default_bridge_queue")]
    pub queue_capacity: usize,
    /// Handler timeout applied when a tool has no override.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            workers: default_bridge_workers(),
            queue_capacity: default_bridge_queue(),
            default_timeout_ms: default_timeout_ms(),
        }
    }
}

impl BridgeConfig {
    /// Returns the default handler timeout.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Validates bridge sizing.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 || self.workers > MAX_BRIDGE_WORKERS {
            return Err(ConfigError::Invalid(format!(
                "bridge.workers must be between 1 and {MAX_BRIDGE_WORKERS}"
            )));
        }
        if self.queue_capacity > MAX_BRIDGE_QUEUE {
            return Err(ConfigError::Invalid(format!(
                "bridge.queue_capacity must be at most {MAX_BRIDGE_QUEUE}"
            )));
        }
        validate_timeout("bridge.default_timeout_ms", self.default_timeout_ms)
    }
}

// ============================================================================
// SECTION: Sessions
// ============================================================================

/// Connection lifecycle timers and replay buffering.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Idle time after which a connection starts closing.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    /// Grace period for draining in-flight responses while closing.
    #[serde(default = "default_close_grace_ms")]
    pub close_grace_ms: u64,
    /// How long undelivered stream responses are retained for a reconnect.
    #[serde(default = "default_replay_window_ms")]
    pub replay_window_ms: u64,
    /// Maximum number of undelivered stream responses retained per session.
    #[serde(default = "default_replay_max_responses")]
    pub replay_max_responses: usize,
    /// Interval between stream session reaper passes.
    #[serde(default = "default_reap_interval_ms")]
    pub reap_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
            close_grace_ms: default_close_grace_ms(),
            replay_window_ms: default_replay_window_ms(),
            replay_max_responses: default_replay_max_responses(),
            reap_interval_ms: default_reap_interval_ms(),
        }
    }
}

impl SessionConfig {
    /// Returns the idle timeout.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Returns the close grace period.
    #[must_use]
    pub const fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }

    /// Returns the replay window.
    #[must_use]
    pub const fn replay_window(&self) -> Duration {
        Duration::from_millis(self.replay_window_ms)
    }

    /// Returns the reaper interval.
    #[must_use]
    pub const fn reap_interval(&self) -> Duration {
        Duration::from_millis(self.reap_interval_ms)
    }

    /// Validates session timers.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "session.idle_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.replay_window_ms == 0 {
            return Err(ConfigError::Invalid(
                "session.replay_window_ms must be greater than zero".to_string(),
            ));
        }
        if self.replay_max_responses == 0 || self.replay_max_responses > MAX_REPLAY_RESPONSES {
            return Err(ConfigError::Invalid(format!(
                "session.replay_max_responses must be between 1 and {MAX_REPLAY_RESPONSES}"
            )));
        }
        if self.reap_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "session.reap_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Auth
// ============================================================================

/// Credential configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Subject label attached to the local pipe caller.
    #[serde(default = "default_stdio_subject")]
    pub stdio_subject: String,
    /// Permissions granted to the local pipe caller.
    #[serde(default = "default_stdio_permissions")]
    pub stdio_permissions: Vec<String>,
    /// Bearer tokens accepted on the stream transport.
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            stdio_subject: default_stdio_subject(),
            stdio_permissions: default_stdio_permissions(),
            tokens: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Validates credential configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_label("auth.stdio_subject", &self.stdio_subject)?;
        validate_permissions("auth.stdio_permissions", &self.stdio_permissions)?;
        if self.tokens.len() > MAX_AUTH_TOKENS {
            return Err(ConfigError::Invalid("too many auth.tokens entries".to_string()));
        }
        let mut seen = BTreeSet::new();
        for token in &self.tokens {
            token.validate()?;
            if !seen.insert(token.token.as_str()) {
                return Err(ConfigError::Invalid("duplicate auth token".to_string()));
            }
        }
        Ok(())
    }
}

/// Bearer token entry for the stream transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// Opaque bearer token value.
    pub token: String,
    /// Subject label reported for callers presenting this token.
    pub subject: String,
    /// Permissions granted to callers presenting this token.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl TokenConfig {
    /// Validates a token entry.
    fn validate(&self) -> Result<(), ConfigError> {
        let token = self.token.trim();
        if token.is_empty() || token.len() > MAX_AUTH_TOKEN_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "auth token must be 1..={MAX_AUTH_TOKEN_LENGTH} bytes"
            )));
        }
        if token.len() != self.token.len() || token.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid("auth token must not contain whitespace".to_string()));
        }
        validate_label("auth.tokens.subject", &self.subject)?;
        validate_permissions("auth.tokens.permissions", &self.permissions)
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines). Defaults to stderr.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tools
// ============================================================================

/// Built-in tool configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Voice used when `generate_speech` omits `voice_id`.
    #[serde(default = "default_voice")]
    pub default_voice: String,
    /// Status string returned by `get_server_status`.
    #[serde(default = "default_status_message")]
    pub status_message: String,
    /// Voice catalog served by `list_voices`, in order.
    #[serde(default = "default_voices")]
    pub voices: Vec<VoiceConfig>,
    /// Per-tool handler timeout overrides.
    #[serde(default)]
    pub timeouts: Vec<ToolTimeoutConfig>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            default_voice: default_voice(),
            status_message: default_status_message(),
            voices: default_voices(),
            timeouts: Vec::new(),
        }
    }
}

impl ToolsConfig {
    /// Returns the timeout override for a tool, if any.
    #[must_use]
    pub fn timeout_for(&self, tool: &str) -> Option<Duration> {
        self.timeouts
            .iter()
            .find(|entry| entry.name == tool)
            .map(|entry| Duration::from_millis(entry.timeout_ms))
    }

    /// Validates tool configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.status_message.trim().is_empty() {
            return Err(ConfigError::Invalid("tools.status_message must be non-empty".to_string()));
        }
        if self.voices.is_empty() || self.voices.len() > MAX_VOICES {
            return Err(ConfigError::Invalid(format!(
                "tools.voices must contain 1..={MAX_VOICES} entries"
            )));
        }
        let mut ids = BTreeSet::new();
        for voice in &self.voices {
            voice.validate()?;
            if !ids.insert(voice.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate voice id: {}", voice.id)));
            }
        }
        if !ids.contains(self.default_voice.as_str()) {
            return Err(ConfigError::Invalid(
                "tools.default_voice must name a configured voice".to_string(),
            ));
        }
        let mut names = BTreeSet::new();
        for entry in &self.timeouts {
            validate_label("tools.timeouts.name", &entry.name)?;
            validate_timeout("tools.timeouts.timeout_ms", entry.timeout_ms)?;
            if !names.insert(entry.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate timeout override: {}",
                    entry.name
                )));
            }
        }
        Ok(())
    }
}

/// Catalog voice entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceConfig {
    /// Stable voice identifier.
    pub id: String,
    /// Human-readable voice name.
    pub display_name: String,
    /// BCP-47 locale tag.
    pub locale: String,
}

impl VoiceConfig {
    /// Validates a voice entry.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_label("tools.voices.id", &self.id)?;
        if self.display_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "tools.voices.display_name must be non-empty".to_string(),
            ));
        }
        validate_label("tools.voices.locale", &self.locale)
    }
}

/// Per-tool timeout override.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolTimeoutConfig {
    /// Tool name.
    pub name: String,
    /// Timeout in milliseconds.
    pub timeout_ms: u64,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} component too long")));
        }
    }
    Ok(())
}

/// Validates a short identifier-like label.
fn validate_label(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.len() > MAX_LABEL_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} must be 1..={MAX_LABEL_LENGTH} bytes"
        )));
    }
    let valid = value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':' | '@'));
    if !valid {
        return Err(ConfigError::Invalid(format!("{field} contains invalid characters")));
    }
    Ok(())
}

/// Validates a permission list.
fn validate_permissions(field: &str, permissions: &[String]) -> Result<(), ConfigError> {
    if permissions.len() > MAX_PERMISSIONS {
        return Err(ConfigError::Invalid(format!("{field} has too many entries")));
    }
    for permission in permissions {
        validate_label(field, permission)?;
    }
    Ok(())
}

/// Validates a handler timeout in milliseconds.
fn validate_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
        )));
    }
    Ok(())
}

/// Default maximum frame size.
pub(crate) const fn default_max_frame_bytes() -> usize {
    1024 * 1024
}

/// Default maximum in-flight requests per connection.
pub(crate) const fn default_max_inflight() -> usize {
    64
}

/// Default bridge worker count.
pub(crate) const fn default_bridge_workers() -> usize {
    4
}

/// Default bridge queue capacity.
pub(crate) const fn default_bridge_queue() -> usize {
    16
}

/// Default handler timeout.
pub(crate) const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default idle timeout.
pub(crate) const fn default_idle_timeout_ms() -> u64 {
    300_000
}

/// Default close grace period.
pub(crate) const fn default_close_grace_ms() -> u64 {
    5_000
}

/// Default replay window for detached stream sessions.
pub(crate) const fn default_replay_window_ms() -> u64 {
    30_000
}

/// Default replay buffer depth.
pub(crate) const fn default_replay_max_responses() -> usize {
    256
}

/// Default reaper interval.
pub(crate) const fn default_reap_interval_ms() -> u64 {
    1_000
}

/// Default audit enablement.
pub(crate) const fn default_audit_enabled() -> bool {
    true
}

/// Default local pipe subject.
pub(crate) fn default_stdio_subject() -> String {
    "stdio".to_string()
}

/// Default local pipe permissions.
pub(crate) fn default_stdio_permissions() -> Vec<String> {
    vec!["voices:read".to_string(), "speech:generate".to_string()]
}

/// Default voice identifier.
pub(crate) fn default_voice() -> String {
    "voice_a".to_string()
}

/// Default status message.
pub(crate) fn default_status_message() -> String {
    "voice gateway operational".to_string()
}

/// Default two-voice catalog.
pub(crate) fn default_voices() -> Vec<VoiceConfig> {
    vec![
        VoiceConfig {
            id: "voice_a".to_string(),
            display_name: "Aria".to_string(),
            locale: "en-US".to_string(),
        },
        VoiceConfig {
            id: "voice_b".to_string(),
            display_name: "Bastien".to_string(),
            locale: "fr-FR".to_string(),
        },
    ]
}
