// voice-gateway-mcp/src/auth.rs
// ============================================================================
// Module: Credentials and Permissions
// Description: Credential resolution and per-request permission checks.
// Purpose: Apply one fail-closed authorization policy on every transport.
// Dependencies: sha2, subtle, voice-gateway-config
// ============================================================================

//! ## Overview
//! A [`CredentialProvider`] turns transport-level identity (the local pipe, or
//! a bearer token on the remote stream) into a [`CredentialContext`]. The
//! [`PermissionChecker`] then decides, per request, whether that context holds
//! a tool's required [`Permission`] by consulting an [`AuthorizationSource`].
//! Decisions are never cached; every call is checked independently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Write as _;
use std::net::IpAddr;
use std::sync::Arc;

use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::session::TransportKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted authorization header length.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;
/// Subject assigned to unauthenticated loopback stream callers.
const LOOPBACK_SUBJECT: &str = "loopback";

// ============================================================================
// SECTION: Permissions
// ============================================================================

/// Permission label required by a tool (for example `speech:generate`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Permission(String);

impl Permission {
    /// Creates a permission from its label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the permission label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Credential Context
// ============================================================================

/// Authenticated caller identity and granted permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialContext {
    /// Caller subject.
    subject: String,
    /// Permissions granted to the caller.
    permissions: BTreeSet<Permission>,
    /// Sha256 fingerprint of the presented token, when one was used.
    token_fingerprint: Option<String>,
}

impl CredentialContext {
    /// Creates a context for a subject and its granted permissions.
    #[must_use]
    pub fn new(subject: impl Into<String>, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            subject: subject.into(),
            permissions: permissions.into_iter().collect(),
            token_fingerprint: None,
        }
    }

    /// Returns a copy carrying the given token fingerprint.
    #[must_use]
    pub fn with_token_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.token_fingerprint = Some(fingerprint.into());
        self
    }

    /// Returns the caller subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the granted permissions.
    #[must_use]
    pub const fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    /// Returns the token fingerprint, if any.
    #[must_use]
    pub fn token_fingerprint(&self) -> Option<&str> {
        self.token_fingerprint.as_deref()
    }
}

/// Transport-level identity presented when a connection opens.
#[derive(Debug, Clone, Copy)]
pub struct CredentialRequest<'a> {
    /// Transport the caller arrived on.
    pub transport: TransportKind,
    /// Peer address when known.
    pub peer_ip: Option<IpAddr>,
    /// Raw `Authorization` header value, when present.
    pub auth_header: Option<&'a str>,
}

impl CredentialRequest<'_> {
    /// Builds a local-pipe credential request.
    #[must_use]
    pub const fn pipe() -> Self {
        Self {
            transport: TransportKind::Pipe,
            peer_ip: None,
            auth_header: None,
        }
    }

    /// Returns true when the peer address is loopback.
    #[must_use]
    pub fn peer_is_loopback(&self) -> bool {
        self.peer_ip.is_some_and(|ip| ip.is_loopback())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authentication or authorization errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or invalid credentials.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Credentials are valid but not allowed for the resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Resolves a [`CredentialContext`] from transport-level identity.
pub trait CredentialProvider: Send + Sync {
    /// Authenticates the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the caller cannot be authenticated.
    fn authenticate(&self, request: &CredentialRequest<'_>) -> Result<CredentialContext, AuthError>;
}

/// Answers whether a caller holds a permission.
pub trait AuthorizationSource: Send + Sync {
    /// Returns true when the permission is granted to the caller.
    fn grants(&self, context: &CredentialContext, permission: &Permission) -> bool;
}

// ============================================================================
// SECTION: Default Policies
// ============================================================================

/// Authorization source backed by the permissions stored on the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantedPermissions;

impl AuthorizationSource for GrantedPermissions {
    fn grants(&self, context: &CredentialContext, permission: &Permission) -> bool {
        context.permissions().contains(permission)
    }
}

/// Credential provider derived from the `[auth]` config section.
///
/// The local pipe always resolves to the configured stdio subject. The remote
/// stream requires a configured bearer token; when no tokens are configured,
/// only loopback peers are admitted.
pub struct ConfigCredentialProvider {
    /// Subject assigned to the local pipe.
    stdio_subject: String,
    /// Permissions granted to the local pipe and unauthenticated loopback peers.
    stdio_permissions: Vec<Permission>,
    /// Registered bearer tokens.
    tokens: Vec<TokenEntry>,
}

/// Bearer token registered with the provider.
struct TokenEntry {
    /// Sha256 digest of the token.
    digest: [u8; 32],
    /// Subject for the token.
    subject: String,
    /// Permissions granted to the token.
    permissions: Vec<Permission>,
}

impl ConfigCredentialProvider {
    /// Builds a provider from validated auth config.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|entry| TokenEntry {
                digest: sha256(entry.token.as_bytes()),
                subject: entry.subject.clone(),
                permissions: entry.permissions.iter().map(Permission::new).collect(),
            })
            .collect();
        Self {
            stdio_subject: config.stdio_subject.clone(),
            stdio_permissions: config.stdio_permissions.iter().map(Permission::new).collect(),
            tokens,
        }
    }

    /// Returns true when bearer tokens are configured.
    #[must_use]
    pub fn requires_tokens(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Resolves a bearer token against the registered tokens.
    fn authenticate_bearer(&self, header: Option<&str>) -> Result<CredentialContext, AuthError> {
        let token = parse_bearer_token(header)?;
        let digest = sha256(token.as_bytes());
        let mut matched: Option<&TokenEntry> = None;
        for entry in &self.tokens {
            if bool::from(entry.digest.ct_eq(&digest)) {
                matched = Some(entry);
            }
        }
        let entry =
            matched.ok_or_else(|| AuthError::Unauthenticated("invalid bearer token".to_string()))?;
        Ok(CredentialContext::new(entry.subject.clone(), entry.permissions.iter().cloned())
            .with_token_fingerprint(hex_lower(&digest)))
    }
}

impl CredentialProvider for ConfigCredentialProvider {
    fn authenticate(&self, request: &CredentialRequest<'_>) -> Result<CredentialContext, AuthError> {
        match request.transport {
            TransportKind::Pipe => Ok(CredentialContext::new(
                self.stdio_subject.clone(),
                self.stdio_permissions.iter().cloned(),
            )),
            TransportKind::Stream if self.requires_tokens() => {
                self.authenticate_bearer(request.auth_header)
            }
            TransportKind::Stream => {
                if request.peer_is_loopback() {
                    Ok(CredentialContext::new(
                        LOOPBACK_SUBJECT,
                        self.stdio_permissions.iter().cloned(),
                    ))
                } else {
                    Err(AuthError::Unauthenticated(
                        "tokenless stream access requires loopback peer".to_string(),
                    ))
                }
            }
        }
    }
}

/// Permission checker consulted before every handler invocation.
#[derive(Clone)]
pub struct PermissionChecker {
    /// Authorization collaborator.
    source: Arc<dyn AuthorizationSource>,
}

impl PermissionChecker {
    /// Creates a checker backed by the given authorization source.
    #[must_use]
    pub fn new(source: Arc<dyn AuthorizationSource>) -> Self {
        Self {
            source,
        }
    }

    /// Returns true when the caller satisfies the requirement. A missing
    /// requirement always passes.
    #[must_use]
    pub fn allows(&self, context: &CredentialContext, required: Option<&Permission>) -> bool {
        required.is_none_or(|permission| self.source.grants(context, permission))
    }
}

impl Default for PermissionChecker {
    fn default() -> Self {
        Self::new(Arc::new(GrantedPermissions))
    }
}

impl fmt::Debug for PermissionChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionChecker").finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a `Bearer <token>` header.
fn parse_bearer_token(auth_header: Option<&str>) -> Result<&str, AuthError> {
    let header = auth_header
        .ok_or_else(|| AuthError::Unauthenticated("missing authorization".to_string()))?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Unauthenticated("authorization header too large".to_string()));
    }
    let (scheme, token) = header.trim().split_once(' ').unwrap_or((header.trim(), ""));
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
    }
    Ok(token)
}

/// Computes a sha256 digest.
fn sha256(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Lowercase hex encoding.
fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions on fixed credentials."
    )]

    use std::net::IpAddr;
    use std::net::Ipv4Addr;

    use super::*;
    use crate::config::TokenConfig;

    fn config_with_token() -> AuthConfig {
        AuthConfig {
            tokens: vec![TokenConfig {
                token: "studio-secret".to_string(),
                subject: "studio".to_string(),
                permissions: vec!["voices:read".to_string()],
            }],
            ..AuthConfig::default()
        }
    }

    fn stream_request(header: Option<&str>, ip: IpAddr) -> CredentialRequest<'_> {
        CredentialRequest {
            transport: TransportKind::Stream,
            peer_ip: Some(ip),
            auth_header: header,
        }
    }

    #[test]
    fn pipe_resolves_to_stdio_subject() {
        let provider = ConfigCredentialProvider::from_config(&AuthConfig::default());
        let context = provider.authenticate(&CredentialRequest::pipe()).expect("pipe auth");
        assert_eq!(context.subject(), "stdio");
        assert!(context.permissions().contains(&Permission::new("speech:generate")));
    }

    #[test]
    fn bearer_token_resolves_subject_and_fingerprint() {
        let provider = ConfigCredentialProvider::from_config(&config_with_token());
        let remote = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));
        let context = provider
            .authenticate(&stream_request(Some("Bearer studio-secret"), remote))
            .expect("bearer auth");
        assert_eq!(context.subject(), "studio");
        assert_eq!(context.token_fingerprint().map(str::len), Some(64));
        assert!(!context.permissions().contains(&Permission::new("speech:generate")));
    }

    #[test]
    fn wrong_or_missing_token_is_unauthenticated() {
        let provider = ConfigCredentialProvider::from_config(&config_with_token());
        let loopback = IpAddr::V4(Ipv4Addr::LOCALHOST);
        for header in [None, Some("Bearer nope"), Some("Basic studio-secret"), Some("Bearer ")] {
            let result = provider.authenticate(&stream_request(header, loopback));
            assert!(matches!(result, Err(AuthError::Unauthenticated(_))), "{header:?}");
        }
    }

    #[test]
    fn tokenless_stream_admits_only_loopback() {
        let provider = ConfigCredentialProvider::from_config(&AuthConfig::default());
        let loopback = provider
            .authenticate(&stream_request(None, IpAddr::V4(Ipv4Addr::LOCALHOST)))
            .expect("loopback auth");
        assert_eq!(loopback.subject(), "loopback");
        let remote =
            provider.authenticate(&stream_request(None, IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))));
        assert!(remote.is_err());
    }

    #[test]
    fn checker_passes_missing_requirement_and_checks_grants() {
        let checker = PermissionChecker::default();
        let context = CredentialContext::new("caller", [Permission::new("voices:read")]);
        assert!(checker.allows(&context, None));
        assert!(checker.allows(&context, Some(&Permission::new("voices:read"))));
        assert!(!checker.allows(&context, Some(&Permission::new("speech:generate"))));
    }

    #[test]
    fn checker_consults_source_on_every_call() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::atomic::Ordering;

        struct Counting(AtomicUsize);
        impl AuthorizationSource for Counting {
            fn grants(&self, _context: &CredentialContext, _permission: &Permission) -> bool {
                self.0.fetch_add(1, Ordering::SeqCst);
                true
            }
        }

        let source = Arc::new(Counting(AtomicUsize::new(0)));
        let checker = PermissionChecker::new(source.clone());
        let context = CredentialContext::new("caller", Vec::<Permission>::new());
        let permission = Permission::new("speech:generate");
        for _ in 0 .. 3 {
            assert!(checker.allows(&context, Some(&permission)));
        }
        assert_eq!(source.0.load(Ordering::SeqCst), 3);
    }
}
