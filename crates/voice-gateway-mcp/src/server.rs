// voice-gateway-mcp/src/server.rs
// ============================================================================
// Module: Gateway Server
// Description: Server factory and transport runners.
// Purpose: Build one registry and dispatch engine shared by both transports.
// Dependencies: axum, tokio, voice-gateway-config
// ============================================================================

//! ## Overview
//! [`GatewayServer`] is the only place the registry, dispatch engine, and
//! transport adapters are wired together. Both adapters receive clones of
//! the same `Arc<DispatchEngine>`, so there is no path by which one transport
//! exposes a tool or policy the other does not.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncWrite;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::audit::AuditSink;
use crate::audit::sink_from_config;
use crate::auth::ConfigCredentialProvider;
use crate::auth::CredentialProvider;
use crate::auth::PermissionChecker;
use crate::bridge::ExecutionBridge;
use crate::config::ConfigError;
use crate::config::GatewayConfig;
use crate::config::ToolsConfig;
use crate::dispatch::DispatchEngine;
use crate::registry::RegistryBuilder;
use crate::registry::RegistryError;
use crate::registry::ToolRegistry;
use crate::session::CloseReason;
use crate::telemetry::GatewayMetrics;
use crate::telemetry::NoopMetrics;
use crate::tools::Capabilities;
use crate::tools::builtin_tools;
use crate::transport::PipeAdapter;
use crate::transport::PipeLimits;
use crate::transport::SessionHub;
use crate::transport::StreamLimits;
use crate::transport::TransportError;
use crate::transport::stream::router;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway startup and serving failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),
    /// Components could not be initialized.
    #[error("init error: {0}")]
    Init(String),
    /// A transport failed while serving.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<ConfigError> for GatewayError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<RegistryError> for GatewayError {
    fn from(error: RegistryError) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<TransportError> for GatewayError {
    fn from(error: TransportError) -> Self {
        Self::Transport(error.to_string())
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Fully wired gateway.
pub struct GatewayServer {
    /// Validated configuration.
    config: GatewayConfig,
    /// Shared dispatch engine.
    engine: Arc<DispatchEngine>,
    /// Local-pipe adapter.
    pipe: PipeAdapter,
    /// Remote-stream session hub.
    hub: Arc<SessionHub>,
}

impl GatewayServer {
    /// Builds the gateway with the reference capabilities from config.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when config is invalid, the registry cannot be
    /// frozen, or the audit sink cannot be opened.
    pub fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let capabilities = Capabilities::from_config(&config.tools);
        let audit = sink_from_config(&config.audit)
            .map_err(|err| GatewayError::Init(format!("audit sink: {err}")))?;
        Self::create(&capabilities, PermissionChecker::default(), audit, config)
    }

    /// Builds the gateway from explicit capabilities and authorization policy.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when config is invalid or the registry cannot
    /// be frozen.
    pub fn create(
        capabilities: &Capabilities,
        checker: PermissionChecker,
        audit: Arc<dyn AuditSink>,
        config: GatewayConfig,
    ) -> Result<Self, GatewayError> {
        Self::create_with_metrics(capabilities, checker, audit, Arc::new(NoopMetrics), config)
    }

    /// Builds the gateway with an explicit metrics sink.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when config is invalid or the registry cannot
    /// be frozen.
    pub fn create_with_metrics(
        capabilities: &Capabilities,
        checker: PermissionChecker,
        audit: Arc<dyn AuditSink>,
        metrics: Arc<dyn GatewayMetrics>,
        config: GatewayConfig,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let registry = build_registry(capabilities, &config.tools)?;
        let bridge = ExecutionBridge::from_config(&config.bridge);
        let engine = Arc::new(
            DispatchEngine::new(registry, checker, bridge, config.bridge.default_timeout())
                .with_audit(audit)
                .with_metrics(metrics),
        );
        let credentials: Arc<dyn CredentialProvider> =
            Arc::new(ConfigCredentialProvider::from_config(&config.auth));
        let pipe = PipeAdapter::new(
            Arc::clone(&engine),
            Arc::clone(&credentials),
            PipeLimits::from_config(&config),
        );
        let hub = SessionHub::new(Arc::clone(&engine), credentials, StreamLimits::from_config(&config));
        Ok(Self {
            config,
            engine,
            pipe,
            hub,
        })
    }

    /// Returns the shared dispatch engine.
    #[must_use]
    pub const fn engine(&self) -> &Arc<DispatchEngine> {
        &self.engine
    }

    /// Returns the frozen registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        self.engine.registry()
    }

    /// Returns the local-pipe adapter.
    #[must_use]
    pub const fn pipe(&self) -> &PipeAdapter {
        &self.pipe
    }

    /// Returns the remote-stream session hub.
    #[must_use]
    pub const fn hub(&self) -> &Arc<SessionHub> {
        &self.hub
    }

    /// Builds the axum router for the stream transport.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        router(Arc::clone(&self.hub))
    }

    /// Splits the server into its two adapters.
    #[must_use]
    pub fn into_adapters(self) -> (PipeAdapter, Arc<SessionHub>) {
        (self.pipe, self.hub)
    }

    /// Binds the stream listener when the stream transport is selected.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the bind address is missing or the
    /// listener cannot be bound.
    pub async fn bind_stream(&self) -> Result<Option<TcpListener>, GatewayError> {
        if !self.config.server.transport.includes_stream() {
            return Ok(None);
        }
        let addr = self.config.server.bind_addr()?.ok_or_else(|| {
            GatewayError::Config("server.bind is required for the stream transport".to_string())
        })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| TransportError::Listener(format!("bind {addr}: {err}")))?;
        Ok(Some(listener))
    }

    /// Binds and serves the configured transports over stdin/stdout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when a transport fails.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let listener = self.bind_stream().await?;
        self.serve_on(listener).await
    }

    /// Serves the configured transports over stdin/stdout and a listener
    /// obtained from [`GatewayServer::bind_stream`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when a transport fails.
    pub async fn serve_on(self, listener: Option<TcpListener>) -> Result<(), GatewayError> {
        let stdin = BufReader::new(tokio::io::stdin());
        self.serve_with(listener, stdin, tokio::io::stdout(), CancellationToken::new()).await
    }

    /// Serves the pipe transport over `reader`/`writer` and the stream
    /// transport over `listener`.
    ///
    /// The pipe connection ending does not stop the stream transport; it keeps
    /// serving until its listener fails or `shutdown` fires. Only a pipe
    /// transport error stops both.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when a transport fails.
    pub async fn serve_with<R, W>(
        self,
        listener: Option<TcpListener>,
        reader: R,
        writer: W,
        shutdown: CancellationToken,
    ) -> Result<(), GatewayError>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let selection = self.config.server.transport;
        let stream = listener.map(|listener| {
            tokio::spawn(Arc::clone(&self.hub).run_reaper(shutdown.clone()));
            serve_stream(listener, self.router(), shutdown.clone())
        });

        let result = match (selection.includes_stdio(), stream) {
            (true, Some(stream)) => {
                tokio::pin!(stream);
                let early = tokio::select! {
                    pipe = self.pipe.serve(reader, writer) => {
                        pipe.err().map(|err| Err(GatewayError::from(err)))
                    }
                    result = &mut stream => Some(result),
                };
                match early {
                    Some(result) => result,
                    None => stream.await,
                }
            }
            (true, None) => {
                self.pipe.serve(reader, writer).await.map(|_| ()).map_err(GatewayError::from)
            }
            (false, Some(stream)) => stream.await,
            (false, None) => Ok(()),
        };
        shutdown.cancel();
        self.hub.close_all(CloseReason::Shutdown);
        result
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the frozen registry, applying configured timeout overrides.
fn build_registry(
    capabilities: &Capabilities,
    tools: &ToolsConfig,
) -> Result<Arc<ToolRegistry>, GatewayError> {
    let descriptors = builtin_tools(capabilities);
    for entry in &tools.timeouts {
        if !descriptors.iter().any(|descriptor| descriptor.name == entry.name) {
            return Err(GatewayError::Config(format!(
                "tools.timeouts references unknown tool: {}",
                entry.name
            )));
        }
    }
    let mut builder = RegistryBuilder::new();
    for mut descriptor in descriptors {
        if let Some(timeout) = tools.timeout_for(&descriptor.name) {
            descriptor.timeout = Some(timeout);
        }
        builder.register(descriptor);
    }
    Ok(builder.build()?)
}

/// Serves the stream router until the listener fails or shutdown fires.
async fn serve_stream(
    listener: TcpListener,
    app: axum::Router,
    shutdown: CancellationToken,
) -> Result<(), GatewayError> {
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|err| GatewayError::from(TransportError::Listener(err.to_string())))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only factory assertions."
    )]

    use std::time::Duration;

    use super::*;
    use crate::config::ToolTimeoutConfig;
    use crate::tools::GENERATE_SPEECH;

    #[test]
    fn timeout_override_applies_to_named_tool() {
        let mut config = GatewayConfig::default();
        config.audit.enabled = false;
        config.tools.timeouts.push(ToolTimeoutConfig {
            name: GENERATE_SPEECH.to_string(),
            timeout_ms: 1_500,
        });
        let server = GatewayServer::from_config(config).expect("server");
        let tool = server.registry().resolve(GENERATE_SPEECH).expect("tool");
        assert_eq!(tool.descriptor().timeout, Some(Duration::from_millis(1_500)));
    }

    #[test]
    fn unknown_timeout_override_is_rejected() {
        let mut config = GatewayConfig::default();
        config.audit.enabled = false;
        config.tools.timeouts.push(ToolTimeoutConfig {
            name: "transcribe".to_string(),
            timeout_ms: 1_000,
        });
        let result = GatewayServer::from_config(config);
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[test]
    fn adapters_share_one_engine() {
        let mut config = GatewayConfig::default();
        config.audit.enabled = false;
        let server = GatewayServer::from_config(config).expect("server");
        assert!(Arc::ptr_eq(server.engine(), server.hub().engine()));
        assert!(Arc::ptr_eq(server.engine(), server.pipe().engine()));
    }
}
