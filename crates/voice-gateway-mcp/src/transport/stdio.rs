// voice-gateway-mcp/src/transport/stdio.rs
// ============================================================================
// Module: Local-Pipe Transport
// Description: Newline-delimited frames over an async reader/writer pair.
// Purpose: Serve one connection per process over stdin/stdout.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! One line is one frame. The first frame must be `hello`; anything else
//! closes the connection. After the handshake, malformed lines are answered
//! with a `protocol_error` response (id `null` when none can be extracted)
//! and reading resumes with the next line. Lines longer than
//! `max_frame_bytes` are consumed to the newline and rejected, so framing is
//! never lost.
//!
//! Calls are dispatched on their own tasks in arrival order; responses are
//! written as they complete, so completion order may differ from arrival
//! order. A single writer task owns the output stream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::auth::CredentialProvider;
use crate::auth::CredentialRequest;
use crate::config::GatewayConfig;
use crate::dispatch::DispatchEngine;
use crate::error::ToolError;
use crate::protocol::ClientFrame;
use crate::protocol::ControlFrame;
use crate::protocol::PROTOCOL_VERSION;
use crate::protocol::ServerEvent;
use crate::protocol::ServerFrame;
use crate::protocol::ToolResponse;
use crate::protocol::decode_client_frame;
use crate::session::CloseReason;
use crate::session::ConnectionContext;
use crate::session::ConnectionState;
use crate::session::InflightTable;
use crate::session::Lifecycle;
use crate::session::TransportKind;
use crate::transport::TransportError;
use crate::transport::record_transition;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Outbound frame queue depth.
const OUTBOUND_QUEUE: usize = 256;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Pipe adapter limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeLimits {
    /// Maximum frame size in bytes, excluding the newline.
    pub max_frame_bytes: usize,
    /// Maximum concurrent in-flight requests.
    pub max_inflight: usize,
    /// Idle time after which the connection closes.
    pub idle_timeout: Duration,
    /// Drain budget while closing.
    pub close_grace: Duration,
}

impl PipeLimits {
    /// Derives limits from config.
    #[must_use]
    pub const fn from_config(config: &GatewayConfig) -> Self {
        Self {
            max_frame_bytes: config.server.max_frame_bytes,
            max_inflight: config.server.max_inflight_per_connection,
            idle_timeout: config.session.idle_timeout(),
            close_grace: config.session.close_grace(),
        }
    }
}

/// Outcome of one pipe connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Call frames received after the handshake.
    pub requests: u64,
    /// Frames rejected with `protocol_error`.
    pub protocol_errors: u64,
    /// Why the connection closed.
    pub close_reason: Option<CloseReason>,
    /// Requests cancelled at teardown.
    pub cancelled: usize,
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Local-pipe transport adapter.
#[derive(Clone)]
pub struct PipeAdapter {
    /// Shared dispatch engine.
    engine: Arc<DispatchEngine>,
    /// Credential provider for the pipe caller.
    credentials: Arc<dyn CredentialProvider>,
    /// Limits.
    limits: PipeLimits,
}

/// Result of reading one frame.
enum FrameRead {
    /// Complete frame without its newline.
    Line(Vec<u8>),
    /// Frame exceeded the size limit and was discarded.
    Oversized,
    /// Input closed.
    Eof,
}

impl PipeAdapter {
    /// Creates an adapter bound to the shared engine.
    #[must_use]
    pub fn new(
        engine: Arc<DispatchEngine>,
        credentials: Arc<dyn CredentialProvider>,
        limits: PipeLimits,
    ) -> Self {
        Self {
            engine,
            credentials,
            limits,
        }
    }

    /// Returns the shared dispatch engine.
    #[must_use]
    pub const fn engine(&self) -> &Arc<DispatchEngine> {
        &self.engine
    }

    /// Serves the process's stdin/stdout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the caller cannot be authenticated or
    /// stdin fails.
    pub async fn serve_stdio(&self) -> Result<SessionSummary, TransportError> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
    }

    /// Serves one connection over the given reader and writer.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the caller cannot be authenticated or
    /// the reader fails.
    pub async fn serve<R, W>(&self, mut reader: R, writer: W) -> Result<SessionSummary, TransportError>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let credentials = self
            .credentials
            .authenticate(&CredentialRequest::pipe())
            .map_err(|err| TransportError::Auth(err.to_string()))?;
        let context = Arc::new(ConnectionContext {
            connection_id: format!("pipe-{:016x}", rand::random::<u64>()),
            transport: TransportKind::Pipe,
            credentials,
        });
        let audit = self.engine.audit();
        let (tx, rx) = mpsc::channel::<ServerFrame>(OUTBOUND_QUEUE);
        let writer_task = tokio::spawn(write_frames(writer, rx));
        let mut lifecycle = Lifecycle::new();
        let mut summary = SessionSummary::default();

        if let Err(error) = self.handshake(&mut reader, &context, &tx).await {
            summary.protocol_errors += 1;
            let _ = tx.send(ToolResponse::failure(None, error).into()).await;
            let _ = lifecycle.advance(ConnectionState::Closed);
            summary.close_reason = Some(CloseReason::HandshakeFailed);
            record_transition(audit.as_ref(), &context, ConnectionState::Closed, summary.close_reason, 0);
            drop(tx);
            let _ = writer_task.await;
            return Ok(summary);
        }
        let _ = lifecycle.advance(ConnectionState::Ready);
        record_transition(audit.as_ref(), &context, ConnectionState::Ready, None, 0);

        let inflight = Arc::new(InflightTable::new(self.limits.max_inflight));
        let mut tasks = JoinSet::new();
        let reason = match self
            .read_loop(&mut reader, &context, &tx, &inflight, &mut tasks, &mut lifecycle, &mut summary)
            .await
        {
            Ok(reason) => reason,
            Err(err) => {
                let cancelled = inflight.cancel_all();
                tasks.shutdown().await;
                record_transition(audit.as_ref(), &context, ConnectionState::Closed, None, cancelled);
                return Err(err);
            }
        };

        let _ = lifecycle.advance(ConnectionState::Closing);
        record_transition(audit.as_ref(), &context, ConnectionState::Closing, Some(reason), 0);
        let _ = tx
            .send(
                ServerEvent::Closing {
                    reason: reason.as_str().to_string(),
                }
                .into(),
            )
            .await;
        let drain = async { while tasks.join_next().await.is_some() {} };
        let _ = tokio::time::timeout(self.limits.close_grace, drain).await;
        let cancelled = inflight.cancel_all();
        tasks.shutdown().await;
        drop(tx);
        let _ = writer_task.await;

        let _ = lifecycle.advance(ConnectionState::Closed);
        record_transition(audit.as_ref(), &context, ConnectionState::Closed, Some(reason), cancelled);
        summary.close_reason = Some(reason);
        summary.cancelled = cancelled;
        Ok(summary)
    }

    /// Reads and validates the `hello` frame.
    async fn handshake<R>(
        &self,
        reader: &mut R,
        context: &ConnectionContext,
        tx: &mpsc::Sender<ServerFrame>,
    ) -> Result<(), ToolError>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        let bytes = loop {
            let read = tokio::time::timeout(
                self.limits.idle_timeout,
                read_frame(reader, self.limits.max_frame_bytes),
            )
            .await
            .map_err(|_| ToolError::protocol("handshake timed out"))?
            .map_err(|_| ToolError::protocol("handshake read failed"))?;
            match read {
                FrameRead::Line(bytes) if is_blank(&bytes) => {}
                FrameRead::Line(bytes) => break bytes,
                FrameRead::Oversized => return Err(ToolError::protocol("handshake frame too large")),
                FrameRead::Eof => return Err(ToolError::protocol("connection closed before hello")),
            }
        };
        match decode_client_frame(&bytes) {
            Ok(ClientFrame::Control(ControlFrame::Hello {
                protocol, ..
            })) if protocol == PROTOCOL_VERSION => {
                let ready = ServerEvent::Ready {
                    session: context.connection_id.clone(),
                    protocol: PROTOCOL_VERSION,
                };
                let _ = tx.send(ready.into()).await;
                Ok(())
            }
            Ok(ClientFrame::Control(ControlFrame::Hello {
                protocol, ..
            })) => Err(ToolError::protocol(format!("unsupported protocol version {protocol}"))),
            Ok(_) => Err(ToolError::protocol("first frame must be hello")),
            Err(error) => Err(ToolError::protocol(error.message)),
        }
    }

    /// Reads frames until the connection should close.
    #[allow(clippy::too_many_arguments, reason = "Loop state is owned by serve.")]
    async fn read_loop<R>(
        &self,
        reader: &mut R,
        context: &Arc<ConnectionContext>,
        tx: &mpsc::Sender<ServerFrame>,
        inflight: &Arc<InflightTable>,
        tasks: &mut JoinSet<()>,
        lifecycle: &mut Lifecycle,
        summary: &mut SessionSummary,
    ) -> Result<CloseReason, TransportError>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        loop {
            while tasks.try_join_next().is_some() {}
            let next = read_frame(reader, self.limits.max_frame_bytes);
            let read = if inflight.is_empty() {
                match tokio::time::timeout(self.limits.idle_timeout, next).await {
                    Ok(read) => read,
                    Err(_) => return Ok(CloseReason::IdleTimeout),
                }
            } else {
                next.await
            };
            let bytes = match read.map_err(|err| TransportError::Io(err.to_string()))? {
                FrameRead::Eof => return Ok(CloseReason::EndOfStream),
                FrameRead::Oversized => {
                    summary.protocol_errors += 1;
                    let error = ToolError::protocol("frame exceeds max_frame_bytes");
                    if tx.send(ToolResponse::failure(None, error).into()).await.is_err() {
                        return Ok(CloseReason::EndOfStream);
                    }
                    continue;
                }
                FrameRead::Line(bytes) if is_blank(&bytes) => continue,
                FrameRead::Line(bytes) => bytes,
            };
            let outbound: Option<ServerFrame> = match decode_client_frame(&bytes) {
                Err(error) => {
                    summary.protocol_errors += 1;
                    let response = error.into_response();
                    self.engine.record_protocol_error(context, &response);
                    Some(response.into())
                }
                Ok(ClientFrame::Call(request)) => {
                    summary.requests += 1;
                    let _ = lifecycle.advance(ConnectionState::Active);
                    match inflight.begin(&request.id) {
                        Err(error) => Some(ToolResponse::failure(Some(request.id), error).into()),
                        Ok(cancel) => {
                            let engine = Arc::clone(&self.engine);
                            let context = Arc::clone(context);
                            let inflight = Arc::clone(inflight);
                            let tx = tx.clone();
                            tasks.spawn(async move {
                                let id = request.id.clone();
                                let response = engine.handle(&context, request, cancel).await;
                                if inflight.finish(&id) {
                                    let _ = tx.send(response.into()).await;
                                }
                            });
                            None
                        }
                    }
                }
                Ok(ClientFrame::Control(control)) => match control {
                    ControlFrame::Hello {
                        ..
                    } => {
                        summary.protocol_errors += 1;
                        let error = ToolError::protocol("duplicate hello");
                        let _ = tx.send(ToolResponse::failure(None, error).into()).await;
                        return Ok(CloseReason::ProtocolViolation);
                    }
                    ControlFrame::ListTools {
                        id,
                    } => Some(self.engine.list_tools_response(context, id).into()),
                    ControlFrame::Cancel {
                        id,
                    } => {
                        inflight.cancel(&id);
                        None
                    }
                    ControlFrame::Close => return Ok(CloseReason::ClientClose),
                    ControlFrame::Ping => Some(ServerEvent::Pong.into()),
                },
            };
            if let Some(frame) = outbound
                && tx.send(frame).await.is_err()
            {
                return Ok(CloseReason::EndOfStream);
            }
        }
    }
}

// ============================================================================
// SECTION: Framing
// ============================================================================

/// Reads one newline-terminated frame, discarding frames above `max` bytes.
async fn read_frame<R>(reader: &mut R, max: usize) -> io::Result<FrameRead>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut line = Vec::new();
    let mut oversized = false;
    loop {
        let (consumed, complete) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                if oversized {
                    return Ok(FrameRead::Oversized);
                }
                if line.is_empty() {
                    return Ok(FrameRead::Eof);
                }
                return Ok(FrameRead::Line(trim_cr(line)));
            }
            let newline = available.iter().position(|byte| *byte == b'\n');
            let chunk = newline.map_or(available, |index| &available[.. index]);
            if !oversized {
                if line.len() + chunk.len() > max {
                    oversized = true;
                    line.clear();
                } else {
                    line.extend_from_slice(chunk);
                }
            }
            newline.map_or((available.len(), false), |index| (index + 1, true))
        };
        reader.consume(consumed);
        if complete {
            return Ok(if oversized { FrameRead::Oversized } else { FrameRead::Line(trim_cr(line)) });
        }
    }
}

/// Drops a trailing carriage return.
fn trim_cr(mut line: Vec<u8>) -> Vec<u8> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    line
}

/// Returns true for whitespace-only lines.
fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

/// Writes frames as JSON lines until every sender is dropped.
async fn write_frames<W>(mut writer: W, mut rx: mpsc::Receiver<ServerFrame>)
where
    W: AsyncWrite + Unpin + Send,
{
    while let Some(frame) = rx.recv().await {
        let mut line = frame.encode();
        line.push('\n');
        if writer.write_all(line.as_bytes()).await.is_err() || writer.flush().await.is_err() {
            break;
        }
    }
    let _ = writer.shutdown().await;
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
