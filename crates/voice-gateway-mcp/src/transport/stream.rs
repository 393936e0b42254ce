// voice-gateway-mcp/src/transport/stream.rs
// ============================================================================
// Module: Remote-Stream Transport
// Description: Server-Sent Events read channel plus POST write endpoint.
// Purpose: Serve sessions whose read and write sides use separate requests.
// Dependencies: axum, rand, tokio, tokio-stream
// ============================================================================

//! ## Overview
//! `GET /events` opens (or re-attaches to) a session and streams server
//! frames as SSE `data:` lines. `POST /messages?session=ID` accepts one client
//! frame and returns a receipt immediately; the response is pushed on the
//! session's read channel later, tagged with the request id.
//!
//! [`SessionHub`] owns the session table and is transport-agnostic; the axum
//! router is a thin layer over it. While no read channel is attached, frames
//! are kept in a bounded replay buffer: at most `replay_max_responses`
//! entries (oldest dropped first), each kept for at most `replay_window`. A
//! session detached longer than the replay window, or idle longer than the
//! idle timeout, is reaped and its in-flight work cancelled.
//!
//! Security posture: every request is authenticated, and a session only
//! accepts requests from the subject that opened it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::WWW_AUTHENTICATE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::response::Sse;
use axum::response::sse::Event;
use axum::response::sse::KeepAlive;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::auth::AuthError;
use crate::auth::CredentialProvider;
use crate::auth::CredentialRequest;
use crate::config::GatewayConfig;
use crate::dispatch::DispatchEngine;
use crate::error::ErrorKind;
use crate::error::ToolError;
use crate::protocol::ClientFrame;
use crate::protocol::ControlFrame;
use crate::protocol::PROTOCOL_VERSION;
use crate::protocol::RequestId;
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
use crate::transport::record_transition;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Extra read-channel capacity beyond the replay depth.
const CHANNEL_HEADROOM: usize = 64;
/// Maximum concurrent sessions.
const MAX_SESSIONS: usize = 1_024;
/// Poll interval while draining a closing session.
const DRAIN_POLL: Duration = Duration::from_millis(10);
/// Session id length in hex characters.
const SESSION_ID_LEN: usize = 32;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Stream adapter limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamLimits {
    /// Maximum POST body size in bytes.
    pub max_frame_bytes: usize,
    /// Maximum concurrent in-flight requests per session.
    pub max_inflight: usize,
    /// Idle time after which a session is reaped.
    pub idle_timeout: Duration,
    /// Drain budget while closing.
    pub close_grace: Duration,
    /// How long frames are kept for a detached read channel.
    pub replay_window: Duration,
    /// Maximum buffered frames per session.
    pub replay_max_responses: usize,
    /// Reaper tick interval.
    pub reap_interval: Duration,
}

impl StreamLimits {
    /// Derives limits from config.
    #[must_use]
    pub const fn from_config(config: &GatewayConfig) -> Self {
        Self {
            max_frame_bytes: config.server.max_frame_bytes,
            max_inflight: config.server.max_inflight_per_connection,
            idle_timeout: config.session.idle_timeout(),
            close_grace: config.session.close_grace(),
            replay_window: config.session.replay_window(),
            replay_max_responses: config.session.replay_max_responses,
            reap_interval: config.session.reap_interval(),
        }
    }
}

// ============================================================================
// SECTION: Errors and Receipts
// ============================================================================

/// Session-level request failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Missing or invalid credentials.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Session belongs to a different subject.
    #[error("session belongs to another subject")]
    SubjectMismatch,
    /// Session id is not well formed.
    #[error("malformed session id")]
    MalformedSession,
    /// Session does not exist or has closed.
    #[error("unknown session")]
    UnknownSession,
    /// Session is draining and accepts no new requests.
    #[error("session is closing")]
    SessionClosing,
    /// Session table is full.
    #[error("too many sessions")]
    TooManySessions,
}

impl SessionError {
    /// HTTP status for the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::SubjectMismatch => StatusCode::FORBIDDEN,
            Self::MalformedSession => StatusCode::BAD_REQUEST,
            Self::UnknownSession => StatusCode::NOT_FOUND,
            Self::SessionClosing => StatusCode::GONE,
            Self::TooManySessions => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<AuthError> for SessionError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Unauthenticated(message) => Self::Unauthenticated(message),
            AuthError::Unauthorized(_) => Self::SubjectMismatch,
        }
    }
}

/// Why a submitted frame was rejected synchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Frame could not be decoded or violated the protocol.
    Protocol,
    /// Request id already in flight.
    Duplicate,
    /// Session at its in-flight limit.
    Overloaded,
}

impl Rejection {
    /// HTTP status for the rejection.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Protocol => StatusCode::BAD_REQUEST,
            Self::Duplicate => StatusCode::CONFLICT,
            Self::Overloaded => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

/// Result of submitting one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Receipt {
    /// Frame accepted; any response arrives on the read channel.
    Accepted {
        /// Request id carried by the frame, if any.
        id: Option<RequestId>,
    },
    /// Frame rejected; the response is returned to the poster.
    Rejected {
        /// Rejection class.
        reason: Rejection,
        /// Error response.
        response: ToolResponse,
    },
}

/// Newly attached read channel.
#[derive(Debug)]
pub struct Attached {
    /// Session identifier.
    pub session_id: String,
    /// Frames for the session, starting with any replayed frames.
    pub frames: mpsc::Receiver<ServerFrame>,
}

// ============================================================================
// SECTION: Sessions
// ============================================================================

/// One remote session.
struct StreamSession {
    /// Immutable connection context.
    context: Arc<ConnectionContext>,
    /// In-flight requests.
    inflight: Arc<InflightTable>,
    /// Replay depth.
    replay_max: usize,
    /// Mutable state.
    state: Mutex<SessionState>,
}

/// Mutable session state.
struct SessionState {
    /// Lifecycle.
    lifecycle: Lifecycle,
    /// Attached read channel.
    subscriber: Option<mpsc::Sender<ServerFrame>>,
    /// Frames awaiting a read channel.
    replay: VecDeque<Buffered>,
    /// Last request or attach.
    last_activity: Instant,
    /// When the read channel went away.
    detached_since: Option<Instant>,
}

/// Buffered frame.
struct Buffered {
    /// Buffer time.
    at: Instant,
    /// Frame.
    frame: ServerFrame,
}

impl StreamSession {
    /// Locks the session state.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the session id.
    fn id(&self) -> &str {
        &self.context.connection_id
    }

    /// Pushes a frame to the read channel, or buffers it while detached.
    fn deliver(&self, frame: ServerFrame) {
        let now = Instant::now();
        let mut state = self.lock();
        let frame = match state.subscriber.as_ref() {
            Some(subscriber) => match subscriber.try_send(frame) {
                Ok(()) => return,
                Err(TrySendError::Full(frame) | TrySendError::Closed(frame)) => frame,
            },
            None => frame,
        };
        if state.subscriber.take().is_some() {
            state.detached_since = Some(now);
        }
        state.replay.push_back(Buffered {
            at: now,
            frame,
        });
        while state.replay.len() > self.replay_max {
            state.replay.pop_front();
        }
    }

    /// Attaches a new read channel, replaying buffered frames still inside
    /// the window. Any previous read channel is dropped.
    fn attach(
        &self,
        now: Instant,
        window: Duration,
        first: Option<ServerFrame>,
    ) -> mpsc::Receiver<ServerFrame> {
        let (tx, rx) = mpsc::channel(self.replay_max + CHANNEL_HEADROOM);
        let mut state = self.lock();
        if let Some(frame) = first {
            let _ = tx.try_send(frame);
        }
        expire_replay(&mut state.replay, now, window);
        for buffered in state.replay.drain(..) {
            let _ = tx.try_send(buffered.frame);
        }
        state.subscriber = Some(tx);
        state.detached_since = None;
        state.last_activity = now;
        rx
    }

    /// Returns true when the session should be reaped at `now`.
    fn expired(&self, now: Instant, limits: &StreamLimits) -> bool {
        let mut state = self.lock();
        match state.lifecycle.state() {
            ConnectionState::Closed => return true,
            ConnectionState::Closing => return false,
            _ => {}
        }
        if state.subscriber.as_ref().is_some_and(mpsc::Sender::is_closed) {
            state.subscriber = None;
            state.detached_since = Some(now);
        }
        expire_replay(&mut state.replay, now, limits.replay_window);
        let detached_too_long = state
            .detached_since
            .is_some_and(|since| now.saturating_duration_since(since) >= limits.replay_window);
        let idle = self.inflight.is_empty()
            && now.saturating_duration_since(state.last_activity) >= limits.idle_timeout;
        detached_too_long || idle
    }
}

/// Drops buffered frames older than the window.
fn expire_replay(replay: &mut VecDeque<Buffered>, now: Instant, window: Duration) {
    while replay.front().is_some_and(|entry| now.saturating_duration_since(entry.at) > window) {
        replay.pop_front();
    }
}

// ============================================================================
// SECTION: Session Hub
// ============================================================================

/// Session table and transport-agnostic stream operations.
pub struct SessionHub {
    /// Shared dispatch engine.
    engine: Arc<DispatchEngine>,
    /// Credential provider.
    credentials: Arc<dyn CredentialProvider>,
    /// Limits.
    limits: StreamLimits,
    /// Live sessions by id.
    sessions: Mutex<HashMap<String, Arc<StreamSession>>>,
}

impl SessionHub {
    /// Creates an empty hub bound to the shared engine.
    #[must_use]
    pub fn new(
        engine: Arc<DispatchEngine>,
        credentials: Arc<dyn CredentialProvider>,
        limits: StreamLimits,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine,
            credentials,
            limits,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the adapter limits.
    #[must_use]
    pub const fn limits(&self) -> &StreamLimits {
        &self.limits
    }

    /// Returns the shared dispatch engine.
    #[must_use]
    pub const fn engine(&self) -> &Arc<DispatchEngine> {
        &self.engine
    }

    /// Returns the number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.table().len()
    }

    /// Opens a new session, or re-attaches to `session` when given.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the caller is not authenticated, the id
    /// is malformed or unknown, or the session belongs to another subject.
    pub fn open_stream(
        &self,
        request: &CredentialRequest<'_>,
        session: Option<&str>,
    ) -> Result<Attached, SessionError> {
        let now = Instant::now();
        if let Some(session_id) = session {
            let session = self.authorized_session(request, session_id)?;
            if session.lock().lifecycle.state() == ConnectionState::Closed {
                return Err(SessionError::UnknownSession);
            }
            let frames = session.attach(now, self.limits.replay_window, None);
            return Ok(Attached {
                session_id: session_id.to_string(),
                frames,
            });
        }

        let credentials = self.credentials.authenticate(request)?;
        if self.session_count() >= MAX_SESSIONS {
            return Err(SessionError::TooManySessions);
        }
        let session_id = format!("{:032x}", rand::random::<u128>());
        let mut lifecycle = Lifecycle::new();
        let _ = lifecycle.advance(ConnectionState::Ready);
        let session = Arc::new(StreamSession {
            context: Arc::new(ConnectionContext {
                connection_id: session_id.clone(),
                transport: TransportKind::Stream,
                credentials,
            }),
            inflight: Arc::new(InflightTable::new(self.limits.max_inflight)),
            replay_max: self.limits.replay_max_responses,
            state: Mutex::new(SessionState {
                lifecycle,
                subscriber: None,
                replay: VecDeque::new(),
                last_activity: now,
                detached_since: None,
            }),
        });
        let ready = ServerEvent::Ready {
            session: session_id.clone(),
            protocol: PROTOCOL_VERSION,
        };
        let frames = session.attach(now, self.limits.replay_window, Some(ready.into()));
        record_transition(
            self.engine.audit().as_ref(),
            &session.context,
            ConnectionState::Ready,
            None,
            0,
        );
        self.table().insert(session_id.clone(), session);
        Ok(Attached {
            session_id,
            frames,
        })
    }

    /// Accepts one client frame for a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the caller is not authenticated or the
    /// session cannot accept requests. Frame-level failures are returned as
    /// [`Receipt::Rejected`].
    pub fn submit(
        self: &Arc<Self>,
        request: &CredentialRequest<'_>,
        session_id: &str,
        body: &[u8],
    ) -> Result<Receipt, SessionError> {
        let session = self.authorized_session(request, session_id)?;
        {
            let mut state = session.lock();
            match state.lifecycle.state() {
                ConnectionState::Closed => return Err(SessionError::UnknownSession),
                ConnectionState::Closing => return Err(SessionError::SessionClosing),
                _ => {}
            }
            state.last_activity = Instant::now();
        }

        let frame = match decode_client_frame(body) {
            Ok(frame) => frame,
            Err(error) => {
                let response = error.into_response();
                self.engine.record_protocol_error(&session.context, &response);
                return Ok(Receipt::Rejected {
                    reason: Rejection::Protocol,
                    response,
                });
            }
        };

        let receipt = match frame {
            ClientFrame::Call(call) => {
                let _ = session.lock().lifecycle.advance(ConnectionState::Active);
                match session.inflight.begin(&call.id) {
                    Err(error) => {
                        let reason = if error.kind == ErrorKind::InvalidRequest {
                            Rejection::Duplicate
                        } else {
                            Rejection::Overloaded
                        };
                        Receipt::Rejected {
                            reason,
                            response: ToolResponse::failure(Some(call.id), error),
                        }
                    }
                    Ok(cancel) => {
                        let id = call.id.clone();
                        let engine = Arc::clone(&self.engine);
                        let task_session = Arc::clone(&session);
                        tokio::spawn(async move {
                            let id = call.id.clone();
                            let response =
                                engine.handle(&task_session.context, call, cancel).await;
                            if task_session.inflight.finish(&id) {
                                task_session.deliver(response.into());
                            }
                        });
                        Receipt::Accepted {
                            id: Some(id),
                        }
                    }
                }
            }
            ClientFrame::Control(ControlFrame::ListTools {
                id,
            }) => {
                let listing = self.engine.list_tools_response(&session.context, id.clone());
                session.deliver(listing.into());
                Receipt::Accepted {
                    id: Some(id),
                }
            }
            ClientFrame::Control(ControlFrame::Cancel {
                id,
            }) => {
                session.inflight.cancel(&id);
                Receipt::Accepted {
                    id: Some(id),
                }
            }
            ClientFrame::Control(ControlFrame::Ping) => {
                session.deliver(ServerEvent::Pong.into());
                Receipt::Accepted {
                    id: None,
                }
            }
            ClientFrame::Control(ControlFrame::Close) => {
                self.begin_close(&session, CloseReason::ClientClose);
                Receipt::Accepted {
                    id: None,
                }
            }
            ClientFrame::Control(ControlFrame::Hello {
                ..
            }) => {
                self.begin_close(&session, CloseReason::ProtocolViolation);
                Receipt::Rejected {
                    reason: Rejection::Protocol,
                    response: ToolResponse::failure(None, ToolError::protocol("duplicate hello")),
                }
            }
        };
        Ok(receipt)
    }

    /// Reaps sessions that expired at `now`. Returns the reaped ids.
    pub fn reap_expired_at(&self, now: Instant) -> Vec<String> {
        let candidates: Vec<Arc<StreamSession>> = self.table().values().cloned().collect();
        let mut reaped = Vec::new();
        for session in candidates {
            if session.expired(now, &self.limits) {
                self.enter_closing(&session, CloseReason::Reaped);
                self.finish_close(&session, CloseReason::Reaped);
                reaped.push(session.id().to_string());
            }
        }
        reaped
    }

    /// Runs the reaper until `shutdown` fires, then closes every session.
    pub async fn run_reaper(self: Arc<Self>, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.limits.reap_interval);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let _ = self.reap_expired_at(Instant::now());
                }
            }
        }
        self.close_all(CloseReason::Shutdown);
    }

    /// Closes every session immediately.
    pub fn close_all(&self, reason: CloseReason) {
        let sessions: Vec<Arc<StreamSession>> = self.table().values().cloned().collect();
        for session in sessions {
            self.enter_closing(&session, reason);
            self.finish_close(&session, reason);
        }
    }

    /// Locks the session table.
    fn table(&self) -> MutexGuard<'_, HashMap<String, Arc<StreamSession>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Authenticates the caller and resolves a session it owns.
    fn authorized_session(
        &self,
        request: &CredentialRequest<'_>,
        session_id: &str,
    ) -> Result<Arc<StreamSession>, SessionError> {
        if !is_session_id(session_id) {
            return Err(SessionError::MalformedSession);
        }
        let credentials = self.credentials.authenticate(request)?;
        let session = self.table().get(session_id).cloned().ok_or(SessionError::UnknownSession)?;
        if session.context.credentials.subject() != credentials.subject() {
            return Err(SessionError::SubjectMismatch);
        }
        Ok(session)
    }

    /// Moves a session to `Closing` and notifies the read channel. Returns
    /// false when the session was already closing or closed.
    fn enter_closing(&self, session: &StreamSession, reason: CloseReason) -> bool {
        {
            let mut state = session.lock();
            if !state.lifecycle.state().accepts_requests() {
                return false;
            }
            let _ = state.lifecycle.advance(ConnectionState::Closing);
        }
        record_transition(
            self.engine.audit().as_ref(),
            &session.context,
            ConnectionState::Closing,
            Some(reason),
            0,
        );
        session.deliver(
            ServerEvent::Closing {
                reason: reason.as_str().to_string(),
            }
            .into(),
        );
        true
    }

    /// Drains a closing session in the background, then closes it.
    fn begin_close(self: &Arc<Self>, session: &Arc<StreamSession>, reason: CloseReason) {
        if !self.enter_closing(session, reason) {
            return;
        }
        let hub = Arc::clone(self);
        let session = Arc::clone(session);
        tokio::spawn(async move {
            let deadline = Instant::now() + hub.limits.close_grace;
            while !session.inflight.is_empty() && Instant::now() < deadline {
                tokio::time::sleep(DRAIN_POLL).await;
            }
            hub.finish_close(&session, reason);
        });
    }

    /// Cancels remaining work, ends the read channel, and drops the session.
    fn finish_close(&self, session: &StreamSession, reason: CloseReason) {
        let cancelled = session.inflight.cancel_all();
        {
            let mut state = session.lock();
            if state.lifecycle.state() == ConnectionState::Closed {
                return;
            }
            let _ = state.lifecycle.advance(ConnectionState::Closed);
            state.subscriber = None;
            state.replay.clear();
        }
        self.table().remove(session.id());
        record_transition(
            self.engine.audit().as_ref(),
            &session.context,
            ConnectionState::Closed,
            Some(reason),
            cancelled,
        );
    }
}

/// Returns true for a well-formed session id.
fn is_session_id(value: &str) -> bool {
    value.len() == SESSION_ID_LEN
        && value.bytes().all(|byte| byte.is_ascii_digit() || (b'a' ..= b'f').contains(&byte))
}

// ============================================================================
// SECTION: HTTP Layer
// ============================================================================

/// Session query parameter.
#[derive(Debug, Default, Deserialize)]
struct SessionQuery {
    /// Session identifier.
    #[serde(default)]
    session: Option<String>,
}

/// Builds the axum router for the stream transport.
pub fn router(hub: Arc<SessionHub>) -> Router {
    let body_limit = hub.limits.max_frame_bytes;
    Router::new()
        .route("/events", get(handle_events))
        .route("/messages", post(handle_messages))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(hub)
}

/// Opens or re-attaches a read channel.
async fn handle_events(
    State(hub): State<Arc<SessionHub>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
) -> Response {
    let auth_header = authorization(&headers);
    let request = CredentialRequest {
        transport: TransportKind::Stream,
        peer_ip: Some(peer.ip()),
        auth_header: auth_header.as_deref(),
    };
    match hub.open_stream(&request, query.session.as_deref()) {
        Ok(attached) => {
            let events = ReceiverStream::new(attached.frames)
                .map(|frame| Ok::<Event, Infallible>(Event::default().data(frame.encode())));
            Sse::new(events).keep_alive(KeepAlive::default()).into_response()
        }
        Err(error) => session_error_response(&error),
    }
}

/// Accepts one client frame.
async fn handle_messages(
    State(hub): State<Arc<SessionHub>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> Response {
    let auth_header = authorization(&headers);
    let request = CredentialRequest {
        transport: TransportKind::Stream,
        peer_ip: Some(peer.ip()),
        auth_header: auth_header.as_deref(),
    };
    let Some(session_id) = query.session.as_deref() else {
        return session_error_response(&SessionError::MalformedSession);
    };
    match hub.submit(&request, session_id, &body) {
        Ok(Receipt::Accepted {
            id,
        }) => (StatusCode::ACCEPTED, Json(json!({ "received": true, "id": id }))).into_response(),
        Ok(Receipt::Rejected {
            reason,
            response,
        }) => (reason.status(), Json(response)).into_response(),
        Err(error) => session_error_response(&error),
    }
}

/// Reports liveness and the size of the tool surface.
async fn handle_health(State(hub): State<Arc<SessionHub>>) -> Response {
    Json(json!({
        "status": "ok",
        "tools": hub.engine.registry().len(),
        "sessions": hub.session_count(),
    }))
    .into_response()
}

/// Reads the authorization header as text.
fn authorization(headers: &HeaderMap) -> Option<String> {
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string)
}

/// Maps a session error to an HTTP response.
fn session_error_response(error: &SessionError) -> Response {
    let status = error.status();
    let body = Json(json!({ "error": error.to_string() }));
    if status == StatusCode::UNAUTHORIZED {
        (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
    } else {
        (status, body).into_response()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
