// voice-gateway-mcp/src/bridge.rs
// ============================================================================
// Module: Execution Bridge
// Description: Bounded worker pool for blocking capability handlers.
// Purpose: Keep connection loops responsive while handlers block.
// Dependencies: tokio, tokio-util
// ============================================================================

//! ## Overview
//! [`ExecutionBridge::submit`] runs a blocking [`ToolHandler`] on tokio's
//! blocking pool without blocking the caller. Capacity is bounded twice:
//! - an admission semaphore sized `workers + queue_capacity` rejects excess
//!   submissions immediately with [`BridgeError::Overloaded`];
//! - a worker semaphore sized `workers` limits concurrent handler runs.
//!
//! The timeout covers queue wait plus execution. A handler that is already
//! running is never preempted: on timeout the caller gets
//! [`BridgeError::Timeout`] while the worker keeps its permit until the handler
//! returns, and the late result is dropped. Cancellation removes work that has
//! not started yet.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::config::BridgeConfig;
use crate::registry::HandlerError;
use crate::registry::ToolHandler;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Bridge submission failures.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Admission capacity exhausted.
    #[error("execution bridge at capacity")]
    Overloaded,
    /// Queue wait plus execution exceeded the timeout.
    #[error("handler timed out")]
    Timeout,
    /// Cancelled before the handler started.
    #[error("cancelled before start")]
    Cancelled,
    /// Handler returned an error.
    #[error(transparent)]
    Failed(HandlerError),
    /// Handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

// ============================================================================
// SECTION: Bridge
// ============================================================================

/// Bounded sync/async execution bridge.
#[derive(Debug, Clone)]
pub struct ExecutionBridge {
    /// Admission permits (`workers + queue_capacity`).
    admission: Arc<Semaphore>,
    /// Worker permits (`workers`).
    workers: Arc<Semaphore>,
    /// Configured worker count.
    worker_count: usize,
    /// Configured queue capacity.
    queue_capacity: usize,
}

impl ExecutionBridge {
    /// Creates a bridge with `workers` concurrent handlers and up to
    /// `queue_capacity` submissions waiting for a worker.
    #[must_use]
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        let workers = workers.max(1);
        Self {
            admission: Arc::new(Semaphore::new(workers.saturating_add(queue_capacity))),
            workers: Arc::new(Semaphore::new(workers)),
            worker_count: workers,
            queue_capacity,
        }
    }

    /// Creates a bridge from validated config.
    #[must_use]
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.workers, config.queue_capacity)
    }

    /// Returns the configured worker count.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Returns the configured queue capacity.
    #[must_use]
    pub const fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Returns the number of submissions currently admitted.
    #[must_use]
    pub fn admitted(&self) -> usize {
        (self.worker_count + self.queue_capacity).saturating_sub(self.admission.available_permits())
    }

    /// Runs `handler` off the serving loop.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] when the bridge is full, the timeout elapses,
    /// the request is cancelled before it starts, or the handler fails.
    pub async fn submit(
        &self,
        handler: Arc<dyn ToolHandler>,
        arguments: Value,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<Value, BridgeError> {
        let admission =
            Arc::clone(&self.admission).try_acquire_owned().map_err(|_| BridgeError::Overloaded)?;
        let workers = Arc::clone(&self.workers);
        let run = async move {
            let worker = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(BridgeError::Cancelled),
                permit = workers.acquire_owned() => permit.map_err(|_| BridgeError::Cancelled)?,
            };
            let task = tokio::task::spawn_blocking(move || {
                let _permits = (admission, worker);
                handler.call(arguments)
            });
            match task.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(BridgeError::Failed(err)),
                Err(join) => Err(BridgeError::Panicked(join.to_string())),
            }
        };
        tokio::time::timeout(timeout, run).await.unwrap_or(Err(BridgeError::Timeout))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
