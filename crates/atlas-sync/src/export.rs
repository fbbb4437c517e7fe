//! # Export Controller
//!
//! Orchestrates a single export transfer: issues the request, streams the
//! artifact with byte-level progress, applies cancellation, classifies
//! failures, and counts attempts for caller-directed retries.
//!
//! ## Transfer Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Export Transfer Flow                              │
//! │                                                                         │
//! │  submit(request, on_progress)                                          │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  POST /data/export ── timeout ceiling (default 300s) ──┐               │
//! │      │                                                  │               │
//! │      │ 2xx                       non-2xx                │ exceeded      │
//! │      ▼                              │                   ▼               │
//! │  stream body chunks                 │              TIMEOUT error        │
//! │      │  each chunk:                 ▼                                   │
//! │      │  ProgressTracker ──► on_progress(pct)                            │
//! │      │  CancelToken fired? ──► Cancelled sentinel                      │
//! │      ▼                                                                  │
//! │  Artifact { bytes, content_type, filename }                            │
//! │                                                                         │
//! │  RETRY MODEL                                                           │
//! │  ───────────                                                           │
//! │  submit()  resets the attempt counter to 1                             │
//! │  retry()   resubmits the same request, counter + 1                     │
//! │  Nothing retries automatically; the policy only answers whether the    │
//! │  UI may offer the affordance.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use atlas_core::{
    validation::validate_transfer_request, ProgressTracker, RetryPolicy, TransferError,
    TransferEvent, TransferRequest, TransferState,
};

use crate::cancel::{cancel_pair, CancelHandle};
use crate::transport::{
    classify_now, request_rejected, signals_from_reqwest, signals_from_response, Transport,
};

// =============================================================================
// Artifact
// =============================================================================

/// The binary payload produced by a successful export, ready for delivery.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Raw export bytes.
    pub bytes: Vec<u8>,

    /// Content type reported by the backend, if any.
    pub content_type: Option<String>,

    /// Delivery filename: `<entity>_export.<ext>`.
    pub filename: String,
}

impl Artifact {
    /// Artifact size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// =============================================================================
// Transfer Failure
// =============================================================================

/// Failure outcome of an export transfer.
///
/// Cancellation is a sentinel, deliberately distinguishable from every
/// [`TransferError`]: a cancelled transfer is not an error to report, and it
/// never takes part in retry decisions.
#[derive(Debug, Error)]
pub enum TransferFailure {
    /// The caller cancelled the transfer.
    #[error("transfer cancelled")]
    Cancelled,

    /// The transfer failed; classified through the shared taxonomy.
    #[error(transparent)]
    Error(#[from] TransferError),
}

impl TransferFailure {
    /// True for the cancellation sentinel.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransferFailure::Cancelled)
    }
}

// =============================================================================
// Export Controller
// =============================================================================

/// Orchestrates export transfers, one at a time.
///
/// ## Preconditions
/// At most one transfer may be in flight per controller instance. Submitting
/// while another transfer is `InProgress` is a caller error; the controller
/// logs the illegal transition and carries on with the new transfer rather
/// than serializing callers.
pub struct ExportController {
    transport: Transport,
    policy: RetryPolicy,
    state: RwLock<TransferState>,
    cancel: Mutex<Option<CancelHandle>>,
    attempts: AtomicU32,
}

impl ExportController {
    /// Creates a controller with the default retry policy.
    pub fn new(transport: Transport) -> Self {
        Self::with_policy(transport, RetryPolicy::default())
    }

    /// Creates a controller with a custom retry policy.
    pub fn with_policy(transport: Transport, policy: RetryPolicy) -> Self {
        ExportController {
            transport,
            policy,
            state: RwLock::new(TransferState::Idle),
            cancel: Mutex::new(None),
            attempts: AtomicU32::new(0),
        }
    }

    /// Current transfer state.
    pub async fn state(&self) -> TransferState {
        self.state.read().await.clone()
    }

    /// Completed attempt count for the current request (submission + retries).
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Whether the UI should offer a retry for `error` after the attempts
    /// made so far.
    pub fn should_offer_retry(&self, error: &TransferError) -> bool {
        self.policy.should_offer_retry(error, self.attempts())
    }

    /// Whether a transfer is in flight and can be cancelled.
    pub async fn is_cancellable(&self) -> bool {
        self.state.read().await.is_in_progress()
    }

    /// Submits a fresh export. Resets the attempt counter.
    pub async fn submit<F>(
        &self,
        request: TransferRequest,
        on_progress: F,
    ) -> Result<Artifact, TransferFailure>
    where
        F: FnMut(u8) + Send,
    {
        self.attempts.store(1, Ordering::SeqCst);
        self.run(request, on_progress).await
    }

    /// Resubmits the same request after a failure, incrementing the attempt
    /// counter. Always caller-initiated; consult [`Self::should_offer_retry`]
    /// first.
    pub async fn retry<F>(
        &self,
        request: TransferRequest,
        on_progress: F,
    ) -> Result<Artifact, TransferFailure>
    where
        F: FnMut(u8) + Send,
    {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.run(request, on_progress).await
    }

    /// Cancels the in-flight transfer, if any.
    ///
    /// Returns `true` if the cancellation landed. Calling again, calling
    /// after the transfer settled, or calling while idle are all no-ops.
    pub async fn cancel(&self) -> bool {
        match self.cancel.lock().await.as_ref() {
            Some(handle) => handle.cancel(),
            None => false,
        }
    }

    // =========================================================================
    // Transfer Execution
    // =========================================================================

    async fn run<F>(
        &self,
        request: TransferRequest,
        mut on_progress: F,
    ) -> Result<Artifact, TransferFailure>
    where
        F: FnMut(u8) + Send,
    {
        if let Err(violation) = validate_transfer_request(&request) {
            return Err(TransferFailure::Error(request_rejected(
                &violation,
                request.source_module,
                &request.entity,
            )));
        }

        let attempt = self.attempts();
        let transfer_id = Uuid::new_v4();
        info!(
            %transfer_id,
            module = %request.source_module,
            entity = %request.entity,
            format = %request.format(),
            attempt,
            "Starting export transfer"
        );

        // Leave any unacknowledged terminal state, then open the transfer.
        self.acknowledge_terminal().await;
        self.apply(TransferEvent::Submitted { cancellable: true })
            .await;

        let (handle, mut token) = cancel_pair();
        *self.cancel.lock().await = Some(handle);

        let builder = self
            .transport
            .client
            .post(self.transport.config.export_url())
            .json(&request)
            .timeout(self.transport.config.export_timeout());
        let send = self.transport.authorize(builder).send();

        let sent = tokio::select! {
            _ = token.cancelled() => return self.finish_cancelled(&request).await,
            result = send => result,
        };

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                return self
                    .finish_failed(signals_from_reqwest(&e), &request, attempt)
                    .await;
            }
        };

        if !response.status().is_success() {
            let signals = signals_from_response(&response);
            return self.finish_failed(signals, &request, attempt).await;
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let total = response.content_length();

        let mut tracker = ProgressTracker::new();
        let mut bytes: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();

        loop {
            let chunk = tokio::select! {
                _ = token.cancelled() => return self.finish_cancelled(&request).await,
                chunk = stream.next() => chunk,
            };

            match chunk {
                Some(Ok(chunk)) => {
                    bytes.extend_from_slice(&chunk);
                    if let Some(pct) = tracker.update(bytes.len() as u64, total) {
                        self.apply(TransferEvent::Progress(pct)).await;
                        on_progress(pct);
                    }
                }
                Some(Err(e)) => {
                    return self
                        .finish_failed(signals_from_reqwest(&e), &request, attempt)
                        .await;
                }
                None => break,
            }
        }

        // Body complete: a known total always ends at 100.
        if let Some(total_bytes) = total {
            if let Some(pct) = tracker.update(total_bytes, total) {
                self.apply(TransferEvent::Progress(pct)).await;
                on_progress(pct);
            }
        }

        self.settle().await;
        self.apply(TransferEvent::Completed {
            size_bytes: bytes.len() as u64,
        })
        .await;

        info!(
            %transfer_id,
            size_bytes = bytes.len(),
            "Export transfer complete"
        );

        Ok(Artifact {
            bytes,
            content_type,
            filename: request.export_filename(),
        })
    }

    async fn finish_cancelled(&self, request: &TransferRequest) -> Result<Artifact, TransferFailure> {
        self.settle().await;
        info!(
            module = %request.source_module,
            entity = %request.entity,
            "Export transfer cancelled"
        );
        self.apply(TransferEvent::Cancelled).await;
        // Cancelled, then back to Idle: the sentinel reaches the caller and
        // the controller is immediately ready for a fresh submission.
        self.apply(TransferEvent::Acknowledged).await;
        Err(TransferFailure::Cancelled)
    }

    async fn finish_failed(
        &self,
        signals: atlas_core::FailureSignals,
        request: &TransferRequest,
        attempt: u32,
    ) -> Result<Artifact, TransferFailure> {
        self.settle().await;
        let error = classify_now(&signals, request.source_module, &request.entity);
        warn!(
            module = %request.source_module,
            entity = %request.entity,
            category = %error.category,
            code = %error.code,
            retryable = error.retryable,
            attempt,
            "Export transfer failed"
        );
        self.apply(TransferEvent::Failed {
            error: error.clone(),
            attempt,
        })
        .await;
        Err(TransferFailure::Error(error))
    }

    /// Drops the cancellation pair; later `cancel()` calls become no-ops.
    async fn settle(&self) {
        self.cancel.lock().await.take();
    }

    async fn acknowledge_terminal(&self) {
        let mut guard = self.state.write().await;
        if guard.is_terminal() {
            if let Ok(next) = guard.clone().apply(TransferEvent::Acknowledged) {
                *guard = next;
            }
        }
    }

    /// Drives the state machine, logging (not masking) illegal transitions.
    async fn apply(&self, event: TransferEvent) {
        let mut guard = self.state.write().await;
        match guard.clone().apply(event) {
            Ok(next) => {
                debug!(state = %next, "Transfer state transition");
                *guard = next;
            }
            Err(e) => warn!(%e, "Transfer state transition rejected"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
