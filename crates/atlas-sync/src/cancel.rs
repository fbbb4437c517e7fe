//! # Cancellation
//!
//! Single-use cancellation for in-flight export transfers.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cancellation Lifecycle                             │
//! │                                                                         │
//! │  submit() ──► cancel_pair() ──► (CancelHandle, CancelToken)            │
//! │                                      │              │                   │
//! │                 UI keeps handle ◄────┘              └──► select!-ed     │
//! │                                                          against I/O    │
//! │                                                                         │
//! │  cancel()  while in flight   → aborts the transfer, returns true       │
//! │  cancel()  again             → no-op, returns false (at most one)      │
//! │  cancel()  after settling    → no-op, returns false (token dropped)    │
//! │  cancel()  while idle        → no-op (controller has no handle)        │
//! │                                                                         │
//! │  One pair exists per transfer; the prior pair is discarded before a    │
//! │  new transfer starts. Server-side work already accepted is NOT         │
//! │  stopped - this is client-side, best effort only.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::mpsc;

/// Creates a linked cancellation pair for one transfer.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    // Capacity 1: the first cancel() lands, every later one is a no-op.
    let (tx, rx) = mpsc::channel(1);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Caller-side handle that aborts at most one in-flight transfer.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: mpsc::Sender<()>,
}

impl CancelHandle {
    /// Requests cancellation.
    ///
    /// Returns `true` if the request landed; `false` when cancellation was
    /// already requested or the transfer has settled.
    pub fn cancel(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }

    /// Whether the owning transfer has settled and dropped its token.
    pub fn is_spent(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Transfer-side token awaited inside the I/O loop.
#[derive(Debug)]
pub struct CancelToken {
    rx: mpsc::Receiver<()>,
}

impl CancelToken {
    /// Resolves when cancellation is requested.
    ///
    /// If every handle is dropped without cancelling, the future stays
    /// pending: an abandoned handle must not read as a cancellation.
    pub async fn cancelled(&mut self) {
        if self.rx.recv().await.is_some() {
            return;
        }
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_lands_once() {
        let (handle, mut token) = cancel_pair();
        assert!(handle.cancel());
        assert!(!handle.cancel());
        token.cancelled().await; // resolves immediately
    }

    #[tokio::test]
    async fn test_cancel_after_settle_is_noop() {
        let (handle, token) = cancel_pair();
        drop(token);
        assert!(handle.is_spent());
        assert!(!handle.cancel());
    }

    #[tokio::test]
    async fn test_dropped_handle_is_not_a_cancellation() {
        let (handle, mut token) = cancel_pair();
        drop(handle);
        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            token.cancelled(),
        )
        .await;
        assert!(waited.is_err(), "cancelled() must stay pending");
    }
}
