//! # Transfer State Machine
//!
//! Lifecycle of one logical transfer as an explicit tagged union with a
//! single transition function, testable independent of any UI framework.
//!
//! ## Transfer Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Transfer States                                   │
//! │                                                                         │
//! │  ┌────────┐  Submitted   ┌────────────┐                                │
//! │  │  Idle  │ ───────────► │ InProgress │ ◄──┐                           │
//! │  └────────┘              └─────┬──────┘    │ Progress(pct)             │
//! │      ▲                         │───────────┘                           │
//! │      │          ┌──────────────┼──────────────┐                        │
//! │      │          ▼              ▼              ▼                        │
//! │      │   ┌───────────┐  ┌────────────┐  ┌───────────┐                 │
//! │      │   │ Succeeded │  │   Failed   │  │ Cancelled │                 │
//! │      │   └─────┬─────┘  └─────┬──────┘  └─────┬─────┘                 │
//! │      │         │              │               │                        │
//! │      └─────────┴──────────────┴───────────────┘                        │
//! │                        Acknowledged                                     │
//! │                                                                         │
//! │  ORDERING GUARANTEE                                                    │
//! │  ──────────────────                                                    │
//! │  A terminal transition is always the last event of a transfer; a       │
//! │  Progress event against a terminal state is rejected, never dropped    │
//! │  silently.                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::error::TransferError;

// =============================================================================
// Transfer State
// =============================================================================

/// State of one logical transfer. Exactly one is active per job; a new
/// submission always starts from `Idle`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TransferState {
    /// No transfer submitted, or the last terminal state was acknowledged.
    #[default]
    Idle,

    /// A transfer is in flight.
    InProgress {
        /// Last reported percentage; `None` while indeterminate.
        progress: Option<u8>,
        /// Whether the transfer can still be cancelled.
        cancellable: bool,
    },

    /// The transfer completed; the artifact went to the caller.
    Succeeded {
        /// Size of the delivered artifact.
        size_bytes: u64,
    },

    /// The transfer failed after `attempt` completed attempts.
    Failed {
        /// Classified failure.
        error: TransferError,
        /// Completed attempt count (initial submission counts as 1).
        attempt: u32,
    },

    /// The transfer was cancelled by the caller.
    Cancelled,
}

impl TransferState {
    /// True while a transfer is in flight.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, TransferState::InProgress { .. })
    }

    /// True for `Succeeded`, `Failed` and `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferState::Succeeded { .. } | TransferState::Failed { .. } | TransferState::Cancelled
        )
    }
}

impl std::fmt::Display for TransferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferState::Idle => write!(f, "idle"),
            TransferState::InProgress { .. } => write!(f, "in_progress"),
            TransferState::Succeeded { .. } => write!(f, "succeeded"),
            TransferState::Failed { .. } => write!(f, "failed"),
            TransferState::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =============================================================================
// Transfer Events
// =============================================================================

/// Events driving the transfer state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    /// A new transfer was submitted.
    Submitted {
        /// Whether the transfer supports cancellation.
        cancellable: bool,
    },

    /// A new percentage became reportable.
    Progress(u8),

    /// The transfer completed with an artifact of this size.
    Completed {
        /// Size of the artifact handed to the caller.
        size_bytes: u64,
    },

    /// The transfer failed.
    Failed {
        /// Classified failure.
        error: TransferError,
        /// Completed attempt count.
        attempt: u32,
    },

    /// The transfer was cancelled.
    Cancelled,

    /// The caller acknowledged a terminal state.
    Acknowledged,
}

impl std::fmt::Display for TransferEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferEvent::Submitted { .. } => write!(f, "submitted"),
            TransferEvent::Progress(pct) => write!(f, "progress({})", pct),
            TransferEvent::Completed { .. } => write!(f, "completed"),
            TransferEvent::Failed { .. } => write!(f, "failed"),
            TransferEvent::Cancelled => write!(f, "cancelled"),
            TransferEvent::Acknowledged => write!(f, "acknowledged"),
        }
    }
}

// =============================================================================
// Transition Errors
// =============================================================================

/// An event that is illegal in the current state.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("illegal transfer transition: {event} while {state}")]
pub struct StateError {
    /// State the machine was in.
    pub state: String,
    /// Event that was rejected.
    pub event: String,
}

// =============================================================================
// Transition Function
// =============================================================================

impl TransferState {
    /// Applies one event, returning the next state.
    ///
    /// The single place transfer lifecycle rules live. Anything not listed
    /// here is an illegal transition and comes back as [`StateError`].
    pub fn apply(self, event: TransferEvent) -> Result<TransferState, StateError> {
        match (self, event) {
            (TransferState::Idle, TransferEvent::Submitted { cancellable }) => {
                Ok(TransferState::InProgress {
                    progress: None,
                    cancellable,
                })
            }

            (TransferState::InProgress { cancellable, .. }, TransferEvent::Progress(pct)) => {
                Ok(TransferState::InProgress {
                    progress: Some(pct),
                    cancellable,
                })
            }

            (TransferState::InProgress { .. }, TransferEvent::Completed { size_bytes }) => {
                Ok(TransferState::Succeeded { size_bytes })
            }

            (TransferState::InProgress { .. }, TransferEvent::Failed { error, attempt }) => {
                Ok(TransferState::Failed { error, attempt })
            }

            (TransferState::InProgress { .. }, TransferEvent::Cancelled) => {
                Ok(TransferState::Cancelled)
            }

            (state, TransferEvent::Acknowledged) if state.is_terminal() => Ok(TransferState::Idle),

            (state, event) => Err(StateError {
                state: state.to_string(),
                event: event.to_string(),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
