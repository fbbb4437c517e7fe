//! # Transfer Error Taxonomy
//!
//! Error types for cross-module transfers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Failure Classification Flow                        │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │ Backend envelope│  │  HTTP status    │  │  Transport failure      │ │
//! │  │  x-error-code   │  │  401/403/408    │  │  TimedOut               │ │
//! │  │  x-error-message│  │  4xx / 5xx      │  │  ConnectionFailed       │ │
//! │  │  x-error-type   │  │                 │  │  MalformedBody          │ │
//! │  └────────┬────────┘  └────────┬────────┘  └────────────┬────────────┘ │
//! │           │                    │                        │              │
//! │           └──────────┬─────────┴────────────────────────┘              │
//! │                      ▼                                                  │
//! │              FailureSignals ──► classify() ──► TransferError           │
//! │                                                                         │
//! │  Exactly one ErrorCategory per failure; retryable derived, never set   │
//! │  ad hoc.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::types::ModuleId;

// =============================================================================
// Error Category
// =============================================================================

/// Closed classification of transfer failures.
///
/// Every failure maps to exactly one category. The suite UIs key their
/// messaging and retry affordances off this value, so the set never grows
/// silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// No response arrived at all (DNS, refused connection, dropped link).
    Network,
    /// The session is missing, expired, or lacks permission (401/403).
    Authentication,
    /// The transfer exceeded its time ceiling (client or backend side).
    Timeout,
    /// The request was rejected as malformed or not allowed.
    Validation,
    /// The target module is not set up for this operation.
    Configuration,
    /// The backend answered with a payload that could not be processed.
    Data,
    /// The backend failed while doing the work (5xx).
    Server,
    /// Nothing usable could be determined about the failure.
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::Network => "NETWORK",
            ErrorCategory::Authentication => "AUTHENTICATION",
            ErrorCategory::Timeout => "TIMEOUT",
            ErrorCategory::Validation => "VALIDATION",
            ErrorCategory::Configuration => "CONFIGURATION",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Server => "SERVER",
            ErrorCategory::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Transfer Error
// =============================================================================

/// A classified transfer failure, as surfaced to callers and the UI.
///
/// ## Design Principles
/// - `retryable` is derived deterministically from `category` and `code` by
///   [`crate::classify::classify`], never set ad hoc
/// - `message` is a fixed user-facing template per category (VALIDATION
///   additionally carries the backend's specifics)
/// - `code`, `details` and `timestamp` travel along for audit and debugging
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct TransferError {
    /// Taxonomy bucket this failure landed in.
    pub category: ErrorCategory,

    /// Stable machine-readable code (backend-supplied or synthesized).
    pub code: String,

    /// User-facing message.
    pub message: String,

    /// Backend-supplied diagnostic detail, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Whether resubmitting the same request may succeed.
    pub retryable: bool,

    /// Module the failed transfer addressed.
    pub module: ModuleId,

    /// Entity the failed transfer addressed.
    pub entity: String,

    /// When the failure was classified.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Raw Failure Signals
// =============================================================================

/// Structured error envelope a module backend attaches to a failed response
/// via the `x-error-*` headers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorEnvelope {
    /// `x-error-code` - stable backend error code.
    pub code: String,

    /// `x-error-message` - backend's own description of the failure.
    pub message: String,

    /// `x-error-details` - optional extra diagnostics.
    pub details: Option<String>,

    /// `x-error-type` - category hint, e.g. `VALIDATION_ERROR`.
    pub kind: Option<String>,
}

/// A failure below the HTTP layer, where no status code exists.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportFailure {
    /// The transfer exceeded its configured time ceiling.
    TimedOut,

    /// The connection could not be established or was dropped mid-transfer.
    ConnectionFailed(String),

    /// A 2xx response carried a body that could not be decoded.
    MalformedBody(String),
}

/// Everything the transport layer could observe about one failed attempt.
///
/// Input to [`crate::classify::classify`]. At most one of the three signal
/// groups is normally present; precedence when several are is envelope,
/// then status, then transport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FailureSignals {
    /// HTTP status code, if a response arrived.
    pub status: Option<u16>,

    /// Backend structured envelope, if the error headers were present.
    pub envelope: Option<ErrorEnvelope>,

    /// Sub-HTTP failure, if no usable response arrived.
    pub transport: Option<TransportFailure>,
}

impl FailureSignals {
    /// Signals for a response that carried the structured error headers.
    pub fn from_envelope(status: u16, envelope: ErrorEnvelope) -> Self {
        FailureSignals {
            status: Some(status),
            envelope: Some(envelope),
            transport: None,
        }
    }

    /// Signals for a failed response without structured headers.
    pub fn from_status(status: u16) -> Self {
        FailureSignals {
            status: Some(status),
            envelope: None,
            transport: None,
        }
    }

    /// Signals for a failure below the HTTP layer.
    pub fn from_transport(failure: TransportFailure) -> Self {
        FailureSignals {
            status: None,
            envelope: None,
            transport: Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display_matches_wire_name() {
        assert_eq!(ErrorCategory::Network.to_string(), "NETWORK");
        assert_eq!(ErrorCategory::Authentication.to_string(), "AUTHENTICATION");
        assert_eq!(ErrorCategory::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_transfer_error_display_is_user_message() {
        let err = TransferError {
            category: ErrorCategory::Server,
            code: "INTERNAL_ERROR".to_string(),
            message: "The module backend failed while processing the transfer.".to_string(),
            details: None,
            retryable: true,
            module: ModuleId::Financial,
            entity: "invoices".to_string(),
            timestamp: DateTime::<Utc>::MIN_UTC,
        };
        assert_eq!(err.to_string(), err.message);
    }
}
