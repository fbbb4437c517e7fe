//! # Failure Classification
//!
//! Turns the raw signals of one failed transfer attempt into a
//! [`TransferError`] with a stable category and a derived retryability
//! verdict.
//!
//! ## Classification Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Classification Precedence                           │
//! │                                                                         │
//! │  1. Backend envelope (x-error-type hint)         ── authoritative      │
//! │     AUTHENTICATION_ERROR → Authentication                              │
//! │     VALIDATION_ERROR     → Validation                                  │
//! │     CONFIGURATION_ERROR  → Configuration                               │
//! │     INTERNAL_ERROR       → Server (retryable)                          │
//! │     anything else        → Server (retryable)                          │
//! │                                                                         │
//! │  2. HTTP status fallback (no envelope)                                 │
//! │     401 / 403 → Authentication      408 → Timeout (retryable)          │
//! │     other 4xx → Validation          5xx → Server (retryable)           │
//! │                                                                         │
//! │  3. Transport fallback (no response at all)                            │
//! │     TimedOut → Timeout    ConnectionFailed → Network                   │
//! │     MalformedBody → Data                                               │
//! │                                                                         │
//! │  4. Nothing observable → Unknown                                       │
//! │                                                                         │
//! │  Then, regardless of the above: a code containing TIMEOUT, CONNECTION, │
//! │  UNAVAILABLE, LIMIT, NETWORK or CANCELLED forces retryable = true.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The function is pure: the timestamp is an argument, so identical input
//! always yields an identical [`TransferError`].

use chrono::{DateTime, Utc};

use crate::error::{ErrorCategory, FailureSignals, TransferError, TransportFailure};
use crate::types::ModuleId;

// =============================================================================
// Transient Code Tokens
// =============================================================================

/// Code substrings that mark a failure as transient even when the backend
/// mis-categorized it upstream.
pub const TRANSIENT_CODE_TOKENS: [&str; 6] = [
    "TIMEOUT",
    "CONNECTION",
    "UNAVAILABLE",
    "LIMIT",
    "NETWORK",
    "CANCELLED",
];

// Synthesized codes for failures the backend never labelled.
const CODE_NETWORK: &str = "NETWORK_FAILURE";
const CODE_TIMEOUT: &str = "TRANSFER_TIMEOUT";
const CODE_MALFORMED: &str = "MALFORMED_RESPONSE";
const CODE_UNKNOWN: &str = "UNKNOWN_FAILURE";

// =============================================================================
// Classification
// =============================================================================

/// Classifies one failed transfer attempt.
///
/// `module` and `entity` come from the request that failed and travel into
/// the resulting error for audit. `at` is the classification timestamp -
/// injected by the caller so this function stays deterministic.
pub fn classify(
    signals: &FailureSignals,
    module: ModuleId,
    entity: &str,
    at: DateTime<Utc>,
) -> TransferError {
    let (category, code, backend_message, details) = resolve(signals);

    let retryable = is_retryable(category, &code);
    let message = render_message(category, backend_message.as_deref());

    TransferError {
        category,
        code,
        message,
        details,
        retryable,
        module,
        entity: entity.to_string(),
        timestamp: at,
    }
}

/// Resolves category, code, backend message and details per the precedence
/// table in the module docs.
fn resolve(signals: &FailureSignals) -> (ErrorCategory, String, Option<String>, Option<String>) {
    if let Some(envelope) = &signals.envelope {
        let category = match envelope.kind.as_deref() {
            Some("AUTHENTICATION_ERROR") => ErrorCategory::Authentication,
            Some("VALIDATION_ERROR") => ErrorCategory::Validation,
            Some("CONFIGURATION_ERROR") => ErrorCategory::Configuration,
            Some("INTERNAL_ERROR") => ErrorCategory::Server,
            _ => ErrorCategory::Server,
        };
        let code = if envelope.code.is_empty() {
            CODE_UNKNOWN.to_string()
        } else {
            envelope.code.clone()
        };
        let message = if envelope.message.is_empty() {
            None
        } else {
            Some(envelope.message.clone())
        };
        return (category, code, message, envelope.details.clone());
    }

    if let Some(status) = signals.status {
        let category = match status {
            401 | 403 => ErrorCategory::Authentication,
            408 => ErrorCategory::Timeout,
            400..=499 => ErrorCategory::Validation,
            500..=599 => ErrorCategory::Server,
            _ => ErrorCategory::Unknown,
        };
        return (category, format!("HTTP_{}", status), None, None);
    }

    if let Some(transport) = &signals.transport {
        return match transport {
            TransportFailure::TimedOut => {
                (ErrorCategory::Timeout, CODE_TIMEOUT.to_string(), None, None)
            }
            TransportFailure::ConnectionFailed(detail) => (
                ErrorCategory::Network,
                CODE_NETWORK.to_string(),
                None,
                Some(detail.clone()),
            ),
            TransportFailure::MalformedBody(detail) => (
                ErrorCategory::Data,
                CODE_MALFORMED.to_string(),
                None,
                Some(detail.clone()),
            ),
        };
    }

    (ErrorCategory::Unknown, CODE_UNKNOWN.to_string(), None, None)
}

/// Derives the retryability verdict from category and code.
///
/// Base verdict by category, then the transient-token override: codes that
/// signal a transient condition force `true` even when the backend
/// mis-categorized the failure.
fn is_retryable(category: ErrorCategory, code: &str) -> bool {
    let base = matches!(
        category,
        ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Server
    );
    if base {
        return true;
    }

    let upper = code.to_uppercase();
    TRANSIENT_CODE_TOKENS
        .iter()
        .any(|token| upper.contains(token))
}

/// Renders the fixed user-facing template for a category.
///
/// VALIDATION is the one category that appends the backend's own message:
/// "request rejected" is useless to a user without the reason.
fn render_message(category: ErrorCategory, backend_message: Option<&str>) -> String {
    match category {
        ErrorCategory::Network => {
            "Unable to reach the module backend. Check your connection and try again.".to_string()
        }
        ErrorCategory::Authentication => {
            "Your session is not authorized for this operation. Sign in again and retry."
                .to_string()
        }
        ErrorCategory::Timeout => {
            "The transfer took too long and was aborted. Try again in a few minutes.".to_string()
        }
        ErrorCategory::Validation => match backend_message {
            Some(reason) => format!("The request was rejected by the backend: {}", reason),
            None => "The request was rejected by the backend.".to_string(),
        },
        ErrorCategory::Configuration => {
            "The module is not configured for this operation. Contact an administrator."
                .to_string()
        }
        ErrorCategory::Data => {
            "The backend returned data that could not be processed.".to_string()
        }
        ErrorCategory::Server => {
            "The module backend failed while processing the transfer. Try again later.".to_string()
        }
        ErrorCategory::Unknown => "The transfer failed for an unknown reason.".to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorEnvelope;

    fn at() -> DateTime<Utc> {
        DateTime::<Utc>::MIN_UTC
    }

    fn envelope(kind: &str, code: &str, message: &str) -> FailureSignals {
        FailureSignals::from_envelope(
            400,
            ErrorEnvelope {
                code: code.to_string(),
                message: message.to_string(),
                details: None,
                kind: Some(kind.to_string()),
            },
        )
    }

    #[test]
    fn test_classify_is_deterministic() {
        let signals = envelope("VALIDATION_ERROR", "BAD_FIELD", "unknown field");
        let first = classify(&signals, ModuleId::Financial, "invoices", at());
        let second = classify(&signals, ModuleId::Financial, "invoices", at());
        assert_eq!(first, second);
    }

    #[test]
    fn test_envelope_kind_mapping() {
        let cases = [
            ("AUTHENTICATION_ERROR", ErrorCategory::Authentication, false),
            ("VALIDATION_ERROR", ErrorCategory::Validation, false),
            ("CONFIGURATION_ERROR", ErrorCategory::Configuration, false),
            ("INTERNAL_ERROR", ErrorCategory::Server, true),
            ("SOMETHING_NEW", ErrorCategory::Server, true),
        ];
        for (kind, category, retryable) in cases {
            let err = classify(
                &envelope(kind, "E1", "boom"),
                ModuleId::Manager,
                "products",
                at(),
            );
            assert_eq!(err.category, category, "kind {}", kind);
            assert_eq!(err.retryable, retryable, "kind {}", kind);
        }
    }

    #[test]
    fn test_validation_message_carries_backend_specifics() {
        let err = classify(
            &envelope("VALIDATION_ERROR", "BAD_FIELD", "unknown field"),
            ModuleId::Financial,
            "invoices",
            at(),
        );
        assert_eq!(err.category, ErrorCategory::Validation);
        assert!(!err.retryable);
        assert_eq!(err.code, "BAD_FIELD");
        assert!(err.message.contains("unknown field"));
    }

    #[test]
    fn test_non_validation_messages_are_templates() {
        // The raw backend string never leaks outside VALIDATION.
        let err = classify(
            &envelope("INTERNAL_ERROR", "E_DB", "ORA-00600 internal error code"),
            ModuleId::Cloud,
            "sales",
            at(),
        );
        assert!(!err.message.contains("ORA-00600"));
    }

    #[test]
    fn test_status_fallback_mapping() {
        let cases = [
            (401, ErrorCategory::Authentication, false),
            (403, ErrorCategory::Authentication, false),
            (408, ErrorCategory::Timeout, true),
            (422, ErrorCategory::Validation, false),
            (500, ErrorCategory::Server, true),
            (503, ErrorCategory::Server, true),
        ];
        for (status, category, retryable) in cases {
            let err = classify(
                &FailureSignals::from_status(status),
                ModuleId::Production,
                "stock",
                at(),
            );
            assert_eq!(err.category, category, "status {}", status);
            assert_eq!(err.retryable, retryable, "status {}", status);
            assert_eq!(err.code, format!("HTTP_{}", status));
        }
    }

    #[test]
    fn test_no_response_is_retryable_network() {
        let err = classify(
            &FailureSignals::from_transport(TransportFailure::ConnectionFailed(
                "connection refused".to_string(),
            )),
            ModuleId::Financial,
            "invoices",
            at(),
        );
        assert_eq!(err.category, ErrorCategory::Network);
        assert!(err.retryable);
        assert_eq!(err.details.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_timeout_is_not_plain_network_failure() {
        let err = classify(
            &FailureSignals::from_transport(TransportFailure::TimedOut),
            ModuleId::Manager,
            "products",
            at(),
        );
        assert_eq!(err.category, ErrorCategory::Timeout);
        assert!(err.retryable);
    }

    #[test]
    fn test_malformed_body_is_data_and_final() {
        let err = classify(
            &FailureSignals::from_transport(TransportFailure::MalformedBody(
                "expected value at line 1".to_string(),
            )),
            ModuleId::Manager,
            "products",
            at(),
        );
        assert_eq!(err.category, ErrorCategory::Data);
        assert!(!err.retryable);
    }

    #[test]
    fn test_transient_code_tokens_force_retryable() {
        // Every token wins over a non-retryable category.
        for token in TRANSIENT_CODE_TOKENS {
            let code = format!("E_{}_01", token);
            let err = classify(
                &envelope("VALIDATION_ERROR", &code, "misfiled"),
                ModuleId::Cloud,
                "users",
                at(),
            );
            assert!(err.retryable, "token {} must force retryable", token);
        }

        // Token matching is case-insensitive on the code.
        let err = classify(
            &envelope("AUTHENTICATION_ERROR", "session_limit_reached", ""),
            ModuleId::Cloud,
            "users",
            at(),
        );
        assert!(err.retryable);
    }

    #[test]
    fn test_empty_signals_classify_as_unknown() {
        let err = classify(
            &FailureSignals::default(),
            ModuleId::Manager,
            "products",
            at(),
        );
        assert_eq!(err.category, ErrorCategory::Unknown);
        assert!(!err.retryable);
        assert_eq!(err.code, "UNKNOWN_FAILURE");
    }

    #[test]
    fn test_envelope_wins_over_status() {
        // A 500 status with a VALIDATION_ERROR envelope is a validation
        // failure; the envelope is authoritative.
        let signals = FailureSignals::from_envelope(
            500,
            ErrorEnvelope {
                code: "BAD_FIELD".to_string(),
                message: "unknown field".to_string(),
                details: None,
                kind: Some("VALIDATION_ERROR".to_string()),
            },
        );
        let err = classify(&signals, ModuleId::Financial, "invoices", at());
        assert_eq!(err.category, ErrorCategory::Validation);
    }
}
