//! # Retry Policy
//!
//! Decides whether a failed export may be offered for resubmission.
//!
//! There is no automatic retry loop anywhere in the client: every retry is a
//! fresh, explicit, caller-initiated submission. This module only answers
//! "should the UI show the retry affordance", bounded by a maximum attempt
//! count.

use crate::error::TransferError;
use crate::MAX_EXPORT_ATTEMPTS;

/// Bounded, caller-directed retry decisions.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: MAX_EXPORT_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with a custom attempt ceiling.
    pub fn new(max_attempts: u32) -> Self {
        RetryPolicy { max_attempts }
    }

    /// Maximum number of attempts (initial submission included).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether a retry should be offered after `attempt_count` completed
    /// attempts ended in `error`.
    ///
    /// Non-retryable errors and exhausted ceilings both answer `false`; the
    /// UI then tells the user to wait before trying again.
    pub fn should_offer_retry(&self, error: &TransferError, attempt_count: u32) -> bool {
        error.retryable && attempt_count < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::error::{FailureSignals, TransportFailure};
    use crate::types::ModuleId;
    use chrono::{DateTime, Utc};

    fn network_error() -> TransferError {
        classify(
            &FailureSignals::from_transport(TransportFailure::ConnectionFailed(
                "refused".to_string(),
            )),
            ModuleId::Financial,
            "invoices",
            DateTime::<Utc>::MIN_UTC,
        )
    }

    fn validation_error() -> TransferError {
        classify(
            &FailureSignals::from_status(422),
            ModuleId::Financial,
            "invoices",
            DateTime::<Utc>::MIN_UTC,
        )
    }

    #[test]
    fn test_retry_offered_below_ceiling() {
        let policy = RetryPolicy::default();
        let error = network_error();
        assert!(policy.should_offer_retry(&error, 1));
        assert!(policy.should_offer_retry(&error, 2));
    }

    #[test]
    fn test_retry_ceiling_is_hard() {
        // Three failed attempts exhaust the ceiling for every error kind.
        let policy = RetryPolicy::default();
        assert!(!policy.should_offer_retry(&network_error(), 3));
        assert!(!policy.should_offer_retry(&network_error(), 4));
        assert!(!policy.should_offer_retry(&validation_error(), 3));
    }

    #[test]
    fn test_non_retryable_errors_never_offered() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_offer_retry(&validation_error(), 0));
        assert!(!policy.should_offer_retry(&validation_error(), 1));
    }
}
