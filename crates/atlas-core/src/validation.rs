//! # Request Validation
//!
//! Client-side validation of transfer requests, including the
//! protected-entity guardrail for broadcast sync.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Suite frontend (TypeScript)                                  │
//! │  ├── Basic format checks (empty entity, roster selection)              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any network call)                        │
//! │  ├── Entity name checks                                                │
//! │  └── Protected-entity guardrail for broadcast sync                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Module backends                                              │
//! │  ├── Schema validation                                                 │
//! │  └── Source exclusion from the fan-out roster                          │
//! │                                                                         │
//! │  Defense in depth: the guardrail holds even if a backend regresses     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::{SyncRequest, TransferRequest};

/// Entity types the client refuses to broadcast-sync regardless of caller
/// input. Matched case-insensitively against the trimmed entity name.
pub const PROTECTED_ENTITIES: &[&str] = &["users", "user"];

/// Result type for request validation.
pub type ValidationResult = Result<(), RequestValidationError>;

/// Client-side request validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestValidationError {
    /// Entity name is missing or blank.
    #[error("entity is required")]
    EmptyEntity,

    /// Entity is on the protected denylist for broadcast sync.
    #[error("entity '{0}' is protected and cannot be synchronized across modules")]
    ProtectedEntity(String),

    /// Broadcast request carries no target modules.
    #[error("targetModules must not be empty")]
    NoTargetModules,
}

/// Whether an entity name is on the broadcast-sync denylist.
pub fn is_protected_entity(entity: &str) -> bool {
    let trimmed = entity.trim();
    PROTECTED_ENTITIES
        .iter()
        .any(|protected| trimmed.eq_ignore_ascii_case(protected))
}

/// Validates an export request before submission.
pub fn validate_transfer_request(request: &TransferRequest) -> ValidationResult {
    if request.entity.trim().is_empty() {
        return Err(RequestValidationError::EmptyEntity);
    }
    Ok(())
}

/// Validates a broadcast sync request before dispatch.
///
/// The protected-entity check runs here, client-side, independent of the
/// backend's own enforcement. Roster contents are deliberately not filtered
/// (the backend owns topology); only emptiness is rejected.
pub fn validate_sync_request(request: &SyncRequest) -> ValidationResult {
    if request.entity.trim().is_empty() {
        return Err(RequestValidationError::EmptyEntity);
    }
    if is_protected_entity(&request.entity) {
        return Err(RequestValidationError::ProtectedEntity(
            request.entity.trim().to_string(),
        ));
    }
    if request.target_modules.is_empty() {
        return Err(RequestValidationError::NoTargetModules);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExportFormat, ModuleId};

    #[test]
    fn test_protected_entity_is_case_insensitive() {
        for entity in ["users", "Users", "USER", "uSeRs", " users "] {
            assert!(is_protected_entity(entity), "{} must be protected", entity);
        }
        for entity in ["products", "user_roles", "usersessions"] {
            assert!(!is_protected_entity(entity), "{} must pass", entity);
        }
    }

    #[test]
    fn test_sync_guardrail_rejects_protected_entities() {
        for entity in ["users", "Users", "USER"] {
            let request = SyncRequest::broadcast(ModuleId::Manager, entity);
            assert_eq!(
                validate_sync_request(&request),
                Err(RequestValidationError::ProtectedEntity(entity.to_string()))
            );
        }
    }

    #[test]
    fn test_sync_guardrail_accepts_ordinary_entities() {
        let request = SyncRequest::broadcast(ModuleId::Manager, "products");
        assert_eq!(validate_sync_request(&request), Ok(()));
    }

    #[test]
    fn test_sync_request_needs_targets() {
        let mut request = SyncRequest::broadcast(ModuleId::Manager, "products");
        request.target_modules.clear();
        assert_eq!(
            validate_sync_request(&request),
            Err(RequestValidationError::NoTargetModules)
        );
    }

    #[test]
    fn test_transfer_request_needs_entity() {
        let request = TransferRequest::new(ModuleId::Financial, "  ", ExportFormat::Csv);
        assert_eq!(
            validate_transfer_request(&request),
            Err(RequestValidationError::EmptyEntity)
        );
    }
}
