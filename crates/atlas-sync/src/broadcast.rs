//! # Broadcast Sync Controller
//!
//! Fans one entity type out from a source module to the rest of the suite in
//! a single request.
//!
//! ## Dispatch Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Broadcast Sync Dispatch                             │
//! │                                                                         │
//! │  submit(request)                                                        │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  protected-entity guardrail ── users/user ──► VALIDATION error,        │
//! │      │                                        NO network call          │
//! │      ▼                                                                  │
//! │  POST /data/sync  { sourceModule, targetModules, entity }              │
//! │      │                                                                  │
//! │      │  targetModules is the FULL roster, source included; the         │
//! │      │  backend excludes the source from the fan-out. The client       │
//! │      │  stays stateless about topology.                                │
//! │      ▼                                                                  │
//! │  SyncAck { message }                                                   │
//! │                                                                         │
//! │  No progress, no cancellation: broadcasts are short-lived and use the  │
//! │  transport's default timeout.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};
use uuid::Uuid;

use atlas_core::{validate_sync_request, ModuleId, SyncAck, SyncRequest, TransferError};

use crate::transport::{
    classify_now, request_rejected, signals_from_reqwest, signals_from_response, Transport,
};

/// Orchestrates broadcast synchronization requests.
pub struct BroadcastSyncController {
    transport: Transport,
}

impl BroadcastSyncController {
    pub fn new(transport: Transport) -> Self {
        BroadcastSyncController { transport }
    }

    /// Builds a request carrying the configured module roster in full.
    pub fn roster_request(&self, source_module: ModuleId, entity: impl Into<String>) -> SyncRequest {
        SyncRequest {
            source_module,
            target_modules: self.transport.config.gateway.modules.clone(),
            entity: entity.into(),
        }
    }

    /// Dispatches a broadcast sync and returns the backend acknowledgement.
    ///
    /// The protected-entity guardrail runs first: a denylisted entity fails
    /// fast with a VALIDATION error and no network call is made, independent
    /// of whatever the backend would enforce.
    pub async fn submit(&self, request: SyncRequest) -> Result<SyncAck, TransferError> {
        if let Err(violation) = validate_sync_request(&request) {
            warn!(
                source = %request.source_module,
                entity = %request.entity,
                %violation,
                "Broadcast sync rejected before dispatch"
            );
            return Err(request_rejected(
                &violation,
                request.source_module,
                &request.entity,
            ));
        }

        let transfer_id = Uuid::new_v4();
        info!(
            %transfer_id,
            source = %request.source_module,
            entity = %request.entity,
            targets = request.target_modules.len(),
            "Dispatching broadcast sync"
        );

        let builder = self
            .transport
            .client
            .post(self.transport.config.sync_url())
            .json(&request);

        let response = match self.transport.authorize(builder).send().await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(signals_from_reqwest(&e), &request)),
        };

        if !response.status().is_success() {
            let signals = signals_from_response(&response);
            return Err(self.fail(signals, &request));
        }

        let ack = match response.json::<SyncAck>().await {
            Ok(ack) => ack,
            Err(e) => return Err(self.fail(signals_from_reqwest(&e), &request)),
        };

        info!(%transfer_id, message = %ack.message, "Broadcast sync acknowledged");
        Ok(ack)
    }

    fn fail(&self, signals: atlas_core::FailureSignals, request: &SyncRequest) -> TransferError {
        let error = classify_now(&signals, request.source_module, &request.entity);
        warn!(
            source = %request.source_module,
            entity = %request.entity,
            category = %error.category,
            code = %error.code,
            retryable = error.retryable,
            "Broadcast sync failed"
        );
        error
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{spawn_backend, transport_for};
    use atlas_core::ErrorCategory;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn sync_ok(Json(body): Json<Value>) -> impl IntoResponse {
        // The wire body carries the full roster, source included.
        assert_eq!(body["sourceModule"], "manager");
        assert_eq!(body["entity"], "products");
        let targets = body["targetModules"].as_array().expect("roster array");
        assert_eq!(targets.len(), 4);
        assert!(targets.iter().any(|m| m == "manager"));

        Json(json!({ "message": "sync dispatched to 3 modules" }))
    }

    async fn sync_unauthorized() -> impl IntoResponse {
        (
            StatusCode::FORBIDDEN,
            [
                ("x-error-type", "AUTHENTICATION_ERROR"),
                ("x-error-code", "SESSION_EXPIRED"),
                ("x-error-message", "session expired"),
            ],
            "rejected",
        )
    }

    #[tokio::test]
    async fn test_broadcast_submits_full_roster() {
        let base = spawn_backend(Router::new().route("/data/sync", post(sync_ok))).await;
        let controller = BroadcastSyncController::new(transport_for(&base));

        let ack = controller
            .submit(SyncRequest::broadcast(ModuleId::Manager, "products"))
            .await
            .unwrap();

        assert_eq!(ack.message, "sync dispatched to 3 modules");
    }

    #[tokio::test]
    async fn test_guardrail_rejects_protected_entities_before_dispatch() {
        // Nothing listens on this address: reaching the network at all would
        // classify as NETWORK, so a VALIDATION outcome proves the guardrail
        // fired first.
        let controller = BroadcastSyncController::new(transport_for("http://127.0.0.1:1"));

        for entity in ["users", "Users", "USER"] {
            let error = controller
                .submit(SyncRequest::broadcast(ModuleId::Financial, entity))
                .await
                .unwrap_err();

            assert_eq!(error.category, ErrorCategory::Validation);
            assert_eq!(error.code, "PROTECTED_ENTITY");
            assert!(!error.retryable);
        }
    }

    #[tokio::test]
    async fn test_empty_roster_rejected_before_dispatch() {
        let controller = BroadcastSyncController::new(transport_for("http://127.0.0.1:1"));

        let mut request = SyncRequest::broadcast(ModuleId::Manager, "products");
        request.target_modules.clear();

        let error = controller.submit(request).await.unwrap_err();
        assert_eq!(error.category, ErrorCategory::Validation);
        assert_eq!(error.code, "TARGETS_REQUIRED");
    }

    #[tokio::test]
    async fn test_broadcast_failure_uses_backend_envelope() {
        let base = spawn_backend(Router::new().route("/data/sync", post(sync_unauthorized))).await;
        let controller = BroadcastSyncController::new(transport_for(&base));

        let error = controller
            .submit(SyncRequest::broadcast(ModuleId::Cloud, "sales"))
            .await
            .unwrap_err();

        assert_eq!(error.category, ErrorCategory::Authentication);
        assert_eq!(error.code, "SESSION_EXPIRED");
        assert!(!error.retryable);
    }

    #[tokio::test]
    async fn test_broadcast_network_drop_is_retryable() {
        let controller = BroadcastSyncController::new(transport_for("http://127.0.0.1:1"));

        let error = controller
            .submit(SyncRequest::broadcast(ModuleId::Manager, "products"))
            .await
            .unwrap_err();

        assert_eq!(error.category, ErrorCategory::Network);
        assert!(error.retryable);
    }

    #[tokio::test]
    async fn test_roster_request_uses_configured_modules() {
        let controller = BroadcastSyncController::new(transport_for("http://127.0.0.1:1"));
        let request = controller.roster_request(ModuleId::Manager, "products");
        assert_eq!(request.target_modules, ModuleId::ALL.to_vec());
        assert!(request.target_modules.contains(&ModuleId::Manager));
    }
}
