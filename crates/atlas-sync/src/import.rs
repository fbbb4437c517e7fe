//! # Import Controller
//!
//! Orchestrates a single-file upload transfer and parses the structured
//! result summary the backend returns.
//!
//! ## Transfer Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Import Transfer Flow                              │
//! │                                                                         │
//! │  submit(module, entity, file)                                          │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  POST /data/import/{module}/{entity}                                   │
//! │      │  multipart body, single `file` part - no chunking, no resume    │
//! │      │                                                                  │
//! │      │ 2xx                          non-2xx                             │
//! │      ▼                                 │                                │
//! │  parse ImportResult JSON               ▼                                │
//! │      │         │                   classify() via x-error-* / status   │
//! │      │ ok      │ garbled                                                │
//! │      ▼         ▼                                                        │
//! │  ImportResult  DATA error                                              │
//! │                                                                         │
//! │  The record-count invariant (succeeded + failed <= processed) is the   │
//! │  backend's to uphold; a violating summary is surfaced as-is and only   │
//! │  logged here.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use atlas_core::validation::RequestValidationError;
use atlas_core::{ErrorCategory, ImportResult, ModuleId, TransferError};

use crate::transport::{
    classify_now, request_rejected, signals_from_reqwest, signals_from_response, Transport,
};

// =============================================================================
// Import File
// =============================================================================

/// The file payload of one import transfer.
#[derive(Debug, Clone)]
pub struct ImportFile {
    /// Filename reported to the backend in the multipart part.
    pub filename: String,

    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ImportFile {
    /// An in-memory payload.
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImportFile {
            filename: filename.into(),
            bytes,
        }
    }

    /// Reads a payload from disk, taking the filename from the path.
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "import.dat".to_string());
        let bytes = tokio::fs::read(path).await?;
        Ok(ImportFile { filename, bytes })
    }
}

// =============================================================================
// Import Controller
// =============================================================================

/// Orchestrates import transfers, one at a time.
///
/// The upload is a single multipart payload; chunking and resumability are
/// deliberately absent on both sides of the contract. There is no progress
/// reporting and no cancellation - imports are expected to be short-lived
/// compared to exports.
pub struct ImportController {
    transport: Transport,
}

impl ImportController {
    pub fn new(transport: Transport) -> Self {
        ImportController { transport }
    }

    /// Uploads `file` into `entity` on `module` and parses the result
    /// summary.
    ///
    /// Non-2xx responses and transport failures reject with a classified
    /// [`TransferError`]; a 2xx response whose body is not a valid summary
    /// classifies as [`ErrorCategory::Data`].
    pub async fn submit(
        &self,
        module: ModuleId,
        entity: &str,
        file: ImportFile,
    ) -> Result<ImportResult, TransferError> {
        if entity.trim().is_empty() {
            return Err(request_rejected(
                &RequestValidationError::EmptyEntity,
                module,
                entity,
            ));
        }

        let transfer_id = Uuid::new_v4();
        info!(
            %transfer_id,
            %module,
            entity,
            filename = %file.filename,
            size_bytes = file.bytes.len(),
            "Starting import transfer"
        );

        let part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.filename);
        let form = reqwest::multipart::Form::new().part("file", part);

        let builder = self
            .transport
            .client
            .post(self.transport.config.import_url(module, entity))
            .multipart(form);

        let response = match self.transport.authorize(builder).send().await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(signals_from_reqwest(&e), module, entity)),
        };

        if !response.status().is_success() {
            let signals = signals_from_response(&response);
            return Err(self.fail(signals, module, entity));
        }

        let result = match response.json::<ImportResult>().await {
            Ok(result) => result,
            Err(e) => return Err(self.fail(signals_from_reqwest(&e), module, entity)),
        };

        if !result.is_consistent() {
            // Surfaced, not corrected: the caller sees exactly what arrived.
            warn!(
                %transfer_id,
                processed = result.records_processed,
                succeeded = result.records_succeeded,
                failed = result.records_failed,
                "Import summary counts are inconsistent"
            );
        }

        info!(
            %transfer_id,
            processed = result.records_processed,
            succeeded = result.records_succeeded,
            failed = result.records_failed,
            "Import transfer complete"
        );
        Ok(result)
    }

    /// Reads the file at `path` and submits it.
    pub async fn submit_path(
        &self,
        module: ModuleId,
        entity: &str,
        path: impl AsRef<Path>,
    ) -> Result<ImportResult, TransferError> {
        let path = path.as_ref();
        let file = ImportFile::read(path).await.map_err(|e| TransferError {
            category: ErrorCategory::Validation,
            code: "FILE_UNREADABLE".to_string(),
            message: format!(
                "The import file could not be read: {}",
                path.display()
            ),
            details: Some(e.to_string()),
            retryable: false,
            module,
            entity: entity.trim().to_string(),
            timestamp: Utc::now(),
        })?;
        self.submit(module, entity, file).await
    }

    fn fail(
        &self,
        signals: atlas_core::FailureSignals,
        module: ModuleId,
        entity: &str,
    ) -> TransferError {
        let error = classify_now(&signals, module, entity);
        warn!(
            %module,
            entity,
            category = %error.category,
            code = %error.code,
            retryable = error.retryable,
            "Import transfer failed"
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
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    fn products_csv() -> ImportFile {
        ImportFile::from_bytes("products.csv", b"sku,name\nP-1,Widget\n".to_vec())
    }

    async fn import_ok(mut multipart: Multipart) -> impl IntoResponse {
        let field = multipart
            .next_field()
            .await
            .expect("read multipart field")
            .expect("one field present");
        assert_eq!(field.name(), Some("file"));
        assert_eq!(field.file_name(), Some("products.csv"));
        let bytes = field.bytes().await.expect("field bytes");
        assert!(!bytes.is_empty());

        Json(json!({
            "success": true,
            "message": "imported",
            "recordsProcessed": 10,
            "recordsSucceeded": 7,
            "recordsFailed": 3,
            "errors": ["row 4: bad sku", "row 6: bad sku", "row 9: bad sku"]
        }))
    }

    async fn import_inconsistent() -> impl IntoResponse {
        Json(json!({
            "success": true,
            "message": "imported",
            "recordsProcessed": 10,
            "recordsSucceeded": 8,
            "recordsFailed": 3
        }))
    }

    async fn import_misconfigured() -> impl IntoResponse {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            [
                ("x-error-type", "CONFIGURATION_ERROR"),
                ("x-error-code", "IMPORT_DISABLED"),
                ("x-error-message", "imports are disabled for this module"),
            ],
            "rejected",
        )
    }

    async fn import_garbled() -> impl IntoResponse {
        "this is not a summary"
    }

    #[tokio::test]
    async fn test_import_success_parses_summary() {
        let base = spawn_backend(
            Router::new().route("/data/import/{module}/{entity}", post(import_ok)),
        )
        .await;
        let controller = ImportController::new(transport_for(&base));

        let result = controller
            .submit(ModuleId::Manager, "products", products_csv())
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.records_processed, 10);
        assert_eq!(result.records_succeeded, 7);
        assert_eq!(result.records_failed, 3);
        assert_eq!(result.errors.as_ref().map(Vec::len), Some(3));
        assert!(result.is_consistent());
    }

    #[tokio::test]
    async fn test_import_surfaces_inconsistent_summary() {
        let base = spawn_backend(
            Router::new().route("/data/import/{module}/{entity}", post(import_inconsistent)),
        )
        .await;
        let controller = ImportController::new(transport_for(&base));

        // 8 + 3 > 10 violates the backend's invariant; the controller still
        // returns it and the test suite is the place that flags it.
        let result = controller
            .submit(ModuleId::Manager, "products", products_csv())
            .await
            .unwrap();
        assert!(!result.is_consistent());
    }

    #[tokio::test]
    async fn test_import_failure_uses_backend_envelope() {
        let base = spawn_backend(
            Router::new().route("/data/import/{module}/{entity}", post(import_misconfigured)),
        )
        .await;
        let controller = ImportController::new(transport_for(&base));

        let error = controller
            .submit(ModuleId::Production, "products", products_csv())
            .await
            .unwrap_err();

        assert_eq!(error.category, ErrorCategory::Configuration);
        assert_eq!(error.code, "IMPORT_DISABLED");
        assert!(!error.retryable);
        assert_eq!(error.module, ModuleId::Production);
    }

    #[tokio::test]
    async fn test_import_garbled_summary_is_data_error() {
        let base = spawn_backend(
            Router::new().route("/data/import/{module}/{entity}", post(import_garbled)),
        )
        .await;
        let controller = ImportController::new(transport_for(&base));

        let error = controller
            .submit(ModuleId::Manager, "products", products_csv())
            .await
            .unwrap_err();

        assert_eq!(error.category, ErrorCategory::Data);
        assert_eq!(error.code, "MALFORMED_RESPONSE");
        assert!(!error.retryable);
    }

    #[tokio::test]
    async fn test_import_network_drop_is_retryable() {
        let controller = ImportController::new(transport_for("http://127.0.0.1:1"));

        let error = controller
            .submit(ModuleId::Manager, "products", products_csv())
            .await
            .unwrap_err();

        assert_eq!(error.category, ErrorCategory::Network);
        assert!(error.retryable);
    }

    #[tokio::test]
    async fn test_import_empty_entity_rejected_before_dispatch() {
        let controller = ImportController::new(transport_for("http://127.0.0.1:1"));

        let error = controller
            .submit(ModuleId::Manager, "  ", products_csv())
            .await
            .unwrap_err();

        // Validation, not Network: no connection was attempted.
        assert_eq!(error.category, ErrorCategory::Validation);
        assert_eq!(error.code, "ENTITY_REQUIRED");
    }

    #[tokio::test]
    async fn test_import_missing_path_is_unreadable_file() {
        let controller = ImportController::new(transport_for("http://127.0.0.1:1"));

        let error = controller
            .submit_path(ModuleId::Manager, "products", "/nonexistent/products.csv")
            .await
            .unwrap_err();

        assert_eq!(error.category, ErrorCategory::Validation);
        assert_eq!(error.code, "FILE_UNREADABLE");
        assert!(error.details.is_some());
    }
}
