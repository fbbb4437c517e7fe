//! # HTTP Transport
//!
//! Shared plumbing for every controller: the reqwest client, the gateway
//! configuration, the injected session context, and the extraction of
//! [`FailureSignals`] from failed responses and transport errors.
//!
//! ## Structured Error Headers
//! Module backends attach structured error data to failed responses:
//!
//! | Header            | Meaning                                   |
//! |-------------------|-------------------------------------------|
//! | `x-error-code`    | stable machine-readable code              |
//! | `x-error-message` | backend description of the failure        |
//! | `x-error-details` | optional extra diagnostics                |
//! | `x-error-type`    | category hint (e.g. `VALIDATION_ERROR`)   |
//!
//! Absence of `x-error-code` and `x-error-type` means no envelope was sent
//! and classification falls back to the HTTP status code.

use std::sync::Arc;

use chrono::Utc;

use atlas_core::validation::RequestValidationError;
use atlas_core::{
    classify, ErrorCategory, ErrorEnvelope, FailureSignals, ModuleId, TransferError,
    TransportFailure,
};

use crate::config::{ConfigError, ConfigResult, GatewayConfig};
use crate::session::SessionContext;

pub(crate) const HEADER_ERROR_CODE: &str = "x-error-code";
pub(crate) const HEADER_ERROR_MESSAGE: &str = "x-error-message";
pub(crate) const HEADER_ERROR_DETAILS: &str = "x-error-details";
pub(crate) const HEADER_ERROR_TYPE: &str = "x-error-type";

// =============================================================================
// Transport
// =============================================================================

/// Shared HTTP transport handed to every controller.
///
/// Cheap to clone; controllers own a clone each and never share mutable
/// state through it.
#[derive(Debug, Clone)]
pub struct Transport {
    pub(crate) client: reqwest::Client,
    pub(crate) config: Arc<GatewayConfig>,
    pub(crate) session: SessionContext,
}

impl Transport {
    /// Builds the transport from a validated configuration and an injected
    /// session context.
    pub fn new(config: GatewayConfig, session: SessionContext) -> ConfigResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("atlas-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Transport {
            client,
            config: Arc::new(config),
            session,
        })
    }

    /// The gateway configuration backing this transport.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Applies the session context to an outgoing request.
    pub(crate) fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        self.session.apply(request)
    }
}

// =============================================================================
// Failure Signal Extraction
// =============================================================================

/// Extracts failure signals from a non-success response, honoring the
/// structured error headers when present.
pub(crate) fn signals_from_response(response: &reqwest::Response) -> FailureSignals {
    let status = response.status().as_u16();
    let headers = response.headers();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    let code = header(HEADER_ERROR_CODE);
    let kind = header(HEADER_ERROR_TYPE);

    if code.is_none() && kind.is_none() {
        return FailureSignals::from_status(status);
    }

    FailureSignals::from_envelope(
        status,
        ErrorEnvelope {
            code: code.unwrap_or_default(),
            message: header(HEADER_ERROR_MESSAGE).unwrap_or_default(),
            details: header(HEADER_ERROR_DETAILS),
            kind,
        },
    )
}

/// Extracts failure signals from a reqwest transport error.
pub(crate) fn signals_from_reqwest(error: &reqwest::Error) -> FailureSignals {
    if error.is_timeout() {
        return FailureSignals::from_transport(TransportFailure::TimedOut);
    }
    if error.is_decode() {
        return FailureSignals::from_transport(TransportFailure::MalformedBody(error.to_string()));
    }
    if let Some(status) = error.status() {
        return FailureSignals::from_status(status.as_u16());
    }
    FailureSignals::from_transport(TransportFailure::ConnectionFailed(error.to_string()))
}

/// Classifies failure signals, stamping the current time.
///
/// The single place the clock touches classification; everything below it
/// in atlas-core stays pure.
pub(crate) fn classify_now(
    signals: &FailureSignals,
    module: ModuleId,
    entity: &str,
) -> TransferError {
    classify(signals, module, entity, Utc::now())
}

/// Builds the VALIDATION error for a request rejected client-side, before
/// any network call.
///
/// Validation is never retryable and these codes carry no transient token,
/// so the verdict matches what the classifier would derive.
pub(crate) fn request_rejected(
    violation: &RequestValidationError,
    module: ModuleId,
    entity: &str,
) -> TransferError {
    let code = match violation {
        RequestValidationError::EmptyEntity => "ENTITY_REQUIRED",
        RequestValidationError::ProtectedEntity(_) => "PROTECTED_ENTITY",
        RequestValidationError::NoTargetModules => "TARGETS_REQUIRED",
    };
    TransferError {
        category: ErrorCategory::Validation,
        code: code.to_string(),
        message: format!("The request was rejected: {}", violation),
        details: None,
        retryable: false,
        module,
        entity: entity.trim().to_string(),
        timestamp: Utc::now(),
    }
}
