//! # atlas-core: Pure Transfer Domain for the Atlas Suite
//!
//! This crate is the **heart** of the cross-module data sync client. It
//! contains the transfer domain as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Atlas Data Sync Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Suite Frontends (React)                      │   │
//! │  │    Data Sync UI ──► Health UI ──► Module Dashboards            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    atlas-sync (HTTP client)                     │   │
//! │  │    ExportController, ImportController, BroadcastSyncController │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ atlas-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ classify  │  │   state   │  │ progress  │  │   │
//! │  │   │ requests  │  │ taxonomy  │  │  machine  │  │  percent  │  │   │
//! │  │   │  results  │  │ retryable │  │ lifecycle │  │  mapping  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire and domain types (requests, formats, import summaries)
//! - [`error`] - The transfer error taxonomy and raw failure signals
//! - [`classify`] - Deterministic failure classification
//! - [`progress`] - Byte progress to percentage mapping
//! - [`retry`] - Caller-directed retry decisions
//! - [`state`] - The per-transfer lifecycle state machine
//! - [`validation`] - Request validation and the protected-entity guardrail
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: classification is deterministic - the timestamp is
//!    an argument, never read from the clock
//! 2. **No I/O**: network, file system and clock access are FORBIDDEN here
//! 3. **Closed Taxonomy**: every failure maps to exactly one [`ErrorCategory`]
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod classify;
pub mod error;
pub mod progress;
pub mod retry;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use atlas_core::TransferError` instead of
// `use atlas_core::error::TransferError`

pub use classify::classify;
pub use error::{ErrorCategory, ErrorEnvelope, FailureSignals, TransferError, TransportFailure};
pub use progress::ProgressTracker;
pub use retry::RetryPolicy;
pub use state::{StateError, TransferEvent, TransferState};
pub use types::{ExportFormat, ImportResult, ModuleId, SyncAck, SyncRequest, TransferRequest};
pub use validation::{is_protected_entity, validate_sync_request, RequestValidationError};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum export attempts (initial submission + caller-directed retries).
///
/// ## Business Reason
/// Every retry is a fresh user-initiated submission against the backend.
/// Bounding the count keeps a stuck transfer from consuming backend capacity;
/// past the ceiling the UI asks the user to wait before trying again.
pub const MAX_EXPORT_ATTEMPTS: u32 = 3;

/// Default hard ceiling for a single export transfer, in seconds.
///
/// Exports walk entire entity tables on the backend, so the ceiling is much
/// larger than an interactive request timeout. Exceeding it is classified as
/// [`ErrorCategory::Timeout`], not a plain network failure.
pub const DEFAULT_EXPORT_TIMEOUT_SECS: u64 = 300;
