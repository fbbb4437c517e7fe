//! # atlas-sync: Cross-Module Data Sync Client
//!
//! This crate drives data transfers between the suite's independently
//! deployed module backends: long-running cancellable exports, single-payload
//! file imports, and broadcast synchronization fan-outs.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Data Sync Client Architecture                       │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    ExportController                              │  │
//! │  │                                                                  │  │
//! │  │  submit() ──► POST /data/export ──► stream body chunks           │  │
//! │  │     │            │                      │                        │  │
//! │  │     │            │ x-error-* headers    │ ProgressTracker        │  │
//! │  │     │            ▼                      ▼                        │  │
//! │  │     │         classify()            on_progress(pct)             │  │
//! │  │     │                                                            │  │
//! │  │     └── CancelHandle aborts the in-flight transfer               │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ImportController│  │ BroadcastSync  │  │  HealthMonitor         │    │
//! │  │                │  │ Controller     │  │                        │    │
//! │  │ Multipart file │  │ Guardrail then │  │ Probes each module's   │    │
//! │  │ upload, parses │  │ POST /data/sync│  │ /health endpoint and   │    │
//! │  │ ImportResult   │  │ full roster    │  │ aggregates the status  │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  SHARED PLUMBING                                                       │
//! │  ───────────────                                                       │
//! │  Transport  - reqwest client + gateway config + session context        │
//! │  SessionContext - injected bearer token / company scope (read-only)    │
//! │  delivery   - writes `<entity>_export.<ext>` artifacts to disk         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`broadcast`] - Fan-out synchronization with the protected-entity guardrail
//! - [`cancel`] - Single-use cancellation handles for in-flight exports
//! - [`config`] - Gateway configuration (TOML file + env overrides)
//! - [`delivery`] - Artifact file delivery
//! - [`export`] - Export orchestration (progress, cancellation, retry counting)
//! - [`health`] - Module health probes
//! - [`import`] - Multipart file import
//! - [`session`] - Injected session context applied to every request
//! - [`transport`] - reqwest plumbing and failure-signal extraction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atlas_core::{ExportFormat, ModuleId, TransferRequest};
//! use atlas_sync::{ExportController, GatewayConfig, SessionContext, Transport};
//!
//! let config = GatewayConfig::load_or_default(None);
//! let session = SessionContext::new().with_bearer_token("…");
//! let transport = Transport::new(config, session)?;
//!
//! let exporter = ExportController::new(transport);
//! let request = TransferRequest::new(ModuleId::Financial, "invoices", ExportFormat::Csv);
//! let artifact = exporter.submit(request, |pct| println!("{pct}%")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod broadcast;
pub mod cancel;
pub mod config;
pub mod delivery;
pub mod export;
pub mod health;
pub mod import;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use broadcast::BroadcastSyncController;
pub use cancel::CancelHandle;
pub use config::{ConfigError, GatewayConfig};
pub use delivery::deliver;
pub use export::{Artifact, ExportController, TransferFailure};
pub use health::{HealthMonitor, ModuleHealth, SystemHealth, SystemStatus};
pub use import::{ImportController, ImportFile};
pub use session::SessionContext;
pub use transport::Transport;
