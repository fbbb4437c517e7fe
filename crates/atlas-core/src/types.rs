//! # Transfer Types
//!
//! Wire and domain types shared by the export, import and broadcast-sync
//! paths. Everything here crosses the HTTP boundary as JSON, so the serde
//! renames pin the exact field names the module backends expect.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Transfer Types                                  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ TransferRequest │   │   SyncRequest   │   │  ImportResult   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sourceModule   │   │  sourceModule   │   │  success        │       │
//! │  │  entity         │   │  targetModules  │   │  recordsProcessed│      │
//! │  │  format?        │   │  entity         │   │  recordsSucceeded│      │
//! │  │  fields?        │   │                 │   │  recordsFailed  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    ModuleId     │   │  ExportFormat   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  manager        │   │  CSV   → .csv   │                             │
//! │  │  financial      │   │  EXCEL → .xlsx  │                             │
//! │  │  production     │   │  JSON  → .json  │                             │
//! │  │  cloud          │   │                 │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Module Identifier
// =============================================================================

/// An independently deployed backend module of the suite.
///
/// The roster is closed: modules are deployed and addressed by these stable
/// identifiers, and the gateway routes transfer requests by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ModuleId {
    /// Catalog and e-commerce administration.
    Manager,
    /// Financial ledger (invoices, cost centers, accounts).
    Financial,
    /// Production and inventory management.
    Production,
    /// Cloud services module.
    Cloud,
}

impl ModuleId {
    /// All deployed modules, in gateway display order.
    pub const ALL: [ModuleId; 4] = [
        ModuleId::Manager,
        ModuleId::Financial,
        ModuleId::Production,
        ModuleId::Cloud,
    ];

    /// Returns the stable identifier used on the wire and in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleId::Manager => "manager",
            ModuleId::Financial => "financial",
            ModuleId::Production => "production",
            ModuleId::Cloud => "cloud",
        }
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manager" => Ok(ModuleId::Manager),
            "financial" => Ok(ModuleId::Financial),
            "production" => Ok(ModuleId::Production),
            "cloud" => Ok(ModuleId::Cloud),
            other => Err(format!(
                "Unknown module: '{}'. Valid options: manager, financial, production, cloud",
                other
            )),
        }
    }
}

// =============================================================================
// Export Format
// =============================================================================

/// Output format of an export transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// Excel workbook (xlsx).
    Excel,
    /// JSON document.
    Json,
}

impl ExportFormat {
    /// File extension for delivered artifacts of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "CSV"),
            ExportFormat::Excel => write!(f, "EXCEL"),
            ExportFormat::Json => write!(f, "JSON"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CSV" => Ok(ExportFormat::Csv),
            "EXCEL" | "XLSX" => Ok(ExportFormat::Excel),
            "JSON" => Ok(ExportFormat::Json),
            other => Err(format!(
                "Unknown export format: '{}'. Valid options: CSV, EXCEL, JSON",
                other
            )),
        }
    }
}

// =============================================================================
// Transfer Request
// =============================================================================

/// Identifies exactly one logical export job. Immutable once submitted.
///
/// Submitted as the JSON body of `POST /data/export`. A caller-directed
/// retry resubmits the same value unchanged; only the attempt counter on the
/// controller moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Module the entity is exported from.
    pub source_module: ModuleId,

    /// Business entity type being exported (e.g. "invoices", "products").
    pub entity: String,

    /// Requested output format. The backend defaults to CSV when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,

    /// Optional column projection. Absent means all exportable fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl TransferRequest {
    /// Creates a request for a full-field export.
    pub fn new(source_module: ModuleId, entity: impl Into<String>, format: ExportFormat) -> Self {
        TransferRequest {
            source_module,
            entity: entity.into(),
            format: Some(format),
            fields: None,
        }
    }

    /// Effective format, matching the backend's CSV default.
    pub fn format(&self) -> ExportFormat {
        self.format.unwrap_or_default()
    }

    /// Filename under which a successful export artifact is delivered:
    /// `<entity>_export.<ext>`.
    pub fn export_filename(&self) -> String {
        format!("{}_export.{}", self.entity, self.format().extension())
    }
}

// =============================================================================
// Broadcast Sync Request
// =============================================================================

/// A fan-out synchronization of one entity type from a source module to the
/// rest of the suite.
///
/// `target_modules` always carries the full module roster, source included;
/// the backend excludes the source from the fan-out. The client stays
/// stateless about topology and performs no roster filtering of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Module holding the authoritative copy.
    pub source_module: ModuleId,

    /// Full module roster; the backend filters out the source.
    pub target_modules: Vec<ModuleId>,

    /// Entity type to replicate.
    pub entity: String,
}

impl SyncRequest {
    /// Creates a broadcast request targeting the full deployed roster.
    pub fn broadcast(source_module: ModuleId, entity: impl Into<String>) -> Self {
        SyncRequest {
            source_module,
            target_modules: ModuleId::ALL.to_vec(),
            entity: entity.into(),
        }
    }
}

/// Acknowledgement payload of `POST /data/sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SyncAck {
    /// Human-readable confirmation from the backend.
    pub message: String,
}

// =============================================================================
// Import Result
// =============================================================================

/// Structured summary returned by `POST /data/import/{module}/{entity}`.
///
/// ## Invariant
/// `records_succeeded + records_failed <= records_processed`. The invariant
/// is the backend's to uphold; the client surfaces whatever arrived and test
/// suites flag violations via [`ImportResult::is_consistent`]. Garbage in is
/// surfaced, not corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// Whether the backend accepted the file as a whole.
    pub success: bool,

    /// Human-readable summary line.
    pub message: String,

    /// Number of records read from the uploaded file.
    pub records_processed: i64,

    /// Number of records applied.
    ///
    /// Older module backends emit this field as `recordsSuccess`; the alias
    /// accepts both spellings.
    #[serde(alias = "recordsSuccess")]
    pub records_succeeded: i64,

    /// Number of records rejected.
    pub records_failed: i64,

    /// Per-record error lines, when the backend provides them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ImportResult {
    /// Checks the record-count invariant. Intended for test suites and
    /// diagnostics; the import controller does not reject on violation.
    pub fn is_consistent(&self) -> bool {
        self.records_succeeded + self.records_failed <= self.records_processed
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
