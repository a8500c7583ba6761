//! # Attrition - employee attrition KPIs from yearly HR observations
//!
//! Attrition turns staged HR rows (one per employee per year) into the
//! segmented attrition-rate tables an HR dashboard shows.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌────────────┐   ┌──────────┐   ┌────────────┐
//! │ CSV files │──▶│ Normalizer │──▶│   Joiner   │──▶│ Snapshot │──▶│ KPI tables │
//! │ (auto-enc)│   │  (typed)   │   │ (offices,  │   │ (latest  │   │ (segment   │
//! └───────────┘   └────────────┘   │ positions) │   │  year)   │   │ aggregate) │
//!                                  └────────────┘   └──────────┘   └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use attrition::{report_from_files, ReportOptions};
//! use std::path::Path;
//!
//! let report = report_from_files(
//!     Path::new("observations.csv"),
//!     Some(Path::new("offices.csv")),
//!     Some(Path::new("job_positions.csv")),
//!     &ReportOptions::default(),
//! )?;
//! println!("{}", report.to_json_pretty()?);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Observations and dimension rows
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Normalize, join, snapshot and the pipeline
//! - [`kpi`] - Segmentation rules, aggregator and KPI catalog
//! - [`report`] - The exported report
//! - [`validation`] - Report schema validation
//! - [`api`] - HTTP API server and log stream

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// KPIs and report
pub mod kpi;
pub mod report;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CsvError, IntegrityError, NormalizeError, PipelineError, PipelineResult, RowId, ServerError,
    ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Attrition, EnrichedObservation, JobPosition, Observation, Office, RawRecord};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, job_positions_from_parsed,
    offices_from_parsed, parse_bytes_auto, parse_csv_file_auto, parse_str, ParseResult,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    join_dimensions, normalize_batch, normalize_record, reduce_to_snapshot, DimensionLookup,
    DimensionTables, IntegrityWarning, Normalized, Snapshot, TieBreak,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_report, load_dimensions, prepare, read_csv, report_from_bytes, report_from_files,
    run_report, Prepared, ReportOptions,
};

// =============================================================================
// Re-exports - KPIs and report
// =============================================================================

pub use kpi::{
    aggregate, compute_all, compute_kpi, Bucket, Kpi, KpiTable, SegmentQuery, SegmentRow, Summary,
};
pub use report::{AttritionReport, RunStats};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_report, validate_report};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ReportResponse, ReportStatus};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
