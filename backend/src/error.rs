//! Error types for the attrition pipeline.
//!
//! This module defines the error hierarchy used across the workspace:
//!
//! - [`CsvError`] - CSV loading errors
//! - [`NormalizeError`] - Per-row parse errors raised by the normalizer
//! - [`IntegrityError`] - Ambiguous dimension keys
//! - [`ValidationError`] - Report schema violations
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Row-level errors ([`NormalizeError`], [`IntegrityError`]) never abort a
//! batch: the pipeline collects them next to its output. Only the outer
//! layers (file I/O, CSV framing, schema validation) fail a whole run.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// CSV Loading Errors
// =============================================================================

/// Errors during CSV loading.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// A dimension row is missing its key column.
    #[error("Line {line}: missing required column '{column}'")]
    MissingKey { line: usize, column: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Normalization Errors
// =============================================================================

/// Identity of a raw observation, as far as it could be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowId {
    /// Position of the row in the raw batch (0-based).
    pub index: usize,
    pub employee_id: Option<String>,
    pub year: Option<String>,
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {} (employee {}, year {})",
            self.index,
            self.employee_id.as_deref().unwrap_or("?"),
            self.year.as_deref().unwrap_or("?"),
        )
    }
}

/// Errors raised while normalizing one raw observation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NormalizeError {
    /// An identifying or mandatory field is empty or absent.
    #[error("{row}: missing required field '{field}'")]
    MissingField { row: RowId, field: &'static str },

    /// A numeric field holds non-numeric text.
    #[error("{row}: field '{field}' is not an integer: '{value}'")]
    InvalidNumber {
        row: RowId,
        field: &'static str,
        value: String,
    },

    /// A leveled code has no numeric part.
    #[error("{row}: field '{field}' is not a leveled code: '{value}'")]
    InvalidLevel {
        row: RowId,
        field: &'static str,
        value: String,
    },

    /// The attrition flag is neither Yes nor No.
    #[error("{row}: attrition flag must be Yes or No, got '{value}'")]
    InvalidAttrition { row: RowId, value: String },
}

impl NormalizeError {
    /// Identity of the offending row.
    pub fn row(&self) -> &RowId {
        match self {
            Self::MissingField { row, .. }
            | Self::InvalidNumber { row, .. }
            | Self::InvalidLevel { row, .. }
            | Self::InvalidAttrition { row, .. } => row,
        }
    }
}

// =============================================================================
// Integrity Errors
// =============================================================================

/// A natural key matched more than one dimension row.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("office code '{code}' matches {matches} office rows")]
    AmbiguousOffice { code: String, matches: usize },

    #[error("job position ({department}, level {job_level}) matches {matches} rows")]
    AmbiguousJobPosition {
        department: String,
        job_level: i64,
        matches: usize,
    },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors during report validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema validation failed.
    #[error("Validation failed: {errors:?}")]
    SchemaError { errors: Vec<String> },

    /// The embedded schema itself could not be compiled.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by the file and byte entry points in
/// [`crate::transform::pipeline`]. The in-memory core never produces it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV loading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Report validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for normalizing one row.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type for dimension lookups.
pub type IntegrityResult<T> = Result<T, IntegrityError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RowId {
        RowId {
            index: 4,
            employee_id: Some("E7".into()),
            year: Some("2021".into()),
        }
    }

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // ValidationError -> PipelineError -> ServerError
        let validation_err = ValidationError::SchemaError {
            errors: vec!["count is negative".into()],
        };
        let server_err: ServerError = PipelineError::from(validation_err).into();
        assert!(server_err.to_string().contains("count is negative"));
    }

    #[test]
    fn test_normalize_error_names_row() {
        let err = NormalizeError::InvalidNumber {
            row: row(),
            field: "age",
            value: "thirty".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("employee E7"));
        assert!(msg.contains("year 2021"));
        assert!(msg.contains("age"));
        assert!(msg.contains("thirty"));
        assert_eq!(err.row().index, 4);
    }

    #[test]
    fn test_row_id_without_identity() {
        let id = RowId {
            index: 0,
            employee_id: None,
            year: None,
        };
        assert_eq!(id.to_string(), "row 0 (employee ?, year ?)");
    }

    #[test]
    fn test_integrity_error_format() {
        let err = IntegrityError::AmbiguousJobPosition {
            department: "Sales".into(),
            job_level: 2,
            matches: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("Sales"));
        assert!(msg.contains("level 2"));
        assert!(msg.contains("3 rows"));
    }
}
