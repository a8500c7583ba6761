//! Attrition report: the document handed to the presentation layer.
//!
//! A report bundles the headline [`Summary`], one [`KpiTable`] per requested
//! KPI and [`RunStats`] describing what was rejected or flagged on the way.
//! Only `report_id` and `generated_at` change between runs on the same input.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::kpi::{compute_all, Kpi, KpiTable, Summary};
use crate::transform::pipeline::{Prepared, ReportOptions};
use crate::validation::validate_report;

/// How many row errors and warnings are listed verbatim.
const MAX_LISTED: usize = 20;

/// Counters and samples from one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub raw_rows: usize,
    pub observations: usize,
    pub employees: usize,
    pub parse_error_count: usize,
    pub integrity_warning_count: usize,
    /// First rejected rows
    pub parse_errors: Vec<String>,
    /// First integrity warnings
    pub integrity_warnings: Vec<String>,
}

impl RunStats {
    fn from_prepared(prepared: &Prepared) -> Self {
        let warnings = prepared.integrity_warnings();
        Self {
            raw_rows: prepared.raw_rows,
            observations: prepared.history.len(),
            employees: prepared.snapshot.len(),
            parse_error_count: prepared.parse_errors.len(),
            integrity_warning_count: warnings.len(),
            parse_errors: prepared
                .parse_errors
                .iter()
                .take(MAX_LISTED)
                .map(|e| e.to_string())
                .collect(),
            integrity_warnings: warnings.into_iter().take(MAX_LISTED).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttritionReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub kpis: Vec<KpiTable>,
    pub stats: RunStats,
}

impl AttritionReport {
    /// Compute every requested KPI over prepared record sets.
    pub fn from_prepared(prepared: &Prepared, options: &ReportOptions) -> Self {
        let snapshot = &prepared.snapshot.records;
        Self {
            report_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            summary: Summary::compute(snapshot),
            kpis: compute_all(&options.kpis, snapshot, &prepared.history, options.parallel),
            stats: RunStats::from_prepared(prepared),
        }
    }

    /// Table for one KPI, if it was requested.
    pub fn kpi(&self, kpi: Kpi) -> Option<&KpiTable> {
        self.kpis.iter().find(|t| t.kpi == kpi)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Check the serialized report against the embedded schema.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let value = serde_json::to_value(self).map_err(|e| ValidationError::SchemaError {
            errors: vec![format!("report does not serialize: {e}")],
        })?;
        validate_report(&value)
    }
}
