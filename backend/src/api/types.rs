//! REST API types.
//!
//! The report is returned as-is; the envelope adds a status the dashboard
//! can badge without walking the stats.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::report::AttritionReport;

/// Response to `POST /api/report`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// "ready" when every row was used cleanly, "warning" otherwise
    pub status: ReportStatus,

    /// Names of the uploaded parts
    pub inputs: Vec<String>,

    pub report: AttritionReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Ready,
    Warning,
    Error,
}

impl ReportStatus {
    pub fn of(report: &AttritionReport) -> Self {
        if report.stats.parse_error_count == 0 && report.stats.integrity_warning_count == 0 {
            Self::Ready
        } else {
            Self::Warning
        }
    }
}

impl ReportResponse {
    pub fn new(report: AttritionReport, inputs: Vec<String>) -> Self {
        Self {
            status: ReportStatus::of(&report),
            inputs,
            report,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": ReportStatus::Error,
        "error": error,
        "inputs": [],
        "report": null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{build_report, DimensionTables, ReportOptions};

    fn raw(id: &str, year: &str, attrition: &str) -> crate::models::RawRecord {
        [("employee_id", id), ("year", year), ("attrition", attrition)]
            .iter()
            .map(|(k, v)| (k.to_string(), Some(v.to_string())))
            .collect()
    }

    #[test]
    fn test_clean_report_is_ready() {
        let rows = vec![raw("E1", "2021", "No"), raw("E2", "2021", "Yes")];
        let report = build_report(&rows, &DimensionTables::empty(), &ReportOptions::default());
        let response = ReportResponse::new(report, vec!["observations".into()]);

        assert_eq!(response.status, ReportStatus::Ready);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["report"]["summary"]["employees"], 2);
    }

    #[test]
    fn test_rejected_rows_give_warning() {
        let rows = vec![raw("E1", "2021", "No"), raw("E2", "2021", "maybe")];
        let report = build_report(&rows, &DimensionTables::empty(), &ReportOptions::default());

        assert_eq!(ReportStatus::of(&report), ReportStatus::Warning);
    }

    #[test]
    fn test_error_response() {
        let json = error_response("No observations file provided");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "No observations file provided");
        assert!(json["report"].is_null());
    }
}
