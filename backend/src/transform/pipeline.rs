//! High-level pipeline API: staged rows to an attrition report.
//!
//! ```text
//! raw rows ─▶ normalize ─▶ join dimensions ─▶ history ─┬─▶ snapshot ─▶ KPIs
//!                                                      └──────────────▶ departures by year
//! ```
//!
//! The in-memory entry points ([`prepare`], [`build_report`]) never fail:
//! bad rows and integrity problems are collected next to the output. The
//! file and byte entry points can fail on I/O, CSV framing or report
//! validation.
//!
//! # Example
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
//! println!("{} employees", report.summary.employees);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::api::logs::{log_error_indent, log_info, log_success, log_warning, log_warning_indent};
use crate::error::{NormalizeError, PipelineResult};
use crate::kpi::Kpi;
use crate::models::{EnrichedObservation, RawRecord};
use crate::parser::{
    job_positions_from_parsed, offices_from_parsed, parse_bytes_auto, parse_csv_file_auto,
    ParseResult,
};
use crate::report::AttritionReport;

use super::joiner::{join_dimensions, DimensionLookup, DimensionTables, JoinWarning};
use super::normalizer::normalize_batch;
use super::snapshot::{reduce_to_snapshot, Snapshot, TieBreak};

/// How many row errors are echoed to the log.
const LOGGED_ERRORS: usize = 3;

/// Options for building a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptions {
    /// KPIs to compute, in output order
    pub kpis: Vec<Kpi>,

    /// Winner when observations tie for an employee's latest year
    pub tie_break: TieBreak,

    /// Check the report against the embedded JSON schema
    pub validate_output: bool,

    /// Compute KPIs on the rayon pool
    pub parallel: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            kpis: Kpi::ALL.to_vec(),
            tie_break: TieBreak::default(),
            validate_output: true,
            parallel: true,
        }
    }
}

/// Record sets produced by the normalize, join and snapshot stages.
#[derive(Debug, Clone, Default)]
pub struct Prepared {
    /// Number of staged rows received
    pub raw_rows: usize,

    /// Every enriched observation, input order
    pub history: Vec<EnrichedObservation>,

    /// Latest observation per employee
    pub snapshot: Snapshot,

    /// Rows rejected by the normalizer
    pub parse_errors: Vec<NormalizeError>,

    /// Ambiguous dimension lookups
    pub join_warnings: Vec<JoinWarning>,
}

impl Prepared {
    /// Integrity warnings from both the joiner and the reducer.
    pub fn integrity_warnings(&self) -> Vec<String> {
        self.join_warnings
            .iter()
            .map(|w| format!("employee {} year {}: {}", w.employee_id, w.year, w.message))
            .chain(self.snapshot.warnings.iter().map(|w| w.to_string()))
            .collect()
    }
}

/// Run the normalize, join and snapshot stages.
pub fn prepare<D: DimensionLookup + ?Sized>(
    records: &[RawRecord],
    dims: &D,
    tie_break: TieBreak,
) -> Prepared {
    log_info(format!("Normalizing {} rows...", records.len()));
    let normalized = normalize_batch(records);
    log_success(format!("{} observations", normalized.observations.len()));
    if !normalized.errors.is_empty() {
        log_warning(format!("{} rows rejected", normalized.errors.len()));
        for err in normalized.errors.iter().take(LOGGED_ERRORS) {
            log_error_indent(err.to_string(), 1);
        }
    }

    log_info("Joining office and job position dimensions...");
    let joined = join_dimensions(normalized.observations, dims);
    for warning in &joined.warnings {
        log_warning_indent(
            format!(
                "Integrity: employee {} year {}: {}",
                warning.employee_id, warning.year, warning.message
            ),
            1,
        );
    }

    log_info("Reducing history to latest state per employee...");
    let snapshot = reduce_to_snapshot(&joined.records, tie_break);
    log_success(format!("{} employees in snapshot", snapshot.len()));
    for warning in &snapshot.warnings {
        log_warning_indent(format!("Integrity: {}", warning), 1);
    }

    Prepared {
        raw_rows: records.len(),
        history: joined.records,
        snapshot,
        parse_errors: normalized.errors,
        join_warnings: joined.warnings,
    }
}

/// Build a report from in-memory rows. No schema validation.
pub fn build_report<D: DimensionLookup + ?Sized>(
    records: &[RawRecord],
    dims: &D,
    options: &ReportOptions,
) -> AttritionReport {
    let prepared = prepare(records, dims, options.tie_break);
    log_info(format!("Computing {} KPIs...", options.kpis.len()));
    let report = AttritionReport::from_prepared(&prepared, options);
    log_success(format!(
        "Overall attrition: {}",
        report
            .summary
            .attrition_rate_pct
            .map(|r| format!("{r:.2}%"))
            .unwrap_or_else(|| "n/a".to_string())
    ));
    report
}

/// Build a report and validate it when `options.validate_output` is set.
pub fn run_report<D: DimensionLookup + ?Sized>(
    records: &[RawRecord],
    dims: &D,
    options: &ReportOptions,
) -> PipelineResult<AttritionReport> {
    let report = build_report(records, dims, options);

    if options.validate_output {
        log_info("Validating report against schema...");
        report.validate()?;
        log_success("Report valid");
    }

    Ok(report)
}

/// Load dimension tables from optional CSV files. A missing file means an
/// empty table.
pub fn load_dimensions(
    offices: Option<&Path>,
    positions: Option<&Path>,
) -> PipelineResult<DimensionTables> {
    let offices = match offices {
        Some(path) => offices_from_parsed(&read_csv(path)?)?,
        None => Vec::new(),
    };
    let positions = match positions {
        Some(path) => job_positions_from_parsed(&read_csv(path)?)?,
        None => Vec::new(),
    };
    let dims = DimensionTables::new(offices, positions);
    log_dimensions(&dims);
    Ok(dims)
}

/// Report from CSV files on disk.
pub fn report_from_files(
    observations: &Path,
    offices: Option<&Path>,
    positions: Option<&Path>,
    options: &ReportOptions,
) -> PipelineResult<AttritionReport> {
    let dims = load_dimensions(offices, positions)?;
    let parsed = read_csv(observations)?;
    run_report(&parsed.records, &dims, options)
}

/// Report from CSV contents held in memory (uploads).
pub fn report_from_bytes(
    observations: &[u8],
    offices: Option<&[u8]>,
    positions: Option<&[u8]>,
    options: &ReportOptions,
) -> PipelineResult<AttritionReport> {
    let offices = match offices {
        Some(bytes) => offices_from_parsed(&parse_bytes_auto(bytes)?)?,
        None => Vec::new(),
    };
    let positions = match positions {
        Some(bytes) => job_positions_from_parsed(&parse_bytes_auto(bytes)?)?,
        None => Vec::new(),
    };
    let dims = DimensionTables::new(offices, positions);
    log_dimensions(&dims);

    let parsed = parse_bytes_auto(observations)?;
    log_csv_info(&parsed);
    run_report(&parsed.records, &dims, options)
}

/// Parse a CSV file and log what was detected.
pub fn read_csv(path: &Path) -> PipelineResult<ParseResult> {
    log_info(format!("Reading {}", path.display()));
    let parsed = parse_csv_file_auto(path)?;
    log_csv_info(&parsed);
    Ok(parsed)
}

fn log_csv_info(parsed: &ParseResult) {
    log_success(format!(
        "Encoding {}, separator '{}', {} rows",
        parsed.encoding,
        format_delimiter(parsed.delimiter),
        parsed.records.len()
    ));
}

fn log_dimensions(dims: &DimensionTables) {
    log_success(format!(
        "{} offices, {} job positions",
        dims.office_count(),
        dims.position_count()
    ));
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attrition, JobPosition, Office};

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Some(v.to_string())))
            .collect()
    }

    fn rows() -> Vec<RawRecord> {
        vec![
            raw(&[
                ("employee_id", "E1"),
                ("year", "2019"),
                ("attrition", "No"),
                ("office_code", "PAR"),
            ]),
            raw(&[
                ("employee_id", "E1"),
                ("year", "2020"),
                ("attrition", "No"),
                ("office_code", "PAR"),
            ]),
            raw(&[
                ("employee_id", "E1"),
                ("year", "2021"),
                ("attrition", "Yes"),
                ("office_code", "PAR"),
                ("department", "Sales"),
                ("job_level", "L1"),
            ]),
            raw(&[("employee_id", "E2"), ("year", "2021"), ("attrition", "No"), ("age", "")]),
            raw(&[("employee_id", "E3"), ("year", "2021"), ("attrition", "No"), ("age", "old")]),
        ]
    }

    fn dims() -> DimensionTables {
        DimensionTables::new(
            vec![Office {
                code: "PAR".into(),
                city: Some("Paris".into()),
                region: None,
                country: Some("France".into()),
            }],
            vec![JobPosition {
                department: "Sales".into(),
                job_level: 1,
                job_role: "Sales Representative".into(),
            }],
        )
    }

    #[test]
    fn test_default_options() {
        let opts = ReportOptions::default();
        assert_eq!(opts.kpis.len(), Kpi::ALL.len());
        assert_eq!(opts.tie_break, TieBreak::KeepFirst);
        assert!(opts.validate_output);
        assert!(opts.parallel);
    }

    #[test]
    fn test_prepare_stages() {
        let prepared = prepare(&rows(), &dims(), TieBreak::KeepFirst);

        assert_eq!(prepared.raw_rows, 5);
        assert_eq!(prepared.history.len(), 4);
        assert_eq!(prepared.parse_errors.len(), 1);
        assert_eq!(prepared.snapshot.len(), 2);

        let e1 = &prepared.snapshot.records[0];
        assert_eq!(e1.employee_id, "E1");
        assert_eq!(e1.year, 2021);
        assert_eq!(e1.attrition, Attrition::Yes);
        assert_eq!(e1.office_country.as_deref(), Some("France"));
        assert_eq!(e1.job_role.as_deref(), Some("Sales Representative"));
        assert_eq!(prepared.snapshot.records[1].age, None);
    }

    #[test]
    fn test_integrity_warnings_collected() {
        let mut input = rows();
        input.push(raw(&[("employee_id", "E2"), ("year", "2021"), ("attrition", "Yes")]));

        let prepared = prepare(&input, &DimensionTables::empty(), TieBreak::KeepFirst);
        let warnings = prepared.integrity_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("E2"));
        // First arrival kept
        assert_eq!(prepared.snapshot.records[1].attrition, Attrition::No);
    }

    #[test]
    fn test_empty_input_gives_empty_tables() {
        let report = run_report(&[], &DimensionTables::empty(), &ReportOptions::default()).unwrap();

        assert_eq!(report.summary.employees, 0);
        assert_eq!(report.kpis.len(), Kpi::ALL.len());
        assert!(report.kpis.iter().all(|t| t.rows.is_empty()));
    }

    #[test]
    fn test_rerun_is_identical() {
        let options = ReportOptions::default();
        let first = run_report(&rows(), &dims(), &options).unwrap();
        let second = run_report(&rows(), &dims(), &options).unwrap();

        assert_eq!(
            serde_json::to_string(&first.kpis).unwrap(),
            serde_json::to_string(&second.kpis).unwrap()
        );
        assert_eq!(
            serde_json::to_string(&first.summary).unwrap(),
            serde_json::to_string(&second.summary).unwrap()
        );
    }

    #[test]
    fn test_report_from_bytes() {
        let observations = b"employee_id,year,attrition,overtime,office_code\n\
E1,2020,No,Yes,PAR\n\
E1,2021,Yes,Yes,PAR\n\
E2,2021,No,No,NYC\n";
        let offices = b"code,city,region,country\nPAR,Paris,EMEA,France\n";

        let report =
            report_from_bytes(observations, Some(offices), None, &ReportOptions::default())
                .unwrap();
        assert_eq!(report.stats.raw_rows, 3);
        assert_eq!(report.summary.employees, 2);

        let by_country = report.kpi(Kpi::OfficeCountry).unwrap();
        let labels: Vec<String> = by_country.rows.iter().map(|r| r.bucket.to_string()).collect();
        assert_eq!(labels, vec!["France", "Unknown"]);
    }

    #[test]
    fn test_report_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let obs = dir.path().join("observations.csv");
        let positions = dir.path().join("positions.csv");
        std::fs::write(
            &obs,
            "employee_id;year;attrition;department;job_level\n\
             E1;2021;Yes;Sales;L2\n\
             E2;2021;No;Sales;L2\n",
        )
        .unwrap();
        std::fs::write(
            &positions,
            "department,job_level,job_role\nSales,2,Sales Executive\n",
        )
        .unwrap();

        let report =
            report_from_files(&obs, None, Some(&positions), &ReportOptions::default()).unwrap();
        let roles = report.kpi(Kpi::JobRole).unwrap();
        assert_eq!(roles.rows.len(), 1);
        assert_eq!(roles.rows[0].bucket.to_string(), "Sales Executive");
        assert_eq!(roles.rows[0].attrition_rate_pct, Some(50.0));
    }

    #[test]
    fn test_missing_observation_file_fails() {
        let result = report_from_files(
            Path::new("/no/such/observations.csv"),
            None,
            None,
            &ReportOptions::default(),
        );
        assert!(result.is_err());
    }
}
