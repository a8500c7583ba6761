//! Typed loaders for the office and job position dimension tables.
//!
//! Dimension files are small and hand-maintained, so a row without its
//! natural key fails the whole load instead of being skipped. Errors carry
//! the source line of the offending row.

use crate::error::{CsvError, CsvResult};
use crate::models::{fields, JobPosition, Office, RawRecord};
use crate::transform::normalizer::parse_level;

use super::ParseResult;

fn optional(record: &RawRecord, column: &str) -> Option<String> {
    record.get(column).cloned().flatten()
}

fn required(record: &RawRecord, column: &str, line: usize) -> CsvResult<String> {
    optional(record, column).ok_or_else(|| CsvError::MissingKey {
        line,
        column: column.to_string(),
    })
}

/// Build office rows from parsed records.
///
/// Columns: `code` (required), `city`, `region`, `country`.
pub fn offices_from_parsed(parsed: &ParseResult) -> CsvResult<Vec<Office>> {
    parsed
        .records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            Ok(Office {
                code: required(record, "code", parsed.line_of(i))?,
                city: optional(record, fields::OFFICE_CITY),
                region: optional(record, fields::OFFICE_REGION),
                country: optional(record, fields::OFFICE_COUNTRY),
            })
        })
        .collect()
}

/// Build job position rows from parsed records.
///
/// Columns: `department`, `job_level` (plain or leveled code such as `L3`)
/// and `job_role`, all required.
pub fn job_positions_from_parsed(parsed: &ParseResult) -> CsvResult<Vec<JobPosition>> {
    parsed
        .records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let line = parsed.line_of(i);
            let raw_level = required(record, fields::JOB_LEVEL, line)?;
            let job_level = parse_level(&raw_level).ok_or_else(|| CsvError::ParseError {
                line,
                message: format!("job_level is not a leveled code: '{}'", raw_level),
            })?;

            Ok(JobPosition {
                department: required(record, fields::DEPARTMENT, line)?,
                job_level,
                job_role: required(record, fields::JOB_ROLE, line)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn parsed(csv: &str) -> ParseResult {
        parse_str(csv, ',', "utf-8".into()).unwrap()
    }

    #[test]
    fn test_offices() {
        let rows = parsed("code,city,region,country\nPAR,Paris,EMEA,France\nNYC,,AMER,USA");
        let offices = offices_from_parsed(&rows).unwrap();

        assert_eq!(offices.len(), 2);
        assert_eq!(offices[0].code, "PAR");
        assert_eq!(offices[0].country.as_deref(), Some("France"));
        assert_eq!(offices[1].city, None);
    }

    #[test]
    fn test_office_without_code_fails() {
        let rows = parsed("code,country\nPAR,France\n,Spain");
        let err = offices_from_parsed(&rows).unwrap_err();

        match err {
            CsvError::MissingKey { line, column } => {
                assert_eq!(line, 3);
                assert_eq!(column, "code");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_job_positions_accept_leveled_codes() {
        let rows = parsed(
            "department,job_level,job_role\nSales,L1,Sales Representative\nSales,2,Sales Executive",
        );
        let positions = job_positions_from_parsed(&rows).unwrap();

        assert_eq!(positions[0].job_level, 1);
        assert_eq!(positions[1].job_level, 2);
        assert_eq!(positions[1].job_role, "Sales Executive");
    }

    #[test]
    fn test_job_position_bad_level() {
        let rows = parsed("department,job_level,job_role\nSales,Lx,Rep");
        assert!(matches!(
            job_positions_from_parsed(&rows),
            Err(CsvError::ParseError { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_key_line_after_blank_lines() {
        let rows = parsed("code,country\nPAR,France\n\n\nMAD,Spain\n,Italy");
        let err = offices_from_parsed(&rows).unwrap_err();

        assert!(matches!(err, CsvError::MissingKey { line: 6, .. }));
    }

    #[test]
    fn test_bad_level_line_after_blank_line() {
        let rows = parsed("department,job_level,job_role\n\nSales,L1,Rep\nSales,Lx,Rep");
        assert!(matches!(
            job_positions_from_parsed(&rows),
            Err(CsvError::ParseError { line: 4, .. })
        ));
    }
}
