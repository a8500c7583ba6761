//! Record normalizer: staged text rows to typed observations.
//!
//! Rules:
//! - empty or absent text is `None` for every optional field
//! - numeric fields must parse as integers, otherwise the row is rejected
//! - `job_level` accepts leveled codes (`L3`) as well as bare integers
//! - `employee_id`, `year` and `attrition` are mandatory
//!
//! A rejected row is reported with its identity and left out of the batch.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{NormalizeError, NormalizeResult, RowId};
use crate::models::{fields, Attrition, Observation, RawRecord};

static LEVEL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^0-9]*([0-9]+)$").expect("valid level pattern"));

/// Output of normalizing a batch.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub observations: Vec<Observation>,
    pub errors: Vec<NormalizeError>,
}

/// Normalize every raw row, isolating the ones that fail.
pub fn normalize_batch(records: &[RawRecord]) -> Normalized {
    let mut out = Normalized::default();

    for (index, record) in records.iter().enumerate() {
        match normalize_record(index, record) {
            Ok(obs) => out.observations.push(obs),
            Err(e) => out.errors.push(e),
        }
    }

    out
}

/// Parse a leveled code such as `L3` or `Level 10` into its level.
pub fn parse_level(code: &str) -> Option<i64> {
    LEVEL_CODE
        .captures(code.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Normalize a single raw row.
pub fn normalize_record(index: usize, record: &RawRecord) -> NormalizeResult<Observation> {
    let reader = FieldReader::new(index, record);

    let employee_id = reader.required_text(fields::EMPLOYEE_ID)?;
    let year = reader
        .int(fields::YEAR)?
        .ok_or_else(|| reader.missing(fields::YEAR))?;

    let attrition = match reader.text(fields::ATTRITION) {
        None => return Err(reader.missing(fields::ATTRITION)),
        Some(v) => Attrition::from_code(&v).ok_or_else(|| NormalizeError::InvalidAttrition {
            row: reader.row_id(),
            value: v,
        })?,
    };

    Ok(Observation {
        employee_id,
        year,
        age: reader.int(fields::AGE)?,
        gender: reader.text(fields::GENDER),
        marital_status: reader.text(fields::MARITAL_STATUS),
        department: reader.text(fields::DEPARTMENT),
        job_level: reader.level(fields::JOB_LEVEL)?,
        office_code: reader.text(fields::OFFICE_CODE),
        business_travel: reader.text(fields::BUSINESS_TRAVEL),
        overtime: reader.text(fields::OVERTIME),
        monthly_income: reader.int(fields::MONTHLY_INCOME)?,
        total_working_years: reader.int(fields::TOTAL_WORKING_YEARS)?,
        years_at_company: reader.int(fields::YEARS_AT_COMPANY)?,
        years_with_manager: reader.int(fields::YEARS_WITH_MANAGER)?,
        job_satisfaction: reader.int(fields::JOB_SATISFACTION)?,
        work_life_balance: reader.int(fields::WORK_LIFE_BALANCE)?,
        rating: reader.int(fields::RATING)?,
        attrition,
    })
}

/// Typed access to one raw row, producing errors that carry its identity.
struct FieldReader<'a> {
    index: usize,
    record: &'a RawRecord,
}

impl<'a> FieldReader<'a> {
    fn new(index: usize, record: &'a RawRecord) -> Self {
        Self { index, record }
    }

    fn row_id(&self) -> RowId {
        RowId {
            index: self.index,
            employee_id: self.text(fields::EMPLOYEE_ID),
            year: self.text(fields::YEAR),
        }
    }

    fn missing(&self, field: &'static str) -> NormalizeError {
        NormalizeError::MissingField {
            row: self.row_id(),
            field,
        }
    }

    /// Trimmed text, `None` when absent or blank.
    fn text(&self, field: &str) -> Option<String> {
        self.record
            .get(field)
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    }

    fn required_text(&self, field: &'static str) -> NormalizeResult<String> {
        self.text(field).ok_or_else(|| self.missing(field))
    }

    fn int(&self, field: &'static str) -> NormalizeResult<Option<i64>> {
        match self.text(field) {
            None => Ok(None),
            Some(v) => v.parse::<i64>().map(Some).map_err(|_| NormalizeError::InvalidNumber {
                row: self.row_id(),
                field,
                value: v,
            }),
        }
    }

    fn level(&self, field: &'static str) -> NormalizeResult<Option<i64>> {
        match self.text(field) {
            None => Ok(None),
            Some(v) => parse_level(&v).map(Some).ok_or_else(|| NormalizeError::InvalidLevel {
                row: self.row_id(),
                field,
                value: v,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Some(v.to_string())))
            .collect()
    }

    fn base() -> RawRecord {
        raw(&[("employee_id", "E1"), ("year", "2021"), ("attrition", "No")])
    }

    #[test]
    fn test_full_record() {
        let record = raw(&[
            ("employee_id", "E1"),
            ("year", "2021"),
            ("age", "41"),
            ("gender", "Female"),
            ("marital_status", "Single"),
            ("department", "Sales"),
            ("job_level", "L2"),
            ("office_code", "PAR"),
            ("business_travel", "Travel_Rarely"),
            ("overtime", "Yes"),
            ("monthly_income", "5993"),
            ("total_working_years", "8"),
            ("years_at_company", "6"),
            ("years_with_curr_manager", "5"),
            ("job_satisfaction", "4"),
            ("work_life_balance", "1"),
            ("rating", "3"),
            ("attrition", "Yes"),
        ]);

        let obs = normalize_record(0, &record).unwrap();
        assert_eq!(obs.employee_id, "E1");
        assert_eq!(obs.year, 2021);
        assert_eq!(obs.age, Some(41));
        assert_eq!(obs.job_level, Some(2));
        assert_eq!(obs.overtime.as_deref(), Some("Yes"));
        assert_eq!(obs.monthly_income, Some(5993));
        assert_eq!(obs.years_with_manager, Some(5));
        assert_eq!(obs.rating, Some(3));
        assert_eq!(obs.attrition, Attrition::Yes);
    }

    #[test]
    fn test_empty_age_is_null() {
        let mut record = base();
        record.insert("age".into(), Some(String::new()));

        let obs = normalize_record(0, &record).unwrap();
        assert_eq!(obs.age, None);
    }

    #[test]
    fn test_absent_and_null_fields_are_null() {
        let mut record = base();
        record.insert("gender".into(), None);
        record.insert("department".into(), Some("   ".into()));

        let obs = normalize_record(0, &record).unwrap();
        assert_eq!(obs.gender, None);
        assert_eq!(obs.department, None);
        assert_eq!(obs.work_life_balance, None);
    }

    #[test]
    fn test_garbage_number_is_reported() {
        let mut record = base();
        record.insert("monthly_income".into(), Some("lots".into()));

        let err = normalize_record(3, &record).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::InvalidNumber {
                row: RowId {
                    index: 3,
                    employee_id: Some("E1".into()),
                    year: Some("2021".into()),
                },
                field: "monthly_income",
                value: "lots".into(),
            }
        );
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("L3"), Some(3));
        assert_eq!(parse_level("3"), Some(3));
        assert_eq!(parse_level("Level 10"), Some(10));
        assert_eq!(parse_level("L"), None);
        assert_eq!(parse_level("L3a"), None);
    }

    #[test]
    fn test_bad_level_is_reported() {
        let mut record = base();
        record.insert("job_level".into(), Some("Lx".into()));

        assert!(matches!(
            normalize_record(0, &record),
            Err(NormalizeError::InvalidLevel { field: "job_level", .. })
        ));
    }

    #[test]
    fn test_identity_fields_required() {
        let mut no_year = base();
        no_year.insert("year".into(), Some(String::new()));
        assert!(matches!(
            normalize_record(0, &no_year),
            Err(NormalizeError::MissingField { field: "year", .. })
        ));

        let mut no_id = base();
        no_id.remove("employee_id");
        assert!(matches!(
            normalize_record(0, &no_id),
            Err(NormalizeError::MissingField { field: "employee_id", .. })
        ));

        let mut no_flag = base();
        no_flag.remove("attrition");
        assert!(matches!(
            normalize_record(0, &no_flag),
            Err(NormalizeError::MissingField { field: "attrition", .. })
        ));
    }

    #[test]
    fn test_bad_attrition_flag() {
        let mut record = base();
        record.insert("attrition".into(), Some("Maybe".into()));

        assert!(matches!(
            normalize_record(0, &record),
            Err(NormalizeError::InvalidAttrition { .. })
        ));
    }

    #[test]
    fn test_batch_isolates_bad_rows() {
        let mut bad = base();
        bad.insert("age".into(), Some("abc".into()));
        let mut second = base();
        second.insert("employee_id".into(), Some("E2".into()));

        let out = normalize_batch(&[base(), bad, second]);
        assert_eq!(out.observations.len(), 2);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].row().index, 1);
        assert_eq!(out.observations[1].employee_id, "E2");
    }

    #[test]
    fn test_empty_batch() {
        let out = normalize_batch(&[]);
        assert!(out.observations.is_empty());
        assert!(out.errors.is_empty());
    }
}
