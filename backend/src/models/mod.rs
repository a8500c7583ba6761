//! Domain models for the attrition pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`RawRecord`] - One staged row, every field free-form text
//! - [`Observation`] - Typed employee-year observation
//! - [`EnrichedObservation`] - Observation with joined dimension attributes
//! - [`Office`] / [`JobPosition`] - Reference dimensions
//! - [`Attrition`] - Departed-as-of-this-record flag

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A staged row: column name to text, `None` for an absent cell.
pub type RawRecord = BTreeMap<String, Option<String>>;

// =============================================================================
// Column Names
// =============================================================================

/// Column names of the staged observation table.
pub mod fields {
    pub const EMPLOYEE_ID: &str = "employee_id";
    pub const YEAR: &str = "year";
    pub const AGE: &str = "age";
    pub const GENDER: &str = "gender";
    pub const MARITAL_STATUS: &str = "marital_status";
    pub const DEPARTMENT: &str = "department";
    pub const JOB_LEVEL: &str = "job_level";
    pub const OFFICE_CODE: &str = "office_code";
    pub const BUSINESS_TRAVEL: &str = "business_travel";
    pub const OVERTIME: &str = "overtime";
    pub const MONTHLY_INCOME: &str = "monthly_income";
    pub const TOTAL_WORKING_YEARS: &str = "total_working_years";
    pub const YEARS_AT_COMPANY: &str = "years_at_company";
    pub const YEARS_WITH_MANAGER: &str = "years_with_curr_manager";
    pub const JOB_SATISFACTION: &str = "job_satisfaction";
    pub const WORK_LIFE_BALANCE: &str = "work_life_balance";
    pub const RATING: &str = "rating";
    pub const ATTRITION: &str = "attrition";

    /// Office dimension columns.
    pub const OFFICE_CITY: &str = "city";
    pub const OFFICE_REGION: &str = "region";
    pub const OFFICE_COUNTRY: &str = "country";

    /// Job position dimension columns.
    pub const JOB_ROLE: &str = "job_role";
}

// =============================================================================
// Attrition Flag
// =============================================================================

/// Whether the employee had departed as of the observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attrition {
    Yes,
    No,
}

impl Attrition {
    /// Parse the flag, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" | "1" => Some(Self::Yes),
            "no" | "n" | "false" | "0" => Some(Self::No),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    pub fn departed(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl std::fmt::Display for Attrition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Observations
// =============================================================================

/// One employee's recorded state for one year.
///
/// Identified by `(employee_id, year)`. Every other field is optional except
/// the attrition flag, which all aggregates partition on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub employee_id: String,
    pub year: i64,

    // Demographics
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,

    // Employment
    pub department: Option<String>,
    pub job_level: Option<i64>,
    pub office_code: Option<String>,
    pub business_travel: Option<String>,
    pub overtime: Option<String>,

    // Compensation and tenure
    pub monthly_income: Option<i64>,
    pub total_working_years: Option<i64>,
    pub years_at_company: Option<i64>,
    pub years_with_manager: Option<i64>,

    // Survey scores
    pub job_satisfaction: Option<i64>,
    pub work_life_balance: Option<i64>,
    pub rating: Option<i64>,

    pub attrition: Attrition,
}

impl Observation {
    /// Minimal observation, every optional field null.
    pub fn new(employee_id: impl Into<String>, year: i64, attrition: Attrition) -> Self {
        Self {
            employee_id: employee_id.into(),
            year,
            age: None,
            gender: None,
            marital_status: None,
            department: None,
            job_level: None,
            office_code: None,
            business_travel: None,
            overtime: None,
            monthly_income: None,
            total_working_years: None,
            years_at_company: None,
            years_with_manager: None,
            job_satisfaction: None,
            work_life_balance: None,
            rating: None,
            attrition,
        }
    }
}

/// An observation with the attributes attached by the dimensional join.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedObservation {
    #[serde(flatten)]
    pub observation: Observation,
    pub office_country: Option<String>,
    pub job_role: Option<String>,
}

impl EnrichedObservation {
    /// Wrap an observation with no joined attributes.
    pub fn bare(observation: Observation) -> Self {
        Self {
            observation,
            office_country: None,
            job_role: None,
        }
    }
}

impl std::ops::Deref for EnrichedObservation {
    type Target = Observation;

    fn deref(&self) -> &Observation {
        &self.observation
    }
}

// =============================================================================
// Dimensions
// =============================================================================

/// Office dimension row, keyed by `code`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Office {
    pub code: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

/// Job position dimension row, keyed by `(department, job_level)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobPosition {
    pub department: String,
    pub job_level: i64,
    pub job_role: String,
}
