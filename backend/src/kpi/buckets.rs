//! Bucketing rules: map one record to its segment label.
//!
//! Every rule sends a record whose source field is null to
//! [`Bucket::Unknown`]. Out-of-domain values (negative income or tenure)
//! go there too.

use std::cmp::Ordering;

use serde::{Serialize, Serializer};

use crate::models::EnrichedObservation;

/// A segment label.
///
/// Natural order: integers numerically, then labels lexically, then
/// `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bucket {
    Int(i64),
    Label(String),
    Unknown,
}

impl Bucket {
    pub const UNKNOWN_LABEL: &'static str = "Unknown";

    pub fn label(s: impl Into<String>) -> Self {
        Self::Label(s.into())
    }

    fn from_text(value: Option<&str>) -> Self {
        value.map_or(Self::Unknown, |s| Self::Label(s.to_string()))
    }

    fn from_int(value: Option<i64>) -> Self {
        value.map_or(Self::Unknown, Self::Int)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Int(_) => 0,
            Self::Label(_) => 1,
            Self::Unknown => 2,
        }
    }
}

impl Ord for Bucket {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Label(a), Self::Label(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Bucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Label(s) => f.write_str(s),
            Self::Unknown => f.write_str(Self::UNKNOWN_LABEL),
        }
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// Rules
// =============================================================================

pub fn overtime(r: &EnrichedObservation) -> Bucket {
    Bucket::from_text(r.overtime.as_deref())
}

/// Monthly income brackets, first match wins:
/// Low `< 3000`, Medium `3000..=7000`, High `7001..=12000`, Executive `> 12000`.
pub fn income_bracket(r: &EnrichedObservation) -> Bucket {
    match r.monthly_income {
        None => Bucket::Unknown,
        Some(i) if i < 0 => Bucket::Unknown,
        Some(i) if i < 3000 => Bucket::label("Low"),
        Some(i) if i <= 7000 => Bucket::label("Medium"),
        Some(i) if i <= 12000 => Bucket::label("High"),
        Some(_) => Bucket::label("Executive"),
    }
}

/// Years with current manager: New `0..=2`, Stable `3..=5`, Long-term `> 5`.
pub fn manager_tenure(r: &EnrichedObservation) -> Bucket {
    match r.years_with_manager {
        Some(0..=2) => Bucket::label("New"),
        Some(3..=5) => Bucket::label("Stable"),
        Some(y) if y > 5 => Bucket::label("Long-term"),
        _ => Bucket::Unknown,
    }
}

pub fn attrition(r: &EnrichedObservation) -> Bucket {
    Bucket::label(r.attrition.as_str())
}

pub fn observed_year(r: &EnrichedObservation) -> Bucket {
    Bucket::Int(r.year)
}

pub fn business_travel(r: &EnrichedObservation) -> Bucket {
    Bucket::from_text(r.business_travel.as_deref())
}

pub fn marital_status(r: &EnrichedObservation) -> Bucket {
    Bucket::from_text(r.marital_status.as_deref())
}

pub fn job_satisfaction(r: &EnrichedObservation) -> Bucket {
    Bucket::from_int(r.job_satisfaction)
}

pub fn department(r: &EnrichedObservation) -> Bucket {
    Bucket::from_text(r.department.as_deref())
}

pub fn job_role(r: &EnrichedObservation) -> Bucket {
    Bucket::from_text(r.job_role.as_deref())
}

pub fn office_country(r: &EnrichedObservation) -> Bucket {
    Bucket::from_text(r.office_country.as_deref())
}

/// Single bucket holding every record.
pub fn everyone(_: &EnrichedObservation) -> Bucket {
    Bucket::label("All")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attrition, Observation};

    fn with_income(income: Option<i64>) -> EnrichedObservation {
        let mut o = Observation::new("E1", 2021, Attrition::No);
        o.monthly_income = income;
        EnrichedObservation::bare(o)
    }

    fn with_manager_years(years: Option<i64>) -> EnrichedObservation {
        let mut o = Observation::new("E1", 2021, Attrition::No);
        o.years_with_manager = years;
        EnrichedObservation::bare(o)
    }

    fn income(i: Option<i64>) -> String {
        income_bracket(&with_income(i)).to_string()
    }

    #[test]
    fn test_income_brackets() {
        assert_eq!(income(Some(0)), "Low");
        assert_eq!(income(Some(2999)), "Low");
        assert_eq!(income(Some(3000)), "Medium");
        assert_eq!(income(Some(7000)), "Medium");
        assert_eq!(income(Some(7001)), "High");
        assert_eq!(income(Some(12001)), "Executive");
    }

    #[test]
    fn test_income_12000_is_high() {
        assert_eq!(income(Some(12000)), "High");
    }

    #[test]
    fn test_income_unknown() {
        assert_eq!(income(None), "Unknown");
        assert_eq!(income(Some(-5)), "Unknown");
    }

    #[test]
    fn test_manager_tenure() {
        let tenure = |y| manager_tenure(&with_manager_years(y)).to_string();
        assert_eq!(tenure(Some(0)), "New");
        assert_eq!(tenure(Some(2)), "New");
        assert_eq!(tenure(Some(3)), "Stable");
        assert_eq!(tenure(Some(5)), "Stable");
        assert_eq!(tenure(Some(6)), "Long-term");
        assert_eq!(tenure(Some(-1)), "Unknown");
        assert_eq!(tenure(None), "Unknown");
    }

    #[test]
    fn test_null_text_fields_are_unknown() {
        let r = EnrichedObservation::bare(Observation::new("E1", 2021, Attrition::Yes));
        assert!(overtime(&r).is_unknown());
        assert!(business_travel(&r).is_unknown());
        assert!(marital_status(&r).is_unknown());
        assert!(job_satisfaction(&r).is_unknown());
        assert!(department(&r).is_unknown());
        assert!(job_role(&r).is_unknown());
        assert!(office_country(&r).is_unknown());
        assert_eq!(attrition(&r), Bucket::label("Yes"));
        assert_eq!(observed_year(&r), Bucket::Int(2021));
    }

    #[test]
    fn test_natural_order() {
        let mut buckets = vec![
            Bucket::Unknown,
            Bucket::label("b"),
            Bucket::Int(10),
            Bucket::label("a"),
            Bucket::Int(2),
        ];
        buckets.sort();
        assert_eq!(
            buckets,
            vec![
                Bucket::Int(2),
                Bucket::Int(10),
                Bucket::label("a"),
                Bucket::label("b"),
                Bucket::Unknown,
            ]
        );
    }

    #[test]
    fn test_serializes_as_label() {
        assert_eq!(serde_json::to_value(Bucket::Int(2020)).unwrap(), "2020");
        assert_eq!(serde_json::to_value(Bucket::Unknown).unwrap(), "Unknown");
    }
}
