//! The fixed set of KPI definitions.
//!
//! Each [`Kpi`] is a `(source, bucket rule, filter, metrics, order)` tuple
//! handed to the shared [`aggregate`](super::aggregator::aggregate).

use serde::{Deserialize, Serialize};

use super::aggregator::{Metric, SegmentQuery, SortOrder};
use super::buckets;

const RATE: &[Metric] = &[Metric::AttritionRate];

/// Which record set a KPI reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// One latest-state record per employee.
    Snapshot,
    /// Every enriched observation, all years.
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Kpi {
    Overtime,
    IncomeBracket,
    ManagerTenure,
    RatingByAttrition,
    DeparturesByYear,
    BusinessTravel,
    MaritalStatus,
    JobSatisfaction,
    Department,
    JobRole,
    OfficeCountry,
}

impl Kpi {
    pub const ALL: [Kpi; 11] = [
        Kpi::Overtime,
        Kpi::IncomeBracket,
        Kpi::ManagerTenure,
        Kpi::RatingByAttrition,
        Kpi::DeparturesByYear,
        Kpi::BusinessTravel,
        Kpi::MaritalStatus,
        Kpi::JobSatisfaction,
        Kpi::Department,
        Kpi::JobRole,
        Kpi::OfficeCountry,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Overtime => "overtime",
            Self::IncomeBracket => "income_bracket",
            Self::ManagerTenure => "manager_tenure",
            Self::RatingByAttrition => "rating_by_attrition",
            Self::DeparturesByYear => "departures_by_year",
            Self::BusinessTravel => "business_travel",
            Self::MaritalStatus => "marital_status",
            Self::JobSatisfaction => "job_satisfaction",
            Self::Department => "department",
            Self::JobRole => "job_role",
            Self::OfficeCountry => "office_country",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Overtime => "Attrition rate by overtime flag",
            Self::IncomeBracket => {
                "Attrition rate by monthly income \
                 (Low <3000, Medium 3000-7000, High 7001-12000, Executive >12000)"
            }
            Self::ManagerTenure => {
                "Attrition rate by years with current manager (New 0-2, Stable 3-5, Long-term >5)"
            }
            Self::RatingByAttrition => {
                "Average survey rating and work-life balance, leavers vs stayers"
            }
            Self::DeparturesByYear => {
                "Departures per year with their average survey rating (full history)"
            }
            Self::BusinessTravel => "Attrition rate by business travel frequency",
            Self::MaritalStatus => "Attrition rate by marital status",
            Self::JobSatisfaction => "Attrition rate by job satisfaction score",
            Self::Department => "Attrition rate by department",
            Self::JobRole => "Attrition rate by job role",
            Self::OfficeCountry => "Attrition rate by office country",
        }
    }

    pub fn source(&self) -> Source {
        match self {
            Self::DeparturesByYear => Source::History,
            _ => Source::Snapshot,
        }
    }

    pub fn query(&self) -> SegmentQuery {
        match self {
            Self::Overtime => SegmentQuery::new(buckets::overtime).metrics(RATE),
            Self::IncomeBracket => SegmentQuery::new(buckets::income_bracket)
                .metrics(RATE)
                .order(SortOrder::AttritionRateDesc),
            Self::ManagerTenure => SegmentQuery::new(buckets::manager_tenure)
                .metrics(RATE)
                .order(SortOrder::AttritionRateDesc),
            Self::RatingByAttrition => SegmentQuery::new(buckets::attrition)
                .metrics(&[Metric::AvgRating, Metric::AvgWorkLifeBalance]),
            Self::DeparturesByYear => SegmentQuery::new(buckets::observed_year)
                .filter(|r| r.attrition.departed())
                .metrics(&[Metric::AvgRating])
                .order(SortOrder::BucketAsc),
            Self::BusinessTravel => SegmentQuery::new(buckets::business_travel)
                .metrics(RATE)
                .order(SortOrder::CountDesc),
            Self::MaritalStatus => SegmentQuery::new(buckets::marital_status)
                .metrics(RATE)
                .order(SortOrder::CountDesc),
            Self::JobSatisfaction => SegmentQuery::new(buckets::job_satisfaction)
                .metrics(RATE)
                .order(SortOrder::BucketDesc),
            Self::Department => SegmentQuery::new(buckets::department)
                .metrics(RATE)
                .order(SortOrder::CountDesc),
            Self::JobRole => SegmentQuery::new(buckets::job_role)
                .metrics(RATE)
                .order(SortOrder::CountDesc),
            Self::OfficeCountry => SegmentQuery::new(buckets::office_country)
                .metrics(RATE)
                .order(SortOrder::CountDesc),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for Kpi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
