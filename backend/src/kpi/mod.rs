//! KPI module.
//!
//! - Buckets: segmentation rules and the [`Bucket`] label type
//! - Aggregator: the shared parameterized reduction
//! - Catalog: the fixed [`Kpi`] definitions
//!
//! KPIs only read their inputs, so [`compute_all`] evaluates them on the
//! rayon pool and returns tables in request order.

pub mod aggregator;
pub mod buckets;
pub mod catalog;

use rayon::prelude::*;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::models::EnrichedObservation;

pub use aggregator::{
    aggregate, attrition_rate, round2, Metric, SegmentQuery, SegmentRow, SortOrder,
};
pub use buckets::Bucket;
pub use catalog::{Kpi, Source};

/// Result rows of one KPI.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiTable {
    pub kpi: Kpi,
    pub rows: Vec<SegmentRow>,
}

impl KpiTable {
    pub fn metrics(&self) -> &'static [Metric] {
        self.kpi.query().metrics
    }
}

impl Serialize for KpiTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let metrics = self.metrics();
        let rows: Vec<_> = self.rows.iter().map(|r| r.view(metrics)).collect();

        let mut s = serializer.serialize_struct("KpiTable", 5)?;
        s.serialize_field("kpi", &self.kpi)?;
        s.serialize_field("description", self.kpi.description())?;
        s.serialize_field("source", &self.kpi.source())?;
        s.serialize_field("order", &self.kpi.query().order)?;
        s.serialize_field("rows", &rows)?;
        s.end()
    }
}

/// Compute one KPI.
pub fn compute_kpi(
    kpi: Kpi,
    snapshot: &[EnrichedObservation],
    history: &[EnrichedObservation],
) -> KpiTable {
    let records = match kpi.source() {
        Source::Snapshot => snapshot,
        Source::History => history,
    };
    KpiTable {
        kpi,
        rows: aggregate(records, &kpi.query()),
    }
}

/// Compute several KPIs, in parallel when asked. Output follows `kpis`.
pub fn compute_all(
    kpis: &[Kpi],
    snapshot: &[EnrichedObservation],
    history: &[EnrichedObservation],
    parallel: bool,
) -> Vec<KpiTable> {
    if parallel {
        kpis.par_iter()
            .map(|kpi| compute_kpi(*kpi, snapshot, history))
            .collect()
    } else {
        kpis.iter()
            .map(|kpi| compute_kpi(*kpi, snapshot, history))
            .collect()
    }
}

/// Headline figures over the whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub employees: usize,
    pub departed: usize,
    pub attrition_rate_pct: Option<f64>,
    pub avg_rating: Option<f64>,
    pub avg_work_life_balance: Option<f64>,
}

impl Summary {
    const METRICS: &'static [Metric] = &[
        Metric::AttritionRate,
        Metric::AvgRating,
        Metric::AvgWorkLifeBalance,
    ];

    pub fn compute(snapshot: &[EnrichedObservation]) -> Self {
        let query = SegmentQuery::new(buckets::everyone).metrics(Self::METRICS);
        match aggregate(snapshot, &query).into_iter().next() {
            Some(row) => Self {
                employees: row.count,
                departed: row.departed,
                attrition_rate_pct: row.attrition_rate_pct,
                avg_rating: row.avg_rating,
                avg_work_life_balance: row.avg_work_life_balance,
            },
            None => Self {
                employees: 0,
                departed: 0,
                attrition_rate_pct: None,
                avg_rating: None,
                avg_work_life_balance: None,
            },
        }
    }
}
