//! Segment aggregator.
//!
//! One reduction shared by every KPI: filter, bucket, accumulate, then order.
//!
//! ```text
//! records ──filter──▶ bucket fn ──▶ ┌──────────┬───────┬──────────┬─────┐
//!                                   │ bucket   │ count │ departed │ ... │
//!                                   └──────────┴───────┴──────────┴─────┘
//!                                              │ metrics + ordering
//!                                              ▼
//!                                        Vec<SegmentRow>
//! ```
//!
//! Empty buckets are never emitted. Averages skip null values and are `None`
//! when a bucket has none. Rates and averages are rounded to 2 decimals.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::buckets::Bucket;
use crate::models::EnrichedObservation;

pub type BucketFn = fn(&EnrichedObservation) -> Bucket;
pub type FilterFn = fn(&EnrichedObservation) -> bool;

/// Optional per-bucket statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    AttritionRate,
    AvgRating,
    AvgWorkLifeBalance,
}

impl Metric {
    pub fn column(&self) -> &'static str {
        match self {
            Self::AttritionRate => "attrition_rate_pct",
            Self::AvgRating => "avg_rating",
            Self::AvgWorkLifeBalance => "avg_work_life_balance",
        }
    }
}

/// Row ordering. `Unknown` always sorts last; ties fall back to natural
/// bucket order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Natural,
    AttritionRateDesc,
    CountDesc,
    BucketAsc,
    BucketDesc,
}

/// A parameterized aggregation.
#[derive(Debug, Clone, Copy)]
pub struct SegmentQuery {
    pub bucket: BucketFn,
    pub filter: Option<FilterFn>,
    pub metrics: &'static [Metric],
    pub order: SortOrder,
}

impl SegmentQuery {
    pub fn new(bucket: BucketFn) -> Self {
        Self {
            bucket,
            filter: None,
            metrics: &[],
            order: SortOrder::Natural,
        }
    }

    pub fn filter(mut self, filter: FilterFn) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn metrics(mut self, metrics: &'static [Metric]) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    fn wants(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }
}

/// One output row.
///
/// `count` and `departed` are always filled; the metric fields are `Some`
/// only when requested and defined.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub bucket: Bucket,
    pub count: usize,
    pub departed: usize,
    pub attrition_rate_pct: Option<f64>,
    pub avg_rating: Option<f64>,
    pub avg_work_life_balance: Option<f64>,
}

impl SegmentRow {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::AttritionRate => self.attrition_rate_pct,
            Metric::AvgRating => self.avg_rating,
            Metric::AvgWorkLifeBalance => self.avg_work_life_balance,
        }
    }

    /// Serializable view exposing exactly the given metrics.
    pub fn view<'a>(&'a self, metrics: &'a [Metric]) -> RowView<'a> {
        RowView { row: self, metrics }
    }
}

/// A row restricted to a metric set: `bucket`, `count`, then one key per
/// metric (`null` when undefined).
pub struct RowView<'a> {
    row: &'a SegmentRow,
    metrics: &'a [Metric],
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.metrics.len()))?;
        map.serialize_entry("bucket", &self.row.bucket)?;
        map.serialize_entry("count", &self.row.count)?;
        for metric in self.metrics {
            map.serialize_entry(metric.column(), &self.row.metric(*metric))?;
        }
        map.end()
    }
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `100 × departed / count`, rounded; `None` for an empty group.
pub fn attrition_rate(departed: usize, count: usize) -> Option<f64> {
    (count > 0).then(|| round2(100.0 * departed as f64 / count as f64))
}

#[derive(Default)]
struct Mean {
    /// Wide enough for any number of `i64` values.
    sum: i128,
    n: usize,
}

impl Mean {
    fn push(&mut self, value: Option<i64>) {
        if let Some(v) = value {
            self.sum += i128::from(v);
            self.n += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| round2(self.sum as f64 / self.n as f64))
    }
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    departed: usize,
    rating: Mean,
    work_life_balance: Mean,
}

/// Run a query over a record set.
pub fn aggregate(records: &[EnrichedObservation], query: &SegmentQuery) -> Vec<SegmentRow> {
    let mut groups: HashMap<Bucket, Accumulator> = HashMap::new();

    for record in records {
        if query.filter.is_some_and(|keep| !keep(record)) {
            continue;
        }

        let acc = groups.entry((query.bucket)(record)).or_default();
        acc.count += 1;
        if record.attrition.departed() {
            acc.departed += 1;
        }
        acc.rating.push(record.rating);
        acc.work_life_balance.push(record.work_life_balance);
    }

    let mut rows: Vec<SegmentRow> = groups
        .into_iter()
        .filter(|(_, acc)| acc.count > 0)
        .map(|(bucket, acc)| SegmentRow {
            bucket,
            count: acc.count,
            departed: acc.departed,
            attrition_rate_pct: query
                .wants(Metric::AttritionRate)
                .then(|| attrition_rate(acc.departed, acc.count))
                .flatten(),
            avg_rating: query.wants(Metric::AvgRating).then(|| acc.rating.value()).flatten(),
            avg_work_life_balance: query
                .wants(Metric::AvgWorkLifeBalance)
                .then(|| acc.work_life_balance.value())
                .flatten(),
        })
        .collect();

    rows.sort_by(|a, b| compare(query.order, a, b));
    rows
}

fn compare(order: SortOrder, a: &SegmentRow, b: &SegmentRow) -> Ordering {
    let unknown_last = a.bucket.is_unknown().cmp(&b.bucket.is_unknown());

    let primary = match order {
        SortOrder::Natural | SortOrder::BucketAsc => Ordering::Equal,
        SortOrder::BucketDesc => b.bucket.cmp(&a.bucket),
        SortOrder::CountDesc => b.count.cmp(&a.count),
        SortOrder::AttritionRateDesc => {
            let rate = |r: &SegmentRow| attrition_rate(r.departed, r.count).unwrap_or(0.0);
            rate(b).total_cmp(&rate(a))
        }
    };

    unknown_last
        .then(primary)
        .then_with(|| a.bucket.cmp(&b.bucket))
}
