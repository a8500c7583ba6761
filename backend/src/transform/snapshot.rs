//! Snapshot reducer: one "latest known state" record per employee.
//!
//! For each employee the observation with the greatest `year` is kept. The
//! history is scanned once; the output is ordered by employee id.
//!
//! # Duplicates
//!
//! Two observations of the same employee sharing a year break the
//! `(employee, year)` uniqueness of the source. On the latest year the winner
//! is chosen by an explicit [`TieBreak`] policy and reported as
//! [`IntegrityWarning::DuplicateLatestYear`]. Older duplicates leave the
//! snapshot alone but are counted twice by history KPIs, so they are reported
//! as [`IntegrityWarning::DuplicateYear`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::EnrichedObservation;

/// Which observation wins when several share an employee's latest year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// The earliest in arrival order wins.
    #[default]
    KeepFirst,
    /// The latest in arrival order wins.
    KeepLast,
}

/// A `(employee, year)` pair observed more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityWarning {
    /// Several observations competed for the employee's latest year.
    DuplicateLatestYear {
        employee_id: String,
        year: i64,
        /// Number of observations sharing that year.
        competing: usize,
        /// Arrival index of the observation that was kept.
        kept_index: usize,
    },
    /// Several observations share an older year.
    DuplicateYear {
        employee_id: String,
        year: i64,
        competing: usize,
    },
}

impl IntegrityWarning {
    pub fn employee_id(&self) -> &str {
        match self {
            Self::DuplicateLatestYear { employee_id, .. }
            | Self::DuplicateYear { employee_id, .. } => employee_id,
        }
    }

    pub fn year(&self) -> i64 {
        match self {
            Self::DuplicateLatestYear { year, .. } | Self::DuplicateYear { year, .. } => *year,
        }
    }
}

impl std::fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateLatestYear {
                employee_id,
                year,
                competing,
                kept_index,
            } => write!(
                f,
                "employee {employee_id} has {competing} observations for latest year {year}; \
                 kept row {kept_index}"
            ),
            Self::DuplicateYear {
                employee_id,
                year,
                competing,
            } => write!(f, "employee {employee_id} has {competing} observations for year {year}"),
        }
    }
}

/// One record per employee plus the duplicates met on the way.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub records: Vec<EnrichedObservation>,
    pub warnings: Vec<IntegrityWarning>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct Slot {
    index: usize,
    year: i64,
    competing: usize,
}

/// Collapse a multi-year history into its snapshot.
pub fn reduce_to_snapshot(history: &[EnrichedObservation], policy: TieBreak) -> Snapshot {
    let mut latest: HashMap<&str, Slot> = HashMap::new();
    let mut per_year: HashMap<(&str, i64), usize> = HashMap::new();

    for (index, record) in history.iter().enumerate() {
        *per_year.entry((record.employee_id.as_str(), record.year)).or_default() += 1;

        let slot = latest.entry(record.employee_id.as_str()).or_insert(Slot {
            index,
            year: record.year,
            competing: 0,
        });

        if record.year > slot.year || slot.competing == 0 {
            *slot = Slot {
                index,
                year: record.year,
                competing: 1,
            };
        } else if record.year == slot.year {
            slot.competing += 1;
            if policy == TieBreak::KeepLast {
                slot.index = index;
            }
        }
    }

    let mut warnings: Vec<IntegrityWarning> = per_year
        .into_iter()
        .filter(|&((employee_id, year), competing)| {
            competing > 1 && latest.get(employee_id).is_some_and(|slot| year < slot.year)
        })
        .map(|((employee_id, year), competing)| IntegrityWarning::DuplicateYear {
            employee_id: employee_id.to_string(),
            year,
            competing,
        })
        .collect();

    let mut slots: Vec<(&str, Slot)> = latest.into_iter().collect();
    slots.sort_by(|a, b| a.0.cmp(b.0));

    let mut records = Vec::with_capacity(slots.len());
    for (employee_id, slot) in slots {
        if slot.competing > 1 {
            warnings.push(IntegrityWarning::DuplicateLatestYear {
                employee_id: employee_id.to_string(),
                year: slot.year,
                competing: slot.competing,
                kept_index: slot.index,
            });
        }
        records.push(history[slot.index].clone());
    }

    warnings.sort_by(|a, b| (a.employee_id(), a.year()).cmp(&(b.employee_id(), b.year())));

    Snapshot { records, warnings }
}
