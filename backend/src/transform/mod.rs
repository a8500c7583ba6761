//! Transformation module.
//!
//! This module turns staged rows into the record sets KPIs read:
//! - Normalizer: raw text rows to typed observations
//! - Joiner: attach office and job position attributes
//! - Snapshot: latest observation per employee
//! - Pipeline: the stages above, wired together with logging

pub mod joiner;
pub mod normalizer;
pub mod pipeline;
pub mod snapshot;

pub use joiner::{join_dimensions, DimensionLookup, DimensionTables, JoinWarning, Joined};
pub use normalizer::{normalize_batch, normalize_record, parse_level, Normalized};
pub use pipeline::*;
pub use snapshot::{reduce_to_snapshot, IntegrityWarning, Snapshot, TieBreak};
