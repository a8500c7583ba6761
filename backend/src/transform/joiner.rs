//! Dimensional joiner: attach office and job position attributes.
//!
//! Left-join semantics. A lookup miss attaches `None` and keeps the row; an
//! ambiguous key (duplicate natural key in the dimension table) attaches
//! `None` as well and is reported as an integrity warning.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{IntegrityError, IntegrityResult};
use crate::models::{EnrichedObservation, JobPosition, Observation, Office};

/// Read-only access to the reference dimensions.
pub trait DimensionLookup {
    /// Office by code. `Ok(None)` on a miss.
    fn office(&self, code: &str) -> IntegrityResult<Option<&Office>>;

    /// Job position by `(department, job_level)`. `Ok(None)` on a miss.
    fn job_position(
        &self,
        department: &str,
        job_level: i64,
    ) -> IntegrityResult<Option<&JobPosition>>;
}

/// In-memory dimension tables indexed by natural key.
///
/// Every row is kept per key so that duplicates surface at lookup time.
#[derive(Debug, Clone, Default)]
pub struct DimensionTables {
    offices: HashMap<String, Vec<Office>>,
    positions: HashMap<(String, i64), Vec<JobPosition>>,
}

impl DimensionTables {
    pub fn new(offices: Vec<Office>, positions: Vec<JobPosition>) -> Self {
        let mut tables = Self::default();
        for office in offices {
            tables.offices.entry(office.code.clone()).or_default().push(office);
        }
        for position in positions {
            tables
                .positions
                .entry((position.department.clone(), position.job_level))
                .or_default()
                .push(position);
        }
        tables
    }

    /// Tables with no rows; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn office_count(&self) -> usize {
        self.offices.values().map(Vec::len).sum()
    }

    pub fn position_count(&self) -> usize {
        self.positions.values().map(Vec::len).sum()
    }
}

impl DimensionLookup for DimensionTables {
    fn office(&self, code: &str) -> IntegrityResult<Option<&Office>> {
        match self.offices.get(code).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([office]) => Ok(Some(office)),
            Some(many) => Err(IntegrityError::AmbiguousOffice {
                code: code.to_string(),
                matches: many.len(),
            }),
        }
    }

    fn job_position(
        &self,
        department: &str,
        job_level: i64,
    ) -> IntegrityResult<Option<&JobPosition>> {
        match self
            .positions
            .get(&(department.to_string(), job_level))
            .map(Vec::as_slice)
        {
            None | Some([]) => Ok(None),
            Some([position]) => Ok(Some(position)),
            Some(many) => Err(IntegrityError::AmbiguousJobPosition {
                department: department.to_string(),
                job_level,
                matches: many.len(),
            }),
        }
    }
}

/// An integrity problem met while joining one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinWarning {
    pub employee_id: String,
    pub year: i64,
    pub message: String,
}

/// Output of the join stage.
#[derive(Debug, Clone, Default)]
pub struct Joined {
    pub records: Vec<EnrichedObservation>,
    pub warnings: Vec<JoinWarning>,
}

/// Enrich every observation. Output has exactly one row per input row, in
/// input order.
pub fn join_dimensions<D: DimensionLookup + ?Sized>(
    observations: Vec<Observation>,
    dims: &D,
) -> Joined {
    let mut out = Joined {
        records: Vec::with_capacity(observations.len()),
        warnings: Vec::new(),
    };

    for observation in observations {
        let mut warn = |e: IntegrityError| {
            out.warnings.push(JoinWarning {
                employee_id: observation.employee_id.clone(),
                year: observation.year,
                message: e.to_string(),
            });
        };

        let office_country = match observation.office_code.as_deref().map(|c| dims.office(c)) {
            None => None,
            Some(Ok(office)) => office.and_then(|o| o.country.clone()),
            Some(Err(e)) => {
                warn(e);
                None
            }
        };

        let job_role = match (observation.department.as_deref(), observation.job_level) {
            (Some(dept), Some(level)) => match dims.job_position(dept, level) {
                Ok(position) => position.map(|p| p.job_role.clone()),
                Err(e) => {
                    warn(e);
                    None
                }
            },
            _ => None,
        };

        out.records.push(EnrichedObservation {
            observation,
            office_country,
            job_role,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attrition;

    fn office(code: &str, country: &str) -> Office {
        Office {
            code: code.into(),
            city: None,
            region: None,
            country: Some(country.into()),
        }
    }

    fn position(dept: &str, level: i64, role: &str) -> JobPosition {
        JobPosition {
            department: dept.into(),
            job_level: level,
            job_role: role.into(),
        }
    }

    fn obs(id: &str, office: Option<&str>, dept: Option<&str>, level: Option<i64>) -> Observation {
        let mut o = Observation::new(id, 2021, Attrition::No);
        o.office_code = office.map(String::from);
        o.department = dept.map(String::from);
        o.job_level = level;
        o
    }

    fn tables() -> DimensionTables {
        DimensionTables::new(
            vec![office("PAR", "France"), office("NYC", "USA")],
            vec![
                position("Sales", 1, "Sales Representative"),
                position("Sales", 2, "Sales Executive"),
            ],
        )
    }

    #[test]
    fn test_hits_attach_attributes() {
        let joined =
            join_dimensions(vec![obs("E1", Some("PAR"), Some("Sales"), Some(2))], &tables());

        assert_eq!(joined.records.len(), 1);
        assert_eq!(joined.records[0].office_country.as_deref(), Some("France"));
        assert_eq!(joined.records[0].job_role.as_deref(), Some("Sales Executive"));
        assert!(joined.warnings.is_empty());
    }

    #[test]
    fn test_misses_keep_rows_with_nulls() {
        let input = vec![
            obs("E1", Some("BER"), Some("Sales"), Some(9)),
            obs("E2", None, None, None),
            obs("E3", Some("NYC"), Some("Sales"), None),
        ];
        let joined = join_dimensions(input, &tables());

        assert_eq!(joined.records.len(), 3);
        assert_eq!(joined.records[0].office_country, None);
        assert_eq!(joined.records[0].job_role, None);
        assert_eq!(joined.records[1].office_country, None);
        assert_eq!(joined.records[2].office_country.as_deref(), Some("USA"));
        assert_eq!(joined.records[2].job_role, None);
        assert!(joined.warnings.is_empty());
    }

    #[test]
    fn test_ambiguous_keys_warn_and_attach_null() {
        let dims = DimensionTables::new(
            vec![office("PAR", "France"), office("PAR", "Canada")],
            vec![position("HR", 1, "HR Assistant"), position("HR", 1, "HR Clerk")],
        );
        let joined = join_dimensions(vec![obs("E9", Some("PAR"), Some("HR"), Some(1))], &dims);

        assert_eq!(joined.records.len(), 1);
        assert_eq!(joined.records[0].office_country, None);
        assert_eq!(joined.records[0].job_role, None);
        assert_eq!(joined.warnings.len(), 2);
        assert_eq!(joined.warnings[0].employee_id, "E9");
        assert!(joined.warnings[0].message.contains("PAR"));
        assert!(joined.warnings[1].message.contains("HR"));
    }

    #[test]
    fn test_lookup_errors() {
        let dims = DimensionTables::new(
            vec![office("PAR", "France"), office("PAR", "France")],
            vec![],
        );
        assert_eq!(
            dims.office("PAR"),
            Err(IntegrityError::AmbiguousOffice {
                code: "PAR".into(),
                matches: 2
            })
        );
        assert_eq!(dims.office("NYC"), Ok(None));
        assert_eq!(dims.office_count(), 2);
    }

    /// Fixture collaborator: every office resolves to the same country.
    struct Everywhere;

    impl DimensionLookup for Everywhere {
        fn office(&self, _code: &str) -> IntegrityResult<Option<&Office>> {
            static OFFICE: once_cell::sync::Lazy<Office> = once_cell::sync::Lazy::new(|| Office {
                code: "*".into(),
                city: None,
                region: None,
                country: Some("Atlantis".into()),
            });
            Ok(Some(&*OFFICE))
        }

        fn job_position(
            &self,
            _department: &str,
            _job_level: i64,
        ) -> IntegrityResult<Option<&JobPosition>> {
            Ok(None)
        }
    }

    #[test]
    fn test_lookup_is_substitutable() {
        let joined = join_dimensions(vec![obs("E1", Some("ZZZ"), None, None)], &Everywhere);
        assert_eq!(joined.records[0].office_country.as_deref(), Some("Atlantis"));
    }
}
