use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// One row of the state lookup (`FIPS.csv`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRegion {
    #[serde(rename = "State")]
    pub name: String,
    #[serde(rename = "Abbreviation")]
    pub abbreviation: String,
    /// FIPS state code.
    pub id: u32,
}

/// Static state-abbreviation lookup used as a join target.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    pub rows: Vec<StateRegion>,
}

impl ReferenceTable {
    /// Read the CSV at `path`. Columns other than `State`, `Abbreviation`
    /// and `id` are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).context("opening reference CSV")?;
        let rows = reader
            .deserialize::<StateRegion>()
            .enumerate()
            .map(|(i, row)| row.with_context(|| format!("reference CSV row {i}")))
            .collect::<Result<Vec<_>>>()?;
        Ok(ReferenceTable { rows })
    }

    /// Index rows by abbreviation for a many-to-one join.
    ///
    /// Fails when any abbreviation occurs more than once: joining against it
    /// would duplicate the left-hand rows.
    pub fn join_index(&self) -> Result<HashMap<&str, &StateRegion>, DashboardError> {
        let mut index: HashMap<&str, &StateRegion> = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            if index.insert(row.abbreviation.as_str(), row).is_some() {
                let rows = self
                    .rows
                    .iter()
                    .filter(|r| r.abbreviation == row.abbreviation)
                    .count();
                return Err(DashboardError::JoinCardinality {
                    abbreviation: row.abbreviation.clone(),
                    rows,
                });
            }
        }
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{region, write_reference};

    #[test]
    fn loads_and_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FIPS.csv");
        std::fs::write(
            &path,
            "State,Abbreviation,id,Region\nCalifornia,CA,6,West\nTexas,TX,48,South\n",
        )
        .unwrap();

        let table = ReferenceTable::load(&path).unwrap();
        assert_eq!(
            table.rows,
            vec![region("California", "CA", 6), region("Texas", "TX", 48)]
        );
        assert_eq!(table.join_index().unwrap()["TX"].id, 48);
    }

    #[test]
    fn load_failures_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ReferenceTable::load(&dir.path().join("missing.csv")).is_err());

        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "State,Abbreviation,id\nTexas,TX,not-a-number\n").unwrap();
        let err = ReferenceTable::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("row 0"));
    }

    #[test]
    fn duplicate_abbreviation_breaks_join() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FIPS.csv");
        write_reference(
            &path,
            &[
                region("Washington", "WA", 53),
                region("Oregon", "OR", 41),
                region("Washington State", "WA", 53),
            ],
        );

        let table = ReferenceTable::load(&path).unwrap();
        let err = table.join_index().unwrap_err();
        assert!(matches!(
            err,
            DashboardError::JoinCardinality { ref abbreviation, rows: 2 } if abbreviation == "WA"
        ));
    }
}
