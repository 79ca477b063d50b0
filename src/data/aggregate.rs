use std::collections::BTreeMap;

use super::filter::Selection;
use super::model::{Dataset, Record};
use super::reference::{ReferenceTable, StateRegion};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Wage statistics
// ---------------------------------------------------------------------------

/// Mean and count of non-null prevailing wages in a group.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WageStats {
    /// `None` when the group has no wage values.
    pub mean: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, wage: Option<f64>) {
        if let Some(w) = wage {
            self.sum += w;
            self.count += 1;
        }
    }

    fn finish(&self) -> WageStats {
        WageStats {
            mean: (self.count > 0).then(|| self.sum / self.count as f64),
            count: self.count,
        }
    }
}

/// Group the selection by `key`, skipping records whose key is missing.
/// Groups come back in key order.
fn group_by<'a, K: Ord>(
    dataset: &'a Dataset,
    selection: &'a Selection,
    key: impl Fn(&'a Record) -> Option<K>,
) -> BTreeMap<K, WageStats> {
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for record in selection.records(dataset) {
        if let Some(k) = key(record) {
            groups.entry(k).or_default().push(record.prevailing_wage);
        }
    }
    groups
        .into_iter()
        .map(|(k, acc)| (k, acc.finish()))
        .collect()
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Wage stats for one worksite state, joined with the reference table.
///
/// The map places tiles by `state` abbreviation; `region` carries the state
/// name for tooltips, and its FIPS `id` is only there because it is part of
/// the joined row.
#[derive(Debug, Clone, PartialEq)]
pub struct StateWage {
    pub state: String,
    pub stats: WageStats,
    /// `None` when the abbreviation is not in the reference table.
    pub region: Option<StateRegion>,
}

/// Wage stats for one employer.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployerWage {
    pub employer: String,
    pub stats: WageStats,
}

/// Wage stats for one (wage level, worksite state) cell.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelStateWage {
    pub wage_level: String,
    pub state: String,
    pub stats: WageStats,
}

/// Group by worksite state and left-join the state lookup.
///
/// Fails with [`crate::error::DashboardError::JoinCardinality`] when the
/// lookup has duplicate abbreviations.
pub fn by_worksite_state(
    dataset: &Dataset,
    selection: &Selection,
    reference: &ReferenceTable,
) -> Result<Vec<StateWage>> {
    let index = reference.join_index()?;
    Ok(
        group_by(dataset, selection, |r| r.worksite_state.as_deref())
            .into_iter()
            .map(|(state, stats)| StateWage {
                state: state.to_string(),
                stats,
                region: index.get(state).map(|r| (*r).clone()),
            })
            .collect(),
    )
}

/// The `n` employers with the most wage values, most first. Equal counts
/// keep employer-name order.
pub fn top_employers(dataset: &Dataset, selection: &Selection, n: usize) -> Vec<EmployerWage> {
    let mut employers: Vec<EmployerWage> =
        group_by(dataset, selection, |r| r.employer_name.as_deref())
            .into_iter()
            .map(|(employer, stats)| EmployerWage {
                employer: employer.to_string(),
                stats,
            })
            .collect();
    // Stable sort over name-ordered groups.
    employers.sort_by(|a, b| b.stats.count.cmp(&a.stats.count));
    employers.truncate(n);
    employers
}

/// Group by wage level (missing levels become "Unknown") and worksite state.
pub fn by_wage_level_and_state(dataset: &Dataset, selection: &Selection) -> Vec<LevelStateWage> {
    group_by(dataset, selection, |r| {
        r.worksite_state
            .as_deref()
            .map(|state| (r.wage_level_label(), state))
    })
    .into_iter()
    .map(|((level, state), stats)| LevelStateWage {
        wage_level: level.to_string(),
        state: state.to_string(),
        stats,
    })
    .collect()
}

/// The three chart inputs for one filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub states: Vec<StateWage>,
    pub employers: Vec<EmployerWage>,
    pub levels: Vec<LevelStateWage>,
}

pub fn summarize(
    dataset: &Dataset,
    selection: &Selection,
    reference: &ReferenceTable,
    top_n: usize,
) -> Result<Summary> {
    Ok(Summary {
        states: by_worksite_state(dataset, selection, reference)?,
        employers: top_employers(dataset, selection, top_n),
        levels: by_wage_level_and_state(dataset, selection),
    })
}
