use std::collections::{BTreeMap, BTreeSet};

use super::model::{Column, Dataset, Record};

/// Case status kept by the baseline filter.
pub const CERTIFIED: &str = "Certified";
/// Full-time flag kept by the baseline filter.
pub const FULL_TIME: &str = "Y";
/// H-1B dependency flag kept by the baseline filter.
pub const NOT_DEPENDENT: &str = "No";

/// Columns offered as multi-select filters, in sidebar order.
pub const MULTI_SELECT_COLUMNS: [Column; 4] = [
    Column::SocTitle,
    Column::EmployerName,
    Column::WorksiteCity,
    Column::WorksiteState,
];

// ---------------------------------------------------------------------------
// Stage 1: baseline eligibility
// ---------------------------------------------------------------------------

/// Certified, full-time, non-dependent cases only.
pub fn is_eligible(record: &Record) -> bool {
    record.case_status.as_deref() == Some(CERTIFIED)
        && record.full_time_position.as_deref() == Some(FULL_TIME)
        && record.h1b_dependent.as_deref() == Some(NOT_DEPENDENT)
}

/// Positions of all rows that pass [`is_eligible`].
pub fn eligible_rows(dataset: &Dataset) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| is_eligible(r))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Stage 2: user criteria
// ---------------------------------------------------------------------------

/// User-supplied filters. Blank text and absent or empty selections impose
/// no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the job title.
    pub job_title: String,
    /// column → allowed values.
    pub selections: BTreeMap<Column, BTreeSet<String>>,
}

impl FilterCriteria {
    /// Allowed values for `column`, or `None` when it is unrestricted.
    pub fn selection(&self, column: Column) -> Option<&BTreeSet<String>> {
        self.selections.get(&column).filter(|s| !s.is_empty())
    }

    pub fn is_selected(&self, column: Column, value: &str) -> bool {
        self.selection(column).is_some_and(|s| s.contains(value))
    }

    /// Replace the allowed set for `column`.
    pub fn select(&mut self, column: Column, values: impl IntoIterator<Item = String>) {
        let values: BTreeSet<String> = values.into_iter().collect();
        if values.is_empty() {
            self.selections.remove(&column);
        } else {
            self.selections.insert(column, values);
        }
    }

    /// Add or remove a single value.
    pub fn toggle(&mut self, column: Column, value: &str) {
        let selected = self.selections.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        if selected.is_empty() {
            self.selections.remove(&column);
        }
    }

    pub fn clear_selection(&mut self, column: Column) {
        self.selections.remove(&column);
    }

    /// Whether no criterion is active.
    pub fn is_unrestricted(&self) -> bool {
        self.job_title.trim().is_empty() && self.selections.values().all(BTreeSet::is_empty)
    }
}

/// Keep rows whose job title contains `needle`, ignoring case. Rows with no
/// job title never match; a blank needle keeps everything.
pub fn apply_job_title(dataset: &Dataset, rows: &[usize], needle: &str) -> Vec<usize> {
    let needle = needle.trim();
    if needle.is_empty() {
        return rows.to_vec();
    }
    let needle = needle.to_lowercase();
    rows.iter()
        .copied()
        .filter(|&i| {
            dataset.records[i]
                .job_title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Keep rows whose value is in every active selection. A missing value
/// never matches a non-empty selection.
pub fn apply_selections(dataset: &Dataset, rows: &[usize], criteria: &FilterCriteria) -> Vec<usize> {
    let active: Vec<(Column, &BTreeSet<String>)> = criteria
        .selections
        .iter()
        .filter(|(_, allowed)| !allowed.is_empty())
        .map(|(col, allowed)| (*col, allowed))
        .collect();
    if active.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .copied()
        .filter(|&i| {
            let record = &dataset.records[i];
            active.iter().all(|(col, allowed)| {
                record.text(*col).is_some_and(|v| allowed.contains(v))
            })
        })
        .collect()
}

/// Apply all Stage 2 criteria to `rows`.
pub fn apply_criteria(dataset: &Dataset, rows: &[usize], criteria: &FilterCriteria) -> Vec<usize> {
    let rows = apply_job_title(dataset, rows, &criteria.job_title);
    apply_selections(dataset, &rows, criteria)
}

/// Sorted distinct non-null values of `column` over `rows`.
pub fn distinct_values(dataset: &Dataset, rows: &[usize], column: Column) -> BTreeSet<String> {
    rows.iter()
        .filter_map(|&i| dataset.records[i].text(column))
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A non-empty set of row positions. Aggregations take this type, so they
/// can never run over an empty result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(Vec<usize>);

impl Selection {
    /// `None` when `rows` is empty.
    pub fn new(rows: Vec<usize>) -> Option<Self> {
        (!rows.is_empty()).then_some(Selection(rows))
    }

    pub fn rows(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Records of the selection, in dataset order.
    pub fn records<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = &'a Record> + 'a {
        self.0.iter().map(move |&i| &dataset.records[i])
    }
}

/// Result of running the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Nothing passed the filters; nothing downstream should run.
    NoData,
    Rows(Selection),
}

impl FilterOutcome {
    pub fn from_rows(rows: Vec<usize>) -> Self {
        match Selection::new(rows) {
            Some(selection) => FilterOutcome::Rows(selection),
            None => FilterOutcome::NoData,
        }
    }
}

/// Stage 1 followed by Stage 2 over the whole dataset.
pub fn run(dataset: &Dataset, criteria: &FilterCriteria) -> FilterOutcome {
    let eligible = eligible_rows(dataset);
    FilterOutcome::from_rows(apply_criteria(dataset, &eligible, criteria))
}
