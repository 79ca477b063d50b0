use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::aggregate::{Summary, summarize};
use crate::data::filter::{
    FilterCriteria, FilterOutcome, MULTI_SELECT_COLUMNS, Selection, apply_job_title,
    apply_selections, distinct_values, eligible_rows,
};
use crate::data::model::{Column, Dataset, LoadKey};
use crate::data::reference::ReferenceTable;
use crate::data::store::DataStore;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// What the central panel shows after the last pipeline run.
#[derive(Debug)]
pub enum View {
    /// The selected year could not be loaded.
    Unavailable(String),
    /// Filters removed every row.
    NoData,
    Ready {
        selection: Selection,
        summary: Summary,
    },
    /// Rows survived filtering but a summary could not be built.
    Failed { selection: Selection, error: String },
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    pub store: DataStore,
    pub reference: Arc<ReferenceTable>,

    /// Year chosen in the selector.
    pub selected_year: u16,
    pub criteria: FilterCriteria,

    /// Dataset for `selected_year` (None if it failed to load).
    pub dataset: Option<Arc<Dataset>>,
    /// Rows passing the baseline filter, recomputed per dataset.
    eligible: Vec<usize>,
    /// Options for each multi-select, from rows passing the job-title filter.
    pub options: BTreeMap<Column, BTreeSet<String>>,

    pub view: View,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the state and load the default year.
    pub fn new(config: DashboardConfig, store: DataStore, reference: Arc<ReferenceTable>) -> Self {
        let selected_year = config.default_year();
        let mut state = Self {
            config,
            store,
            reference,
            selected_year,
            criteria: FilterCriteria::default(),
            dataset: None,
            eligible: Vec::new(),
            options: BTreeMap::new(),
            view: View::Unavailable("No data loaded.".into()),
            status_message: None,
        };
        state.load_year(selected_year);
        state
    }

    /// Switch to `year`, loading (or reusing) its dataset.
    pub fn load_year(&mut self, year: u16) {
        self.selected_year = year;
        let key = LoadKey::new([year], self.config.quarters.iter().copied());
        match self.store.dataset(&key) {
            Ok(dataset) => {
                self.eligible = eligible_rows(&dataset);
                log::info!(
                    "Year {year}: {} rows, {} eligible",
                    dataset.len(),
                    self.eligible.len()
                );
                self.dataset = Some(dataset);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load year {year}: {e}");
                self.dataset = None;
                self.eligible.clear();
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.refilter();
    }

    /// Re-run the filter pipeline and rebuild the summary.
    pub fn refilter(&mut self) {
        let Some(dataset) = self.dataset.clone() else {
            self.options.clear();
            self.view = View::Unavailable(
                self.status_message
                    .clone()
                    .unwrap_or_else(|| "No data loaded.".into()),
            );
            return;
        };

        let titled = apply_job_title(&dataset, &self.eligible, &self.criteria.job_title);
        self.options = MULTI_SELECT_COLUMNS
            .iter()
            .map(|&col| (col, distinct_values(&dataset, &titled, col)))
            .collect();

        let rows = apply_selections(&dataset, &titled, &self.criteria);
        self.view = match FilterOutcome::from_rows(rows) {
            FilterOutcome::NoData => View::NoData,
            FilterOutcome::Rows(selection) => {
                match summarize(
                    &dataset,
                    &selection,
                    &self.reference,
                    self.config.top_employers,
                ) {
                    Ok(summary) => View::Ready { selection, summary },
                    Err(e) => {
                        log::error!("Failed to summarise filtered data: {e}");
                        View::Failed {
                            selection,
                            error: e.to_string(),
                        }
                    }
                }
            }
        };
    }

    pub fn set_job_title(&mut self, text: String) {
        self.criteria.job_title = text;
        self.refilter();
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle_selection(&mut self, column: Column, value: &str) {
        self.criteria.toggle(column, value);
        self.refilter();
    }

    pub fn clear_selection(&mut self, column: Column) {
        self.criteria.clear_selection(column);
        self.refilter();
    }

    /// Load from another data directory, keeping the selected year.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        log::info!("Switching data directory to {}", dir.display());
        self.store.set_data_dir(dir);
        self.reload_reference_and_year();
    }

    /// Drop every cached load and re-read the reference table and the
    /// selected year from disk.
    pub fn reload(&mut self) {
        self.store.clear();
        self.reload_reference_and_year();
    }

    /// A reference table that no longer loads keeps the previous one in use
    /// and leaves the error in the status message.
    fn reload_reference_and_year(&mut self) {
        let reference = self.store.reference_table();
        if let Ok(table) = &reference {
            self.reference = Arc::clone(table);
        }
        self.load_year(self.selected_year);
        if let Err(e) = reference {
            log::error!("{e}");
            self.status_message = Some(format!("Error: {e}"));
        }
    }

    /// Rows of the current view (empty unless rows survived filtering).
    pub fn visible_rows(&self) -> &[usize] {
        match &self.view {
            View::Ready { selection, .. } | View::Failed { selection, .. } => selection.rows(),
            View::NoData | View::Unavailable(_) => &[],
        }
    }
}
