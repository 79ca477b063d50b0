use std::path::PathBuf;

use thiserror::Error;

/// Failures the dashboard reports to the user.
///
/// Per-partition read failures are not listed here: the loader logs and
/// skips them, and only surfaces [`DashboardError::NoPartitions`] when every
/// partition of a request failed.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("no data files could be loaded for years {years:?}, quarters {quarters:?}")]
    NoPartitions { years: Vec<u16>, quarters: Vec<u8> },

    #[error("failed to load reference table {}: {cause:#}", .path.display())]
    ReferenceTable { path: PathBuf, cause: anyhow::Error },

    /// The state lookup must be many-to-one.
    #[error("reference table maps state {abbreviation:?} to {rows} rows, expected exactly one")]
    JoinCardinality { abbreviation: String, rows: usize },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
