use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LCA_DASHBOARD_CONFIG";
/// Environment variable overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "LCA_DATA_DIR";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "lca_dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Runtime settings. Every field is optional in the JSON file.
///
/// ```json
/// {
///   "data_dir": "data",
///   "reference_table": "FIPS.csv",
///   "years": [2024, 2023, 2022],
///   "quarters": [1, 2, 3, 4],
///   "top_employers": 20
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding the partition files and the reference table.
    pub data_dir: PathBuf,
    /// State lookup CSV, resolved against `data_dir` when relative.
    pub reference_table: PathBuf,
    /// Year options offered in the selector; the first is the default.
    pub years: Vec<u16>,
    /// Quarters loaded for the selected year.
    pub quarters: Vec<u8>,
    /// Number of employers kept in the bar chart.
    pub top_employers: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            reference_table: PathBuf::from("FIPS.csv"),
            years: vec![2024, 2023, 2022],
            quarters: vec![1, 2, 3, 4],
            top_employers: 20,
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration from the environment.
    ///
    /// `LCA_DASHBOARD_CONFIG` names a JSON file that must exist; otherwise
    /// `lca_dashboard.json` is read if present, else defaults are used.
    /// `LCA_DATA_DIR` overrides the data directory in every case.
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Some(dir) = env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.years.is_empty() {
            bail!("config must list at least one year");
        }
        if self.quarters.is_empty() {
            bail!("config must list at least one quarter");
        }
        if let Some(q) = self.quarters.iter().find(|q| !(1..=4).contains(*q)) {
            bail!("quarter {q} is out of range 1..=4");
        }
        if self.top_employers == 0 {
            bail!("top_employers must be greater than zero");
        }
        Ok(())
    }

    /// Year selected at startup.
    pub fn default_year(&self) -> u16 {
        self.years.first().copied().unwrap_or(2024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DashboardConfig::from_json(r#"{ "data_dir": "/srv/lca", "years": [2023] }"#)
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/lca"));
        assert_eq!(config.years, vec![2023]);
        assert_eq!(config.quarters, vec![1, 2, 3, 4]);
        assert_eq!(config.top_employers, 20);
        assert_eq!(config.default_year(), 2023);
        assert_eq!(config.reference_table, PathBuf::from("FIPS.csv"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(DashboardConfig::from_json(r#"{ "years": [] }"#).is_err());
        assert!(DashboardConfig::from_json(r#"{ "quarters": [1, 5] }"#).is_err());
        assert!(DashboardConfig::from_json(r#"{ "top_employers": 0 }"#).is_err());
        assert!(DashboardConfig::from_json("not json").is_err());
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "reference_table": "/abs/states.csv", "top_employers": 5 }"#)
            .unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.top_employers, 5);
        assert_eq!(config.reference_table, PathBuf::from("/abs/states.csv"));

        assert!(DashboardConfig::from_file(&dir.path().join("missing.json")).is_err());
    }
}
