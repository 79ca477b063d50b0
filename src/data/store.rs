use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::cache::LoadCache;
use super::loader::load_dataset;
use super::model::{Dataset, LoadKey};
use super::reference::ReferenceTable;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};

/// Cached access to the dataset partitions and the reference table.
///
/// Owned by the application state; every UI interaction goes through it, so
/// repeated requests for the same years and quarters never touch the disk
/// twice.
pub struct DataStore {
    data_dir: PathBuf,
    /// Reference table as configured; relative paths follow `data_dir`.
    reference_table: PathBuf,
    datasets: LoadCache<LoadKey, Dataset>,
    reference: LoadCache<PathBuf, ReferenceTable>,
}

impl DataStore {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            reference_table: config.reference_table.clone(),
            datasets: LoadCache::new(),
            reference: LoadCache::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where the reference table is read from for the current data directory.
    pub fn reference_path(&self) -> PathBuf {
        if self.reference_table.is_absolute() {
            self.reference_table.clone()
        } else {
            self.data_dir.join(&self.reference_table)
        }
    }

    /// Combined dataset for `key`, loaded on first request.
    pub fn dataset(&self, key: &LoadKey) -> Result<Arc<Dataset>> {
        self.datasets
            .get_or_try_load(key, |key| load_dataset(&self.data_dir, key))
    }

    /// The state lookup table, loaded on first request.
    pub fn reference_table(&self) -> Result<Arc<ReferenceTable>> {
        self.reference
            .get_or_try_load(&self.reference_path(), |path| {
                let table = ReferenceTable::load(path).map_err(|cause| {
                    DashboardError::ReferenceTable {
                        path: path.clone(),
                        cause,
                    }
                })?;
                log::info!("Loaded reference table with {} states", table.len());
                Ok(table)
            })
    }

    /// Point the store at another data directory. Cached datasets and a
    /// reference table resolved inside the old directory are dropped.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        self.data_dir = dir;
        self.datasets.clear();
        self.reference.clear();
    }

    /// Drop every cached dataset and the reference table.
    pub fn clear(&self) {
        self.datasets.clear();
        self.reference.clear();
    }

    /// Number of times partitions were actually read from disk.
    pub fn dataset_loads(&self) -> usize {
        self.datasets.computations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Partition;
    use crate::data::test_support::{eligible, region, write_partition, write_reference};

    fn config(dir: &Path) -> DashboardConfig {
        DashboardConfig {
            data_dir: dir.to_path_buf(),
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn second_identical_request_is_a_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![eligible("Engineer", "Acme", "Austin", "TX", 90_000.0); 3];
        write_partition(dir.path(), Partition::new(2024, 1), &records, None);
        write_partition(dir.path(), Partition::new(2024, 2), &records, None);

        let store = DataStore::new(&config(dir.path()));
        let first = store.dataset(&LoadKey::new([2024], [1, 2])).unwrap();

        // Same content under a differently ordered request; the files are
        // gone, so a reload would fail.
        std::fs::remove_file(dir.path().join(Partition::new(2024, 1).file_name())).unwrap();
        let second = store.dataset(&LoadKey::new([2024], [2, 1])).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 6);
        assert_eq!(store.dataset_loads(), 1);

        store.clear();
        let third = store.dataset(&LoadKey::new([2024], [1, 2])).unwrap();
        assert_eq!(third.len(), 3);
        assert_eq!(store.dataset_loads(), 2);
    }

    #[test]
    fn failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(&config(dir.path()));
        let key = LoadKey::new([2023], [1]);

        assert!(matches!(
            store.dataset(&key),
            Err(DashboardError::NoPartitions { .. })
        ));

        let records = vec![eligible("Analyst", "Acme", "Boston", "MA", 80_000.0)];
        write_partition(dir.path(), Partition::new(2023, 1), &records, None);
        assert_eq!(store.dataset(&key).unwrap().len(), 1);
    }

    #[test]
    fn switching_data_dir_drops_datasets() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let one = vec![eligible("Engineer", "Acme", "Austin", "TX", 90_000.0)];
        write_partition(first.path(), Partition::new(2024, 1), &one, None);
        write_partition(second.path(), Partition::new(2024, 1), &[one.clone(), one].concat(), None);

        let mut store = DataStore::new(&config(first.path()));
        let key = LoadKey::new([2024], [1]);
        assert_eq!(store.dataset(&key).unwrap().len(), 1);

        store.set_data_dir(second.path().to_path_buf());
        assert_eq!(store.data_dir(), second.path());
        assert_eq!(store.dataset(&key).unwrap().len(), 2);
    }

    #[test]
    fn reference_table_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(&config(dir.path()));

        let err = store.reference_table().unwrap_err();
        assert!(err.to_string().contains("FIPS.csv"));

        write_reference(&dir.path().join("FIPS.csv"), &[region("Texas", "TX", 48)]);
        let table = store.reference_table().unwrap();
        assert_eq!(table.len(), 1);
        assert!(Arc::ptr_eq(&table, &store.reference_table().unwrap()));
    }

    #[test]
    fn switching_data_dir_reads_its_reference_table() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_reference(&first.path().join("FIPS.csv"), &[region("Old Texas", "TX", 48)]);
        write_reference(&second.path().join("FIPS.csv"), &[region("New Texas", "TX", 48)]);

        let mut store = DataStore::new(&config(first.path()));
        assert_eq!(store.reference_table().unwrap().rows[0].name, "Old Texas");

        store.set_data_dir(second.path().to_path_buf());
        assert_eq!(store.reference_path(), second.path().join("FIPS.csv"));
        assert_eq!(store.reference_table().unwrap().rows[0].name, "New Texas");
    }

    #[test]
    fn absolute_reference_table_ignores_data_dir() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        let path = shared.path().join("states.csv");
        write_reference(&path, &[region("Texas", "TX", 48)]);

        let mut store = DataStore::new(&DashboardConfig {
            reference_table: path.clone(),
            ..config(first.path())
        });
        store.set_data_dir(second.path().to_path_buf());
        assert_eq!(store.reference_path(), path);
        assert_eq!(store.reference_table().unwrap().len(), 1);
    }
}
