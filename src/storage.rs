//! Per-period storage access
//!
//! The alignment algorithm only needs two read operations against storage:
//! the labeled session vectors of a period and the cluster count K used when
//! the labels were produced. [`PeriodStore`] is that seam; the clustering
//! step that produced the labels lives entirely behind it.

use crate::error::AnalysisError;
use crate::types::{LabeledSession, PeriodId, PeriodRecord};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Read access to clustered per-period session data
pub trait PeriodStore {
    /// All session vectors of a period with their local cluster labels
    fn session_vectors_with_labels(
        &self,
        period: &PeriodId,
    ) -> Result<Vec<LabeledSession>, AnalysisError>;

    /// The cluster count K used when the period's labels were produced
    fn cluster_count(&self, period: &PeriodId) -> Result<usize, AnalysisError>;
}

/// Map-backed store for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct InMemoryPeriodStore {
    records: BTreeMap<PeriodId, PeriodRecord>,
}

impl InMemoryPeriodStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one period's record
    pub fn insert(&mut self, period: PeriodId, record: PeriodRecord) {
        self.records.insert(period, record);
    }

    /// Period identifiers currently held, in sorted order
    pub fn periods(&self) -> Vec<PeriodId> {
        self.records.keys().cloned().collect()
    }

    fn get(&self, period: &PeriodId) -> Result<&PeriodRecord, AnalysisError> {
        self.records
            .get(period)
            .ok_or_else(|| AnalysisError::UnknownPeriod(period.to_string()))
    }
}

impl PeriodStore for InMemoryPeriodStore {
    fn session_vectors_with_labels(
        &self,
        period: &PeriodId,
    ) -> Result<Vec<LabeledSession>, AnalysisError> {
        Ok(self.get(period)?.sessions.clone())
    }

    fn cluster_count(&self, period: &PeriodId) -> Result<usize, AnalysisError> {
        Ok(self.get(period)?.cluster_count)
    }
}

/// Directory-backed store: one `<period>.json` file per period, each holding
/// a serialized [`PeriodRecord`].
///
/// File stems double as period identifiers, so a directory of day-named
/// files (`20180715.json`, `20180716.json`, ...) enumerates in chronological
/// order when sorted.
#[derive(Debug, Clone)]
pub struct JsonDirectoryStore {
    root: PathBuf,
}

impl JsonDirectoryStore {
    /// Create a store over the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the record file for a period
    pub fn record_path(&self, period: &PeriodId) -> PathBuf {
        self.root.join(format!("{period}.json"))
    }

    /// Enumerate the periods present in the directory, sorted
    /// lexicographically (chronological order for day-named files).
    pub fn discover_periods(&self) -> Result<Vec<PeriodId>, AnalysisError> {
        let mut periods = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                periods.push(PeriodId::from(stem));
            }
        }
        periods.sort();
        Ok(periods)
    }

    fn load_record(&self, period: &PeriodId) -> Result<PeriodRecord, AnalysisError> {
        let path = self.record_path(period);
        if !path.exists() {
            return Err(AnalysisError::UnknownPeriod(period.to_string()));
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl PeriodStore for JsonDirectoryStore {
    fn session_vectors_with_labels(
        &self,
        period: &PeriodId,
    ) -> Result<Vec<LabeledSession>, AnalysisError> {
        Ok(self.load_record(period)?.sessions)
    }

    fn cluster_count(&self, period: &PeriodId) -> Result<usize, AnalysisError> {
        Ok(self.load_record(period)?.cluster_count)
    }
}

/// Write one period's record into a store directory (test and tooling
/// helper; the pipeline itself never writes period data).
pub fn write_period_record(
    root: &Path,
    period: &PeriodId,
    record: &PeriodRecord,
) -> Result<(), AnalysisError> {
    fs::create_dir_all(root)?;
    let json = serde_json::to_string_pretty(record)?;
    fs::write(root.join(format!("{period}.json")), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PeriodRecord {
        PeriodRecord {
            cluster_count: 2,
            sessions: vec![
                LabeledSession {
                    vector: vec![1.0, 1.0],
                    label: 0,
                },
                LabeledSession {
                    vector: vec![5.0, 5.0],
                    label: 1,
                },
            ],
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("skipdrift-{name}-{}", uuid::Uuid::new_v4()));
        dir
    }

    #[test]
    fn test_in_memory_store_round_trip() {
        let mut store = InMemoryPeriodStore::new();
        store.insert("20180715".into(), sample_record());

        let period: PeriodId = "20180715".into();
        assert_eq!(store.cluster_count(&period).unwrap(), 2);
        let sessions = store.session_vectors_with_labels(&period).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].label, 1);
    }

    #[test]
    fn test_in_memory_store_unknown_period() {
        let store = InMemoryPeriodStore::new();
        let err = store.cluster_count(&"20180715".into()).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownPeriod(_)));
    }

    #[test]
    fn test_directory_store_reads_written_record() {
        let root = scratch_dir("dir-store");
        let period: PeriodId = "20180715".into();
        write_period_record(&root, &period, &sample_record()).unwrap();

        let store = JsonDirectoryStore::new(&root);
        assert_eq!(store.cluster_count(&period).unwrap(), 2);
        let sessions = store.session_vectors_with_labels(&period).unwrap();
        assert_eq!(sessions[0].vector, vec![1.0, 1.0]);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_directory_store_discovery_is_sorted() {
        let root = scratch_dir("discovery");
        // Written out of order on purpose
        for day in ["20180717", "20180715", "20180716"] {
            write_period_record(&root, &day.into(), &sample_record()).unwrap();
        }
        // Non-record files are ignored
        fs::write(root.join("notes.txt"), "ignore me").unwrap();

        let store = JsonDirectoryStore::new(&root);
        let periods = store.discover_periods().unwrap();
        assert_eq!(
            periods,
            vec![
                PeriodId::from("20180715"),
                PeriodId::from("20180716"),
                PeriodId::from("20180717"),
            ]
        );

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_directory_store_missing_period() {
        let root = scratch_dir("missing");
        fs::create_dir_all(&root).unwrap();

        let store = JsonDirectoryStore::new(&root);
        let err = store.cluster_count(&"20180720".into()).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownPeriod(_)));

        fs::remove_dir_all(&root).unwrap();
    }
}
