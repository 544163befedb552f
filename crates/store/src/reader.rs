//! Loading observations and predictions from the record store.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::partition::{self, FORECAST_DIR, OBSERVATION_DIR};
use crate::record::{
    LocationRecords, ObservationRecord, ObservationSet, Prediction, PredictionRecord,
};

/// Read-only view of a record store rooted at a data directory.
///
/// Every load builds a fresh snapshot from disk. Missing locations and
/// missing partitions yield empty results. Malformed lines are logged and
/// skipped.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    /// Create a store rooted at `root`. The directory need not exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Whether any records directory exists for `location`.
    pub fn has_location(&self, location: &str) -> bool {
        self.root.join(location).is_dir()
    }

    /// Names of all location directories under the root, sorted.
    pub fn locations(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            if entry.path().is_dir()
                && let Some(name) = entry.file_name().to_str()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load all observations for `location`, keyed by hour.
    ///
    /// Partitions are visited chronologically, so a later partition's value
    /// for an hour replaces an earlier one.
    pub fn load_observations(&self, location: &str) -> Result<ObservationSet, StoreError> {
        let dir = self.root.join(location).join(OBSERVATION_DIR);
        let mut observations = ObservationSet::new();

        for path in partition::list_partition_files(&dir)? {
            read_records::<ObservationRecord>(&path, |line, rec| {
                match rec.into_observation() {
                    Some(obs) => {
                        observations.insert(obs.time, obs);
                    }
                    None => warn!(
                        path = %path.display(),
                        line,
                        "skipping observation with invalid time"
                    ),
                }
            })?;
        }

        debug!(location, n = observations.len(), "observations loaded");
        Ok(observations)
    }

    /// Load every prediction for `location`.
    ///
    /// The run time of each prediction comes from its partition path. No
    /// de-duplication happens: the same `(model, forecast_for)` from two runs
    /// yields two predictions.
    pub fn load_predictions(&self, location: &str) -> Result<Vec<Prediction>, StoreError> {
        let dir = self.root.join(location).join(FORECAST_DIR);
        let mut predictions = Vec::new();

        for path in partition::list_partition_files(&dir)? {
            let Some(made) = partition::run_time_of(&path) else {
                warn!(path = %path.display(), "skipping forecast partition with invalid run time");
                continue;
            };
            read_records::<PredictionRecord>(&path, |line, rec| {
                match rec.into_prediction(made) {
                    Some(pred) => predictions.push(pred),
                    None => warn!(
                        path = %path.display(),
                        line,
                        "skipping prediction with invalid time"
                    ),
                }
            })?;
        }

        debug!(location, n = predictions.len(), "predictions loaded");
        Ok(predictions)
    }

    /// Load observations and predictions for `location`.
    pub fn load(&self, location: &str) -> Result<LocationRecords, StoreError> {
        let observations = self.load_observations(location)?;
        let predictions = self.load_predictions(location)?;
        info!(
            location,
            n_observations = observations.len(),
            n_predictions = predictions.len(),
            "records loaded"
        );
        Ok(LocationRecords {
            location: location.to_string(),
            observations,
            predictions,
        })
    }
}

/// Stream JSON lines from `path` into `sink`, skipping blank and malformed
/// lines. `sink` receives the 1-based line number alongside the record.
fn read_records<T: DeserializeOwned>(
    path: &Path,
    mut sink: impl FnMut(usize, T),
) -> Result<(), StoreError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    // Raw bytes: a line with invalid UTF-8 is a malformed record, not a read failure.
    for (idx, line) in BufReader::new(file).split(b'\n').enumerate() {
        let line = line.map_err(|e| StoreError::io(path, e))?;
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_slice::<T>(line) {
            Ok(rec) => sink(idx + 1, rec),
            Err(e) => warn!(
                path = %path.display(),
                line = idx + 1,
                error = %e,
                "skipping malformed record"
            ),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_is_empty() {
        let store = RecordStore::new("/nonexistent/hindcast/data");
        assert!(store.locations().unwrap().is_empty());
        assert!(!store.has_location("zagreb"));
        let records = store.load("zagreb").unwrap();
        assert!(records.observations.is_empty());
        assert!(records.predictions.is_empty());
        assert_eq!(records.location, "zagreb");
    }

    #[test]
    fn read_records_skips_blank_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("00.jsonl");
        fs::write(
            &path,
            "\n{\"time\":\"2024-01-01T00:00Z\",\"temperature\":1.0,\"weather_code\":0}\n\
             {not json}\n\
             {\"time\":\"2024-01-01T01:00Z\",\"weather_code\":0}\n\
             {\"time\":\"2024-01-01T02:00Z\",\"temperature\":2.0,\"weather_code\":0}\n",
        )
        .unwrap();

        let mut seen = Vec::new();
        read_records::<ObservationRecord>(&path, |line, rec| seen.push((line, rec.temperature)))
            .unwrap();
        assert_eq!(seen, vec![(2, 1.0), (5, 2.0)]);
    }

    #[test]
    fn locations_lists_directories_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("zagreb")).unwrap();
        fs::create_dir_all(dir.path().join("sibenik")).unwrap();
        fs::write(dir.path().join("README"), "").unwrap();

        let store = RecordStore::new(dir.path());
        assert_eq!(store.locations().unwrap(), vec!["sibenik", "zagreb"]);
        assert!(store.has_location("zagreb"));
    }
}
