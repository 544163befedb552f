//! Writing partitions for acquisition jobs.
//!
//! Observation partitions are replaced atomically so a concurrent reader never
//! sees a half-written hour. Forecast partitions are appended to, because
//! several models share one run file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StoreError;
use crate::partition::{PartitionKind, partition_path};
use crate::record::{ObservationRecord, PredictionRecord};

/// Writes record partitions under a data directory.
#[derive(Debug, Clone)]
pub struct PartitionWriter {
    root: PathBuf,
}

impl PartitionWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Replace the observation partition for `location` at `hour`.
    ///
    /// Returns the path written.
    pub fn write_observations(
        &self,
        location: &str,
        hour: DateTime<Utc>,
        records: &[ObservationRecord],
    ) -> Result<PathBuf, StoreError> {
        let path = partition_path(&self.root, location, PartitionKind::Observation, hour);
        let dir = ensure_parent(&path)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let tmp_path = tmp.path().to_path_buf();
        let body = encode_lines(&path, records)?;
        tmp.write_all(body.as_bytes())
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        tmp.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;

        debug!(path = %path.display(), n = records.len(), "observation partition written");
        Ok(path)
    }

    /// Append predictions from the run at `run` to the forecast partition.
    ///
    /// Returns the path written.
    pub fn append_predictions(
        &self,
        location: &str,
        run: DateTime<Utc>,
        records: &[PredictionRecord],
    ) -> Result<PathBuf, StoreError> {
        let path = partition_path(&self.root, location, PartitionKind::Forecast, run);
        ensure_parent(&path)?;

        let body = encode_lines(&path, records)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        file.write_all(body.as_bytes())
            .map_err(|e| StoreError::io(&path, e))?;

        debug!(path = %path.display(), n = records.len(), "forecast partition appended");
        Ok(path)
    }
}

fn ensure_parent(path: &Path) -> Result<PathBuf, StoreError> {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
    Ok(dir)
}

fn encode_lines<T: Serialize>(path: &Path, records: &[T]) -> Result<String, StoreError> {
    let mut body = String::new();
    for rec in records {
        let line = serde_json::to_string(rec).map_err(|e| StoreError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        body.push_str(&line);
        body.push('\n');
    }
    Ok(body)
}
