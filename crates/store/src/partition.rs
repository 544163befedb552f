//! Directory layout of the record store.
//!
//! ```text
//! <root>/<location>/current/<YYYY-MM-DD>/<HH>.jsonl    observations
//! <root>/<location>/forecast/<YYYY-MM-DD>/<HH>.jsonl   predictions, one file per run
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StoreError;
use crate::time::partition_time;

/// Subdirectory holding observation partitions.
pub const OBSERVATION_DIR: &str = "current";
/// Subdirectory holding forecast-run partitions.
pub const FORECAST_DIR: &str = "forecast";
/// Extension of partition files.
pub const PARTITION_EXT: &str = "jsonl";

/// Which half of a location's records a partition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Observation,
    Forecast,
}

impl PartitionKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            PartitionKind::Observation => OBSERVATION_DIR,
            PartitionKind::Forecast => FORECAST_DIR,
        }
    }
}

/// Path of the partition file for `location` at `run` (UTC date and hour).
pub fn partition_path(
    root: &Path,
    location: &str,
    kind: PartitionKind,
    run: DateTime<Utc>,
) -> PathBuf {
    root.join(location)
        .join(kind.dir_name())
        .join(run.format("%Y-%m-%d").to_string())
        .join(format!("{}.{PARTITION_EXT}", run.format("%H")))
}

/// List every partition file under `kind_dir` in chronological order.
///
/// Date directories are visited in sorted order and hour files within each
/// directory by numeric hour, so that later partitions come later. A missing
/// `kind_dir` yields an empty list.
pub fn list_partition_files(kind_dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut date_dirs = match read_dir_sorted(kind_dir)? {
        Some(entries) => entries,
        None => return Ok(Vec::new()),
    };
    date_dirs.retain(|p| p.is_dir());

    let mut files = Vec::new();
    for dir in date_dirs {
        let Some(mut entries) = read_dir_sorted(&dir)? else {
            continue;
        };
        entries.retain(|p| p.is_file() && p.extension().is_some_and(|e| e == PARTITION_EXT));
        entries.sort_by_key(|p| (hour_of(p).unwrap_or(u32::MAX), p.clone()));
        files.extend(entries);
    }
    Ok(files)
}

/// Run time encoded in a forecast partition path (`<YYYY-MM-DD>/<HH>.jsonl`).
///
/// Returns `None` if the directory is not a date or the stem is not an hour.
pub fn run_time_of(path: &Path) -> Option<DateTime<Utc>> {
    let date_name = path.parent()?.file_name()?.to_str()?;
    let date = NaiveDate::parse_from_str(date_name, "%Y-%m-%d").ok()?;
    partition_time(date, hour_of(path)?)
}

fn hour_of(path: &Path) -> Option<u32> {
    let hour: u32 = path.file_stem()?.to_str()?.parse().ok()?;
    (hour < 24).then_some(hour)
}

fn read_dir_sorted(dir: &Path) -> Result<Option<Vec<PathBuf>>, StoreError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(dir, e)),
    };
    let mut paths = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::io(dir, e))?;
    paths.sort();
    Ok(Some(paths))
}
