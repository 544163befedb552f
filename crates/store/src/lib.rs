//! # hindcast-store
//!
//! Read archived weather observations and model forecasts from a directory of
//! hourly JSONL partitions. Every load produces an immutable snapshot; bad
//! lines are skipped with a warning rather than failing the load.

mod error;
mod partition;
mod reader;
mod record;
mod time;
mod writer;

pub use error::StoreError;
pub use partition::{FORECAST_DIR, OBSERVATION_DIR, PartitionKind, partition_path};
pub use reader::RecordStore;
pub use record::{
    LocationRecords, Observation, ObservationRecord, ObservationSet, Prediction, PredictionRecord,
};
pub use time::{parse_hour, parse_time, truncate_to_hour};
pub use writer::PartitionWriter;
