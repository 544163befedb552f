//! Observation and prediction records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::parse_hour;

/// A ground-truth observation for one location and hour.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Hour-truncated observation time.
    pub time: DateTime<Utc>,
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    /// Precipitation in millimetres.
    pub precipitation: f64,
    /// WMO weather code.
    pub weather_code: i32,
}

/// A single model's forecast for one target hour, produced by one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Model identifier.
    pub model: String,
    /// Run time of the forecast, taken from the partition path.
    pub prediction_made: DateTime<Utc>,
    /// Hour-truncated target time.
    pub forecast_for: DateTime<Utc>,
    pub temperature: f64,
    pub precipitation: f64,
    pub weather_code: i32,
}

/// Observations for one location keyed by hour.
///
/// Inserting an hour that is already present replaces the earlier value.
pub type ObservationSet = BTreeMap<DateTime<Utc>, Observation>;

/// Everything loaded for a single location.
#[derive(Debug, Clone, Default)]
pub struct LocationRecords {
    pub location: String,
    pub observations: ObservationSet,
    pub predictions: Vec<Prediction>,
}

/// On-disk shape of an observation line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub time: String,
    pub temperature: f64,
    #[serde(default)]
    pub precipitation: Option<f64>,
    pub weather_code: i32,
}

/// On-disk shape of a prediction line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub model: String,
    pub time: String,
    pub temperature: f64,
    #[serde(default)]
    pub precipitation: Option<f64>,
    pub weather_code: i32,
}

impl ObservationRecord {
    /// Convert into an [`Observation`], or `None` if the timestamp is invalid.
    pub fn into_observation(self) -> Option<Observation> {
        Some(Observation {
            time: parse_hour(&self.time)?,
            temperature: self.temperature,
            precipitation: self.precipitation.unwrap_or(0.0),
            weather_code: self.weather_code,
        })
    }
}

impl PredictionRecord {
    /// Convert into a [`Prediction`] made at `prediction_made`, or `None` if
    /// the target timestamp is invalid.
    pub fn into_prediction(self, prediction_made: DateTime<Utc>) -> Option<Prediction> {
        Some(Prediction {
            forecast_for: parse_hour(&self.time)?,
            model: self.model,
            prediction_made,
            temperature: self.temperature,
            precipitation: self.precipitation.unwrap_or(0.0),
            weather_code: self.weather_code,
        })
    }
}
