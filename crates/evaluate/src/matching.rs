//! Pairing predictions with the observations they forecast.

use chrono::{DateTime, Utc};
use hindcast_store::{ObservationSet, Prediction};
use serde::Serialize;
use tracing::debug;

use crate::bucket::LeadTimeBucket;
use crate::config::EvaluateConfig;

/// One prediction paired with the observation at its target hour.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPair {
    pub location: String,
    pub model: String,
    pub obs_time: DateTime<Utc>,
    pub lead_hours: f64,
    pub bucket: LeadTimeBucket,
    /// Predicted minus observed temperature.
    pub temp_err: f64,
    /// Predicted minus observed precipitation.
    pub precip_err: f64,
    /// Predicted minus observed weather code.
    pub wmo_err: f64,
    /// Prediction and observation disagree on whether it rained.
    pub rain_miss: bool,
}

/// Why each prediction was or was not matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchTally {
    /// Skipped by the model filter or the exclusion list.
    pub filtered: usize,
    /// No observation yet for the target hour.
    pub unmatured: usize,
    pub negative_lead: usize,
    pub outside_buckets: usize,
    /// Errors too small to be a real forecast.
    pub non_genuine: usize,
    pub matched: usize,
}

impl MatchTally {
    pub fn total(&self) -> usize {
        self.filtered
            + self.unmatured
            + self.negative_lead
            + self.outside_buckets
            + self.non_genuine
            + self.matched
    }
}

impl std::ops::AddAssign for MatchTally {
    fn add_assign(&mut self, other: Self) {
        self.filtered += other.filtered;
        self.unmatured += other.unmatured;
        self.negative_lead += other.negative_lead;
        self.outside_buckets += other.outside_buckets;
        self.non_genuine += other.non_genuine;
        self.matched += other.matched;
    }
}

/// Pair every eligible prediction with its observation.
///
/// Output order follows `predictions`.
pub fn match_pairs(
    observations: &ObservationSet,
    predictions: &[Prediction],
    location: &str,
    config: &EvaluateConfig,
) -> Vec<MatchedPair> {
    match_pairs_with_tally(observations, predictions, location, config).0
}

/// Like [`match_pairs`], also counting why predictions were dropped.
pub fn match_pairs_with_tally(
    observations: &ObservationSet,
    predictions: &[Prediction],
    location: &str,
    config: &EvaluateConfig,
) -> (Vec<MatchedPair>, MatchTally) {
    let mut tally = MatchTally::default();
    let mut pairs = Vec::new();
    let threshold = config.rain_threshold();
    let epsilon = config.genuine_epsilon();

    for pred in predictions {
        if !config.includes_model(&pred.model) {
            tally.filtered += 1;
            continue;
        }

        let Some(obs) = observations.get(&pred.forecast_for) else {
            tally.unmatured += 1;
            continue;
        };

        let lead_hours = (pred.forecast_for - pred.prediction_made).num_seconds() as f64 / 3600.0;
        if lead_hours < 0.0 {
            tally.negative_lead += 1;
            continue;
        }

        let Some(bucket) = LeadTimeBucket::from_lead_hours(lead_hours) else {
            tally.outside_buckets += 1;
            continue;
        };

        let temp_err = pred.temperature - obs.temperature;
        let precip_err = pred.precipitation - obs.precipitation;
        if temp_err.abs() < epsilon && precip_err.abs() < epsilon {
            tally.non_genuine += 1;
            continue;
        }

        let rain_miss = (pred.precipitation > threshold) != (obs.precipitation > threshold);
        pairs.push(MatchedPair {
            location: location.to_string(),
            model: pred.model.clone(),
            obs_time: obs.time,
            lead_hours,
            bucket,
            temp_err,
            precip_err,
            wmo_err: f64::from(pred.weather_code) - f64::from(obs.weather_code),
            rain_miss,
        });
        tally.matched += 1;
    }

    debug!(
        location,
        matched = tally.matched,
        filtered = tally.filtered,
        unmatured = tally.unmatured,
        negative_lead = tally.negative_lead,
        outside_buckets = tally.outside_buckets,
        non_genuine = tally.non_genuine,
        "predictions matched"
    );
    (pairs, tally)
}
