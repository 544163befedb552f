//! Hindcast evaluation: match archived forecasts against later observations
//! and rank the forecasting models.

mod bucket;
mod config;
mod error;
mod fairness;
mod matching;
mod output;
mod scoring;

use std::collections::BTreeMap;

use hindcast_store::LocationRecords;
use tracing::info;

pub use bucket::LeadTimeBucket;
pub use config::{
    DEFAULT_GENUINE_EPSILON, DEFAULT_MIN_FRACTION, DEFAULT_RAIN_THRESHOLD, EvaluateConfig,
    ScoreWeights,
};
pub use error::EvaluateError;
pub use fairness::{FilterOutcome, FilterSummary, fairness_filter};
pub use matching::{MatchTally, MatchedPair, match_pairs, match_pairs_with_tally};
pub use output::{EvaluationReport, Ranking, Slice, to_json};
pub use scoring::{ModelStats, ScoredModel, add_composite_score, compute_stats};

/// Evaluate forecast accuracy across one or more locations.
///
/// Matches predictions to observations per location, restricts the pairs to
/// a common evaluation set, and ranks models overall, per lead-time bucket,
/// and per location. Each ranking is normalised on its own.
///
/// # Errors
///
/// Returns [`EvaluateError::Validation`] if `config` is invalid.
/// Returns [`EvaluateError::NoMatchedPairs`] if no prediction matched.
/// Returns [`EvaluateError::NoCommonData`] if the coverage filter left nothing.
pub fn evaluate(
    records: &[LocationRecords],
    config: &EvaluateConfig,
) -> Result<EvaluationReport, EvaluateError> {
    config.validate()?;

    // Step 1: Match
    let mut pairs = Vec::new();
    let mut tally = MatchTally::default();
    for rec in records {
        let (matched, t) =
            match_pairs_with_tally(&rec.observations, &rec.predictions, &rec.location, config);
        pairs.extend(matched);
        tally += t;
    }
    let n_matched = pairs.len();
    if pairs.is_empty() {
        return Err(EvaluateError::NoMatchedPairs);
    }

    // Step 2: Common evaluation set
    let FilterOutcome {
        pairs,
        summary: filter,
    } = fairness_filter(pairs, config.min_fraction());
    info!(
        pairs_in = filter.n_pairs_in,
        pairs_kept = filter.n_pairs_kept,
        models_in = filter.n_models_in,
        models_kept = filter.models_kept.len(),
        groups_in = filter.n_groups_in,
        groups_kept = filter.n_groups_kept,
        min_models = filter.min_models,
        min_obs = filter.min_obs,
        dropped = ?filter.models_dropped,
        "coverage filter applied"
    );
    if pairs.is_empty() {
        return Err(EvaluateError::NoCommonData {
            n_pairs: n_matched,
            min_fraction: config.min_fraction(),
        });
    }

    // Step 3: Rank each slice
    let weights = config.weights();
    let rank = |slice: Slice, subset: &[&MatchedPair]| {
        Ranking::new(
            slice,
            add_composite_score(compute_stats(subset.iter().copied()), weights),
        )
    };

    let all: Vec<&MatchedPair> = pairs.iter().collect();
    let overall = rank(Slice::Overall, &all);

    let mut by_bucket: BTreeMap<LeadTimeBucket, Vec<&MatchedPair>> = BTreeMap::new();
    for p in &pairs {
        by_bucket.entry(p.bucket).or_default().push(p);
    }
    let by_lead_time: Vec<Ranking> = by_bucket
        .into_iter()
        .map(|(bucket, subset)| rank(Slice::LeadTime(bucket), &subset))
        .collect();

    let by_location: Vec<Ranking> = records
        .iter()
        .filter_map(|rec| {
            let subset: Vec<&MatchedPair> =
                pairs.iter().filter(|p| p.location == rec.location).collect();
            (!subset.is_empty()).then(|| rank(Slice::Location(rec.location.clone()), &subset))
        })
        .collect();

    Ok(EvaluationReport {
        locations: records.iter().map(|r| r.location.clone()).collect(),
        min_fraction: config.min_fraction(),
        weights: *weights,
        n_matched,
        tally,
        filter,
        overall,
        by_lead_time,
        by_location,
    })
}
