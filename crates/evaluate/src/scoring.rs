//! Pooled error statistics and the composite score.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::ScoreWeights;
use crate::matching::MatchedPair;

/// Pooled error statistics for one model within one slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStats {
    pub model: String,
    pub n: usize,
    pub temp_rmse: f64,
    pub precip_rmse: f64,
    pub wmo_rmse: f64,
    pub rain_miss_rate: f64,
}

/// Model statistics with normalised metrics and the composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredModel {
    #[serde(flatten)]
    pub stats: ModelStats,
    pub temp_norm: f64,
    pub precip_norm: f64,
    pub wmo_norm: f64,
    pub rain_miss_norm: f64,
    /// Weighted sum of the normalised metrics. Lower is better.
    pub score: f64,
    /// 1-based rank; tied scores share a rank.
    pub rank: usize,
}

#[derive(Debug, Default)]
struct ErrorAccumulator {
    temp: Vec<f64>,
    precip: Vec<f64>,
    wmo: Vec<f64>,
    rain_miss: Vec<f64>,
}

/// Compute pooled statistics per model, sorted by model name.
///
/// Each RMSE is taken over every signed error of the model in `pairs` at
/// once, never averaged over sub-groups.
pub fn compute_stats<'a>(pairs: impl IntoIterator<Item = &'a MatchedPair>) -> Vec<ModelStats> {
    let mut by_model: BTreeMap<&str, ErrorAccumulator> = BTreeMap::new();
    for p in pairs {
        let acc = by_model.entry(p.model.as_str()).or_default();
        acc.temp.push(p.temp_err);
        acc.precip.push(p.precip_err);
        acc.wmo.push(p.wmo_err);
        acc.rain_miss.push(if p.rain_miss { 1.0 } else { 0.0 });
    }

    by_model
        .into_iter()
        .map(|(model, acc)| ModelStats {
            model: model.to_string(),
            n: acc.temp.len(),
            temp_rmse: hindcast_stats::rmse(&acc.temp),
            precip_rmse: hindcast_stats::rmse(&acc.precip),
            wmo_rmse: hindcast_stats::rmse(&acc.wmo),
            rain_miss_rate: hindcast_stats::mean(&acc.rain_miss),
        })
        .collect()
}

/// Normalise each metric across `stats` and combine them into a score.
///
/// Normalisation is min-max over the models given, so scores only compare
/// models within the same call. A metric with no spread normalises to 0.0.
/// The result is sorted by ascending score, ties by model name.
pub fn add_composite_score(stats: Vec<ModelStats>, weights: &ScoreWeights) -> Vec<ScoredModel> {
    let column = |f: fn(&ModelStats) -> f64| -> Vec<f64> {
        hindcast_stats::min_max_normalize(&stats.iter().map(f).collect::<Vec<_>>())
    };
    let temp = column(|s: &ModelStats| s.temp_rmse);
    let precip = column(|s: &ModelStats| s.precip_rmse);
    let wmo = column(|s: &ModelStats| s.wmo_rmse);
    let rain = column(|s: &ModelStats| s.rain_miss_rate);

    let mut scored: Vec<ScoredModel> = stats
        .into_iter()
        .enumerate()
        .map(|(i, stats)| ScoredModel {
            stats,
            temp_norm: temp[i],
            precip_norm: precip[i],
            wmo_norm: wmo[i],
            rain_miss_norm: rain[i],
            score: weights.rain_miss * rain[i]
                + weights.temperature * temp[i]
                + weights.precipitation * precip[i]
                + weights.weather_code * wmo[i],
            rank: 0,
        })
        .collect();

    scored.sort_by(|a, b| match a.score.total_cmp(&b.score) {
        Ordering::Equal => a.stats.model.cmp(&b.stats.model),
        other => other,
    });

    // Assign ranks (handle ties)
    for i in 0..scored.len() {
        scored[i].rank = if i > 0 && (scored[i].score - scored[i - 1].score).abs() < 1e-12 {
            scored[i - 1].rank
        } else {
            i + 1
        };
    }

    scored
}
