//! Coverage filter that puts every ranked model on the same observations.
//!
//! A group is one `(location, obs_time, bucket)` cell. The filter narrows the
//! matched pairs in three stages:
//!
//! 1. keep groups forecast by at least `floor(n_models * min_fraction)` models
//! 2. keep models present in at least `floor(n_groups * min_fraction)` of those
//! 3. keep only groups that every remaining model forecasts
//!
//! After stage 3 the model x group matrix is rectangular.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bucket::LeadTimeBucket;
use crate::matching::MatchedPair;

type GroupKey<'a> = (&'a str, DateTime<Utc>, LeadTimeBucket);

fn group_key(pair: &MatchedPair) -> GroupKey<'_> {
    (pair.location.as_str(), pair.obs_time, pair.bucket)
}

/// What the filter kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSummary {
    pub min_fraction: f64,
    pub n_pairs_in: usize,
    pub n_pairs_kept: usize,
    pub n_models_in: usize,
    pub n_groups_in: usize,
    /// Stage 1 threshold on models per group.
    pub min_models: usize,
    /// Groups surviving stage 1.
    pub n_groups_covered: usize,
    /// Stage 2 threshold on groups per model.
    pub min_obs: usize,
    pub models_kept: Vec<String>,
    pub models_dropped: Vec<String>,
    /// Groups surviving stage 3.
    pub n_groups_kept: usize,
}

/// Pairs that survived the filter, in input order, plus a summary.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub pairs: Vec<MatchedPair>,
    pub summary: FilterSummary,
}

impl FilterOutcome {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// `max(1, floor(count * fraction))`
fn coverage_threshold(count: usize, fraction: f64) -> usize {
    ((count as f64 * fraction).floor() as usize).max(1)
}

/// Restrict `pairs` to groups and models with comparable coverage.
///
/// Returns an empty outcome when stage 1 or stage 2 leaves nothing.
pub fn fairness_filter(pairs: Vec<MatchedPair>, min_fraction: f64) -> FilterOutcome {
    let mut summary = FilterSummary {
        min_fraction,
        n_pairs_in: pairs.len(),
        ..FilterSummary::default()
    };

    let keep: Vec<bool> = {
        let mut groups: BTreeMap<GroupKey<'_>, BTreeSet<&str>> = BTreeMap::new();
        for p in &pairs {
            groups.entry(group_key(p)).or_default().insert(p.model.as_str());
        }
        let all_models: BTreeSet<&str> = pairs.iter().map(|p| p.model.as_str()).collect();
        summary.n_models_in = all_models.len();
        summary.n_groups_in = groups.len();

        // Stage 1
        summary.min_models = coverage_threshold(all_models.len(), min_fraction);
        let covered: BTreeMap<GroupKey<'_>, BTreeSet<&str>> = groups
            .into_iter()
            .filter(|(_, models)| models.len() >= summary.min_models)
            .collect();
        summary.n_groups_covered = covered.len();

        // Stage 2
        summary.min_obs = coverage_threshold(covered.len(), min_fraction);
        let mut appearances: BTreeMap<&str, usize> = BTreeMap::new();
        for models in covered.values() {
            for &m in models {
                *appearances.entry(m).or_default() += 1;
            }
        }
        let kept_models: BTreeSet<&str> = appearances
            .iter()
            .filter(|&(_, &n)| n >= summary.min_obs)
            .map(|(&m, _)| m)
            .collect();

        // Stage 3
        let kept_groups: BTreeSet<GroupKey<'_>> = if kept_models.is_empty() {
            BTreeSet::new()
        } else {
            covered
                .iter()
                .filter(|(_, models)| {
                    models.iter().filter(|m| kept_models.contains(*m)).count() == kept_models.len()
                })
                .map(|(&key, _)| key)
                .collect()
        };
        summary.n_groups_kept = kept_groups.len();

        summary.models_kept = kept_models.iter().map(|m| m.to_string()).collect();
        summary.models_dropped = all_models
            .difference(&kept_models)
            .map(|m| m.to_string())
            .collect();

        pairs
            .iter()
            .map(|p| kept_models.contains(p.model.as_str()) && kept_groups.contains(&group_key(p)))
            .collect()
    };

    let kept: Vec<MatchedPair> = pairs
        .into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect();
    summary.n_pairs_kept = kept.len();

    FilterOutcome {
        pairs: kept,
        summary,
    }
}
