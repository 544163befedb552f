//! Ranking tables and the JSON report.

use crate::bucket::LeadTimeBucket;
use crate::config::ScoreWeights;
use crate::error::EvaluateError;
use crate::fairness::FilterSummary;
use crate::matching::MatchTally;
use crate::scoring::ScoredModel;
use serde::Serialize;

/// Subset of the filtered pairs a ranking was computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum Slice {
    Overall,
    LeadTime(LeadTimeBucket),
    Location(String),
}

impl Slice {
    pub fn title(&self) -> String {
        match self {
            Slice::Overall => "Overall".to_string(),
            Slice::LeadTime(bucket) => format!("Lead time {bucket}"),
            Slice::Location(name) => format!("Location {name}"),
        }
    }
}

/// Models ranked within one slice, best (lowest score) first.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub slice: Slice,
    pub title: String,
    pub entries: Vec<ScoredModel>,
}

impl Ranking {
    pub fn new(slice: Slice, entries: Vec<ScoredModel>) -> Self {
        Self {
            title: slice.title(),
            slice,
            entries,
        }
    }

    pub fn best(&self) -> Option<&ScoredModel> {
        self.entries.first()
    }
}

/// Everything one evaluation run produced.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Locations evaluated, in input order.
    pub locations: Vec<String>,
    pub min_fraction: f64,
    pub weights: ScoreWeights,
    /// Pairs produced by matching, before the coverage filter.
    pub n_matched: usize,
    pub tally: MatchTally,
    pub filter: FilterSummary,
    pub overall: Ranking,
    pub by_lead_time: Vec<Ranking>,
    pub by_location: Vec<Ranking>,
}

impl EvaluationReport {
    /// All slices in display order.
    pub fn rankings(&self) -> impl Iterator<Item = &Ranking> {
        std::iter::once(&self.overall)
            .chain(&self.by_lead_time)
            .chain(&self.by_location)
    }

    /// `(slice, best model)` for every non-empty slice, in display order.
    pub fn best_models(&self) -> Vec<(&Slice, &ScoredModel)> {
        self.rankings()
            .filter_map(|r| r.best().map(|best| (&r.slice, best)))
            .collect()
    }

    /// Number of pairs the rankings were computed from.
    pub fn n_compared(&self) -> usize {
        self.filter.n_pairs_kept
    }
}

/// Serialize an evaluation report to a pretty-printed JSON string.
pub fn to_json(report: &EvaluationReport) -> Result<String, EvaluateError> {
    serde_json::to_string_pretty(report).map_err(|e| EvaluateError::Serialization {
        reason: e.to_string(),
    })
}
