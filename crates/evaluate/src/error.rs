//! Evaluation error types.

/// Errors that can occur during evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    /// One or more validation checks failed.
    #[error("{count} validation error(s): {details}")]
    Validation { count: usize, details: String },

    /// No prediction could be paired with an observation.
    #[error(
        "no matching forecast-observation pairs found; \
         forecasts must mature before observations exist for their target times"
    )]
    NoMatchedPairs,

    /// Pairs exist but no observation set is shared widely enough by the models.
    #[error(
        "insufficient common data: none of {n_pairs} matched pairs survive the coverage \
         filter at min_fraction {min_fraction}; lower the fraction or wait for more data"
    )]
    NoCommonData { n_pairs: usize, min_fraction: f64 },

    /// JSON serialization failed.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl EvaluateError {
    /// Whether the error reflects too little data rather than a fault.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            EvaluateError::NoMatchedPairs | EvaluateError::NoCommonData { .. }
        )
    }
}
