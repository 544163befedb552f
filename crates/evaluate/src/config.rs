//! Evaluation configuration.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::EvaluateError;

/// Default fraction of models (and of observation groups) a group (or model)
/// must reach to survive the coverage filter.
pub const DEFAULT_MIN_FRACTION: f64 = 0.8;
/// Precipitation (mm) above which an hour counts as rainy.
pub const DEFAULT_RAIN_THRESHOLD: f64 = 0.1;
/// Errors below this on both temperature and precipitation mark a pair as
/// an echo of the observation rather than a forecast.
pub const DEFAULT_GENUINE_EPSILON: f64 = 0.01;

/// Models whose archive returns observations instead of forecasts.
const DEFAULT_EXCLUDED_MODELS: &[&str] = &["ecmwf_ifs"];

/// Composite score weights. Each set sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub rain_miss: f64,
    pub temperature: f64,
    pub precipitation: f64,
    pub weather_code: f64,
}

impl ScoreWeights {
    /// Weights for pooled raw errors including the rain-miss rate.
    pub const fn pooled() -> Self {
        Self {
            rain_miss: 0.40,
            temperature: 0.30,
            precipitation: 0.15,
            weather_code: 0.15,
        }
    }

    /// Weights that ignore rain misses and rank on RMSE only.
    pub const fn rmse_only() -> Self {
        Self {
            rain_miss: 0.0,
            temperature: 0.35,
            precipitation: 0.50,
            weather_code: 0.15,
        }
    }

    pub fn sum(&self) -> f64 {
        self.rain_miss + self.temperature + self.precipitation + self.weather_code
    }

    /// False if any weight is negative or NaN.
    pub fn is_non_negative(&self) -> bool {
        [self.rain_miss, self.temperature, self.precipitation, self.weather_code]
            .iter()
            .all(|w| *w >= 0.0)
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::pooled()
    }
}

/// Configuration for the evaluation pipeline.
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    min_fraction: f64,
    rain_threshold: f64,
    genuine_epsilon: f64,
    model_filter: Option<String>,
    excluded_models: BTreeSet<String>,
    weights: ScoreWeights,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            min_fraction: DEFAULT_MIN_FRACTION,
            rain_threshold: DEFAULT_RAIN_THRESHOLD,
            genuine_epsilon: DEFAULT_GENUINE_EPSILON,
            model_filter: None,
            excluded_models: DEFAULT_EXCLUDED_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            weights: ScoreWeights::pooled(),
        }
    }
}

impl EvaluateConfig {
    /// Set the coverage fraction used by the fairness filter.
    pub fn with_min_fraction(mut self, fraction: f64) -> Self {
        self.min_fraction = fraction;
        self
    }

    /// Set the rain/no-rain precipitation threshold (mm).
    pub fn with_rain_threshold(mut self, threshold: f64) -> Self {
        self.rain_threshold = threshold;
        self
    }

    /// Set the epsilon below which a pair is treated as non-genuine.
    pub fn with_genuine_epsilon(mut self, epsilon: f64) -> Self {
        self.genuine_epsilon = epsilon;
        self
    }

    /// Restrict evaluation to a single model, or `None` for all models.
    pub fn with_model_filter(mut self, model: Option<impl Into<String>>) -> Self {
        self.model_filter = model.map(Into::into);
        self
    }

    /// Replace the set of permanently excluded models.
    pub fn with_excluded_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Set the composite score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn min_fraction(&self) -> f64 {
        self.min_fraction
    }

    pub fn rain_threshold(&self) -> f64 {
        self.rain_threshold
    }

    pub fn genuine_epsilon(&self) -> f64 {
        self.genuine_epsilon
    }

    pub fn model_filter(&self) -> Option<&str> {
        self.model_filter.as_deref()
    }

    pub fn excluded_models(&self) -> &BTreeSet<String> {
        &self.excluded_models
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Whether predictions from `model` take part in matching.
    pub fn includes_model(&self, model: &str) -> bool {
        if self.excluded_models.contains(model) {
            return false;
        }
        self.model_filter.as_deref().is_none_or(|m| m == model)
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluateError::Validation`] listing every invalid setting.
    pub fn validate(&self) -> Result<(), EvaluateError> {
        let mut errors = Vec::new();

        if !(self.min_fraction > 0.0 && self.min_fraction <= 1.0) {
            errors.push(format!(
                "min_fraction must be in (0, 1], got {}",
                self.min_fraction
            ));
        }
        if self.rain_threshold.is_nan() || self.rain_threshold < 0.0 {
            errors.push(format!(
                "rain_threshold must be non-negative, got {}",
                self.rain_threshold
            ));
        }
        if self.genuine_epsilon.is_nan() || self.genuine_epsilon < 0.0 {
            errors.push(format!(
                "genuine_epsilon must be non-negative, got {}",
                self.genuine_epsilon
            ));
        }
        if !self.weights.is_non_negative() {
            errors.push(format!(
                "score weights must be non-negative, got {:?}",
                self.weights
            ));
        }
        if (self.weights.sum() - 1.0).abs() > 1e-9 {
            errors.push(format!(
                "score weights must sum to 1.0, got {}",
                self.weights.sum()
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EvaluateError::Validation {
                count: errors.len(),
                details: errors.join("; "),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_values() {
        let config = EvaluateConfig::default();
        assert_eq!(config.min_fraction(), 0.8);
        assert_eq!(config.rain_threshold(), 0.1);
        assert_eq!(config.genuine_epsilon(), 0.01);
        assert!(config.model_filter().is_none());
        assert!(config.excluded_models().contains("ecmwf_ifs"));
        assert_eq!(*config.weights(), ScoreWeights::pooled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = EvaluateConfig::default()
            .with_min_fraction(0.5)
            .with_rain_threshold(0.2)
            .with_genuine_epsilon(0.0)
            .with_model_filter(Some("icon_eu"))
            .with_excluded_models(Vec::<String>::new())
            .with_weights(ScoreWeights::rmse_only());

        assert_eq!(config.min_fraction(), 0.5);
        assert_eq!(config.rain_threshold(), 0.2);
        assert_eq!(config.genuine_epsilon(), 0.0);
        assert_eq!(config.model_filter(), Some("icon_eu"));
        assert!(config.excluded_models().is_empty());
        assert_eq!(*config.weights(), ScoreWeights::rmse_only());
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert_relative_eq!(ScoreWeights::pooled().sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(ScoreWeights::rmse_only().sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_includes_model() {
        let config = EvaluateConfig::default();
        assert!(config.includes_model("icon_eu"));
        assert!(!config.includes_model("ecmwf_ifs"));

        let filtered = config.with_model_filter(Some("icon_eu"));
        assert!(filtered.includes_model("icon_eu"));
        assert!(!filtered.includes_model("gfs_global"));

        // Exclusion wins over an explicit filter.
        let excluded = EvaluateConfig::default().with_model_filter(Some("ecmwf_ifs"));
        assert!(!excluded.includes_model("ecmwf_ifs"));
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        for bad in [0.0, -0.1, 1.5, f64::NAN] {
            let config = EvaluateConfig::default().with_min_fraction(bad);
            assert!(
                matches!(config.validate(), Err(EvaluateError::Validation { count: 1, .. })),
                "min_fraction {bad} should be rejected"
            );
        }
        assert!(EvaluateConfig::default().with_min_fraction(1.0).validate().is_ok());
    }

    #[test]
    fn test_validate_accumulates_errors() {
        let config = EvaluateConfig::default()
            .with_min_fraction(2.0)
            .with_rain_threshold(-1.0)
            .with_weights(ScoreWeights {
                rain_miss: 1.0,
                temperature: 1.0,
                precipitation: 0.0,
                weather_code: 0.0,
            });
        match config.validate() {
            Err(EvaluateError::Validation { count, details }) => {
                assert_eq!(count, 3);
                assert!(details.contains("min_fraction"));
                assert!(details.contains("rain_threshold"));
                assert!(details.contains("weights"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_negative_weights() {
        // Sums to 1.0, so only the sign check can catch it.
        let config = EvaluateConfig::default().with_weights(ScoreWeights {
            rain_miss: 1.5,
            temperature: -0.5,
            precipitation: 0.0,
            weather_code: 0.0,
        });
        match config.validate() {
            Err(EvaluateError::Validation { count, details }) => {
                assert_eq!(count, 1);
                assert!(details.contains("non-negative"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let nan = EvaluateConfig::default().with_weights(ScoreWeights {
            rain_miss: f64::NAN,
            ..ScoreWeights::pooled()
        });
        assert!(nan.validate().is_err());
        assert!(ScoreWeights::rmse_only().is_non_negative());
    }
}
