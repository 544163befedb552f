//! Pure conversion functions: TOML config structs + CLI overrides -> crate API config types.

use anyhow::{Result, bail};

use hindcast_evaluate::{EvaluateConfig, ScoreWeights};

use crate::config::HindcastConfig;

/// Parses a weight set name into the corresponding [`ScoreWeights`].
pub fn parse_weights(s: &str) -> Result<ScoreWeights> {
    match s.to_lowercase().as_str() {
        "pooled" => Ok(ScoreWeights::pooled()),
        "rmse_only" | "rmse-only" => Ok(ScoreWeights::rmse_only()),
        other => bail!("unknown score weights: {other:?} (expected \"pooled\" or \"rmse_only\")"),
    }
}

/// Builds an [`EvaluateConfig`] from the TOML configuration and CLI overrides.
///
/// Range checks are left to [`EvaluateConfig::validate`].
pub fn build_evaluate_config(
    config: &HindcastConfig,
    model: Option<&str>,
    min_fraction: Option<f64>,
) -> Result<EvaluateConfig> {
    let eval = &config.evaluate;
    Ok(EvaluateConfig::default()
        .with_min_fraction(min_fraction.unwrap_or(eval.min_fraction))
        .with_rain_threshold(eval.rain_threshold)
        .with_genuine_epsilon(eval.genuine_epsilon)
        .with_model_filter(model)
        .with_excluded_models(&config.excluded_models)
        .with_weights(parse_weights(&eval.weights)?))
}

/// Resolves the locations to evaluate, sorted by name regardless of the order
/// they appear in the configuration file.
///
/// A requested location that is not configured is an error.
pub fn select_locations(config: &HindcastConfig, requested: Option<&str>) -> Result<Vec<String>> {
    match requested {
        Some(name) if config.locations.contains_key(name) => Ok(vec![name.to_string()]),
        Some(name) => {
            let known: Vec<&str> = config.locations.keys().map(String::as_str).collect();
            bail!(
                "unknown location: {name:?} (configured: {})",
                known.join(", ")
            )
        }
        None => Ok(config.locations.keys().cloned().collect()),
    }
}
