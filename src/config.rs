use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Top-level Hindcast configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HindcastConfig {
    /// Root of the record store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Models never evaluated.
    #[serde(default = "default_excluded_models")]
    pub excluded_models: Vec<String>,

    /// Named locations. Names double as record store directory names.
    #[serde(default = "default_locations")]
    pub locations: BTreeMap<String, LocationToml>,

    /// Evaluate settings.
    #[serde(default)]
    pub evaluate: EvaluateToml,
}

impl Default for HindcastConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            excluded_models: default_excluded_models(),
            locations: default_locations(),
            evaluate: EvaluateToml::default(),
        }
    }
}

impl HindcastConfig {
    /// Read `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read config file: {}", path.display()));
            }
        };
        toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationToml {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluateToml {
    #[serde(default = "default_min_fraction")]
    pub min_fraction: f64,
    #[serde(default = "default_rain_threshold")]
    pub rain_threshold: f64,
    #[serde(default = "default_genuine_epsilon")]
    pub genuine_epsilon: f64,
    /// `"pooled"` or `"rmse_only"`.
    #[serde(default = "default_weights")]
    pub weights: String,
}

impl Default for EvaluateToml {
    fn default() -> Self {
        Self {
            min_fraction: default_min_fraction(),
            rain_threshold: default_rain_threshold(),
            genuine_epsilon: default_genuine_epsilon(),
            weights: default_weights(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_excluded_models() -> Vec<String> {
    vec!["ecmwf_ifs".to_string()]
}
fn default_locations() -> BTreeMap<String, LocationToml> {
    [
        ("sibenik", 43.74, 15.9),
        ("zagreb", 45.82, 15.98),
        ("veprinac", 45.34, 14.28),
    ]
    .into_iter()
    .map(|(name, latitude, longitude)| {
        (
            name.to_string(),
            LocationToml {
                latitude,
                longitude,
            },
        )
    })
    .collect()
}
fn default_min_fraction() -> f64 {
    hindcast_evaluate::DEFAULT_MIN_FRACTION
}
fn default_rain_threshold() -> f64 {
    hindcast_evaluate::DEFAULT_RAIN_THRESHOLD
}
fn default_genuine_epsilon() -> f64 {
    hindcast_evaluate::DEFAULT_GENUINE_EPSILON
}
fn default_weights() -> String {
    "pooled".to_string()
}
