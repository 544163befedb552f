use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Hindcast forecast-accuracy evaluator.
#[derive(Parser)]
#[command(
    name = "hindcast",
    version,
    about = "Rank weather forecast models against later observations"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Match archived forecasts to observations and rank the models.
    Evaluate(EvaluateArgs),
    /// List configured locations and whether records exist for them.
    Locations(LocationsArgs),
}

/// Arguments for the `evaluate` subcommand.
#[derive(clap::Args)]
pub struct EvaluateArgs {
    /// Path to TOML configuration file. Defaults apply if it does not exist.
    #[arg(short, long, default_value = "hindcast.toml")]
    pub config: PathBuf,

    /// Override the record store directory from config.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Evaluate a single configured location.
    #[arg(short, long)]
    pub location: Option<String>,

    /// Evaluate a single model.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Override the coverage fraction in (0, 1].
    #[arg(long)]
    pub min_fraction: Option<f64>,

    /// Show the top N models of each ranking.
    #[arg(short, long, default_value_t = 10, conflicts_with = "all")]
    pub top: usize,

    /// Show every model of each ranking.
    #[arg(short, long)]
    pub all: bool,

    /// Also write the full report as JSON.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

impl EvaluateArgs {
    /// Row limit per ranking table, `None` for all rows.
    pub fn row_limit(&self) -> Option<usize> {
        (!self.all).then_some(self.top)
    }
}

/// Arguments for the `locations` subcommand.
#[derive(clap::Args)]
pub struct LocationsArgs {
    /// Path to TOML configuration file. Defaults apply if it does not exist.
    #[arg(short, long, default_value = "hindcast.toml")]
    pub config: PathBuf,

    /// Override the record store directory from config.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}
