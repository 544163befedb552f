//! Evaluate command: rank forecast models against archived observations.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use hindcast_evaluate::{evaluate, to_json};
use hindcast_store::{LocationRecords, RecordStore};

use crate::cli::EvaluateArgs;
use crate::config::HindcastConfig;
use crate::{convert, report};

/// Run the evaluation pipeline and print the rankings.
pub fn run(args: EvaluateArgs) -> Result<()> {
    let _cmd = info_span!("evaluate").entered();

    // 1. Load project TOML
    let config = HindcastConfig::load(&args.config)?;
    let locations = convert::select_locations(&config, args.location.as_deref())?;
    let eval_cfg =
        convert::build_evaluate_config(&config, args.model.as_deref(), args.min_fraction)?;
    eval_cfg.validate().context("invalid evaluation settings")?;

    // 2. Read the record store
    let data_dir = args.data_dir.as_ref().unwrap_or(&config.data_dir);
    let store = RecordStore::new(data_dir);
    info!(path = %data_dir.display(), n_locations = locations.len(), "reading record store");

    let records: Vec<LocationRecords> = locations
        .iter()
        .map(|loc| {
            store
                .load(loc)
                .with_context(|| format!("failed to load records for {loc}"))
        })
        .collect::<Result<_>>()?;

    if records
        .iter()
        .all(|r| r.observations.is_empty() && r.predictions.is_empty())
    {
        println!(
            "No data found under {}. Run the collectors first to gather data.",
            data_dir.display()
        );
        return Ok(());
    }

    // 3. Evaluate
    let report = match evaluate(&records, &eval_cfg) {
        Ok(report) => report,
        Err(e) if e.is_insufficient_data() => {
            info!(error = %e, "not enough data to rank models");
            println!("{}", report::insufficient_data(&e));
            return Ok(());
        }
        Err(e) => return Err(e).context("evaluation failed"),
    };

    // 4. Present
    print!("{}", report::render(&report, args.row_limit()));

    if let Some(path) = &args.json {
        let json = to_json(&report).context("failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}
