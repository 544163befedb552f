//! Plain-text rendering of an evaluation report.

use std::fmt::Write;

use hindcast_evaluate::{EvaluateError, EvaluationReport, Ranking, ScoreWeights, Slice};

const WIDTH: usize = 80;

/// Render every ranking of `report`, each cut to `limit` rows if given.
pub fn render(report: &EvaluationReport, limit: Option<usize>) -> String {
    let mut out = String::new();
    let rule = "=".repeat(WIDTH);

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "WEATHER FORECAST ACCURACY ANALYSIS");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Locations: {}", report.locations.join(", "));
    let _ = writeln!(out, "Score weights: {}", describe_weights(&report.weights));
    let _ = writeln!(out, "Total comparisons: {}", report.n_compared());
    if !report.filter.models_dropped.is_empty() {
        let _ = writeln!(
            out,
            "Dropped for low coverage (min_fraction {}): {}",
            report.min_fraction,
            report.filter.models_dropped.join(", ")
        );
    }

    write_table(
        &mut out,
        "OVERALL RANKING (all locations, all lead times)",
        &report.overall,
        limit,
    );

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "RANKING BY LEAD TIME");
    let _ = writeln!(out, "{rule}");
    for ranking in &report.by_lead_time {
        if let Slice::LeadTime(bucket) = &ranking.slice {
            write_table(&mut out, &format!("Lead time: {bucket}"), ranking, limit);
        }
    }

    if report.by_location.len() > 1 {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "BEST MODELS BY LOCATION");
        let _ = writeln!(out, "{rule}");
        for ranking in &report.by_location {
            if let Slice::Location(name) = &ranking.slice {
                write_table(
                    &mut out,
                    &format!("Location: {}", name.to_uppercase()),
                    ranking,
                    limit,
                );
            }
        }
    }

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "SUMMARY: BEST MODELS");
    let _ = writeln!(out, "{}", "-".repeat(WIDTH));
    for (slice, best) in report.best_models() {
        let label = match slice {
            Slice::Overall => "Overall best:".to_string(),
            Slice::LeadTime(bucket) => format!("Best for {bucket}:"),
            Slice::Location(_) if report.by_location.len() < 2 => continue,
            Slice::Location(name) => format!("Best for {name}:"),
        };
        let _ = writeln!(out, "{label:<25} {}", best.stats.model);
    }

    out
}

fn write_table(out: &mut String, title: &str, ranking: &Ranking, limit: Option<usize>) {
    if ranking.entries.is_empty() {
        return;
    }
    let rule = "-".repeat(WIDTH);
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "{:<3} {:<32} {:>5} {:>8} {:>7} {:>6} {:>5} {:>7}",
        "#", "Model", "N", "RainMiss", "Precip", "Temp", "WMO", "Score"
    );
    let _ = writeln!(
        out,
        "{:<3} {:<32} {:>5} {:>8} {:>7} {:>6} {:>5} {:>7}",
        "", "", "", "rate", "RMSE", "RMSE", "RMSE", ""
    );
    let _ = writeln!(out, "{rule}");

    let n = limit.unwrap_or(ranking.entries.len());
    for entry in ranking.entries.iter().take(n) {
        let s = &entry.stats;
        let _ = writeln!(
            out,
            "{:<3} {:<32} {:>5} {:>7.1}% {:>7.2} {:>6.2} {:>5.1} {:>7.3}",
            entry.rank,
            s.model,
            s.n,
            s.rain_miss_rate * 100.0,
            s.precip_rmse,
            s.temp_rmse,
            s.wmo_rmse,
            entry.score
        );
    }
}

fn describe_weights(w: &ScoreWeights) -> String {
    format!(
        "rain miss {:.0}%, temp {:.0}%, precip {:.0}%, wmo {:.0}%",
        w.rain_miss * 100.0,
        w.temperature * 100.0,
        w.precipitation * 100.0,
        w.weather_code * 100.0
    )
}

/// Guidance printed when there is too little data to rank anything.
pub fn insufficient_data(err: &EvaluateError) -> String {
    match err {
        EvaluateError::NoMatchedPairs => "No matching forecast-observation pairs found.\n\
             This is expected if you just started collecting data.\n\
             Wait for forecasts to mature so observations exist for the predicted times."
            .to_string(),
        EvaluateError::NoCommonData {
            n_pairs,
            min_fraction,
        } => format!(
            "Insufficient common data: {n_pairs} forecast-observation pairs were matched, \
             but no observation set is shared by enough models at min_fraction {min_fraction}.\n\
             Lower --min-fraction or wait for more data to accumulate."
        ),
        other => other.to_string(),
    }
}
