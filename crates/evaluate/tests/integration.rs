use std::path::Path;

use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hindcast_evaluate::{
    EvaluateConfig, EvaluateError, LeadTimeBucket, ScoreWeights, Slice, evaluate, match_pairs,
    to_json,
};
use hindcast_store::{
    LocationRecords, ObservationRecord, PartitionWriter, PredictionRecord, RecordStore,
};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap()
}

fn iso(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%MZ").to_string()
}

fn obs(t: DateTime<Utc>, temperature: f64, precipitation: f64) -> ObservationRecord {
    ObservationRecord {
        time: iso(t),
        temperature,
        precipitation: Some(precipitation),
        weather_code: 1,
    }
}

fn pred(model: &str, t: DateTime<Utc>, temperature: f64, precipitation: f64) -> PredictionRecord {
    PredictionRecord {
        model: model.to_string(),
        time: iso(t),
        temperature,
        precipitation: Some(precipitation),
        weather_code: 1,
    }
}

/// Write one observation per hour `12..12+hours` and a single 00Z run where
/// each model forecasts the hours listed next to it.
fn write_location(root: &Path, location: &str, hours: i64, models: &[(&str, f64, &[i64])]) {
    let writer = PartitionWriter::new(root);
    for h in 0..hours {
        let t = base() + Duration::hours(12 + h);
        writer
            .write_observations(location, t, &[obs(t, 10.0, 0.0)])
            .unwrap();
    }
    for &(model, bias, covered) in models {
        let records: Vec<PredictionRecord> = covered
            .iter()
            .map(|&h| pred(model, base() + Duration::hours(12 + h), 10.0 + bias, 0.0))
            .collect();
        writer.append_predictions(location, base(), &records).unwrap();
    }
}

fn load_all(root: &Path, locations: &[&str]) -> Vec<LocationRecords> {
    let store = RecordStore::new(root);
    locations.iter().map(|l| store.load(l).unwrap()).collect()
}

#[test]
fn test_twelve_hour_lead_pair() {
    let dir = tempfile::tempdir().unwrap();
    let writer = PartitionWriter::new(dir.path());
    let target = base() + Duration::hours(12);
    writer
        .write_observations("zagreb", target, &[obs(target, 10.0, 0.0)])
        .unwrap();
    writer
        .append_predictions("zagreb", base(), &[pred("A", target, 12.0, 0.0)])
        .unwrap();

    let rec = RecordStore::new(dir.path()).load("zagreb").unwrap();
    let pairs = match_pairs(&rec.observations, &rec.predictions, "zagreb", &EvaluateConfig::default());

    assert_eq!(pairs.len(), 1);
    assert_relative_eq!(pairs[0].lead_hours, 12.0);
    assert_eq!(pairs[0].bucket, LeadTimeBucket::Days0To2);
    assert_relative_eq!(pairs[0].temp_err, 2.0);
    assert!(!pairs[0].rain_miss);

    let report = evaluate(&[rec], &EvaluateConfig::default()).unwrap();
    assert_eq!(report.overall.entries.len(), 1);
    assert_eq!(report.overall.entries[0].score, 0.0);
}

#[test]
fn test_negative_lead_yields_no_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let writer = PartitionWriter::new(dir.path());
    let target = base() + Duration::hours(12);
    writer
        .write_observations("zagreb", target, &[obs(target, 10.0, 0.0)])
        .unwrap();
    // Run issued a day after the hour it claims to forecast.
    writer
        .append_predictions("zagreb", base() + Duration::days(1), &[pred("A", target, 12.0, 0.0)])
        .unwrap();

    let recs = load_all(dir.path(), &["zagreb"]);
    let err = evaluate(&recs, &EvaluateConfig::default()).unwrap_err();
    assert!(matches!(err, EvaluateError::NoMatchedPairs));
}

#[test]
fn test_sparse_model_dropped_by_coverage_filter() {
    let dir = tempfile::tempdir().unwrap();
    let all: Vec<i64> = (0..10).collect();
    let half: Vec<i64> = (0..5).collect();
    write_location(dir.path(), "zagreb", 10, &[("A", 1.0, &all[..]), ("B", 0.5, &half[..])]);

    let report = evaluate(&load_all(dir.path(), &["zagreb"]), &EvaluateConfig::default()).unwrap();

    assert_eq!(report.n_matched, 15);
    assert_eq!(report.filter.models_dropped, vec!["B"]);
    assert_eq!(report.filter.n_groups_kept, 10);
    assert_eq!(report.overall.entries.len(), 1);
    assert_eq!(report.overall.entries[0].stats.model, "A");
    assert_eq!(report.overall.entries[0].stats.n, 10);
    assert_relative_eq!(report.overall.entries[0].stats.temp_rmse, 1.0, epsilon = 1e-9);
}

#[test]
fn test_lower_fraction_keeps_sparse_model_on_common_set() {
    let dir = tempfile::tempdir().unwrap();
    let all: Vec<i64> = (0..10).collect();
    let half: Vec<i64> = (0..5).collect();
    write_location(dir.path(), "zagreb", 10, &[("A", 1.0, &all[..]), ("B", 0.5, &half[..])]);

    let config = EvaluateConfig::default().with_min_fraction(0.5);
    let report = evaluate(&load_all(dir.path(), &["zagreb"]), &config).unwrap();

    let ranked: Vec<(&str, usize)> = report
        .overall
        .entries
        .iter()
        .map(|e| (e.stats.model.as_str(), e.stats.n))
        .collect();
    assert_eq!(ranked, vec![("B", 5), ("A", 5)]);
}

#[test]
fn test_disjoint_coverage_is_insufficient_common_data() {
    let dir = tempfile::tempdir().unwrap();
    write_location(
        dir.path(),
        "zagreb",
        3,
        &[("A", 1.0, &[0][..]), ("B", 1.0, &[1][..]), ("C", 1.0, &[2][..])],
    );

    let err = evaluate(&load_all(dir.path(), &["zagreb"]), &EvaluateConfig::default()).unwrap_err();
    match err {
        EvaluateError::NoCommonData { n_pairs, min_fraction } => {
            assert_eq!(n_pairs, 3);
            assert_eq!(min_fraction, 0.8);
        }
        other => panic!("expected NoCommonData, got {other:?}"),
    }
}

#[test]
fn test_multi_location_slices_and_exclusion() {
    let dir = tempfile::tempdir().unwrap();
    let hours: Vec<i64> = (0..6).collect();
    write_location(
        dir.path(),
        "zagreb",
        6,
        &[("icon", 0.5, &hours[..]), ("gfs", 2.0, &hours[..]), ("ecmwf_ifs", 0.0, &hours[..])],
    );
    write_location(
        dir.path(),
        "sibenik",
        6,
        &[("icon", 3.0, &hours[..]), ("gfs", 1.0, &hours[..]), ("ecmwf_ifs", 0.0, &hours[..])],
    );

    let recs = load_all(dir.path(), &["zagreb", "sibenik"]);
    let report = evaluate(&recs, &EvaluateConfig::default()).unwrap();

    assert_eq!(report.locations, vec!["zagreb", "sibenik"]);
    assert_eq!(report.tally.filtered, 12);
    assert!(
        report
            .rankings()
            .flat_map(|r| &r.entries)
            .all(|e| e.stats.model != "ecmwf_ifs")
    );

    assert_eq!(report.by_location.len(), 2);
    assert_eq!(report.by_location[0].slice, Slice::Location("zagreb".to_string()));
    assert_eq!(report.by_location[0].entries[0].stats.model, "icon");
    assert_eq!(report.by_location[1].entries[0].stats.model, "gfs");

    // Pooled over both locations: icon sqrt((0.25 + 9) / 2), gfs sqrt((4 + 1) / 2).
    let overall = &report.overall.entries;
    assert_eq!(overall[0].stats.model, "gfs");
    assert_relative_eq!(overall[0].stats.temp_rmse, 2.5_f64.sqrt(), epsilon = 1e-9);
    assert_relative_eq!(overall[1].stats.temp_rmse, 4.625_f64.sqrt(), epsilon = 1e-9);

    let best: Vec<String> = report.best_models().iter().map(|(slice, _)| slice.title()).collect();
    assert_eq!(best, vec!["Overall", "Lead time 0-2d", "Location zagreb", "Location sibenik"]);
}

#[test]
fn test_lead_buckets_ranked_separately() {
    let dir = tempfile::tempdir().unwrap();
    let writer = PartitionWriter::new(dir.path());
    let target = base() + Duration::days(4);
    writer
        .write_observations("zagreb", target, &[obs(target, 10.0, 1.0)])
        .unwrap();
    // 4-day run: A good, B poor. 1-day run: reversed.
    writer
        .append_predictions(
            "zagreb",
            base(),
            &[pred("A", target, 10.5, 1.0), pred("B", target, 13.0, 0.0)],
        )
        .unwrap();
    writer
        .append_predictions(
            "zagreb",
            base() + Duration::days(3),
            &[pred("A", target, 13.0, 0.0), pred("B", target, 10.5, 1.0)],
        )
        .unwrap();

    let report = evaluate(&load_all(dir.path(), &["zagreb"]), &EvaluateConfig::default()).unwrap();
    let slices: Vec<(&Slice, &str)> = report
        .by_lead_time
        .iter()
        .map(|r| (&r.slice, r.entries[0].stats.model.as_str()))
        .collect();
    assert_eq!(
        slices,
        vec![
            (&Slice::LeadTime(LeadTimeBucket::Days0To2), "B"),
            (&Slice::LeadTime(LeadTimeBucket::Days3To5), "A"),
        ]
    );
    // Both models are equally good overall.
    assert_eq!(report.overall.entries[0].score, report.overall.entries[1].score);
}

#[test]
fn test_rmse_only_weights_ignore_rain_misses() {
    let dir = tempfile::tempdir().unwrap();
    let writer = PartitionWriter::new(dir.path());
    let target = base() + Duration::hours(12);
    writer
        .write_observations("zagreb", target, &[obs(target, 10.0, 0.5)])
        .unwrap();
    // Same precipitation error magnitude, but only "dry" misses the rain.
    writer
        .append_predictions(
            "zagreb",
            base(),
            &[pred("wet", target, 11.0, 1.0), pred("dry", target, 11.0, 0.0)],
        )
        .unwrap();

    let recs = load_all(dir.path(), &["zagreb"]);
    let pooled = evaluate(&recs, &EvaluateConfig::default()).unwrap();
    assert_eq!(pooled.overall.entries[0].stats.model, "wet");
    assert!(pooled.overall.entries[1].stats.rain_miss_rate > 0.0);
    assert_relative_eq!(pooled.overall.entries[1].score, 0.40, epsilon = 1e-12);

    let config = EvaluateConfig::default().with_weights(ScoreWeights::rmse_only());
    let rmse_only = evaluate(&recs, &config).unwrap();
    assert!(rmse_only.overall.entries.iter().all(|e| e.score == 0.0));
}

#[test]
fn test_evaluation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let all: Vec<i64> = (0..8).collect();
    let most: Vec<i64> = (0..7).collect();
    write_location(
        dir.path(),
        "zagreb",
        8,
        &[("A", 1.0, &all[..]), ("B", -0.7, &most[..]), ("C", 2.2, &all[..])],
    );
    write_location(
        dir.path(),
        "veprinac",
        8,
        &[("A", -1.5, &all[..]), ("B", 0.3, &all[..]), ("C", 0.9, &most[..])],
    );

    let run = || {
        let recs = load_all(dir.path(), &["zagreb", "veprinac"]);
        to_json(&evaluate(&recs, &EvaluateConfig::default()).unwrap()).unwrap()
    };
    assert_eq!(run(), run());
}
