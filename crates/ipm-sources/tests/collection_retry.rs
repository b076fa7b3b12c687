use std::time::Duration;

use chrono::NaiveDateTime;
use ipm_core::Backoff;
use ipm_sources::{
    InMemoryHistorian, RetryPolicy, SourceError, SourceUnits, TimeWindow, WellStatus, WellTags,
    collect_well_inputs,
};

fn window() -> TimeWindow {
    let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
    TimeWindow::new(at("2024-03-01 06:00"), at("2024-03-01 18:00")).unwrap()
}

fn instant_policy(retries: usize) -> RetryPolicy {
    RetryPolicy {
        retries,
        backoff: Backoff::new(Duration::ZERO, 10, Duration::ZERO),
    }
}

fn wells() -> Vec<WellTags> {
    let yaml = r#"
- well: W1
  completion: W1-C1
  status: W1.STATUS
  whp: W1.WHP
- well: W2
  completion: W2-C1
  status: W2.STATUS
  whp: W2.WHP
"#;
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn collection_survives_short_historian_outage() {
    let historian = InMemoryHistorian::new()
        .with_series("W1.STATUS", vec![0.0])
        .with_series("W2.STATUS", vec![1.0])
        .with_average("W1.WHP", 510.0)
        .with_average("W2.WHP", 480.0);
    historian.fail_next(2);

    let wells = wells();
    let records = instant_policy(3)
        .run(|| collect_well_inputs(&historian, &wells, &window(), &SourceUnits::default()))
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, WellStatus::Flowing);
    assert_eq!(records[0].whp, Some(510.0));
    assert_eq!(records[1].status, WellStatus::ShutIn);
}

#[test]
fn exhausted_retries_surface_the_outage() {
    let historian = InMemoryHistorian::new().with_series("W1.STATUS", vec![0.0]);
    historian.fail_next(10);

    let wells = wells();
    let err = instant_policy(3)
        .run(|| collect_well_inputs(&historian, &wells, &window(), &SourceUnits::default()))
        .unwrap_err();
    assert!(matches!(err, SourceError::Unavailable { .. }));
}

#[test]
fn historian_fixture_round_trips_through_json() {
    let historian = InMemoryHistorian::new()
        .with_average("W1.WHP", 510.0)
        .with_series("W1.STATUS", vec![0.0, 0.0]);
    let text = serde_json::to_string(&historian).unwrap();
    let back: InMemoryHistorian = serde_json::from_str(&text).unwrap();
    assert_eq!(back, historian);
}
