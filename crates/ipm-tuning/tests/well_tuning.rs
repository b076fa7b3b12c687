use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use ipm_core::{Backoff, CoefficientPair};
use ipm_oracle::paths::prosper;
use ipm_oracle::{ScriptedOracle, Session, SurrogateField, SurrogateWell};
use ipm_solver::WELL_ACCEPTANCE;
use ipm_sources::WellTestRecord;
use ipm_tuning::{NeutralReason, TuningError, WellJob, WellOutcome, WellTuner, WellTuningSettings};

const CORRELATION: &str = "Petroleum Experts 2";

fn field(reference: CoefficientPair) -> SurrogateField {
    SurrogateField {
        correlation: CORRELATION.into(),
        wells: vec![SurrogateWell {
            model_file: "F_1_A12.Out".into(),
            network_name: "A_12".into(),
            joint: "M1".into(),
            productivity_index: 1.0,
            reservoir_pressure: 3000.0,
            gravity_drop: 1500.0,
            friction_factor: 0.25,
            reference,
            u_value: 8.0,
            liquid_rate: 550.0,
            watercut: 15.0,
            gor: 480.0,
        }],
        flowlines: vec![],
    }
}

fn session(reference: CoefficientPair) -> Session<ScriptedOracle> {
    let mut s = Session::new(field(reference).into_oracle())
        .with_poll_schedule(Backoff::new(Duration::ZERO, 2, Duration::ZERO));
    s.connect().unwrap();
    s
}

fn job(bhp: f64) -> WellJob {
    WellJob {
        well: "A12".into(),
        model: PathBuf::from("/models/F_1_A12.Out"),
        test: WellTestRecord {
            well: "A12".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            oil_rate: 500.0,
            water_rate: 100.0,
            gas_rate: 0.25,
            gas_lift_rate: 0.0,
            whp: 500.0,
            bhp,
            wht: 100.0,
            reservoir_pressure: Some(3000.0),
        },
    }
}

#[test]
fn both_high_reference_is_tuned_inside_its_box() {
    let settings = WellTuningSettings::new(CORRELATION);
    let mut s = session(CoefficientPair::new(1.15, 1.25));
    let report = WellTuner::new(&mut s, &settings).tune_well(&job(2500.0)).unwrap();

    assert!(matches!(report.outcome, WellOutcome::Tuned { .. }));
    assert_eq!(report.reference, Some(CoefficientPair::new(1.15, 1.25)));
    assert_eq!(report.tuned.cp1, 1.1);
    assert!((1.2..=3.0).contains(&report.tuned.cp2));
    assert!((report.productivity_index - 1.2).abs() < 1e-12);

    // The starting point (1.1, 1.2) solves to about 2375 psi; the lift curve
    // reaches 2500 psi at cp2 = 7/3.
    assert!((report.solved_bhp - 2500.0).abs() < 5.0, "{}", report.solved_bhp);
    assert!((report.tuned.cp2 - 7.0 / 3.0).abs() < 0.05, "{}", report.tuned);
    let search = report.search.unwrap();
    assert!(search.stats.evaluations > 1);
    assert_eq!(search.stats.penalties, 0);

    let written = s
        .oracle()
        .writes_to(&prosper::correlation_parameter(CORRELATION, 1));
    assert_eq!(written.last().and_then(|v| v.as_f64()), Some(report.tuned.cp2));
    assert_eq!(report.lift_table, Some(PathBuf::from("/models/F_1_A12.tpd")));
    assert_eq!(s.oracle().count_commands("PROSPER.ANL.VLP.EXPORTBYEXT"), 1);
}

#[test]
fn tuning_twice_gives_the_same_pair() {
    let settings = WellTuningSettings::new(CORRELATION);
    let mut s = session(CoefficientPair::new(1.15, 1.25));
    let first = WellTuner::new(&mut s, &settings).tune_well(&job(2500.0)).unwrap();
    let second = WellTuner::new(&mut s, &settings).tune_well(&job(2500.0)).unwrap();
    assert_eq!(first.tuned, second.tuned);
    assert_eq!(first.solved_bhp, second.solved_bhp);
}

#[test]
fn acceptable_reference_is_kept() {
    let settings = WellTuningSettings::new(CORRELATION);
    let reference = CoefficientPair::new(1.0, 1.05);
    let mut s = session(reference);
    let report = WellTuner::new(&mut s, &settings).tune_well(&job(2500.0)).unwrap();

    assert_eq!(report.tuned, reference);
    assert!(report.search.is_none());
    assert!(matches!(report.outcome, WellOutcome::AcceptedAsIs { .. }));
    assert!(WELL_ACCEPTANCE.contains(report.tuned));
}

#[test]
fn unusable_bhp_keeps_neutral_coefficients() {
    let settings = WellTuningSettings::new(CORRELATION);
    for (bhp, reason) in [
        (0.0, NeutralReason::MissingBottomholePressure),
        (-15.0, NeutralReason::MissingBottomholePressure),
        (3200.0, NeutralReason::BottomholeAboveReservoir),
    ] {
        let mut s = session(CoefficientPair::new(1.15, 1.25));
        let report = WellTuner::new(&mut s, &settings).tune_well(&job(bhp)).unwrap();

        assert_eq!(report.outcome, WellOutcome::Neutral { reason });
        assert_eq!(report.tuned, CoefficientPair::NEUTRAL);
        assert!(report.search.is_none());
        assert!(report.lift_table.is_none());
        assert!(report.solved_liquid_rate > 0.0);
        assert_eq!(s.oracle().count_commands(prosper::MATCH_CALC), 0);
    }
}

#[test]
fn test_row_lands_on_top_of_history() {
    let settings = WellTuningSettings::new(CORRELATION);
    let mut s = session(CoefficientPair::new(1.0, 1.0));
    WellTuner::new(&mut s, &settings).tune_well(&job(2500.0)).unwrap();
    WellTuner::new(&mut s, &settings).tune_well(&job(2400.0)).unwrap();

    let gauge = |row| {
        s.oracle()
            .writes_to(&prosper::match_field(row, prosper::MatchField::GaugePressure))
            .last()
            .and_then(|v| v.as_f64())
    };
    assert_eq!(gauge(0), Some(2400.0));
    assert_eq!(gauge(1), Some(2500.0));
    assert_eq!(gauge(2), Some(0.0));
}

#[test]
fn failed_evaluation_is_absorbed_as_penalty() {
    let settings = WellTuningSettings::new(CORRELATION);
    let mut s = session(CoefficientPair::new(1.15, 1.25));
    s.oracle_mut().fail_gets(prosper::SOLVED_GAUGE_PRESSURE, 1);
    let report = WellTuner::new(&mut s, &settings).tune_well(&job(2500.0)).unwrap();

    let search = report.search.unwrap();
    assert_eq!(search.stats.penalties, 1);
    assert_eq!(s.oracle().connect_count(), 2);
    assert_eq!(report.tuned.cp1, 1.1);
    assert!((1.2..=3.0).contains(&report.tuned.cp2));
}

#[test]
fn fatal_error_closes_model_without_saving() {
    let settings = WellTuningSettings::new(CORRELATION);
    let mut s = session(CoefficientPair::new(1.15, 1.25));
    s.oracle_mut()
        .fail_gets(&prosper::match_field(0, prosper::MatchField::UValue), 1);
    let err = WellTuner::new(&mut s, &settings)
        .tune_well(&job(2500.0))
        .unwrap_err();

    assert!(matches!(err, TuningError::Oracle(_)));
    assert_eq!(s.oracle().count_commands("PROSPER.SAVEFILE"), 0);
    assert_eq!(s.oracle().count_commands("PROSPER.SHUTDOWN"), 1);
}

#[test]
fn batch_stops_at_missing_model() {
    let settings = WellTuningSettings::new(CORRELATION);
    let mut s = session(CoefficientPair::new(1.0, 1.0));
    let mut missing = job(2500.0);
    missing.model = PathBuf::from("/models/F_1_Z99.Out");

    let result = WellTuner::new(&mut s, &settings).tune_batch(&[job(2500.0), missing, job(2500.0)]);
    assert!(result.is_err());
    assert_eq!(s.oracle().count_commands("PROSPER.SAVEFILE"), 1);
}
