use std::time::Duration;

use ipm_core::{Backoff, CoefficientPair};
use ipm_oracle::paths::gap;
use ipm_oracle::{ScriptedOracle, Session, SurrogateField, SurrogateFlowline, SurrogateJoint};
use ipm_solver::PIPE_BOX;
use ipm_sources::{ManifoldProperty, ManifoldRecord, MeasurementType};
use ipm_tuning::{PipeOutcome, PipeTuningSettings, PipelineTuner, SkipReason};

fn joint(name: &str, pipe: &str, gravity_drop: f64, friction_drop: f64) -> SurrogateJoint {
    SurrogateJoint {
        name: name.into(),
        pipe: pipe.into(),
        gravity_drop,
        friction_drop,
    }
}

/// FL1 solves to J1 = 100 + 90 g + 40 f and J3 = 100 + 20 g + 10 f.
fn field() -> SurrogateField {
    SurrogateField {
        correlation: "PE2".into(),
        wells: vec![],
        flowlines: vec![
            SurrogateFlowline {
                name: "FL1".into(),
                outlet_pressure: 100.0,
                joints: vec![
                    joint("J1", "P1", 40.0, 20.0),
                    joint("J2", "P2", 30.0, 10.0),
                    joint("J3", "P3", 20.0, 10.0),
                ],
            },
            SurrogateFlowline {
                name: "FL2".into(),
                outlet_pressure: 90.0,
                joints: vec![joint("K1", "Q1", 25.0, 5.0)],
            },
        ],
    }
}

fn session() -> Session<ScriptedOracle> {
    let mut s = Session::new(field().into_oracle())
        .with_poll_schedule(Backoff::new(Duration::ZERO, 2, Duration::ZERO));
    s.connect().unwrap();
    s
}

fn pressure(joint: &str, flowline: &str, pipe: &str, value: Option<f64>) -> ManifoldRecord {
    ManifoldRecord {
        joint: joint.into(),
        measurement: MeasurementType::Pressure,
        property: ManifoldProperty::FlowlinePressure,
        flowline: flowline.into(),
        commingled_flowline: flowline.into(),
        pipe: pipe.into(),
        value,
    }
}

/// Measurements generated by gravity 1.0 and friction 1.5 on FL1.
fn records() -> Vec<ManifoldRecord> {
    vec![
        pressure("J1", "FL1", "P1", Some(250.0)),
        pressure("J2", "FL1", "P2", Some(180.0)),
        pressure("J3", "FL1", "P3", Some(135.0)),
        pressure("K1", "FL2", "Q1", None),
    ]
}

fn masked(s: &Session<ScriptedOracle>, joint: &str) -> Option<f64> {
    s.oracle().number(&gap::mask_flag(&gap::joint(joint)))
}

#[test]
fn group_is_fitted_and_written_to_every_pipe() {
    let settings = PipeTuningSettings::default();
    let mut s = session();
    let reports = PipelineTuner::new(&mut s, &settings).tune_all(&records()).unwrap();

    assert_eq!(reports.len(), 2);
    let PipeOutcome::Tuned {
        upstream,
        downstream,
        initial,
        tuned,
        search,
        ..
    } = &reports[0].outcome
    else {
        panic!("FL1 not tuned: {:?}", reports[0]);
    };
    assert_eq!(upstream.joint.as_str(), "J1");
    assert_eq!(downstream.joint.as_str(), "J3");
    assert_eq!(*initial, CoefficientPair::NEUTRAL);
    assert!(PIPE_BOX.contains(*tuned));
    // (1, 1) misses by 20 psi upstream and 5 psi downstream.
    assert!(search.objective < 425.0);

    for pipe in ["P1", "P2", "P3"] {
        let cp1 = s.oracle().number(&gap::pipe_coefficient(pipe, 0)).unwrap();
        let cp2 = s.oracle().number(&gap::pipe_coefficient(pipe, 1)).unwrap();
        assert_eq!(CoefficientPair::new(cp1, cp2), *tuned);
    }
    assert_eq!(s.oracle().number(&gap::pipe_coefficient("Q1", 0)), Some(1.0));

    assert!(matches!(
        reports[1].outcome,
        PipeOutcome::Skipped {
            reason: SkipReason::NoMeasurements
        }
    ));
}

#[test]
fn masks_are_symmetric_after_a_pass() {
    let settings = PipeTuningSettings::default();
    let mut s = session();
    PipelineTuner::new(&mut s, &settings).tune_all(&records()).unwrap();

    assert_eq!(s.oracle().count_commands(&gap::mask_command(&gap::joint("K1"), true)), 1);
    for j in ["J1", "J2", "J3", "K1"] {
        assert_eq!(masked(&s, j), Some(0.0), "{j} left masked");
    }
}

#[test]
fn masks_are_restored_when_a_group_fails() {
    let settings = PipeTuningSettings::default();
    let mut s = session();
    s.oracle_mut().fail_gets(&gap::pipe_coefficient("P1", 0), 1);
    let result = PipelineTuner::new(&mut s, &settings).tune_all(&records());

    assert!(result.is_err());
    for j in ["J1", "J2", "J3", "K1"] {
        assert_eq!(masked(&s, j), Some(0.0), "{j} left masked");
    }
}

#[test]
fn failed_network_solve_is_penalized() {
    let settings = PipeTuningSettings::default();
    let mut s = session();
    s.oracle_mut().fail_commands("GAP.SOLVENETWORK", 1);
    let reports = PipelineTuner::new(&mut s, &settings).tune_all(&records()).unwrap();

    let PipeOutcome::Tuned { search, tuned, .. } = &reports[0].outcome else {
        panic!("FL1 not tuned");
    };
    assert_eq!(search.stats.penalties, 1);
    assert!(PIPE_BOX.contains(*tuned));
    assert_eq!(s.oracle().connect_count(), 2);
}

#[test]
fn out_of_box_start_is_clamped() {
    let settings = PipeTuningSettings::default();
    let mut s = session();
    s.oracle_mut().insert(&gap::pipe_coefficient("P1", 0), 1.6);
    s.oracle_mut().insert(&gap::pipe_coefficient("P1", 1), 0.1);
    let reports = PipelineTuner::new(&mut s, &settings).tune_all(&records()).unwrap();

    let PipeOutcome::Tuned { initial, search, .. } = &reports[0].outcome else {
        panic!("FL1 not tuned");
    };
    assert_eq!(*initial, CoefficientPair::new(1.6, 0.1));
    assert_eq!(search.initial_guess, CoefficientPair::new(1.1, 0.3));
}

fn commingled(joint: &str, flowline: &str, into: &str, pipe: &str, value: Option<f64>) -> ManifoldRecord {
    ManifoldRecord {
        commingled_flowline: into.into(),
        ..pressure(joint, flowline, pipe, value)
    }
}

#[test]
fn commingled_group_masks_joints_outside_its_network() {
    // FL2 flows into FL1; FL3 is a separate network without readings.
    let records = vec![
        pressure("J1", "FL1", "P1", Some(250.0)),
        pressure("J3", "FL1", "P3", Some(135.0)),
        commingled("K1", "FL2", "FL1", "Q1", Some(125.0)),
        pressure("L1", "FL3", "R1", None),
    ];
    let settings = PipeTuningSettings::default();
    let mut s = session();
    let reports = PipelineTuner::new(&mut s, &settings).tune_all(&records).unwrap();

    assert_eq!(reports.len(), 3);
    let PipeOutcome::Tuned { network, .. } = &reports[1].outcome else {
        panic!("FL2 not tuned: {:?}", reports[1]);
    };
    assert_eq!(network.as_str(), "FL1");
    assert!(matches!(
        reports[2].outcome,
        PipeOutcome::Skipped {
            reason: SkipReason::NoMeasurements
        }
    ));

    // Replay the mask commands and check the state at every network solve.
    let joints = ["J1", "J3", "K1", "L1"];
    let mut state = [false; 4];
    let mut solves = 0;
    for command in s.oracle().commands() {
        if command.starts_with("GAP.SOLVENETWORK") {
            solves += 1;
            assert_eq!(state, [false, false, false, true], "mask state at solve {solves}");
            continue;
        }
        for (i, j) in joints.iter().enumerate() {
            let entity = gap::joint(j);
            if command == gap::mask_command(&entity, true) {
                state[i] = true;
            } else if command == gap::mask_command(&entity, false) {
                state[i] = false;
            }
        }
    }
    assert!(solves > 0);
    assert_eq!(state, [false; 4]);
    for j in joints {
        assert_eq!(masked(&s, j), Some(0.0), "{j} left masked");
    }
    assert_eq!(s.oracle().count_commands(&gap::mask_command(&gap::joint("L1"), true)), 2);
}
