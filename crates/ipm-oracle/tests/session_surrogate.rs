use std::path::Path;
use std::time::Duration;

use ipm_core::{Backoff, CoefficientPair};
use ipm_oracle::paths::{gap, prosper};
use ipm_oracle::{
    App, Session, SolveScope, SurrogateField, SurrogateFlowline, SurrogateJoint, SurrogateWell,
};

fn field() -> SurrogateField {
    SurrogateField {
        correlation: "PE2".into(),
        wells: vec![SurrogateWell {
            model_file: "well_B7.Out".into(),
            network_name: "B_7".into(),
            joint: "J1".into(),
            productivity_index: 2.0,
            reservoir_pressure: 2800.0,
            gravity_drop: 1500.0,
            friction_factor: 0.3,
            reference: CoefficientPair::new(0.95, 1.0),
            u_value: 7.5,
            liquid_rate: 900.0,
            watercut: 30.0,
            gor: 400.0,
        }],
        flowlines: vec![SurrogateFlowline {
            name: "FL".into(),
            outlet_pressure: 120.0,
            joints: vec![SurrogateJoint {
                name: "J1".into(),
                pipe: "PIPE1".into(),
                gravity_drop: 25.0,
                friction_drop: 15.0,
            }],
        }],
    }
}

fn session() -> Session<ipm_oracle::ScriptedOracle> {
    let mut session = Session::new(field().into_oracle()).with_poll_schedule(Backoff::new(
        Duration::ZERO,
        2,
        Duration::ZERO,
    ));
    session.connect().unwrap();
    session
}

#[test]
fn well_model_round_trip_through_session() {
    let mut s = session();
    let model = Path::new("/models/well_B7.Out");
    s.open_model(App::Prosper, model).unwrap();

    s.command(prosper::MATCH_CALC).unwrap();
    let cp1 = s.get_f64(&prosper::correlation_parameter("PE2", 0)).unwrap();
    let cp2 = s.get_f64(&prosper::correlation_parameter("PE2", 1)).unwrap();
    assert_eq!((cp1, cp2), (0.95, 1.0));

    s.set(prosper::SYSTEM_WHP, 250.0).unwrap();
    s.trigger_solve(SolveScope::WellSystem).unwrap();
    let q = s.get_f64(prosper::SOLVED_LIQUID_RATE).unwrap();
    assert!(q > 0.0);

    s.close_model(App::Prosper).unwrap();
    assert!(s.get(prosper::SOLVED_LIQUID_RATE).is_err());
}

#[test]
fn network_solve_through_session() {
    let mut s = session();
    s.trigger_solve(SolveScope::Network { optimize: false }).unwrap();
    let j1 = s.get_f64(&gap::joint_pressure("J1")).unwrap();
    assert!((j1 - 160.0).abs() < 1e-9);

    s.set(&gap::pipe_coefficient("PIPE1", 1), 2.0).unwrap();
    s.trigger_solve(SolveScope::Network { optimize: false }).unwrap();
    let j1 = s.get_f64(&gap::joint_pressure("J1")).unwrap();
    assert!((j1 - 175.0).abs() < 1e-9);
}
