//! Measured targets and engine addressing for one objective.
//!
//! An objective closure captures one of these instead of reaching for shared
//! state; everything it needs to evaluate a candidate pair is here.

use ipm_core::{CoefficientPair, PipeName};
use ipm_oracle::paths::{gap, prosper};
use ipm_oracle::{Oracle, OracleResult, Session, SolveScope};

use crate::group::JointMeasurement;

/// Single-well target: the measured bottomhole pressure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WellTuningContext<'a> {
    pub correlation: &'a str,
    pub measured_bhp: f64,
}

impl<'a> WellTuningContext<'a> {
    pub fn new(correlation: &'a str, measured_bhp: f64) -> Self {
        Self {
            correlation,
            measured_bhp,
        }
    }

    /// Writes `pair` into the correlation, solves the system and reads the
    /// solved bottomhole pressure.
    pub fn simulate<O: Oracle>(
        &self,
        session: &mut Session<O>,
        pair: CoefficientPair,
    ) -> OracleResult<f64> {
        session.set(&prosper::correlation_parameter(self.correlation, 0), pair.cp1)?;
        session.set(&prosper::correlation_parameter(self.correlation, 1), pair.cp2)?;
        session.trigger_solve(SolveScope::WellSystem)?;
        session.get_f64(prosper::SOLVED_GAUGE_PRESSURE)
    }

    /// Simulated pressure assumed when an evaluation fails.
    pub fn penalty(&self) -> f64 {
        2.0 * self.measured_bhp
    }

    pub fn mismatch(&self, simulated_bhp: f64) -> f64 {
        (self.measured_bhp - simulated_bhp).powi(2)
    }
}

/// Flowline target: measured pressures at both ends of a group.
#[derive(Clone, Copy, Debug)]
pub struct PipeTuningContext<'a> {
    pub pipes: &'a [PipeName],
    pub upstream: &'a JointMeasurement,
    pub downstream: &'a JointMeasurement,
}

impl PipeTuningContext<'_> {
    /// Writes `pair` into every pipe of the group, solves the network and
    /// reads the simulated (upstream, downstream) joint pressures.
    pub fn simulate<O: Oracle>(
        &self,
        session: &mut Session<O>,
        pair: CoefficientPair,
    ) -> OracleResult<(f64, f64)> {
        for pipe in self.pipes {
            session.set(&gap::pipe_coefficient(pipe.as_str(), 0), pair.cp1)?;
            session.set(&gap::pipe_coefficient(pipe.as_str(), 1), pair.cp2)?;
        }
        session.trigger_solve(SolveScope::Network { optimize: false })?;
        let up = session.get_f64(&gap::joint_pressure(self.upstream.joint.as_str()))?;
        let down = session.get_f64(&gap::joint_pressure(self.downstream.joint.as_str()))?;
        Ok((up, down))
    }

    pub fn penalty(&self) -> (f64, f64) {
        (2.0 * self.upstream.pressure, 2.0 * self.downstream.pressure)
    }

    pub fn mismatch(&self, (up, down): (f64, f64)) -> f64 {
        (up - self.upstream.pressure).powi(2) + (down - self.downstream.pressure).powi(2)
    }
}
