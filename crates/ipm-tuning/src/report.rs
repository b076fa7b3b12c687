//! Output rows of a tuning pass.

use std::path::PathBuf;

use chrono::NaiveDate;
use ipm_core::{CoefficientPair, FlowlineName, PipeName, WellName};
use ipm_solver::{Region, Termination};
use serde::{Deserialize, Serialize};

use crate::group::{JointMeasurement, SkipReason};
use crate::objective::EvaluationStats;

/// Why a well kept neutral coefficients without a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeutralReason {
    /// No usable bottomhole pressure in the test.
    MissingBottomholePressure,
    /// Measured bottomhole pressure at or above reservoir pressure.
    BottomholeAboveReservoir,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WellOutcome {
    Tuned { region: Region },
    AcceptedAsIs { region: Region },
    Neutral { reason: NeutralReason },
}

/// Bounded search statistics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    pub initial_guess: CoefficientPair,
    pub iterations: usize,
    #[serde(flatten)]
    pub stats: EvaluationStats,
    /// Final squared mismatch
    pub objective: f64,
    pub termination: Termination,
}

/// One well's tuning row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WellTuningReport {
    pub date: NaiveDate,
    pub well: WellName,
    pub liquid_rate: f64,
    pub watercut: f64,
    pub gor: f64,
    pub whp: f64,
    pub bhp: f64,
    pub wht: f64,
    pub u_value: f64,
    /// Pair reported by the match calculation; absent on the neutral path
    pub reference: Option<CoefficientPair>,
    pub tuned: CoefficientPair,
    pub productivity_index: f64,
    pub reservoir_pressure: f64,
    pub solved_liquid_rate: f64,
    pub solved_bhp: f64,
    pub outcome: WellOutcome,
    pub search: Option<SearchSummary>,
    pub lift_table: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipeOutcome {
    Tuned {
        network: FlowlineName,
        upstream: JointMeasurement,
        downstream: JointMeasurement,
        initial: CoefficientPair,
        tuned: CoefficientPair,
        pipes: Vec<PipeName>,
        search: SearchSummary,
    },
    Skipped {
        reason: SkipReason,
    },
}

/// One flowline group's tuning row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipeTuningReport {
    pub flowline: FlowlineName,
    pub outcome: PipeOutcome,
}

impl PipeTuningReport {
    pub fn tuned_pair(&self) -> Option<CoefficientPair> {
        match &self.outcome {
            PipeOutcome::Tuned { tuned, .. } => Some(*tuned),
            PipeOutcome::Skipped { .. } => None,
        }
    }
}
