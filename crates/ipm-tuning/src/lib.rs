//! ipm-tuning: correlation tuning against the simulation engine.
//!
//! Contains:
//! - well (VLP coefficient tuning of single-well models, one model at a time)
//! - pipeline (hydraulic coefficient tuning of network pipes, one flowline group at a time)
//! - group (flowline grouping and endpoint selection from manifold pressures)
//! - mask (network joint mask bookkeeping)
//! - objective (penalized objective evaluation with reconnection)
//! - context (the measured targets an objective compares against)
//! - report (per-well and per-group output rows)
//!
//! Both tuners borrow the engine session mutably for the whole pass; nothing
//! here runs concurrently.

pub mod context;
pub mod error;
pub mod group;
pub mod mask;
pub mod objective;
pub mod pipeline;
pub mod report;
pub mod well;

pub use context::{PipeTuningContext, WellTuningContext};
pub use error::{TuningError, TuningResult};
pub use group::{GroupPlan, JointMeasurement, MaskPartition, SkipReason, WellGroup, plan_groups};
pub use mask::MaskLedger;
pub use objective::{EvaluationStats, PenalizedObjective};
pub use pipeline::{PipeTuningSettings, PipelineTuner};
pub use report::{
    NeutralReason, PipeOutcome, PipeTuningReport, SearchSummary, WellOutcome, WellTuningReport,
};
pub use well::{WellJob, WellTuner, WellTuningSettings};
