//! Hydraulic coefficient tuning of network pipes.
//!
//! Flowline groups are tuned one after another. For each group the joints
//! outside its network are masked, the gravity and friction multipliers
//! shared by the group's pipes are fitted to the measured endpoint pressures
//! inside [`PIPE_BOX`], and the result is written to every pipe. When the pass
//! ends, successful or not, every flowline-pressure joint is unmasked again.

use ipm_core::CoefficientPair;
use ipm_oracle::paths::gap;
use ipm_oracle::{Oracle, Session};
use ipm_solver::{BoundedSearchConfig, PIPE_BOX, minimize_bounded};
use ipm_sources::ManifoldRecord;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::PipeTuningContext;
use crate::error::{TuningError, TuningResult};
use crate::group::{GroupPlan, WellGroup, plan_groups, pressure_joints};
use crate::mask::MaskLedger;
use crate::objective::PenalizedObjective;
use crate::report::{PipeOutcome, PipeTuningReport, SearchSummary};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipeTuningSettings {
    pub search: BoundedSearchConfig,
}

pub struct PipelineTuner<'s, O: Oracle> {
    session: &'s mut Session<O>,
    settings: &'s PipeTuningSettings,
}

impl<'s, O: Oracle> PipelineTuner<'s, O> {
    pub fn new(session: &'s mut Session<O>, settings: &'s PipeTuningSettings) -> Self {
        Self { session, settings }
    }

    /// Tunes every flowline group found in `records`.
    ///
    /// Groups without usable measurements are reported as skipped. A fatal
    /// error stops the pass; joints are unmasked before it is returned.
    pub fn tune_all(&mut self, records: &[ManifoldRecord]) -> TuningResult<Vec<PipeTuningReport>> {
        let mut ledger = MaskLedger::new();
        let mut reports = Vec::new();
        let mut failure = None;

        for plan in plan_groups(records) {
            match plan {
                GroupPlan::Skipped { flowline, reason } => {
                    warn!(flowline = %flowline, ?reason, "skipping flowline group");
                    reports.push(PipeTuningReport {
                        flowline,
                        outcome: PipeOutcome::Skipped { reason },
                    });
                }
                GroupPlan::Tunable(group) => match self.tune_group(&group, records, &mut ledger) {
                    Ok(report) => reports.push(report),
                    Err(e) => {
                        warn!(flowline = %group.flowline, error = %e, "flowline group failed");
                        failure = Some(e);
                        break;
                    }
                },
            }
        }

        let restored = ledger.unmask_all(self.session, &pressure_joints(records));
        if let Some(e) = failure {
            if let Err(unmask) = restored {
                warn!(error = %unmask, "joints left masked after failed pass");
            }
            return Err(e);
        }
        restored?;
        Ok(reports)
    }

    fn tune_group(
        &mut self,
        group: &WellGroup,
        records: &[ManifoldRecord],
        ledger: &mut MaskLedger,
    ) -> TuningResult<PipeTuningReport> {
        info!(
            flowline = %group.flowline,
            network = %group.network,
            upstream = %group.upstream.joint,
            downstream = %group.downstream.joint,
            "tuning flowline group"
        );
        ledger.apply(self.session, &group.mask_partition(records))?;

        let first = group.pipes.first().ok_or_else(|| TuningError::NoPipes {
            flowline: group.flowline.clone(),
        })?;
        let initial = CoefficientPair::new(
            self.session
                .get_f64(&gap::pipe_coefficient(first.as_str(), 0))?,
            self.session
                .get_f64(&gap::pipe_coefficient(first.as_str(), 1))?,
        );
        let start = PIPE_BOX.clamp(initial);

        let settings = self.settings;
        let ctx = PipeTuningContext {
            pipes: &group.pipes,
            upstream: &group.upstream,
            downstream: &group.downstream,
        };
        let mut objective = PenalizedObjective::new(&mut *self.session);
        let result = minimize_bounded::<_, TuningError>(
            |x: &DVector<f64>| {
                let pair = CoefficientPair::new(x[0], x[1]);
                let simulated = objective.evaluate(|s| ctx.simulate(s, pair), || ctx.penalty())?;
                let value = ctx.mismatch(simulated);
                debug!(%pair, upstream = simulated.0, downstream = simulated.1, value, "pipe objective");
                Ok(value)
            },
            &DVector::from_row_slice(&start.to_array()),
            &PIPE_BOX.intervals(),
            &settings.search,
        )?;
        let stats = objective.stats();

        let tuned = CoefficientPair::new(result.x[0], result.x[1]);
        for pipe in &group.pipes {
            self.session
                .set(&gap::pipe_coefficient(pipe.as_str(), 0), tuned.cp1)?;
            self.session
                .set(&gap::pipe_coefficient(pipe.as_str(), 1), tuned.cp2)?;
        }
        info!(flowline = %group.flowline, %initial, %tuned, termination = ?result.termination, "flowline group tuned");

        Ok(PipeTuningReport {
            flowline: group.flowline.clone(),
            outcome: PipeOutcome::Tuned {
                network: group.network.clone(),
                upstream: group.upstream.clone(),
                downstream: group.downstream.clone(),
                initial,
                tuned,
                pipes: group.pipes.clone(),
                search: SearchSummary {
                    initial_guess: start,
                    iterations: result.iterations,
                    stats,
                    objective: result.value,
                    termination: result.termination,
                },
            },
        })
    }
}
