//! Penalized objective evaluation.
//!
//! A failed engine evaluation inside a search does not end the search: the
//! failure is logged, the simulated value is replaced by a penalty and the
//! session is re-established before the next evaluation. Configuration
//! errors (malformed paths) and a failed reconnect still propagate.

use ipm_oracle::{Oracle, OracleResult, Session};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{TuningError, TuningResult};

/// Evaluation counters of one search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationStats {
    pub evaluations: usize,
    /// Evaluations that failed and were replaced by the penalty
    pub penalties: usize,
}

pub struct PenalizedObjective<'s, O: Oracle> {
    session: &'s mut Session<O>,
    stats: EvaluationStats,
}

impl<'s, O: Oracle> PenalizedObjective<'s, O> {
    pub fn new(session: &'s mut Session<O>) -> Self {
        Self {
            session,
            stats: EvaluationStats::default(),
        }
    }

    /// Runs `simulate` against the session, substituting `penalty()` when it
    /// fails with a transient engine error.
    pub fn evaluate<T>(
        &mut self,
        simulate: impl FnOnce(&mut Session<O>) -> OracleResult<T>,
        penalty: impl FnOnce() -> T,
    ) -> TuningResult<T> {
        self.stats.evaluations += 1;
        match simulate(self.session) {
            Ok(value) => Ok(value),
            Err(e) if e.is_transient() => {
                self.stats.penalties += 1;
                warn!(
                    error = %e,
                    evaluation = self.stats.evaluations,
                    "objective evaluation failed, applying penalty"
                );
                self.session
                    .reconnect()
                    .map_err(|cause| TuningError::Reconnect { cause })?;
                Ok(penalty())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn stats(&self) -> EvaluationStats {
        self.stats
    }
}
