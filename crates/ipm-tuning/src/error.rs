//! Tuning errors.
//!
//! Invalid measurements and unconverged searches are outcomes, not errors;
//! what ends up here aborts the batch.

use ipm_core::FlowlineName;
use ipm_oracle::OracleError;
use ipm_solver::SolverError;
use thiserror::Error;

pub type TuningResult<T> = Result<T, TuningError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TuningError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    /// The session could not be re-established after a failed evaluation.
    #[error("Reconnect after failed evaluation failed: {cause}")]
    Reconnect { cause: OracleError },

    #[error("Flowline {flowline} has no pipe to tune")]
    NoPipes { flowline: FlowlineName },
}
