//! Error types for coefficient search.

use ipm_core::IpmError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error(transparent)]
    Core(#[from] IpmError),
}

pub type SolverResult<T> = Result<T, SolverError>;
