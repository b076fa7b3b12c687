//! Error types for the ipm-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Well not found: {0}")]
    WellNotFound(String),

    #[error("Data source error: {0}")]
    Source(String),

    #[error("Engine error: {0}")]
    Oracle(String),

    #[error("Tuning error: {0}")]
    Tuning(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ipm-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ipm_project::ProjectError> for AppError {
    fn from(err: ipm_project::ProjectError) -> Self {
        match err {
            ipm_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<ipm_project::ValidationError> for AppError {
    fn from(err: ipm_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ipm_sources::SourceError> for AppError {
    fn from(err: ipm_sources::SourceError) -> Self {
        AppError::Source(err.to_string())
    }
}

impl From<ipm_oracle::OracleError> for AppError {
    fn from(err: ipm_oracle::OracleError) -> Self {
        AppError::Oracle(err.to_string())
    }
}

impl From<ipm_tuning::TuningError> for AppError {
    fn from(err: ipm_tuning::TuningError) -> Self {
        AppError::Tuning(err.to_string())
    }
}

impl From<ipm_solver::SolverError> for AppError {
    fn from(err: ipm_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}

impl From<ipm_results::ResultsError> for AppError {
    fn from(err: ipm_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
