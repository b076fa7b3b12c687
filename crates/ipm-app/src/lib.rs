//! Shared application service layer for ipmtune.
//!
//! Centralizes the workflow the CLI drives: project loading, well model
//! tuning, the network model update and pipeline tuning, choke optimization,
//! and batch output.

pub mod error;
pub mod fixture;
pub mod network_service;
pub mod progress;
pub mod project_service;
pub mod run_service;
pub mod well_service;

pub use error::{AppError, AppResult};
pub use fixture::DryRunFixture;
pub use network_service::{
    IprRecord, NetworkWellResult, OutputCase, WellUpdate, calculated_output, optimize_chokes,
    read_ipr, tune_pipelines, update_manifold_data, update_well_data,
};
pub use progress::{RunProgressEvent, RunStage};
pub use project_service::{WellSummary, get_well, list_wells, load_project, validate_project};
pub use run_service::{DataSources, RunOptions, RunRequest, RunResponse, run_batch};
pub use well_service::{build_jobs, tune_wells};
