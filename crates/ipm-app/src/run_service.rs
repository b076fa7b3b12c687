//! Full workflow: inputs, well tuning, network update and tuning, output.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use ipm_core::WellName;
use ipm_oracle::{Oracle, Session};
use ipm_project::Project;
use ipm_results::{BatchManifest, BatchSummary, ResultStore, Table, compute_batch_id};
use ipm_sources::{
    Historian, TimeWindow, WellTestSource, collect_manifold_inputs, collect_well_inputs,
    latest_well_tests,
};
use ipm_tuning::{PipeOutcome, PipeTuningReport, WellOutcome, WellTuningReport};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::network_service::{self, IprRecord, NetworkWellResult, OutputCase};
use crate::progress::{RunProgressEvent, RunStage};
use crate::project_service::{self, model_path};
use crate::well_service;

/// Measurement sources for one run.
#[derive(Clone, Copy)]
pub struct DataSources<'a> {
    pub historian: &'a dyn Historian,
    pub well_tests: &'a dyn WellTestSource,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Overrides the project's measurement window.
    pub window: Option<TimeWindow>,
    /// Run the choke optimization when the project configures it.
    pub optimize: bool,
    pub tool_version: String,
    /// Batch start time; the current time when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            window: None,
            optimize: true,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: None,
        }
    }
}

pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub options: RunOptions,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub manifest: BatchManifest,
    pub iprs: Vec<IprRecord>,
    pub wells: Vec<WellTuningReport>,
    pub pipes: Vec<PipeTuningReport>,
    pub network: Vec<NetworkWellResult>,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    info!(%stage, "run stage");
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Runs one batch against `session` and appends its rows to `store`.
pub fn run_batch<O: Oracle>(
    request: &RunRequest,
    session: &mut Session<O>,
    sources: DataSources<'_>,
    store: &ResultStore,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let options = &request.options;

    emit_progress(&mut progress_cb, RunStage::LoadingProject, started, None);
    let project = project_service::load_project(request.project_path)?;
    let window = options
        .window
        .or(project.window)
        .ok_or_else(|| AppError::InvalidInput("no measurement window given".to_string()))?;
    let timestamp = options.timestamp.unwrap_or_else(Utc::now).to_rfc3339();
    let batch_id = compute_batch_id(&project.name, Some(&window), &timestamp, &options.tool_version);
    info!(batch = %batch_id, project = %project.name, "starting batch");

    if !session.is_connected() {
        session.connect()?;
    }

    emit_progress(&mut progress_cb, RunStage::CollectingInputs, started, None);
    let retry = project.retry.to_policy();
    let tags = project.well_tags();
    let units = project.units;
    let inputs =
        retry.run(|| collect_well_inputs(sources.historian, &tags, &window, &units.historian))?;
    let manifold = retry.run(|| {
        collect_manifold_inputs(sources.historian, &project.manifold, &window, &units.historian)
    })?;

    emit_progress(&mut progress_cb, RunStage::ReadingIpr, started, None);
    let mut iprs = Vec::with_capacity(project.wells.len());
    for well in &project.wells {
        iprs.push(network_service::read_ipr(
            session,
            &well.name,
            &model_path(&project, well),
        )?);
    }

    emit_progress(&mut progress_cb, RunStage::LoadingWellTests, started, None);
    let tests = retry.run(|| {
        latest_well_tests(sources.well_tests, &tags, window.as_of(), &units.well_tests)
    })?;

    emit_progress(
        &mut progress_cb,
        RunStage::TuningWells,
        started,
        Some(format!("{} wells with tests", tests.len())),
    );
    let wells = well_service::tune_wells(session, &project, &tests)?;

    emit_progress(&mut progress_cb, RunStage::OpeningNetwork, started, None);
    network_service::open_network(session, &project)?;
    let network = run_network(
        session,
        &project,
        options,
        &inputs,
        &iprs,
        &wells,
        &manifold,
        &mut progress_cb,
        started,
    );
    let (pipes, network) = match network {
        Ok(out) => {
            network_service::close_network(session, &project, true)?;
            out
        }
        Err(e) => {
            if let Err(close) = network_service::close_network(session, &project, false) {
                warn!(error = %close, "could not close network model");
            }
            return Err(e);
        }
    };

    emit_progress(&mut progress_cb, RunStage::SavingResults, started, None);
    let manifest = BatchManifest {
        batch_id: batch_id.clone(),
        project: project.name.clone(),
        window: Some(window),
        timestamp,
        tool_version: options.tool_version.clone(),
        summary: summarize(&wells, &pipes, &network),
    };
    store.append(Table::WellTuning, &batch_id, &wells)?;
    store.append(Table::PipeTuning, &batch_id, &pipes)?;
    store.append(Table::NetworkResults, &batch_id, &network)?;
    store.save_manifest(&manifest)?;

    emit_progress(&mut progress_cb, RunStage::Completed, started, None);
    Ok(RunResponse {
        manifest,
        iprs,
        wells,
        pipes,
        network,
    })
}

#[allow(clippy::too_many_arguments)]
fn run_network<O: Oracle>(
    session: &mut Session<O>,
    project: &Project,
    options: &RunOptions,
    inputs: &[ipm_sources::WellInputRecord],
    iprs: &[IprRecord],
    wells: &[WellTuningReport],
    manifold: &[ipm_sources::ManifoldRecord],
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
) -> AppResult<(Vec<PipeTuningReport>, Vec<NetworkWellResult>)> {
    emit_progress(progress_cb, RunStage::UpdatingNetwork, started, None);
    let tables = well_service::lift_tables(wells);
    network_service::update_well_data(session, project, inputs, iprs, &tables)?;
    network_service::update_manifold_data(session, manifold)?;

    let pipes = if project.tuning.tune_pipelines {
        emit_progress(progress_cb, RunStage::TuningPipelines, started, None);
        network_service::tune_pipelines(session, project, manifold)?
    } else {
        Vec::new()
    };

    let names: Vec<WellName> = project
        .wells
        .iter()
        .map(|w| w.network_name().clone())
        .collect();
    emit_progress(progress_cb, RunStage::CalculatingBase, started, None);
    let mut network = network_service::calculated_output(session, &names, OutputCase::Base)?;

    match (&project.optimization, options.optimize) {
        (Some(optimization), true) => {
            emit_progress(progress_cb, RunStage::OptimizingChokes, started, None);
            network_service::optimize_chokes(session, optimization, &names)?;
            emit_progress(progress_cb, RunStage::CalculatingOptimized, started, None);
            network.extend(network_service::calculated_output(
                session,
                &names,
                OutputCase::Optimized,
            )?);
        }
        (None, true) => info!("no optimization configured, choke optimization skipped"),
        _ => {}
    }
    Ok((pipes, network))
}

fn summarize(
    wells: &[WellTuningReport],
    pipes: &[PipeTuningReport],
    network: &[NetworkWellResult],
) -> BatchSummary {
    let mut summary = BatchSummary {
        network_rows: network.len(),
        optimized: network.iter().any(|r| r.case == OutputCase::Optimized),
        ..BatchSummary::default()
    };
    for w in wells {
        match w.outcome {
            WellOutcome::Tuned { .. } => summary.wells_tuned += 1,
            WellOutcome::AcceptedAsIs { .. } => summary.wells_accepted += 1,
            WellOutcome::Neutral { .. } => summary.wells_neutral += 1,
        }
    }
    for p in pipes {
        match p.outcome {
            PipeOutcome::Tuned { .. } => summary.groups_tuned += 1,
            PipeOutcome::Skipped { .. } => summary.groups_skipped += 1,
        }
    }
    summary
}
