//! Well model tuning over a batch of well tests.

use std::collections::BTreeMap;
use std::path::PathBuf;

use ipm_core::WellName;
use ipm_oracle::{Oracle, Session};
use ipm_project::Project;
use ipm_sources::WellTestRecord;
use ipm_tuning::{WellJob, WellTuner, WellTuningReport, WellTuningSettings};
use tracing::warn;

use crate::error::AppResult;
use crate::project_service::model_path;

pub fn tuning_settings(project: &Project) -> WellTuningSettings {
    WellTuningSettings {
        correlation: project.correlation.clone(),
        search: project.tuning.well_search.clone(),
        export_lift_tables: project.tuning.export_lift_tables,
    }
}

/// Pairs each test with its well's model, in project order.
///
/// Tests for wells the project does not configure are dropped with a warning.
pub fn build_jobs(project: &Project, tests: &[WellTestRecord]) -> Vec<WellJob> {
    let by_well: BTreeMap<&WellName, &WellTestRecord> =
        tests.iter().map(|t| (&t.well, t)).collect();
    for t in tests {
        if project.well(&t.well).is_none() {
            warn!(well = %t.well, "well test for unconfigured well ignored");
        }
    }
    project
        .wells
        .iter()
        .filter_map(|well| {
            by_well.get(&well.name).map(|test| WellJob {
                well: well.name.clone(),
                model: model_path(project, well),
                test: (*test).clone(),
            })
        })
        .collect()
}

pub fn tune_wells<O: Oracle>(
    session: &mut Session<O>,
    project: &Project,
    tests: &[WellTestRecord],
) -> AppResult<Vec<WellTuningReport>> {
    let settings = tuning_settings(project);
    let jobs = build_jobs(project, tests);
    let mut tuner = WellTuner::new(session, &settings);
    Ok(tuner.tune_batch(&jobs)?)
}

/// Lift tables exported by tuned wells, keyed by well.
pub fn lift_tables(reports: &[WellTuningReport]) -> BTreeMap<WellName, PathBuf> {
    reports
        .iter()
        .filter_map(|r| r.lift_table.clone().map(|p| (r.well.clone(), p)))
        .collect()
}
