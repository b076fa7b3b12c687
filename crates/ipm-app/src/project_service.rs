//! Project loading, validation, and introspection.

use std::path::{Path, PathBuf};

use ipm_core::WellName;
use ipm_project::{Project, WellDef};

use crate::error::{AppError, AppResult};

/// Summary of a configured well for listing.
#[derive(Debug, Clone, PartialEq)]
pub struct WellSummary {
    pub name: WellName,
    pub network_name: WellName,
    pub completion: String,
    pub model: PathBuf,
    pub tag_count: usize,
}

/// Load and validate a project from a YAML file.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ProjectFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(ipm_project::parse_yaml(&content)?)
}

pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    Ok(ipm_project::save_yaml(path, project)?)
}

pub fn validate_project(project: &Project) -> AppResult<()> {
    Ok(ipm_project::validate_project(project)?)
}

/// Path of a well's model file.
pub fn model_path(project: &Project, well: &WellDef) -> PathBuf {
    project.models.well_model_dir.join(&well.model_file)
}

pub fn list_wells(project: &Project) -> Vec<WellSummary> {
    project
        .wells
        .iter()
        .map(|well| {
            let t = &well.tags;
            let tag_count = [
                &t.status,
                &t.routing,
                &t.whp,
                &t.bhp,
                &t.wht,
                &t.choke_dp,
                &t.gas_lift,
                &t.meter_oil,
                &t.meter_water,
                &t.meter_gas,
            ]
            .iter()
            .filter(|tag| tag.is_some())
            .count();
            WellSummary {
                name: well.name.clone(),
                network_name: well.network_name().clone(),
                completion: well.completion.clone(),
                model: model_path(project, well),
                tag_count,
            }
        })
        .collect()
}

pub fn get_well<'p>(project: &'p Project, name: &str) -> AppResult<&'p WellDef> {
    project
        .well(&WellName::new(name))
        .ok_or_else(|| AppError::WellNotFound(name.to_string()))
}
