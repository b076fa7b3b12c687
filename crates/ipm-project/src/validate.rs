//! Project validation logic.

use std::collections::HashSet;

use ipm_solver::BoundedSearchConfig;

use crate::schema::{LATEST_VERSION, OptimizationDef, Project, RetryDef, WellDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing value: {field}")]
    Missing { field: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing {
            field: field.to_string(),
        });
    }
    Ok(())
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }
    require_text("name", &project.name)?;
    require_text("correlation", &project.correlation)?;
    if project.models.network_model.as_os_str().is_empty() {
        return Err(ValidationError::Missing {
            field: "models.network_model".to_string(),
        });
    }

    let mut names = HashSet::new();
    let mut network_names = HashSet::new();
    let mut model_files = HashSet::new();
    for well in &project.wells {
        validate_well(well)?;
        if !names.insert(&well.name) {
            return Err(ValidationError::DuplicateId {
                id: well.name.to_string(),
                context: "wells".to_string(),
            });
        }
        if !network_names.insert(well.network_name()) {
            return Err(ValidationError::DuplicateId {
                id: well.network_name().to_string(),
                context: "well network names".to_string(),
            });
        }
        if !model_files.insert(well.model_file.to_ascii_lowercase()) {
            return Err(ValidationError::DuplicateId {
                id: well.model_file.clone(),
                context: "well model files".to_string(),
            });
        }
    }

    let mut tags = HashSet::new();
    for m in &project.manifold {
        if !tags.insert(&m.tag) {
            return Err(ValidationError::DuplicateId {
                id: m.tag.to_string(),
                context: "manifold tags".to_string(),
            });
        }
        require_text("manifold.joint", m.joint.as_str())?;
        require_text("manifold.pipe", m.pipe.as_str())?;
    }

    validate_search("tuning.well_search", &project.tuning.well_search)?;
    validate_search("tuning.pipe_search", &project.tuning.pipe_search)?;
    if let Some(opt) = &project.optimization {
        validate_optimization(opt)?;
    }
    validate_retry(&project.retry)?;
    Ok(())
}

fn validate_well(well: &WellDef) -> Result<(), ValidationError> {
    require_text("wells.name", well.name.as_str())?;
    require_text(&format!("wells[{}].completion", well.name), &well.completion)?;
    let is_model = well
        .model_file
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("out"));
    if !is_model {
        return Err(invalid(
            format!("wells[{}].model_file", well.name),
            &well.model_file,
            "expected a .Out well model file name",
        ));
    }
    if well.model_file.contains(['/', '\\']) {
        return Err(invalid(
            format!("wells[{}].model_file", well.name),
            &well.model_file,
            "must be a file name inside models.well_model_dir",
        ));
    }
    Ok(())
}

fn validate_search(field: &str, config: &BoundedSearchConfig) -> Result<(), ValidationError> {
    if !(config.f_tol >= 0.0 && config.f_tol.is_finite()) {
        return Err(invalid(format!("{field}.f_tol"), config.f_tol, "must be finite and non-negative"));
    }
    if !(config.g_tol >= 0.0 && config.g_tol.is_finite()) {
        return Err(invalid(format!("{field}.g_tol"), config.g_tol, "must be finite and non-negative"));
    }
    if !(config.step > 0.0 && config.step < 1.0) {
        return Err(invalid(format!("{field}.step"), config.step, "must lie in (0, 1)"));
    }
    if config.max_iterations == 0 {
        return Err(invalid(format!("{field}.max_iterations"), 0, "must be positive"));
    }
    if config.max_evaluations == 0 {
        return Err(invalid(format!("{field}.max_evaluations"), 0, "must be positive"));
    }
    Ok(())
}

fn validate_optimization(opt: &OptimizationDef) -> Result<(), ValidationError> {
    if !(opt.max_gas > 0.0 && opt.max_gas.is_finite()) {
        return Err(invalid("optimization.max_gas", opt.max_gas, "must be positive"));
    }
    if !(opt.choke_diameter_min > 0.0 && opt.choke_diameter_min < opt.choke_diameter_max) {
        return Err(invalid(
            "optimization.choke_diameter_min",
            opt.choke_diameter_min,
            "must be positive and below choke_diameter_max",
        ));
    }
    if !opt.choke_diameter_max.is_finite() {
        return Err(invalid(
            "optimization.choke_diameter_max",
            opt.choke_diameter_max,
            "must be finite",
        ));
    }
    Ok(())
}

fn validate_retry(retry: &RetryDef) -> Result<(), ValidationError> {
    for (field, v) in [
        ("retry.initial_delay_s", retry.initial_delay_s),
        ("retry.max_delay_s", retry.max_delay_s),
    ] {
        if !(v >= 0.0 && v.is_finite()) {
            return Err(invalid(field, v, "must be finite and non-negative"));
        }
    }
    if retry.factor == 0 {
        return Err(invalid("retry.factor", 0, "must be at least 1"));
    }
    Ok(())
}
