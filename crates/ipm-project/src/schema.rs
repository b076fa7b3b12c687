//! Project schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use ipm_core::{Backoff, TagName, WellName};
use ipm_solver::BoundedSearchConfig;
use ipm_sources::{ManifoldTag, RetryPolicy, SourceUnits, TimeWindow, WellTags};
use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub models: ModelsDef,
    /// VLP correlation tuned in every well model.
    pub correlation: String,
    /// Default measurement window; a run may override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<TimeWindow>,
    #[serde(default)]
    pub units: UnitsDef,
    #[serde(default)]
    pub wells: Vec<WellDef>,
    #[serde(default)]
    pub manifold: Vec<ManifoldTag>,
    #[serde(default)]
    pub tuning: TuningDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization: Option<OptimizationDef>,
    #[serde(default)]
    pub retry: RetryDef,
}

impl Project {
    pub fn well(&self, name: &WellName) -> Option<&WellDef> {
        self.wells.iter().find(|w| &w.name == name)
    }

    pub fn well_tags(&self) -> Vec<WellTags> {
        self.wells.iter().map(WellDef::to_well_tags).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelsDef {
    /// Directory holding the single-well models and their lift tables.
    pub well_model_dir: PathBuf,
    pub network_model: PathBuf,
}

/// Native units of the two data sources.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UnitsDef {
    pub historian: SourceUnits,
    pub well_tests: SourceUnits,
}

impl Default for UnitsDef {
    fn default() -> Self {
        Self {
            historian: SourceUnits::metric_hourly(),
            well_tests: SourceUnits::metric_daily(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WellDef {
    pub name: WellName,
    /// Completion name in the well-test database.
    pub completion: String,
    /// File name of the well model inside `models.well_model_dir`.
    pub model_file: String,
    /// Well name in the network model; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_name: Option<WellName>,
    #[serde(default)]
    pub tags: WellTagsDef,
}

impl WellDef {
    pub fn network_name(&self) -> &WellName {
        self.network_name.as_ref().unwrap_or(&self.name)
    }

    pub fn to_well_tags(&self) -> WellTags {
        let t = &self.tags;
        WellTags {
            well: self.name.clone(),
            completion: self.completion.clone(),
            status: t.status.clone(),
            routing: t.routing.clone(),
            whp: t.whp.clone(),
            bhp: t.bhp.clone(),
            wht: t.wht.clone(),
            choke_dp: t.choke_dp.clone(),
            gas_lift: t.gas_lift.clone(),
            meter_oil: t.meter_oil.clone(),
            meter_water: t.meter_water.clone(),
            meter_gas: t.meter_gas.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WellTagsDef {
    pub status: Option<TagName>,
    pub routing: Option<TagName>,
    pub whp: Option<TagName>,
    pub bhp: Option<TagName>,
    pub wht: Option<TagName>,
    pub choke_dp: Option<TagName>,
    pub gas_lift: Option<TagName>,
    pub meter_oil: Option<TagName>,
    pub meter_water: Option<TagName>,
    pub meter_gas: Option<TagName>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TuningDef {
    pub well_search: BoundedSearchConfig,
    pub pipe_search: BoundedSearchConfig,
    pub export_lift_tables: bool,
    pub tune_pipelines: bool,
}

impl Default for TuningDef {
    fn default() -> Self {
        Self {
            well_search: BoundedSearchConfig::coarse(),
            pipe_search: BoundedSearchConfig::coarse(),
            export_lift_tables: true,
            tune_pipelines: true,
        }
    }
}

/// Field-wide choke optimization under a gas handling limit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OptimizationDef {
    /// MMscf/d
    pub max_gas: f64,
    #[serde(default = "default_choke_min")]
    pub choke_diameter_min: f64,
    #[serde(default = "default_choke_max")]
    pub choke_diameter_max: f64,
}

fn default_choke_min() -> f64 {
    0.5
}

fn default_choke_max() -> f64 {
    6.0
}

/// Retry schedule for transient data-source failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryDef {
    pub retries: usize,
    pub initial_delay_s: f64,
    pub factor: u32,
    pub max_delay_s: f64,
}

impl Default for RetryDef {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_delay_s: 1.0,
            factor: 10,
            max_delay_s: 100.0,
        }
    }
}

impl RetryDef {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            backoff: Backoff::new(
                seconds(self.initial_delay_s),
                self.factor,
                seconds(self.max_delay_s),
            ),
        }
    }
}

fn seconds(s: f64) -> Duration {
    Duration::try_from_secs_f64(s).unwrap_or(Duration::ZERO)
}
