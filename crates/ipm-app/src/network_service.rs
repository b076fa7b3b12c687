//! Network model workflow: inflow read-back, model update, pipeline
//! tuning, calculated output and choke optimization.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ipm_core::WellName;
use ipm_oracle::paths::{gap, prosper};
use ipm_oracle::{App, Oracle, Session, SolveScope};
use ipm_project::{OptimizationDef, Project};
use ipm_sources::{ManifoldProperty, ManifoldRecord, WellInputRecord, WellStatus};
use ipm_tuning::{PipeTuningReport, PipeTuningSettings, PipelineTuner};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AppResult;

/// Inflow data read back from a well model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IprRecord {
    pub well: WellName,
    /// Date of the latest match-table row, as the model stores it.
    pub date: String,
    pub productivity_index: f64,
    pub reservoir_pressure: f64,
    pub watercut: f64,
    pub gor: f64,
    pub liquid_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputCase {
    Base,
    Optimized,
}

/// Solved operating point of one well in the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkWellResult {
    pub well: WellName,
    pub case: OutputCase,
    pub oil_rate: f64,
    pub water_rate: f64,
    pub gas_rate: f64,
    pub whp: f64,
    pub bhp: f64,
    pub gas_injected: f64,
}

/// What `update_well_data` wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WellUpdate {
    pub lift_tables_imported: usize,
    pub ipr_written: usize,
    pub masked: Vec<WellName>,
    pub unmasked: Vec<WellName>,
}

pub fn read_ipr<O: Oracle>(
    session: &mut Session<O>,
    well: &WellName,
    model: &Path,
) -> AppResult<IprRecord> {
    session.open_model(App::Prosper, model)?;
    let read = read_open_ipr(session, well);
    let closed = session.close_model(App::Prosper);
    let record = read?;
    closed?;
    Ok(record)
}

fn read_open_ipr<O: Oracle>(session: &mut Session<O>, well: &WellName) -> AppResult<IprRecord> {
    use prosper::MatchField as F;
    let date = session.get(&prosper::match_field(0, F::Date))?.to_string();
    Ok(IprRecord {
        well: well.clone(),
        date,
        productivity_index: session.get_f64(prosper::PRODUCTIVITY_INDEX)?,
        reservoir_pressure: session.get_f64(prosper::RESERVOIR_PRESSURE)?,
        gor: session.get_f64(&prosper::match_field(0, F::Gor))?,
        watercut: session.get_f64(&prosper::match_field(0, F::Watercut))?,
        liquid_rate: session.get_f64(&prosper::match_field(0, F::Rate))?,
    })
}

pub fn open_network<O: Oracle>(session: &mut Session<O>, project: &Project) -> AppResult<()> {
    Ok(session.open_model(App::Gap, &project.models.network_model)?)
}

pub fn close_network<O: Oracle>(
    session: &mut Session<O>,
    project: &Project,
    save: bool,
) -> AppResult<()> {
    if save {
        session.save_model(App::Gap, &project.models.network_model)?;
    }
    Ok(session.close_model(App::Gap)?)
}

/// Pushes lift tables, inflow and operating data into the network model, and
/// masks every well that is not flowing.
pub fn update_well_data<O: Oracle>(
    session: &mut Session<O>,
    project: &Project,
    inputs: &[WellInputRecord],
    iprs: &[IprRecord],
    lift_tables: &BTreeMap<WellName, PathBuf>,
) -> AppResult<WellUpdate> {
    let iprs: BTreeMap<&WellName, &IprRecord> = iprs.iter().map(|r| (&r.well, r)).collect();
    let mut update = WellUpdate::default();

    for input in inputs {
        let Some(def) = project.well(&input.well) else {
            warn!(well = %input.well, "historian record for unconfigured well ignored");
            continue;
        };
        let network = def.network_name().as_str();

        if let Some(table) = lift_tables.get(&input.well) {
            session.network_function(&gap::vlp_import(network, &table.to_string_lossy()))?;
            update.lift_tables_imported += 1;
        }

        match iprs.get(&input.well) {
            Some(ipr) => {
                session.set(&gap::ipr_field(network, gap::ipr::PI), ipr.productivity_index)?;
                session.set(
                    &gap::ipr_field(network, gap::ipr::RESERVOIR_PRESSURE),
                    ipr.reservoir_pressure,
                )?;
                session.set(&gap::ipr_field(network, gap::ipr::WATERCUT), ipr.watercut)?;
                session.set(&gap::ipr_field(network, gap::ipr::GOR), ipr.gor)?;
                update.ipr_written += 1;
            }
            None => warn!(well = %input.well, "no inflow data, network IPR left unchanged"),
        }

        if let Some(dp) = input.choke_dp {
            session.set(&gap::choke(network, gap::choke_field::DP_VALUE), dp)?;
        }
        if let Some(rate) = input.gas_lift_rate {
            session.set(&gap::gas_lift_value(network), rate)?;
        }

        let masked = input.status != WellStatus::Flowing;
        session.command(&gap::mask_command(&gap::well(network), masked))?;
        if masked {
            update.masked.push(input.well.clone());
        } else {
            update.unmasked.push(input.well.clone());
        }
    }

    info!(
        imported = update.lift_tables_imported,
        ipr = update.ipr_written,
        masked = update.masked.len(),
        "network well data updated"
    );
    Ok(update)
}

/// Writes riser gas-lift rates and separator pressures; returns the number of
/// values written.
pub fn update_manifold_data<O: Oracle>(
    session: &mut Session<O>,
    records: &[ManifoldRecord],
) -> AppResult<usize> {
    let mut written = 0;
    for record in records {
        let path = match record.property {
            ManifoldProperty::RiserGasLiftRate => gap::injection_rate(record.joint.as_str()),
            ManifoldProperty::SeparatorPressure => gap::separator_pressure(record.joint.as_str()),
            _ => continue,
        };
        match record.value {
            Some(v) => {
                session.set(&path, v)?;
                written += 1;
            }
            None => debug!(joint = %record.joint, "manifold value missing, left unchanged"),
        }
    }
    Ok(written)
}

pub fn tune_pipelines<O: Oracle>(
    session: &mut Session<O>,
    project: &Project,
    records: &[ManifoldRecord],
) -> AppResult<Vec<PipeTuningReport>> {
    let settings = PipeTuningSettings {
        search: project.tuning.pipe_search.clone(),
    };
    let mut tuner = PipelineTuner::new(session, &settings);
    Ok(tuner.tune_all(records)?)
}

/// Solves the network and reads each well's operating point.
pub fn calculated_output<O: Oracle>(
    session: &mut Session<O>,
    wells: &[WellName],
    case: OutputCase,
) -> AppResult<Vec<NetworkWellResult>> {
    use gap::result as r;
    session.trigger_solve(SolveScope::Network { optimize: false })?;
    let mut results = Vec::with_capacity(wells.len());
    for well in wells {
        let name = well.as_str();
        let mut read = |field: &str| session.get_f64(&gap::well_result(name, field));
        results.push(NetworkWellResult {
            well: well.clone(),
            case,
            oil_rate: read(r::OIL_RATE)?,
            water_rate: read(r::WATER_RATE)?,
            gas_rate: read(r::GAS_RATE)?,
            whp: read(r::WELLHEAD_PRESSURE)?,
            bhp: read(r::GAUGE_PRESSURE)?,
            gas_injected: read(r::GAS_INJECTED)?,
        });
    }
    Ok(results)
}

/// Field-wide choke optimization under the gas handling limit.
pub fn optimize_chokes<O: Oracle>(
    session: &mut Session<O>,
    optimization: &OptimizationDef,
    wells: &[WellName],
) -> AppResult<()> {
    use gap::choke_field as ck;
    session.trigger_solve(SolveScope::Network { optimize: false })?;
    session.set(gap::MAX_GAS, optimization.max_gas)?;
    for well in wells {
        let name = well.as_str();
        session.set(&gap::choke(name, ck::DP_CONTROL), "CALCULATED")?;
        session.set(&gap::choke(name, ck::DIAMETER_MIN), optimization.choke_diameter_min)?;
        session.set(&gap::choke(name, ck::DIAMETER_MAX), optimization.choke_diameter_max)?;
    }
    info!(max_gas = optimization.max_gas, wells = wells.len(), "optimizing chokes");
    session.trigger_solve(SolveScope::Network { optimize: true })?;
    Ok(())
}
