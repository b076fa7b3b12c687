//! Deterministic analytic engine for offline runs.
//!
//! Each well is a linear lift curve against a linear inflow:
//!
//! ```text
//! Pwf = WHP + cp1 * G + cp2 * k * q
//! q   = PI * (Pres - Pwf)
//! ```
//!
//! where `G` is the gravity drop and `k` the friction factor of the well.
//! Flowlines are chains of joints; each joint sits above the next by the drop
//! of its outgoing pipe, `gravity * g + friction * f`, and the last joint
//! discharges at the outlet pressure.
//!
//! The well model is file-based like the real engine: opening a model file
//! loads its saved state, closing without saving drops changes.

use std::path::Path;

use ipm_core::CoefficientPair;
use serde::{Deserialize, Serialize};

use crate::error::{OracleError, OracleResult};
use crate::paths::{gap, prosper};
use crate::scripted::{ScriptedOracle, ValueStore};
use crate::value::OracleValue;

const OPEN_MARKER: &str = "@open|PROSPER";
const HIDDEN_GRAVITY: &str = "PROSPER.SURROGATE.Gravity";
const HIDDEN_FRICTION: &str = "PROSPER.SURROGATE.Friction";
const HIDDEN_REFERENCE_CP1: &str = "PROSPER.SURROGATE.RefCp1";
const HIDDEN_REFERENCE_CP2: &str = "PROSPER.SURROGATE.RefCp2";
const HIDDEN_UVALUE: &str = "PROSPER.SURROGATE.Uvalue";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurrogateField {
    pub correlation: String,
    #[serde(default)]
    pub wells: Vec<SurrogateWell>,
    #[serde(default)]
    pub flowlines: Vec<SurrogateFlowline>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurrogateWell {
    /// File name of the well model.
    pub model_file: String,
    /// Name of the well in the network model.
    pub network_name: String,
    /// Joint the well produces into.
    pub joint: String,
    pub productivity_index: f64,
    pub reservoir_pressure: f64,
    /// Lift gravity drop at cp1 = 1 (psi).
    pub gravity_drop: f64,
    /// Lift friction drop per unit liquid rate at cp2 = 1 (psi per STB/d).
    pub friction_factor: f64,
    /// Coefficients the match calculation reports for this well.
    pub reference: CoefficientPair,
    #[serde(default = "default_u_value")]
    pub u_value: f64,
    #[serde(default)]
    pub liquid_rate: f64,
    #[serde(default)]
    pub watercut: f64,
    #[serde(default)]
    pub gor: f64,
}

fn default_u_value() -> f64 {
    8.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurrogateFlowline {
    pub name: String,
    pub outlet_pressure: f64,
    /// Joints from upstream to downstream.
    pub joints: Vec<SurrogateJoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurrogateJoint {
    pub name: String,
    /// Pipe leaving this joint towards the next one (or the outlet).
    pub pipe: String,
    pub gravity_drop: f64,
    pub friction_drop: f64,
}

impl SurrogateField {
    /// Builds a disconnected engine stub carrying this field.
    pub fn into_oracle(self) -> ScriptedOracle {
        let mut oracle = ScriptedOracle::new().with_value(gap::LAST_COMMAND_RETURN, 0.0);

        for well in &self.wells {
            seed_well_model(&mut oracle, &self.correlation, well);
        }
        for flowline in &self.flowlines {
            for joint in &flowline.joints {
                oracle.insert(&gap::pipe_coefficient(&joint.pipe, 0), 1.0);
                oracle.insert(&gap::pipe_coefficient(&joint.pipe, 1), 1.0);
            }
        }

        oracle.on_command("PROSPER.OPENFILE", open_well_model);
        oracle.on_command("PROSPER.SAVEFILE", save_well_model);
        oracle.on_command("PROSPER.SHUTDOWN", |_, store| {
            clear_live_model(store);
            store.remove(OPEN_MARKER);
            Ok(())
        });

        let correlation = self.correlation.clone();
        oracle.on_command(prosper::MATCH_CALC, move |_, store| {
            let cp1 = number(store, HIDDEN_REFERENCE_CP1, 1.0);
            let cp2 = number(store, HIDDEN_REFERENCE_CP2, 1.0);
            put(store, &prosper::correlation_parameter(&correlation, 0), cp1);
            put(store, &prosper::correlation_parameter(&correlation, 1), cp2);
            Ok(())
        });
        oracle.on_command(prosper::UVALUE_CALC, |_, store| {
            let u = number(store, HIDDEN_UVALUE, default_u_value());
            put(store, &prosper::match_field(0, prosper::MatchField::UValue), u);
            Ok(())
        });
        oracle.on_command(prosper::ADJUST_PI, |_, store| {
            let rate = number(store, &prosper::match_field(0, prosper::MatchField::Rate), 0.0);
            let bhp = number(
                store,
                &prosper::match_field(0, prosper::MatchField::GaugePressure),
                0.0,
            );
            let pres = match value(store, &prosper::match_field(0, prosper::MatchField::ReservoirPressure)) {
                Some(p) => p,
                None => number(store, prosper::RESERVOIR_PRESSURE, 0.0),
            };
            let drawdown = pres - bhp;
            let pi = if rate > 0.0 && drawdown > 0.0 {
                rate / drawdown
            } else {
                number(store, prosper::PRODUCTIVITY_INDEX, 0.0)
            };
            put(store, &prosper::match_field(0, prosper::MatchField::AmendedPi), pi);
            Ok(())
        });

        let correlation = self.correlation.clone();
        oracle.on_command(prosper::SYSTEM_CALC, move |_, store| {
            let label = match store.get(prosper::SYSTEM_TUBING) {
                Some(OracleValue::Text(label)) => label.clone(),
                _ => correlation.clone(),
            };
            let cp1 = number(store, &prosper::correlation_parameter(&label, 0), 1.0);
            let cp2 = number(store, &prosper::correlation_parameter(&label, 1), 1.0);
            let lift = LiftCurve {
                gravity: number(store, HIDDEN_GRAVITY, 0.0),
                friction: number(store, HIDDEN_FRICTION, 0.0),
            };
            let pi = number(store, prosper::PRODUCTIVITY_INDEX, 0.0);
            let pres = number(store, prosper::RESERVOIR_PRESSURE, 0.0);
            let whp = number(store, prosper::SYSTEM_WHP, 0.0);
            let (q, pwf) = lift.operating_point(CoefficientPair::new(cp1, cp2), pi, pres, whp);
            put(store, prosper::SOLVED_LIQUID_RATE, q);
            put(store, prosper::SOLVED_GAUGE_PRESSURE, pwf);
            Ok(())
        });

        let network = Network {
            wells: self.wells,
            flowlines: self.flowlines,
        };
        oracle.on_command("GAP.SOLVENETWORK", move |command, store| {
            network.solve(store, command.contains("(1)"))
        });

        oracle
    }
}

fn seed_well_model(oracle: &mut ScriptedOracle, correlation: &str, well: &SurrogateWell) {
    let file = &well.model_file;
    let mut seed = |path: &str, value: OracleValue| {
        oracle.insert(&snapshot_key(file, path), value);
    };
    seed(prosper::MATCH_COUNT, OracleValue::Number(1.0));
    seed(prosper::PRODUCTIVITY_INDEX, well.productivity_index.into());
    seed(prosper::RESERVOIR_PRESSURE, well.reservoir_pressure.into());
    seed(prosper::SYSTEM_TUBING, correlation.into());
    seed(&prosper::correlation_parameter(correlation, 0), 1.0.into());
    seed(&prosper::correlation_parameter(correlation, 1), 1.0.into());
    seed(HIDDEN_GRAVITY, well.gravity_drop.into());
    seed(HIDDEN_FRICTION, well.friction_factor.into());
    seed(HIDDEN_REFERENCE_CP1, well.reference.cp1.into());
    seed(HIDDEN_REFERENCE_CP2, well.reference.cp2.into());
    seed(HIDDEN_UVALUE, well.u_value.into());

    use prosper::MatchField as F;
    let row0: [(F, OracleValue); 13] = [
        (F::Date, "01/01/2024".into()),
        (F::Label, "initial".into()),
        (F::Gor, well.gor.into()),
        (F::GorFree, 0.0.into()),
        (F::Rate, well.liquid_rate.into()),
        (F::Watercut, well.watercut.into()),
        (F::WellheadPressure, 0.0.into()),
        (F::WellheadTemperature, 0.0.into()),
        (F::GaugePressure, 0.0.into()),
        (F::GaugeDepth, 0.0.into()),
        (F::ReservoirPressure, well.reservoir_pressure.into()),
        (F::GasLiftRate, 0.0.into()),
        (F::Enable, 1.into()),
    ];
    for (field, value) in row0 {
        seed(&prosper::match_field(0, field), value);
    }
}

#[derive(Clone, Copy, Debug)]
struct LiftCurve {
    gravity: f64,
    friction: f64,
}

impl LiftCurve {
    /// Intersection of the lift curve with the inflow line, rate floored at zero.
    fn operating_point(self, cp: CoefficientPair, pi: f64, pres: f64, whp: f64) -> (f64, f64) {
        let head = whp + cp.cp1 * self.gravity;
        let q = (pi * (pres - head) / (1.0 + pi * cp.cp2 * self.friction)).max(0.0);
        (q, head + cp.cp2 * self.friction * q)
    }
}

struct Network {
    wells: Vec<SurrogateWell>,
    flowlines: Vec<SurrogateFlowline>,
}

impl Network {
    fn joint_pressure(&self, store: &ValueStore, name: &str) -> Option<f64> {
        for flowline in &self.flowlines {
            let mut downstream = flowline.outlet_pressure;
            for joint in flowline.joints.iter().rev() {
                let gravity = number(store, &gap::pipe_coefficient(&joint.pipe, 0), 1.0);
                let friction = number(store, &gap::pipe_coefficient(&joint.pipe, 1), 1.0);
                downstream += gravity * joint.gravity_drop + friction * joint.friction_drop;
                if joint.name == name {
                    return Some(downstream);
                }
            }
        }
        None
    }

    fn solve(&self, store: &mut ValueStore, optimize: bool) -> OracleResult<()> {
        for flowline in &self.flowlines {
            for joint in &flowline.joints {
                let entity = gap::joint(&joint.name);
                let key = gap::joint_pressure(&joint.name);
                if is_masked(store, &entity) {
                    store.remove(&key);
                } else if let Some(p) = self.joint_pressure(store, &joint.name) {
                    put(store, &key, p);
                }
            }
        }

        let mut results = Vec::with_capacity(self.wells.len());
        for well in &self.wells {
            let name = &well.network_name;
            if is_masked(store, &gap::well(name)) {
                results.push(WellResult::shut_in(name));
                continue;
            }
            let manifold = self.joint_pressure(store, &well.joint).ok_or_else(|| {
                OracleError::engine("command", "GAP.SOLVENETWORK", format!("well {name} has no joint"))
            })?;
            let choke_dp = number(store, &gap::choke(name, gap::choke_field::DP_VALUE), 0.0);
            let whp = manifold + choke_dp;
            let pi = number(
                store,
                &gap::ipr_field(name, gap::ipr::PI),
                well.productivity_index,
            );
            let pres = number(
                store,
                &gap::ipr_field(name, gap::ipr::RESERVOIR_PRESSURE),
                well.reservoir_pressure,
            );
            let wct = number(store, &gap::ipr_field(name, gap::ipr::WATERCUT), well.watercut);
            let gor = number(store, &gap::ipr_field(name, gap::ipr::GOR), well.gor);
            let lift = LiftCurve {
                gravity: well.gravity_drop,
                friction: well.friction_factor,
            };
            let (q, pwf) = lift.operating_point(CoefficientPair::NEUTRAL, pi, pres, whp);
            results.push(WellResult {
                name: name.clone(),
                manifold,
                liquid: q,
                watercut: wct,
                gor,
                whp,
                pwf,
                pi,
                pres,
                gravity: lift.gravity,
                friction: lift.friction,
                lift_gas: number(store, &gap::gas_lift_value(name), 0.0),
            });
        }

        if optimize {
            let cap = number(store, gap::MAX_GAS, 0.0);
            let total: f64 = results.iter().map(WellResult::gas).sum();
            if cap > 0.0 && total > cap {
                let factor = cap / total;
                for r in &mut results {
                    r.throttle(factor);
                    r.write_choke(store);
                }
            }
        }

        for r in &results {
            r.write(store);
        }
        put(store, gap::LAST_COMMAND_RETURN, 0.0);
        Ok(())
    }
}

struct WellResult {
    name: String,
    manifold: f64,
    liquid: f64,
    watercut: f64,
    gor: f64,
    whp: f64,
    pwf: f64,
    pi: f64,
    pres: f64,
    gravity: f64,
    friction: f64,
    lift_gas: f64,
}

impl WellResult {
    fn shut_in(name: &str) -> Self {
        Self {
            name: name.to_string(),
            manifold: 0.0,
            liquid: 0.0,
            watercut: 0.0,
            gor: 0.0,
            whp: 0.0,
            pwf: 0.0,
            pi: 0.0,
            pres: 0.0,
            gravity: 0.0,
            friction: 0.0,
            lift_gas: 0.0,
        }
    }

    fn oil(&self) -> f64 {
        self.liquid * (1.0 - self.watercut / 100.0)
    }

    fn gas(&self) -> f64 {
        self.oil() * self.gor / 1.0e6
    }

    /// Chokes the well back to `factor` of its open-choke rate.
    fn throttle(&mut self, factor: f64) {
        self.liquid *= factor;
        if self.pi > 0.0 {
            self.pwf = self.pres - self.liquid / self.pi;
            self.whp = self.pwf - self.gravity - self.friction * self.liquid;
        }
    }

    /// Keeps the throttled operating point for later solves.
    fn write_choke(&self, store: &mut ValueStore) {
        if self.pi > 0.0 {
            let path = gap::choke(&self.name, gap::choke_field::DP_VALUE);
            put(store, &path, self.whp - self.manifold);
        }
    }

    fn write(&self, store: &mut ValueStore) {
        use gap::result as r;
        let name = &self.name;
        put(store, &gap::well_result(name, r::OIL_RATE), self.oil());
        put(store, &gap::well_result(name, r::WATER_RATE), self.liquid - self.oil());
        put(store, &gap::well_result(name, r::GAS_RATE), self.gas());
        put(store, &gap::well_result(name, r::WELLHEAD_PRESSURE), self.whp);
        put(store, &gap::well_result(name, r::GAUGE_PRESSURE), self.pwf);
        put(store, &gap::well_result(name, r::GAS_INJECTED), self.lift_gas);
    }
}

fn open_well_model(command: &str, store: &mut ValueStore) -> OracleResult<()> {
    let file = quoted_file_name(command)
        .ok_or_else(|| OracleError::engine("command", command, "missing model path"))?;
    let prefix = snapshot_key(&file, "");
    let saved: Vec<(String, OracleValue)> = store
        .range(prefix.clone()..)
        .take_while(|(k, _)| k.starts_with(&prefix))
        .map(|(k, v)| (k[prefix.len()..].to_string(), v.clone()))
        .collect();
    if saved.is_empty() {
        return Err(OracleError::engine("command", command, "model file not found"));
    }
    clear_live_model(store);
    store.extend(saved);
    store.insert(OPEN_MARKER.to_string(), OracleValue::Text(file));
    Ok(())
}

fn save_well_model(command: &str, store: &mut ValueStore) -> OracleResult<()> {
    let file = quoted_file_name(command)
        .ok_or_else(|| OracleError::engine("command", command, "missing model path"))?;
    let rows = (0..)
        .take_while(|row| store.contains_key(&prosper::match_field(*row, prosper::MatchField::Date)))
        .count();
    put(store, prosper::MATCH_COUNT, rows as f64);

    let prefix = snapshot_key(&file, "");
    store.retain(|k, _| !k.starts_with(&prefix));
    let live: Vec<(String, OracleValue)> = store
        .iter()
        .filter(|(k, _)| k.starts_with("PROSPER."))
        .map(|(k, v)| (format!("{prefix}{k}"), v.clone()))
        .collect();
    store.extend(live);
    Ok(())
}

fn clear_live_model(store: &mut ValueStore) {
    store.retain(|k, _| !k.starts_with("PROSPER."));
}

fn snapshot_key(file: &str, path: &str) -> String {
    format!("@{file}|{path}")
}

fn quoted_file_name(command: &str) -> Option<String> {
    let start = command.find('"')?;
    let end = command.rfind('"')?;
    if end <= start {
        return None;
    }
    let path = Path::new(&command[start + 1..end]);
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn is_masked(store: &ValueStore, entity: &str) -> bool {
    number(store, &gap::mask_flag(entity), 0.0) > 0.5
}

fn value(store: &ValueStore, path: &str) -> Option<f64> {
    store.get(path).and_then(OracleValue::as_f64)
}

fn number(store: &ValueStore, path: &str, default: f64) -> f64 {
    value(store, path).unwrap_or(default)
}

fn put(store: &mut ValueStore, path: &str, v: f64) {
    store.insert(path.to_string(), OracleValue::Number(v));
}
