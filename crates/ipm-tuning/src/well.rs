//! VLP coefficient tuning of single-well models.
//!
//! For each well the latest test is pushed into the model's match table,
//! the heat-transfer coefficient and productivity index are re-derived, and
//! the correlation pair is brought back inside the acceptance region by a
//! bounded search on the bottomhole-pressure mismatch. Tests without a usable
//! bottomhole pressure keep neutral coefficients.

use std::path::{Path, PathBuf};

use ipm_core::{CoefficientPair, WellName};
use ipm_oracle::paths::prosper::{self, MatchField, vlp};
use ipm_oracle::{App, Oracle, Session, SolveScope};
use ipm_solver::{BoundedSearchConfig, Correction, SearchBox, minimize_bounded, select_correction};
use ipm_sources::WellTestRecord;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::WellTuningContext;
use crate::error::{TuningError, TuningResult};
use crate::objective::PenalizedObjective;
use crate::report::{NeutralReason, SearchSummary, WellOutcome, WellTuningReport};

/// Productivity index written before the VLP adjustment; a high value keeps
/// the adjustment from hitting the inflow limit.
const ADJUSTMENT_PI: f64 = 100.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WellTuningSettings {
    /// Name of the VLP correlation being tuned.
    pub correlation: String,
    #[serde(default)]
    pub search: BoundedSearchConfig,
    /// Export a lift table next to each tuned model.
    #[serde(default = "default_true")]
    pub export_lift_tables: bool,
}

fn default_true() -> bool {
    true
}

impl WellTuningSettings {
    pub fn new(correlation: impl Into<String>) -> Self {
        Self {
            correlation: correlation.into(),
            search: BoundedSearchConfig::coarse(),
            export_lift_tables: true,
        }
    }
}

/// One well model and the test to tune it against.
#[derive(Clone, Debug, PartialEq)]
pub struct WellJob {
    pub well: WellName,
    pub model: PathBuf,
    pub test: WellTestRecord,
}

/// Lift-table path for a well model: same name, `.tpd` extension.
pub fn lift_table_path(model: &Path) -> PathBuf {
    model.with_extension("tpd")
}

/// Checks whether a measured BHP can drive the search.
pub fn check_measurement(bhp: f64, reservoir_pressure: f64) -> Result<(), NeutralReason> {
    if !(bhp > 0.0) {
        Err(NeutralReason::MissingBottomholePressure)
    } else if bhp >= reservoir_pressure {
        Err(NeutralReason::BottomholeAboveReservoir)
    } else {
        Ok(())
    }
}

/// System-analysis inputs written before each solve.
struct SystemInputs {
    productivity_index: f64,
    reservoir_pressure: Option<f64>,
    watercut: f64,
    gor: f64,
    whp: f64,
    gas_lift_rate: Option<f64>,
}

#[derive(Clone, Copy)]
enum Spacing {
    Geometric,
    Linear,
}

impl Spacing {
    fn as_str(self) -> &'static str {
        match self {
            Self::Geometric => "Geometric Spacing",
            Self::Linear => "Linear Spacing",
        }
    }
}

/// One generated sensitivity of the lift table.
struct Sensitivity {
    slot: usize,
    variable: u32,
    generator: u32,
    first: f64,
    last: f64,
    count: u32,
    spacing: Spacing,
}

const GOR_SENSITIVITY: Sensitivity = Sensitivity {
    slot: 0,
    variable: 17,
    generator: 131,
    first: 30.0,
    last: 25_000.0,
    count: 10,
    spacing: Spacing::Geometric,
};

const WATERCUT_SENSITIVITY: Sensitivity = Sensitivity {
    slot: 1,
    variable: 16,
    generator: 6,
    first: 0.0,
    last: 99.0,
    count: 10,
    spacing: Spacing::Linear,
};

const MANIFOLD_PRESSURE_SENSITIVITY: Sensitivity = Sensitivity {
    slot: 2,
    variable: 27,
    generator: 145,
    first: 50.0,
    last: 2652.0,
    count: 10,
    spacing: Spacing::Linear,
};

const INJECTED_GLR_SENSITIVITY: Sensitivity = Sensitivity {
    slot: 3,
    variable: 23,
    generator: 139,
    first: 0.0,
    last: 25_600.0,
    count: 10,
    spacing: Spacing::Linear,
};

/// Tunes well models one at a time over a borrowed session.
pub struct WellTuner<'s, O: Oracle> {
    session: &'s mut Session<O>,
    settings: &'s WellTuningSettings,
}

impl<'s, O: Oracle> WellTuner<'s, O> {
    pub fn new(session: &'s mut Session<O>, settings: &'s WellTuningSettings) -> Self {
        Self { session, settings }
    }

    /// Tunes every job in order; the first fatal error ends the batch.
    pub fn tune_batch(&mut self, jobs: &[WellJob]) -> TuningResult<Vec<WellTuningReport>> {
        jobs.iter().map(|job| self.tune_well(job)).collect()
    }

    /// Opens the well model, tunes it, saves and closes it.
    ///
    /// On a fatal error after the model is open, the model is closed without
    /// saving before the error is returned.
    pub fn tune_well(&mut self, job: &WellJob) -> TuningResult<WellTuningReport> {
        info!(well = %job.well, model = %job.model.display(), "tuning well model");
        self.session.open_model(App::Prosper, &job.model)?;

        let tuned = self.tune_open_model(job).and_then(|report| {
            self.session.save_model(App::Prosper, &job.model)?;
            Ok(report)
        });
        match tuned {
            Ok(report) => {
                self.session.close_model(App::Prosper)?;
                info!(
                    well = %job.well,
                    tuned = %report.tuned,
                    outcome = ?report.outcome,
                    "well model tuned"
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(close) = self.session.close_model(App::Prosper) {
                    warn!(well = %job.well, error = %close, "could not close well model");
                }
                Err(e)
            }
        }
    }

    fn tune_open_model(&mut self, job: &WellJob) -> TuningResult<WellTuningReport> {
        let test = &job.test;
        let rows = self.shift_match_history()?;
        debug!(well = %job.well, rows, "shifted match history");
        self.write_test_row(test)?;

        let reservoir_pressure = match test.reservoir_pressure.filter(|p| *p > 0.0) {
            Some(p) => {
                self.session
                    .set(&prosper::match_field(0, MatchField::ReservoirPressure), p)?;
                p
            }
            None => self.session.get_f64(prosper::RESERVOIR_PRESSURE)?,
        };

        self.session.command(prosper::UVALUE_CALC)?;
        let u_value = self
            .session
            .get_f64(&prosper::match_field(0, MatchField::UValue))?;
        self.write_heat_transfer(u_value)?;

        let bhp = test.measured_bhp();
        let mut report = WellTuningReport {
            date: test.date,
            well: job.well.clone(),
            liquid_rate: test.liquid_rate(),
            watercut: test.watercut(),
            gor: test.gor(),
            whp: test.whp,
            bhp,
            wht: test.wht,
            u_value,
            reference: None,
            tuned: CoefficientPair::NEUTRAL,
            productivity_index: 0.0,
            reservoir_pressure,
            solved_liquid_rate: 0.0,
            solved_bhp: 0.0,
            outcome: WellOutcome::Neutral {
                reason: NeutralReason::MissingBottomholePressure,
            },
            search: None,
            lift_table: None,
        };

        match check_measurement(bhp, reservoir_pressure) {
            Ok(()) => self.tune_valid(job, &mut report)?,
            Err(reason) => {
                info!(well = %job.well, bhp, reservoir_pressure, ?reason, "measurement unusable, keeping neutral coefficients");
                report.outcome = WellOutcome::Neutral { reason };
                self.apply_neutral(test, &mut report)?;
            }
        }
        Ok(report)
    }

    fn tune_valid(&mut self, job: &WellJob, report: &mut WellTuningReport) -> TuningResult<()> {
        let test = &job.test;
        let correlation = self.settings.correlation.as_str();

        self.session.set(&prosper::correlation_label(correlation), 1)?;
        self.session.command(prosper::MATCH_CALC)?;
        let reference = self.read_coefficients()?;
        report.reference = Some(reference);

        self.session.slow_command(prosper::ADJUST_RESET)?;
        self.write_heat_transfer(report.u_value)?;
        self.session.set(prosper::PRODUCTIVITY_INDEX, ADJUSTMENT_PI)?;
        self.session.slow_command(prosper::ADJUST_CALC)?;
        self.session.slow_command(prosper::ADJUST_PI)?;
        report.productivity_index = self.amended_pi()?;

        self.write_system_inputs(&SystemInputs {
            productivity_index: report.productivity_index,
            reservoir_pressure: Some(report.reservoir_pressure),
            watercut: report.watercut,
            gor: report.gor,
            whp: test.whp,
            gas_lift_rate: Some(test.gas_lift_rate),
        })?;
        self.session.trigger_solve(SolveScope::WellSystem)?;

        let correction = select_correction(reference)?;
        debug!(well = %job.well, %reference, region = %correction.region(), "classified reference pair");
        match correction {
            Correction::NotNeeded { region } => {
                report.tuned = reference;
                report.outcome = WellOutcome::AcceptedAsIs { region };
            }
            Correction::Required {
                region,
                initial_guess,
                search_box,
            } => {
                let (tuned, summary) = self.search(report.bhp, initial_guess, &search_box)?;
                report.tuned = tuned;
                report.outcome = WellOutcome::Tuned { region };
                report.search = Some(summary);
            }
        }

        self.write_coefficients(report.tuned)?;
        self.solve_and_read(report)?;

        if self.settings.export_lift_tables {
            report.lift_table = Some(self.export_lift_table(&job.model, test.gas_lift_rate)?);
        }
        Ok(())
    }

    fn apply_neutral(&mut self, test: &WellTestRecord, report: &mut WellTuningReport) -> TuningResult<()> {
        self.session.slow_command(prosper::ADJUST_RESET)?;
        self.write_heat_transfer(report.u_value)?;
        self.write_coefficients(CoefficientPair::NEUTRAL)?;
        self.session.slow_command(prosper::ADJUST_CALC)?;
        self.session.slow_command(prosper::ADJUST_PI)?;
        report.productivity_index = self.amended_pi()?;

        self.write_system_inputs(&SystemInputs {
            productivity_index: report.productivity_index,
            reservoir_pressure: None,
            watercut: report.watercut,
            gor: report.gor,
            whp: test.whp,
            gas_lift_rate: None,
        })?;
        report.tuned = CoefficientPair::NEUTRAL;
        self.solve_and_read(report)
    }

    /// Minimizes the BHP mismatch inside `search_box`, seeded at `guess`
    /// clamped into the box.
    fn search(
        &mut self,
        measured_bhp: f64,
        guess: CoefficientPair,
        search_box: &SearchBox,
    ) -> TuningResult<(CoefficientPair, SearchSummary)> {
        let ctx = WellTuningContext::new(&self.settings.correlation, measured_bhp);
        let start = search_box.clamp(guess);
        let mut objective = PenalizedObjective::new(&mut *self.session);

        let result = minimize_bounded::<_, TuningError>(
            |x: &DVector<f64>| {
                let pair = CoefficientPair::new(x[0], x[1]);
                let simulated = objective.evaluate(|s| ctx.simulate(s, pair), || ctx.penalty())?;
                let value = ctx.mismatch(simulated);
                debug!(%pair, simulated, value, "well objective");
                Ok(value)
            },
            &DVector::from_row_slice(&start.to_array()),
            &search_box.intervals(),
            &self.settings.search,
        )?;
        let stats = objective.stats();

        let tuned = CoefficientPair::new(result.x[0], result.x[1]);
        Ok((
            tuned,
            SearchSummary {
                initial_guess: start,
                iterations: result.iterations,
                stats,
                objective: result.value,
                termination: result.termination,
            },
        ))
    }

    /// Copies every match-table row one slot down and enables it, leaving
    /// row 0 for the new test. Returns the number of rows moved.
    fn shift_match_history(&mut self) -> TuningResult<usize> {
        let count = self.session.get_f64(prosper::MATCH_COUNT)?;
        let rows = if count > 0.0 { count as usize } else { 0 };
        for row in (0..rows).rev() {
            for field in prosper::HISTORY_FIELDS {
                let value = self.session.get(&prosper::match_field(row, field))?;
                self.session.set(&prosper::match_field(row + 1, field), value)?;
            }
            self.session
                .set(&prosper::match_field(row + 1, MatchField::Enable), 1)?;
        }
        Ok(rows)
    }

    fn write_test_row(&mut self, test: &WellTestRecord) -> TuningResult<()> {
        let row = |field| prosper::match_field(0, field);
        self.session.set(
            &row(MatchField::Date),
            test.date.format("%m/%d/%Y").to_string(),
        )?;
        self.session.set(&row(MatchField::Gor), test.gor())?;
        self.session.set(&row(MatchField::Rate), test.liquid_rate())?;
        self.session.set(&row(MatchField::Watercut), test.watercut())?;
        self.session.set(&row(MatchField::WellheadPressure), test.whp)?;
        self.session.set(&row(MatchField::WellheadTemperature), test.wht)?;
        self.session.set(&row(MatchField::GaugePressure), test.measured_bhp())?;
        self.session.set(&row(MatchField::GasLiftRate), test.gas_lift_rate)?;
        Ok(())
    }

    fn write_heat_transfer(&mut self, u_value: f64) -> TuningResult<()> {
        self.session.set(prosper::HEAT_TRANSFER, u_value)?;
        self.session
            .set(&prosper::match_field(0, MatchField::UValue), u_value)?;
        Ok(())
    }

    fn amended_pi(&mut self) -> TuningResult<f64> {
        Ok(self
            .session
            .get_f64(&prosper::match_field(0, MatchField::AmendedPi))?)
    }

    fn read_coefficients(&mut self) -> TuningResult<CoefficientPair> {
        let correlation = self.settings.correlation.as_str();
        let cp1 = self
            .session
            .get_f64(&prosper::correlation_parameter(correlation, 0))?;
        let cp2 = self
            .session
            .get_f64(&prosper::correlation_parameter(correlation, 1))?;
        Ok(CoefficientPair::new(cp1, cp2))
    }

    fn write_coefficients(&mut self, pair: CoefficientPair) -> TuningResult<()> {
        let correlation = self.settings.correlation.as_str();
        self.session
            .set(&prosper::correlation_parameter(correlation, 0), pair.cp1)?;
        self.session
            .set(&prosper::correlation_parameter(correlation, 1), pair.cp2)?;
        Ok(())
    }

    fn write_system_inputs(&mut self, inputs: &SystemInputs) -> TuningResult<()> {
        self.session
            .set(prosper::PRODUCTIVITY_INDEX, inputs.productivity_index)?;
        if let Some(pres) = inputs.reservoir_pressure {
            self.session.set(prosper::RESERVOIR_PRESSURE, pres)?;
        }
        self.session.set(prosper::SYSTEM_WATERCUT, inputs.watercut)?;
        self.session.set(prosper::SYSTEM_GOR, inputs.gor)?;
        self.session
            .set(prosper::SYSTEM_TUBING, self.settings.correlation.as_str())?;
        self.session.set(prosper::SYSTEM_WHP, inputs.whp)?;
        if let Some(rate) = inputs.gas_lift_rate {
            self.session.set(prosper::GAS_LIFT_RATE, rate)?;
        }
        Ok(())
    }

    fn solve_and_read(&mut self, report: &mut WellTuningReport) -> TuningResult<()> {
        self.session.trigger_solve(SolveScope::WellSystem)?;
        report.solved_liquid_rate = self.session.get_f64(prosper::SOLVED_LIQUID_RATE)?;
        report.solved_bhp = self.session.get_f64(prosper::SOLVED_GAUGE_PRESSURE)?;
        Ok(())
    }

    /// Generates the lift-table sensitivities, calculates them and exports
    /// the table next to the model.
    fn export_lift_table(&mut self, model: &Path, gas_lift_rate: f64) -> TuningResult<PathBuf> {
        let correlation = self.settings.correlation.as_str();
        self.session.set(vlp::PIPE_LABEL, correlation)?;
        self.session.set(vlp::TUBING_LABEL, correlation)?;

        self.session.set(vlp::RATE_FIRST, 20.0)?;
        self.session.set(vlp::RATE_LAST, 50_000.0)?;
        self.session.set(vlp::RATE_NUMBER, 20)?;
        self.session.set(vlp::RATE_METHOD, Spacing::Geometric.as_str())?;
        self.session.command(vlp::GENERATE_RATES)?;

        self.write_sensitivity(&GOR_SENSITIVITY)?;
        self.write_sensitivity(&WATERCUT_SENSITIVITY)?;
        self.write_sensitivity(&MANIFOLD_PRESSURE_SENSITIVITY)?;
        if gas_lift_rate > 0.0 {
            self.write_sensitivity(&INJECTED_GLR_SENSITIVITY)?;
        }
        self.session.command(vlp::CALC)?;

        let table = lift_table_path(model);
        self.session
            .set(vlp::EXPORT_FILE, table.display().to_string())?;
        self.session.set(vlp::EXPORT_TYPE, "tpd")?;
        self.session.command(vlp::EXPORT)?;
        debug!(table = %table.display(), "exported lift table");
        Ok(table)
    }

    fn write_sensitivity(&mut self, sens: &Sensitivity) -> TuningResult<()> {
        let field = |name| vlp::sensitivity_generator(sens.generator, name);
        self.session
            .set(&vlp::sensitivity_variable(sens.slot), sens.variable as i32)?;
        self.session.set(&field("First"), sens.first)?;
        self.session.set(&field("Last"), sens.last)?;
        self.session.set(&field("Number"), sens.count as i32)?;
        self.session.set(&field("Method"), sens.spacing.as_str())?;
        self.session
            .set(&vlp::sensitivity_calc(sens.generator), sens.variable as i32)?;
        Ok(())
    }
}
