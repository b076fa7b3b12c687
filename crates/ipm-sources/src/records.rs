//! Measurement records in canonical units.

use chrono::NaiveDate;
use ipm_core::{FlowlineName, JointName, PipeName, WellName};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellStatus {
    Flowing,
    ShutIn,
    Unknown,
}

/// Production header a well is lined up to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Routing {
    HeaderA,
    HeaderB,
    Unknown,
}

/// Historian snapshot of one well over the window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WellInputRecord {
    pub well: WellName,
    pub status: WellStatus,
    pub routing: Routing,
    pub whp: Option<f64>,
    pub bhp: Option<f64>,
    pub wht: Option<f64>,
    pub choke_dp: Option<f64>,
    pub gas_lift_rate: Option<f64>,
}

/// Latest allocation test of a well, with the reservoir pressure in force at
/// the same date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WellTestRecord {
    pub well: WellName,
    pub date: NaiveDate,
    pub oil_rate: f64,
    pub water_rate: f64,
    pub gas_rate: f64,
    pub gas_lift_rate: f64,
    pub whp: f64,
    pub bhp: f64,
    pub wht: f64,
    pub reservoir_pressure: Option<f64>,
}

impl WellTestRecord {
    pub fn liquid_rate(&self) -> f64 {
        self.oil_rate + self.water_rate
    }

    /// Watercut in percent; zero for a test without liquid.
    pub fn watercut(&self) -> f64 {
        ipm_core::ratio_or_zero(self.water_rate, self.liquid_rate()) * 100.0
    }

    /// Producing GOR in scf/STB; zero for a test without oil.
    pub fn gor(&self) -> f64 {
        ipm_core::ratio_or_zero(self.gas_rate * 1.0e6, self.oil_rate)
    }

    /// Measured BHP with negative readings treated as no reading.
    pub fn measured_bhp(&self) -> f64 {
        self.bhp.max(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    Pressure,
    GasRate,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifoldProperty {
    FlowlinePressure,
    RiserGasLiftRate,
    SeparatorPressure,
    Other,
}

/// One manifold measurement with its network placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifoldRecord {
    pub joint: JointName,
    pub measurement: MeasurementType,
    pub property: ManifoldProperty,
    pub flowline: FlowlineName,
    pub commingled_flowline: FlowlineName,
    pub pipe: PipeName,
    pub value: Option<f64>,
}

/// Multiphase meter rates of one well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeterRates {
    pub well: WellName,
    pub oil_rate: Option<f64>,
    pub water_rate: Option<f64>,
    pub gas_rate: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record(oil: f64, water: f64, gas: f64) -> WellTestRecord {
        WellTestRecord {
            well: "A1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            oil_rate: oil,
            water_rate: water,
            gas_rate: gas,
            gas_lift_rate: 0.0,
            whp: 200.0,
            bhp: -3.0,
            wht: 120.0,
            reservoir_pressure: None,
        }
    }

    #[test]
    fn derived_quantities() {
        let t = test_record(500.0, 100.0, 0.25);
        assert_eq!(t.liquid_rate(), 600.0);
        assert!((t.watercut() - 100.0 / 6.0).abs() < 1e-12);
        assert!((t.gor() - 500.0).abs() < 1e-9);
        assert_eq!(t.measured_bhp(), 0.0);
    }

    #[test]
    fn dry_test_has_zero_ratios() {
        let t = test_record(0.0, 0.0, 0.1);
        assert_eq!(t.watercut(), 0.0);
        assert_eq!(t.gor(), 0.0);
    }
}
