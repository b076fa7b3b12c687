use ipm_core::{GasRateUnit, LiquidRateUnit, PressureUnit, TemperatureUnit};
use serde::{Deserialize, Serialize};

/// Native units of one data source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceUnits {
    pub pressure: PressureUnit,
    pub temperature: TemperatureUnit,
    pub liquid_rate: LiquidRateUnit,
    pub gas_rate: GasRateUnit,
}

impl SourceUnits {
    /// Typical historian units: bar, degC, hourly cubic meters.
    pub fn metric_hourly() -> Self {
        Self {
            pressure: PressureUnit::Bar,
            temperature: TemperatureUnit::Celsius,
            liquid_rate: LiquidRateUnit::CubicMetersPerHour,
            gas_rate: GasRateUnit::CubicMetersPerHour,
        }
    }

    /// Typical well-test database units: kPa, degC, daily cubic meters.
    pub fn metric_daily() -> Self {
        Self {
            pressure: PressureUnit::Kilopascal,
            temperature: TemperatureUnit::Celsius,
            liquid_rate: LiquidRateUnit::CubicMetersPerDay,
            gas_rate: GasRateUnit::CubicMetersPerDay,
        }
    }

    /// Pressure (or pressure difference) in psi.
    pub fn pressure(&self, v: f64) -> f64 {
        self.pressure.to_psia(v)
    }

    pub fn temperature(&self, v: f64) -> f64 {
        self.temperature.to_degf(v)
    }

    pub fn liquid_rate(&self, v: f64) -> f64 {
        self.liquid_rate.to_stb_per_day(v)
    }

    pub fn gas_rate(&self, v: f64) -> f64 {
        self.gas_rate.to_mmscf_per_day(v)
    }
}
