// ipm-core/src/units.rs
//
// The tuning core works in one canonical oilfield unit system:
// pressure psia, temperature degF, liquid rate STB/d, gas rate MMscf/d.
// Sources report in whatever the plant uses; conversion happens once, here.

use core::str::FromStr;

use uom::si::f64::{
    Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature, Time,
    Volume, VolumeRate as UomVolumeRate,
};

use crate::{IpmError, IpmResult};

pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn psia(v: f64) -> Pressure {
    use uom::si::pressure::pound_force_per_square_inch;
    Pressure::new::<pound_force_per_square_inch>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn kpa(v: f64) -> Pressure {
    use uom::si::pressure::kilopascal;
    Pressure::new::<kilopascal>(v)
}

#[inline]
pub fn as_psia(p: Pressure) -> f64 {
    use uom::si::pressure::pound_force_per_square_inch;
    p.get::<pound_force_per_square_inch>()
}

#[inline]
pub fn degf(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_fahrenheit;
    Temperature::new::<degree_fahrenheit>(v)
}

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn as_degf(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_fahrenheit;
    t.get::<degree_fahrenheit>()
}

#[inline]
pub fn cubic_meters_per_hour(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_hour;
    VolumeRate::new::<cubic_meter_per_hour>(v)
}

#[inline]
pub fn cubic_meters_per_day(v: f64) -> VolumeRate {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v) / one_day()
}

#[inline]
pub fn stb_per_day(v: f64) -> VolumeRate {
    use uom::si::volume::barrel;
    Volume::new::<barrel>(v) / one_day()
}

#[inline]
pub fn as_stb_per_day(q: VolumeRate) -> f64 {
    use uom::si::volume::barrel;
    let daily: Volume = q * one_day();
    daily.get::<barrel>()
}

#[inline]
pub fn as_mmscf_per_day(q: VolumeRate) -> f64 {
    use uom::si::volume::cubic_foot;
    let daily: Volume = q * one_day();
    daily.get::<cubic_foot>() / 1.0e6
}

fn one_day() -> Time {
    use uom::si::time::day;
    Time::new::<day>(1.0)
}

/// Native pressure unit of a data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PressureUnit {
    Bar,
    Kilopascal,
    #[default]
    Psia,
}

impl PressureUnit {
    pub fn to_psia(self, v: f64) -> f64 {
        match self {
            Self::Bar => as_psia(bar(v)),
            Self::Kilopascal => as_psia(kpa(v)),
            Self::Psia => v,
        }
    }
}

impl FromStr for PressureUnit {
    type Err = IpmError;

    fn from_str(s: &str) -> IpmResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "bar" | "bara" => Ok(Self::Bar),
            "kpa" | "kilopascal" => Ok(Self::Kilopascal),
            "psi" | "psia" => Ok(Self::Psia),
            other => Err(IpmError::UnknownUnit {
                unit: other.to_string(),
                quantity: "pressure",
            }),
        }
    }
}

/// Native temperature unit of a data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn to_degf(self, v: f64) -> f64 {
        match self {
            Self::Celsius => as_degf(degc(v)),
            Self::Fahrenheit => v,
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = IpmError;

    fn from_str(s: &str) -> IpmResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "c" | "degc" | "celsius" => Ok(Self::Celsius),
            "f" | "degf" | "fahrenheit" => Ok(Self::Fahrenheit),
            other => Err(IpmError::UnknownUnit {
                unit: other.to_string(),
                quantity: "temperature",
            }),
        }
    }
}

/// Native liquid volume-rate unit of a data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LiquidRateUnit {
    CubicMetersPerHour,
    CubicMetersPerDay,
    #[default]
    BarrelsPerDay,
}

impl LiquidRateUnit {
    pub fn to_stb_per_day(self, v: f64) -> f64 {
        match self {
            Self::CubicMetersPerHour => as_stb_per_day(cubic_meters_per_hour(v)),
            Self::CubicMetersPerDay => as_stb_per_day(cubic_meters_per_day(v)),
            Self::BarrelsPerDay => v,
        }
    }
}

/// Native gas volume-rate unit of a data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GasRateUnit {
    CubicMetersPerHour,
    CubicMetersPerDay,
    #[default]
    MmscfPerDay,
}

impl GasRateUnit {
    pub fn to_mmscf_per_day(self, v: f64) -> f64 {
        match self {
            Self::CubicMetersPerHour => as_mmscf_per_day(cubic_meters_per_hour(v)),
            Self::CubicMetersPerDay => as_mmscf_per_day(cubic_meters_per_day(v)),
            Self::MmscfPerDay => v,
        }
    }
}
