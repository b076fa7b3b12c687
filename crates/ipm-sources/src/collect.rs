//! Collection of measurements into canonical-unit records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ipm_core::{FlowlineName, JointName, PipeName, TagName, WellName};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SourceResult;
use crate::historian::Historian;
use crate::records::{
    ManifoldProperty, ManifoldRecord, MeasurementType, MeterRates, Routing, WellInputRecord,
    WellStatus, WellTestRecord,
};
use crate::units::SourceUnits;
use crate::well_tests::{TestUsage, WellTestSource};
use crate::window::TimeWindow;

/// Historian tags and database identity of one well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WellTags {
    pub well: WellName,
    /// Completion name in the well-test database.
    pub completion: String,
    #[serde(default)]
    pub status: Option<TagName>,
    #[serde(default)]
    pub routing: Option<TagName>,
    #[serde(default)]
    pub whp: Option<TagName>,
    #[serde(default)]
    pub bhp: Option<TagName>,
    #[serde(default)]
    pub wht: Option<TagName>,
    #[serde(default)]
    pub choke_dp: Option<TagName>,
    #[serde(default)]
    pub gas_lift: Option<TagName>,
    #[serde(default)]
    pub meter_oil: Option<TagName>,
    #[serde(default)]
    pub meter_water: Option<TagName>,
    #[serde(default)]
    pub meter_gas: Option<TagName>,
}

/// Historian tag of one manifold measurement and its network placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifoldTag {
    pub tag: TagName,
    pub joint: JointName,
    pub measurement: MeasurementType,
    pub property: ManifoldProperty,
    pub flowline: FlowlineName,
    /// Defaults to `flowline` when the flowline is not commingled.
    #[serde(default)]
    pub commingled_flowline: Option<FlowlineName>,
    pub pipe: PipeName,
}

fn present_tags<'a>(tags: impl Iterator<Item = &'a Option<TagName>>) -> Vec<TagName> {
    tags.flatten().cloned().collect()
}

fn averages_by_tag<H: Historian + ?Sized>(
    historian: &H,
    tags: Vec<TagName>,
    window: &TimeWindow,
) -> SourceResult<BTreeMap<TagName, f64>> {
    if tags.is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(historian
        .time_averaged(&tags, window)?
        .into_iter()
        .filter_map(|a| a.value.map(|v| (a.tag, v)))
        .collect())
}

fn last_samples<H: Historian + ?Sized>(
    historian: &H,
    tags: Vec<TagName>,
    window: &TimeWindow,
) -> SourceResult<BTreeMap<TagName, f64>> {
    if tags.is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(historian
        .interpolated(&tags, window)?
        .into_iter()
        .filter_map(|s| s.last().map(|v| (s.tag, v)))
        .collect())
}

fn lookup(values: &BTreeMap<TagName, f64>, tag: &Option<TagName>) -> Option<f64> {
    tag.as_ref().and_then(|t| values.get(t).copied())
}

/// Status, routing, pressures, temperature, choke ΔP and lift gas per well.
///
/// Status is flowing when the last interpolated status sample is 0; routing
/// is header A when the last routing sample is 1.
pub fn collect_well_inputs<H: Historian + ?Sized>(
    historian: &H,
    wells: &[WellTags],
    window: &TimeWindow,
    units: &SourceUnits,
) -> SourceResult<Vec<WellInputRecord>> {
    let discrete = last_samples(
        historian,
        present_tags(wells.iter().flat_map(|w| [&w.status, &w.routing])),
        window,
    )?;
    let averages = averages_by_tag(
        historian,
        present_tags(
            wells
                .iter()
                .flat_map(|w| [&w.whp, &w.bhp, &w.wht, &w.choke_dp, &w.gas_lift]),
        ),
        window,
    )?;

    let records: Vec<WellInputRecord> = wells
        .iter()
        .map(|w| WellInputRecord {
            well: w.well.clone(),
            status: match lookup(&discrete, &w.status) {
                Some(v) if v == 0.0 => WellStatus::Flowing,
                Some(_) => WellStatus::ShutIn,
                None => WellStatus::Unknown,
            },
            routing: match lookup(&discrete, &w.routing) {
                Some(v) if v == 1.0 => Routing::HeaderA,
                Some(_) => Routing::HeaderB,
                None => Routing::Unknown,
            },
            whp: lookup(&averages, &w.whp).map(|v| units.pressure(v)),
            bhp: lookup(&averages, &w.bhp).map(|v| units.pressure(v)),
            wht: lookup(&averages, &w.wht).map(|v| units.temperature(v)),
            choke_dp: lookup(&averages, &w.choke_dp).map(|v| units.pressure(v)),
            gas_lift_rate: lookup(&averages, &w.gas_lift).map(|v| units.gas_rate(v)),
        })
        .collect();
    debug!(wells = records.len(), "collected well inputs");
    Ok(records)
}

/// Manifold measurements; values are converted by measurement type.
pub fn collect_manifold_inputs<H: Historian + ?Sized>(
    historian: &H,
    tags: &[ManifoldTag],
    window: &TimeWindow,
    units: &SourceUnits,
) -> SourceResult<Vec<ManifoldRecord>> {
    let averages = averages_by_tag(
        historian,
        tags.iter().map(|t| t.tag.clone()).collect(),
        window,
    )?;
    Ok(tags
        .iter()
        .map(|t| {
            let raw = averages.get(&t.tag).copied();
            let value = raw.map(|v| match t.measurement {
                MeasurementType::Pressure => units.pressure(v),
                MeasurementType::GasRate => units.gas_rate(v),
                MeasurementType::Other => v,
            });
            ManifoldRecord {
                joint: t.joint.clone(),
                measurement: t.measurement,
                property: t.property,
                flowline: t.flowline.clone(),
                commingled_flowline: t
                    .commingled_flowline
                    .clone()
                    .unwrap_or_else(|| t.flowline.clone()),
                pipe: t.pipe.clone(),
                value,
            }
        })
        .collect())
}

/// Multiphase meter oil, water and gas rates per well.
pub fn collect_meter_rates<H: Historian + ?Sized>(
    historian: &H,
    wells: &[WellTags],
    window: &TimeWindow,
    units: &SourceUnits,
) -> SourceResult<Vec<MeterRates>> {
    let averages = averages_by_tag(
        historian,
        present_tags(
            wells
                .iter()
                .flat_map(|w| [&w.meter_oil, &w.meter_water, &w.meter_gas]),
        ),
        window,
    )?;
    Ok(wells
        .iter()
        .map(|w| MeterRates {
            well: w.well.clone(),
            oil_rate: lookup(&averages, &w.meter_oil).map(|v| units.liquid_rate(v)),
            water_rate: lookup(&averages, &w.meter_water).map(|v| units.liquid_rate(v)),
            gas_rate: lookup(&averages, &w.meter_gas).map(|v| units.gas_rate(v)),
        })
        .collect())
}

/// Latest allocation test on or before `as_of` for each well, paired with the
/// latest mid-perforation reservoir pressure on or before the same date.
///
/// Wells without an allocation test are left out.
pub fn latest_well_tests<S: WellTestSource + ?Sized>(
    source: &S,
    wells: &[WellTags],
    as_of: NaiveDate,
    units: &SourceUnits,
) -> SourceResult<Vec<WellTestRecord>> {
    let mut records = Vec::with_capacity(wells.len());
    for w in wells {
        let latest = source
            .well_tests(&w.completion, as_of)?
            .into_iter()
            .filter(|t| t.usage == TestUsage::Allocation && t.start_date <= as_of)
            .max_by_key(|t| t.start_date);
        let Some(test) = latest else {
            warn!(well = %w.well, completion = %w.completion, %as_of, "no allocation test");
            continue;
        };

        let reservoir_pressure = source
            .reservoir_pressures(&w.completion, as_of)?
            .into_iter()
            .filter(|r| r.test_date <= as_of && r.mid_perf_pressure.is_some())
            .max_by_key(|r| r.test_date)
            .and_then(|r| r.mid_perf_pressure)
            .map(|p| units.pressure(p));

        records.push(WellTestRecord {
            well: w.well.clone(),
            date: test.start_date,
            oil_rate: units.liquid_rate(test.oil_rate),
            water_rate: units.liquid_rate(test.water_rate),
            gas_rate: units.gas_rate(test.gas_rate),
            gas_lift_rate: units.gas_rate(test.gas_lift_rate),
            whp: test.whp.map_or(0.0, |v| units.pressure(v)),
            bhp: test.bhp.map_or(0.0, |v| units.pressure(v)),
            wht: test.wht.map_or(0.0, |v| units.temperature(v)),
            reservoir_pressure,
        });
    }
    Ok(records)
}
