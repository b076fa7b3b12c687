//! Flowline grouping of manifold pressure measurements.
//!
//! Each flowline's pressure records form one group. Within a group the
//! upstream end is the joint with the highest measured pressure and the
//! downstream end the joint with the lowest, scanning in record order so the
//! first occurrence wins a tie. Records without a value take no part in the
//! endpoint scan.

use std::collections::{BTreeMap, BTreeSet};

use ipm_core::{FlowlineName, JointName, PipeName};
use ipm_sources::{ManifoldProperty, ManifoldRecord};
use serde::{Deserialize, Serialize};

/// Measured pressure at one joint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointMeasurement {
    pub joint: JointName,
    pub pressure: f64,
}

impl JointMeasurement {
    pub fn new(joint: impl Into<JointName>, pressure: f64) -> Self {
        Self {
            joint: joint.into(),
            pressure,
        }
    }
}

/// Joints and pipes of one flowline sharing flow, with its two ends.
#[derive(Clone, Debug, PartialEq)]
pub struct WellGroup {
    pub flowline: FlowlineName,
    /// Logical network the group is solved in; differs from `flowline` when
    /// the flowline is commingled into another.
    pub network: FlowlineName,
    pub upstream: JointMeasurement,
    pub downstream: JointMeasurement,
    /// Distinct pipes of the group, sorted by name.
    pub pipes: Vec<PipeName>,
}

impl WellGroup {
    /// Splits the joints of every flowline-pressure record into those outside
    /// this group's network (to mask) and those inside it (to unmask).
    pub fn mask_partition(&self, records: &[ManifoldRecord]) -> MaskPartition {
        let mut partition = MaskPartition::default();
        for r in pressure_records(records) {
            let side = if r.commingled_flowline == self.network {
                &mut partition.unmask
            } else {
                &mut partition.mask
            };
            if !side.contains(&r.joint) {
                side.push(r.joint.clone());
            }
        }
        partition
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaskPartition {
    pub mask: Vec<JointName>,
    pub unmask: Vec<JointName>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// No record of the flowline carries a value.
    NoMeasurements,
    /// An endpoint pressure is zero or negative.
    NonPositivePressure { upstream: f64, downstream: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum GroupPlan {
    Tunable(WellGroup),
    Skipped {
        flowline: FlowlineName,
        reason: SkipReason,
    },
}

fn pressure_records(records: &[ManifoldRecord]) -> impl Iterator<Item = &ManifoldRecord> {
    records
        .iter()
        .filter(|r| r.property == ManifoldProperty::FlowlinePressure)
}

/// Distinct joints of every flowline-pressure record, in record order.
pub fn pressure_joints(records: &[ManifoldRecord]) -> Vec<JointName> {
    let mut joints: Vec<JointName> = Vec::new();
    for r in pressure_records(records) {
        if !joints.contains(&r.joint) {
            joints.push(r.joint.clone());
        }
    }
    joints
}

/// Plans one group per flowline, ordered by flowline name.
pub fn plan_groups(records: &[ManifoldRecord]) -> Vec<GroupPlan> {
    let mut by_flowline: BTreeMap<&FlowlineName, Vec<&ManifoldRecord>> = BTreeMap::new();
    for r in pressure_records(records) {
        by_flowline.entry(&r.flowline).or_default().push(r);
    }
    by_flowline
        .into_iter()
        .map(|(flowline, rows)| plan_group(flowline, &rows))
        .collect()
}

fn plan_group(flowline: &FlowlineName, rows: &[&ManifoldRecord]) -> GroupPlan {
    let mut upstream: Option<JointMeasurement> = None;
    let mut downstream: Option<JointMeasurement> = None;
    for r in rows {
        let Some(p) = r.value.filter(|v| v.is_finite()) else {
            continue;
        };
        if upstream.as_ref().is_none_or(|u| p > u.pressure) {
            upstream = Some(JointMeasurement::new(r.joint.clone(), p));
        }
        if downstream.as_ref().is_none_or(|d| p < d.pressure) {
            downstream = Some(JointMeasurement::new(r.joint.clone(), p));
        }
    }

    let (Some(upstream), Some(downstream)) = (upstream, downstream) else {
        return GroupPlan::Skipped {
            flowline: flowline.clone(),
            reason: SkipReason::NoMeasurements,
        };
    };
    if upstream.pressure <= 0.0 || downstream.pressure <= 0.0 {
        return GroupPlan::Skipped {
            flowline: flowline.clone(),
            reason: SkipReason::NonPositivePressure {
                upstream: upstream.pressure,
                downstream: downstream.pressure,
            },
        };
    }

    let network = rows
        .iter()
        .rev()
        .find(|r| r.commingled_flowline != r.flowline)
        .map_or_else(|| flowline.clone(), |r| r.commingled_flowline.clone());
    let pipes: BTreeSet<&PipeName> = rows.iter().map(|r| &r.pipe).collect();

    GroupPlan::Tunable(WellGroup {
        flowline: flowline.clone(),
        network,
        upstream,
        downstream,
        pipes: pipes.into_iter().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use ipm_sources::MeasurementType;

    use super::*;

    fn record(joint: &str, flowline: &str, commingled: &str, pipe: &str, value: Option<f64>) -> ManifoldRecord {
        ManifoldRecord {
            joint: joint.into(),
            measurement: MeasurementType::Pressure,
            property: ManifoldProperty::FlowlinePressure,
            flowline: flowline.into(),
            commingled_flowline: commingled.into(),
            pipe: pipe.into(),
            value,
        }
    }

    fn tunable(plan: &GroupPlan) -> &WellGroup {
        match plan {
            GroupPlan::Tunable(group) => group,
            GroupPlan::Skipped { flowline, reason } => panic!("{flowline} skipped: {reason:?}"),
        }
    }

    #[test]
    fn endpoints_are_max_and_min() {
        let records = [
            record("A", "FL1", "FL1", "P1", Some(80.0)),
            record("B", "FL1", "FL1", "P2", Some(120.0)),
            record("C", "FL1", "FL1", "P3", Some(60.0)),
        ];
        let plans = plan_groups(&records);
        let group = tunable(&plans[0]);
        assert_eq!(group.upstream, JointMeasurement::new("B", 120.0));
        assert_eq!(group.downstream, JointMeasurement::new("C", 60.0));
        assert_eq!(group.pipes.len(), 3);
    }

    #[test]
    fn ties_keep_first_occurrence() {
        let records = [
            record("A", "FL1", "FL1", "P1", Some(100.0)),
            record("B", "FL1", "FL1", "P1", Some(100.0)),
            record("C", "FL1", "FL1", "P1", Some(50.0)),
            record("D", "FL1", "FL1", "P1", Some(50.0)),
        ];
        let group = tunable(&plan_groups(&records)[0]).clone();
        assert_eq!(group.upstream.joint, JointName::new("A"));
        assert_eq!(group.downstream.joint, JointName::new("C"));
        assert_eq!(group.pipes, vec![PipeName::new("P1")]);
    }

    #[test]
    fn absent_values_are_ignored() {
        let records = [
            record("A", "FL1", "FL1", "P1", None),
            record("B", "FL1", "FL1", "P1", Some(90.0)),
            record("C", "FL1", "FL1", "P1", Some(70.0)),
        ];
        let group = tunable(&plan_groups(&records)[0]).clone();
        assert_eq!(group.upstream.joint, JointName::new("B"));
        assert_eq!(group.downstream.joint, JointName::new("C"));
    }

    #[test]
    fn groups_skip_independently() {
        let records = [
            record("A", "FL1", "FL1", "P1", None),
            record("B", "FL2", "FL2", "P2", Some(0.0)),
            record("C", "FL2", "FL2", "P2", Some(40.0)),
            record("D", "FL3", "FL3", "P3", Some(90.0)),
            record("E", "FL3", "FL3", "P4", Some(70.0)),
        ];
        let plans = plan_groups(&records);
        assert_eq!(plans.len(), 3);
        assert!(matches!(
            plans[0],
            GroupPlan::Skipped { reason: SkipReason::NoMeasurements, .. }
        ));
        assert!(matches!(
            plans[1],
            GroupPlan::Skipped { reason: SkipReason::NonPositivePressure { .. }, .. }
        ));
        assert_eq!(tunable(&plans[2]).flowline, FlowlineName::new("FL3"));
    }

    #[test]
    fn other_properties_are_not_grouped() {
        let mut gl = record("A", "FL1", "FL1", "P1", Some(3.0));
        gl.property = ManifoldProperty::RiserGasLiftRate;
        assert!(plan_groups(&[gl]).is_empty());
    }

    #[test]
    fn commingled_flowline_defines_the_network() {
        let records = [
            record("A", "FL1", "FL1", "P1", Some(150.0)),
            record("B", "FL1", "FL12", "P2", Some(110.0)),
            record("C", "FL2", "FL12", "P3", Some(130.0)),
            record("D", "FL3", "FL3", "P4", Some(90.0)),
        ];
        let plans = plan_groups(&records);
        let fl1 = tunable(&plans[0]);
        assert_eq!(fl1.network, FlowlineName::new("FL12"));

        let partition = fl1.mask_partition(&records);
        assert_eq!(partition.unmask, vec![JointName::new("B"), JointName::new("C")]);
        assert_eq!(partition.mask, vec![JointName::new("A"), JointName::new("D")]);

        let fl3 = tunable(&plans[2]);
        assert_eq!(fl3.network, FlowlineName::new("FL3"));
        assert_eq!(fl3.mask_partition(&records).unmask, vec![JointName::new("D")]);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn endpoints_bound_every_present_value(
                values in prop::collection::vec(prop::option::of(1.0f64..500.0), 1..12)
            ) {
                let records: Vec<ManifoldRecord> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| record(&format!("J{i}"), "FL", "FL", "P", *v))
                    .collect();
                let plans = plan_groups(&records);
                prop_assert_eq!(plans.len(), 1);
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                match &plans[0] {
                    GroupPlan::Tunable(group) => {
                        for v in &present {
                            prop_assert!(group.upstream.pressure >= *v);
                            prop_assert!(group.downstream.pressure <= *v);
                        }
                        prop_assert!(present.contains(&group.upstream.pressure));
                        prop_assert!(present.contains(&group.downstream.pressure));
                    }
                    GroupPlan::Skipped { reason, .. } => {
                        prop_assert!(present.is_empty());
                        prop_assert_eq!(*reason, SkipReason::NoMeasurements);
                    }
                }
            }
        }
    }
}
