//! Mask state of network joints during a pipeline pass.

use std::collections::BTreeMap;

use ipm_core::JointName;
use ipm_oracle::paths::gap;
use ipm_oracle::{Oracle, OracleResult, Session};
use tracing::{debug, warn};

use crate::group::MaskPartition;

/// Last mask state written for each joint in this pass.
#[derive(Debug, Default)]
pub struct MaskLedger {
    state: BTreeMap<JointName, bool>,
}

impl MaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<O: Oracle>(
        &mut self,
        session: &mut Session<O>,
        joint: &JointName,
        masked: bool,
    ) -> OracleResult<()> {
        session.command(&gap::mask_command(&gap::joint(joint.as_str()), masked))?;
        self.state.insert(joint.clone(), masked);
        Ok(())
    }

    /// Masks then unmasks the joints of `partition`.
    pub fn apply<O: Oracle>(
        &mut self,
        session: &mut Session<O>,
        partition: &MaskPartition,
    ) -> OracleResult<()> {
        for joint in &partition.mask {
            self.set(session, joint, true)?;
        }
        for joint in &partition.unmask {
            self.set(session, joint, false)?;
        }
        debug!(
            masked = partition.mask.len(),
            unmasked = partition.unmask.len(),
            "applied joint masks"
        );
        Ok(())
    }

    /// Unmasks every joint in `joints`, attempting all of them even when one
    /// fails; the first failure is returned.
    pub fn unmask_all<O: Oracle>(
        &mut self,
        session: &mut Session<O>,
        joints: &[JointName],
    ) -> OracleResult<()> {
        let mut first_error = None;
        for joint in joints {
            if let Err(e) = self.set(session, joint, false) {
                warn!(joint = %joint, error = %e, "failed to unmask joint");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Joints currently masked by this pass.
    pub fn masked(&self) -> impl Iterator<Item = &JointName> {
        self.state
            .iter()
            .filter_map(|(joint, masked)| masked.then_some(joint))
    }
}
