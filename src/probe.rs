//! Solve-then-verify check for a single target position.

use crate::kinematics::{JointVector, Kinematics, KinematicsError};
use glam::DVec3;

/// Why a target was classified as unreached.
#[derive(Clone, Debug, PartialEq)]
pub enum UnreachedReason {
    /// FK of the IK solution misses the target; holds the per-axis absolute error.
    OutOfTolerance(DVec3),
    /// The solver itself failed.
    Solver(KinematicsError),
}

/// Result of probing one target.
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeOutcome {
    Reached { joints: JointVector, error: DVec3 },
    Unreached(UnreachedReason),
}

impl ProbeOutcome {
    pub fn is_reached(&self) -> bool {
        matches!(self, Self::Reached { .. })
    }

    pub fn into_joints(self) -> Option<JointVector> {
        match self {
            Self::Reached { joints, .. } => Some(joints),
            Self::Unreached(_) => None,
        }
    }
}

/// Accepts an IK solution when its forward position lies within `tolerance`
/// of the target on every axis (a box, not a sphere).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReachProbe {
    pub tolerance: f64,
}

impl ReachProbe {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Returns the joint vector when `target` is reached, `None` otherwise.
    pub fn probe<K: Kinematics + ?Sized>(&self, kinematics: &K, target: DVec3) -> Option<JointVector> {
        self.verify(kinematics, target).into_joints()
    }

    /// One IK attempt followed by an FK check. No retries.
    pub fn verify<K: Kinematics + ?Sized>(&self, kinematics: &K, target: DVec3) -> ProbeOutcome {
        let joints = match kinematics.solve_inverse(target) {
            Ok(joints) => joints,
            Err(e) => return ProbeOutcome::Unreached(UnreachedReason::Solver(e)),
        };
        let computed = match kinematics.solve_forward(&joints) {
            Ok(p) => p,
            Err(e) => return ProbeOutcome::Unreached(UnreachedReason::Solver(e)),
        };

        let error = (computed - target).abs();
        log::trace!("target {target:?}: computed {computed:?}, error {error:?}");

        // NaN compares false, so a non-finite position never passes.
        if error.cmple(DVec3::splat(self.tolerance)).all() {
            ProbeOutcome::Reached { joints, error }
        } else {
            ProbeOutcome::Unreached(UnreachedReason::OutOfTolerance(error))
        }
    }
}
