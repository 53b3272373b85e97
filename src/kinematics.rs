//! The kinematics contract consumed by the reach engine.
//!
//! Anything that can map a target position to a joint configuration (IK) and a joint
//! configuration back to an end-effector position (FK) can be scanned. The engine
//! never looks inside the solver; it only checks that the two directions agree.

use glam::DVec3;
use thiserror::Error;

/// A joint configuration, one entry per active (non-fixed) joint, in chain order.
pub type JointVector = Vec<f64>;

/// Failures reported by a [`Kinematics`] implementation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum KinematicsError {
    #[error("Expected {expected} joint values, got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },

    #[error("Solver produced a non-finite result")]
    NonFinite,

    #[error("Invalid kinematic model: {0}")]
    InvalidModel(String),
}

/// Inverse and forward kinematics of a manipulator.
///
/// Both directions must be pure functions of their input for the duration of a scan.
pub trait Kinematics {
    /// Returns a joint configuration that should place the end-effector at `target`.
    fn solve_inverse(&self, target: DVec3) -> Result<JointVector, KinematicsError>;

    /// Returns the end-effector position for `joints`.
    fn solve_forward(&self, joints: &[f64]) -> Result<DVec3, KinematicsError>;
}

impl<K: Kinematics + ?Sized> Kinematics for &K {
    fn solve_inverse(&self, target: DVec3) -> Result<JointVector, KinematicsError> {
        (**self).solve_inverse(target)
    }

    fn solve_forward(&self, joints: &[f64]) -> Result<DVec3, KinematicsError> {
        (**self).solve_forward(joints)
    }
}
