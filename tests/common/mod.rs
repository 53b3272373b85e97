// tests/common/mod.rs
#![allow(dead_code)]

use glam::DVec3;
use robot_reach::{ChainJoint, JointVector, KinematicChain, Kinematics, KinematicsError};

/// Point robot that can reach anything within `radius` of the origin.
///
/// IK returns the target itself as the "joint vector", pulled back onto the sphere
/// when it lies outside; FK reads the joints back as a position.
pub struct SphereReach {
    pub radius: f64,
}

impl Kinematics for SphereReach {
    fn solve_inverse(&self, target: DVec3) -> Result<JointVector, KinematicsError> {
        let p = target.clamp_length_max(self.radius);
        Ok(vec![p.x, p.y, p.z])
    }

    fn solve_forward(&self, joints: &[f64]) -> Result<DVec3, KinematicsError> {
        match joints {
            [x, y, z] => Ok(DVec3::new(*x, *y, *z)),
            _ => Err(KinematicsError::JointCountMismatch {
                expected: 3,
                actual: joints.len(),
            }),
        }
    }
}

/// A solver that always fails.
pub struct NoSolution;

impl Kinematics for NoSolution {
    fn solve_inverse(&self, _: DVec3) -> Result<JointVector, KinematicsError> {
        Err(KinematicsError::NonFinite)
    }

    fn solve_forward(&self, _: &[f64]) -> Result<DVec3, KinematicsError> {
        Err(KinematicsError::NonFinite)
    }
}

/// Three limited prismatic axes: a cube of side `2 * reach` around the origin.
pub fn gantry(reach: f64) -> KinematicChain {
    KinematicChain::new(DVec3::ZERO)
        .with_joint(ChainJoint::prismatic("x", DVec3::ZERO, DVec3::X).with_limits(-reach, reach))
        .with_joint(ChainJoint::prismatic("y", DVec3::ZERO, DVec3::Y).with_limits(-reach, reach))
        .with_joint(ChainJoint::prismatic("z", DVec3::ZERO, DVec3::Z).with_limits(-reach, reach))
}

/// World position probed for a map index.
pub fn target_of(index: [usize; 3], half_extents: [usize; 3], conversion: u32) -> DVec3 {
    let c = f64::from(conversion);
    DVec3::new(
        (index[0] as i64 - half_extents[0] as i64) as f64 / c,
        (index[1] as i64 - half_extents[1] as i64) as f64 / c,
        (index[2] as i64 - half_extents[2] as i64) as f64 / c,
    )
}
