//! A serial kinematic chain with a damped-least-squares IK solver.
//!
//! This is the reference model shipped with the crate: an ordered list of joints, each
//! placed relative to the previous joint's frame, ending in a tool-centre point (`tip`).
//! Fixed joints only contribute geometry; hinge and prismatic joints each consume one
//! entry of the joint vector.

use crate::kinematics::{JointVector, Kinematics, KinematicsError};
use glam::{DAffine3, DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Types of mechanical joints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointType {
    /// Fixed connection (welded). Carries no joint value.
    #[default]
    Fixed,
    /// Rotates around a single axis (e.g., shoulder, elbow).
    Hinge,
    /// Slides along a single axis (linear actuator).
    Prismatic,
}

/// Limits for a joint's motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointLimit {
    /// Minimum angle (radians) or distance (meters).
    pub min: f64,
    /// Maximum angle (radians) or distance (meters).
    pub max: f64,
}

impl JointLimit {
    /// Finite bounds with `min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Clamps `value` into the limits. Never panics; a NaN bound is ignored.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// A single joint of the chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainJoint {
    #[serde(default)]
    pub name: String,

    /// Offset from the previous joint's frame to this joint, in the previous frame.
    #[serde(default)]
    pub origin: DVec3,

    /// Fixed rotation applied after `origin`, before the joint's own motion.
    #[serde(default)]
    pub orientation: DQuat,

    #[serde(default)]
    pub joint_type: JointType,

    /// The axis of rotation/translation in this joint's local frame.
    /// Defaults to X-axis (Pitch).
    #[serde(default = "default_axis")]
    pub axis: DVec3,

    #[serde(default)]
    pub limits: Option<JointLimit>,
}

fn default_axis() -> DVec3 {
    DVec3::X
}

impl ChainJoint {
    pub fn fixed(name: impl Into<String>, origin: DVec3) -> Self {
        Self {
            name: name.into(),
            origin,
            orientation: DQuat::IDENTITY,
            joint_type: JointType::Fixed,
            axis: DVec3::X,
            limits: None,
        }
    }

    pub fn hinge(name: impl Into<String>, origin: DVec3, axis: DVec3) -> Self {
        Self {
            joint_type: JointType::Hinge,
            axis,
            ..Self::fixed(name, origin)
        }
    }

    pub fn prismatic(name: impl Into<String>, origin: DVec3, axis: DVec3) -> Self {
        Self {
            joint_type: JointType::Prismatic,
            axis,
            ..Self::fixed(name, origin)
        }
    }

    /// Sets joint limits, swapping the bounds if they arrive inverted.
    ///
    /// Non-finite bounds are kept as given; the IK solver then rejects the chain
    /// with [`KinematicsError::InvalidModel`].
    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        let limit = JointLimit { min, max };
        if !limit.is_valid() {
            log::warn!("joint '{}': invalid limits [{min}, {max}]", self.name);
        }
        self.limits = Some(limit);
        self
    }

    pub fn is_active(&self) -> bool {
        self.joint_type != JointType::Fixed
    }

    fn clamp(&self, value: f64) -> f64 {
        match &self.limits {
            Some(limit) => limit.clamp(value),
            None => value,
        }
    }
}

/// Tuning for the iterative inverse-kinematics solver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkSolverConfig {
    /// Upper bound on solver iterations per target.
    pub max_iterations: usize,
    /// Damping factor (lambda) of the least-squares step.
    pub damping: f64,
    /// Stop once the positional error drops below this distance (meters).
    pub convergence: f64,
}

impl Default for IkSolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            damping: 0.05,
            convergence: 1e-9,
        }
    }
}

/// An articulated manipulator described as a serial chain of joints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KinematicChain {
    /// Joints from the base outwards.
    #[serde(default)]
    pub joints: Vec<ChainJoint>,

    /// End-effector point in the frame of the last joint.
    #[serde(default)]
    pub tip: DVec3,

    #[serde(default)]
    pub solver: IkSolverConfig,
}

/// World-space placement of an active joint for one configuration.
struct JointFrame {
    position: DVec3,
    axis: DVec3,
    joint_type: JointType,
}

impl KinematicChain {
    pub fn new(tip: DVec3) -> Self {
        Self {
            joints: Vec::new(),
            tip,
            solver: IkSolverConfig::default(),
        }
    }

    /// Appends a joint (builder pattern).
    pub fn with_joint(mut self, joint: ChainJoint) -> Self {
        self.joints.push(joint);
        self
    }

    pub fn with_solver(mut self, solver: IkSolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Number of joint values this chain expects (active joints only).
    pub fn dof(&self) -> usize {
        self.joints.iter().filter(|j| j.is_active()).count()
    }

    /// Checks the chain geometry and normalises axes and orientations.
    ///
    /// Non-unit axes are accepted and rescaled with a warning; zero-length axes on
    /// active joints and non-finite values are rejected.
    pub fn validated(mut self) -> Result<Self, KinematicsError> {
        if !self.tip.is_finite() {
            return Err(KinematicsError::InvalidModel("tip is not finite".into()));
        }
        if !self.solver.damping.is_finite() || self.solver.damping < 0.0 {
            return Err(KinematicsError::InvalidModel(format!(
                "solver damping must be finite and non-negative, got {}",
                self.solver.damping
            )));
        }

        for (index, joint) in self.joints.iter_mut().enumerate() {
            let label = if joint.name.is_empty() {
                format!("joint #{index}")
            } else {
                format!("joint '{}'", joint.name)
            };

            if !joint.origin.is_finite() {
                return Err(KinematicsError::InvalidModel(format!(
                    "{label} has a non-finite origin"
                )));
            }
            let norm = joint.orientation.length();
            if !joint.orientation.is_finite() || norm == 0.0 {
                return Err(KinematicsError::InvalidModel(format!(
                    "{label} has an invalid orientation"
                )));
            }
            joint.orientation = joint.orientation.normalize();

            if !joint.is_active() {
                continue;
            }
            let length = joint.axis.length();
            if !length.is_finite() || length == 0.0 {
                return Err(KinematicsError::InvalidModel(format!(
                    "{label} has a zero or non-finite axis"
                )));
            }
            if (length - 1.0).abs() > 1e-9 {
                log::warn!("{label}: axis {:?} is not unit length, normalising", joint.axis);
                joint.axis /= length;
            }
            if let Some(limit) = joint.limits
                && !limit.is_valid()
            {
                return Err(KinematicsError::InvalidModel(format!(
                    "{label} has invalid limits [{}, {}]",
                    limit.min, limit.max
                )));
            }
        }

        Ok(self)
    }

    fn active_joints(&self) -> impl Iterator<Item = &ChainJoint> {
        self.joints.iter().filter(|j| j.is_active())
    }

    /// Walks the chain for `values`, returning active joint frames and the tip position.
    fn frames(&self, values: &[f64]) -> Result<(Vec<JointFrame>, DVec3), KinematicsError> {
        let dof = self.dof();
        if values.len() != dof {
            return Err(KinematicsError::JointCountMismatch {
                expected: dof,
                actual: values.len(),
            });
        }

        let mut transform = DAffine3::IDENTITY;
        let mut frames = Vec::with_capacity(dof);
        let mut values = values.iter().copied();

        for joint in &self.joints {
            transform = transform
                * DAffine3::from_translation(joint.origin)
                * DAffine3::from_quat(joint.orientation);

            if !joint.is_active() {
                continue;
            }
            let Some(q) = values.next() else {
                return Err(KinematicsError::JointCountMismatch {
                    expected: dof,
                    actual: frames.len(),
                });
            };

            let axis = joint.axis.normalize_or_zero();
            frames.push(JointFrame {
                position: transform.translation,
                axis: transform.transform_vector3(axis),
                joint_type: joint.joint_type,
            });

            let motion = match joint.joint_type {
                JointType::Hinge => DAffine3::from_quat(DQuat::from_axis_angle(axis, q)),
                JointType::Prismatic => DAffine3::from_translation(axis * q),
                JointType::Fixed => DAffine3::IDENTITY,
            };
            transform = transform * motion;
        }

        let tip = transform.transform_point3(self.tip);
        if !tip.is_finite() {
            return Err(KinematicsError::NonFinite);
        }
        Ok((frames, tip))
    }

    fn clamp_to_limits(&self, values: &mut [f64]) {
        for (value, joint) in values.iter_mut().zip(self.active_joints()) {
            *value = joint.clamp(*value);
        }
    }
}

impl Kinematics for KinematicChain {
    /// Damped least squares starting from the zero configuration.
    ///
    /// Returns the last iterate when the iteration budget runs out; callers are
    /// expected to verify the result with [`Kinematics::solve_forward`].
    fn solve_inverse(&self, target: DVec3) -> Result<JointVector, KinematicsError> {
        if !target.is_finite() {
            return Err(KinematicsError::NonFinite);
        }
        if let Some(joint) = self
            .active_joints()
            .find(|j| j.limits.is_some_and(|l| !l.is_valid()))
        {
            return Err(KinematicsError::InvalidModel(format!(
                "joint '{}' has invalid limits {:?}",
                joint.name, joint.limits
            )));
        }

        let mut q = vec![0.0; self.dof()];
        self.clamp_to_limits(&mut q);
        if q.is_empty() {
            return Ok(q);
        }

        let lambda_sq = self.solver.damping * self.solver.damping;

        for _ in 0..self.solver.max_iterations {
            let (frames, tip) = self.frames(&q)?;
            let error = target - tip;
            if error.length() <= self.solver.convergence {
                break;
            }

            // Jacobian columns (linear velocity of the tip per joint).
            let columns: Vec<DVec3> = frames
                .iter()
                .map(|f| match f.joint_type {
                    JointType::Hinge => f.axis.cross(tip - f.position),
                    JointType::Prismatic => f.axis,
                    JointType::Fixed => DVec3::ZERO,
                })
                .collect();

            // (J * J^T + lambda^2 * I) is 3x3 regardless of the chain length.
            let mut jjt = DMat3::from_diagonal(DVec3::splat(lambda_sq));
            for c in &columns {
                jjt = jjt + DMat3::from_cols(*c * c.x, *c * c.y, *c * c.z);
            }
            let y = jjt.inverse() * error;

            for ((value, column), joint) in q.iter_mut().zip(&columns).zip(self.active_joints()) {
                *value = joint.clamp(*value + column.dot(y));
            }

            if !q.iter().all(|v| v.is_finite()) {
                return Err(KinematicsError::NonFinite);
            }
        }

        Ok(q)
    }

    fn solve_forward(&self, joints: &[f64]) -> Result<DVec3, KinematicsError> {
        self.frames(joints).map(|(_, tip)| tip)
    }
}
