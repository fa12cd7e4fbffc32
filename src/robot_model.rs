//! Kinematic model of the robot: links naming, arm kinematics and the planning groups.
//!
//! The model is long living, shared between the planners with `Arc<RobotModel>`,
//! and never mutated after construction.

use crate::constraints::Constraints;
use crate::errors::PlanningError;
use crate::kinematic_traits::{Joints, Kinematics, Pose};
use crate::robot_state::RobotState;
use std::collections::BTreeMap;
use std::sync::Arc;

/// What moves when a planning group moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRole {
    /// The six arm joints that position the end effector.
    Arm,
    /// Gripper joints (fingers), moving with the arm held fixed.
    Gripper,
}

/// Named subset of the robot joints over which planning is scoped.
#[derive(Debug, Clone)]
pub struct JointModelGroup {
    pub name: String,
    pub role: GroupRole,
    pub joint_names: Vec<String>,

    /// Position limits, one per joint.
    pub limits: Constraints,

    /// Maximal velocity per joint (m/s or rad/s), used for time parameterization.
    pub max_velocities: Vec<f64>,

    /// Named configurations like "open" or "closed".
    pub named_states: BTreeMap<String, Vec<f64>>,
}

impl JointModelGroup {
    pub fn new(name: &str, role: GroupRole, joint_names: &[&str], limits: Constraints) -> Self {
        JointModelGroup {
            name: name.to_string(),
            role,
            joint_names: joint_names.iter().map(|n| n.to_string()).collect(),
            max_velocities: vec![1.0; joint_names.len()],
            limits,
            named_states: BTreeMap::new(),
        }
    }

    pub fn with_max_velocities(mut self, max_velocities: Vec<f64>) -> Self {
        self.max_velocities = max_velocities;
        self
    }

    pub fn with_named_state(mut self, name: &str, positions: Vec<f64>) -> Self {
        self.named_states.insert(name.to_string(), positions);
        self
    }

    pub fn variable_count(&self) -> usize {
        self.joint_names.len()
    }

    /// Joint positions of the named state.
    pub fn named_state(&self, name: &str) -> Result<&[f64], PlanningError> {
        self.named_states
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| PlanningError::UnknownNamedState {
                name: name.to_string(),
                group: self.name.clone(),
            })
    }
}

/// Robot model as seen by the pick and place planners.
pub struct RobotModel {
    pub name: String,

    /// Root link, the frame all task poses are expressed in.
    pub root_link: String,

    /// Link where the arm is mounted.
    pub arm_root_link: String,

    /// Link to plan the path for (point between the gripper fingers).
    pub end_effector_link: String,

    /// Arm kinematics from root link to the end effector link, normally the
    /// robot wrapped into [`crate::tool::Base`] and [`crate::tool::Tool`].
    pub kinematics: Arc<dyn Kinematics>,

    /// Pose of the arm root link in the root frame.
    pub arm_root_pose: Pose,

    pub arm: JointModelGroup,
    pub gripper: JointModelGroup,
}

impl RobotModel {
    /// Pose of the root link frame, identity by definition.
    pub fn root_link_frame(&self) -> Pose {
        Pose::identity()
    }

    pub fn end_effector_link(&self) -> &str {
        &self.end_effector_link
    }

    pub fn arm_root_link(&self) -> &str {
        &self.arm_root_link
    }

    /// Planning group by name.
    pub fn joint_model_group(&self, name: &str) -> Result<&JointModelGroup, PlanningError> {
        if self.arm.name == name {
            Ok(&self.arm)
        } else if self.gripper.name == name {
            Ok(&self.gripper)
        } else {
            Err(PlanningError::UnknownGroup(name.to_string()))
        }
    }

    /// Pose of the end effector link in the root frame.
    pub fn end_effector_pose(&self, state: &RobotState) -> Pose {
        self.kinematics.forward(&state.arm)
    }

    /// Pose of the end effector for the given arm joints.
    pub fn forward(&self, joints: &Joints) -> Pose {
        self.kinematics.forward(joints)
    }

    /// True if the state has the right dimensions and all joints are within the limits.
    pub fn within_limits(&self, state: &RobotState) -> bool {
        self.arm.limits.compliant(&state.arm) && self.gripper.limits.compliant(&state.gripper)
    }
}

impl std::fmt::Debug for RobotModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotModel")
            .field("name", &self.name)
            .field("root_link", &self.root_link)
            .field("arm_root_link", &self.arm_root_link)
            .field("end_effector_link", &self.end_effector_link)
            .field("arm", &self.arm.name)
            .field("gripper", &self.gripper.name)
            .finish()
    }
}
