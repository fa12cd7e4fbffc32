//! Provides tool and base for the robot.
//! Both Tool and Base take arbitrary implementation of Kinematics and are such
//! implementations themselves. Hence, they can be cascaded, like base, having the robot,
//! that robot having a tool. In terms of links, the base is the transform from the root
//! link to the arm root link, and the tool is the transform from the flange to the
//! end effector link (the point between the gripper fingers).
//! ```
//! use std::sync::Arc;
//! use nalgebra::{Isometry3, Translation3, UnitQuaternion};
//! use rs_pick_place::kinematic_traits::{Joints, Kinematics, Pose};
//! use rs_pick_place::kinematics_impl::GantryKinematics;
//!
//! // Gantry mounted on a half meter high frame
//! let robot_with_base = rs_pick_place::tool::Base {
//!   robot: Arc::new(GantryKinematics::new()),
//!   base: Isometry3::translation(0.0, 0.0, 0.5),
//! };
//!
//! // Gripper fingertips are 12 cm from the flange
//! let robot_complete = rs_pick_place::tool::Tool {
//!   robot: Arc::new(robot_with_base),
//!   tool: Isometry3::translation(0.0, 0.0, 0.12),
//! };
//!
//! let joints: Joints = [0.2, 0.1, 0.0, 0.0, 0.0, 0.0];
//! let tcp_pose: Pose = robot_complete.forward(&joints);
//! assert!((tcp_pose.translation.vector.z - 0.62).abs() < 1E-12);
//! ```

use crate::kinematic_traits::{JointKind, Joints, Kinematics, Pose, Solutions};
use nalgebra::Isometry3;
use std::sync::Arc;

/// Defines the fixed tool that can be attached to the last joint (joint 6) of robot.
/// The tool moves with the robot, providing additional translation and, if needed,
/// rotation. The tool itself fully implements the Kinematics,
/// providing both inverse and forward kinematics for the robot with a tool (with
/// "pose" being assumed as the position and rotation of the tip of the tool (tool center point).
#[derive(Clone)]
pub struct Tool {
    pub robot: Arc<dyn Kinematics>, // The robot

    /// Transformation from the robot's tip joint to the tool's TCP.
    pub tool: Isometry3<f64>,
}

/// Defines the fixed base that can hold the robot.
/// The base moves the robot to its installed location, providing also rotation if
/// required (gantries are often mounted hanging from the ceiling).
#[derive(Clone)]
pub struct Base {
    pub robot: Arc<dyn Kinematics>, // The robot

    /// Transformation from the root link to the arm root link.
    pub base: Isometry3<f64>,
}

impl Kinematics for Tool {
    fn inverse(&self, tcp: &Pose) -> Solutions {
        self.robot.inverse(&(tcp * self.tool.inverse()))
    }

    fn inverse_continuing(&self, tcp: &Pose, previous: &Joints) -> Solutions {
        self.robot.inverse_continuing(&(tcp * self.tool.inverse()), previous)
    }

    fn forward(&self, qs: &Joints) -> Pose {
        self.robot.forward(qs) * self.tool
    }

    fn joint_kinds(&self) -> [JointKind; 6] {
        self.robot.joint_kinds()
    }
}

impl Kinematics for Base {
    fn inverse(&self, tcp: &Pose) -> Solutions {
        self.robot.inverse(&(self.base.inverse() * tcp))
    }

    fn inverse_continuing(&self, tcp: &Pose, previous: &Joints) -> Solutions {
        self.robot.inverse_continuing(&(self.base.inverse() * tcp), previous)
    }

    fn forward(&self, joints: &Joints) -> Pose {
        self.base * self.robot.forward(joints)
    }

    fn joint_kinds(&self) -> [JointKind; 6] {
        self.robot.joint_kinds()
    }
}
