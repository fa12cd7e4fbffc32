//! Hardcoded robot models

use crate::constraints::Constraints;
use crate::kinematic_traits::{Kinematics, Pose};
use crate::kinematics_impl::GantryKinematics;
use crate::robot_model::{GroupRole, JointModelGroup, RobotModel};
use crate::robot_state::RobotState;
use crate::tool::{Base, Tool};
use std::f64::consts::PI;
use std::sync::Arc;

/// Fingers of the parallel gripper fully open (meters from the center).
pub const GRIPPER_OPEN: f64 = 0.04;

/// Gantry kinematics placed on the base and equipped with the tool.
pub fn gantry_kinematics(
    base: Pose,
    tool: Pose,
    constraints: Constraints,
) -> Arc<dyn Kinematics> {
    let plain_robot = GantryKinematics::new_with_constraints(constraints);

    let robot_with_base = Base {
        robot: Arc::new(plain_robot),
        base,
    };

    Arc::new(Tool {
        robot: Arc::new(robot_with_base),
        tool,
    })
}

/// Gantry robot with a spherical wrist and a two finger parallel gripper. The gripper
/// axis points down along -Z of the flange, and the fingertip center (the end effector
/// link) is 12 cm below the flange.
pub fn gantry_with_parallel_gripper() -> RobotModel {
    let arm_limits = Constraints::from_degrees(
        &[
            -0.5..=1.5,
            -1.0..=1.0,
            0.0..=1.2,
            -360.0..=360.0,
            -180.0..=180.0,
            -360.0..=360.0,
        ],
        &[false, false, false, true, true, true],
    );
    let arm_root_pose = Pose::identity();

    let arm = JointModelGroup::new(
        "arm",
        GroupRole::Arm,
        &["axis_x", "axis_y", "axis_z", "wrist_yaw", "wrist_pitch", "wrist_roll"],
        arm_limits.clone(),
    )
    .with_max_velocities(vec![0.5, 0.5, 0.5, PI, PI, PI])
    .with_named_state("home", vec![0.3, 0.0, 0.8, 0.0, 0.0, 0.0]);

    let gripper = JointModelGroup::new(
        "gripper",
        GroupRole::Gripper,
        &["finger_left", "finger_right"],
        Constraints::new(vec![0.0, 0.0], vec![GRIPPER_OPEN, GRIPPER_OPEN]),
    )
    .with_max_velocities(vec![0.05, 0.05])
    .with_named_state("open", vec![GRIPPER_OPEN, GRIPPER_OPEN])
    .with_named_state("closed", vec![0.0, 0.0]);

    RobotModel {
        name: "gantry".to_string(),
        root_link: "world".to_string(),
        arm_root_link: "gantry_base".to_string(),
        end_effector_link: "gripper_tcp".to_string(),
        kinematics: gantry_kinematics(arm_root_pose, Pose::translation(0.0, 0.0, -0.12), arm_limits),
        arm_root_pose,
        arm,
        gripper,
    }
}

/// Arm at its "home" named state, gripper open (or whatever first gripper state
/// the model defines if there is no "open").
pub fn home_state(model: &RobotModel) -> RobotState {
    let arm = model
        .arm
        .named_states
        .get("home")
        .and_then(|v| <[f64; 6]>::try_from(v.as_slice()).ok())
        .unwrap_or_else(|| {
            let centers = model.arm.limits.centers();
            std::array::from_fn(|i| centers.get(i).copied().unwrap_or(0.0))
        });
    let gripper = model
        .gripper
        .named_states
        .get("open")
        .or_else(|| model.gripper.named_states.values().next())
        .cloned()
        .unwrap_or_else(|| model.gripper.limits.centers());
    RobotState::new(arm, gripper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::assert_pose_eq;

    #[test]
    fn test_home_state_within_limits() {
        let model = gantry_with_parallel_gripper();
        let home = home_state(&model);
        assert!(model.within_limits(&home));
        assert_eq!(home.gripper, vec![GRIPPER_OPEN, GRIPPER_OPEN]);
    }

    #[test]
    fn test_end_effector_below_flange() {
        let model = gantry_with_parallel_gripper();
        let home = home_state(&model);
        let tcp = model.end_effector_pose(&home);
        assert_pose_eq(&tcp, &Pose::translation(0.3, 0.0, 0.68), 1E-12, 1E-12);
    }
}
