//! Cartesian stroke: straight line motion of the end effector

use crate::annotations::{AnnotatedPose, PathFlags};
use crate::errors::PlanningError;
use crate::frame::{offset_pose, ReferenceFrame};
use crate::kinematic_traits::{Direction, Joints, Pose};
use crate::motion_backend::PlannedMotion;
use crate::robot_model::{GroupRole, JointModelGroup, RobotModel};
use crate::robot_state::{RobotState, RobotTrajectory};
use crate::utils;
use crate::utils::{format_joints, format_pose};
use crate::validity::StateValidator;
use std::sync::Arc;
use tracing::{debug, trace};

/// Reasonable default transition costs. Moving heavy gantry axes is less tolerable
/// than rotating the wrist; linear axes are in meters so they weigh more per unit.
pub const DEFAULT_TRANSITION_COSTS: [f64; 6] = [4.0, 4.0, 4.0, 0.9, 0.9, 0.8];

/// Strategy that moves the end effector along a straight line. Implementations may
/// differ in interpolation density, validity checks or how IK solutions are chosen.
pub trait CartesianPathSolver {
    /// Plan the straight line motion of `distance` along `direction`, starting from
    /// `start`. The direction is expressed in `frame`: either the root frame or the
    /// end effector frame at `start`. Infeasibility is reported as error, never panics.
    fn plan_line(
        &self,
        start: &RobotState,
        direction: &Direction,
        frame: ReferenceFrame,
        distance: f64,
        group: &JointModelGroup,
    ) -> Result<PlannedMotion, PlanningError>;
}

/// Class doing Cartesian planning by interpolating poses and solving inverse
/// kinematics for each, continuing from the previous solution.
pub struct LinearCartesianSolver {
    pub robot: Arc<RobotModel>,

    pub validator: Arc<dyn StateValidator>,

    /// Check step size in meters. Objects and features of the robotic cell smaller
    /// than this may not be noticed during collision checks.
    pub check_step_m: f64,

    /// Check step size in radians.
    pub check_step_rad: f64,

    /// Maximum allowed transition cost between Joints (jump threshold)
    pub max_transition_cost: f64,

    /// Transition cost coefficients (smaller joints are allowed to rotate more)
    pub transition_coefficients: Joints,

    /// If set, linear interpolated poses are included in the output.
    /// Otherwise, they are discarded after checking (controllers that do the
    /// Cartesian stroke on they own only need the endpoints).
    pub include_linear_interpolation: bool,

    /// Strokes needing more interpolation steps than this are refused.
    pub max_steps: usize,
}

impl LinearCartesianSolver {
    pub fn new(robot: Arc<RobotModel>, validator: Arc<dyn StateValidator>) -> Self {
        LinearCartesianSolver {
            robot,
            validator,
            check_step_m: 0.005,
            check_step_rad: 2_f64.to_radians(),
            max_transition_cost: 0.1,
            transition_coefficients: DEFAULT_TRANSITION_COSTS,
            include_linear_interpolation: true,
            max_steps: 100_000,
        }
    }

    pub fn transitionable(&self, from: &Joints, to: &Joints) -> bool {
        utils::transition_costs(from, to, &self.transition_coefficients) <= self.max_transition_cost
    }

    /// Number of interpolation steps between the two poses.
    fn step_count(&self, start: &Pose, end: &Pose) -> Result<usize, PlanningError> {
        let translation_distance = (end.translation.vector - start.translation.vector).norm();
        let rotation_angle = start.rotation.angle_to(&end.rotation);

        // Choose the greater step count to achieve finer granularity between poses.
        // Tolerance keeps exact multiples of the step from rounding up.
        let translation_steps = (translation_distance / self.check_step_m - 1E-6).ceil();
        let rotation_steps = (rotation_angle / self.check_step_rad - 1E-6).ceil();
        let steps = translation_steps.max(rotation_steps).max(1.0);
        if !steps.is_finite() || steps > self.max_steps as f64 {
            return Err(PlanningError::InvalidRequest(format!(
                "Cartesian stroke of {:.3} m, {:.3} rad needs {} steps, limit is {}",
                translation_distance, rotation_angle, steps, self.max_steps
            )));
        }
        Ok(steps as usize)
    }

    /// Interpolated poses after `start` up to and including `end`.
    fn intermediate_poses(&self, start: &Pose, end: &Pose, steps: usize) -> Vec<AnnotatedPose> {

        let land = AnnotatedPose {
            pose: *start,
            flags: PathFlags::LAND,
        };
        let park = AnnotatedPose {
            pose: *end,
            flags: PathFlags::PARK,
        };
        let mut poses: Vec<AnnotatedPose> = (1..steps)
            .map(|i| land.interpolate(&park, i as f64 / steps as f64))
            .collect();
        poses.push(park);
        poses
    }
}

impl CartesianPathSolver for LinearCartesianSolver {
    fn plan_line(
        &self,
        start: &RobotState,
        direction: &Direction,
        frame: ReferenceFrame,
        distance: f64,
        group: &JointModelGroup,
    ) -> Result<PlannedMotion, PlanningError> {
        if group.role != GroupRole::Arm {
            return Err(PlanningError::InvalidRequest(format!(
                "Cartesian motion of group {} that does not move the end effector",
                group.name
            )));
        }
        if !distance.is_finite() || distance < 0.0 {
            return Err(PlanningError::InvalidRequest(format!(
                "Cartesian distance must be finite and non negative, got {}",
                distance
            )));
        }
        if !self.validator.is_valid(&self.robot, start) {
            return Err(PlanningError::InvalidStartState);
        }

        let mut trajectory = RobotTrajectory::new(&group.name);
        trajectory.push(start.clone(), PathFlags::LAND);
        if distance == 0.0 {
            return Ok(PlannedMotion {
                trajectory,
                end_state: start.clone(),
            });
        }

        let land = self.robot.end_effector_pose(start);
        let park = offset_pose(&land, direction, distance, frame);
        debug!("Cartesian stroke {:.4} m from {} to {}", distance, format_pose(&land), format_pose(&park));

        let steps = self.step_count(&land, &park)?;
        let poses = self.intermediate_poses(&land, &park, steps);
        let total = poses.len();
        let mut previous = start.clone();
        for (step, pose) in poses.iter().enumerate() {
            // Ik without collision checking but with constraint checking.
            let solutions = self.robot.kinematics.inverse_continuing(&pose.pose, &previous.arm);
            // Solutions are already sorted best first
            let next = solutions
                .iter()
                .filter(|joints| self.transitionable(&previous.arm, joints))
                .filter_map(|joints| previous.with_positions(GroupRole::Arm, joints))
                .find(|state| self.validator.is_valid(&self.robot, state));

            match next {
                Some(state) => {
                    trace!("    step {} of {}: {}", step + 1, total, format_joints(&state.arm));
                    if self.include_linear_interpolation || !pose.flags.contains(PathFlags::LIN_INTERP) {
                        trajectory.push(state.clone(), pose.flags | PathFlags::CARTESIAN);
                    }
                    previous = state;
                }
                None => {
                    debug!(
                        "No transition at step {} of {} with cost below {}: {:?}, {} IK solutions",
                        step + 1,
                        total,
                        self.max_transition_cost,
                        pose,
                        solutions.len()
                    );
                    return Err(PlanningError::CartesianPathIncomplete {
                        achieved_fraction: step as f64 / total as f64,
                    });
                }
            }
        }

        Ok(PlannedMotion {
            trajectory,
            end_state: previous,
        })
    }
}
