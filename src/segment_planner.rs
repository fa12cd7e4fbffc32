//! Plans single segments of a task: free space motion to a pose, straight line
//! motion relative to the current pose and gripper actuation.

use crate::cartesian::CartesianPathSolver;
use crate::errors::PlanningError;
use crate::frame::ReferenceFrame;
use crate::kinematic_traits::{Direction, Pose};
use crate::motion_backend::{MotionGoal, MotionPlanningBackend, PlannedMotion};
use crate::robot_model::{JointModelGroup, RobotModel};
use crate::robot_state::RobotState;
use crate::time_parameterization::TimeParameterization;
use crate::utils::format_pose;
use std::sync::Arc;
use tracing::debug;

pub struct SegmentPlanner {
    pub model: Arc<RobotModel>,
    pub backend: Box<dyn MotionPlanningBackend>,
    pub cartesian: Box<dyn CartesianPathSolver>,
    pub timing: TimeParameterization,

    /// Name of the planning group that moves the end effector.
    pub arm_group: String,

    /// Name of the planning group of the gripper fingers.
    pub gripper_group: String,
}

impl SegmentPlanner {
    /// Planner for the groups named "arm" and "gripper" with default timing.
    pub fn new(
        model: Arc<RobotModel>,
        backend: Box<dyn MotionPlanningBackend>,
        cartesian: Box<dyn CartesianPathSolver>,
    ) -> Self {
        let arm_group = model.arm.name.clone();
        let gripper_group = model.gripper.name.clone();
        SegmentPlanner {
            model,
            backend,
            cartesian,
            timing: TimeParameterization::default(),
            arm_group,
            gripper_group,
        }
    }

    pub fn with_timing(mut self, timing: TimeParameterization) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_groups(mut self, arm_group: &str, gripper_group: &str) -> Self {
        self.arm_group = arm_group.to_string();
        self.gripper_group = gripper_group.to_string();
        self
    }

    fn arm(&self) -> Result<&JointModelGroup, PlanningError> {
        self.model.joint_model_group(&self.arm_group)
    }

    fn gripper(&self) -> Result<&JointModelGroup, PlanningError> {
        self.model.joint_model_group(&self.gripper_group)
    }

    fn timed(&self, mut motion: PlannedMotion, group: &JointModelGroup) -> PlannedMotion {
        self.timing.apply(&mut motion.trajectory, group);
        motion
    }

    /// Free space motion of the arm, bringing the end effector into `goal` (root frame).
    pub fn plan_to(&self, start: &RobotState, goal: &Pose) -> Result<PlannedMotion, PlanningError> {
        let group = self.arm()?;
        debug!("Planning {} to {}", group.name, format_pose(goal));
        let motion = self
            .backend
            .plan_free_space(start, &MotionGoal::Pose(*goal), group)?;
        Ok(self.timed(motion, group))
    }

    /// Straight line motion of the end effector by `distance` along `direction`.
    pub fn plan_relative(
        &self,
        start: &RobotState,
        direction: &Direction,
        frame: ReferenceFrame,
        distance: f64,
    ) -> Result<PlannedMotion, PlanningError> {
        let group = self.arm()?;
        debug!("Planning {} {:.4} along {:?} ({:?})", group.name, distance, direction.into_inner(), frame);
        let motion = self
            .cartesian
            .plan_line(start, direction, frame, distance, group)?;
        Ok(self.timed(motion, group))
    }

    /// Moves gripper joints into the named state, the arm stays where it is.
    pub fn plan_gripper(&self, start: &RobotState, named_state: &str) -> Result<PlannedMotion, PlanningError> {
        let group = self.gripper()?;
        let positions = group.named_state(named_state)?.to_vec();
        debug!("Planning {} to '{}' {:?}", group.name, named_state, positions);
        let motion = self
            .backend
            .plan_free_space(start, &MotionGoal::Joints(positions), group)?;
        Ok(self.timed(motion, group))
    }

    pub fn current_robot_state(&self) -> RobotState {
        self.backend.current_robot_state()
    }
}
