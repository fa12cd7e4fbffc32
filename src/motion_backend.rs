//! Motion planning backend: free space planning for a planning group, validity checking
//! and the current state of the robot.

use crate::annotations::PathFlags;
use crate::errors::PlanningError;
use crate::kinematic_traits::Pose;
use crate::robot_model::{GroupRole, JointModelGroup, RobotModel};
use crate::robot_state::{RobotState, RobotTrajectory};
use crate::rrt::RRTPlanner;
use crate::utils::format_pose;
use crate::validity::StateValidator;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Goal of the free space planning.
#[derive(Debug, Clone)]
pub enum MotionGoal {
    /// Pose of the end effector link, in the root frame. Only for the arm group.
    Pose(Pose),
    /// Joint positions of the planned group.
    Joints(Vec<f64>),
}

/// Successfully planned motion: the trajectory and the state the robot is in
/// after executing it.
#[derive(Debug, Clone)]
pub struct PlannedMotion {
    pub trajectory: RobotTrajectory,
    pub end_state: RobotState,
}

/// Provides the state the robot is currently in (or assumed to be in).
pub trait RobotStateSource: Send + Sync {
    fn current_robot_state(&self) -> RobotState;
}

/// State source that always returns the same state; for planning without a robot.
#[derive(Debug)]
pub struct FixedState(pub Mutex<RobotState>);

impl FixedState {
    pub fn new(state: RobotState) -> Self {
        FixedState(Mutex::new(state))
    }
}

impl RobotStateSource for FixedState {
    fn current_robot_state(&self) -> RobotState {
        match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// General purpose motion planner, not constrained to any line.
pub trait MotionPlanningBackend {
    /// Plan from `start` to `goal` moving only joints of `group`.
    fn plan_free_space(
        &self,
        start: &RobotState,
        goal: &MotionGoal,
        group: &JointModelGroup,
    ) -> Result<PlannedMotion, PlanningError>;

    /// True if the state can be part of a trajectory.
    fn is_state_valid(&self, state: &RobotState) -> bool;

    fn current_robot_state(&self) -> RobotState;
}

/// Backend planning with RRT-Connect in the joint space of the group.
pub struct RrtBackend {
    pub model: Arc<RobotModel>,
    pub rrt: RRTPlanner,
    pub validator: Arc<dyn StateValidator>,
    pub state_source: Arc<dyn RobotStateSource>,

    /// How many inverse kinematics solutions of a pose goal to try, best first.
    pub max_ik_candidates: usize,
}

impl RrtBackend {
    pub fn new(
        model: Arc<RobotModel>,
        rrt: RRTPlanner,
        validator: Arc<dyn StateValidator>,
        state_source: Arc<dyn RobotStateSource>,
    ) -> Self {
        RrtBackend {
            model,
            rrt,
            validator,
            state_source,
            max_ik_candidates: 4,
        }
    }

    /// Goal states for the request, best first.
    fn goal_states(
        &self,
        start: &RobotState,
        goal: &MotionGoal,
        group: &JointModelGroup,
    ) -> Result<Vec<RobotState>, PlanningError> {
        match goal {
            MotionGoal::Pose(pose) => {
                if group.role != GroupRole::Arm {
                    return Err(PlanningError::InvalidRequest(format!(
                        "pose goal for group {} that does not move the end effector",
                        group.name
                    )));
                }
                let solutions = self.model.kinematics.inverse_continuing(pose, &start.arm);
                debug!("{} IK solutions for {}", solutions.len(), format_pose(pose));
                Ok(solutions
                    .iter()
                    .filter_map(|joints| start.with_positions(GroupRole::Arm, joints))
                    .filter(|state| self.is_state_valid(state))
                    .take(self.max_ik_candidates)
                    .collect())
            }
            MotionGoal::Joints(joints) => {
                let state = start.with_positions(group.role, joints).ok_or_else(|| {
                    PlanningError::InvalidRequest(format!(
                        "{} joint values for group {} of {} joints",
                        joints.len(),
                        group.name,
                        group.variable_count()
                    ))
                })?;
                if self.is_state_valid(&state) {
                    Ok(vec![state])
                } else {
                    Ok(Vec::new())
                }
            }
        }
    }
}

impl MotionPlanningBackend for RrtBackend {
    fn plan_free_space(
        &self,
        start: &RobotState,
        goal: &MotionGoal,
        group: &JointModelGroup,
    ) -> Result<PlannedMotion, PlanningError> {
        if !self.is_state_valid(start) {
            return Err(PlanningError::InvalidStartState);
        }
        let goals = self.goal_states(start, goal, group)?;
        if goals.is_empty() {
            return Err(PlanningError::NoValidGoal);
        }

        let role = group.role;
        let mut last_error = PlanningError::NoValidGoal;
        for goal_state in goals {
            let is_free = |positions: &[f64]| {
                start
                    .with_positions(role, positions)
                    .is_some_and(|state| self.is_state_valid(&state))
            };
            match self.rrt.plan_joints(
                start.positions(role),
                goal_state.positions(role),
                &group.limits,
                is_free,
            ) {
                Ok(path) => {
                    let flags = match role {
                        GroupRole::Arm => PathFlags::ONBOARDING,
                        GroupRole::Gripper => PathFlags::GRIPPER,
                    };
                    let states: Vec<RobotState> = path
                        .iter()
                        .filter_map(|positions| start.with_positions(role, positions))
                        .collect();
                    let mut trajectory = RobotTrajectory::from_states(&group.name, states, flags);
                    // Goal is the root of the second RRT tree, pin it exactly.
                    if let Some(last) = trajectory.waypoints.last_mut() {
                        last.state = goal_state.clone();
                    }
                    return Ok(PlannedMotion {
                        trajectory,
                        end_state: goal_state,
                    });
                }
                Err(error) => {
                    warn!("Free space planning for {} failed: {}", group.name, error);
                    last_error = error;
                }
            }
        }
        Err(last_error)
    }

    fn is_state_valid(&self, state: &RobotState) -> bool {
        self.validator.is_valid(&self.model, state)
    }

    fn current_robot_state(&self) -> RobotState {
        self.state_source.current_robot_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::compare_poses;
    use crate::parameters_robots::{gantry_with_parallel_gripper, home_state};
    use crate::validity::LimitsValidator;

    fn backend() -> RrtBackend {
        let model = Arc::new(gantry_with_parallel_gripper());
        let home = home_state(&model);
        RrtBackend::new(
            model,
            RRTPlanner {
                step_size_joint_space: 0.05,
                ..RRTPlanner::default()
            },
            Arc::new(LimitsValidator),
            Arc::new(FixedState::new(home)),
        )
    }

    #[test]
    fn test_plan_to_pose() {
        let backend = backend();
        let start = backend.current_robot_state();
        let goal = Pose::translation(0.5, 0.0, 0.4);
        let planned = backend
            .plan_free_space(&start, &MotionGoal::Pose(goal), &backend.model.arm)
            .expect("reachable pose");
        assert!(planned.trajectory.first_state().unwrap().approx_eq(&start, 1E-12));
        assert!(planned.trajectory.last_state().unwrap().approx_eq(&planned.end_state, 1E-12));
        assert!(compare_poses(&backend.model.end_effector_pose(&planned.end_state), &goal, 1E-6));
        assert_eq!(planned.end_state.gripper, start.gripper);
    }

    #[test]
    fn test_unreachable_pose() {
        let backend = backend();
        let start = backend.current_robot_state();
        let goal = Pose::translation(5.0, 0.0, 0.4);
        let result = backend.plan_free_space(&start, &MotionGoal::Pose(goal), &backend.model.arm);
        assert_eq!(result.unwrap_err(), PlanningError::NoValidGoal);
    }

    #[test]
    fn test_gripper_moves_only_fingers() {
        let backend = backend();
        let start = backend.current_robot_state();
        let planned = backend
            .plan_free_space(&start, &MotionGoal::Joints(vec![0.0, 0.0]), &backend.model.gripper)
            .expect("gripper can close");
        assert!(planned.trajectory.waypoints.iter().all(|w| w.state.arm == start.arm));
        assert_eq!(planned.end_state.gripper, vec![0.0, 0.0]);
    }

    #[test]
    fn test_invalid_start() {
        let backend = backend();
        let mut start = backend.current_robot_state();
        start.arm[2] = -3.0;
        let result = backend.plan_free_space(&start, &MotionGoal::Joints(vec![0.0, 0.0]), &backend.model.gripper);
        assert_eq!(result.unwrap_err(), PlanningError::InvalidStartState);
    }

    #[test]
    fn test_pose_goal_for_gripper_rejected() {
        let backend = backend();
        let start = backend.current_robot_state();
        let result = backend.plan_free_space(&start, &MotionGoal::Pose(Pose::identity()), &backend.model.gripper);
        assert!(matches!(result, Err(PlanningError::InvalidRequest(_))));
    }
}
