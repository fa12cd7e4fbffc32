//! Robot state snapshots and trajectories made of them.

use crate::annotations::PathFlags;
use crate::kinematic_traits::Joints;
use crate::robot_model::GroupRole;
use crate::utils::{format_joints, max_deviation};
use std::fmt;

/// Snapshot of all joint positions of the robot.
#[derive(Clone, PartialEq)]
pub struct RobotState {
    pub arm: Joints,
    pub gripper: Vec<f64>,
}

impl RobotState {
    pub fn new(arm: Joints, gripper: Vec<f64>) -> Self {
        RobotState { arm, gripper }
    }

    /// Positions of the joints of the given group.
    pub fn positions(&self, role: GroupRole) -> &[f64] {
        match role {
            GroupRole::Arm => &self.arm,
            GroupRole::Gripper => &self.gripper,
        }
    }

    /// Copy of this state with positions of the given group replaced.
    /// Returns None if the number of positions does not match the group.
    pub fn with_positions(&self, role: GroupRole, positions: &[f64]) -> Option<RobotState> {
        let mut state = self.clone();
        match role {
            GroupRole::Arm => state.arm = Joints::try_from(positions).ok()?,
            GroupRole::Gripper => {
                if positions.len() != self.gripper.len() {
                    return None;
                }
                state.gripper = positions.to_vec();
            }
        }
        Some(state)
    }

    /// Largest joint difference from the other state, over all joints.
    pub fn deviation(&self, other: &RobotState) -> f64 {
        max_deviation(&self.arm, &other.arm).max(max_deviation(&self.gripper, &other.gripper))
    }

    /// True if no joint differs by more than `tolerance`.
    pub fn approx_eq(&self, other: &RobotState, tolerance: f64) -> bool {
        self.deviation(other) <= tolerance
    }
}

impl fmt::Debug for RobotState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "arm {}, gripper {:.4?}", format_joints(&self.arm), self.gripper)
    }
}

/// One point of the trajectory.
#[derive(Clone, Debug)]
pub struct Waypoint {
    pub state: RobotState,

    /// Time from the start of the trajectory, in seconds.
    pub time_from_start: f64,

    /// How the robot gets into this waypoint.
    pub flags: PathFlags,
}

/// Ordered sequence of waypoints for one planning group. Joints outside
/// the group stay as in the first waypoint.
#[derive(Clone, Debug)]
pub struct RobotTrajectory {
    pub group: String,
    pub waypoints: Vec<Waypoint>,
}

impl RobotTrajectory {
    pub fn new(group: &str) -> Self {
        RobotTrajectory {
            group: group.to_string(),
            waypoints: Vec::new(),
        }
    }

    /// Build the trajectory from states, all marked with the same flags. Time stamps
    /// are left at zero until time parameterization assigns them.
    pub fn from_states(group: &str, states: Vec<RobotState>, flags: PathFlags) -> Self {
        RobotTrajectory {
            group: group.to_string(),
            waypoints: states
                .into_iter()
                .map(|state| Waypoint {
                    state,
                    time_from_start: 0.0,
                    flags,
                })
                .collect(),
        }
    }

    pub fn push(&mut self, state: RobotState, flags: PathFlags) {
        self.waypoints.push(Waypoint {
            state,
            time_from_start: 0.0,
            flags,
        });
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn first_state(&self) -> Option<&RobotState> {
        self.waypoints.first().map(|w| &w.state)
    }

    pub fn last_state(&self) -> Option<&RobotState> {
        self.waypoints.last().map(|w| &w.state)
    }

    /// Duration of the trajectory in seconds.
    pub fn duration(&self) -> f64 {
        self.waypoints.last().map_or(0.0, |w| w.time_from_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_positions() {
        let state = RobotState::new([0.0; 6], vec![0.04, 0.04]);
        let closed = state.with_positions(GroupRole::Gripper, &[0.0, 0.0]).unwrap();
        assert_eq!(closed.arm, state.arm);
        assert_eq!(closed.gripper, vec![0.0, 0.0]);
        assert!(state.with_positions(GroupRole::Gripper, &[0.0]).is_none());
        assert!(state.with_positions(GroupRole::Arm, &[0.0; 5]).is_none());
    }

    #[test]
    fn test_approx_eq() {
        let a = RobotState::new([0.0; 6], vec![0.04]);
        let mut b = a.clone();
        b.arm[3] += 1E-7;
        assert!(a.approx_eq(&b, 1E-6));
        b.gripper[0] = 0.0;
        assert!(!a.approx_eq(&b, 1E-6));
    }

    #[test]
    fn test_trajectory_accessors() {
        let a = RobotState::new([0.0; 6], vec![0.0]);
        let b = RobotState::new([1.0; 6], vec![0.0]);
        let trajectory = RobotTrajectory::from_states("arm", vec![a.clone(), b.clone()], PathFlags::ONBOARDING);
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.first_state(), Some(&a));
        assert_eq!(trajectory.last_state(), Some(&b));
        assert_eq!(trajectory.duration(), 0.0);
    }
}
