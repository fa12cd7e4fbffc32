//! Assigns time stamps to the waypoints of planned trajectories.

use crate::robot_model::JointModelGroup;
use crate::robot_state::RobotTrajectory;

/// Time parameterization assuming every joint moves at most with its maximal
/// velocity, scaled. The slowest joint of each step defines the step duration.
#[derive(Debug, Clone, Copy)]
pub struct TimeParameterization {
    /// Fraction of the maximal joint velocities to use, in (0, 1].
    pub velocity_scaling: f64,

    /// Minimal duration of a step between waypoints that do differ, seconds.
    pub min_step_duration: f64,
}

impl Default for TimeParameterization {
    fn default() -> Self {
        TimeParameterization {
            velocity_scaling: 0.5,
            min_step_duration: 0.001,
        }
    }
}

impl TimeParameterization {
    pub fn new(velocity_scaling: f64) -> Self {
        TimeParameterization {
            velocity_scaling: velocity_scaling.clamp(f64::EPSILON, 1.0),
            ..Self::default()
        }
    }

    /// Rewrites `time_from_start` of all waypoints. Only joints of the group are
    /// taken into account, the first waypoint is at 0.
    pub fn apply(&self, trajectory: &mut RobotTrajectory, group: &JointModelGroup) {
        let scaling = self.velocity_scaling.clamp(f64::EPSILON, 1.0);
        let mut time = 0.0;
        let mut previous: Option<Vec<f64>> = None;
        for waypoint in trajectory.waypoints.iter_mut() {
            let positions = waypoint.state.positions(group.role).to_vec();
            if let Some(previous) = &previous {
                let step = positions
                    .iter()
                    .zip(previous)
                    .zip(&group.max_velocities)
                    .map(|((q, p), v)| (q - p).abs() / (v * scaling))
                    .fold(0.0, f64::max);
                if step > 0.0 {
                    time += step.max(self.min_step_duration);
                }
            }
            waypoint.time_from_start = time;
            previous = Some(positions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::PathFlags;
    use crate::constraints::Constraints;
    use crate::robot_model::GroupRole;
    use crate::robot_state::RobotState;

    fn gripper() -> JointModelGroup {
        JointModelGroup::new("gripper", GroupRole::Gripper, &["a", "b"], Constraints::new(vec![0.0; 2], vec![1.0; 2]))
            .with_max_velocities(vec![0.1, 0.2])
    }

    #[test]
    fn test_slowest_joint_defines_time() {
        let states = vec![
            RobotState::new([0.0; 6], vec![0.0, 0.0]),
            RobotState::new([0.0; 6], vec![0.1, 0.1]),
            RobotState::new([0.0; 6], vec![0.1, 0.5]),
        ];
        let mut trajectory = RobotTrajectory::from_states("gripper", states, PathFlags::GRIPPER);
        TimeParameterization::new(1.0).apply(&mut trajectory, &gripper());
        assert_eq!(trajectory.waypoints[0].time_from_start, 0.0);
        assert!((trajectory.waypoints[1].time_from_start - 1.0).abs() < 1E-9);
        assert!((trajectory.waypoints[2].time_from_start - 3.0).abs() < 1E-9);
    }

    #[test]
    fn test_identical_waypoints_take_no_time() {
        let state = RobotState::new([0.0; 6], vec![0.0, 0.0]);
        let mut trajectory = RobotTrajectory::from_states("gripper", vec![state.clone(), state], PathFlags::GRIPPER);
        TimeParameterization::default().apply(&mut trajectory, &gripper());
        assert_eq!(trajectory.duration(), 0.0);
    }

    #[test]
    fn test_scaling_slows_down() {
        let states = vec![
            RobotState::new([0.0; 6], vec![0.0, 0.0]),
            RobotState::new([0.0; 6], vec![0.1, 0.0]),
        ];
        let mut trajectory = RobotTrajectory::from_states("gripper", states, PathFlags::GRIPPER);
        TimeParameterization::new(0.5).apply(&mut trajectory, &gripper());
        assert!((trajectory.duration() - 2.0).abs() < 1E-9);
    }
}
