//! Execution of planned trajectories, one at a time.

use crate::errors::ExecutionError;
use crate::motion_backend::RobotStateSource;
use crate::robot_state::{RobotState, RobotTrajectory};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Sends the trajectory to the robot and blocks until it is executed or failed.
pub trait ExecutionBackend {
    fn execute(&self, trajectory: &RobotTrajectory) -> Result<(), ExecutionError>;
}

/// Robot that only exists in memory. Executing a trajectory moves it into the last
/// waypoint. It is also the state source, so planning can continue from where
/// the simulated robot is.
#[derive(Debug)]
pub struct SimulatedRobot {
    state: Mutex<RobotState>,

    /// Largest joint difference between the current state and the first waypoint.
    pub start_tolerance: f64,

    /// If set, execution takes as long as the trajectory says.
    pub realtime: bool,
}

impl SimulatedRobot {
    pub fn new(initial: RobotState) -> Self {
        SimulatedRobot {
            state: Mutex::new(initial),
            start_tolerance: 1E-3,
            realtime: false,
        }
    }

    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn state(&self) -> RobotState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_state(&self, state: RobotState) {
        match self.state.lock() {
            Ok(mut guard) => *guard = state,
            Err(poisoned) => *poisoned.into_inner() = state,
        }
    }

    fn pace(trajectory: &RobotTrajectory) {
        let start = Instant::now();
        for waypoint in &trajectory.waypoints {
            // Wait until the right time
            let target = Duration::from_secs_f64(waypoint.time_from_start.max(0.0));
            let elapsed = start.elapsed();
            if target > elapsed {
                std::thread::sleep(target - elapsed);
            }
        }
    }
}

impl ExecutionBackend for SimulatedRobot {
    fn execute(&self, trajectory: &RobotTrajectory) -> Result<(), ExecutionError> {
        let (Some(first), Some(last)) = (trajectory.first_state(), trajectory.last_state()) else {
            return Err(ExecutionError::EmptyTrajectory);
        };
        let current = self.state();
        let deviation = current.deviation(first);
        if !deviation.is_finite() || deviation > self.start_tolerance {
            return Err(ExecutionError::StartStateDeviation { deviation });
        }

        debug!(
            "Executing {} waypoints of {}, {:.3} s",
            trajectory.len(),
            trajectory.group,
            trajectory.duration()
        );
        if self.realtime {
            Self::pace(trajectory);
        }
        self.set_state(last.clone());
        info!("Robot at {:?}", last);
        Ok(())
    }
}

impl RobotStateSource for SimulatedRobot {
    fn current_robot_state(&self) -> RobotState {
        self.state()
    }
}

impl<T: ExecutionBackend + ?Sized> ExecutionBackend for std::sync::Arc<T> {
    fn execute(&self, trajectory: &RobotTrajectory) -> Result<(), ExecutionError> {
        (**self).execute(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::PathFlags;

    fn state(x: f64) -> RobotState {
        RobotState::new([x, 0.0, 0.5, 0.0, 0.0, 0.0], vec![0.04, 0.04])
    }

    #[test]
    fn test_moves_into_last_waypoint() {
        let robot = SimulatedRobot::new(state(0.0));
        let trajectory = RobotTrajectory::from_states("arm", vec![state(0.0), state(0.1), state(0.2)], PathFlags::ONBOARDING);
        robot.execute(&trajectory).unwrap();
        assert_eq!(robot.current_robot_state(), state(0.2));
    }

    #[test]
    fn test_rejects_empty() {
        let robot = SimulatedRobot::new(state(0.0));
        assert_eq!(robot.execute(&RobotTrajectory::new("arm")), Err(ExecutionError::EmptyTrajectory));
    }

    #[test]
    fn test_rejects_far_start() {
        let robot = SimulatedRobot::new(state(0.0));
        let trajectory = RobotTrajectory::from_states("arm", vec![state(0.5), state(0.6)], PathFlags::ONBOARDING);
        match robot.execute(&trajectory) {
            Err(ExecutionError::StartStateDeviation { deviation }) => assert!((deviation - 0.5).abs() < 1E-12),
            other => panic!("Expected deviation error, got {:?}", other),
        }
        // Robot did not move
        assert_eq!(robot.state(), state(0.0));
    }
}
