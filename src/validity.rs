use crate::robot_model::RobotModel;
use crate::robot_state::RobotState;

/// A trait for checking if the robot state is acceptable for planning: within the joint
/// limits and, depending on the implementation, collision free.
///
/// # Requirements
/// - Implementations of this trait must be `Send` and `Sync` for concurrent safety.
pub trait StateValidator: Send + Sync {
    /// Checks whether the given robot state is valid.
    ///
    /// # Arguments
    /// * `model` - The robot model, providing kinematics and the limits.
    /// * `state` - State to check.
    ///
    /// # Returns
    /// * `true` if the state can be used in a trajectory.
    fn is_valid(&self, model: &RobotModel, state: &RobotState) -> bool;
}

/// Only checks the joint limits.
#[derive(Debug, Default, Clone, Copy)]
pub struct LimitsValidator;

impl StateValidator for LimitsValidator {
    fn is_valid(&self, model: &RobotModel, state: &RobotState) -> bool {
        model.within_limits(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters_robots::gantry_with_parallel_gripper;

    #[test]
    fn test_limits_validator() {
        let model = gantry_with_parallel_gripper();
        let home = crate::parameters_robots::home_state(&model);
        assert!(LimitsValidator.is_valid(&model, &home));

        let mut outside = home.clone();
        outside.arm[0] = 100.0;
        assert!(!LimitsValidator.is_valid(&model, &outside));

        let mut wrong_gripper = home;
        wrong_gripper.gripper.push(0.0);
        assert!(!LimitsValidator.is_valid(&model, &wrong_gripper));
    }
}
