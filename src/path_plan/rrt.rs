use crate::constraints::Constraints;
use crate::errors::PlanningError;
use crate::utils::max_deviation;
use rrt::{dual_rrt_connect, smooth_path};
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
/// Defines the RRT planner that relocates the robot between the two positions in a
/// collision free way. Works in the joint space of the planning group, whatever
/// its dimension is.
pub struct RRTPlanner {
    /// Step size in the joint space (value in Radians or meters). This should be small
    /// enough to prevent robot colliding with something while moving
    /// in possibly less predictable way between the joints.
    pub step_size_joint_space: f64,

    /// The "max try" parameter of RRT algorithm, reasonable values
    /// are in order 1000 ... 4000
    pub max_try: usize,

    /// Number of shortcut attempts on the found path. Zero disables smoothing.
    pub num_smoothing: usize,
}

impl Default for RRTPlanner {
    fn default() -> Self {
        Self {
            step_size_joint_space: 3_f64.to_radians(),
            max_try: 2000,
            num_smoothing: 100,
        }
    }
}

impl RRTPlanner {
    /// Plans collision free relocation from `start` into `goal`. Samples are drawn
    /// uniformly within `limits`, `is_free` tells if the joint values are acceptable.
    /// Start and goal are included into the returned path.
    pub fn plan_joints<F>(
        &self,
        start: &[f64],
        goal: &[f64],
        limits: &Constraints,
        mut is_free: F,
    ) -> Result<Vec<Vec<f64>>, PlanningError>
    where
        F: FnMut(&[f64]) -> bool,
    {
        if start.len() != goal.len() || start.len() != limits.len() {
            return Err(PlanningError::InvalidRequest(format!(
                "dimensions do not match: start {}, goal {}, limits {}",
                start.len(),
                goal.len(),
                limits.len()
            )));
        }
        if max_deviation(start, goal) < f64::EPSILON {
            return Ok(vec![start.to_vec()]);
        }

        let started = Instant::now();
        let random_joint_angles = || -> Vec<f64> { limits.random_angles() };

        let mut path = dual_rrt_connect(
            start,
            goal,
            &mut is_free,
            random_joint_angles,
            self.step_size_joint_space,
            self.max_try,
        )
        .map_err(PlanningError::NoPathFound)?;

        if self.num_smoothing > 0 && path.len() > 2 {
            smooth_path(&mut path, &mut is_free, self.step_size_joint_space, self.num_smoothing);
        }
        debug!("RRT took {:?}, {} waypoints", started.elapsed(), path.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_free_space_2d() {
        let planner = RRTPlanner {
            step_size_joint_space: 0.05,
            ..RRTPlanner::default()
        };
        let limits = Constraints::new(vec![0.0, 0.0], vec![1.0, 1.0]);
        let path = planner
            .plan_joints(&[0.1, 0.1], &[0.9, 0.9], &limits, |_| true)
            .expect("free space should be planned");
        assert_eq!(path.first().unwrap(), &vec![0.1, 0.1]);
        assert_eq!(path.last().unwrap(), &vec![0.9, 0.9]);
    }

    #[test]
    fn test_avoids_wall() {
        let planner = RRTPlanner {
            step_size_joint_space: 0.02,
            max_try: 5000,
            num_smoothing: 50,
        };
        let limits = Constraints::new(vec![0.0, 0.0], vec![1.0, 1.0]);
        // Wall at x in [0.45, 0.55] from y = 0 to y = 0.8
        let is_free = |q: &[f64]| !(q[0] > 0.45 && q[0] < 0.55 && q[1] < 0.8);
        let path = planner
            .plan_joints(&[0.2, 0.2], &[0.8, 0.2], &limits, is_free)
            .expect("path around the wall should exist");
        assert!(path.iter().all(|q| is_free(q)));
    }

    #[test]
    fn test_same_start_and_goal() {
        let planner = RRTPlanner::default();
        let limits = Constraints::new(vec![0.0], vec![1.0]);
        let path = planner.plan_joints(&[0.5], &[0.5], &limits, |_| true).unwrap();
        assert_eq!(path, vec![vec![0.5]]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let planner = RRTPlanner::default();
        let limits = Constraints::new(vec![0.0], vec![1.0]);
        assert!(planner.plan_joints(&[0.5, 0.1], &[0.5], &limits, |_| true).is_err());
    }
}
