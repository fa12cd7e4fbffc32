//! Implements collision detection between the gripper and static obstacles of the cell.

use crate::kinematic_traits::Pose;
use crate::robot_model::RobotModel;
use crate::robot_state::RobotState;
use crate::validity::StateValidator;
use nalgebra::Isometry3;
use parry3d::shape::SharedShape;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use tracing::trace;

/// Static object against that we check the robot does not collide.
/// It has the global transform allowing to place it where desired.
#[derive(Clone)]
pub struct CollisionBody {
    pub shape: SharedShape,
    /// Global transform of this collision object.
    pub pose: Isometry3<f32>,
}

impl CollisionBody {
    /// Axis aligned box with the given half extents, centered at `pose`.
    pub fn cuboid(half_extents: [f32; 3], pose: Isometry3<f32>) -> Self {
        CollisionBody {
            shape: SharedShape::cuboid(half_extents[0], half_extents[1], half_extents[2]),
            pose,
        }
    }
}

/// Sphere that moves together with the end effector.
#[derive(Clone)]
pub struct Probe {
    pub radius: f32,
    /// Center relative to the end effector link.
    pub offset: Isometry3<f32>,
}

/// Pair of one probe and one obstacle to check.
struct CollisionTask<'a> {
    probe: usize,
    obstacle: usize,
    transform_i: Isometry3<f32>,
    transform_j: &'a Isometry3<f32>,
    shape_i: SharedShape,
    shape_j: &'a SharedShape,
}

/// The state is valid if within joint limits and none of the probes attached to
/// the end effector intersects any obstacle.
pub struct CollisionValidator {
    pub probes: Vec<Probe>,
    pub obstacles: Vec<CollisionBody>,
}

impl CollisionValidator {
    pub fn new(probes: Vec<Probe>, obstacles: Vec<CollisionBody>) -> Self {
        CollisionValidator { probes, obstacles }
    }

    /// Single probe of the given radius at the end effector.
    pub fn with_tcp_probe(radius: f32, obstacles: Vec<CollisionBody>) -> Self {
        Self::new(
            vec![Probe {
                radius,
                offset: Isometry3::identity(),
            }],
            obstacles,
        )
    }

    /// First colliding (probe, obstacle) pair, if any.
    pub fn first_collision(&self, tcp: &Pose) -> Option<(usize, usize)> {
        let tcp: Isometry3<f32> = tcp.cast::<f32>();
        let tasks: Vec<CollisionTask> = self
            .probes
            .iter()
            .enumerate()
            .flat_map(|(i, probe)| {
                let transform_i = tcp * probe.offset;
                let shape_i = SharedShape::ball(probe.radius);
                self.obstacles
                    .iter()
                    .enumerate()
                    .map(move |(j, obstacle)| CollisionTask {
                        probe: i,
                        obstacle: j,
                        transform_i,
                        transform_j: &obstacle.pose,
                        shape_i: shape_i.clone(),
                        shape_j: &obstacle.shape,
                    })
            })
            .collect();

        // Exit as soon as any collision is found
        tasks.par_iter().find_map_any(|task| {
            // Unsupported shape pair counts as collision
            let collides = parry3d::query::intersection_test(
                &task.transform_i,
                &*task.shape_i,
                task.transform_j,
                &**task.shape_j,
            )
            .unwrap_or(true);
            if collides {
                Some((task.probe, task.obstacle))
            } else {
                None
            }
        })
    }
}

impl StateValidator for CollisionValidator {
    fn is_valid(&self, model: &RobotModel, state: &RobotState) -> bool {
        if !model.within_limits(state) {
            return false;
        }
        match self.first_collision(&model.end_effector_pose(state)) {
            Some((probe, obstacle)) => {
                trace!("Probe {} collides with obstacle {} at {:?}", probe, obstacle, state);
                false
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters_robots::{gantry_with_parallel_gripper, home_state};

    fn table() -> CollisionBody {
        // Table top surface at z = 0.2
        CollisionBody::cuboid([1.0, 1.0, 0.1], Isometry3::translation(0.5, 0.0, 0.1))
    }

    #[test]
    fn test_home_is_free() {
        let model = gantry_with_parallel_gripper();
        let validator = CollisionValidator::with_tcp_probe(0.02, vec![table()]);
        assert!(validator.is_valid(&model, &home_state(&model)));
    }

    #[test]
    fn test_gripper_in_table() {
        let model = gantry_with_parallel_gripper();
        let validator = CollisionValidator::with_tcp_probe(0.02, vec![table()]);
        let mut state = home_state(&model);
        // Tool center point 0.12 below the flange, at z = 0.18
        state.arm[2] = 0.30;
        assert!(!validator.is_valid(&model, &state));
        assert_eq!(validator.first_collision(&model.end_effector_pose(&state)), Some((0, 0)));
    }

    #[test]
    fn test_limits_still_checked() {
        let model = gantry_with_parallel_gripper();
        let validator = CollisionValidator::new(Vec::new(), Vec::new());
        let mut state = home_state(&model);
        state.arm[1] = 5.0;
        assert!(!validator.is_valid(&model, &state));
    }
}
