//! Analytic kinematics of a gantry (Cartesian) robot carrying a spherical wrist.
//!
//! Joints 1 to 3 are prismatic axes moving the wrist along X, Y and Z of the arm root
//! frame. Joints 4 to 6 are revolute wrist joints rotating around Z (yaw), Y (pitch) and
//! X (roll), in this order. The flange frame is then
//! `Translation(j1, j2, j3) * Rz(j4) * Ry(j5) * Rx(j6)`.

use crate::constraints::Constraints;
use crate::frame::compare_poses;
use crate::kinematic_traits::{JointKind, Joints, Kinematics, Pose, Solutions};
use crate::utils::{normalize_angle, transition_costs};
use nalgebra::{Translation3, UnitQuaternion};
use std::f64::consts::PI;

/// Solutions are cross-checked with forward kinematics with this tolerance.
const CHECK_TOLERANCE: f64 = 1E-6;

/// Below this |cos(pitch)|, yaw and roll are considered coupled (gimbal lock).
/// Pose error of the locked solution stays below the cos, well under [`CHECK_TOLERANCE`].
const SINGULARITY_COS: f64 = 1E-7;

const JOINT_KINDS: [JointKind; 6] = [
    JointKind::Prismatic,
    JointKind::Prismatic,
    JointKind::Prismatic,
    JointKind::Revolute,
    JointKind::Revolute,
    JointKind::Revolute,
];

#[derive(Debug, Clone)]
pub struct GantryKinematics {
    /// Optional joint limits. If set, only compliant solutions are returned.
    pub constraints: Option<Constraints>,
}

impl GantryKinematics {
    /// Creates a new `GantryKinematics` instance without joint limits.
    pub fn new() -> Self {
        GantryKinematics { constraints: None }
    }

    /// Creates a new `GantryKinematics` instance, filtering solutions with the given limits.
    pub fn new_with_constraints(constraints: Constraints) -> Self {
        GantryKinematics {
            constraints: Some(constraints),
        }
    }

    fn candidates(pose: &Pose) -> Solutions {
        let t = pose.translation.vector;
        if !t.iter().all(|v| v.is_finite()) || !pose.rotation.coords.iter().all(|v| v.is_finite()) {
            return Vec::new();
        }
        let (roll, pitch, yaw) = Self::euler_zyx(pose);
        vec![
            [t.x, t.y, t.z, yaw, pitch, roll],
            [
                t.x,
                t.y,
                t.z,
                normalize_angle(yaw + PI),
                normalize_angle(PI - pitch),
                normalize_angle(roll + PI),
            ],
        ]
    }

    /// Roll, pitch and yaw of `Rz(yaw) * Ry(pitch) * Rx(roll)`. Near gimbal lock only
    /// the coupled angle is defined, it goes into yaw and roll is zero.
    fn euler_zyx(pose: &Pose) -> (f64, f64, f64) {
        let rotation = pose.rotation.to_rotation_matrix();
        let m = rotation.matrix();
        let cos_pitch = m[(0, 0)].hypot(m[(1, 0)]);
        let pitch = (-m[(2, 0)]).atan2(cos_pitch);
        if cos_pitch < SINGULARITY_COS {
            // Pitch up: yaw - roll, pitch down: yaw + roll. Both read from the same entries.
            let coupled = (-m[(0, 1)]).atan2(m[(1, 1)]);
            (0.0, pitch, coupled)
        } else {
            (m[(2, 1)].atan2(m[(2, 2)]), pitch, m[(1, 0)].atan2(m[(0, 0)]))
        }
    }

    /// Keep solutions that reproduce the pose and respect the limits.
    fn checked(&self, pose: &Pose, solutions: Solutions) -> Solutions {
        let mut result: Solutions = Vec::with_capacity(solutions.len());
        for solution in solutions {
            if !compare_poses(&self.forward(&solution), pose, CHECK_TOLERANCE) {
                continue;
            }
            if let Some(constraints) = &self.constraints {
                if !constraints.compliant(&solution) {
                    continue;
                }
            }
            let duplicate = result
                .iter()
                .any(|other| transition_costs(other, &solution, &[1.0; 6]) < CHECK_TOLERANCE);
            if !duplicate {
                result.push(solution);
            }
        }
        result
    }
}

impl Default for GantryKinematics {
    fn default() -> Self {
        Self::new()
    }
}

impl Kinematics for GantryKinematics {
    fn inverse(&self, pose: &Pose) -> Solutions {
        self.checked(pose, Self::candidates(pose))
    }

    fn inverse_continuing(&self, pose: &Pose, previous: &Joints) -> Solutions {
        let mut candidates = Self::candidates(pose);
        for solution in candidates.iter_mut() {
            if solution[4].cos().abs() < SINGULARITY_COS {
                // In gimbal lock only yaw - roll (pitch up) or yaw + roll (pitch down) matters.
                // Keep roll where it was and put all the rotation on the yaw.
                let coupled = if solution[4] > 0.0 {
                    solution[3] - solution[5]
                } else {
                    solution[3] + solution[5]
                };
                solution[5] = previous[5];
                solution[3] = if solution[4] > 0.0 {
                    coupled + previous[5]
                } else {
                    coupled - previous[5]
                };
            }
            for (i, kind) in JOINT_KINDS.iter().enumerate() {
                if *kind == JointKind::Revolute {
                    let turns = ((previous[i] - solution[i]) / (2.0 * PI)).round();
                    solution[i] += turns * 2.0 * PI;
                }
            }
        }
        let mut solutions = self.checked(pose, candidates);
        solutions.sort_by(|a, b| {
            transition_costs(previous, a, &[1.0; 6])
                .total_cmp(&transition_costs(previous, b, &[1.0; 6]))
        });
        solutions
    }

    fn forward(&self, qs: &Joints) -> Pose {
        Pose::from_parts(
            Translation3::new(qs[0], qs[1], qs[2]),
            UnitQuaternion::from_euler_angles(qs[5], qs[4], qs[3]),
        )
    }

    fn joint_kinds(&self) -> [JointKind; 6] {
        JOINT_KINDS
    }
}
