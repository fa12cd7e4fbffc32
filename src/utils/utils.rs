//! Helper functions

use crate::kinematic_traits::{Joints, Pose};
use std::f64::consts::PI;

/// Checks if all elements in the array are finite
pub fn is_valid(qs: &[f64]) -> bool {
    qs.iter().all(|&q| q.is_finite())
}

/// Brings the angle into the range (-PI, PI]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

/// Calculates the transition cost between two sets of joint positions,
/// weighted by given coefficients (moving heavy gantry axes is
/// more expensive than rotating the wrist).
pub fn transition_costs(from: &Joints, to: &Joints, coefficients: &Joints) -> f64 {
    from.iter()
        .zip(to.iter())
        .zip(coefficients.iter())
        .map(|((a, b), c)| (a - b).abs() * c)
        .sum()
}

/// Largest absolute difference between two vectors of joint values. Vectors
/// of different lengths are infinitely far apart.
pub fn max_deviation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Format joint values for logging. Wrist joints are shown in degrees.
pub fn format_joints(joints: &Joints) -> String {
    format!(
        "[{:.4}, {:.4}, {:.4} m; {:.2}, {:.2}, {:.2} deg]",
        joints[0],
        joints[1],
        joints[2],
        joints[3].to_degrees(),
        joints[4].to_degrees(),
        joints[5].to_degrees()
    )
}

/// Format the pose for logging, translation and quaternion.
pub fn format_pose(isometry: &Pose) -> String {
    let translation = isometry.translation.vector;
    let rotation = isometry.rotation;
    format!(
        "x: {:.5}, y: {:.5}, z: {:.5},  quat: {:.5},{:.5},{:.5},{:.5}",
        translation.x, translation.y, translation.z, rotation.i, rotation.j, rotation.k, rotation.w
    )
}

#[cfg(test)]
pub fn assert_pose_eq(ta: &Pose, tb: &Pose, distance_tolerance: f64, angular_tolerance: f64) {
    let translation_distance = (ta.translation.vector - tb.translation.vector).norm();
    let angular_distance = ta.rotation.angle_to(&tb.rotation);

    assert!(
        translation_distance <= distance_tolerance,
        "Poses have too different translations:\n{}\n{}",
        format_pose(ta),
        format_pose(tb)
    );
    assert!(
        angular_distance <= angular_tolerance,
        "Poses have too different angles:\n{}\n{}",
        format_pose(ta),
        format_pose(tb)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_with_all_finite() {
        let qs = [0.0, 1.0, -1.0, 0.5, -0.5, PI];
        assert!(is_valid(&qs));
    }

    #[test]
    fn test_is_valid_with_nan() {
        let qs = [0.0, f64::NAN, 1.0, -1.0, 0.5, -0.5];
        assert!(!is_valid(&qs));
    }

    #[test]
    fn test_is_valid_with_infinity() {
        let qs = [0.0, f64::INFINITY, 1.0, -1.0, 0.5, -0.5];
        assert!(!is_valid(&qs));
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(2.0 * PI + 0.5) - 0.5).abs() < 1E-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1E-12);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1E-12);
        assert!((normalize_angle(-2.0 * PI - 0.5) + 0.5).abs() < 1E-12);
    }

    #[test]
    fn test_transition_costs_weighted() {
        let from = [0.0; 6];
        let to = [1.0, 0.0, 0.0, 0.0, 0.0, -2.0];
        let cost = transition_costs(&from, &to, &[2.0, 1.0, 1.0, 1.0, 1.0, 0.5]);
        assert!((cost - 3.0).abs() < 1E-12);
    }

    #[test]
    fn test_max_deviation() {
        assert_eq!(max_deviation(&[0.0, 1.0], &[0.5, 3.0]), 2.0);
        assert!(max_deviation(&[0.0], &[0.0, 1.0]).is_infinite());
    }
}
