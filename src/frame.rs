//! Frame and pose helpers.
//!
//! Poses given to the pick and place tasks are always expressed in the root frame of
//! the robot. Offsets like "lift straight up" are naturally specified in that root frame,
//! while offsets like "back away along the axis of the gripper" are specified relative
//! to the pose they are applied to. [`ReferenceFrame`] tells which of the two is meant,
//! so the conversion is explicit wherever it happens.

use crate::kinematic_traits::{Direction, Pose};
use nalgebra::Translation3;

/// In which frame the direction of the offset or linear motion is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFrame {
    /// Root frame of the robot (world, as far as this crate is concerned)
    Root,
    /// Frame of the pose the offset is applied to (end effector or approach frame)
    Local,
}

/// Returns the pose translated by `distance` along `direction`. The orientation is not
/// changed. For [`ReferenceFrame::Local`], the direction is first rotated by the
/// orientation of `base`. Zero distance returns `base` unchanged and negative
/// distance moves the opposite way.
///
/// ```
/// use nalgebra::{Isometry3, Vector3};
/// use rs_pick_place::frame::{offset_pose, ReferenceFrame};
///
/// let target = Isometry3::translation(0.5, 0.0, 0.3);
/// let pre = offset_pose(&target, &Vector3::z_axis(), 0.1, ReferenceFrame::Local);
/// assert!((pre.translation.vector.z - 0.4).abs() < 1E-12);
/// ```
pub fn offset_pose(base: &Pose, direction: &Direction, distance: f64, frame: ReferenceFrame) -> Pose {
    if distance == 0.0 {
        return *base;
    }
    let offset = direction_in_root(base, direction, frame).into_inner() * distance;
    Pose::from_parts(
        Translation3::from(base.translation.vector + offset),
        base.rotation,
    )
}

/// Direction expressed in the root frame, given the pose of the frame it was
/// expressed in.
pub fn direction_in_root(reference: &Pose, direction: &Direction, frame: ReferenceFrame) -> Direction {
    match frame {
        ReferenceFrame::Root => *direction,
        ReferenceFrame::Local => reference.rotation * *direction,
    }
}

/// Expresses `pose` (given in the root frame) relative to `frame`, also given in the
/// root frame.
pub fn express_in(frame: &Pose, pose: &Pose) -> Pose {
    frame.inverse() * pose
}

/// Compare two poses with the given tolerance, applied both to
/// translation (meters) and rotation (radians).
pub fn compare_poses(ta: &Pose, tb: &Pose, tolerance: f64) -> bool {
    let translation_distance = (ta.translation.vector - tb.translation.vector).norm();
    let angular_distance = ta.rotation.angle_to(&tb.rotation);
    translation_distance <= tolerance && angular_distance <= tolerance
}
