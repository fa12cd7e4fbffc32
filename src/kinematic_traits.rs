//! Basic types and the kinematics trait the planners are written against.

extern crate nalgebra as na;

use na::{Isometry3, Unit, Vector3};

/// Pose is used a pose of the robot tcp. It contains both Cartesian position and rotation quaternion
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Direction of the straight line motion. Being a unit vector, it cannot be zero.
pub type Direction = Unit<Vector3<f64>>;

/// Positions of the six arm joints. Revolute joints are in radians, prismatic joints in meters.
pub type Joints = [f64; 6];

/// Inverse kinematics may return multiple solutions, best first.
pub type Solutions = Vec<Joints>;

/// Array of joints all at zero.
pub const JOINTS_AT_ZERO: Joints = [0.0; 6];

/// Kind of the joint, needed to know if the joint value can wrap around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Revolute,
    Prismatic,
}

pub trait Kinematics: Send + Sync {
    /// Find inverse kinematics (joint position) for this pose.
    /// This function is faster but does not handle the singularity and J4/J6 case.
    fn inverse(&self, pose: &Pose) -> Solutions;

    /// Find inverse kinematics (joint position) for this pose.
    /// This function handles wrap-around of revolute joints so that the returned solutions
    /// are as close as possible to the previous position. Solutions are sorted by the
    /// proximity to `previous`, closest first.
    fn inverse_continuing(&self, pose: &Pose, previous: &Joints) -> Solutions;

    /// Find forward kinematics (pose from joint positions).
    fn forward(&self, qs: &Joints) -> Pose;

    /// Kinds of the six joints.
    fn joint_kinds(&self) -> [JointKind; 6];
}
