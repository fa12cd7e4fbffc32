use crate::kinematic_traits::Pose;
use bitflags::bitflags;
use nalgebra::Translation3;
use std::fmt;

bitflags! {
    /// Flags that can be set on waypoints in the output
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct PathFlags: u32 {
        /// Waypoint is part of the free space movement (joint to joint planning).
        /// It may include very arbitrary joint movements, so the end effector does
        /// not stay on any line here.
        const ONBOARDING =          0b0000_0010;

        /// The movement into this waypoint is part of a Cartesian stroke.
        const CARTESIAN =           0b0000_0100;

        /// Waypoint is a linear interpolation between the start and the goal of the
        /// Cartesian stroke.
        const LIN_INTERP =          0b0000_1000;

        /// Waypoint where the Cartesian stroke starts (normally the pre-pose or the
        /// target pose).
        const LAND =                0b0001_0000;

        /// Waypoint where the Cartesian stroke ends.
        const PARK =                0b0100_0000;

        /// Only the gripper joints move into this waypoint.
        const GRIPPER =             0b1000_0000;
    }
}

/// Pose with flags, used for the intermediate poses of the Cartesian stroke.
#[derive(Clone, Copy)]
pub struct AnnotatedPose {
    pub pose: Pose,
    pub flags: PathFlags,
}

impl AnnotatedPose {
    pub(crate) fn interpolate(&self, other: &AnnotatedPose, p: f64) -> AnnotatedPose {
        assert!((0.0..=1.0).contains(&p));

        // Interpolate translation (linearly)
        let self_translation = &self.pose.translation.vector;
        let other_translation = &other.pose.translation.vector;

        let translation = self_translation.lerp(other_translation, p);
        let rotation = self.pose.rotation.slerp(&other.pose.rotation, p);

        AnnotatedPose {
            pose: Pose::from_parts(Translation3::from(translation), rotation),
            flags: PathFlags::LIN_INTERP,
        }
    }
}

fn flag_representation(flags: &PathFlags) -> String {
    const FLAG_MAP: &[(PathFlags, &str)] = &[
        (PathFlags::LIN_INTERP, "LIN_INTERP"),
        (PathFlags::LAND, "LAND"),
        (PathFlags::PARK, "PARK"),
        (PathFlags::ONBOARDING, "ONBOARDING"),
        (PathFlags::GRIPPER, "GRIPPER"),
        (PathFlags::CARTESIAN, "CARTESIAN"),
    ];

    FLAG_MAP
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" | ")
}

impl fmt::Debug for PathFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag_string = flag_representation(self);
        write!(f, "{}", flag_string)
    }
}

impl fmt::Debug for AnnotatedPose {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let translation = self.pose.translation.vector;
        let rotation = self.pose.rotation;
        write!(
            formatter,
            "{}: [{:.3}, {:.3}, {:.3}], quat {{ w: {:.3}, i: {:.3}, j: {:.3}, k: {:.3} }}",
            flag_representation(&self.flags),
            translation.x,
            translation.y,
            translation.z,
            rotation.w,
            rotation.i,
            rotation.j,
            rotation.k
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_midpoint() {
        let a = AnnotatedPose { pose: Pose::translation(0.0, 0.0, 0.0), flags: PathFlags::LAND };
        let b = AnnotatedPose { pose: Pose::translation(0.0, 0.0, 1.0), flags: PathFlags::PARK };
        let mid = a.interpolate(&b, 0.5);
        assert!((mid.pose.translation.vector.z - 0.5).abs() < 1E-12);
        assert!(mid.flags == PathFlags::LIN_INTERP);
    }

    #[test]
    fn test_flag_representation() {
        assert_eq!(format!("{:?}", PathFlags::GRIPPER), "GRIPPER");
        assert_eq!(format!("{:?}", PathFlags::LAND | PathFlags::ONBOARDING), "LAND | ONBOARDING");
        assert_eq!(format!("{:?}", PathFlags::PARK | PathFlags::CARTESIAN), "PARK | CARTESIAN");
    }
}
