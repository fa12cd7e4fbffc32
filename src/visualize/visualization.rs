//! Shows poses and planned trajectories. The provided [`TracingVisualizer`] emits
//! structured log events, so a plan can be inspected with any `tracing` subscriber.
//!
//! ```rust
//! use rs_pick_place::kinematic_traits::Pose;
//! use rs_pick_place::visualization::{TracingVisualizer, Visualizer};
//!
//! let visualizer = TracingVisualizer::default();
//! visualizer.display_frames(&[(Pose::translation(0.5, 0.0, 0.3), "target".to_string())]);
//! ```

use crate::kinematic_traits::Pose;
use crate::pick_place::TrajectorySegment;
use crate::utils::format_pose;
use tracing::info;

pub trait Visualizer {
    /// Shows named coordinate frames, poses are in the root frame.
    fn display_frames(&self, frames: &[(Pose, String)]);

    /// Shows the segments in the order given.
    fn display_trajectory(&self, segments: &[TrajectorySegment]);
}

#[derive(Debug, Clone, Default)]
pub struct TracingVisualizer {
    /// Also log every waypoint, not just the segment summary.
    pub waypoints: bool,
}

impl Visualizer for TracingVisualizer {
    fn display_frames(&self, frames: &[(Pose, String)]) {
        for (pose, name) in frames {
            info!(frame = %name, "{}", format_pose(pose));
        }
    }

    fn display_trajectory(&self, segments: &[TrajectorySegment]) {
        for (index, segment) in segments.iter().enumerate() {
            info!(
                index,
                task = %segment.task,
                label = %segment.label,
                group = %segment.trajectory.group,
                waypoints = segment.trajectory.len(),
                "duration {:.3} s, from {:?} to {:?}",
                segment.trajectory.duration(),
                segment.start_state,
                segment.end_state
            );
            if self.waypoints {
                for waypoint in &segment.trajectory.waypoints {
                    info!(
                        "    {:.3} s {:?}: {:?}",
                        waypoint.time_from_start, waypoint.flags, waypoint.state
                    );
                }
            }
        }
    }
}
