//! Pick and place task sequencer.
//!
//! A pick (or place) is given as the target pose of the end effector plus two clearance
//! distances. Planning decomposes it into four segments, each starting where the
//! previous one ends:
//!
//! | label                   | motion                                               |
//! |-------------------------|------------------------------------------------------|
//! | `approach`              | free space motion into the pre-pose                  |
//! | `engage`                | straight line from the pre-pose into the target      |
//! | `grasp` / `release`     | gripper closes (pick) or opens (place)               |
//! | `retreat`               | straight line back along the approach axis           |
//!
//! Pre-pose and post-pose are offset from the target along the approach axis, which is
//! expressed in the frame of the target pose itself (by default local +Z).
//!
//! The plan is an ordered list of segments, execution order is insertion order.
//! Re-planning or re-initializing a task replaces its segments, never appends to them.
//! Segments planned after the replaced ones started from a state that is gone, so they
//! are dropped too and their task must be planned again.

use crate::errors::{PickPlaceError, PlanningError};
use crate::execution::ExecutionBackend;
use crate::frame::{express_in, offset_pose, ReferenceFrame};
use crate::kinematic_traits::{Direction, Pose};
use crate::motion_backend::PlannedMotion;
use crate::robot_state::{RobotState, RobotTrajectory};
use crate::segment_planner::SegmentPlanner;
use crate::utils::format_pose;
use crate::visualization::Visualizer;
use nalgebra::Vector3;
use std::fmt;
use tracing::{debug, info, warn};

pub const APPROACH: &str = "approach";
pub const ENGAGE: &str = "engage";
pub const GRASP: &str = "grasp";
pub const RELEASE: &str = "release";
pub const RETREAT: &str = "retreat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Pick,
    Place,
}

impl TaskKind {
    pub const ALL: [TaskKind; 2] = [TaskKind::Pick, TaskKind::Place];

    fn index(self) -> usize {
        match self {
            TaskKind::Pick => 0,
            TaskKind::Place => 1,
        }
    }

    /// Label of the gripper segment of this task.
    pub fn gripper_label(self) -> &'static str {
        match self {
            TaskKind::Pick => GRASP,
            TaskKind::Place => RELEASE,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Pick => write!(f, "pick"),
            TaskKind::Place => write!(f, "place"),
        }
    }
}

/// Configuration of one task. Distances are finite and non negative, the target pose
/// is in the root frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskConfig {
    pub pre_distance: f64,
    pub post_distance: f64,
    pub target_pose: Pose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Unconfigured,
    Configured,
    Planned,
    PlanningFailed,
    Executed,
}

/// Independently planned unit of motion, immutable once created.
#[derive(Debug, Clone)]
pub struct TrajectorySegment {
    pub trajectory: RobotTrajectory,
    pub label: String,
    pub task: TaskKind,
    pub start_state: RobotState,
    pub end_state: RobotState,
}

/// How the tasks map onto the robot: the approach axis and the gripper named states.
#[derive(Debug, Clone)]
pub struct PickPlaceSettings {
    /// Axis of the target frame along which the gripper approaches and retreats.
    pub approach_axis: Direction,

    /// Named state of the gripper group that holds the object.
    pub close_state: String,

    /// Named state of the gripper group that lets the object go.
    pub open_state: String,

    /// Pre and post distances above this (meters) are refused at configuration.
    pub max_distance: f64,
}

impl Default for PickPlaceSettings {
    fn default() -> Self {
        PickPlaceSettings {
            approach_axis: Vector3::z_axis(),
            close_state: "closed".to_string(),
            open_state: "open".to_string(),
            max_distance: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Task {
    config: Option<TaskConfig>,
    status: TaskStatus,
}

pub struct PickPlace {
    planner: SegmentPlanner,
    executor: Box<dyn ExecutionBackend>,
    visualizer: Box<dyn Visualizer>,
    settings: PickPlaceSettings,
    tasks: [Task; 2],
    trajectories: Vec<TrajectorySegment>,
}

impl PickPlace {
    pub fn new(
        planner: SegmentPlanner,
        executor: Box<dyn ExecutionBackend>,
        visualizer: Box<dyn Visualizer>,
        settings: PickPlaceSettings,
    ) -> Self {
        PickPlace {
            planner,
            executor,
            visualizer,
            settings,
            tasks: [Task {
                config: None,
                status: TaskStatus::Unconfigured,
            }; 2],
            trajectories: Vec::new(),
        }
    }

    /// Configures the pick. Invalid input is rejected and leaves the sequencer untouched.
    pub fn init_pick(&mut self, pre_distance: f64, post_distance: f64, target_pose: Pose) -> Result<(), PickPlaceError> {
        self.init_task(TaskKind::Pick, pre_distance, post_distance, target_pose)
    }

    /// Configures the place. Invalid input is rejected and leaves the sequencer untouched.
    pub fn init_place(&mut self, pre_distance: f64, post_distance: f64, target_pose: Pose) -> Result<(), PickPlaceError> {
        self.init_task(TaskKind::Place, pre_distance, post_distance, target_pose)
    }

    fn init_task(
        &mut self,
        kind: TaskKind,
        pre_distance: f64,
        post_distance: f64,
        target_pose: Pose,
    ) -> Result<(), PickPlaceError> {
        for (name, value) in [("pre_distance", pre_distance), ("post_distance", post_distance)] {
            if !value.is_finite() || value < 0.0 {
                return Err(PickPlaceError::InvalidConfiguration(format!(
                    "{} {} must be finite and non negative, got {}",
                    kind, name, value
                )));
            }
            if value > self.settings.max_distance {
                return Err(PickPlaceError::InvalidConfiguration(format!(
                    "{} {} {} exceeds the limit of {} m",
                    kind, name, value, self.settings.max_distance
                )));
            }
        }
        let translation = target_pose.translation.vector;
        let rotation = target_pose.rotation.coords;
        if !translation.iter().chain(rotation.iter()).all(|v| v.is_finite()) {
            return Err(PickPlaceError::InvalidConfiguration(format!(
                "{} target pose is not finite",
                kind
            )));
        }

        let arm_root = self.planner.model.arm_root_pose;
        info!(
            "{} at {} ({} relative to {}), pre {:.3}, post {:.3}",
            kind,
            format_pose(&target_pose),
            format_pose(&express_in(&arm_root, &target_pose)),
            self.planner.model.arm_root_link(),
            pre_distance,
            post_distance
        );
        self.remove_segments(kind);
        self.tasks[kind.index()] = Task {
            config: Some(TaskConfig {
                pre_distance,
                post_distance,
                target_pose,
            }),
            status: TaskStatus::Configured,
        };
        Ok(())
    }

    /// Plans the pick from the assumed current state: where the remaining plan ends,
    /// or the current state of the robot if nothing else is planned.
    pub fn plan_pick(&mut self) -> Result<(), PickPlaceError> {
        self.plan_task(TaskKind::Pick, None)
    }

    /// Plans the place from the assumed current state, like [`PickPlace::plan_pick`].
    pub fn plan_place(&mut self) -> Result<(), PickPlaceError> {
        self.plan_task(TaskKind::Place, None)
    }

    /// Plans the pick starting from the given state.
    pub fn plan_pick_from(&mut self, start: &RobotState) -> Result<(), PickPlaceError> {
        self.plan_task(TaskKind::Pick, Some(start))
    }

    /// Plans the place starting from the given state.
    pub fn plan_place_from(&mut self, start: &RobotState) -> Result<(), PickPlaceError> {
        self.plan_task(TaskKind::Place, Some(start))
    }

    fn plan_task(&mut self, kind: TaskKind, start: Option<&RobotState>) -> Result<(), PickPlaceError> {
        let config = self.tasks[kind.index()].config.ok_or_else(|| {
            PickPlaceError::PreconditionViolation(format!("{} is not initialized", kind))
        })?;
        self.remove_segments(kind);

        let start = match start {
            Some(state) => state.clone(),
            None => self.assumed_state(),
        };

        match self.build_chain(kind, &config, &start) {
            Ok(segments) => {
                info!(
                    "{} planned: {} segments, {:.3} s",
                    kind,
                    segments.len(),
                    segments.iter().map(|s| s.trajectory.duration()).sum::<f64>()
                );
                self.trajectories.extend(segments);
                self.tasks[kind.index()].status = TaskStatus::Planned;
                Ok(())
            }
            Err((label, source)) => {
                warn!("{} planning failed at {}: {}", kind, label, source);
                self.tasks[kind.index()].status = TaskStatus::PlanningFailed;
                Err(PickPlaceError::PlanningInfeasible {
                    task: kind,
                    label: label.to_string(),
                    source,
                })
            }
        }
    }

    /// End state of the plan, or the robot state if there is no plan.
    fn assumed_state(&self) -> RobotState {
        match self.trajectories.last() {
            Some(segment) => segment.end_state.clone(),
            None => self.planner.current_robot_state(),
        }
    }

    /// Plans all four segments, stopping at the first one that fails.
    fn build_chain(
        &self,
        kind: TaskKind,
        config: &TaskConfig,
        start: &RobotState,
    ) -> Result<Vec<TrajectorySegment>, (&'static str, PlanningError)> {
        let axis = self.settings.approach_axis;
        let gripper_state = match kind {
            TaskKind::Pick => &self.settings.close_state,
            TaskKind::Place => &self.settings.open_state,
        };
        let pre_pose = offset_pose(&config.target_pose, &axis, config.pre_distance, ReferenceFrame::Local);
        debug!("{} pre-pose {}", kind, format_pose(&pre_pose));

        let mut segments = Vec::with_capacity(4);
        let mut state = start.clone();

        let motion = self.planner.plan_to(&state, &pre_pose).map_err(|e| (APPROACH, e))?;
        state = Self::push_segment(&mut segments, kind, APPROACH, state, motion);

        let motion = self
            .planner
            .plan_relative(&state, &-axis, ReferenceFrame::Local, config.pre_distance)
            .map_err(|e| (ENGAGE, e))?;
        state = Self::push_segment(&mut segments, kind, ENGAGE, state, motion);

        let label = kind.gripper_label();
        let motion = self
            .planner
            .plan_gripper(&state, gripper_state)
            .map_err(|e| (label, e))?;
        state = Self::push_segment(&mut segments, kind, label, state, motion);

        let motion = self
            .planner
            .plan_relative(&state, &axis, ReferenceFrame::Local, config.post_distance)
            .map_err(|e| (RETREAT, e))?;
        Self::push_segment(&mut segments, kind, RETREAT, state, motion);

        Ok(segments)
    }

    /// Appends the segment and returns its end state.
    fn push_segment(
        segments: &mut Vec<TrajectorySegment>,
        task: TaskKind,
        label: &str,
        start_state: RobotState,
        motion: PlannedMotion,
    ) -> RobotState {
        let end_state = motion.end_state.clone();
        debug!("  {} {}: {} waypoints, ends {:?}", task, label, motion.trajectory.len(), end_state);
        segments.push(TrajectorySegment {
            trajectory: motion.trajectory,
            label: label.to_string(),
            task,
            start_state,
            end_state: motion.end_state,
        });
        end_state
    }

    /// Drops the segments of the task and everything chained after them. Other tasks
    /// losing their segments this way go back to [`TaskStatus::Configured`].
    fn remove_segments(&mut self, kind: TaskKind) {
        let Some(first) = self.trajectories.iter().position(|segment| segment.task == kind) else {
            return;
        };
        for segment in self.trajectories.drain(first..) {
            let task = &mut self.tasks[segment.task.index()];
            if segment.task != kind && task.status == TaskStatus::Planned {
                info!("{} was planned after {} and must be planned again", segment.task, kind);
                task.status = TaskStatus::Configured;
            }
        }
    }

    /// Executes the plan, segment after segment, stopping at the first failure. The plan
    /// is consumed in both cases. Tasks whose segments were all executed become
    /// [`TaskStatus::Executed`], others go back to [`TaskStatus::Configured`].
    pub fn execute(&mut self) -> Result<(), PickPlaceError> {
        if self.trajectories.is_empty() {
            return Err(PickPlaceError::PreconditionViolation(
                "nothing planned to execute".to_string(),
            ));
        }
        let plan = std::mem::take(&mut self.trajectories);
        let mut remaining = [0usize; 2];
        for segment in &plan {
            remaining[segment.task.index()] += 1;
        }

        let mut result = Ok(());
        for segment in &plan {
            info!("Executing {} {}", segment.task, segment.label);
            if let Err(source) = self.executor.execute(&segment.trajectory) {
                warn!("Execution of {} {} failed: {}", segment.task, segment.label, source);
                result = Err(PickPlaceError::ExecutionFailure {
                    label: segment.label.clone(),
                    source,
                });
                break;
            }
            remaining[segment.task.index()] -= 1;
        }

        for kind in TaskKind::ALL {
            if plan.iter().any(|segment| segment.task == kind) {
                self.tasks[kind.index()].status = if remaining[kind.index()] == 0 {
                    TaskStatus::Executed
                } else {
                    TaskStatus::Configured
                };
            }
        }
        result
    }

    pub fn display_frames(&self, frames: &[(Pose, String)]) {
        self.visualizer.display_frames(frames);
    }

    pub fn display_trajectory(&self) {
        self.visualizer.display_trajectory(&self.trajectories);
    }

    /// Shows target, pre-pose and post-pose of every configured task.
    pub fn display_task_frames(&self) {
        let mut frames = Vec::new();
        for kind in TaskKind::ALL {
            if let (Some(config), Some(pre), Some(post)) = (self.config(kind), self.pre_pose(kind), self.post_pose(kind)) {
                frames.push((config.target_pose, format!("{}_target", kind)));
                frames.push((pre, format!("{}_pre", kind)));
                frames.push((post, format!("{}_post", kind)));
            }
        }
        self.visualizer.display_frames(&frames);
    }

    /// The plan, in execution order.
    pub fn trajectories(&self) -> &[TrajectorySegment] {
        &self.trajectories
    }

    pub fn status(&self, kind: TaskKind) -> TaskStatus {
        self.tasks[kind.index()].status
    }

    pub fn config(&self, kind: TaskKind) -> Option<&TaskConfig> {
        self.tasks[kind.index()].config.as_ref()
    }

    pub fn settings(&self) -> &PickPlaceSettings {
        &self.settings
    }

    pub fn planner(&self) -> &SegmentPlanner {
        &self.planner
    }

    pub fn pre_pose(&self, kind: TaskKind) -> Option<Pose> {
        self.config(kind).map(|c| {
            offset_pose(&c.target_pose, &self.settings.approach_axis, c.pre_distance, ReferenceFrame::Local)
        })
    }

    pub fn post_pose(&self, kind: TaskKind) -> Option<Pose> {
        self.config(kind).map(|c| {
            offset_pose(&c.target_pose, &self.settings.approach_axis, c.post_distance, ReferenceFrame::Local)
        })
    }
}
