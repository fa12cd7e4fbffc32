//! Error types for planning, execution and task sequencing.
//!
//! Infeasible geometry is a routine outcome of planning, not a programming error.
//! It is reported as [`PlanningError`] through `Result` and never panics.

use crate::pick_place::TaskKind;

/// A single planning request could not produce a trajectory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PlanningError {
    /// Free space planner gave up.
    #[error("no path found: {0}")]
    NoPathFound(String),

    /// Inverse kinematics has no valid (within limits, collision free) solution
    /// for the goal pose, or the joint goal itself is not valid.
    #[error("no valid goal configuration")]
    NoValidGoal,

    /// The state planning starts from is out of limits or in collision.
    #[error("start state is not valid")]
    InvalidStartState,

    /// The straight line could only be followed partially.
    #[error("Cartesian path incomplete, achieved {:.1}%", .achieved_fraction * 100.0)]
    CartesianPathIncomplete {
        /// Fraction of the requested distance the path could follow.
        achieved_fraction: f64,
    },

    #[error("unknown named state {name} in group {group}")]
    UnknownNamedState { name: String, group: String },

    #[error("unknown planning group {0}")]
    UnknownGroup(String),

    /// Request parameters make no sense (negative distance, wrong group).
    #[error("invalid planning request: {0}")]
    InvalidRequest(String),
}

/// Execution of a single trajectory failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutionError {
    #[error("trajectory has no waypoints")]
    EmptyTrajectory,

    /// Trajectory does not start where the robot is.
    #[error("trajectory start deviates from the current state by {deviation:.6}")]
    StartStateDeviation { deviation: f64 },

    /// The controller refused or aborted the trajectory.
    #[error("execution rejected: {0}")]
    Rejected(String),
}

/// Failures of the pick and place task sequencer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PickPlaceError {
    /// Some segment could not be planned. The partial plan of this task has been discarded.
    #[error("{task} planning failed at segment '{label}': {source}")]
    PlanningInfeasible {
        task: TaskKind,
        label: String,
        #[source]
        source: PlanningError,
    },

    /// Some segment failed during execution. Remaining segments were not attempted.
    #[error("execution failed at segment '{label}': {source}")]
    ExecutionFailure {
        label: String,
        #[source]
        source: ExecutionError,
    },

    /// Operation called in a state where it cannot do anything (plan without init,
    /// execute without plan).
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// Task configuration rejected at init time.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Configuration file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}
