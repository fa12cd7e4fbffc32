//! Pick and place task sequencing for a robot manipulator with a gripper.
//!
//! A single "pick" or "place" intent (target pose of the end effector plus pre/post
//! clearance distances) is decomposed into an ordered chain of trajectory segments:
//! free space approach into the pre-pose, straight line engage into the target, gripper
//! actuation and straight line retreat. Every segment starts exactly where the previous
//! one ends. The resulting plan can be inspected, displayed and executed segment by
//! segment.
//!
//! # Features
//!
//! - Free space motion is planned with RRT-Connect in the joint space of the planning
//!   group, Cartesian motion by interpolating poses and solving inverse kinematics for
//!   each, with a jump threshold between consecutive joint positions.
//! - Offsets and linear motions are explicitly expressed either in the root frame or in
//!   the frame of the pose they apply to ([`frame::ReferenceFrame`]).
//! - Planning failures are ordinary `Result` errors, never panics. The first failing
//!   segment is reported and the partial plan is discarded.
//! - Motion planning backend, Cartesian solver, state validity, execution and
//!   visualization are traits, so the sequencer can drive other planners or real robots.
//! - Built in gantry robot with a parallel gripper and a simulated executor make the
//!   crate usable end to end without hardware.
//! - Optional collision checking of the gripper against static obstacles (parry3d).
//! - Planner settings can be read from YAML.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rs_pick_place::cartesian::LinearCartesianSolver;
//! use rs_pick_place::execution::SimulatedRobot;
//! use rs_pick_place::kinematic_traits::Pose;
//! use rs_pick_place::motion_backend::RrtBackend;
//! use rs_pick_place::parameters_robots::{gantry_with_parallel_gripper, home_state};
//! use rs_pick_place::pick_place::{PickPlace, PickPlaceSettings};
//! use rs_pick_place::rrt::RRTPlanner;
//! use rs_pick_place::segment_planner::SegmentPlanner;
//! use rs_pick_place::validity::LimitsValidator;
//! use rs_pick_place::visualization::TracingVisualizer;
//!
//! let model = Arc::new(gantry_with_parallel_gripper());
//! let robot = Arc::new(SimulatedRobot::new(home_state(&model)));
//! let backend = RrtBackend::new(model.clone(), RRTPlanner::default(), Arc::new(LimitsValidator), robot.clone());
//! let cartesian = LinearCartesianSolver::new(model.clone(), Arc::new(LimitsValidator));
//! let planner = SegmentPlanner::new(model, Box::new(backend), Box::new(cartesian));
//!
//! let mut pick_place = PickPlace::new(
//!     planner,
//!     Box::new(robot.clone()),
//!     Box::new(TracingVisualizer::default()),
//!     PickPlaceSettings::default(),
//! );
//! pick_place.init_pick(0.1, 0.1, Pose::translation(0.5, 0.0, 0.3)).unwrap();
//! pick_place.plan_pick().unwrap();
//! assert_eq!(pick_place.trajectories().len(), 4);
//! pick_place.execute().unwrap();
//! ```

pub mod kinematic_traits;
pub mod kinematics_impl;
pub mod constraints;
pub mod tool;
pub mod frame;

#[path = "utils/utils.rs"]
pub mod utils;

pub mod annotations;
pub mod robot_model;
pub mod robot_state;
pub mod parameters_robots;

pub mod errors;
pub mod validity;

#[cfg(feature = "collisions")]
pub mod collisions;

#[path = "path_plan/rrt.rs"]
pub mod rrt;

#[path = "path_plan/cartesian.rs"]
pub mod cartesian;

pub mod motion_backend;
pub mod time_parameterization;
pub mod segment_planner;
pub mod execution;

#[path = "visualize/visualization.rs"]
pub mod visualization;

pub mod pick_place;
pub mod config;

#[cfg(test)]
mod tests;
