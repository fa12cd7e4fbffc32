use std::sync::Arc;

use crate::cartesian::LinearCartesianSolver;
use crate::config::PickPlaceConfig;
use crate::execution::SimulatedRobot;
use crate::motion_backend::RrtBackend;
use crate::parameters_robots::{gantry_with_parallel_gripper, home_state};
use crate::pick_place::PickPlace;
use crate::robot_model::RobotModel;
use crate::segment_planner::SegmentPlanner;
use crate::validity::StateValidator;
use crate::visualization::TracingVisualizer;

/// Sequencer on the gantry robot, executing on the simulated robot that is also
/// the state source.
pub(crate) struct Cell {
    pub pick_place: PickPlace,
    pub robot: Arc<SimulatedRobot>,
    pub model: Arc<RobotModel>,
}

pub(crate) fn simulated_cell(config: &PickPlaceConfig, validator: Arc<dyn StateValidator>) -> Cell {
    let model = Arc::new(gantry_with_parallel_gripper());
    let robot = Arc::new(SimulatedRobot::new(home_state(&model)));

    let backend = RrtBackend::new(model.clone(), config.rrt.clone(), validator.clone(), robot.clone());
    let mut cartesian = LinearCartesianSolver::new(model.clone(), validator);
    config.configure_cartesian(&mut cartesian);

    let planner = SegmentPlanner::new(model.clone(), Box::new(backend), Box::new(cartesian))
        .with_groups(&config.arm_group, &config.gripper_group)
        .with_timing(config.timing());
    let pick_place = PickPlace::new(
        planner,
        Box::new(robot.clone()),
        Box::new(TracingVisualizer::default()),
        config.settings(),
    );
    Cell {
        pick_place,
        robot,
        model,
    }
}

#[cfg(feature = "allow_filesystem")]
pub(crate) fn load_config(file_path: &str) -> anyhow::Result<PickPlaceConfig> {
    use anyhow::Context;
    PickPlaceConfig::from_yaml_file(file_path)
        .with_context(|| format!("Failed to load configuration from {}", file_path))
}
