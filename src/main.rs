use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nalgebra::{Translation3, UnitQuaternion};
use tracing::info;

use rs_pick_place::cartesian::LinearCartesianSolver;
use rs_pick_place::config::PickPlaceConfig;
use rs_pick_place::execution::SimulatedRobot;
use rs_pick_place::kinematic_traits::Pose;
use rs_pick_place::motion_backend::RrtBackend;
use rs_pick_place::parameters_robots::{gantry_with_parallel_gripper, home_state};
use rs_pick_place::pick_place::PickPlace;
use rs_pick_place::segment_planner::SegmentPlanner;
use rs_pick_place::validity::{LimitsValidator, StateValidator};
use rs_pick_place::visualization::TracingVisualizer;

/// Plans and executes a pick and a place on the simulated gantry robot.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file with planner settings
    #[arg(long)]
    config: Option<String>,

    /// Pick target x,y,z in meters, gripper pointing down
    #[arg(long, value_delimiter = ',', num_args = 3, default_values_t = [0.5, 0.0, 0.3])]
    pick: Vec<f64>,

    /// Place target x,y,z in meters
    #[arg(long, value_delimiter = ',', num_args = 3, default_values_t = [1.0, -0.4, 0.3])]
    place: Vec<f64>,

    /// Rotation of the place target around the vertical axis, degrees
    #[arg(long, default_value_t = 0.0)]
    place_yaw: f64,

    /// Clearance before engaging, meters
    #[arg(long, default_value_t = 0.1)]
    pre: f64,

    /// Clearance after retreating, meters
    #[arg(long, default_value_t = 0.1)]
    post: f64,

    /// Check the gripper against a table with the top at this height
    #[arg(long)]
    table: Option<f64>,

    /// Take as long to execute as the trajectories say
    #[arg(long)]
    realtime: bool,

    /// Only plan and display, do not execute
    #[arg(long)]
    dry_run: bool,
}

fn position(values: &[f64], name: &str) -> Result<Translation3<f64>> {
    match values {
        [x, y, z] => Ok(Translation3::new(*x, *y, *z)),
        _ => anyhow::bail!("{} needs 3 coordinates, got {}", name, values.len()),
    }
}

#[cfg(feature = "collisions")]
fn validator(table: Option<f64>) -> Result<Arc<dyn StateValidator>> {
    use nalgebra::Isometry3;
    use rs_pick_place::collisions::{CollisionBody, CollisionValidator};

    Ok(match table {
        Some(height) => {
            let height = height as f32;
            let top = CollisionBody::cuboid([2.0, 2.0, 0.05], Isometry3::translation(0.5, 0.0, height - 0.05));
            Arc::new(CollisionValidator::with_tcp_probe(0.02, vec![top]))
        }
        None => Arc::new(LimitsValidator),
    })
}

#[cfg(not(feature = "collisions"))]
fn validator(table: Option<f64>) -> Result<Arc<dyn StateValidator>> {
    if table.is_some() {
        anyhow::bail!("--table requires the 'collisions' feature");
    }
    Ok(Arc::new(LimitsValidator))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rs_pick_place=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => PickPlaceConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to read configuration {}", path))?,
        None => PickPlaceConfig::default(),
    };

    let model = Arc::new(gantry_with_parallel_gripper());
    let robot = Arc::new(SimulatedRobot::new(home_state(&model)).with_realtime(args.realtime));
    let validator = validator(args.table)?;

    let backend = RrtBackend::new(model.clone(), config.rrt.clone(), validator.clone(), robot.clone());
    let mut cartesian = LinearCartesianSolver::new(model.clone(), validator);
    config.configure_cartesian(&mut cartesian);
    let planner = SegmentPlanner::new(model.clone(), Box::new(backend), Box::new(cartesian))
        .with_groups(&config.arm_group, &config.gripper_group)
        .with_timing(config.timing());

    let mut pick_place = PickPlace::new(
        planner,
        Box::new(robot.clone()),
        Box::new(TracingVisualizer { waypoints: false }),
        config.settings(),
    );

    let pick = Pose::from_parts(position(&args.pick, "--pick")?, UnitQuaternion::identity());
    let place = Pose::from_parts(
        position(&args.place, "--place")?,
        UnitQuaternion::from_euler_angles(0.0, 0.0, args.place_yaw.to_radians()),
    );

    pick_place.init_pick(args.pre, args.post, pick)?;
    pick_place.init_place(args.pre, args.post, place)?;
    pick_place.display_task_frames();

    pick_place.plan_pick().context("Planning the pick")?;
    pick_place.plan_place().context("Planning the place")?;
    pick_place.display_trajectory();

    if args.dry_run {
        info!("Dry run, {} segments planned", pick_place.trajectories().len());
        return Ok(());
    }

    pick_place.execute().context("Executing pick and place")?;
    info!("Done, robot at {:?}", robot.state());
    Ok(())
}
