//! Planner and sequencer settings, optionally read from YAML.
//!
//! All keys are optional, missing ones keep their defaults:
//! ```yaml
//! groups:
//!   arm: arm
//!   gripper: gripper
//! gripper_states:
//!   close: closed
//!   open: open
//! approach_axis: [0.0, 0.0, 1.0]
//! max_distance: 2.0
//! rrt:
//!   step_size_deg: 3.0
//!   max_try: 2000
//!   smoothing: 100
//! cartesian:
//!   check_step_m: 0.005
//!   check_step_deg: 2.0
//!   jump_threshold: 0.1
//! velocity_scaling: 0.5
//! ```

use crate::cartesian::LinearCartesianSolver;
use crate::errors::ConfigError;
use crate::kinematic_traits::Direction;
use crate::pick_place::PickPlaceSettings;
use crate::rrt::RRTPlanner;
use crate::time_parameterization::TimeParameterization;
use nalgebra::Vector3;

#[derive(Debug, Clone)]
pub struct PickPlaceConfig {
    pub arm_group: String,
    pub gripper_group: String,
    pub close_state: String,
    pub open_state: String,
    pub approach_axis: Direction,
    /// Longest pre or post distance a task may be configured with, meters.
    pub max_distance: f64,
    pub rrt: RRTPlanner,
    pub check_step_m: f64,
    pub check_step_rad: f64,
    /// Maximal weighted joint change between two Cartesian waypoints.
    pub jump_threshold: f64,
    pub velocity_scaling: f64,
}

impl Default for PickPlaceConfig {
    fn default() -> Self {
        let settings = PickPlaceSettings::default();
        PickPlaceConfig {
            arm_group: "arm".to_string(),
            gripper_group: "gripper".to_string(),
            close_state: settings.close_state,
            open_state: settings.open_state,
            approach_axis: settings.approach_axis,
            max_distance: settings.max_distance,
            rrt: RRTPlanner::default(),
            check_step_m: 0.005,
            check_step_rad: 2_f64.to_radians(),
            jump_threshold: 0.1,
            velocity_scaling: TimeParameterization::default().velocity_scaling,
        }
    }
}

impl PickPlaceConfig {
    pub fn settings(&self) -> PickPlaceSettings {
        PickPlaceSettings {
            approach_axis: self.approach_axis,
            close_state: self.close_state.clone(),
            open_state: self.open_state.clone(),
            max_distance: self.max_distance,
        }
    }

    /// Same settings with the approach along the given axis of the target frame.
    pub fn with_approach_axis(mut self, axis: Vector3<f64>) -> Result<Self, ConfigError> {
        self.approach_axis = Direction::try_new(axis, 1E-9)
            .ok_or_else(|| invalid("approach_axis", "zero length axis".to_string()))?;
        Ok(self)
    }

    pub fn timing(&self) -> TimeParameterization {
        TimeParameterization::new(self.velocity_scaling)
    }

    /// Copies Cartesian planning settings into the solver.
    pub fn configure_cartesian(&self, solver: &mut LinearCartesianSolver) {
        solver.check_step_m = self.check_step_m;
        solver.check_step_rad = self.check_step_rad;
        solver.max_transition_cost = self.jump_threshold;
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let positive = [
            ("rrt.step_size_deg", self.rrt.step_size_joint_space),
            ("cartesian.check_step_m", self.check_step_m),
            ("cartesian.check_step_deg", self.check_step_rad),
            ("cartesian.jump_threshold", self.jump_threshold),
            ("max_distance", self.max_distance),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(key, format!("must be positive, got {}", value)));
            }
        }
        if !(self.velocity_scaling > 0.0 && self.velocity_scaling <= 1.0) {
            return Err(invalid(
                "velocity_scaling",
                format!("must be in (0, 1], got {}", self.velocity_scaling),
            ));
        }
        if self.rrt.max_try == 0 {
            return Err(invalid("rrt.max_try", "must be at least 1".to_string()));
        }
        Ok(self)
    }
}

fn invalid(key: &str, reason: String) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason,
    }
}

#[cfg(feature = "allow_filesystem")]
mod yaml {
    use super::{invalid, PickPlaceConfig};
    use crate::errors::ConfigError;
    use nalgebra::{Unit, Vector3};
    use std::path::Path;
    use yaml_rust2::{Yaml, YamlLoader};

    fn number(yaml: &Yaml, key: &str) -> Result<Option<f64>, ConfigError> {
        match yaml {
            Yaml::BadValue | Yaml::Null => Ok(None),
            Yaml::Real(_) => Ok(yaml.as_f64()),
            Yaml::Integer(value) => Ok(Some(*value as f64)),
            _ => Err(invalid(key, format!("number expected, got {:?}", yaml))),
        }
    }

    fn count(yaml: &Yaml, key: &str) -> Result<Option<usize>, ConfigError> {
        match yaml {
            Yaml::BadValue | Yaml::Null => Ok(None),
            Yaml::Integer(value) if *value >= 0 => Ok(Some(*value as usize)),
            _ => Err(invalid(key, format!("non negative integer expected, got {:?}", yaml))),
        }
    }

    fn string(yaml: &Yaml, key: &str) -> Result<Option<String>, ConfigError> {
        match yaml {
            Yaml::BadValue | Yaml::Null => Ok(None),
            Yaml::String(value) => Ok(Some(value.clone())),
            _ => Err(invalid(key, format!("string expected, got {:?}", yaml))),
        }
    }

    fn axis(yaml: &Yaml, key: &str) -> Result<Option<Unit<Vector3<f64>>>, ConfigError> {
        let Some(items) = yaml.as_vec() else {
            return match yaml {
                Yaml::BadValue | Yaml::Null => Ok(None),
                _ => Err(invalid(key, "list of 3 numbers expected".to_string())),
            };
        };
        if items.len() != 3 {
            return Err(invalid(key, format!("3 components expected, got {}", items.len())));
        }
        let mut v = Vector3::zeros();
        for (i, item) in items.iter().enumerate() {
            v[i] = number(item, key)?.ok_or_else(|| invalid(key, "missing component".to_string()))?;
        }
        Unit::try_new(v, 1E-9)
            .map(Some)
            .ok_or_else(|| invalid(key, "zero length axis".to_string()))
    }

    impl PickPlaceConfig {
        /// Reads settings from YAML text, missing keys keep defaults.
        pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
            let docs = YamlLoader::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
            let mut config = PickPlaceConfig::default();
            let Some(doc) = docs.first() else {
                return Ok(config);
            };
            if !matches!(doc, Yaml::Hash(_) | Yaml::Null) {
                return Err(ConfigError::Parse("top level must be a mapping".to_string()));
            }

            if let Some(v) = string(&doc["groups"]["arm"], "groups.arm")? {
                config.arm_group = v;
            }
            if let Some(v) = string(&doc["groups"]["gripper"], "groups.gripper")? {
                config.gripper_group = v;
            }
            if let Some(v) = string(&doc["gripper_states"]["close"], "gripper_states.close")? {
                config.close_state = v;
            }
            if let Some(v) = string(&doc["gripper_states"]["open"], "gripper_states.open")? {
                config.open_state = v;
            }
            if let Some(v) = axis(&doc["approach_axis"], "approach_axis")? {
                config.approach_axis = v;
            }
            if let Some(v) = number(&doc["max_distance"], "max_distance")? {
                config.max_distance = v;
            }

            let rrt = &doc["rrt"];
            if let Some(v) = number(&rrt["step_size_deg"], "rrt.step_size_deg")? {
                config.rrt.step_size_joint_space = v.to_radians();
            }
            if let Some(v) = count(&rrt["max_try"], "rrt.max_try")? {
                config.rrt.max_try = v;
            }
            if let Some(v) = count(&rrt["smoothing"], "rrt.smoothing")? {
                config.rrt.num_smoothing = v;
            }

            let cartesian = &doc["cartesian"];
            if let Some(v) = number(&cartesian["check_step_m"], "cartesian.check_step_m")? {
                config.check_step_m = v;
            }
            if let Some(v) = number(&cartesian["check_step_deg"], "cartesian.check_step_deg")? {
                config.check_step_rad = v.to_radians();
            }
            if let Some(v) = number(&cartesian["jump_threshold"], "cartesian.jump_threshold")? {
                config.jump_threshold = v;
            }
            if let Some(v) = number(&doc["velocity_scaling"], "velocity_scaling")? {
                config.velocity_scaling = v;
            }

            config.validate()
        }

        pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let contents = std::fs::read_to_string(path)?;
            Self::from_yaml_str(&contents)
        }
    }
}
