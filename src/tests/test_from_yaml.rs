#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::errors::ConfigError;
    use crate::config::PickPlaceConfig;
    use crate::kinematic_traits::Pose;
    use crate::tests::test_utils::{load_config, simulated_cell};
    use crate::validity::LimitsValidator;

    const READ_ERROR: &str = "Failed to load configuration";

    #[test]
    fn test_config_from_yaml() {
        let config = load_config("src/tests/data/pick_place.yaml").expect(READ_ERROR);
        assert_eq!(config.rrt.max_try, 3000);
        assert_eq!(config.rrt.num_smoothing, 50);
        assert!((config.rrt.step_size_joint_space - 2.5_f64.to_radians()).abs() < 1E-12);
        assert!((config.check_step_m - 0.01).abs() < 1E-12);
        assert!((config.check_step_rad - 1.5_f64.to_radians()).abs() < 1E-12);
        assert!((config.jump_threshold - 0.2).abs() < 1E-12);
        assert!((config.velocity_scaling - 0.8).abs() < 1E-12);
        assert_eq!(config.close_state, "closed");
    }

    #[test]
    fn test_configured_cell_plans() {
        let config = load_config("src/tests/data/pick_place.yaml").expect(READ_ERROR);
        let mut cell = simulated_cell(&config, Arc::new(LimitsValidator));
        cell.pick_place.init_pick(0.1, 0.1, Pose::translation(0.4, -0.2, 0.3)).unwrap();
        cell.pick_place.plan_pick().unwrap();
        // 1 cm check step: the 10 cm engage has 10 steps plus the start
        assert_eq!(cell.pick_place.trajectories()[1].trajectory.len(), 11);
    }

    #[test]
    fn test_invalid_scaling_rejected() {
        let result = PickPlaceConfig::from_yaml_file("src/tests/data/bad_scaling.yaml");
        match result {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "velocity_scaling"),
            other => panic!("Expected invalid value, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = PickPlaceConfig::from_yaml_file("src/tests/data/does_not_exist.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
