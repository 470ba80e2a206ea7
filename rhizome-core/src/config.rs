use std::path::Path;

use glam::Vec3;
use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid JSON for [`GameConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for one game session.
///
/// Rates are applied once per tick; delays are in simulated seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Upper bound on the number of branches, frozen ones included.
    pub max_branches: usize,
    pub max_water: f64,
    pub max_energy: f64,
    /// Water lost every tick.
    pub water_decay_rate: f64,
    /// Energy gained every hydrated tick at full branch factor.
    pub energy_gain_rate: f64,
    /// Half extents of the world box. Tips are clamped to
    /// `[-x, x] × [-y, 0] × [-z, z]`.
    pub world_bounds: Vec3,

    pub initial_nutrients: usize,
    pub initial_water_units: usize,
    pub initial_obstacles: usize,

    /// Speed a fresh branch starts with before the first water-driven update.
    pub root_growth_rate: f32,

    /// Vertical band resources spawn in.
    pub min_resource_depth: f32,
    pub max_resource_depth: f32,
    /// Resources spawn with `|x|, |z| <= spawn_half_extent`.
    pub spawn_half_extent: f32,
    /// Minimum distance between a new nutrient and any obstacle.
    pub nutrient_clearance: f32,
    /// Placement retries before a best-effort position is accepted.
    pub spawn_attempts: u32,
    /// Probability that a spawned nutrient is drawn from the macro tier.
    pub macro_nutrient_chance: f32,
    /// Water restored by one absorbed water unit.
    pub water_unit_value: f64,
    /// Obstacle radius range, `[min, max)`.
    pub obstacle_radius: [f32; 2],

    pub branch_energy_cost: f64,
    /// Scales `energy / max_energy` into the automatic branching chance.
    pub auto_branch_chance_scale: f32,
    pub auto_branch_delay: f64,
    pub water_respawn_max_delay: f64,

    /// Tip-to-obstacle distance that triggers a bounce.
    pub collision_distance: f32,
    /// Tip-to-resource distance that triggers absorption.
    pub absorption_distance: f32,

    pub starting_water: f64,
    pub starting_energy: f64,
    /// Whether a newly constructed session waits for a resume command.
    pub start_paused: bool,
    /// Optional RNG seed for reproducible sessions.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_branches: 15,
            max_water: 100_000.0,
            max_energy: 100_000.0,
            water_decay_rate: 0.0001,
            energy_gain_rate: 0.0001,
            world_bounds: Vec3::new(25.0, 25.0, 25.0),
            initial_nutrients: 50,
            initial_water_units: 100,
            initial_obstacles: 10,
            root_growth_rate: 0.05,
            min_resource_depth: -20.0,
            max_resource_depth: -15.0,
            spawn_half_extent: 20.0,
            nutrient_clearance: 3.0,
            spawn_attempts: 20,
            macro_nutrient_chance: 0.3,
            water_unit_value: 10.0,
            obstacle_radius: [1.0, 3.0],
            branch_energy_cost: 10.0,
            auto_branch_chance_scale: 0.3,
            auto_branch_delay: 0.5,
            water_respawn_max_delay: 10.0,
            collision_distance: 2.0,
            absorption_distance: 1.0,
            starting_water: 100.0,
            starting_energy: 50.0,
            start_paused: true,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Parses a JSON document; absent fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Checks value ranges that the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_branches == 0 {
            return Err(ConfigError::Invalid("max_branches must be non-zero"));
        }
        if self.max_water <= 0.0 || self.max_energy <= 0.0 {
            return Err(ConfigError::Invalid("gauge maxima must be positive"));
        }
        if self.world_bounds.min_element() <= 0.0 {
            return Err(ConfigError::Invalid("world bounds must be positive"));
        }
        if self.min_resource_depth > self.max_resource_depth {
            return Err(ConfigError::Invalid(
                "min_resource_depth cannot exceed max_resource_depth",
            ));
        }
        if self.spawn_half_extent < 0.0
            || self.nutrient_clearance < 0.0
            || self.water_unit_value < 0.0
        {
            return Err(ConfigError::Invalid(
                "spawn extent, clearance and water value must be non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.macro_nutrient_chance) {
            return Err(ConfigError::Invalid(
                "macro_nutrient_chance must be within [0, 1]",
            ));
        }
        if self.obstacle_radius[0] <= 0.0 || self.obstacle_radius[0] > self.obstacle_radius[1] {
            return Err(ConfigError::Invalid(
                "obstacle_radius must be a positive, ordered range",
            ));
        }
        if self.water_decay_rate < 0.0
            || self.energy_gain_rate < 0.0
            || self.branch_energy_cost < 0.0
            || self.auto_branch_chance_scale < 0.0
            || self.auto_branch_delay < 0.0
            || self.water_respawn_max_delay < 0.0
            || self.root_growth_rate < 0.0
        {
            return Err(ConfigError::Invalid(
                "rates, costs and delays must be non-negative",
            ));
        }
        if self.collision_distance <= 0.0 || self.absorption_distance <= 0.0 {
            return Err(ConfigError::Invalid("interaction distances must be positive"));
        }
        if !(0.0..=self.max_water).contains(&self.starting_water)
            || !(0.0..=self.max_energy).contains(&self.starting_energy)
        {
            return Err(ConfigError::Invalid(
                "starting gauges must lie within [0, max]",
            ));
        }
        Ok(())
    }

    /// Returns an RNG seeded from `rng_seed`, or from entropy if absent.
    pub fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::seed_from_u64(rand::random()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg = GameConfig::from_json_str(r#"{ "max_branches": 4, "rng_seed": 9 }"#)
            .expect("partial config should parse");

        assert_eq!(cfg.max_branches, 4);
        assert_eq!(cfg.rng_seed, Some(9));
        assert_eq!(cfg.initial_nutrients, GameConfig::default().initial_nutrients);
    }

    #[test]
    fn inverted_depth_band_is_rejected() {
        let cfg = GameConfig {
            min_resource_depth: -10.0,
            max_resource_depth: -15.0,
            ..GameConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn starting_water_above_max_is_rejected() {
        let cfg = GameConfig {
            max_water: 50.0,
            starting_water: 100.0,
            ..GameConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = GameConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
