//! Runner configuration surface

use super::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::pool::{CHUNK_POOL, GOAL_POOL, PICKUP_POOL};
use serde::{Deserialize, Serialize};

/// What drives chunk recycling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// A terrain chunk leaving the trailing despawn zone advances the window
    #[default]
    DespawnZone,
    /// The window advances once per frame while the tail is within spawn distance
    SpawnDistance,
}

/// Complete configuration for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunnerConfig {
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,

    /// Sliding window and chunk geometry
    pub track: TrackConfig,

    /// Chunk population
    pub spawner: SpawnerConfig,

    /// Pool capacities
    pub pools: PoolConfig,

    /// World translation
    pub mover: MoverConfig,

    /// Trailing despawn boundary
    pub despawn: DespawnConfig,

    /// Triggers and session timing
    pub gameplay: GameplayConfig,
}

impl Config for RunnerConfig {}

/// Sliding window and chunk geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Number of chunks kept in the window
    pub active_chunk_count: usize,

    /// Length of each chunk along Z
    pub chunk_length: f32,

    /// Distance ahead of the player the tail must stay beyond
    pub spawn_distance: f32,

    /// Lower bound of the per-chunk tilt (degrees)
    pub min_tilt_degrees: f32,

    /// Upper bound of the per-chunk tilt (degrees)
    pub max_tilt_degrees: f32,

    /// Recycling trigger
    pub advance_policy: AdvancePolicy,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            active_chunk_count: 4,
            chunk_length: 100.0,
            spawn_distance: 200.0,
            min_tilt_degrees: 5.0,
            max_tilt_degrees: 20.0,
            advance_policy: AdvancePolicy::DespawnZone,
        }
    }
}

/// Chunk population settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Lateral offsets entities may be placed on
    pub lanes: Vec<f32>,

    /// Minimum obstacles per chunk before density
    pub min_obstacles_per_chunk: u32,

    /// Maximum obstacles per chunk before density
    pub max_obstacles_per_chunk: u32,

    /// Obstacle count multiplier
    pub obstacle_density: f32,

    /// Obstacle height above the ground plane
    pub obstacle_height: f32,

    /// Minimum pickups per chunk
    pub min_pickups_per_chunk: u32,

    /// Maximum pickups per chunk
    pub max_pickups_per_chunk: u32,

    /// Pickup height above the ground plane
    pub pickup_height: f32,

    /// Minimum goals per chunk
    pub min_goals_per_chunk: u32,

    /// Maximum goals per chunk
    pub max_goals_per_chunk: u32,

    /// Goal height above the ground plane
    pub goal_height: f32,

    /// Keeps entities this far from either chunk edge
    pub edge_margin: f32,

    /// Obstacle variants, one pool per key
    pub obstacle_pools: Vec<String>,

    /// Point billboards face
    pub viewpoint: Vec3,

    /// Whether streamed entities are oriented toward the viewpoint
    pub billboards: bool,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            lanes: vec![-2.0, -1.0, 0.0, 1.0, 2.0],
            min_obstacles_per_chunk: 5,
            max_obstacles_per_chunk: 15,
            obstacle_density: 1.0,
            obstacle_height: 0.0,
            min_pickups_per_chunk: 2,
            max_pickups_per_chunk: 5,
            pickup_height: 0.5,
            min_goals_per_chunk: 0,
            max_goals_per_chunk: 1,
            goal_height: 1.0,
            edge_margin: 10.0,
            obstacle_pools: vec!["Tree".to_string(), "Rock".to_string()],
            viewpoint: Vec3::new(0.0, 2.0, -6.0),
            billboards: true,
        }
    }
}

/// Pool capacities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Terrain chunk pool
    pub chunk_capacity: usize,

    /// Capacity of each obstacle variant pool
    pub obstacle_capacity: usize,

    /// Pickup pool
    pub pickup_capacity: usize,

    /// Goal pool
    pub goal_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: 6,
            obstacle_capacity: 50,
            pickup_capacity: 20,
            goal_capacity: 10,
        }
    }
}

/// World translation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoverConfig {
    /// Units per second the world travels toward the player
    pub speed: f32,

    /// Direction of travel; the world moves along its negation
    pub forward_axis: Vec3,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            speed: 20.0,
            forward_axis: Vec3::z(),
        }
    }
}

/// Trailing despawn boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DespawnConfig {
    /// How far behind the player the zone sits
    pub distance_behind_player: f32,

    /// Thickness of the zone along Z
    pub trigger_depth: f32,
}

impl Default for DespawnConfig {
    fn default() -> Self {
        Self {
            distance_behind_player: 50.0,
            trigger_depth: 5.0,
        }
    }
}

/// Slope-driven speed profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeSpeedConfig {
    /// Speed on a flat segment
    pub min_speed: f32,

    /// Speed on a vertical segment
    pub max_speed: f32,

    /// Multiplicative easing per fixed step
    pub ramp_factor: f32,
}

impl Default for SlopeSpeedConfig {
    fn default() -> Self {
        Self {
            min_speed: 10.0,
            max_speed: 60.0,
            ramp_factor: 1.1,
        }
    }
}

/// Trigger behavior and session timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Points a goal awards
    pub goal_points: i32,

    /// Frost removed by a pickup
    pub pickup_frost_reduction: f32,

    /// Horizontal radius within which the player touches an entity
    pub contact_radius: f32,

    /// Delay between starting a game and the track going live
    pub start_delay: f32,

    /// Delay between a failure and the restart
    pub end_delay: f32,

    /// Delay before a pickup burst effect is reset
    pub effect_reset_delay: f32,

    /// Optional slope-driven speed; fixed mover speed when absent
    pub slope_speed: Option<SlopeSpeedConfig>,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            goal_points: 100,
            pickup_frost_reduction: 0.25,
            contact_radius: 0.75,
            start_delay: 3.0,
            end_delay: 3.0,
            effect_reset_delay: 2.0,
            slope_speed: None,
        }
    }
}

impl RunnerConfig {
    /// Check cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let track = &self.track;
        let spawner = &self.spawner;

        if track.active_chunk_count == 0 {
            return Err(ConfigError::Invalid("active_chunk_count must be at least 1".into()));
        }
        if !(track.chunk_length > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "chunk_length must be positive, got {}",
                track.chunk_length
            )));
        }
        check_range("tilt", track.min_tilt_degrees, track.max_tilt_degrees)?;
        if track.max_tilt_degrees.abs() >= 90.0 || track.min_tilt_degrees.abs() >= 90.0 {
            return Err(ConfigError::Invalid("tilt must stay within (-90, 90) degrees".into()));
        }

        if spawner.lanes.is_empty() {
            return Err(ConfigError::Invalid("at least one lane is required".into()));
        }
        if spawner.obstacle_pools.is_empty() {
            return Err(ConfigError::Invalid("at least one obstacle pool is required".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for key in &spawner.obstacle_pools {
            if [CHUNK_POOL, PICKUP_POOL, GOAL_POOL].contains(&key.as_str()) || !seen.insert(key.as_str()) {
                return Err(ConfigError::Invalid(format!("obstacle pool key '{key}' is reused")));
            }
        }
        check_count_range(
            "obstacles",
            spawner.min_obstacles_per_chunk,
            spawner.max_obstacles_per_chunk,
        )?;
        check_count_range("pickups", spawner.min_pickups_per_chunk, spawner.max_pickups_per_chunk)?;
        check_count_range("goals", spawner.min_goals_per_chunk, spawner.max_goals_per_chunk)?;
        if spawner.obstacle_density < 0.0 {
            return Err(ConfigError::Invalid("obstacle_density must not be negative".into()));
        }
        if spawner.edge_margin < 0.0 {
            return Err(ConfigError::Invalid("edge_margin must not be negative".into()));
        }

        if self.pools.chunk_capacity == 0 {
            return Err(ConfigError::Invalid("chunk pool needs at least one instance".into()));
        }
        if self.pools.chunk_capacity < track.active_chunk_count {
            log::warn!(
                "Chunk pool capacity {} is below the window size {}; the window will run short",
                self.pools.chunk_capacity,
                track.active_chunk_count
            );
        }

        if self.mover.forward_axis.norm_squared() < f32::EPSILON {
            return Err(ConfigError::Invalid("forward_axis must be non-zero".into()));
        }
        if self.despawn.trigger_depth < 0.0 {
            return Err(ConfigError::Invalid("trigger_depth must not be negative".into()));
        }
        if let Some(slope) = &self.gameplay.slope_speed {
            check_range("slope speed", slope.min_speed, slope.max_speed)?;
            if slope.ramp_factor <= 1.0 {
                return Err(ConfigError::Invalid("ramp_factor must exceed 1.0".into()));
            }
        }

        Ok(())
    }
}

fn check_range(name: &str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min > max || !min.is_finite() || !max.is_finite() {
        return Err(ConfigError::Invalid(format!("{name} range [{min}, {max}] is inverted")));
    }
    Ok(())
}

fn check_count_range(name: &str, min: u32, max: u32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::Invalid(format!("{name} per chunk range [{min}, {max}] is inverted")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        RunnerConfig::default().validate().expect("defaults should validate");
    }

    #[test]
    fn test_inverted_ranges_rejected() {
        let mut config = RunnerConfig::default();
        config.spawner.min_pickups_per_chunk = 6;
        config.spawner.max_pickups_per_chunk = 2;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = RunnerConfig::default();
        config.track.min_tilt_degrees = 30.0;
        config.track.max_tilt_degrees = 10.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_lanes_rejected() {
        let mut config = RunnerConfig::default();
        config.spawner.lanes.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_reused_pool_keys_rejected() {
        let mut config = RunnerConfig::default();
        config.spawner.obstacle_pools = vec!["Rock".into(), "Rock".into()];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.spawner.obstacle_pools = vec!["HotPickup".into()];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("runner.toml");

        let mut config = RunnerConfig::default();
        config.seed = Some(7);
        config.track.active_chunk_count = 5;
        config.gameplay.slope_speed = Some(SlopeSpeedConfig::default());
        config.save_to_file(&path).expect("Should save");

        let loaded = RunnerConfig::load_from_file(&path).expect("Should load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("runner.ron");
        std::fs::write(&path, "(track: (active_chunk_count: 8))").expect("Should write");

        let loaded = RunnerConfig::load_from_file(&path).expect("Should load");
        assert_eq!(loaded.track.active_chunk_count, 8);
        assert_eq!(loaded.track.chunk_length, 100.0);
        assert_eq!(loaded.spawner, SpawnerConfig::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("runner.json");
        std::fs::write(&path, "{}").expect("Should write");

        assert!(matches!(
            RunnerConfig::load_from_file(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
