//! Tunable simulation configuration.
//!
//! Every field has a serde default taken from [`crate::constants`], so a
//! config file only needs to list the values it changes:
//!
//! ```
//! use tavern_logic::config::{TavernConfig, validate_config};
//!
//! let config = TavernConfig::from_json(r#"{ "min_guests": 4, "rng_seed": 7 }"#).unwrap();
//! assert_eq!(config.min_guests, 4);
//! assert!(validate_config(&config).is_empty());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::OpenHours;
use crate::constants::*;
use crate::movement::MotionParams;

/// Inclusive `[min, max]` range in seconds for a randomized timer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerRange {
    pub min: f32,
    pub max: f32,
}

impl TimerRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min >= 0.0 && self.min <= self.max
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TavernConfig {
    // Map
    pub tile_size: f32,
    pub grid_scale: u32,
    /// Reach in tiles for interactions and arrival checks.
    pub interaction_distance: f32,
    pub character_hitbox: f32,

    // Motion
    pub player_motion: MotionParams,
    pub guest_motion: MotionParams,
    pub walk_start_speed: f32,
    pub walk_stop_speed: f32,
    /// Fraction of a cell within which a waypoint counts as reached.
    pub waypoint_reach: f32,

    // Guest behavior
    pub idle_time: TimerRange,
    pub sit_time: TimerRange,
    pub ordering_time: TimerRange,
    pub find_chair_timeout: f32,
    pub eating_multiplier: f32,

    // Spawning
    pub spawn_interval: f32,
    pub min_guests: usize,
    pub open_hours: OpenHours,

    // Clock
    pub minutes_per_second: f32,
    pub start_hour: u32,

    pub rng_seed: u64,
}

impl Default for TavernConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            grid_scale: GRID_SCALE,
            interaction_distance: INTERACTION_DISTANCE,
            character_hitbox: CHARACTER_HITBOX,
            player_motion: MotionParams {
                max_speed: PLAYER_SPEED,
                force: PLAYER_FORCE,
                friction: PLAYER_FRICTION,
            },
            guest_motion: MotionParams {
                max_speed: GUEST_SPEED,
                force: GUEST_FORCE,
                friction: GUEST_FRICTION,
            },
            walk_start_speed: WALK_START_SPEED,
            walk_stop_speed: WALK_STOP_SPEED,
            waypoint_reach: WAYPOINT_REACH,
            idle_time: TimerRange::new(GUEST_IDLE_MIN, GUEST_IDLE_MAX),
            sit_time: TimerRange::new(GUEST_SIT_MIN, GUEST_SIT_MAX),
            ordering_time: TimerRange::new(GUEST_ORDERING_MIN, GUEST_ORDERING_MAX),
            find_chair_timeout: FIND_CHAIR_TIMEOUT,
            eating_multiplier: EATING_MULTIPLIER,
            spawn_interval: SPAWN_INTERVAL,
            min_guests: MIN_GUESTS,
            open_hours: OpenHours::default(),
            minutes_per_second: MINUTES_PER_SECOND,
            start_hour: START_HOUR,
            rng_seed: 0,
        }
    }
}

impl TavernConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    /// Pathfinding cell edge in pixels.
    pub fn cell_size(&self) -> f32 {
        self.tile_size / self.grid_scale.max(1) as f32
    }

    /// Interaction reach in pixels.
    pub fn interaction_range(&self) -> f32 {
        self.interaction_distance * self.tile_size
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Tile size must be positive.
    InvalidTileSize(f32),
    /// Grid scale must be at least 1.
    InvalidGridScale(u32),
    /// Max speed must be positive.
    InvalidMaxSpeed(f32),
    /// Friction must lie in `[0, 1]`.
    InvalidFriction(f32),
    /// Timer range with `min > max` or a negative bound.
    InvalidTimerRange(&'static str),
    /// Walk-stop threshold above walk-start threshold.
    WalkThresholdsInverted,
    /// Spawn interval must be positive.
    InvalidSpawnInterval(f32),
    /// Opening hours outside `0..24`.
    InvalidOpenHours(OpenHours),
    /// Negative clock scale.
    InvalidTimeScale(f32),
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &TavernConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.tile_size <= 0.0 {
        errors.push(ConfigError::InvalidTileSize(config.tile_size));
    }
    if config.grid_scale == 0 {
        errors.push(ConfigError::InvalidGridScale(config.grid_scale));
    }

    for motion in [&config.player_motion, &config.guest_motion] {
        if motion.max_speed <= 0.0 {
            errors.push(ConfigError::InvalidMaxSpeed(motion.max_speed));
        }
        if !(0.0..=1.0).contains(&motion.friction) {
            errors.push(ConfigError::InvalidFriction(motion.friction));
        }
    }

    let ranges = [
        ("idle_time", config.idle_time),
        ("sit_time", config.sit_time),
        ("ordering_time", config.ordering_time),
    ];
    for (name, range) in ranges {
        if !range.is_valid() {
            errors.push(ConfigError::InvalidTimerRange(name));
        }
    }

    if config.walk_stop_speed > config.walk_start_speed {
        errors.push(ConfigError::WalkThresholdsInverted);
    }
    if config.spawn_interval <= 0.0 {
        errors.push(ConfigError::InvalidSpawnInterval(config.spawn_interval));
    }
    if config.open_hours.open >= 24 || config.open_hours.close >= 24 {
        errors.push(ConfigError::InvalidOpenHours(config.open_hours));
    }
    if config.minutes_per_second < 0.0 {
        errors.push(ConfigError::InvalidTimeScale(config.minutes_per_second));
    }

    errors
}
