//! Default tuning values.
//!
//! These seed [`crate::config::TavernConfig`]'s defaults; code that needs a
//! tunable value should read it from the config instead.

// ── Map ─────────────────────────────────────────────────────────────────
pub const TILE_SIZE: f32 = 48.0;
/// Pathfinding cells per tile edge.
pub const GRID_SCALE: u32 = 4;
/// Interaction reach, in tiles.
pub const INTERACTION_DISTANCE: f32 = 1.1;
/// Hitbox edge for characters, in pixels.
pub const CHARACTER_HITBOX: f32 = 10.0;

// ── Motion ──────────────────────────────────────────────────────────────
pub const PLAYER_SPEED: f32 = 200.0;
pub const PLAYER_FORCE: f32 = 2000.0;
pub const PLAYER_FRICTION: f32 = 0.1;

pub const GUEST_SPEED: f32 = 200.0;
pub const GUEST_FORCE: f32 = 1100.0;
pub const GUEST_FRICTION: f32 = 0.1;

/// Below this speed an idle character is snapped to rest.
pub const STOP_SPEED: f32 = 1.0;
/// Idle becomes Walk above this speed.
pub const WALK_START_SPEED: f32 = 2.0;
/// Walk becomes Idle below this speed.
pub const WALK_STOP_SPEED: f32 = 1.0;
/// A waypoint counts as reached within this fraction of a cell.
pub const WAYPOINT_REACH: f32 = 0.8;

// ── Guest behavior timers (seconds) ─────────────────────────────────────
pub const GUEST_IDLE_MIN: f32 = 10.0;
pub const GUEST_IDLE_MAX: f32 = 10.0;
pub const GUEST_SIT_MIN: f32 = 10.0;
pub const GUEST_SIT_MAX: f32 = 20.0;
pub const GUEST_ORDERING_MIN: f32 = 10.0;
pub const GUEST_ORDERING_MAX: f32 = 15.0;
pub const FIND_CHAIR_TIMEOUT: f32 = 10.0;
/// Eating lasts `cooking_time * EATING_MULTIPLIER`.
pub const EATING_MULTIPLIER: f32 = 1.5;
/// Cooking time assumed for recipes that cannot be resolved.
pub const DEFAULT_COOKING_TIME: f32 = 5.0;

// ── Spawning ────────────────────────────────────────────────────────────
pub const SPAWN_INTERVAL: f32 = 2.0;
pub const MIN_GUESTS: usize = 2;
pub const OPEN_HOUR: u32 = 8;
pub const CLOSE_HOUR: u32 = 22;

// ── Clock ───────────────────────────────────────────────────────────────
/// Game minutes that pass per real second.
pub const MINUTES_PER_SECOND: f32 = 1.0;
pub const START_HOUR: u32 = 8;

// ── Recipes ─────────────────────────────────────────────────────────────
/// Recipe types guests may order.
pub const ORDERABLE_TYPES: &[&str] = &["cooked", "baking"];

// ── Stove ───────────────────────────────────────────────────────────────
pub const STOVE_MAX_FUEL: f32 = 100.0;
pub const STOVE_COOKING_COST: f32 = 15.0;
/// Seconds of burning per unit of fuel.
pub const STOVE_FUEL_BURN_INTERVAL: f32 = 60.0;
pub const STOVE_ENERGY_COST: f32 = 5.0;

// ── Player ──────────────────────────────────────────────────────────────
pub const PLAYER_MAX_ENERGY: f32 = 100.0;
/// At or below this energy the player moves at reduced force.
pub const PLAYER_LOW_ENERGY: f32 = 20.0;
pub const PLAYER_EXHAUSTED_ENERGY: f32 = 5.0;
pub const PLAYER_LOW_ENERGY_MULTIPLIER: f32 = 0.6;
pub const PLAYER_EXHAUSTED_MULTIPLIER: f32 = 0.3;
