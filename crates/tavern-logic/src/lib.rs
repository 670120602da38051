//! Pure simulation logic for the tavern.
//!
//! Nothing here knows about entities or the ECS: functions take plain data
//! and return results, so they can be unit-tested in isolation and reused by
//! the engine crate and any tooling.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`clock`] | In-game clock, day wrap and opening hours |
//! | [`config`] | `TavernConfig` tuning with defaults and validation |
//! | [`constants`] | Default tuning values |
//! | [`geometry`] | `Vec2`, `Rect` hitboxes and facing `Direction` |
//! | [`grid`] | Sub-tile walkability grid with a scoped unblock guard |
//! | [`movement`] | Force/friction physics and axis-separated collision |
//! | [`pathfinding`] | 8-directional A* with octile heuristic |
//! | [`recipes`] | Recipe catalog and orderable-recipe filtering |

pub mod clock;
pub mod config;
pub mod constants;
pub mod geometry;
pub mod grid;
pub mod movement;
pub mod pathfinding;
pub mod recipes;
