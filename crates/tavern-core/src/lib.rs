//! Tavern Core - Tavern Simulation Engine
//!
//! An ECS-based simulation of a small tavern: guests wander in during
//! opening hours, find a free chair, order from the recipe catalog, wait to
//! be served, eat and leave. The player walks around, sits down, cooks at
//! the stove and serves the waiting guests.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: The player, guests, chairs, tables and stoves
//! - **Components**: Pure data attached to entities (Hitbox, Motion, Behavior, Chair, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! Each tick runs spawning, the character state machine, physics, stoves and
//! animation cues, in that order.
//!
//! # Example
//!
//! ```rust,no_run
//! use tavern_core::prelude::*;
//! use tavern_core::layout::RoomLayout;
//! use tavern_logic::config::TavernConfig;
//! use tavern_logic::recipes::RecipeCatalog;
//!
//! let layout = RoomLayout::load("data/tavern.json").unwrap();
//! let catalog = RecipeCatalog::load("data/recipes.json").unwrap();
//! let mut engine = TavernEngine::new(&layout, catalog, TavernConfig::default()).unwrap();
//!
//! // Run simulation
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod components;
pub mod engine;
pub mod error;
pub mod layout;
pub mod persistence;
pub mod room;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{Interaction, TavernEngine};
    pub use crate::error::*;
    pub use crate::systems::{SimEvent, SpawnAction};
}
