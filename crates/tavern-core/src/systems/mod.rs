//! Systems - logic that operates on components

pub mod behavior;
pub mod events;
mod physics;
mod spawn;
mod stove;

pub use behavior::{animation_system, behavior_system, force_state, TickContext};
pub use events::{EventQueue, SimEvent, MAX_QUEUED_EVENTS};
pub use physics::*;
pub use spawn::*;
pub use stove::*;
