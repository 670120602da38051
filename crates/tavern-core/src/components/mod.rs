//! Component definitions for the ECS simulation.
//!
//! Components are plain data attached to entities. Behavior that spans
//! entities lives in systems and the room allocator.

mod behavior;
mod character;
mod common;
mod furniture;

pub use behavior::*;
pub use character::*;
pub use common::*;
pub use furniture::*;
