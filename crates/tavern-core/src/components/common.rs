//! Components shared by characters and furniture.

use serde::{Deserialize, Serialize};
use tavern_logic::geometry::{Direction, Rect, Vec2};

/// Collision box in world pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Hitbox(pub Rect);

impl Hitbox {
    pub fn center(&self) -> Vec2 {
        self.0.center()
    }
}

/// Direction a character faces; drives animation cues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facing(pub Direction);

/// Layout object id, used as the persistence key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub String);

/// Display name such as `guest_3` or `player`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

/// Marker for entities whose hitbox stops characters and pathfinding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocking;
