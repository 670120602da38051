//! Character components: identity, motion, seating references and the
//! player's own stats and items.

use std::collections::BTreeMap;

use hecs::Entity;
use serde::{Deserialize, Serialize};
use tavern_logic::constants::{
    PLAYER_EXHAUSTED_ENERGY, PLAYER_EXHAUSTED_MULTIPLIER, PLAYER_LOW_ENERGY,
    PLAYER_LOW_ENERGY_MULTIPLIER, PLAYER_MAX_ENERGY,
};
use tavern_logic::movement::{Kinematics, MotionParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterKind {
    Player,
    Guest,
}

/// An outstanding food order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub character: Entity,
    pub item_id: String,
    pub recipe_id: String,
}

/// Seating and ordering references for a character.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub kind: CharacterKind,
    /// Chair the character is walking to.
    pub target: Option<Entity>,
    /// Chair the character has reserved.
    pub chair: Option<Entity>,
    /// Copy of the character's entry in the room's order list.
    pub order: Option<Order>,
}

impl Character {
    pub fn new(kind: CharacterKind) -> Self {
        Self {
            kind,
            target: None,
            chair: None,
            order: None,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.kind == CharacterKind::Guest
    }
}

/// Physics state plus the tuning it is integrated with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub kin: Kinematics,
    pub params: MotionParams,
}

impl Motion {
    pub fn new(params: MotionParams) -> Self {
        Self {
            kin: Kinematics::default(),
            params,
        }
    }
}

/// Player energy. Spent at the stove, restored by resting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub energy: f32,
    pub max_energy: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            energy: PLAYER_MAX_ENERGY,
            max_energy: PLAYER_MAX_ENERGY,
        }
    }
}

impl PlayerStats {
    /// Spend `amount` if the player has it.
    pub fn spend(&mut self, amount: f32) -> bool {
        if self.energy >= amount {
            self.energy -= amount;
            true
        } else {
            false
        }
    }

    /// Restore up to `amount`, returning how much was actually restored.
    pub fn rest(&mut self, amount: f32) -> f32 {
        let before = self.energy;
        self.energy = (self.energy + amount).min(self.max_energy);
        self.energy - before
    }

    /// Scale applied to the player's movement force.
    pub fn force_multiplier(&self) -> f32 {
        if self.energy <= PLAYER_EXHAUSTED_ENERGY {
            PLAYER_EXHAUSTED_MULTIPLIER
        } else if self.energy <= PLAYER_LOW_ENERGY {
            PLAYER_LOW_ENERGY_MULTIPLIER
        } else {
            1.0
        }
    }
}

/// Anything food can be taken from when serving a guest.
pub trait ItemSource {
    fn count(&self, item_id: &str) -> u32;

    /// Remove one `item_id`; false if none is available.
    fn take(&mut self, item_id: &str) -> bool;
}

/// Items carried by the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn add(&mut self, item_id: &str, amount: u32) {
        if amount > 0 {
            *self.items.entry(item_id.to_string()).or_insert(0) += amount;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemSource for Inventory {
    fn count(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    fn take(&mut self, item_id: &str) -> bool {
        match self.items.get_mut(item_id) {
            Some(n) if *n > 1 => {
                *n -= 1;
                true
            }
            Some(_) => {
                self.items.remove(item_id);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_spend_and_rest() {
        let mut stats = PlayerStats::default();
        assert!(stats.spend(30.0));
        assert!(!stats.spend(80.0));
        assert_eq!(stats.energy, 70.0);
        assert_eq!(stats.rest(50.0), 30.0);
        assert_eq!(stats.energy, 100.0);
    }

    #[test]
    fn test_low_energy_slows_player() {
        let mut stats = PlayerStats::default();
        assert_eq!(stats.force_multiplier(), 1.0);
        stats.energy = 15.0;
        assert_eq!(stats.force_multiplier(), PLAYER_LOW_ENERGY_MULTIPLIER);
        stats.energy = 2.0;
        assert_eq!(stats.force_multiplier(), PLAYER_EXHAUSTED_MULTIPLIER);
    }

    #[test]
    fn test_inventory_take() {
        let mut inv = Inventory::default();
        inv.add("soup", 2);
        assert!(inv.take("soup"));
        assert_eq!(inv.count("soup"), 1);
        assert!(inv.take("soup"));
        assert!(!inv.take("soup"));
        assert!(inv.is_empty());
    }
}
