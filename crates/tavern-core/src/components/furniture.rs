//! Furniture components.

use std::collections::BTreeMap;

use hecs::Entity;
use serde::{Deserialize, Serialize};
use tavern_logic::constants::{
    STOVE_COOKING_COST, STOVE_FUEL_BURN_INTERVAL, STOVE_MAX_FUEL,
};
use tavern_logic::recipes::RecipeCatalog;

use crate::error::CookError;

/// A seat. Occupancy changes only through [`Chair::occupy`] and
/// [`Chair::vacate`], which the room allocator wraps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chair {
    pub occupied: bool,
    pub occupant: Option<Entity>,
    pub table_id: Option<String>,
}

impl Chair {
    pub fn new(table_id: Option<String>) -> Self {
        Self {
            occupied: false,
            occupant: None,
            table_id,
        }
    }

    /// Check-and-set. Returns false if someone already holds the chair.
    pub fn occupy(&mut self, who: Entity) -> bool {
        if self.occupied {
            return false;
        }
        self.occupied = true;
        self.occupant = Some(who);
        true
    }

    pub fn vacate(&mut self) {
        self.occupied = false;
        self.occupant = None;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Table;

/// Finished dish waiting in the stove's result slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookedItem {
    pub item_id: String,
    pub amount: u32,
}

/// Dish currently on the fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cooking {
    pub recipe_id: String,
    pub result: CookedItem,
    pub remaining: f32,
}

/// Wood-fired stove. Fuel burns while lit, one unit per burn interval;
/// running dry aborts the dish on the fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stove {
    pub fuel: f32,
    pub max_fuel: f32,
    pub burn_timer: f32,
    pub cooking: Option<Cooking>,
    pub result: Option<CookedItem>,
}

impl Default for Stove {
    fn default() -> Self {
        Self {
            fuel: 0.0,
            max_fuel: STOVE_MAX_FUEL,
            burn_timer: 0.0,
            cooking: None,
            result: None,
        }
    }
}

impl Stove {
    pub fn is_lit(&self) -> bool {
        self.fuel > 0.0
    }

    pub fn is_cooking(&self) -> bool {
        self.cooking.is_some()
    }

    /// Add fuel. Refused if it would overflow the tank.
    pub fn add_fuel(&mut self, amount: f32) -> bool {
        if amount <= 0.0 || self.fuel + amount > self.max_fuel {
            return false;
        }
        self.fuel += amount;
        true
    }

    /// Start cooking the recipe whose ingredients match exactly.
    /// Returns the recipe id.
    pub fn start_cooking(
        &mut self,
        catalog: &RecipeCatalog,
        ingredients: &BTreeMap<String, u32>,
    ) -> Result<String, CookError> {
        if self.cooking.is_some() {
            return Err(CookError::Busy);
        }
        if self.result.is_some() {
            return Err(CookError::ResultPending);
        }
        if self.fuel < STOVE_COOKING_COST {
            return Err(CookError::NotEnoughFuel {
                have: self.fuel,
                need: STOVE_COOKING_COST,
            });
        }
        let (recipe_id, recipe) = catalog
            .match_ingredients(ingredients)
            .ok_or(CookError::NoMatchingRecipe)?;

        self.fuel -= STOVE_COOKING_COST;
        self.cooking = Some(Cooking {
            recipe_id: recipe_id.to_string(),
            result: CookedItem {
                item_id: catalog.result_item(recipe_id).to_string(),
                amount: recipe.amount,
            },
            remaining: recipe.cooking_time,
        });
        Ok(recipe_id.to_string())
    }

    pub fn update(&mut self, dt: f32) {
        if self.is_lit() {
            self.burn_timer += dt;
            while self.burn_timer >= STOVE_FUEL_BURN_INTERVAL {
                self.burn_timer -= STOVE_FUEL_BURN_INTERVAL;
                self.fuel -= 1.0;
            }
            if self.fuel <= 0.0 {
                self.fuel = 0.0;
                self.burn_timer = 0.0;
                if let Some(cooking) = self.cooking.take() {
                    log::debug!("stove ran out of fuel while cooking {}", cooking.recipe_id);
                }
            }
        }

        if let Some(cooking) = &mut self.cooking {
            cooking.remaining -= dt;
            if cooking.remaining <= 0.0 {
                self.result = self.cooking.take().map(|c| c.result);
            }
        }
    }

    pub fn take_result(&mut self) -> Option<CookedItem> {
        self.result.take()
    }
}
