//! Recipe catalog: what the stove can cook and what guests may order.
//!
//! The catalog is loaded from JSON shaped like
//!
//! ```json
//! { "recipes": { "soup": { "ingredients": { "carrot": 2 },
//!                          "result": "soup", "cooking_time": 5, "type": "cooked" } } }
//! ```
//!
//! Recipes live in a `BTreeMap` so iteration order, and therefore seeded
//! random choices, are stable.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_COOKING_TIME, ORDERABLE_TYPES};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read recipe catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse recipe catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Item id -> required count.
    #[serde(default)]
    pub ingredients: BTreeMap<String, u32>,
    /// Produced item id; falls back to the recipe id when absent.
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default = "default_cooking_time")]
    pub cooking_time: f32,
    #[serde(default = "default_amount")]
    pub amount: u32,
    #[serde(rename = "type", default)]
    pub kind: String,
}

fn default_cooking_time() -> f32 {
    DEFAULT_COOKING_TIME
}

fn default_amount() -> u32 {
    1
}

impl Recipe {
    pub fn is_orderable(&self) -> bool {
        ORDERABLE_TYPES.contains(&self.kind.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    recipes: BTreeMap<String, Recipe>,
}

/// Static recipe catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeCatalog {
    recipes: BTreeMap<String, Recipe>,
}

impl RecipeCatalog {
    pub fn new(recipes: BTreeMap<String, Recipe>) -> Self {
        Self { recipes }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self {
            recipes: file.recipes,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a catalog, or an empty one if it cannot be read. Guests then
    /// have nothing to order and fall back to idling.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::warn!("recipe catalog {} unavailable: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn get(&self, recipe_id: &str) -> Option<&Recipe> {
        self.recipes.get(recipe_id)
    }

    pub fn all(&self) -> &BTreeMap<String, Recipe> {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes guests may order, keyed by recipe id.
    pub fn orderable(&self) -> BTreeMap<&str, &Recipe> {
        self.recipes
            .iter()
            .filter(|(_, r)| r.is_orderable())
            .map(|(id, r)| (id.as_str(), r))
            .collect()
    }

    /// Item id a recipe produces.
    pub fn result_item<'a>(&'a self, recipe_id: &'a str) -> &'a str {
        self.recipes
            .get(recipe_id)
            .and_then(|r| r.result.as_deref())
            .unwrap_or(recipe_id)
    }

    /// Cooking time, or the default for unknown recipes.
    pub fn cooking_time(&self, recipe_id: &str) -> f32 {
        self.recipes
            .get(recipe_id)
            .map(|r| r.cooking_time)
            .unwrap_or(DEFAULT_COOKING_TIME)
    }

    /// Recipe whose ingredient list matches `ingredients` exactly.
    pub fn match_ingredients(&self, ingredients: &BTreeMap<String, u32>) -> Option<(&str, &Recipe)> {
        self.recipes
            .iter()
            .find(|(_, r)| !r.ingredients.is_empty() && r.ingredients == *ingredients)
            .map(|(id, r)| (id.as_str(), r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "recipes": {
            "soup": { "ingredients": { "carrot": 2, "water": 1 }, "result": "soup", "cooking_time": 5, "type": "cooked" },
            "bread": { "ingredients": { "flour": 2 }, "result": "bread_loaf", "cooking_time": 8, "type": "baking" },
            "plank": { "ingredients": { "wood": 1 }, "type": "crafted" }
        }
    }"#;

    #[test]
    fn test_parse_and_filter_orderable() {
        let catalog = RecipeCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);
        let orderable = catalog.orderable();
        assert_eq!(orderable.keys().copied().collect::<Vec<_>>(), vec!["bread", "soup"]);
    }

    #[test]
    fn test_result_item_falls_back_to_id() {
        let catalog = RecipeCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.result_item("bread"), "bread_loaf");
        assert_eq!(catalog.result_item("plank"), "plank");
        assert_eq!(catalog.result_item("unknown"), "unknown");
    }

    #[test]
    fn test_cooking_time_defaults() {
        let catalog = RecipeCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.cooking_time("bread"), 8.0);
        assert_eq!(catalog.cooking_time("missing"), DEFAULT_COOKING_TIME);
        assert_eq!(catalog.get("plank").unwrap().cooking_time, DEFAULT_COOKING_TIME);
    }

    #[test]
    fn test_missing_catalog_is_empty() {
        let catalog = RecipeCatalog::load_or_empty("/nonexistent/recipes.json");
        assert!(catalog.is_empty());
        assert!(catalog.orderable().is_empty());
    }

    #[test]
    fn test_match_ingredients() {
        let catalog = RecipeCatalog::from_json(CATALOG).unwrap();
        let mut have = BTreeMap::new();
        have.insert("flour".to_string(), 2);
        assert_eq!(catalog.match_ingredients(&have).map(|(id, _)| id), Some("bread"));
        have.insert("flour".to_string(), 3);
        assert!(catalog.match_ingredients(&have).is_none());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            RecipeCatalog::from_json("{ not json"),
            Err(CatalogError::Parse(_))
        ));
    }
}
