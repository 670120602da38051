//! Error types for the simulation crate.

use hecs::Entity;
use thiserror::Error;

/// Room layout loading failures.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read room layout: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse room layout: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("room layout has no area ({width}x{height} tiles)")]
    EmptyRoom { width: u32, height: u32 },
    #[error("duplicate object id `{0}`")]
    DuplicateObject(String),
}

/// Save/load failures.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("room state encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Seating and order bookkeeping failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("character {0:?} already holds an order")]
    DuplicateOrder(Entity),
}

/// Reasons a stove refuses to start cooking.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CookError {
    #[error("stove is already cooking")]
    Busy,
    #[error("result slot is not empty")]
    ResultPending,
    #[error("not enough fuel: have {have}, need {need}")]
    NotEnoughFuel { have: f32, need: f32 },
    #[error("not enough energy: have {have}, need {need}")]
    NotEnoughEnergy { have: f32, need: f32 },
    #[error("no recipe matches the ingredients")]
    NoMatchingRecipe,
    #[error("entity is not a stove")]
    NotAStove,
}

/// Reasons food could not be handed to a guest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("character is not waiting for food")]
    NotWaiting,
    #[error("character has no open order")]
    NoOrder,
    #[error("wrong item: ordered `{ordered}`, offered `{offered}`")]
    WrongItem { ordered: String, offered: String },
    #[error("player is not carrying `{0}`")]
    MissingItem(String),
}
