//! Room layout loading.
//!
//! A layout is a JSON description of one room: its size in tiles, wall
//! boxes, furniture objects and guest spawn points. Object types `chair`,
//! `table` and `stove` get their own components; anything else is plain
//! blocking furniture.

use std::collections::BTreeSet;
use std::path::Path;

use hecs::World;
use serde::{Deserialize, Serialize};
use tavern_logic::config::TavernConfig;
use tavern_logic::geometry::{Rect, Vec2};

use crate::components::*;
use crate::error::LayoutError;
use crate::room::TavernRoom;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperties {
    #[serde(default)]
    pub table_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutObject {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub properties: ObjectProperties,
}

impl LayoutObject {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    pub name: String,
    pub width_tiles: u32,
    pub height_tiles: u32,
    #[serde(default)]
    pub walls: Vec<Rect>,
    #[serde(default)]
    pub objects: Vec<LayoutObject>,
    #[serde(default)]
    pub spawn_points: Vec<Vec2>,
    /// Defaults to the room centre.
    #[serde(default)]
    pub player_start: Option<Vec2>,
}

impl RoomLayout {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Spawn a layout's furniture into `world` and build its allocator.
pub fn spawn_room(
    world: &mut World,
    layout: &RoomLayout,
    config: &TavernConfig,
) -> Result<TavernRoom, LayoutError> {
    if layout.width_tiles == 0 || layout.height_tiles == 0 {
        return Err(LayoutError::EmptyRoom {
            width: layout.width_tiles,
            height: layout.height_tiles,
        });
    }

    let mut seen = BTreeSet::new();
    for object in &layout.objects {
        if !seen.insert(object.id.as_str()) {
            return Err(LayoutError::DuplicateObject(object.id.clone()));
        }
    }

    let scale = config.grid_scale.max(1) as usize;
    let mut room = TavernRoom::new(
        layout.name.clone(),
        layout.width_tiles as usize * scale,
        layout.height_tiles as usize * scale,
        config.cell_size(),
    );

    for wall in &layout.walls {
        room.add_wall(*wall);
    }
    for point in &layout.spawn_points {
        room.add_spawn_point(*point);
    }
    let center = Vec2::new(
        layout.width_tiles as f32 * config.tile_size / 2.0,
        layout.height_tiles as f32 * config.tile_size / 2.0,
    );
    room.set_player_start(layout.player_start.unwrap_or(center));

    for object in &layout.objects {
        let id = ObjectId(object.id.clone());
        let hitbox = Hitbox(object.rect());
        match object.kind.as_str() {
            "chair" => {
                let chair = world.spawn((id, hitbox, Chair::new(object.properties.table_id.clone())));
                room.register_chair(chair);
            }
            "table" => {
                let table = world.spawn((id, hitbox, Table, Blocking));
                room.register_table(object.id.clone(), table);
            }
            "stove" => {
                world.spawn((id, hitbox, Stove::default(), Blocking));
            }
            _ => {
                world.spawn((id, hitbox, Blocking));
            }
        }
    }

    if layout.spawn_points.is_empty() {
        log::warn!("room {} has no spawn points; no guests will arrive", layout.name);
    }

    room.rebuild_grid(world);
    log::info!(
        "loaded room {}: {} chairs, {} objects",
        layout.name,
        room.chairs().len(),
        layout.objects.len()
    );
    Ok(room)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tavern_logic::grid::Cell;

    const LAYOUT: &str = r#"{
        "name": "tavern",
        "width_tiles": 6,
        "height_tiles": 4,
        "walls": [ { "x": 0, "y": 0, "w": 288, "h": 12 } ],
        "objects": [
            { "id": "table_1", "type": "table", "x": 96, "y": 96, "width": 48, "height": 48 },
            { "id": "chair_1", "type": "chair", "x": 72, "y": 108, "width": 12, "height": 12,
              "properties": { "table_id": "table_1" } },
            { "id": "stove_1", "type": "stove", "x": 240, "y": 24, "width": 36, "height": 36 },
            { "id": "barrel", "type": "decoration", "x": 0, "y": 150, "width": 24, "height": 24 }
        ],
        "spawn_points": [ { "x": 24, "y": 170 } ]
    }"#;

    #[test]
    fn test_spawn_room() {
        let layout = RoomLayout::from_json(LAYOUT).unwrap();
        let mut world = World::new();
        let room = spawn_room(&mut world, &layout, &TavernConfig::default()).unwrap();

        assert_eq!(room.grid().width(), 24);
        assert_eq!(room.grid().height(), 16);
        assert_eq!(room.chairs().len(), 1);
        assert!(room.table("table_1").is_some());
        assert_eq!(room.table_for_chair(&world, room.chairs()[0]), room.table("table_1"));
        assert_eq!(world.query::<&Stove>().iter().count(), 1);
        // wall + table + stove + barrel
        assert_eq!(room.obstacles().len(), 4);
        assert_eq!(room.player_start(), Vec2::new(144.0, 96.0));

        // Wall row, table and chair cells are blocked.
        assert!(!room.grid().is_walkable(Cell::new(3, 0)));
        assert!(!room.grid().is_walkable(Cell::new(8, 8)));
        assert!(!room.grid().is_walkable(Cell::new(6, 9)));
        assert!(room.grid().is_walkable(Cell::new(2, 5)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{ "name": "dup", "width_tiles": 2, "height_tiles": 2, "objects": [
            { "id": "a", "type": "chair", "x": 0, "y": 0, "width": 12, "height": 12 },
            { "id": "a", "type": "table", "x": 24, "y": 24, "width": 12, "height": 12 } ] }"#;
        let layout = RoomLayout::from_json(json).unwrap();
        let mut world = World::new();
        assert!(matches!(
            spawn_room(&mut world, &layout, &TavernConfig::default()),
            Err(LayoutError::DuplicateObject(id)) if id == "a"
        ));
    }

    #[test]
    fn test_empty_room_rejected() {
        let json = r#"{ "name": "void", "width_tiles": 0, "height_tiles": 3 }"#;
        let layout = RoomLayout::from_json(json).unwrap();
        let mut world = World::new();
        assert!(matches!(
            spawn_room(&mut world, &layout, &TavernConfig::default()),
            Err(LayoutError::EmptyRoom { .. })
        ));
    }
}
