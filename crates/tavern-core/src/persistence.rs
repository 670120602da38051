//! Save/Load functionality for persisting game state
//!
//! The save file is a bincode-encoded [`GameState`]: the clock, the player
//! and one [`RoomSave`] per visited room. A room save maps object ids to
//! the JSON-encoded state of that object. Guests and chair occupancy are
//! not saved; guests respawn and every chair starts free.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use hecs::World;
use serde::{Deserialize, Serialize};
use tavern_logic::clock::GameClock;
use tavern_logic::geometry::Vec2;

use crate::components::*;
use crate::error::SaveError;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Per-room object state, keyed by object id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomSave {
    pub objects: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSave {
    pub position: Vec2,
    pub stats: PlayerStats,
    pub inventory: Inventory,
    pub last_room: String,
}

/// Everything that survives between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub version: u32,
    pub clock: GameClock,
    pub player: PlayerSave,
    pub rooms: BTreeMap<String, RoomSave>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            clock: GameClock::default(),
            player: PlayerSave::default(),
            rooms: BTreeMap::new(),
        }
    }
}

/// Collect the persistent state of a room's objects.
///
/// Tables and plain furniture record only their id; stoves record their
/// fuel and cooking state. Chairs are skipped entirely.
pub fn save_room(world: &World) -> Result<RoomSave, SaveError> {
    let mut save = RoomSave::default();
    for (_, (id, stove, chair)) in world
        .query::<(&ObjectId, Option<&Stove>, Option<&Chair>)>()
        .iter()
    {
        if chair.is_some() {
            continue;
        }
        let state = match stove {
            Some(stove) => serde_json::to_string(stove)?,
            None => "{}".to_string(),
        };
        save.objects.insert(id.0.clone(), state);
    }
    Ok(save)
}

/// Restore object state from a room save.
///
/// Missing entries keep their defaults. Entries that fail to parse are
/// logged and skipped, so one bad object never fails the whole room.
pub fn apply_room_save(world: &mut World, save: &RoomSave) {
    for (_, (id, stove)) in world.query_mut::<(&ObjectId, &mut Stove)>() {
        let Some(json) = save.objects.get(&id.0) else {
            continue;
        };
        match serde_json::from_str::<Stove>(json) {
            Ok(loaded) => *stove = loaded,
            Err(e) => log::warn!("ignoring saved state for {}: {}", id.0, e),
        }
    }
}

/// Save the game state to a writer
pub fn save_game<W: Write>(writer: W, state: &GameState) -> Result<(), SaveError> {
    let mut state = state.clone();
    state.version = SAVE_VERSION;
    bincode::serialize_into(writer, &state)?;
    Ok(())
}

/// Load a game state from a reader
pub fn load_game<R: Read>(reader: R) -> Result<GameState, SaveError> {
    let state: GameState = bincode::deserialize_from(reader)?;
    if state.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: state.version,
        });
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tavern_logic::geometry::Rect;

    fn furnished_world() -> World {
        let mut world = World::new();
        world.spawn((ObjectId("table_1".into()), Table, Blocking));
        world.spawn((ObjectId("chair_1".into()), Chair::new(Some("table_1".into()))));
        let mut stove = Stove::default();
        stove.add_fuel(40.0);
        world.spawn((ObjectId("stove_1".into()), Hitbox(Rect::default()), stove, Blocking));
        world
    }

    #[test]
    fn test_room_save_skips_chairs() {
        let world = furnished_world();
        let save = save_room(&world).unwrap();
        assert_eq!(save.objects.len(), 2);
        assert_eq!(save.objects.get("table_1").map(String::as_str), Some("{}"));
        assert!(!save.objects.contains_key("chair_1"));
        assert!(save.objects["stove_1"].contains("\"fuel\":40"));
    }

    #[test]
    fn test_stove_state_restored() {
        let saved = save_room(&furnished_world()).unwrap();

        let mut world = World::new();
        world.spawn((ObjectId("stove_1".into()), Stove::default()));
        apply_room_save(&mut world, &saved);
        let fuel = world.query::<&Stove>().iter().map(|(_, s)| s.fuel).next();
        assert_eq!(fuel, Some(40.0));
    }

    #[test]
    fn test_lenient_stove_load() {
        let mut save = RoomSave::default();
        // Missing fields default, unknown fields are ignored.
        save.objects
            .insert("a".into(), r#"{ "fuel": 12.5, "colour": "black" }"#.into());
        save.objects.insert("b".into(), "not json".into());

        let mut world = World::new();
        let a = world.spawn((ObjectId("a".into()), Stove::default()));
        let b = world.spawn((ObjectId("b".into()), Stove::default()));
        apply_room_save(&mut world, &save);

        let stove_a = (*world.get::<&Stove>(a).unwrap()).clone();
        assert_eq!(stove_a.fuel, 12.5);
        assert_eq!(stove_a.max_fuel, Stove::default().max_fuel);
        assert_eq!(*world.get::<&Stove>(b).unwrap(), Stove::default());
    }

    #[test]
    fn test_game_state_roundtrip() {
        let mut state = GameState::default();
        state.clock = GameClock::at(3, 14, 30.0);
        state.player.position = Vec2::new(100.0, 50.0);
        state.player.stats.energy = 42.0;
        state.player.inventory.add("soup", 2);
        state.player.last_room = "tavern".into();
        state.rooms.insert("tavern".into(), save_room(&furnished_world()).unwrap());

        let mut buffer = Vec::new();
        save_game(&mut buffer, &state).unwrap();
        let loaded = load_game(&buffer[..]).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_version_mismatch() {
        let mut state = GameState::default();
        state.version = SAVE_VERSION + 1;
        let mut buffer = Vec::new();
        bincode::serialize_into(&mut buffer, &state).unwrap();
        assert!(matches!(
            load_game(&buffer[..]),
            Err(SaveError::VersionMismatch { found, .. }) if found == SAVE_VERSION + 1
        ));
    }
}
