//! Room-level seating and order allocator.
//!
//! `TavernRoom` owns the pathfinding grid, the static obstacle list, the
//! chairs in load order and the list of outstanding orders. Chair
//! occupancy itself lives on the [`Chair`] components; the room only
//! mediates access to it.

use std::collections::BTreeMap;

use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;
use tavern_logic::geometry::{Rect, Vec2};
use tavern_logic::grid::Grid;
use tavern_logic::recipes::{Recipe, RecipeCatalog};

use crate::components::{Blocking, Chair, Character, Hitbox, Order};
use crate::error::AllocError;

pub struct TavernRoom {
    name: String,
    grid: Grid,
    walls: Vec<Rect>,
    obstacles: Vec<Rect>,
    chairs: Vec<Entity>,
    tables: BTreeMap<String, Entity>,
    orders: Vec<Order>,
    spawn_points: Vec<Vec2>,
    player_start: Vec2,
}

impl TavernRoom {
    /// Empty room of `width x height` grid cells.
    pub fn new(name: impl Into<String>, width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            name: name.into(),
            grid: Grid::new(width, height, cell_size),
            walls: Vec::new(),
            obstacles: Vec::new(),
            chairs: Vec::new(),
            tables: BTreeMap::new(),
            orders: Vec::new(),
            spawn_points: Vec::new(),
            player_start: Vec2::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Blocking boxes characters collide with.
    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    pub fn chairs(&self) -> &[Entity] {
        &self.chairs
    }

    pub fn spawn_points(&self) -> &[Vec2] {
        &self.spawn_points
    }

    pub fn player_start(&self) -> Vec2 {
        self.player_start
    }

    pub fn add_wall(&mut self, wall: Rect) {
        self.walls.push(wall);
    }

    pub fn add_spawn_point(&mut self, point: Vec2) {
        self.spawn_points.push(point);
    }

    pub fn set_player_start(&mut self, point: Vec2) {
        self.player_start = point;
    }

    pub fn register_chair(&mut self, chair: Entity) {
        self.chairs.push(chair);
    }

    pub fn register_table(&mut self, table_id: impl Into<String>, table: Entity) {
        self.tables.insert(table_id.into(), table);
    }

    pub fn table(&self, table_id: &str) -> Option<Entity> {
        self.tables.get(table_id).copied()
    }

    /// Rebuild the obstacle list and grid from walls, blocking entities and
    /// chairs. Call after furniture is added or moved.
    pub fn rebuild_grid(&mut self, world: &World) {
        let mut obstacles = self.walls.clone();
        obstacles.extend(
            world
                .query::<(&Hitbox, &Blocking)>()
                .iter()
                .map(|(_, (hitbox, _))| hitbox.0),
        );
        let chair_boxes: Vec<Rect> = self
            .chairs
            .iter()
            .filter_map(|&c| world.get::<&Hitbox>(c).ok().map(|h| h.0))
            .collect();

        self.grid = Grid::build(
            self.grid.width(),
            self.grid.height(),
            self.grid.cell_size(),
            &obstacles,
            &chair_boxes,
        );
        self.obstacles = obstacles;
        log::debug!(
            "room {}: grid rebuilt, {} obstacles, {} walkable cells",
            self.name,
            self.obstacles.len(),
            self.grid.walkable_count()
        );
    }

    // ── Seating ─────────────────────────────────────────────────────────

    /// A free chair chosen uniformly among the free ones.
    ///
    /// Point-in-time query: nothing is reserved, so two characters may pick
    /// the same chair. The loser finds out in [`TavernRoom::reserve`].
    pub fn get_free_chair<R: Rng + ?Sized>(&self, world: &World, rng: &mut R) -> Option<Entity> {
        let free: Vec<Entity> = self
            .chairs
            .iter()
            .copied()
            .filter(|&c| world.get::<&Chair>(c).map(|ch| !ch.occupied).unwrap_or(false))
            .collect();
        free.choose(rng).copied()
    }

    /// Atomically claim `chair` for `who`. False if taken or not a chair.
    pub fn reserve(&self, world: &mut World, chair: Entity, who: Entity) -> bool {
        match world.get::<&mut Chair>(chair) {
            Ok(mut c) => c.occupy(who),
            Err(_) => false,
        }
    }

    pub fn vacate(&self, world: &mut World, chair: Entity) {
        if let Ok(mut c) = world.get::<&mut Chair>(chair) {
            c.vacate();
        }
    }

    pub fn free_chair_count(&self, world: &World) -> usize {
        self.chairs
            .iter()
            .filter(|&&c| world.get::<&Chair>(c).map(|ch| !ch.occupied).unwrap_or(false))
            .count()
    }

    /// Table a chair belongs to, if its `table_id` resolves.
    pub fn table_for_chair(&self, world: &World, chair: Entity) -> Option<Entity> {
        let chair = world.get::<&Chair>(chair).ok()?;
        let table_id = chair.table_id.as_deref()?;
        self.table(table_id)
    }

    // ── Orders ──────────────────────────────────────────────────────────

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order_for(&self, entity: Entity) -> Option<&Order> {
        self.orders.iter().find(|o| o.character == entity)
    }

    /// Register an order. A character may hold at most one.
    pub fn add_order(
        &mut self,
        entity: Entity,
        character: &mut Character,
        item_id: &str,
        recipe_id: &str,
    ) -> Result<(), AllocError> {
        if character.order.is_some() || self.order_for(entity).is_some() {
            return Err(AllocError::DuplicateOrder(entity));
        }
        let order = Order {
            character: entity,
            item_id: item_id.to_string(),
            recipe_id: recipe_id.to_string(),
        };
        self.orders.push(order.clone());
        character.order = Some(order);
        Ok(())
    }

    /// Remove the character's order. `character.order` is always cleared.
    pub fn remove_order(&mut self, entity: Entity, character: &mut Character) -> Option<Order> {
        character.order = None;
        let index = self.orders.iter().position(|o| o.character == entity)?;
        Some(self.orders.remove(index))
    }

    /// Recipes guests may order.
    pub fn orderable_recipes<'a>(&self, catalog: &'a RecipeCatalog) -> BTreeMap<&'a str, &'a Recipe> {
        catalog.orderable()
    }

    pub fn random_spawn_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec2> {
        self.spawn_points.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CharacterKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tavern_logic::grid::Cell;

    fn room_with_chairs(world: &mut World, n: usize) -> TavernRoom {
        let mut room = TavernRoom::new("test", 20, 20, 12.0);
        for i in 0..n {
            let chair = world.spawn((
                Chair::new(None),
                Hitbox(Rect::new(24.0 + i as f32 * 48.0, 24.0, 12.0, 12.0)),
            ));
            room.register_chair(chair);
        }
        room.rebuild_grid(world);
        room
    }

    #[test]
    fn test_free_chair_skips_occupied() {
        let mut world = World::new();
        let room = room_with_chairs(&mut world, 3);
        let guest = world.spawn(());
        let chairs = room.chairs().to_vec();
        assert!(room.reserve(&mut world, chairs[0], guest));
        assert!(room.reserve(&mut world, chairs[2], guest));

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(room.get_free_chair(&world, &mut rng), Some(chairs[1]));
        }
        assert!(room.reserve(&mut world, chairs[1], guest));
        assert_eq!(room.get_free_chair(&world, &mut rng), None);
    }

    #[test]
    fn test_reserve_is_exclusive_until_vacate() {
        let mut world = World::new();
        let room = room_with_chairs(&mut world, 1);
        let chair = room.chairs()[0];
        let a = world.spawn(());
        let b = world.spawn(());

        assert!(room.reserve(&mut world, chair, a));
        assert!(!room.reserve(&mut world, chair, b));
        assert_eq!(world.get::<&Chair>(chair).unwrap().occupant, Some(a));

        room.vacate(&mut world, chair);
        assert!(room.reserve(&mut world, chair, b));
    }

    #[test]
    fn test_reserve_non_chair_fails() {
        let mut world = World::new();
        let room = room_with_chairs(&mut world, 0);
        let a = world.spawn(());
        let not_a_chair = world.spawn(());
        assert!(!room.reserve(&mut world, not_a_chair, a));
    }

    #[test]
    fn test_duplicate_order_rejected() {
        let mut world = World::new();
        let mut room = room_with_chairs(&mut world, 0);
        let guest = world.spawn(());
        let mut character = Character::new(CharacterKind::Guest);

        room.add_order(guest, &mut character, "soup", "soup").unwrap();
        assert_eq!(
            room.add_order(guest, &mut character, "bread", "bread"),
            Err(AllocError::DuplicateOrder(guest))
        );
        assert_eq!(room.orders().len(), 1);
        assert_eq!(character.order.as_ref().map(|o| o.item_id.as_str()), Some("soup"));
    }

    #[test]
    fn test_remove_order_always_clears_character() {
        let mut world = World::new();
        let mut room = room_with_chairs(&mut world, 0);
        let guest = world.spawn(());
        let mut character = Character::new(CharacterKind::Guest);

        room.add_order(guest, &mut character, "soup", "soup").unwrap();
        let removed = room.remove_order(guest, &mut character).unwrap();
        assert_eq!(removed.recipe_id, "soup");
        assert!(character.order.is_none());
        assert!(room.orders().is_empty());

        // Stale copy with no room entry is still cleared.
        character.order = Some(removed);
        assert!(room.remove_order(guest, &mut character).is_none());
        assert!(character.order.is_none());
    }

    #[test]
    fn test_chairs_block_grid() {
        let mut world = World::new();
        let room = room_with_chairs(&mut world, 1);
        assert!(!room.grid().is_walkable(Cell::new(2, 2)));
        assert!(room.grid().is_walkable(Cell::new(0, 0)));
    }

    #[test]
    fn test_table_lookup() {
        let mut world = World::new();
        let mut room = TavernRoom::new("test", 10, 10, 12.0);
        let table = world.spawn(());
        room.register_table("t1", table);
        let seated = world.spawn((Chair::new(Some("t1".into())),));
        let orphan = world.spawn((Chair::new(Some("missing".into())),));
        assert_eq!(room.table_for_chair(&world, seated), Some(table));
        assert_eq!(room.table_for_chair(&world, orphan), None);
    }
}
