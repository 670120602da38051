//! Simulation engine - main entry point for running the tavern

use std::collections::BTreeMap;
use std::io::{Read, Write};

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tavern_logic::clock::GameClock;
use tavern_logic::config::TavernConfig;
use tavern_logic::constants::STOVE_ENERGY_COST;
use tavern_logic::geometry::{Rect, Vec2};
use tavern_logic::recipes::RecipeCatalog;

use crate::components::*;
use crate::error::{CookError, DeliveryError, LayoutError, SaveError};
use crate::layout::{spawn_room, RoomLayout};
use crate::persistence::{
    apply_room_save, load_game, save_game, save_room, GameState, PlayerSave, RoomSave,
};
use crate::room::TavernRoom;
use crate::systems::behavior::roll_timer;
use crate::systems::*;

/// Outcome of a player interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Reserved a chair; the player sits down next tick.
    Sat { chair: Entity },
    /// Asked to stand up from the current chair.
    StoodUp,
    Served { guest: Entity, item_id: String },
    Nothing,
}

enum Target {
    Chair(Entity),
    Guest(Entity),
}

/// Main simulation engine
pub struct TavernEngine {
    /// ECS world containing all entities
    pub world: World,
    /// Seating and order allocator for the loaded room
    pub room: TavernRoom,
    pub clock: GameClock,
    pub catalog: RecipeCatalog,
    pub config: TavernConfig,
    rng: ChaCha8Rng,
    spawner: SpawnController,
    /// Player first, then guests in spawn order
    roster: Vec<Entity>,
    player: Entity,
    events: EventQueue,
    departed: Vec<Entity>,
    /// Saves of rooms other than the loaded one, carried through save/load
    saved_rooms: BTreeMap<String, RoomSave>,
}

impl TavernEngine {
    /// Load a room and place the player at its start point.
    pub fn new(
        layout: &RoomLayout,
        catalog: RecipeCatalog,
        config: TavernConfig,
    ) -> Result<Self, LayoutError> {
        let mut world = World::new();
        let room = spawn_room(&mut world, layout, &config)?;

        let size = config.character_hitbox;
        let player = world.spawn((
            Name("player".to_string()),
            Character::new(CharacterKind::Player),
            Hitbox(Rect::from_center(room.player_start(), size, size)),
            Motion::new(config.player_motion),
            Facing::default(),
            Behavior::default(),
            PlayerStats::default(),
            Inventory::default(),
        ));

        let mut clock = GameClock::at(0, config.start_hour, 0.0);
        clock.minutes_per_second = config.minutes_per_second;

        if catalog.orderable().is_empty() {
            log::warn!("no orderable recipes; guests will not order");
        }

        Ok(Self {
            world,
            room,
            clock,
            catalog,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            spawner: SpawnController::new(&config),
            config,
            roster: vec![player],
            player,
            events: EventQueue::new(),
            departed: Vec::new(),
            saved_rooms: BTreeMap::new(),
        })
    }

    fn context(&mut self) -> TickContext<'_> {
        TickContext {
            world: &mut self.world,
            room: &mut self.room,
            catalog: &self.catalog,
            config: &self.config,
            rng: &mut self.rng,
            events: &mut self.events,
            departed: &mut self.departed,
        }
    }

    /// Advance the simulation by `dt` real seconds.
    ///
    /// Events produced by the tick accumulate until [`Self::drain_events`]
    /// is called; embedders should drain once per frame. The queue is
    /// bounded and drops its oldest events when full.
    pub fn update(&mut self, dt: f32) {
        self.clock.advance(dt);
        self.spawn_pass(dt);

        let roster = self.roster.clone();
        let mut ctx = self.context();
        behavior_system(&mut ctx, &roster, dt);
        // Guests whose Leaving update just ran are gone by the end of this tick.
        despawn_departed(
            &mut self.world,
            &mut self.roster,
            &mut self.departed,
            &mut self.events,
        );

        physics_system(&mut self.world, self.room.obstacles(), dt);
        stove_system(&mut self.world, dt);
        animation_system(&mut self.world, &mut self.events);
    }

    fn spawn_pass(&mut self, dt: f32) {
        let guests = self.guest_count();
        match self
            .spawner
            .update(dt, self.clock.hours, guests, &self.config)
        {
            SpawnAction::SpawnGuest => {
                self.admit_guest();
            }
            SpawnAction::CloseUp => self.close_up(),
            SpawnAction::Nothing => {}
        }
    }

    /// Spawn a guest at a random spawn point.
    pub fn admit_guest(&mut self) -> Option<Entity> {
        let position = self.room.random_spawn_point(&mut self.rng)?;
        Some(self.admit_guest_at(position))
    }

    /// Spawn a guest at `position`.
    pub fn admit_guest_at(&mut self, position: Vec2) -> Entity {
        let name = self.spawner.next_name();
        let idle_timer = roll_timer(&mut self.rng, self.config.idle_time);
        let entity = spawn_guest(&mut self.world, name.clone(), position, idle_timer, &self.config);
        self.roster.push(entity);
        log::info!("{} arrived", name);
        self.events.push(SimEvent::GuestSpawned { entity, name });
        entity
    }

    /// Send every guest not already leaving home.
    fn close_up(&mut self) {
        let guests: Vec<Entity> = self.guests().collect();
        let mut ctx = self.context();
        let mut sent = 0;
        for guest in guests {
            if force_state(&mut ctx, guest, StateKind::Leaving) {
                sent += 1;
            }
        }
        if sent > 0 {
            log::info!("closing time: {} guests leaving", sent);
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn player(&self) -> Entity {
        self.player
    }

    /// Characters in update order.
    pub fn roster(&self) -> &[Entity] {
        &self.roster
    }

    pub fn guests(&self) -> impl Iterator<Item = Entity> + '_ {
        self.roster.iter().copied().filter(move |&e| e != self.player)
    }

    pub fn guest_count(&self) -> usize {
        self.guests().count()
    }

    pub fn state_of(&self, entity: Entity) -> Option<StateKind> {
        self.world.get::<&Behavior>(entity).ok().map(|b| b.kind())
    }

    pub fn behavior_state(&self, entity: Entity) -> Option<BehaviorState> {
        self.world.get::<&Behavior>(entity).ok().map(|b| b.state.clone())
    }

    pub fn character(&self, entity: Entity) -> Option<Character> {
        self.world.get::<&Character>(entity).ok().map(|c| (*c).clone())
    }

    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.world.get::<&Hitbox>(entity).ok().map(|h| h.center())
    }

    /// Take all events raised since the last call. Call once per frame;
    /// undrained events are capped at [`MAX_QUEUED_EVENTS`].
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    pub fn set_time_scale(&mut self, minutes_per_second: f32) {
        self.clock.minutes_per_second = minutes_per_second.max(0.0);
    }

    // ── Serving ─────────────────────────────────────────────────────────

    /// Hand `item_id` to a waiting guest, who starts eating.
    pub fn deliver(&mut self, guest: Entity, item_id: &str) -> Result<(), DeliveryError> {
        if self.state_of(guest) != Some(StateKind::WaitingForFood) {
            return Err(DeliveryError::NotWaiting);
        }
        let order = self.room.order_for(guest).ok_or(DeliveryError::NoOrder)?;
        if order.item_id != item_id {
            return Err(DeliveryError::WrongItem {
                ordered: order.item_id.clone(),
                offered: item_id.to_string(),
            });
        }

        let mut ctx = self.context();
        force_state(&mut ctx, guest, StateKind::Eating);
        log::debug!("served {} to {:?}", item_id, guest);
        self.events.push(SimEvent::OrderServed {
            entity: guest,
            item_id: item_id.to_string(),
        });
        Ok(())
    }

    // ── Player ──────────────────────────────────────────────────────────

    /// Movement input. `direction` is normalized; low energy scales it down.
    pub fn set_player_intent(&mut self, direction: Vec2) {
        let multiplier = self
            .world
            .get::<&PlayerStats>(self.player)
            .map(|s| s.force_multiplier())
            .unwrap_or(1.0);
        if let Ok(mut motion) = self.world.get::<&mut Motion>(self.player) {
            motion.kin.intent = direction.normalize() * multiplier;
        }
    }

    pub fn request_stand(&mut self) {
        if let Ok(mut behavior) = self.world.get::<&mut Behavior>(self.player) {
            behavior.stand_requested = true;
        }
    }

    /// Interact with the nearest thing in reach: stand up if seated, else
    /// sit on a free chair or serve a waiting guest from `items`.
    pub fn player_interact(
        &mut self,
        items: &mut dyn ItemSource,
    ) -> Result<Interaction, DeliveryError> {
        let player = self.player;
        let (kind, position) = match (self.state_of(player), self.position(player)) {
            (Some(kind), Some(position)) => (kind, position),
            _ => return Ok(Interaction::Nothing),
        };
        if kind.is_seated() {
            self.request_stand();
            return Ok(Interaction::StoodUp);
        }

        let range = self.config.interaction_range();
        let mut best: Option<(f32, Target)> = None;
        let mut consider = |distance: f32, target: Target| {
            if distance <= range && best.as_ref().map_or(true, |(d, _)| distance < *d) {
                best = Some((distance, target));
            }
        };

        for &chair in self.room.chairs() {
            let free = self
                .world
                .get::<&Chair>(chair)
                .map(|c| !c.occupied)
                .unwrap_or(false);
            if let (true, Some(at)) = (free, self.position(chair)) {
                consider(at.distance(&position), Target::Chair(chair));
            }
        }
        for guest in self.guests() {
            if self.state_of(guest) != Some(StateKind::WaitingForFood) {
                continue;
            }
            if let Some(at) = self.position(guest) {
                consider(at.distance(&position), Target::Guest(guest));
            }
        }

        match best {
            None => Ok(Interaction::Nothing),
            Some((_, Target::Chair(chair))) => {
                if !self.room.reserve(&mut self.world, chair, player) {
                    return Ok(Interaction::Nothing);
                }
                if let Ok(mut character) = self.world.get::<&mut Character>(player) {
                    character.chair = Some(chair);
                }
                if let Ok(mut behavior) = self.world.get::<&mut Behavior>(player) {
                    behavior.sit_requested = true;
                }
                Ok(Interaction::Sat { chair })
            }
            Some((_, Target::Guest(guest))) => {
                let item_id = self
                    .room
                    .order_for(guest)
                    .map(|o| o.item_id.clone())
                    .ok_or(DeliveryError::NoOrder)?;
                if items.count(&item_id) == 0 {
                    return Err(DeliveryError::MissingItem(item_id));
                }
                self.deliver(guest, &item_id)?;
                items.take(&item_id);
                Ok(Interaction::Served {
                    guest,
                    item_id,
                })
            }
        }
    }

    /// [`TavernEngine::player_interact`] using the player's own inventory.
    pub fn interact(&mut self) -> Result<Interaction, DeliveryError> {
        let mut inventory = self
            .world
            .get::<&mut Inventory>(self.player)
            .map(|mut inv| std::mem::take(&mut *inv))
            .unwrap_or_default();
        let result = self.player_interact(&mut inventory);
        if let Ok(mut inv) = self.world.get::<&mut Inventory>(self.player) {
            *inv = inventory;
        }
        result
    }

    pub fn give_player(&mut self, item_id: &str, amount: u32) {
        if let Ok(mut inv) = self.world.get::<&mut Inventory>(self.player) {
            inv.add(item_id, amount);
        }
    }

    pub fn player_stats(&self) -> PlayerStats {
        self.world
            .get::<&PlayerStats>(self.player)
            .map(|s| *s)
            .unwrap_or_default()
    }

    /// Restore energy, returning the amount actually restored.
    pub fn player_rest(&mut self, amount: f32) -> f32 {
        self.world
            .get::<&mut PlayerStats>(self.player)
            .map(|mut s| s.rest(amount))
            .unwrap_or(0.0)
    }

    // ── Stoves ──────────────────────────────────────────────────────────

    pub fn add_fuel(&mut self, stove: Entity, amount: f32) -> bool {
        self.world
            .get::<&mut Stove>(stove)
            .map(|mut s| s.add_fuel(amount))
            .unwrap_or(false)
    }

    /// Start cooking at `stove`. Costs the player energy on success.
    pub fn cook(
        &mut self,
        stove: Entity,
        ingredients: &BTreeMap<String, u32>,
    ) -> Result<String, CookError> {
        let energy = self.player_stats().energy;
        if energy < STOVE_ENERGY_COST {
            return Err(CookError::NotEnoughEnergy {
                have: energy,
                need: STOVE_ENERGY_COST,
            });
        }
        let recipe_id = {
            let mut stove = self
                .world
                .get::<&mut Stove>(stove)
                .map_err(|_| CookError::NotAStove)?;
            stove.start_cooking(&self.catalog, ingredients)?
        };
        if let Ok(mut stats) = self.world.get::<&mut PlayerStats>(self.player) {
            stats.spend(STOVE_ENERGY_COST);
        }
        log::debug!("cooking {}", recipe_id);
        Ok(recipe_id)
    }

    /// Move a finished dish from the stove into the player's inventory.
    pub fn collect_dish(&mut self, stove: Entity) -> Option<CookedItem> {
        let dish = self.world.get::<&mut Stove>(stove).ok()?.take_result()?;
        self.give_player(&dish.item_id, dish.amount);
        Some(dish)
    }

    pub fn stoves(&self) -> Vec<Entity> {
        self.world
            .query::<&Stove>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Snapshot of everything that persists between sessions.
    pub fn game_state(&self) -> Result<GameState, SaveError> {
        let mut rooms = self.saved_rooms.clone();
        rooms.insert(self.room.name().to_string(), save_room(&self.world)?);

        let inventory = self
            .world
            .get::<&Inventory>(self.player)
            .map(|inv| (*inv).clone())
            .unwrap_or_default();
        let player = PlayerSave {
            position: self.position(self.player).unwrap_or_default(),
            stats: self.player_stats(),
            inventory,
            last_room: self.room.name().to_string(),
        };

        Ok(GameState {
            clock: self.clock,
            player,
            rooms,
            ..Default::default()
        })
    }

    /// Save game state to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        save_game(writer, &self.game_state()?)
    }

    /// Load game state from a reader
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let state = load_game(reader)?;
        self.apply_game_state(state);
        Ok(())
    }

    /// Apply a loaded state to the current room and player.
    pub fn apply_game_state(&mut self, state: GameState) {
        self.clock = state.clock;
        self.clock.minutes_per_second = self.config.minutes_per_second;

        if let Some(save) = state.rooms.get(self.room.name()) {
            apply_room_save(&mut self.world, save);
        }

        let position = if state.player.last_room == self.room.name() {
            state.player.position
        } else {
            self.room.player_start()
        };
        if let Ok(mut hitbox) = self.world.get::<&mut Hitbox>(self.player) {
            hitbox.0.set_center(position);
        }
        if let Ok(mut stats) = self.world.get::<&mut PlayerStats>(self.player) {
            *stats = state.player.stats;
        }
        if let Ok(mut inv) = self.world.get::<&mut Inventory>(self.player) {
            *inv = state.player.inventory;
        }

        self.saved_rooms = state.rooms;
        self.saved_rooms.remove(self.room.name());
    }
}
