//! Spawn controller - brings guests in during opening hours and sends them
//! home at closing time.

use hecs::{Entity, World};
use tavern_logic::config::TavernConfig;
use tavern_logic::geometry::{Rect, Vec2};

use crate::components::*;
use crate::systems::events::{EventQueue, SimEvent};

/// What the spawn pass should do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnAction {
    Nothing,
    SpawnGuest,
    /// Outside opening hours: send every guest home.
    CloseUp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnController {
    timer: f32,
    spawned: u32,
}

impl SpawnController {
    pub fn new(config: &TavernConfig) -> Self {
        Self {
            timer: config.spawn_interval,
            spawned: 0,
        }
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Count the timer down while open. On expiry a guest is due if the
    /// room is below its minimum; the timer resets either way.
    pub fn update(&mut self, dt: f32, hour: u32, guests: usize, config: &TavernConfig) -> SpawnAction {
        if !config.open_hours.contains(hour) {
            return SpawnAction::CloseUp;
        }
        self.timer -= dt;
        if self.timer > 0.0 {
            return SpawnAction::Nothing;
        }
        self.timer = config.spawn_interval;
        if guests < config.min_guests {
            SpawnAction::SpawnGuest
        } else {
            SpawnAction::Nothing
        }
    }

    /// Display name for the next guest.
    pub fn next_name(&mut self) -> String {
        self.spawned += 1;
        format!("guest_{}", self.spawned)
    }
}

/// Create a guest standing at `position` in Idle.
pub fn spawn_guest(
    world: &mut World,
    name: String,
    position: Vec2,
    idle_timer: f32,
    config: &TavernConfig,
) -> Entity {
    let size = config.character_hitbox;
    world.spawn((
        Name(name),
        Character::new(CharacterKind::Guest),
        Hitbox(Rect::from_center(position, size, size)),
        Motion::new(config.guest_motion),
        Facing::default(),
        Behavior {
            state: BehaviorState::Idle { timer: idle_timer },
            ..Default::default()
        },
    ))
}

/// Despawn characters whose Leaving update has run and drop them from the
/// roster.
pub fn despawn_departed(
    world: &mut World,
    roster: &mut Vec<Entity>,
    departed: &mut Vec<Entity>,
    events: &mut EventQueue,
) {
    for entity in departed.drain(..) {
        if world.despawn(entity).is_ok() {
            events.push(SimEvent::GuestDeparted { entity });
        }
        roster.retain(|&e| e != entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawns_on_interval_below_minimum() {
        let config = TavernConfig::default();
        let mut spawner = SpawnController::new(&config);
        assert_eq!(spawner.update(1.0, 12, 0, &config), SpawnAction::Nothing);
        assert_eq!(spawner.update(1.0, 12, 0, &config), SpawnAction::SpawnGuest);
        assert_eq!(spawner.timer(), config.spawn_interval);
        assert_eq!(spawner.update(2.0, 12, config.min_guests, &config), SpawnAction::Nothing);
        assert_eq!(spawner.timer(), config.spawn_interval);
    }

    #[test]
    fn test_closed_hours() {
        let config = TavernConfig::default();
        let mut spawner = SpawnController::new(&config);
        assert_eq!(spawner.update(5.0, 22, 0, &config), SpawnAction::CloseUp);
        assert_eq!(spawner.update(5.0, 3, 0, &config), SpawnAction::CloseUp);
        // The timer does not run while closed.
        assert_eq!(spawner.timer(), config.spawn_interval);
    }

    #[test]
    fn test_guest_names_count_up() {
        let config = TavernConfig::default();
        let mut spawner = SpawnController::new(&config);
        assert_eq!(spawner.next_name(), "guest_1");
        assert_eq!(spawner.next_name(), "guest_2");
    }

    #[test]
    fn test_despawn_departed() {
        let config = TavernConfig::default();
        let mut world = World::new();
        let a = spawn_guest(&mut world, "guest_1".into(), Vec2::new(50.0, 50.0), 10.0, &config);
        let b = spawn_guest(&mut world, "guest_2".into(), Vec2::new(80.0, 50.0), 10.0, &config);
        let mut roster = vec![a, b];
        let mut departed = vec![a];
        let mut events = EventQueue::new();

        despawn_departed(&mut world, &mut roster, &mut departed, &mut events);
        assert_eq!(roster, vec![b]);
        assert!(departed.is_empty());
        assert!(!world.contains(a));
        assert_eq!(events.drain(), vec![SimEvent::GuestDeparted { entity: a }]);
    }
}
