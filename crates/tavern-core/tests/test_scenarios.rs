//! End-to-end scenarios driven through `TavernEngine`.
//!
//! Each test loads a small room, admits guests at fixed positions and steps
//! the engine with a fixed timestep, checking seating and order bookkeeping
//! along the way.

use std::collections::HashSet;

use hecs::Entity;
use proptest::prelude::*;
use tavern_core::layout::RoomLayout;
use tavern_core::prelude::*;
use tavern_logic::clock::GameClock;
use tavern_logic::config::{TavernConfig, TimerRange};
use tavern_logic::geometry::Vec2;
use tavern_logic::recipes::RecipeCatalog;

const DT: f32 = 0.05;

const ONE_CHAIR: &str = r#"{
    "name": "tavern",
    "width_tiles": 10,
    "height_tiles": 8,
    "objects": [
        { "id": "table_1", "type": "table", "x": 192, "y": 144, "width": 48, "height": 48 },
        { "id": "chair_1", "type": "chair", "x": 168, "y": 162, "width": 12, "height": 12,
          "properties": { "table_id": "table_1" } },
        { "id": "stove_1", "type": "stove", "x": 400, "y": 24, "width": 36, "height": 36 }
    ],
    "spawn_points": [ { "x": 40, "y": 340 } ],
    "player_start": { "x": 60, "y": 60 }
}"#;

const TWO_CHAIRS: &str = r#"{
    "name": "tavern",
    "width_tiles": 10,
    "height_tiles": 8,
    "objects": [
        { "id": "table_1", "type": "table", "x": 192, "y": 144, "width": 48, "height": 48 },
        { "id": "chair_1", "type": "chair", "x": 168, "y": 162, "width": 12, "height": 12,
          "properties": { "table_id": "table_1" } },
        { "id": "table_2", "type": "table", "x": 336, "y": 144, "width": 48, "height": 48 },
        { "id": "chair_2", "type": "chair", "x": 312, "y": 162, "width": 12, "height": 12,
          "properties": { "table_id": "table_2" } }
    ],
    "spawn_points": [ { "x": 40, "y": 340 }, { "x": 440, "y": 340 } ],
    "player_start": { "x": 60, "y": 60 }
}"#;

/// Single chair boxed in by walls on every side.
const WALLED_CHAIR: &str = r#"{
    "name": "cellar",
    "width_tiles": 10,
    "height_tiles": 8,
    "walls": [
        { "x": 216, "y": 216, "w": 60, "h": 12 },
        { "x": 216, "y": 264, "w": 60, "h": 12 },
        { "x": 216, "y": 216, "w": 12, "h": 60 },
        { "x": 264, "y": 216, "w": 12, "h": 60 }
    ],
    "objects": [
        { "id": "chair_1", "type": "chair", "x": 240, "y": 240, "width": 12, "height": 12 }
    ],
    "spawn_points": [ { "x": 40, "y": 340 } ]
}"#;

const RECIPES: &str = r#"{ "recipes": {
    "soup": { "ingredients": { "carrot": 2 }, "result": "soup", "cooking_time": 5, "type": "cooked" },
    "water": { "ingredients": { "bucket": 1 }, "result": "water", "cooking_time": 1, "type": "drink" }
} }"#;

// ── Helpers ────────────────────────────────────────────────────────────

/// Short timers and no automatic spawning.
fn quick_config() -> TavernConfig {
    TavernConfig {
        idle_time: TimerRange::new(0.5, 0.5),
        sit_time: TimerRange::new(1.0, 1.0),
        ordering_time: TimerRange::new(1.0, 1.0),
        min_guests: 0,
        ..Default::default()
    }
}

fn engine_with(layout: &str, config: TavernConfig) -> TavernEngine {
    let layout = RoomLayout::from_json(layout).unwrap();
    let catalog = RecipeCatalog::from_json(RECIPES).unwrap();
    TavernEngine::new(&layout, catalog, config).unwrap()
}

/// Step until `done` holds, panicking after `max_steps`.
fn run_until(engine: &mut TavernEngine, max_steps: usize, done: impl Fn(&TavernEngine) -> bool) {
    for _ in 0..max_steps {
        if done(engine) {
            return;
        }
        engine.update(DT);
    }
    panic!("condition not reached in {} steps", max_steps);
}

fn chair_state(engine: &TavernEngine, chair: Entity) -> Chair {
    (*engine.world.get::<&Chair>(chair).unwrap()).clone()
}

/// Seating and order bookkeeping that must hold after every tick.
fn check_invariants(engine: &TavernEngine) -> Result<(), String> {
    for &chair in engine.room.chairs() {
        let state = chair_state(engine, chair);
        if state.occupied != state.occupant.is_some() {
            return Err(format!("chair {:?} occupied flag disagrees with occupant", chair));
        }
        if let Some(who) = state.occupant {
            let character = engine
                .character(who)
                .ok_or_else(|| format!("chair {:?} held by despawned {:?}", chair, who))?;
            if character.chair != Some(chair) {
                return Err(format!("{:?} sits on {:?} without holding it", who, chair));
            }
            match engine.state_of(who) {
                Some(kind) if kind.is_seated() => {}
                other => return Err(format!("{:?} holds a chair while {:?}", who, other)),
            }
        }
    }

    let mut held = HashSet::new();
    for &entity in engine.roster() {
        let Some(chair) = engine.character(entity).and_then(|c| c.chair) else {
            continue;
        };
        if !held.insert(chair) {
            return Err(format!("chair {:?} held twice", chair));
        }
        if chair_state(engine, chair).occupant != Some(entity) {
            return Err(format!("{:?} holds {:?} but is not its occupant", entity, chair));
        }
    }

    for order in engine.room.orders() {
        if engine.state_of(order.character) != Some(StateKind::WaitingForFood) {
            return Err(format!("order for {:?} outside WaitingForFood", order.character));
        }
        let character = engine.character(order.character).unwrap();
        if character.order.as_ref() != Some(order) {
            return Err(format!("order list and {:?} disagree", order.character));
        }
    }
    for guest in engine.guests() {
        if engine.state_of(guest) == Some(StateKind::WaitingForFood)
            && engine.room.order_for(guest).is_none()
        {
            return Err(format!("{:?} waiting without an order", guest));
        }
    }
    Ok(())
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn guest_is_seated_served_and_leaves() {
    let mut engine = engine_with(ONE_CHAIR, quick_config());
    let chair = engine.room.chairs()[0];
    let guest = engine.admit_guest_at(Vec2::new(60.0, 300.0));

    run_until(&mut engine, 400, |e| {
        e.state_of(guest) == Some(StateKind::WaitingForFood)
    });

    assert_eq!(chair_state(&engine, chair).occupant, Some(guest));
    assert_eq!(engine.position(guest), Some(Vec2::new(174.0, 168.0)));
    let order = engine.room.order_for(guest).cloned().unwrap();
    assert_eq!(order.item_id, "soup");
    assert_eq!(order.recipe_id, "soup");

    engine.deliver(guest, "soup").unwrap();
    // cooking_time 5 * eating multiplier 1.5
    assert_eq!(
        engine.behavior_state(guest),
        Some(BehaviorState::Eating { timer: 7.5 })
    );
    assert!(engine.room.orders().is_empty());
    assert_eq!(engine.character(guest).unwrap().order, None);

    run_until(&mut engine, 600, |e| e.state_of(guest) == Some(StateKind::Leaving));
    assert!(engine.world.contains(guest));
    // The single Leaving update removes the guest within the same tick.
    engine.update(DT);
    assert!(!engine.world.contains(guest));
    assert_eq!(engine.guest_count(), 0);
    assert!(!engine.roster().contains(&guest));
    assert!(!chair_state(&engine, chair).occupied);

    let events = engine.drain_events();
    assert!(events.contains(&SimEvent::OrderServed {
        entity: guest,
        item_id: "soup".to_string()
    }));
    assert!(events.contains(&SimEvent::GuestDeparted { entity: guest }));
}

#[test]
fn wrong_item_is_refused() {
    let mut engine = engine_with(ONE_CHAIR, quick_config());
    let guest = engine.admit_guest_at(Vec2::new(60.0, 300.0));
    run_until(&mut engine, 400, |e| {
        e.state_of(guest) == Some(StateKind::WaitingForFood)
    });

    assert_eq!(
        engine.deliver(guest, "water"),
        Err(DeliveryError::WrongItem {
            ordered: "soup".to_string(),
            offered: "water".to_string()
        })
    );
    assert_eq!(engine.state_of(guest), Some(StateKind::WaitingForFood));

    engine.deliver(guest, "soup").unwrap();
    // A second delivery finds the guest already eating.
    assert_eq!(engine.deliver(guest, "soup"), Err(DeliveryError::NotWaiting));
}

#[test]
fn player_serves_from_inventory() {
    let mut engine = engine_with(ONE_CHAIR, quick_config());
    let guest = engine.admit_guest_at(Vec2::new(60.0, 300.0));
    run_until(&mut engine, 400, |e| {
        e.state_of(guest) == Some(StateKind::WaitingForFood)
    });

    // Walk the player next to the seated guest.
    let player = engine.player();
    engine
        .world
        .get::<&mut Hitbox>(player)
        .unwrap()
        .0
        .set_center(Vec2::new(150.0, 168.0));

    assert_eq!(
        engine.interact(),
        Err(DeliveryError::MissingItem("soup".to_string()))
    );

    engine.give_player("soup", 1);
    assert_eq!(
        engine.interact(),
        Ok(Interaction::Served {
            guest,
            item_id: "soup".to_string()
        })
    );
    assert_eq!(engine.state_of(guest), Some(StateKind::Eating));
    let inventory = (*engine.world.get::<&Inventory>(player).unwrap()).clone();
    assert_eq!(inventory.count("soup"), 0);
}

#[test]
fn closing_time_sends_everyone_home() {
    let mut engine = engine_with(TWO_CHAIRS, quick_config());
    engine.clock = GameClock::at(0, 21, 0.0);
    let first = engine.admit_guest_at(Vec2::new(60.0, 300.0));
    let second = engine.admit_guest_at(Vec2::new(440.0, 340.0));

    run_until(&mut engine, 400, |e| {
        e.room
            .chairs()
            .iter()
            .any(|&c| e.world.get::<&Chair>(c).is_ok_and(|ch| ch.occupied))
    });
    assert_eq!(engine.clock.hours, 21);
    engine.drain_events();

    // Cross into 22:00.
    engine.clock.minutes = 59.99;
    engine.update(DT);
    assert_eq!(engine.clock.hours, 22);
    // Sent home and removed in the closing tick itself.
    assert!(!engine.world.contains(first));
    assert!(!engine.world.contains(second));
    assert_eq!(engine.guest_count(), 0);
    for &chair in engine.room.chairs() {
        assert!(!chair_state(&engine, chair).occupied);
    }
    assert!(engine.room.orders().is_empty());

    // Closed: nobody re-enters Leaving and nobody new arrives.
    engine.update(DT);
    engine.update(DT);
    let events = engine.drain_events();
    let leaving = events
        .iter()
        .filter(|e| matches!(e, SimEvent::StateChanged { to: StateKind::Leaving, .. }))
        .count();
    assert_eq!(leaving, 2);
    for guest in [first, second] {
        assert!(events.contains(&SimEvent::GuestDeparted { entity: guest }));
    }
    assert!(!events
        .iter()
        .any(|e| matches!(e, SimEvent::GuestSpawned { .. })));
    assert_eq!(engine.guest_count(), 0);
}

#[test]
fn walled_off_chair_sends_guest_back_to_idle() {
    let mut engine = engine_with(WALLED_CHAIR, quick_config());
    let chair = engine.room.chairs()[0];
    let guest = engine.admit_guest_at(Vec2::new(60.0, 60.0));

    engine.update(0.5);
    assert_eq!(engine.state_of(guest), Some(StateKind::FindingChair));
    engine.drain_events();

    engine.update(DT);
    assert_eq!(engine.state_of(guest), Some(StateKind::Idle));
    assert_eq!(engine.character(guest).unwrap().target, None);
    assert!(!chair_state(&engine, chair).occupied);
    assert!(engine.drain_events().contains(&SimEvent::StateChanged {
        entity: guest,
        from: StateKind::FindingChair,
        to: StateKind::Idle,
    }));
}

#[test]
fn racers_for_one_chair_seat_exactly_one() {
    let mut engine = engine_with(ONE_CHAIR, quick_config());
    let chair = engine.room.chairs()[0];
    let racers: Vec<Entity> = [
        Vec2::new(60.0, 168.0),
        Vec2::new(174.0, 300.0),
        Vec2::new(100.0, 300.0),
        Vec2::new(60.0, 80.0),
    ]
    .into_iter()
    .map(|at| engine.admit_guest_at(at))
    .collect();

    for _ in 0..(5.0 / DT) as usize {
        engine.update(DT);
        check_invariants(&engine).unwrap();
    }

    let seated: Vec<Entity> = racers
        .iter()
        .copied()
        .filter(|&g| engine.state_of(g).is_some_and(|k| k.is_seated()))
        .collect();
    assert_eq!(seated.len(), 1);
    assert_eq!(chair_state(&engine, chair).occupant, Some(seated[0]));

    // Every loser is told once and falls back to Idle.
    let events = engine.drain_events();
    let contended = events
        .iter()
        .filter(|e| matches!(e, SimEvent::ChairContended { chair: c, .. } if *c == chair))
        .count();
    assert_eq!(contended, racers.len() - 1);
    for &loser in racers.iter().filter(|&&g| g != seated[0]) {
        assert!(events.contains(&SimEvent::StateChanged {
            entity: loser,
            from: StateKind::MovingToTarget,
            to: StateKind::Idle,
        }));
    }
}

#[test]
fn save_and_load_keeps_stoves_but_frees_chairs() {
    let mut engine = engine_with(ONE_CHAIR, quick_config());
    let chair = engine.room.chairs()[0];
    let stove = engine.stoves()[0];
    assert!(engine.add_fuel(stove, 40.0));
    let guest = engine.admit_guest_at(Vec2::new(60.0, 300.0));
    run_until(&mut engine, 400, |e| {
        e.state_of(guest) == Some(StateKind::WaitingForFood)
    });
    assert!(chair_state(&engine, chair).occupied);

    let mut buffer = Vec::new();
    engine.save(&mut buffer).unwrap();

    let mut restored = engine_with(ONE_CHAIR, quick_config());
    restored.load(&buffer[..]).unwrap();
    let restored_stove = restored.stoves()[0];
    assert_eq!(
        restored.world.get::<&Stove>(restored_stove).unwrap().fuel,
        40.0
    );
    let restored_chair = restored.room.chairs()[0];
    assert!(!chair_state(&restored, restored_chair).occupied);
    assert!(restored.room.orders().is_empty());
    assert_eq!(restored.clock.hours, engine.clock.hours);
}

#[test]
fn truncated_save_is_rejected() {
    let engine = engine_with(ONE_CHAIR, quick_config());
    let mut buffer = Vec::new();
    engine.save(&mut buffer).unwrap();
    buffer.truncate(buffer.len() / 2);

    let mut other = engine_with(ONE_CHAIR, quick_config());
    assert!(other.load(&buffer[..]).is_err());
}

// ── Properties ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// A busy evening with automatic spawning and periodic service never
    /// double-books a chair or leaves an order dangling.
    #[test]
    fn seating_invariants_hold(seed in any::<u64>()) {
        let config = TavernConfig {
            idle_time: TimerRange::new(0.2, 1.5),
            sit_time: TimerRange::new(0.5, 1.5),
            ordering_time: TimerRange::new(0.5, 1.0),
            find_chair_timeout: 3.0,
            spawn_interval: 0.5,
            min_guests: 4,
            rng_seed: seed,
            ..Default::default()
        };
        let mut engine = engine_with(TWO_CHAIRS, config);

        for tick in 0..600 {
            engine.update(DT);
            let checked = check_invariants(&engine);
            prop_assert!(checked.is_ok(), "tick {}: {:?}", tick, checked);

            if tick % 20 == 0 {
                let waiting: Vec<Entity> = engine
                    .guests()
                    .filter(|&g| engine.state_of(g) == Some(StateKind::WaitingForFood))
                    .collect();
                for guest in waiting {
                    prop_assert_eq!(engine.deliver(guest, "soup"), Ok(()));
                }
            }
        }
        prop_assert!(engine.guest_count() <= 4);
    }
}
