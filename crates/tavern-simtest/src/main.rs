//! Tavern Headless Simulation Harness
//!
//! Validates the shipped room and recipe data and runs a full in-game day
//! through the engine. Runs entirely in-process with no rendering.
//!
//! Usage:
//!   cargo run -p tavern-simtest
//!   cargo run -p tavern-simtest -- --verbose
//!   RUST_LOG=tavern_core=debug cargo run -p tavern-simtest

use std::collections::BTreeMap;

use tavern_core::layout::{spawn_room, RoomLayout};
use tavern_core::prelude::*;
use tavern_logic::config::{validate_config, TavernConfig};
use tavern_logic::pathfinding::route_to_occupied;
use tavern_logic::recipes::RecipeCatalog;
use tracing_subscriber::EnvFilter;

// ── Shipped data ────────────────────────────────────────────────────────
const ROOM_JSON: &str = include_str!("../../../data/tavern.json");
const RECIPES_JSON: &str = include_str!("../../../data/recipes.json");

/// Fixed timestep for engine runs (60 FPS).
const DT: f32 = 1.0 / 60.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Tavern Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration defaults
    results.extend(validate_default_config(verbose));

    // 2. Recipe catalog
    results.extend(validate_recipes(verbose));

    // 3. Room layout and reachability
    results.extend(validate_room(verbose));

    // 4. Full day with automatic service
    results.extend(validate_full_day(verbose));

    // 5. Stove and player energy loop
    results.extend(validate_cooking(verbose));

    // 6. Seeded determinism and save/load
    results.extend(validate_determinism(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_engine(config: TavernConfig) -> Result<TavernEngine, String> {
    let layout = RoomLayout::from_json(ROOM_JSON).map_err(|e| e.to_string())?;
    let catalog = RecipeCatalog::from_json(RECIPES_JSON).map_err(|e| e.to_string())?;
    TavernEngine::new(&layout, catalog, config).map_err(|e| e.to_string())
}

/// Chair bookkeeping that must hold after every tick.
fn seating_consistent(engine: &TavernEngine) -> bool {
    engine.room.chairs().iter().all(|&chair| {
        let Ok(state) = engine.world.get::<&Chair>(chair) else {
            return false;
        };
        match state.occupant {
            Some(who) => {
                state.occupied
                    && engine.character(who).and_then(|c| c.chair) == Some(chair)
                    && engine.state_of(who).is_some_and(|k| k.is_seated())
            }
            None => !state.occupied,
        }
    })
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_default_config(_verbose: bool) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let config = TavernConfig::default();
    let errors = validate_config(&config);
    vec![
        TestResult::check(
            "config_defaults_valid",
            errors.is_empty(),
            format!("{} errors: {:?}", errors.len(), errors),
        ),
        TestResult::check(
            "config_interaction_range",
            (config.interaction_range() - 52.8).abs() < 1e-3,
            format!("{:.1}px", config.interaction_range()),
        ),
    ]
}

// ── 2. Recipes ──────────────────────────────────────────────────────────

fn validate_recipes(verbose: bool) -> Vec<TestResult> {
    println!("--- Recipes ---");
    let mut results = Vec::new();

    let catalog = match RecipeCatalog::from_json(RECIPES_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult::check("recipes_parse", false, format!("{}", e)));
            return results;
        }
    };

    let orderable = catalog.orderable();
    results.push(TestResult::check(
        "recipes_orderable",
        !orderable.is_empty() && orderable.len() < catalog.len(),
        format!("{} of {} orderable", orderable.len(), catalog.len()),
    ));

    let bad_times: Vec<&str> = catalog
        .all()
        .iter()
        .filter(|(_, r)| r.cooking_time <= 0.0)
        .map(|(id, _)| id.as_str())
        .collect();
    results.push(TestResult::check(
        "recipes_cooking_times",
        bad_times.is_empty(),
        format!("non-positive: {:?}", bad_times),
    ));

    // Every recipe must be reachable from its own ingredient list.
    let unmatched: Vec<&str> = catalog
        .all()
        .iter()
        .filter(|(id, r)| {
            catalog.match_ingredients(&r.ingredients).map(|(m, _)| m) != Some(id.as_str())
        })
        .map(|(id, _)| id.as_str())
        .collect();
    results.push(TestResult::check(
        "recipes_ingredients_unique",
        unmatched.is_empty(),
        format!("ambiguous: {:?}", unmatched),
    ));

    if verbose {
        for (id, recipe) in &orderable {
            println!(
                "  {:15} -> {:6} ({}s)",
                id,
                catalog.result_item(id),
                recipe.cooking_time
            );
        }
    }
    results
}

// ── 3. Room ─────────────────────────────────────────────────────────────

fn validate_room(verbose: bool) -> Vec<TestResult> {
    println!("--- Room Layout ---");
    let mut results = Vec::new();

    let layout = match RoomLayout::from_json(ROOM_JSON) {
        Ok(l) => l,
        Err(e) => {
            results.push(TestResult::check("room_parse", false, format!("{}", e)));
            return results;
        }
    };
    let config = TavernConfig::default();
    let mut world = hecs::World::new();
    let mut room = match spawn_room(&mut world, &layout, &config) {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult::check("room_spawn", false, format!("{}", e)));
            return results;
        }
    };

    results.push(TestResult::check(
        "room_has_chairs",
        !room.chairs().is_empty(),
        format!("{} chairs", room.chairs().len()),
    ));

    let orphans = room
        .chairs()
        .iter()
        .filter(|&&c| room.table_for_chair(&world, c).is_none())
        .count();
    results.push(TestResult::check(
        "room_chairs_have_tables",
        orphans == 0,
        format!("{} chairs without a table", orphans),
    ));

    let spawns = room.spawn_points().to_vec();
    let start_walkable = spawns
        .iter()
        .chain(std::iter::once(&room.player_start()))
        .all(|&p| room.grid().is_walkable(room.grid().cell_at(p)));
    results.push(TestResult::check(
        "room_spawn_points_walkable",
        !spawns.is_empty() && start_walkable,
        format!("{} spawn points", spawns.len()),
    ));

    // Every chair reachable from every spawn point.
    let chairs = room.chairs().to_vec();
    let mut unreachable = Vec::new();
    for &spawn in &spawns {
        for &chair in &chairs {
            let Ok(center) = world.get::<&Hitbox>(chair).map(|h| h.center()) else {
                continue;
            };
            let grid = room.grid_mut();
            let (start, goal) = (grid.cell_at(spawn), grid.cell_at(center));
            if route_to_occupied(grid, start, goal).is_none() {
                unreachable.push(chair);
            }
        }
    }
    results.push(TestResult::check(
        "room_chairs_reachable",
        unreachable.is_empty(),
        format!("{} unreachable", unreachable.len()),
    ));

    if verbose {
        println!(
            "  {}x{} cells, {} walkable, {} obstacles",
            room.grid().width(),
            room.grid().height(),
            room.grid().walkable_count(),
            room.obstacles().len()
        );
    }
    results
}

// ── 4. Full day ─────────────────────────────────────────────────────────

fn validate_full_day(verbose: bool) -> Vec<TestResult> {
    println!("--- Full Day ---");
    let mut results = Vec::new();

    let config = TavernConfig {
        minutes_per_second: 10.0,
        ..Default::default()
    };
    let mut engine = match load_engine(config) {
        Ok(e) => e,
        Err(e) => {
            results.push(TestResult::check("day_engine", false, e));
            return results;
        }
    };

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut inconsistent_ticks = 0;
    let mut peak_guests = 0;
    let mut served_ok = true;
    let mut tick = 0u64;

    // Run until one hour past closing.
    while !(engine.clock.day == 0 && engine.clock.hours == 23) {
        engine.update(DT);
        tick += 1;

        if !seating_consistent(&engine) {
            inconsistent_ticks += 1;
        }
        peak_guests = peak_guests.max(engine.guest_count());

        // Serve once per simulated second.
        if tick % 60 == 0 {
            let waiting: Vec<_> = engine
                .guests()
                .filter(|&g| engine.state_of(g) == Some(StateKind::WaitingForFood))
                .collect();
            for guest in waiting {
                let item = engine.room.order_for(guest).map(|o| o.item_id.clone());
                if let Some(item) = item {
                    served_ok &= engine.deliver(guest, &item).is_ok();
                }
            }
        }

        for event in engine.drain_events() {
            let key = match event {
                SimEvent::GuestSpawned { .. } => "spawned",
                SimEvent::GuestDeparted { .. } => "departed",
                SimEvent::OrderPlaced { .. } => "ordered",
                SimEvent::OrderServed { .. } => "served",
                SimEvent::ChairContended { .. } => "contended",
                SimEvent::StateChanged { .. } => "transitions",
                SimEvent::AnimationCue { .. } => "cues",
            };
            *counts.entry(key).or_default() += 1;
        }
    }

    let count = |k: &str| counts.get(k).copied().unwrap_or(0);
    results.push(TestResult::check(
        "day_seating_consistent",
        inconsistent_ticks == 0,
        format!("{} inconsistent ticks of {}", inconsistent_ticks, tick),
    ));
    results.push(TestResult::check(
        "day_guests_served",
        count("served") > 0 && served_ok,
        format!("{} ordered, {} served", count("ordered"), count("served")),
    ));
    results.push(TestResult::check(
        "day_min_guests",
        peak_guests >= engine.config.min_guests,
        format!("peak {} guests", peak_guests),
    ));
    results.push(TestResult::check(
        "day_closed_empty",
        engine.guest_count() == 0 && engine.room.orders().is_empty(),
        format!(
            "{} guests, {} orders after closing",
            engine.guest_count(),
            engine.room.orders().len()
        ),
    ));
    results.push(TestResult::check(
        "day_everyone_left",
        count("spawned") == count("departed"),
        format!("{} spawned, {} departed", count("spawned"), count("departed")),
    ));

    if verbose {
        println!("  Event counts over {} ticks:", tick);
        for (name, n) in &counts {
            println!("    {:12}: {}", name, n);
        }
    }
    results
}

// ── 5. Cooking ──────────────────────────────────────────────────────────

fn validate_cooking(_verbose: bool) -> Vec<TestResult> {
    println!("--- Stove & Energy ---");
    let mut results = Vec::new();

    let mut engine = match load_engine(TavernConfig::default()) {
        Ok(e) => e,
        Err(e) => {
            results.push(TestResult::check("cook_engine", false, e));
            return results;
        }
    };
    let Some(&stove) = engine.stoves().first() else {
        results.push(TestResult::check("cook_stove_present", false, "no stove"));
        return results;
    };

    let pie: BTreeMap<String, u32> = [("flour".to_string(), 1), ("apple".to_string(), 2)]
        .into_iter()
        .collect();

    let cold = engine.cook(stove, &pie);
    results.push(TestResult::check(
        "cook_needs_fuel",
        matches!(cold, Err(CookError::NotEnoughFuel { .. })),
        format!("{:?}", cold),
    ));

    let fueled = engine.add_fuel(stove, 50.0);
    let overfilled = engine.add_fuel(stove, 60.0);
    results.push(TestResult::check(
        "cook_fuel_capacity",
        fueled && !overfilled,
        format!("fueled={} overfilled={}", fueled, overfilled),
    ));

    let started = engine.cook(stove, &pie);
    let energy = engine.player_stats().energy;
    results.push(TestResult::check(
        "cook_start",
        started.as_deref() == Ok("apple_pie") && energy < 100.0,
        format!("{:?}, energy {}", started, energy),
    ));

    for _ in 0..(7.0 / DT) as usize {
        engine.update(DT);
    }
    let dish = engine.collect_dish(stove);
    results.push(TestResult::check(
        "cook_collect",
        dish.as_ref().is_some_and(|d| d.item_id == "pie" && d.amount == 2),
        format!("{:?}", dish),
    ));

    // Drain energy until the stove refuses, then rest.
    let mut cooked = 1;
    loop {
        let _ = engine.add_fuel(stove, 15.0);
        match engine.cook(stove, &pie) {
            Ok(_) => {
                cooked += 1;
                for _ in 0..(7.0 / DT) as usize {
                    engine.update(DT);
                }
                engine.collect_dish(stove);
            }
            Err(CookError::NotEnoughEnergy { .. }) => break,
            Err(e) => {
                results.push(TestResult::check("cook_until_tired", false, format!("{}", e)));
                return results;
            }
        }
    }
    let tired = engine.player_stats();
    results.push(TestResult::check(
        "cook_until_tired",
        tired.force_multiplier() < 1.0,
        format!("{} dishes, energy {}", cooked, tired.energy),
    ));
    let restored = engine.player_rest(100.0);
    results.push(TestResult::check(
        "cook_rest",
        engine.player_stats().energy == engine.player_stats().max_energy && restored > 0.0,
        format!("restored {}", restored),
    ));
    results
}

// ── 6. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(_verbose: bool) -> Vec<TestResult> {
    println!("--- Determinism & Persistence ---");
    let mut results = Vec::new();

    let run = || -> Result<(Vec<SimEvent>, TavernEngine), String> {
        let mut engine = load_engine(TavernConfig::default())?;
        let mut events = Vec::new();
        for _ in 0..(120.0 / DT) as usize {
            engine.update(DT);
            events.extend(engine.drain_events());
        }
        Ok((events, engine))
    };

    let (a, b) = match (run(), run()) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            results.push(TestResult::check("determinism_run", false, e));
            return results;
        }
    };
    results.push(TestResult::check(
        "determinism_same_seed",
        a.0 == b.0,
        format!("{} vs {} events", a.0.len(), b.0.len()),
    ));

    let engine = a.1;
    let mut buffer = Vec::new();
    let saved = engine.save(&mut buffer);
    let restored = load_engine(TavernConfig::default()).and_then(|mut fresh| {
        fresh.load(&buffer[..]).map_err(|e| e.to_string())?;
        Ok(fresh)
    });
    let detail = match (&saved, &restored) {
        (Ok(()), Ok(fresh)) => format!(
            "{} bytes, clock {} -> {}",
            buffer.len(),
            engine.clock.time_string(),
            fresh.clock.time_string()
        ),
        _ => format!("save {:?}, load {:?}", saved.as_ref().err(), restored.as_ref().err()),
    };
    let roundtrip = matches!(&restored, Ok(fresh) if fresh.clock.time_string() == engine.clock.time_string());
    results.push(TestResult::check(
        "persistence_roundtrip",
        saved.is_ok() && roundtrip,
        detail,
    ));
    results
}
