//! Character state machine.
//!
//! Each tick a character's components are checked out of the world into an
//! [`Actor`], its current state's update runs, and at most one transition is
//! applied. A transition only happens when the requested kind differs from
//! the current kind, so entry logic (timer rolls, path searches) never
//! re-runs while a state is in progress.
//!
//! Entry logic may redirect once: entering `MovingToTarget` without a
//! reachable chair lands in `Idle` instead.

use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tavern_logic::config::{TavernConfig, TimerRange};
use tavern_logic::constants::DEFAULT_COOKING_TIME;
use tavern_logic::geometry::{Direction, Rect, Vec2};
use tavern_logic::pathfinding::{cells_to_waypoints, route_to_occupied};
use tavern_logic::recipes::RecipeCatalog;

use crate::components::*;
use crate::room::TavernRoom;
use crate::systems::events::{EventQueue, SimEvent};

/// Everything a state update may touch besides the character itself.
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub room: &'a mut TavernRoom,
    pub catalog: &'a RecipeCatalog,
    pub config: &'a TavernConfig,
    pub rng: &'a mut ChaCha8Rng,
    pub events: &'a mut EventQueue,
    /// Characters whose Leaving update has run; despawned next spawn pass.
    pub departed: &'a mut Vec<Entity>,
}

/// A character's components, checked out of the world for one update.
#[derive(Debug, Clone)]
pub struct Actor {
    pub entity: Entity,
    pub hitbox: Rect,
    pub motion: Motion,
    pub facing: Direction,
    pub character: Character,
    pub behavior: Behavior,
}

impl Actor {
    pub fn checkout(world: &World, entity: Entity) -> Option<Self> {
        let hitbox = world.get::<&Hitbox>(entity).ok()?.0;
        let motion = *world.get::<&Motion>(entity).ok()?;
        let facing = world.get::<&Facing>(entity).map(|f| f.0).unwrap_or_default();
        let character = (*world.get::<&Character>(entity).ok()?).clone();
        let behavior = (*world.get::<&Behavior>(entity).ok()?).clone();
        Some(Self {
            entity,
            hitbox,
            motion,
            facing,
            character,
            behavior,
        })
    }

    pub fn commit(self, world: &mut World) {
        let components = (
            Hitbox(self.hitbox),
            self.motion,
            Facing(self.facing),
            self.character,
            self.behavior,
        );
        if world.insert(self.entity, components).is_err() {
            log::warn!("character {:?} vanished during its update", self.entity);
        }
    }

    fn position(&self) -> Vec2 {
        self.hitbox.center()
    }
}

/// Uniform draw from a timer range.
pub fn roll_timer<R: Rng + ?Sized>(rng: &mut R, range: TimerRange) -> f32 {
    if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    }
}

/// Advance every character in roster order.
pub fn behavior_system(ctx: &mut TickContext, roster: &[Entity], dt: f32) {
    for &entity in roster {
        tick_character(ctx, entity, dt);
    }
}

/// Run one character's current state and apply the transition it asks for.
pub fn tick_character(ctx: &mut TickContext, entity: Entity, dt: f32) {
    let Some(mut actor) = Actor::checkout(ctx.world, entity) else {
        return;
    };
    if let Some(next) = update_state(&mut actor, ctx, dt) {
        transition(&mut actor, next, ctx);
    }
    actor.commit(ctx.world);
}

/// Move a character into `kind` from outside its own update, e.g. on food
/// delivery or at closing time. Returns whether the state changed.
pub fn force_state(ctx: &mut TickContext, entity: Entity, kind: StateKind) -> bool {
    let Some(mut actor) = Actor::checkout(ctx.world, entity) else {
        return false;
    };
    let changed = transition(&mut actor, kind, ctx);
    actor.commit(ctx.world);
    changed
}

/// Apply a transition if `next` differs from the current kind.
pub fn transition(actor: &mut Actor, next: StateKind, ctx: &mut TickContext) -> bool {
    let from = actor.behavior.kind();
    if next == from {
        return false;
    }
    let state = match enter(actor, next, from, ctx) {
        Ok(state) => state,
        Err(redirect) if redirect == from => return false,
        Err(redirect) => enter(actor, redirect, from, ctx).unwrap_or_default(),
    };
    let to = state.kind();
    actor.behavior.state = state;
    log::trace!("{:?}: {} -> {}", actor.entity, from.as_str(), to.as_str());
    ctx.events.push(SimEvent::StateChanged {
        entity: actor.entity,
        from,
        to,
    });
    true
}

// ── Updates ─────────────────────────────────────────────────────────────

fn update_state(actor: &mut Actor, ctx: &mut TickContext, dt: f32) -> Option<StateKind> {
    match actor.behavior.kind() {
        StateKind::Idle => update_idle(actor, ctx, dt),
        StateKind::Walk => update_walk(actor, ctx),
        StateKind::FindingChair => update_finding_chair(actor, ctx, dt),
        StateKind::MovingToTarget => update_moving(actor, ctx),
        StateKind::Sitting => update_sitting(actor, dt),
        StateKind::Ordering => update_ordering(actor, ctx, dt),
        StateKind::WaitingForFood => None,
        StateKind::Eating => update_eating(actor, dt),
        StateKind::Leaving => {
            if !ctx.departed.contains(&actor.entity) {
                ctx.departed.push(actor.entity);
            }
            None
        }
    }
}

fn sit_pending(actor: &Actor) -> bool {
    actor.behavior.sit_requested && actor.character.chair.is_some()
}

fn update_idle(actor: &mut Actor, ctx: &TickContext, dt: f32) -> Option<StateKind> {
    if sit_pending(actor) {
        return Some(StateKind::Sitting);
    }
    if actor.motion.kin.speed() > ctx.config.walk_start_speed {
        return Some(StateKind::Walk);
    }
    if !actor.character.is_guest() {
        return None;
    }
    if let BehaviorState::Idle { timer } = &mut actor.behavior.state {
        *timer -= dt;
        if *timer <= 0.0 {
            return Some(StateKind::FindingChair);
        }
    }
    None
}

fn update_walk(actor: &mut Actor, ctx: &TickContext) -> Option<StateKind> {
    if sit_pending(actor) {
        return Some(StateKind::Sitting);
    }
    if actor.motion.kin.speed() < ctx.config.walk_stop_speed {
        return Some(StateKind::Idle);
    }
    None
}

fn update_finding_chair(actor: &mut Actor, ctx: &mut TickContext, dt: f32) -> Option<StateKind> {
    if let Some(chair) = ctx.room.get_free_chair(ctx.world, &mut *ctx.rng) {
        actor.character.target = Some(chair);
        return Some(StateKind::MovingToTarget);
    }
    if let BehaviorState::FindingChair { elapsed } = &mut actor.behavior.state {
        *elapsed += dt;
        if *elapsed >= ctx.config.find_chair_timeout {
            return Some(StateKind::Idle);
        }
    }
    None
}

fn update_moving(actor: &mut Actor, ctx: &mut TickContext) -> Option<StateKind> {
    let Some(chair) = actor.character.target else {
        return Some(StateKind::Idle);
    };
    let Ok(chair_center) = ctx.world.get::<&Hitbox>(chair).map(|h| h.center()) else {
        actor.character.target = None;
        return Some(StateKind::Idle);
    };

    let position = actor.position();
    let reach = ctx.config.waypoint_reach * ctx.room.grid().cell_size();
    let next_waypoint = match &mut actor.behavior.state {
        BehaviorState::MovingToTarget { path } => {
            while path.front().is_some_and(|wp| wp.distance(&position) <= reach) {
                path.pop_front();
            }
            path.front().copied()
        }
        _ => None,
    };

    let arrived = position.distance(&chair_center) <= ctx.config.interaction_range();
    if arrived || next_waypoint.is_none() {
        actor.motion.kin.halt();
        actor.character.target = None;
        if ctx.room.reserve(ctx.world, chair, actor.entity) {
            actor.character.chair = Some(chair);
            return Some(StateKind::Sitting);
        }
        log::debug!("{:?}: chair {:?} taken on arrival", actor.entity, chair);
        ctx.events.push(SimEvent::ChairContended {
            entity: actor.entity,
            chair,
        });
        return Some(StateKind::Idle);
    }

    if let Some(waypoint) = next_waypoint {
        actor.motion.kin.intent = (waypoint - position).normalize();
    }
    None
}

fn update_sitting(actor: &mut Actor, dt: f32) -> Option<StateKind> {
    if !actor.character.is_guest() {
        return actor
            .behavior
            .stand_requested
            .then_some(StateKind::Idle);
    }
    if let BehaviorState::Sitting { timer } = &mut actor.behavior.state {
        *timer -= dt;
        if *timer <= 0.0 {
            return Some(StateKind::Ordering);
        }
    }
    None
}

fn update_ordering(actor: &mut Actor, ctx: &mut TickContext, dt: f32) -> Option<StateKind> {
    if let BehaviorState::Ordering { timer } = &mut actor.behavior.state {
        *timer -= dt;
        if *timer > 0.0 {
            return None;
        }
    }

    let catalog = ctx.catalog;
    let orderable = ctx.room.orderable_recipes(catalog);
    let recipe_ids: Vec<&str> = orderable.keys().copied().collect();
    let Some(&recipe_id) = recipe_ids.choose(&mut *ctx.rng) else {
        log::debug!("{:?}: nothing to order", actor.entity);
        return Some(StateKind::Idle);
    };
    let item_id = catalog.result_item(recipe_id);

    match ctx
        .room
        .add_order(actor.entity, &mut actor.character, item_id, recipe_id)
    {
        Ok(()) => {
            ctx.events.push(SimEvent::OrderPlaced {
                entity: actor.entity,
                item_id: item_id.to_string(),
                recipe_id: recipe_id.to_string(),
            });
            Some(StateKind::WaitingForFood)
        }
        Err(e) => {
            // Nobody can serve an order that was never recorded.
            log::warn!("{}", e);
            Some(StateKind::Idle)
        }
    }
}

fn update_eating(actor: &mut Actor, dt: f32) -> Option<StateKind> {
    if let BehaviorState::Eating { timer } = &mut actor.behavior.state {
        *timer -= dt;
        if *timer <= 0.0 {
            return Some(StateKind::Leaving);
        }
    }
    None
}

// ── Entry ───────────────────────────────────────────────────────────────

/// Build the state for `kind`, running its entry logic. `Err` asks for a
/// redirect to another kind.
fn enter(
    actor: &mut Actor,
    kind: StateKind,
    from: StateKind,
    ctx: &mut TickContext,
) -> Result<BehaviorState, StateKind> {
    let guest = actor.character.is_guest();
    match kind {
        StateKind::Idle => {
            if from.is_seated() {
                if let Some(chair) = actor.character.chair.take() {
                    ctx.room.vacate(ctx.world, chair);
                }
            }
            actor.character.target = None;
            actor.motion.kin.intent = Vec2::ZERO;
            actor.behavior.stand_requested = false;
            let timer = if guest {
                roll_timer(&mut *ctx.rng, ctx.config.idle_time)
            } else {
                0.0
            };
            Ok(BehaviorState::Idle { timer })
        }
        StateKind::Walk => Ok(BehaviorState::Walk),
        StateKind::FindingChair => {
            actor.motion.kin.intent = Vec2::ZERO;
            Ok(BehaviorState::FindingChair { elapsed: 0.0 })
        }
        StateKind::MovingToTarget => enter_moving(actor, ctx),
        StateKind::Sitting => enter_sitting(actor, ctx),
        StateKind::Ordering => Ok(BehaviorState::Ordering {
            timer: roll_timer(&mut *ctx.rng, ctx.config.ordering_time),
        }),
        StateKind::WaitingForFood => Ok(BehaviorState::WaitingForFood),
        StateKind::Eating => {
            let cooking_time = actor
                .character
                .order
                .as_ref()
                .map(|o| ctx.catalog.cooking_time(&o.recipe_id))
                .unwrap_or(DEFAULT_COOKING_TIME);
            ctx.room.remove_order(actor.entity, &mut actor.character);
            Ok(BehaviorState::Eating {
                timer: cooking_time * ctx.config.eating_multiplier,
            })
        }
        StateKind::Leaving => {
            ctx.room.remove_order(actor.entity, &mut actor.character);
            if let Some(chair) = actor.character.chair.take() {
                ctx.room.vacate(ctx.world, chair);
            }
            actor.character.target = None;
            actor.motion.kin.halt();
            Ok(BehaviorState::Leaving)
        }
    }
}

fn enter_moving(actor: &mut Actor, ctx: &mut TickContext) -> Result<BehaviorState, StateKind> {
    let Some(chair) = actor.character.target else {
        return Err(StateKind::Idle);
    };
    let Ok(chair_center) = ctx.world.get::<&Hitbox>(chair).map(|h| h.center()) else {
        actor.character.target = None;
        return Err(StateKind::Idle);
    };

    let grid = ctx.room.grid_mut();
    let start = grid.cell_at(actor.position());
    let goal = grid.cell_at(chair_center);
    match route_to_occupied(grid, start, goal) {
        Some(cells) => Ok(BehaviorState::MovingToTarget {
            path: cells_to_waypoints(grid, &cells).into(),
        }),
        None => {
            log::debug!("{:?}: no path to chair {:?}", actor.entity, chair);
            actor.character.target = None;
            Err(StateKind::Idle)
        }
    }
}

fn enter_sitting(actor: &mut Actor, ctx: &mut TickContext) -> Result<BehaviorState, StateKind> {
    let Some(chair) = actor.character.chair else {
        return Err(StateKind::Idle);
    };
    if let Ok(center) = ctx.world.get::<&Hitbox>(chair).map(|h| h.center()) {
        actor.hitbox.set_center(center);
    }
    actor.motion.kin.halt();
    actor.behavior.sit_requested = false;

    let table_center = ctx
        .room
        .table_for_chair(ctx.world, chair)
        .and_then(|t| ctx.world.get::<&Hitbox>(t).ok().map(|h| h.center()));
    match table_center {
        Some(center) => {
            if let Some(dir) = Direction::from_vector(center - actor.position()) {
                actor.facing = dir;
            }
        }
        None => log::debug!("{:?}: chair {:?} has no table", actor.entity, chair),
    }

    let timer = if actor.character.is_guest() {
        roll_timer(&mut *ctx.rng, ctx.config.sit_time)
    } else {
        0.0
    };
    Ok(BehaviorState::Sitting { timer })
}

// ── Animation ───────────────────────────────────────────────────────────

/// Send `idle_<dir>` / `walk_<dir>` cues for characters whose cue changed.
pub fn animation_system(world: &mut World, events: &mut EventQueue) {
    for (entity, (behavior, facing)) in world.query_mut::<(&mut Behavior, &Facing)>() {
        let prefix = if behavior.kind().is_moving() {
            "walk"
        } else {
            "idle"
        };
        let cue = format!("{}_{}", prefix, facing.0.as_str());
        if behavior.last_cue.as_deref() != Some(cue.as_str()) {
            behavior.last_cue = Some(cue.clone());
            events.push(SimEvent::AnimationCue { entity, cue });
        }
    }
}
