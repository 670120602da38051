//! Physics system - integrates character motion against the room's obstacles

use hecs::World;
use tavern_logic::geometry::{Direction, Rect};
use tavern_logic::movement;

use crate::components::{Behavior, Facing, Hitbox, Motion, StateKind};

/// Step every character that is free to move. Seated and leaving characters
/// are skipped; facing follows velocity and holds when it is zero.
pub fn physics_system(world: &mut World, obstacles: &[Rect], dt: f32) {
    for (_, (hitbox, motion, facing, behavior)) in
        world.query_mut::<(&mut Hitbox, &mut Motion, &mut Facing, &Behavior)>()
    {
        let kind = behavior.kind();
        if kind.is_seated() || kind == StateKind::Leaving {
            continue;
        }
        movement::step(&mut hitbox.0, &mut motion.kin, &motion.params, dt, obstacles);
        if let Some(dir) = Direction::from_vector(motion.kin.velocity) {
            facing.0 = dir;
        }
    }
}
