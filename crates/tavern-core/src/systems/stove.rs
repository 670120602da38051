//! Stove system - burns fuel and advances cooking

use hecs::World;

use crate::components::Stove;

pub fn stove_system(world: &mut World, dt: f32) {
    for (_, stove) in world.query_mut::<&mut Stove>() {
        stove.update(dt);
    }
}
