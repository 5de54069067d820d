//! Advances sinusoidal motion and moves the paired render and body state
//!
//! Oscillating elements are static as far as integration is concerned;
//! this pass is what actually moves them, so it updates the collision body
//! along with the rendered position.

use glam::Vec2;

use crate::components::{OscillateComponent, PhysicsComponent, RenderComponent};
use crate::ecs::{Entity, Store};

pub fn run(store: &mut Store, dt: f32) {
    let mut moved: Vec<(Entity, Vec2)> = Vec::new();
    for (entity, osc) in store.iter_mut::<OscillateComponent>() {
        osc.elapsed += dt;
        moved.push((entity, osc.position()));
    }

    for (entity, position) in moved {
        if let Some(render) = store.get_mut::<RenderComponent>(entity) {
            render.position = position;
        }
        if let Some(physics) = store.get_mut::<PhysicsComponent>(entity) {
            physics.body.position = position;
        }
    }
}
