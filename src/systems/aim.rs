//! Points the cannon at the drag target, clamped to its angle limits
//!
//! The target is rotated into the cannon's local frame, clamped, rotated
//! back, and turned into a unit launch velocity. A loaded cannon shows the
//! LOADED visual state; with no target both the velocity and the state are
//! cleared.

use glam::Vec2;

use crate::components::{AimComponent, RenderComponent, VisualState};
use crate::ecs::Store;
use crate::normalize_angle;

pub fn run(store: &mut Store) {
    for entity in store.entities_with::<AimComponent>() {
        let Some(aim) = store.get::<AimComponent>(entity) else {
            continue;
        };

        match aim.target {
            Some(target) => {
                let offset = target - aim.position;
                let local = normalize_angle(offset.y.atan2(offset.x) - aim.rotation);
                let clamped = local.clamp(aim.min_angle, aim.max_angle);
                let world_angle = normalize_angle(aim.rotation + clamped);
                let direction = Vec2::from_angle(world_angle);

                if let Some(aim) = store.get_mut::<AimComponent>(entity) {
                    aim.velocity = direction;
                }
                if let Some(render) = store.get_mut::<RenderComponent>(entity) {
                    render.rotation = world_angle;
                    render.state.set(VisualState::LOADED, true);
                }
            }
            None => {
                if let Some(aim) = store.get_mut::<AimComponent>(entity) {
                    aim.velocity = Vec2::ZERO;
                }
                if let Some(render) = store.get_mut::<RenderComponent>(entity) {
                    render.state.set(VisualState::LOADED, false);
                }
            }
        }
    }
}
