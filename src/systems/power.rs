//! Applies activated power effects
//!
//! Area-light powers light every unlit peg near the triggering body and
//! then deactivate; pass-through powers have no per-tick effect here (the
//! clear protocol consults and decays them).

use glam::Vec2;

use crate::components::{
    LightComponent, PhysicsComponent, PowerComponent, PowerKind, RenderComponent, VisualState,
};
use crate::consts::AREA_LIGHT_RADIUS;
use crate::ecs::{Entity, Store};

pub fn run(store: &mut Store) {
    let mut triggers: Vec<(Entity, Vec2)> = Vec::new();
    for (entity, power) in store.iter::<PowerComponent>() {
        if power.activated && power.kind == PowerKind::AreaLight {
            if let Some(physics) = store.get::<PhysicsComponent>(entity) {
                triggers.push((entity, physics.body.position));
            }
        }
    }

    for (holder, center) in triggers {
        let nearby: Vec<Entity> = store
            .iter::<LightComponent>()
            .filter(|(_, light)| !light.lit)
            .map(|(entity, _)| entity)
            .filter(|entity| {
                store
                    .get::<PhysicsComponent>(*entity)
                    .map(|p| p.body.position.distance(center) <= AREA_LIGHT_RADIUS)
                    .unwrap_or(false)
            })
            .collect();

        log::debug!("area-light at {center:?} lights {} pegs", nearby.len());
        for entity in nearby {
            if let Some(light) = store.get_mut::<LightComponent>(entity) {
                light.lit = true;
            }
            if let Some(render) = store.get_mut::<RenderComponent>(entity) {
                render.state.set(VisualState::LIT, true);
            }
        }

        // One-shot: the effect has been applied
        if let Some(power) = store.get_mut::<PowerComponent>(holder) {
            power.activated = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PhysicsBody, Shape};

    fn peg_at(store: &mut Store, position: Vec2) -> Entity {
        let e = store.spawn();
        let body = PhysicsBody::new(Shape::Circle, Vec2::splat(0.04), 1.0)
            .unwrap()
            .with_position(position)
            .as_static();
        store.insert(e, PhysicsComponent::new(body));
        store.insert(e, LightComponent::new("glow"));
        e
    }

    #[test]
    fn test_area_light_lights_nearby_unlit_pegs() {
        let mut store = Store::new();
        let near = peg_at(&mut store, Vec2::new(0.5, 0.55));
        let far = peg_at(&mut store, Vec2::new(0.5, 0.9));

        let green = peg_at(&mut store, Vec2::new(0.5, 0.5));
        let mut power = PowerComponent::new(PowerKind::AreaLight, 1);
        power.activated = true;
        store.insert(green, power);

        run(&mut store);

        assert!(store.get::<LightComponent>(near).unwrap().lit);
        assert!(!store.get::<LightComponent>(far).unwrap().lit);
        // Applied once, then deactivated
        assert!(!store.get::<PowerComponent>(green).unwrap().activated);
    }

    #[test]
    fn test_pass_through_has_no_tick_effect() {
        let mut store = Store::new();
        let peg = peg_at(&mut store, Vec2::new(0.5, 0.52));

        let green = peg_at(&mut store, Vec2::new(0.5, 0.5));
        let mut power = PowerComponent::new(PowerKind::PassThrough, 1);
        power.activated = true;
        store.insert(green, power);

        run(&mut store);

        assert!(!store.get::<LightComponent>(peg).unwrap().lit);
        // Stays activated; the clear protocol owns its decay
        assert!(store.get::<PowerComponent>(green).unwrap().activated);
    }
}
