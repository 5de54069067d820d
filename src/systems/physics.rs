//! Mirrors dynamic bodies into their render components
//!
//! Static geometry's render state is authored directly (or by the
//! oscillate pass); only moving bodies are copied out here.

use crate::components::{PhysicsComponent, RenderComponent};
use crate::ecs::Store;

pub fn run(store: &mut Store) {
    for entity in store.entities_with::<PhysicsComponent>() {
        let Some((position, rotation, size)) = store.get::<PhysicsComponent>(entity).and_then(
            |physics| {
                physics.body.is_dynamic.then(|| {
                    (
                        physics.body.position,
                        physics.body.rotation(),
                        physics.body.size(),
                    )
                })
            },
        ) else {
            continue;
        };

        if let Some(render) = store.get_mut::<RenderComponent>(entity) {
            render.position = position;
            render.rotation = rotation;
            render.set_size(size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PhysicsBody, Shape};
    use glam::Vec2;

    #[test]
    fn test_dynamic_bodies_mirrored_static_left_alone() {
        let mut store = Store::new();

        let ball = store.spawn();
        let body = PhysicsBody::new(Shape::Circle, Vec2::splat(0.04), 1.0)
            .unwrap()
            .with_position(Vec2::new(0.3, 0.7));
        store.insert(ball, PhysicsComponent::new(body));
        store.insert(
            ball,
            RenderComponent::new(Vec2::ZERO, Vec2::splat(0.04), "ball"),
        );

        let peg = store.spawn();
        let peg_body = PhysicsBody::new(Shape::Circle, Vec2::splat(0.04), 1.0)
            .unwrap()
            .with_position(Vec2::new(0.9, 0.9))
            .as_static();
        store.insert(peg, PhysicsComponent::new(peg_body));
        store.insert(
            peg,
            RenderComponent::new(Vec2::new(0.1, 0.1), Vec2::splat(0.04), "peg"),
        );

        run(&mut store);

        assert_eq!(
            store.get::<RenderComponent>(ball).unwrap().position,
            Vec2::new(0.3, 0.7)
        );
        // Authored render position for statics is not overwritten
        assert_eq!(
            store.get::<RenderComponent>(peg).unwrap().position,
            Vec2::new(0.1, 0.1)
        );
    }
}
