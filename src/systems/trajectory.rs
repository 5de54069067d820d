//! Keeps the shot preview in sync with the current aim
//!
//! Recomputes the predicted path through the physics world whenever it
//! differs from the one currently rendered, replacing the preview dot
//! entities wholesale.

use glam::Vec2;

use crate::components::{AimComponent, RenderComponent, TrajectoryComponent};
use crate::consts::{BALL_DENSITY, BALL_LAUNCH_SPEED, BALL_RESTITUTION, SIM_DT, TRAJECTORY_DOT_SIZE};
use crate::ecs::{Entity, Store};
use crate::physics::{PhysicsBody, PhysicsWorld};

pub fn run(store: &mut Store, world: &PhysicsWorld) {
    for entity in store.entities_with::<TrajectoryComponent>() {
        let Some(points) = predict(store, world, entity) else {
            continue;
        };

        let unchanged = store
            .get::<TrajectoryComponent>(entity)
            .map(|t| t.points == points)
            .unwrap_or(true);
        if unchanged {
            continue;
        }

        let old_dots = store
            .get::<TrajectoryComponent>(entity)
            .map(|t| t.point_entities.clone())
            .unwrap_or_default();
        for dot in old_dots {
            store.despawn(dot);
        }

        let mut dots: Vec<Entity> = Vec::with_capacity(points.len());
        for point in &points {
            let dot = store.spawn();
            store.insert(
                dot,
                RenderComponent::new(*point, Vec2::splat(TRAJECTORY_DOT_SIZE), "trajectory-dot")
                    .with_z_order(5),
            );
            dots.push(dot);
        }

        if let Some(traj) = store.get_mut::<TrajectoryComponent>(entity) {
            traj.points = points;
            traj.point_entities = dots;
        }
    }
}

/// Predicted path for an aimed cannon; empty when nothing is aimed
fn predict(store: &Store, world: &PhysicsWorld, entity: Entity) -> Option<Vec<Vec2>> {
    let traj = store.get::<TrajectoryComponent>(entity)?;
    let aim = store.get::<AimComponent>(entity)?;

    if aim.target.is_none() || aim.velocity == Vec2::ZERO {
        return Some(Vec::new());
    }

    let probe = PhysicsBody::new(traj.shape, traj.size, BALL_DENSITY)
        .ok()?
        .with_position(aim.position)
        .with_velocity(aim.velocity * BALL_LAUNCH_SPEED * world.speed)
        .with_restitution(BALL_RESTITUTION);
    Some(world.trajectory(probe, SIM_DT, traj.max_collisions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CANNON_MAX_ANGLE, CANNON_MIN_ANGLE, CANNON_ROTATION};
    use crate::physics::Shape;

    fn aimed_cannon(store: &mut Store) -> Entity {
        let e = store.spawn();
        let mut aim = AimComponent::new(
            Vec2::new(0.5, 0.05),
            CANNON_ROTATION,
            CANNON_MIN_ANGLE,
            CANNON_MAX_ANGLE,
        );
        aim.target = Some(Vec2::new(0.5, 0.9));
        aim.velocity = Vec2::new(0.0, 1.0);
        store.insert(e, aim);
        store.insert(
            e,
            TrajectoryComponent::new(Shape::Circle, Vec2::splat(0.04), 1),
        );
        e
    }

    #[test]
    fn test_preview_entities_track_prediction() {
        let mut store = Store::new();
        let world = PhysicsWorld::new();
        let cannon = aimed_cannon(&mut store);

        run(&mut store, &world);

        let traj = store.get::<TrajectoryComponent>(cannon).unwrap();
        assert!(!traj.points.is_empty());
        assert_eq!(traj.points.len(), traj.point_entities.len());
        let first = traj.point_entities[0];
        assert!(store.get::<RenderComponent>(first).is_some());

        // Unchanged aim: the same dots stay in place
        let before = traj.point_entities.clone();
        run(&mut store, &world);
        let after = &store.get::<TrajectoryComponent>(cannon).unwrap().point_entities;
        assert_eq!(&before, after);
    }

    #[test]
    fn test_cleared_aim_removes_dots() {
        let mut store = Store::new();
        let world = PhysicsWorld::new();
        let cannon = aimed_cannon(&mut store);
        run(&mut store, &world);

        let dots = store
            .get::<TrajectoryComponent>(cannon)
            .unwrap()
            .point_entities
            .clone();
        assert!(!dots.is_empty());

        {
            let aim = store.get_mut::<AimComponent>(cannon).unwrap();
            aim.target = None;
            aim.velocity = Vec2::ZERO;
        }
        run(&mut store, &world);

        assert!(store.get::<TrajectoryComponent>(cannon).unwrap().points.is_empty());
        for dot in dots {
            assert!(!store.is_live(dot));
        }
    }
}
