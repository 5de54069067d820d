//! The physics world: gravity, integration, collision pass, trajectory probe
//!
//! The world's body list is a derived cache: the engine rebuilds it from the
//! component store before stepping and writes the results back afterwards.
//! Nothing else holds a reference into it.

use glam::Vec2;

use crate::consts::{BALL_LOST_Y, PLAY_AREA_MARGIN, TRAJECTORY_MAX_STEPS};
use crate::ecs::Entity;

use super::body::PhysicsBody;
use super::collision::{is_colliding, resolve_circle_circle, resolve_rect_circle};
use super::Shape;

/// A detected overlap between two bodies, reported once per pass per
/// ordered (dynamic, other) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: Entity,
    pub b: Entity,
}

#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    /// Normalized-board "down" by default
    pub gravity: Vec2,
    /// Global speed multiplier applied to every integration step
    pub speed: f32,
    bodies: Vec<(Entity, PhysicsBody)>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            gravity: Vec2::new(0.0, 1.0),
            speed: 1.0,
            bodies: Vec::new(),
        }
    }

    /// Replace the body list wholesale (the per-tick cache rebuild)
    pub fn set_bodies(&mut self, bodies: Vec<(Entity, PhysicsBody)>) {
        self.bodies = bodies;
    }

    pub fn bodies(&self) -> impl Iterator<Item = (Entity, &PhysicsBody)> {
        self.bodies.iter().map(|(e, b)| (*e, b))
    }

    pub fn body(&self, entity: Entity) -> Option<&PhysicsBody> {
        self.bodies
            .iter()
            .find(|(e, _)| *e == entity)
            .map(|(_, b)| b)
    }

    /// Push a gravity force (mass x gravity) onto every gravity-affected body
    pub fn apply_gravity(&mut self) {
        for (_, body) in &mut self.bodies {
            if body.affected_by_gravity {
                let force = self.gravity * body.mass();
                body.apply_force(force);
            }
        }
    }

    /// Semi-implicit Euler step over every dynamic body, scaled by the
    /// world speed. Clears accumulated forces and refreshes resting flags.
    pub fn integrate(&mut self, dt: f32) {
        let dt = dt * self.speed;
        for (_, body) in &mut self.bodies {
            if !body.is_dynamic {
                continue;
            }
            let acceleration = body.accumulated_force() / body.mass();
            body.position += body.velocity * dt + 0.5 * acceleration * dt * dt;
            body.velocity += acceleration * dt;
            body.clear_forces();
            body.update_resting();
        }
    }

    /// Detect overlaps for every dynamic body against every other body and
    /// resolve the dynamic-versus-static ones. Returns the events in
    /// detection order.
    pub fn resolve_collisions(&mut self) -> Vec<CollisionEvent> {
        let mut events = Vec::new();
        let count = self.bodies.len();

        for i in 0..count {
            if !self.bodies[i].1.is_dynamic {
                continue;
            }
            for j in 0..count {
                if i == j {
                    continue;
                }
                // Bodies are small records; cloning the partner sidesteps
                // simultaneous borrows of the list.
                let (other_entity, other) = {
                    let (e, b) = &self.bodies[j];
                    (*e, b.clone())
                };
                let (entity, body) = &mut self.bodies[i];
                if !is_colliding(body, &other) {
                    continue;
                }

                events.push(CollisionEvent {
                    a: *entity,
                    b: other_entity,
                });

                // Dynamic pairs only report; static partners push back,
                // unless transiently excluded from resolution
                if other.is_dynamic || !other.affected_by_collisions {
                    continue;
                }
                match (body.shape, other.shape) {
                    (Shape::Circle, Shape::Circle) => resolve_circle_circle(body, &other),
                    (Shape::Circle, Shape::Rect) => resolve_rect_circle(body, &other),
                    // Dynamic rectangle resolution is out of scope
                    _ => {}
                }
            }
        }
        events
    }

    /// One full step: gravity, integration, collision pass
    pub fn step(&mut self, dt: f32) -> Vec<CollisionEvent> {
        self.apply_gravity();
        self.integrate(dt);
        self.resolve_collisions()
    }

    /// Predict where a projectile would go by stepping a throwaway copy of
    /// the world seeded with it. Records the probe's position every step
    /// until `max_collisions` collision events involving it have occurred
    /// or it leaves the play area. The live world is never mutated.
    pub fn trajectory(
        &self,
        projectile: PhysicsBody,
        dt: f32,
        max_collisions: usize,
    ) -> Vec<Vec2> {
        let probe = Entity::from_parts(u32::MAX, u32::MAX);
        let mut scratch = self.clone();
        // The preview ignores any live ball
        scratch.bodies.retain(|(_, b)| !b.is_dynamic);
        scratch.bodies.push((probe, projectile));

        let mut points = Vec::new();
        let mut collisions = 0;
        for _ in 0..TRAJECTORY_MAX_STEPS {
            let events = scratch.step(dt);
            collisions += events
                .iter()
                .filter(|ev| ev.a == probe || ev.b == probe)
                .count();

            let position = match scratch.body(probe) {
                Some(body) => body.position,
                None => break,
            };
            points.push(position);

            if collisions >= max_collisions || outside_play_area(position) {
                break;
            }
        }
        points
    }
}

fn outside_play_area(position: Vec2) -> bool {
    position.y > BALL_LOST_Y
        || position.y < -PLAY_AREA_MARGIN
        || position.x < -PLAY_AREA_MARGIN
        || position.x > 1.0 + PLAY_AREA_MARGIN
}
