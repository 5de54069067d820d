//! 2D rigid-body physics: bodies, collision detection/resolution, world
//!
//! Hand-rolled for the peg board's needs: circles and rotated rectangles,
//! semi-implicit Euler integration, separating-axis collision tests, and
//! restitution-damped resolution of dynamic bodies against static geometry.

pub mod body;
pub mod collision;
pub mod world;

pub use body::{BodyError, PhysicsBody, Shape};
pub use collision::{Aabb, is_colliding};
pub use world::{CollisionEvent, PhysicsWorld};
