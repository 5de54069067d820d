//! Rigid body record
//!
//! A body is value-like state: shape, size, density-derived mass, motion,
//! and the flags the world consults during integration and resolution.
//! Components own the canonical body; the world's list is a derived cache.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MIN_ENTITY_SIZE, RESTING_ENTER_SPEED, RESTING_EXIT_SPEED};
use crate::normalize_angle;

use super::collision::Aabb;

/// Collision shape. A circle's diameter is `size.x`; a rectangle's extents
/// are `size.x` by `size.y`, rotated about its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Circle,
    Rect,
}

/// Construction failures. Mass and resolution math divide by size and
/// density, so these are rejected up front rather than propagated as NaN.
#[derive(Debug, Error, PartialEq)]
pub enum BodyError {
    #[error("body size must be positive on both axes, got {0}x{1}")]
    NonPositiveSize(f32, f32),
    #[error("body density must be positive, got {0}")]
    NonPositiveDensity(f32),
}

/// A rigid body in normalized board space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub shape: Shape,
    /// Clamped to MIN_ENTITY_SIZE per axis on every mutation
    size: Vec2,
    density: f32,
    pub friction: f32,
    /// Fraction of speed lost on each resolved bounce (0 = perfectly elastic)
    pub restitution: f32,
    /// Stored for tuning data; integration does not currently apply it
    pub linear_damping: f32,
    pub position: Vec2,
    /// Kept in (-π, π]
    rotation: f32,
    pub velocity: Vec2,
    /// Pending forces, cleared every integration step
    forces: Vec2,
    /// Hysteresis-gated "slow enough to treat as stationary" flag
    pub is_resting: bool,
    pub affected_by_gravity: bool,
    /// Static bodies never integrate or move under collision
    pub is_dynamic: bool,
    /// Can be collided into but excluded from resolution when false
    pub affected_by_collisions: bool,
}

impl PhysicsBody {
    pub fn new(shape: Shape, size: Vec2, density: f32) -> Result<Self, BodyError> {
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(BodyError::NonPositiveSize(size.x, size.y));
        }
        if density <= 0.0 {
            return Err(BodyError::NonPositiveDensity(density));
        }
        Ok(Self {
            shape,
            size: size.max(Vec2::splat(MIN_ENTITY_SIZE)),
            density,
            friction: 0.0,
            restitution: 0.0,
            linear_damping: 0.0,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            forces: Vec2::ZERO,
            is_resting: false,
            affected_by_gravity: true,
            is_dynamic: true,
            affected_by_collisions: true,
        })
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.set_rotation(rotation);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Static geometry: never integrates, never moves under collision
    pub fn as_static(mut self) -> Self {
        self.is_dynamic = false;
        self.affected_by_gravity = false;
        self
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size.max(Vec2::splat(MIN_ENTITY_SIZE));
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = normalize_angle(rotation);
    }

    #[inline]
    pub fn density(&self) -> f32 {
        self.density
    }

    /// Circle radius (half the x extent)
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size.x / 2.0
    }

    /// Closed-form area per shape
    pub fn area(&self) -> f32 {
        match self.shape {
            Shape::Circle => std::f32::consts::PI * self.radius() * self.radius(),
            Shape::Rect => self.size.x * self.size.y,
        }
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.density * self.area()
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.forces += force;
    }

    pub fn clear_forces(&mut self) {
        self.forces = Vec2::ZERO;
    }

    #[inline]
    pub fn accumulated_force(&self) -> Vec2 {
        self.forces
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Update the resting flag through the hysteresis band: flip to resting
    /// below the enter speed, flip back above the exit speed, otherwise keep
    /// the prior value.
    pub fn update_resting(&mut self) {
        let speed = self.speed();
        if speed < RESTING_ENTER_SPEED {
            self.is_resting = true;
        } else if speed > RESTING_EXIT_SPEED {
            self.is_resting = false;
        }
    }

    /// Axis-aligned bounding box; rectangles account for rotation
    pub fn aabb(&self) -> Aabb {
        match self.shape {
            Shape::Circle => {
                let r = self.radius();
                Aabb::from_center_half(self.position, Vec2::splat(r))
            }
            Shape::Rect => {
                let (sin, cos) = self.rotation.sin_cos();
                let hw = self.size.x / 2.0;
                let hh = self.size.y / 2.0;
                let half = Vec2::new(
                    hw * cos.abs() + hh * sin.abs(),
                    hw * sin.abs() + hh * cos.abs(),
                );
                Aabb::from_center_half(self.position, half)
            }
        }
    }

    /// Corners of a rectangle body, rotated about its center.
    /// Order: counter-clockwise starting from the (-x, -y) corner.
    pub fn corners(&self) -> [Vec2; 4] {
        let (sin, cos) = self.rotation.sin_cos();
        let hw = self.size.x / 2.0;
        let hh = self.size.y / 2.0;
        let rotate = |p: Vec2| Vec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos);
        [
            self.position + rotate(Vec2::new(-hw, -hh)),
            self.position + rotate(Vec2::new(hw, -hh)),
            self.position + rotate(Vec2::new(hw, hh)),
            self.position + rotate(Vec2::new(-hw, hh)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_construction() {
        let err = PhysicsBody::new(Shape::Circle, Vec2::new(0.0, 1.0), 1.0).unwrap_err();
        assert_eq!(err, BodyError::NonPositiveSize(0.0, 1.0));

        let err = PhysicsBody::new(Shape::Rect, Vec2::new(1.0, 1.0), -2.0).unwrap_err();
        assert_eq!(err, BodyError::NonPositiveDensity(-2.0));
    }

    #[test]
    fn test_size_clamped_to_minimum() {
        let mut body = PhysicsBody::new(Shape::Rect, Vec2::new(0.01, 0.5), 1.0).unwrap();
        assert_eq!(body.size(), Vec2::new(MIN_ENTITY_SIZE, 0.5));
        body.set_size(Vec2::new(0.001, 0.001));
        assert_eq!(body.size(), Vec2::splat(MIN_ENTITY_SIZE));
    }

    #[test]
    fn test_mass_from_density_and_area() {
        let circle = PhysicsBody::new(Shape::Circle, Vec2::splat(2.0), 3.0).unwrap();
        let expected = 3.0 * std::f32::consts::PI; // r = 1
        assert!((circle.mass() - expected).abs() < 1e-4);

        let rect = PhysicsBody::new(Shape::Rect, Vec2::new(2.0, 4.0), 0.5).unwrap();
        assert!((rect.mass() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_resting_hysteresis_band() {
        let mut body = PhysicsBody::new(Shape::Circle, Vec2::splat(0.04), 1.0).unwrap();

        // In-band speed keeps the prior flag, both ways
        body.is_resting = false;
        body.velocity = Vec2::new(0.05, 0.0);
        body.update_resting();
        assert!(!body.is_resting);

        body.is_resting = true;
        body.update_resting();
        assert!(body.is_resting);

        // Crossing the thresholds flips it
        body.velocity = Vec2::new(0.07, 0.0);
        body.update_resting();
        assert!(!body.is_resting);

        body.velocity = Vec2::new(0.03, 0.0);
        body.update_resting();
        assert!(body.is_resting);
    }

    #[test]
    fn test_rotation_normalized() {
        let body = PhysicsBody::new(Shape::Rect, Vec2::splat(1.0), 1.0)
            .unwrap()
            .with_rotation(3.0 * std::f32::consts::PI);
        assert!((body.rotation() - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_rotated_rect_aabb_grows() {
        let axis_aligned = PhysicsBody::new(Shape::Rect, Vec2::new(2.0, 1.0), 1.0).unwrap();
        let rotated = axis_aligned
            .clone()
            .with_rotation(std::f32::consts::FRAC_PI_4);
        let a = axis_aligned.aabb();
        let b = rotated.aabb();
        assert!(b.max.x - b.min.x > a.max.x - a.min.x - 1e-5);
        assert!(b.max.y - b.min.y > a.max.y - a.min.y);
    }
}
