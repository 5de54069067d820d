//! Peg Drop - a pachinko-style peg board simulation engine
//!
//! Core modules:
//! - `ecs`: Entity handles and the typed component store
//! - `physics`: Rigid bodies, collision detection/resolution, the world
//! - `components`: Per-behavior data records attached to entities
//! - `systems`: The ordered per-tick update passes
//! - `engine`: Tick orchestration, input, and the render snapshot
//! - `level`: Inbound level geometry and placement validation
//!
//! The simulation is single-threaded and deterministic: fixed timestep,
//! seeded RNG, and all deferred work scheduled on the simulation timeline.

pub mod components;
pub mod ecs;
pub mod engine;
pub mod level;
pub mod physics;
pub mod systems;
pub mod timer;

pub use engine::{EngineError, GameEngine, RenderSnapshot};
pub use level::LevelSpec;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Board space is normalized: x spans [0, 1] left-to-right,
    /// y spans [0, 1] top-to-bottom (gravity points toward +y).
    /// Entity sizes are clamped to this minimum on every mutation.
    pub const MIN_ENTITY_SIZE: f32 = 0.04;

    /// Resting hysteresis band: a dynamic body becomes resting below
    /// the enter speed and stops resting above the exit speed. Speeds
    /// in between keep the prior flag to prevent flapping near rest.
    pub const RESTING_ENTER_SPEED: f32 = 0.04;
    pub const RESTING_EXIT_SPEED: f32 = 0.06;

    /// A ball that falls past this y is lost and cleared
    pub const BALL_LOST_Y: f32 = 1.5;

    /// Trajectory preview stops once the probe leaves the board by this margin
    pub const PLAY_AREA_MARGIN: f32 = 0.25;

    /// Radius of the area-light power effect
    pub const AREA_LIGHT_RADIUS: f32 = 0.2;

    /// Turns an activated power stays alive; it is removed once the
    /// counter decays past zero
    pub const POWER_TURNS: i32 = 1;

    /// Vertical offset applied to level geometry on load (clears the cannon)
    pub const LEVEL_Y_OFFSET: f32 = 0.05;
    /// Blue pegs promoted to power-granting green pegs per level load
    pub const GREEN_PEGS_PER_LEVEL: usize = 2;

    /// Ball defaults
    pub const BALL_SIZE: f32 = 0.04;
    pub const BALL_DENSITY: f32 = 1.0;
    pub const BALL_RESTITUTION: f32 = 0.3;
    pub const BALL_LAUNCH_SPEED: f32 = 1.2;
    pub const BALLS_PER_LEVEL: u32 = 10;

    /// Cannon pose: pivot near the top center, rest rotation pointing
    /// straight down (+y), aim clamped to a cone around that.
    pub const CANNON_POSITION: Vec2 = Vec2::new(0.5, 0.06);
    pub const CANNON_ROTATION: f32 = std::f32::consts::FRAC_PI_2;
    pub const CANNON_MIN_ANGLE: f32 = -1.3;
    pub const CANNON_MAX_ANGLE: f32 = 1.3;

    /// Trajectory preview tuning
    pub const TRAJECTORY_MAX_COLLISIONS: usize = 1;
    pub const TRAJECTORY_DOT_SIZE: f32 = 0.04;
    /// Hard cap on preview steps so a shallow shot still terminates
    pub const TRAJECTORY_MAX_STEPS: usize = 600;

    /// Bucket: the oscillating capture target at the bottom
    pub const BUCKET_SIZE: Vec2 = Vec2::new(0.16, 0.05);
    pub const BUCKET_CENTER: Vec2 = Vec2::new(0.5, 0.96);
    pub const BUCKET_AMPLITUDE: Vec2 = Vec2::new(0.35, 0.0);
    pub const BUCKET_ANGULAR_FREQUENCY: f32 = 0.8;

    /// Clear protocol: delay before a faded peg is re-checked, and the
    /// opacity it holds while the ball settles past it.
    pub const PEG_FADE_DELAY: f32 = 0.5;
    pub const PEG_FADE_OPACITY: f32 = 0.6;
}

/// Normalize an angle to (-π, π]
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    angle
}
