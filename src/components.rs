//! Per-behavior component records
//!
//! One record per behavioral concern, attached to entities through the
//! store. Systems communicate their effect to the outside world exclusively
//! by mutating `RenderComponent` - it is the engine's only output channel.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_ENTITY_SIZE;
use crate::ecs::Entity;
use crate::physics::{PhysicsBody, Shape};
use crate::timer::TimerId;

/// Owns the canonical rigid body for an entity. The physics world's body
/// list is rebuilt from these every tick and written back after stepping.
#[derive(Debug, Clone)]
pub struct PhysicsComponent {
    pub body: PhysicsBody,
}

impl PhysicsComponent {
    pub fn new(body: PhysicsBody) -> Self {
        Self { body }
    }
}

/// Cannon pose and the current aim target
#[derive(Debug, Clone)]
pub struct AimComponent {
    /// Pivot position of the cannon
    pub position: Vec2,
    /// Rest rotation; angle limits are relative to this
    pub rotation: f32,
    pub min_angle: f32,
    pub max_angle: f32,
    /// Where the player is currently dragging, if anywhere
    pub target: Option<Vec2>,
    /// Unit launch velocity derived from the clamped target
    pub velocity: Vec2,
}

impl AimComponent {
    pub fn new(position: Vec2, rotation: f32, min_angle: f32, max_angle: f32) -> Self {
        Self {
            position,
            rotation,
            min_angle,
            max_angle,
            target: None,
            velocity: Vec2::ZERO,
        }
    }
}

/// Sinusoidal motion: position(t) = center + amplitude * cos(w*t + phase)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscillateComponent {
    pub amplitude: Vec2,
    pub center: Vec2,
    pub angular_frequency: f32,
    pub phase: f32,
    /// Accumulated time since the oscillation started
    pub elapsed: f32,
}

impl OscillateComponent {
    pub fn new(center: Vec2, amplitude: Vec2, angular_frequency: f32, phase: f32) -> Self {
        Self {
            amplitude,
            center,
            angular_frequency,
            phase,
            elapsed: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.center
            + self.amplitude * (self.angular_frequency * self.elapsed + self.phase).cos()
    }
}

/// The two power variants green pegs can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerKind {
    /// Lights every unlit peg within a radius of the triggering body
    AreaLight,
    /// Lets the ball skip bucket capture once, on its last turn
    PassThrough,
}

/// A time-limited special effect, activated on collision and decremented
/// once per clear-protocol pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerComponent {
    pub kind: PowerKind,
    pub activated: bool,
    /// Signed so a decrement past zero marks the power for removal
    pub turns_remaining: i32,
}

impl PowerComponent {
    pub fn new(kind: PowerKind, turns_remaining: i32) -> Self {
        Self {
            kind,
            activated: false,
            turns_remaining,
        }
    }
}

/// Peg colors. Orange pegs are the objective, green grant powers, purple
/// is the per-level rare bonus peg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PegColor {
    Blue,
    Orange,
    Green,
    Purple,
}

impl PegColor {
    /// Base score is a pure function of color
    pub fn base_score(self) -> u32 {
        match self {
            PegColor::Blue => 10,
            PegColor::Orange => 100,
            PegColor::Green => 50,
            PegColor::Purple => 500,
        }
    }

    /// Image name stem used to derive render images
    pub fn image_stem(self) -> &'static str {
        match self {
            PegColor::Blue => "peg-blue",
            PegColor::Orange => "peg-orange",
            PegColor::Green => "peg-green",
            PegColor::Purple => "peg-purple",
        }
    }
}

/// Scoring multiplier from the count of not-yet-scored orange pegs
pub fn multiplier_for_orange_count(remaining: usize) -> u32 {
    match remaining {
        0 => 100,
        1..=3 => 10,
        4..=7 => 5,
        8..=10 => 3,
        11..=15 => 2,
        _ => 1,
    }
}

/// Scoring state for a peg
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub color: PegColor,
    pub multiplier: u32,
    pub has_scored: bool,
}

impl ScoreComponent {
    pub fn new(color: PegColor) -> Self {
        Self {
            color,
            multiplier: 1,
            has_scored: false,
        }
    }

    pub fn score_value(&self) -> u64 {
        self.color.base_score() as u64 * self.multiplier as u64
    }
}

/// Ball-removal sequencing state
#[derive(Debug, Clone)]
pub struct ClearComponent {
    /// Speed factor: the clear timer fires every 1/speed seconds
    pub speed: f32,
    /// Pending clear timer, armed only while the ball rests
    pub timer: Option<TimerId>,
    /// Set when the ball enters the bucket
    pub will_clear: bool,
}

impl ClearComponent {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            timer: None,
            will_clear: false,
        }
    }
}

/// Glow state. Other systems branch on `lit`: lit entities are removed
/// when a ball clears, and the clear timer removes lit pegs outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightComponent {
    pub lit: bool,
    pub image: String,
}

impl LightComponent {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            lit: false,
            image: image.into(),
        }
    }
}

/// Predicted flight path preview for the aimed shot
#[derive(Debug, Clone)]
pub struct TrajectoryComponent {
    /// Most recently predicted path
    pub points: Vec<Vec2>,
    /// Shape and size of the simulated projectile
    pub shape: Shape,
    pub size: Vec2,
    /// Stop predicting after this many collision events
    pub max_collisions: usize,
    /// Entities currently rendering the preview dots
    pub point_entities: Vec<Entity>,
}

impl TrajectoryComponent {
    pub fn new(shape: Shape, size: Vec2, max_collisions: usize) -> Self {
        Self {
            points: Vec::new(),
            shape,
            size,
            max_collisions,
            point_entities: Vec::new(),
        }
    }
}

/// Bitset of visual states a render component can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VisualState(u8);

impl VisualState {
    pub const NONE: VisualState = VisualState(0);
    pub const LIT: VisualState = VisualState(1);
    pub const LOADED: VisualState = VisualState(1 << 1);

    #[inline]
    pub fn contains(self, other: VisualState) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, flag: VisualState, on: bool) {
        if on {
            self.0 |= flag.0;
        } else {
            self.0 &= !flag.0;
        }
    }
}

impl std::ops::BitOr for VisualState {
    type Output = VisualState;

    fn bitor(self, rhs: VisualState) -> VisualState {
        VisualState(self.0 | rhs.0)
    }
}

/// Hint to the renderer about how a property change should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionHint {
    #[default]
    None,
    Fade,
}

/// The engine's only output channel: everything the surrounding
/// application can see about an entity lives here
#[derive(Debug, Clone)]
pub struct RenderComponent {
    pub position: Vec2,
    pub rotation: f32,
    size: Vec2,
    pub state: VisualState,
    /// Visual-state bitset to image identifier
    pub images: HashMap<VisualState, String>,
    /// Resolved from `state` and `images` by the render system
    pub image: String,
    pub opacity: f32,
    pub transition: TransitionHint,
    pub z_order: i32,
}

impl RenderComponent {
    pub fn new(position: Vec2, size: Vec2, image: impl Into<String>) -> Self {
        let image = image.into();
        let mut images = HashMap::new();
        images.insert(VisualState::NONE, image.clone());
        Self {
            position,
            rotation: 0.0,
            size: size.max(Vec2::splat(MIN_ENTITY_SIZE)),
            state: VisualState::NONE,
            images,
            image,
            opacity: 1.0,
            transition: TransitionHint::None,
            z_order: 0,
        }
    }

    pub fn with_image_for(mut self, state: VisualState, image: impl Into<String>) -> Self {
        self.images.insert(state, image.into());
        self
    }

    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size.max(Vec2::splat(MIN_ENTITY_SIZE));
    }
}

/// Win/loss outcome once a game ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Ended(GameOutcome),
}

/// Overall game progress, one record per game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateComponent {
    pub initial_orange_count: usize,
    pub orange_remaining: usize,
    pub score: u64,
    pub balls_remaining: u32,
    pub status: GameStatus,
}

impl GameStateComponent {
    pub fn new(initial_orange_count: usize, balls_remaining: u32) -> Self {
        Self {
            initial_orange_count,
            orange_remaining: initial_orange_count,
            score: 0,
            balls_remaining,
            status: GameStatus::Playing,
        }
    }
}

/// Tag: the clear protocol may remove this entity
#[derive(Debug, Clone, Copy)]
pub struct Removable;

/// Tag: the oscillating capture target at the bottom of the board
#[derive(Debug, Clone, Copy)]
pub struct Bucket;
