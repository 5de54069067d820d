//! Inbound level geometry
//!
//! Levels arrive as an ordered collection of placed pegs and blocks in
//! normalized board coordinates. Placement validation rejects overlapping
//! elements using the exact collision predicate the live game runs on, so
//! the editor and the simulation can never disagree about contact.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::PegColor;
use crate::physics::{BodyError, PhysicsBody, Shape, is_colliding};

/// Sinusoidal motion parameters for an oscillating element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscillationSpec {
    pub amplitude: Vec2,
    pub angular_frequency: f32,
    #[serde(default)]
    pub phase: f32,
}

/// A placed peg
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PegSpec {
    pub position: Vec2,
    #[serde(default)]
    pub rotation: f32,
    pub size: Vec2,
    pub color: PegColor,
    #[serde(default)]
    pub oscillation: Option<OscillationSpec>,
}

/// A placed block (a rotated rectangle, no scoring color)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSpec {
    pub position: Vec2,
    #[serde(default)]
    pub rotation: f32,
    pub size: Vec2,
    #[serde(default)]
    pub oscillation: Option<OscillationSpec>,
}

#[derive(Debug, Error)]
pub enum LevelError {
    /// Indices are into the pegs-then-blocks element order
    #[error("level elements {0} and {1} overlap")]
    Overlap(usize, usize),
    #[error("level element {index} is invalid: {source}")]
    InvalidBody { index: usize, source: BodyError },
    #[error("level JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A complete level as authored, before engine instantiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    pub pegs: Vec<PegSpec>,
    pub blocks: Vec<BlockSpec>,
}

impl LevelSpec {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Collision bodies for every element, pegs first then blocks, placed
    /// exactly as authored
    pub fn element_bodies(&self) -> Result<Vec<PhysicsBody>, LevelError> {
        let mut bodies = Vec::with_capacity(self.pegs.len() + self.blocks.len());
        for (index, peg) in self.pegs.iter().enumerate() {
            let body = PhysicsBody::new(Shape::Circle, peg.size, 1.0)
                .map_err(|source| LevelError::InvalidBody { index, source })?
                .with_position(peg.position)
                .with_rotation(peg.rotation)
                .as_static();
            bodies.push(body);
        }
        for (i, block) in self.blocks.iter().enumerate() {
            let index = self.pegs.len() + i;
            let body = PhysicsBody::new(Shape::Rect, block.size, 1.0)
                .map_err(|source| LevelError::InvalidBody { index, source })?
                .with_position(block.position)
                .with_rotation(block.rotation)
                .as_static();
            bodies.push(body);
        }
        Ok(bodies)
    }

    /// Reject any level with geometrically overlapping elements
    pub fn validate(&self) -> Result<(), LevelError> {
        let bodies = self.element_bodies()?;
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                if is_colliding(&bodies[i], &bodies[j]) {
                    return Err(LevelError::Overlap(i, j));
                }
            }
        }
        Ok(())
    }

    /// A small built-in board for the demo driver and tests
    pub fn demo() -> Self {
        let mut pegs = Vec::new();
        // Staggered peg field; oranges sprinkled through the middle rows
        for row in 0..5 {
            let y = 0.3 + row as f32 * 0.12;
            let stagger = if row % 2 == 0 { 0.0 } else { 0.06 };
            for col in 0..6 {
                let x = 0.12 + col as f32 * 0.15 + stagger;
                let color = if (row + col) % 4 == 1 {
                    PegColor::Orange
                } else {
                    PegColor::Blue
                };
                pegs.push(PegSpec {
                    position: Vec2::new(x, y),
                    rotation: 0.0,
                    size: Vec2::splat(0.04),
                    color,
                    oscillation: None,
                });
            }
        }

        let blocks = vec![BlockSpec {
            position: Vec2::new(0.5, 0.2),
            rotation: 0.3,
            size: Vec2::new(0.2, 0.04),
            oscillation: None,
        }];

        Self {
            name: "demo".to_string(),
            pegs,
            blocks,
        }
    }
}
