//! Common spatial components used across entity types.

use serde::{Deserialize, Serialize};

/// 3D position vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Position plus heading, the placement unit passed to the factory.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Heading in radians around the vertical axis.
    pub heading: f32,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            heading: 0.0,
        }
    }
}

/// World-space location of a materialized entity or a generator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub transform: Transform,
}
