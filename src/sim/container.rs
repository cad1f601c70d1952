//! Container geometry
//!
//! An axis-aligned box open at the top. Screen coordinates: y grows downward,
//! so the floor is at `y + height` and the danger line sits just below `y`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The box orbs fall into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Container {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Distance from the container top down to the danger line
    pub danger_offset: f32,
}

impl Default for Container {
    fn default() -> Self {
        Self {
            x: CONTAINER_X,
            y: CONTAINER_Y,
            width: CONTAINER_WIDTH,
            height: CONTAINER_HEIGHT,
            danger_offset: DANGER_LINE_OFFSET,
        }
    }
}

impl Container {
    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn floor(&self) -> f32 {
        self.y + self.height
    }

    /// Y coordinate of the game-over threshold
    #[inline]
    pub fn danger_line(&self) -> f32 {
        self.y + self.danger_offset
    }

    /// Clamp an x coordinate so a circle of `radius` sits fully between the walls
    pub fn clamp_x(&self, x: f32, radius: f32) -> f32 {
        let lo = self.left() + radius;
        let hi = self.right() - radius;
        if lo > hi {
            // Wider than the box; center it
            return self.x + self.width / 2.0;
        }
        x.clamp(lo, hi)
    }

    /// True if a center point lies beyond the walls or floor by more than `margin`
    pub fn escaped(&self, pos: Vec2, margin: f32) -> bool {
        pos.x < self.left() - margin || pos.x > self.right() + margin || pos.y > self.floor() + margin
    }

    /// Pull a circle back inside the walls and above the floor
    pub fn restore(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(self.clamp_x(pos.x, radius), pos.y.min(self.floor() - radius))
    }
}
