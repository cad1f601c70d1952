//! Orb entity and per-tick integration
//!
//! Positions and velocities are in pixels and pixels/tick. Integration is
//! semi-implicit Euler with a fixed step: velocity first, then position.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{WallContact, contain_in_walls};
use crate::tuning::Tuning;

/// Stable handle for an orb. Handles are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrbId(pub u32);

/// A circular game entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orb {
    pub id: OrbId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub tier: usize,
    pub radius: f32,
    /// False once consumed by a merge; removed during cleanup
    pub alive: bool,
    /// False while shown only as the aim preview
    pub active: bool,
    pub settled: bool,
    /// Consecutive slow ticks
    pub settle_ticks: u32,
    /// Ticks left before this orb may merge again
    pub merge_cooldown: u32,
    /// Has rested below the danger line at least once
    pub has_cleared_danger_line: bool,
    /// Top edge above the danger line (display flag)
    pub in_danger_zone: bool,
}

impl Orb {
    pub fn new(id: OrbId, tier: usize, radius: f32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            tier,
            radius,
            alive: true,
            active: true,
            settled: false,
            settle_ticks: 0,
            merge_cooldown: 0,
            has_cleared_danger_line: false,
            in_danger_zone: false,
        }
    }

    /// An inert preview orb that follows the aim position.
    /// It receives a real handle only when dropped.
    pub fn preview(tier: usize, radius: f32, pos: Vec2) -> Self {
        Self {
            active: false,
            // Previews have never fallen, so they cannot be blamed for the line
            has_cleared_danger_line: true,
            ..Self::new(OrbId(0), tier, radius, pos)
        }
    }

    /// Mass scales with area
    #[inline]
    pub fn mass(&self) -> f32 {
        self.radius * self.radius
    }

    /// Orb takes part in collisions and merges
    #[inline]
    pub fn is_physical(&self) -> bool {
        self.alive && self.active
    }

    #[inline]
    pub fn just_merged(&self) -> bool {
        self.merge_cooldown > 0
    }

    /// Y coordinate of the top edge
    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.radius
    }

    /// Advance one tick: gravity, friction, motion and wall containment.
    /// Returns the boundaries touched.
    pub fn integrate(&mut self, tuning: &Tuning) -> WallContact {
        if !self.is_physical() {
            return WallContact::default();
        }

        self.merge_cooldown = self.merge_cooldown.saturating_sub(1);

        self.vel.y += tuning.gravity;
        self.vel *= tuning.friction;
        self.pos += self.vel;

        let line = tuning.container.danger_line();
        if self.top() > line && self.vel.y.abs() < tuning.cleared_line_speed {
            self.has_cleared_danger_line = true;
        }

        contain_in_walls(self, &tuning.container, tuning)
    }

    /// Track how long the orb has been nearly motionless.
    /// Runs once per tick after every collision correction.
    pub fn update_settlement(&mut self, tuning: &Tuning) {
        let slow = self.vel.x.abs() < tuning.settle_speed && self.vel.y.abs() < tuning.settle_speed;
        if slow {
            self.settle_ticks = self.settle_ticks.saturating_add(1);
            if self.settle_ticks > tuning.settle_ticks {
                self.settled = true;
            }
        } else {
            self.settle_ticks = 0;
            self.settled = false;
        }
    }
}
