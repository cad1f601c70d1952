//! Orb Fusion - a tier-merging orb drop game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, merges, game state)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use sim::{GameEvent, GameState, Outcome, Snapshot, TickInput, tick};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
///
/// All physics values are per-tick quantities (pixels/tick, pixels/tick²) at
/// the nominal 60 Hz frame rate.
pub mod consts {
    /// Nominal frame duration fed to the session clock when the host gives none
    pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;

    /// Container rectangle (screen space, y grows downward)
    pub const CONTAINER_X: f32 = 450.0;
    pub const CONTAINER_Y: f32 = 30.0;
    pub const CONTAINER_WIDTH: f32 = 500.0;
    pub const CONTAINER_HEIGHT: f32 = 500.0;
    /// Danger line sits this far below the container top
    pub const DANGER_LINE_OFFSET: f32 = 20.0;

    /// Integration
    pub const GRAVITY: f32 = 0.3;
    pub const FRICTION: f32 = 0.99;

    /// Wall containment
    pub const WALL_BOUNCE: f32 = 0.6;
    pub const FLOOR_BOUNCE: f32 = 0.3;
    pub const GROUND_FRICTION: f32 = 0.8;
    /// Escape guard tolerance beyond the walls/floor
    pub const ESCAPE_MARGIN: f32 = 5.0;

    /// Settlement
    pub const SETTLE_SPEED: f32 = 0.4;
    pub const SETTLE_TICKS: u32 = 15;

    /// Orb-orb collision
    pub const COLLISION_SLACK: f32 = 1.05;
    pub const SEPARATION_SOFTENING: f32 = 0.8;
    pub const RESTITUTION: f32 = 0.2;
    pub const IMPULSE_DAMPING: f32 = 0.6;
    pub const MAX_SPEED: f32 = 8.0;
    pub const JITTER: f32 = 0.02;
    /// Overlap relaxation sweeps after the collision pass
    pub const RELAXATION_PASSES: u32 = 16;
    /// Sweeps stop once none removes more overlap than this (pixels)
    pub const RELAXATION_TOLERANCE: f32 = 0.01;

    /// Merging
    pub const MERGE_SLACK: f32 = 1.1;
    /// Roughly 100ms at 60 Hz
    pub const MERGE_COOLDOWN_TICKS: u32 = 6;
    pub const MERGE_POP_VY: f32 = -1.0;

    /// Combo
    pub const COMBO_WINDOW_MS: f32 = 3000.0;
    pub const COMBO_TIMER_TICKS: u32 = 180;
    pub const MAX_COMBO_MULTIPLIER: u32 = 5;

    /// Game over
    pub const DANGER_SPEED: f32 = 1.5;
    pub const GAME_OVER_GRACE_TICKS: u32 = 60;
    /// Orbs below the line slower than this count as having cleared it
    pub const CLEARED_LINE_SPEED: f32 = 3.0;

    /// Dropping
    pub const DROP_COOLDOWN_TICKS: u32 = 30;
    /// Roughly 500ms at 60 Hz
    pub const PREVIEW_RESPAWN_TICKS: u32 = 30;
    pub const PREVIEW_HEIGHT: f32 = 30.0;
    pub const DROP_HEIGHT: f32 = 20.0;
    /// Tiers rolled for the very first preview
    pub const OPENING_TIER_SPAN: usize = 3;
    /// Rolled tiers widen by one every this many points, up to the cap
    pub const SCORE_PER_TIER_UNLOCK: u64 = 400;
    pub const MAX_DROP_TIER_SPAN: usize = 5;
}

/// Clamp a vector component-wise to `[-limit, limit]`
#[inline]
pub fn clamp_components(v: Vec2, limit: f32) -> Vec2 {
    v.clamp(Vec2::splat(-limit), Vec2::splat(limit))
}
