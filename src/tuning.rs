//! Data-driven game balance
//!
//! Every tuned constant the simulation reads lives here. Defaults come from
//! [`crate::consts`]; a JSON document may override any subset of keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{Container, OrbCatalog};

/// Physics and gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub catalog: OrbCatalog,
    pub container: Container,

    // === Integration ===
    pub gravity: f32,
    pub friction: f32,

    // === Walls ===
    pub wall_bounce: f32,
    pub floor_bounce: f32,
    pub ground_friction: f32,
    pub escape_margin: f32,

    // === Settlement ===
    pub settle_speed: f32,
    pub settle_ticks: u32,

    // === Orb collisions ===
    /// Contact is evaluated below `(r1 + r2) * collision_slack`
    pub collision_slack: f32,
    pub separation_softening: f32,
    pub restitution: f32,
    pub impulse_damping: f32,
    /// Per-axis velocity cap after an impulse
    pub max_speed: f32,
    pub jitter: f32,
    pub relaxation_passes: u32,
    pub relaxation_tolerance: f32,

    // === Merging ===
    /// Same-tier orbs merge below `(r1 + r2) * merge_slack`
    pub merge_slack: f32,
    pub merge_cooldown_ticks: u32,
    pub merge_pop_vy: f32,

    // === Combo ===
    pub combo_window_ms: f32,
    pub combo_timer_ticks: u32,
    pub max_combo_multiplier: u32,

    // === Game over ===
    pub danger_speed: f32,
    pub grace_ticks: u32,
    pub cleared_line_speed: f32,

    // === Dropping ===
    pub drop_cooldown_ticks: u32,
    pub preview_respawn_ticks: u32,
    pub preview_height: f32,
    pub drop_height: f32,
    pub opening_tier_span: usize,
    pub score_per_tier_unlock: u64,
    pub max_drop_tier_span: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            catalog: OrbCatalog::default(),
            container: Container::default(),

            gravity: GRAVITY,
            friction: FRICTION,

            wall_bounce: WALL_BOUNCE,
            floor_bounce: FLOOR_BOUNCE,
            ground_friction: GROUND_FRICTION,
            escape_margin: ESCAPE_MARGIN,

            settle_speed: SETTLE_SPEED,
            settle_ticks: SETTLE_TICKS,

            collision_slack: COLLISION_SLACK,
            separation_softening: SEPARATION_SOFTENING,
            restitution: RESTITUTION,
            impulse_damping: IMPULSE_DAMPING,
            max_speed: MAX_SPEED,
            jitter: JITTER,
            relaxation_passes: RELAXATION_PASSES,
            relaxation_tolerance: RELAXATION_TOLERANCE,

            merge_slack: MERGE_SLACK,
            merge_cooldown_ticks: MERGE_COOLDOWN_TICKS,
            merge_pop_vy: MERGE_POP_VY,

            combo_window_ms: COMBO_WINDOW_MS,
            combo_timer_ticks: COMBO_TIMER_TICKS,
            max_combo_multiplier: MAX_COMBO_MULTIPLIER,

            danger_speed: DANGER_SPEED,
            grace_ticks: GAME_OVER_GRACE_TICKS,
            cleared_line_speed: CLEARED_LINE_SPEED,

            drop_cooldown_ticks: DROP_COOLDOWN_TICKS,
            preview_respawn_ticks: PREVIEW_RESPAWN_TICKS,
            preview_height: PREVIEW_HEIGHT,
            drop_height: DROP_HEIGHT,
            opening_tier_span: OPENING_TIER_SPAN,
            score_per_tier_unlock: SCORE_PER_TIER_UNLOCK,
            max_drop_tier_span: MAX_DROP_TIER_SPAN,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json).map_err(TuningError::Parse)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning: {} tiers, container {}x{}",
            tuning.catalog.len(),
            tuning.container.width,
            tuning.container.height
        );
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        serde_json::to_string_pretty(self).map_err(TuningError::Parse)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.catalog.is_empty() {
            return Err(TuningError::EmptyCatalog);
        }
        if let Some(tier) = self.catalog.first_non_increasing() {
            return Err(TuningError::RadiiNotIncreasing { tier });
        }
        if let Some(tier) = self.catalog.tiers().iter().find(|t| t.radius <= 0.0) {
            return Err(TuningError::OutOfRange {
                name: "catalog.radius",
                value: tier.radius,
            });
        }

        // The smallest orb must fit between the walls
        let smallest = self.catalog.radius(0);
        if self.container.width < smallest * 2.0 || self.container.height < smallest * 2.0 {
            return Err(TuningError::ContainerTooSmall);
        }

        let unit_ranges: [(&'static str, f32); 6] = [
            ("friction", self.friction),
            ("wall_bounce", self.wall_bounce),
            ("floor_bounce", self.floor_bounce),
            ("ground_friction", self.ground_friction),
            ("restitution", self.restitution),
            ("impulse_damping", self.impulse_damping),
        ];
        for (name, value) in unit_ranges {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::OutOfRange { name, value });
            }
        }

        if self.collision_slack < 1.0 {
            return Err(TuningError::OutOfRange {
                name: "collision_slack",
                value: self.collision_slack,
            });
        }
        if self.merge_slack < 1.0 {
            return Err(TuningError::OutOfRange {
                name: "merge_slack",
                value: self.merge_slack,
            });
        }
        if self.relaxation_passes == 0 {
            return Err(TuningError::OutOfRange {
                name: "relaxation_passes",
                value: 0.0,
            });
        }
        if self.max_combo_multiplier == 0 {
            return Err(TuningError::OutOfRange {
                name: "max_combo_multiplier",
                value: 0.0,
            });
        }
        if self.opening_tier_span == 0 || self.max_drop_tier_span == 0 {
            return Err(TuningError::OutOfRange {
                name: "tier_span",
                value: 0.0,
            });
        }

        Ok(())
    }

    /// Upper bound (exclusive) of tiers rolled for the next drop at a given score.
    /// Never below 1, so a roll over `0..span` always has a tier to pick.
    pub fn drop_tier_span(&self, score: u64) -> usize {
        let unlock = self.score_per_tier_unlock.max(1);
        let span = (score / unlock) as usize + self.opening_tier_span;
        span.max(self.opening_tier_span)
            .min(self.max_drop_tier_span)
            .min(self.catalog.terminal())
            .max(1)
    }
}

/// Why a tuning document was rejected
#[derive(Debug)]
pub enum TuningError {
    /// JSON could not be parsed or written
    Parse(serde_json::Error),
    EmptyCatalog,
    /// Tier radius does not exceed the tier before it
    RadiiNotIncreasing { tier: usize },
    /// Smallest orb does not fit in the container
    ContainerTooSmall,
    OutOfRange { name: &'static str, value: f32 },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid tuning json: {err}"),
            Self::EmptyCatalog => write!(f, "orb catalog has no tiers"),
            Self::RadiiNotIncreasing { tier } => {
                write!(f, "tier {tier} radius must exceed the previous tier")
            }
            Self::ContainerTooSmall => write!(f, "container cannot fit the smallest orb"),
            Self::OutOfRange { name, value } => write!(f, "{name} out of range: {value}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}
