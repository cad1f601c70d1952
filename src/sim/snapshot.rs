//! Read-only view of the session for rendering, audio and UI
//!
//! Taken between ticks; nothing here feeds back into the simulation.

use serde::{Deserialize, Serialize};

use super::orb::Orb;
use super::state::{GameState, Outcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub tier: usize,
    pub settled: bool,
    pub just_merged: bool,
    pub in_danger_zone: bool,
}

impl From<&Orb> for OrbView {
    fn from(orb: &Orb) -> Self {
        Self {
            id: orb.id.0,
            x: orb.pos.x,
            y: orb.pos.y,
            radius: orb.radius,
            tier: orb.tier,
            settled: orb.settled,
            just_merged: orb.just_merged(),
            in_danger_zone: orb.in_danger_zone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboView {
    pub count: u32,
    pub multiplier: u32,
    /// Remaining combo timer, 1.0 right after a merge
    pub timer_fraction: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub orbs: Vec<OrbView>,
    pub preview: Option<OrbView>,
    pub next_tier: usize,
    pub score: u64,
    pub combo: ComboView,
    /// Game-over countdown, 0..=1
    pub game_over_progress: f32,
    pub danger_line: f32,
    pub outcome: Outcome,
    pub anomalies: u32,
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.time_ticks,
            orbs: self
                .orbs
                .iter()
                .filter(|o| o.is_physical())
                .map(OrbView::from)
                .collect(),
            preview: self.preview.as_ref().map(OrbView::from),
            next_tier: self.next_tier,
            score: self.score,
            combo: ComboView {
                count: self.combo.count,
                multiplier: self.combo.multiplier,
                timer_fraction: self.combo.timer_fraction(),
            },
            game_over_progress: self.danger.progress(),
            danger_line: self.tuning.container.danger_line(),
            outcome: self.outcome,
            anomalies: self.anomalies,
        }
    }
}
