//! Game state and session-level operations
//!
//! All state that drives the simulation lives here. Orbs are kept in
//! ascending handle order, which is also their insertion order, so every scan
//! over them is deterministic.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::ComboTracker;
use super::game_over::GameOverMonitor;
use super::orb::{Orb, OrbId};
use crate::tuning::Tuning;

/// How the run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Running,
    /// A merge produced the terminal tier
    Won,
    /// An orb rested above the danger line past the grace period
    Lost,
}

/// Something collaborators may want to react to (sound, effects, UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Dropped {
        id: OrbId,
        tier: usize,
        x: f32,
    },
    Merged {
        id: OrbId,
        pos: Vec2,
        from_tier: usize,
        to_tier: usize,
        points: u64,
        combo: u32,
        multiplier: u32,
    },
    ScoreChanged {
        score: u64,
    },
    ComboExpired,
    OutcomeChanged {
        outcome: Outcome,
    },
    /// The escape guard pulled an orb back into the container
    ContainmentRestored {
        id: OrbId,
    },
}

/// Complete session state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    /// Active orbs, sorted by id
    pub orbs: Vec<Orb>,
    /// Orb waiting at the top, following the aim
    pub preview: Option<Orb>,
    /// Tier of the next preview
    pub next_tier: usize,
    pub score: u64,
    /// Requested horizontal drop position
    pub aim_x: f32,
    /// Ticks until another drop is accepted
    pub drop_cooldown: u32,
    /// Ticks until the next preview appears
    pub preview_respawn: Option<u32>,
    pub combo: ComboTracker,
    pub danger: GameOverMonitor,
    pub outcome: Outcome,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Session clock used for the combo window
    pub clock_ms: f64,
    /// Escape guard firings; nonzero means collision handling let an orb slip
    pub anomalies: u32,
    /// Events raised since the current tick began
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a new session with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(Tuning::default(), seed)
    }

    pub fn with_tuning(tuning: Tuning, seed: u64) -> Self {
        let combo = ComboTracker::new(
            tuning.combo_window_ms,
            tuning.combo_timer_ticks,
            tuning.max_combo_multiplier,
        );
        let danger = GameOverMonitor::new(tuning.grace_ticks);
        let container = tuning.container;

        let mut state = Self {
            seed,
            tuning,
            orbs: Vec::new(),
            preview: None,
            next_tier: 0,
            score: 0,
            aim_x: container.x + container.width / 2.0,
            drop_cooldown: 0,
            preview_respawn: None,
            combo,
            danger,
            outcome: Outcome::Running,
            time_ticks: 0,
            clock_ms: 0.0,
            anomalies: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        state.reset_session();
        state
    }

    /// Reinitialize everything for a new run. The RNG stream carries on, so
    /// each reset rolls a fresh opening tier.
    pub fn reset_session(&mut self) {
        self.orbs.clear();
        self.preview = None;
        self.score = 0;
        self.drop_cooldown = 0;
        self.preview_respawn = None;
        self.combo.reset();
        self.danger.reset();
        self.outcome = Outcome::Running;
        self.time_ticks = 0;
        self.clock_ms = 0.0;
        self.anomalies = 0;
        self.events.clear();
        self.next_id = 1;

        let span = self.tuning.opening_tier_span.max(1);
        self.next_tier = self.rng.random_range(0..span);
        self.spawn_preview();

        log::info!("New session (seed {}), first tier {}", self.seed, self.next_tier);
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.outcome == Outcome::Running
    }

    /// Allocate a new orb handle
    pub fn next_entity_id(&mut self) -> OrbId {
        let id = OrbId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert an active orb at rest and return its handle
    pub fn spawn_orb(&mut self, tier: usize, pos: Vec2) -> OrbId {
        let id = self.next_entity_id();
        let radius = self.tuning.catalog.radius(tier);
        self.orbs.push(Orb::new(id, tier, radius, pos));
        id
    }

    pub fn orb(&self, id: OrbId) -> Option<&Orb> {
        self.orbs.iter().find(|o| o.id == id)
    }

    pub fn orb_mut(&mut self, id: OrbId) -> Option<&mut Orb> {
        self.orbs.iter_mut().find(|o| o.id == id)
    }

    /// Move the aim; the preview is clamped to stay inside the walls
    pub fn set_aim_position(&mut self, x: f32) {
        let radius = self
            .preview
            .as_ref()
            .map(|p| p.radius)
            .unwrap_or_else(|| self.tuning.catalog.radius(self.next_tier));
        self.aim_x = self.tuning.container.clamp_x(x, radius);
        if let Some(preview) = &mut self.preview {
            preview.pos.x = self.aim_x;
        }
    }

    /// Release the preview orb. Ignored while on cooldown, without a preview,
    /// or once the run has ended.
    pub fn request_drop(&mut self) -> bool {
        if !self.is_running() || self.drop_cooldown > 0 {
            return false;
        }
        let Some(mut orb) = self.preview.take() else {
            return false;
        };

        orb.id = self.next_entity_id();
        orb.active = true;
        orb.has_cleared_danger_line = false;
        orb.pos.x = self.tuning.container.clamp_x(self.aim_x, orb.radius);
        orb.pos.y = self.tuning.container.y - self.tuning.drop_height;

        log::info!("Dropped tier {} at x={:.1}", orb.tier, orb.pos.x);
        self.events.push(GameEvent::Dropped {
            id: orb.id,
            tier: orb.tier,
            x: orb.pos.x,
        });
        self.orbs.push(orb);

        let span = self.tuning.drop_tier_span(self.score);
        self.next_tier = self.rng.random_range(0..span);
        self.drop_cooldown = self.tuning.drop_cooldown_ticks;
        self.preview_respawn = Some(self.tuning.preview_respawn_ticks);
        true
    }

    /// Show the next tier at the top, unless one is already waiting
    pub fn spawn_preview(&mut self) {
        if !self.is_running() || self.preview.is_some() {
            return;
        }
        let tier = self.next_tier;
        let radius = self.tuning.catalog.radius(tier);
        let container = self.tuning.container;
        let x = container.clamp_x(self.aim_x, radius);
        let y = container.y - self.tuning.preview_height;
        self.preview = Some(Orb::preview(tier, radius, Vec2::new(x, y)));
    }

    /// Move to a terminal outcome and announce it
    pub(crate) fn finish(&mut self, outcome: Outcome) {
        if !self.is_running() {
            return;
        }
        self.outcome = outcome;
        self.preview = None;
        self.events.push(GameEvent::OutcomeChanged { outcome });
        match outcome {
            Outcome::Won => log::info!("Terminal tier reached! Final score: {}", self.score),
            Outcome::Lost => log::info!("Game over! Final score: {}", self.score),
            Outcome::Running => {}
        }
    }

    /// Drop orbs consumed by merges
    pub fn cleanup(&mut self) {
        self.orbs.retain(|o| o.alive);
    }

    /// Ensure orbs are sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.orbs.sort_by_key(|o| o.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let state = GameState::new(12345);
        assert!(state.is_running());
        assert!(state.orbs.is_empty());
        assert_eq!(state.score, 0);

        let preview = state.preview.as_ref().expect("preview on start");
        assert!(!preview.active);
        assert!(preview.tier < 3);
        assert_eq!(preview.pos.y, state.tuning.container.y - 30.0);
    }

    #[test]
    fn test_aim_is_clamped() {
        let mut state = GameState::new(1);
        let radius = state.preview.as_ref().unwrap().radius;

        state.set_aim_position(-1000.0);
        assert_eq!(state.aim_x, state.tuning.container.left() + radius);
        assert_eq!(state.preview.as_ref().unwrap().pos.x, state.aim_x);

        state.set_aim_position(5000.0);
        assert_eq!(state.aim_x, state.tuning.container.right() - radius);
    }

    #[test]
    fn test_drop_activates_preview() {
        let mut state = GameState::new(7);
        state.set_aim_position(600.0);
        let tier = state.preview.as_ref().unwrap().tier;

        assert!(state.request_drop());
        assert!(state.preview.is_none());
        assert_eq!(state.orbs.len(), 1);

        let orb = &state.orbs[0];
        assert!(orb.active);
        assert_eq!(orb.tier, tier);
        assert_eq!(orb.id, OrbId(1));
        assert_eq!(orb.pos, Vec2::new(600.0, state.tuning.container.y - 20.0));
        assert!(state.next_tier < 3);
        assert_eq!(state.drop_cooldown, state.tuning.drop_cooldown_ticks);
        assert!(matches!(state.events.last(), Some(GameEvent::Dropped { .. })));
    }

    #[test]
    fn test_drop_ignored_on_cooldown_or_without_preview() {
        let mut state = GameState::new(7);
        assert!(state.request_drop());
        // No preview yet, and on cooldown
        assert!(!state.request_drop());
        assert_eq!(state.orbs.len(), 1);

        state.drop_cooldown = 0;
        assert!(!state.request_drop(), "still no preview");

        state.spawn_preview();
        state.drop_cooldown = 5;
        assert!(!state.request_drop(), "preview but cooling down");
    }

    #[test]
    fn test_drop_ignored_after_outcome() {
        let mut state = GameState::new(7);
        state.finish(Outcome::Lost);
        assert!(!state.request_drop());
        assert!(state.orbs.is_empty());
    }

    #[test]
    fn test_reset_reinitializes() {
        let mut state = GameState::new(3);
        state.request_drop();
        state.score = 500;
        state.combo.register_merge(0.0);
        state.finish(Outcome::Won);

        state.reset_session();
        assert!(state.is_running());
        assert!(state.orbs.is_empty());
        assert_eq!(state.score, 0);
        assert_eq!(state.combo.count, 0);
        assert_eq!(state.danger.counter, 0);
        assert!(state.preview.is_some());
        assert_eq!(state.next_entity_id(), OrbId(1));
    }

    #[test]
    fn test_unvalidated_zero_span_still_drops() {
        let tuning = Tuning {
            max_drop_tier_span: 0,
            ..Default::default()
        };
        let mut state = GameState::with_tuning(tuning, 4);
        assert!(state.request_drop());
        assert_eq!(state.next_tier, 0);
    }

    #[test]
    fn test_same_seed_same_tiers() {
        let mut a = GameState::new(99);
        let mut b = GameState::new(99);
        for _ in 0..10 {
            a.request_drop();
            b.request_drop();
            assert_eq!(a.next_tier, b.next_tier);
            a.drop_cooldown = 0;
            b.drop_cooldown = 0;
            a.spawn_preview();
            b.spawn_preview();
        }
    }
}
