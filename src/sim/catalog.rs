//! Orb tier catalog
//!
//! Ordered list of tiers. Radii grow strictly with the index and the last tier
//! is terminal: it never merges, and producing it wins the run.

use serde::{Deserialize, Serialize};

/// One evolution rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDef {
    pub name: String,
    pub radius: f32,
    /// Points awarded for producing this tier (before the combo multiplier)
    pub score: u64,
}

impl TierDef {
    pub fn new(name: &str, radius: f32, score: u64) -> Self {
        Self {
            name: name.to_string(),
            radius,
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrbCatalog {
    tiers: Vec<TierDef>,
}

impl Default for OrbCatalog {
    fn default() -> Self {
        Self::new(vec![
            TierDef::new("Spark", 32.0, 10),
            TierDef::new("Flame", 43.0, 25),
            TierDef::new("Ember", 53.0, 50),
            TierDef::new("Fireball", 64.0, 100),
            TierDef::new("Blaze", 75.0, 200),
            TierDef::new("Inferno", 85.0, 400),
            TierDef::new("Core Fragment", 96.0, 800),
            TierDef::new("Primal Core", 107.0, 1600),
            TierDef::new("Quantum Essence", 117.0, 3200),
            TierDef::new("Cosmic Nexus", 128.0, 6400),
        ])
    }
}

impl OrbCatalog {
    pub fn new(tiers: Vec<TierDef>) -> Self {
        Self { tiers }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn get(&self, tier: usize) -> Option<&TierDef> {
        self.tiers.get(tier)
    }

    pub fn tiers(&self) -> &[TierDef] {
        &self.tiers
    }

    /// Radius of a tier. Out-of-range tiers clamp to the terminal tier.
    pub fn radius(&self, tier: usize) -> f32 {
        self.clamped(tier).map(|t| t.radius).unwrap_or(0.0)
    }

    /// Base points for producing a tier
    pub fn score(&self, tier: usize) -> u64 {
        self.clamped(tier).map(|t| t.score).unwrap_or(0)
    }

    /// Index of the terminal (winning) tier
    #[inline]
    pub fn terminal(&self) -> usize {
        self.tiers.len().saturating_sub(1)
    }

    #[inline]
    pub fn is_terminal(&self, tier: usize) -> bool {
        tier >= self.terminal()
    }

    /// First tier whose radius does not exceed the previous one, if any
    pub fn first_non_increasing(&self) -> Option<usize> {
        self.tiers
            .windows(2)
            .position(|w| w[1].radius <= w[0].radius)
            .map(|i| i + 1)
    }

    fn clamped(&self, tier: usize) -> Option<&TierDef> {
        self.tiers.get(tier.min(self.terminal()))
    }
}
