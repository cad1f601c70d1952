//! Merge detection and merge output
//!
//! Pairs are scanned in ascending handle order (outer `i`, inner `j > i`) and
//! the scan stops at the first qualifying pair, so at most one merge resolves
//! per tick. Remaining candidates stay eligible for the next tick.

use glam::Vec2;

use super::catalog::OrbCatalog;
use super::orb::Orb;

/// Indices of the pair chosen for this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePair {
    pub first: usize,
    pub second: usize,
}

/// What a merge produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOutput {
    pub pos: Vec2,
    pub vel: Vec2,
    pub from_tier: usize,
    pub to_tier: usize,
    pub has_cleared_danger_line: bool,
}

/// True if two orbs may merge right now
pub fn can_merge(a: &Orb, b: &Orb, catalog: &OrbCatalog, slack: f32) -> bool {
    if !a.is_physical() || !b.is_physical() {
        return false;
    }
    if a.tier != b.tier || catalog.is_terminal(a.tier) {
        return false;
    }
    if a.just_merged() || b.just_merged() {
        return false;
    }
    let min_distance = a.radius + b.radius;
    a.pos.distance(b.pos) < min_distance * slack
}

/// Find the first qualifying pair in stable order
pub fn find_merge(orbs: &[Orb], catalog: &OrbCatalog, slack: f32) -> Option<MergePair> {
    for (i, a) in orbs.iter().enumerate() {
        if !a.is_physical() {
            continue;
        }
        for (j, b) in orbs.iter().enumerate().skip(i + 1) {
            if can_merge(a, b, catalog, slack) {
                return Some(MergePair { first: i, second: j });
            }
        }
    }
    None
}

/// Compute the product of merging two same-tier orbs
///
/// The product sits at the midpoint with the averaged velocity, except the
/// vertical component is capped at `pop_vy` so the new orb hops upward.
pub fn merge_output(a: &Orb, b: &Orb, pop_vy: f32) -> MergeOutput {
    let avg_vel = (a.vel + b.vel) * 0.5;
    MergeOutput {
        pos: (a.pos + b.pos) * 0.5,
        vel: Vec2::new(avg_vel.x, avg_vel.y.min(pop_vy)),
        from_tier: a.tier,
        to_tier: a.tier + 1,
        has_cleared_danger_line: a.has_cleared_danger_line || b.has_cleared_danger_line,
    }
}
