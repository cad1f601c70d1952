//! Collision detection and response for orbs
//!
//! Two halves: orb-orb contact (soft positional correction plus a damped,
//! mass-weighted impulse) and containment against the container walls.

use glam::Vec2;
use rand::Rng;

use super::container::Container;
use super::orb::Orb;
use crate::clamp_components;
use crate::tuning::Tuning;

/// Result of a contact check between two orbs
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the pair is close enough to resolve
    pub hit: bool,
    /// Unit normal pointing from the second orb toward the first
    pub normal: Vec2,
    /// Center distance
    pub distance: f32,
    /// Sum of radii
    pub min_distance: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            distance: 0.0,
            min_distance: 0.0,
        }
    }

    /// Positive when the orbs overlap
    #[inline]
    pub fn penetration(&self) -> f32 {
        self.min_distance - self.distance
    }
}

/// Check contact between two orbs
///
/// Contact is reported a little before the circles actually touch
/// (`min_distance * slack`) so discrete ticks still catch fast approaches.
pub fn orb_contact(a: &Orb, b: &Orb, slack: f32) -> CollisionResult {
    let delta = a.pos - b.pos;
    let distance = delta.length();
    let min_distance = a.radius + b.radius;

    if distance >= min_distance * slack {
        return CollisionResult::miss();
    }

    // Coincident centers have no direction; pick one so the pair can separate
    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec2::X
    };

    CollisionResult {
        hit: true,
        normal,
        distance,
        min_distance,
    }
}

/// Separate and bounce a pair of orbs. Returns true if they were in contact.
pub fn resolve_orb_pair<R: Rng + ?Sized>(
    a: &mut Orb,
    b: &mut Orb,
    tuning: &Tuning,
    rng: &mut R,
) -> bool {
    let contact = orb_contact(a, b, tuning.collision_slack);
    if !contact.hit {
        return false;
    }

    let normal = contact.normal;
    let mass_a = a.mass();
    let mass_b = b.mass();
    let total_mass = mass_a + mass_b;

    // Positional correction: the heavier orb moves less
    let overlap = contact.penetration();
    if overlap > 0.0 {
        let push_a = overlap * (mass_b / total_mass) * tuning.separation_softening;
        let push_b = overlap * (mass_a / total_mass) * tuning.separation_softening;
        a.pos += normal * push_a;
        b.pos -= normal * push_b;

        // One corrective half-step along the updated separation
        let delta = a.pos - b.pos;
        let distance = delta.length();
        if distance < contact.min_distance && distance > f32::EPSILON {
            let extra = (contact.min_distance - distance) * 0.5;
            let n = delta / distance;
            a.pos += n * extra;
            b.pos -= n * extra;
        }
    }

    // Impulse only when approaching along the normal
    let relative_speed = (a.vel - b.vel).dot(normal);
    if relative_speed > 0.0 {
        return true;
    }

    let impulse = -(1.0 + tuning.restitution) * relative_speed;
    let per_mass = impulse / total_mass;
    let impulse_a = per_mass * mass_b * tuning.impulse_damping;
    let impulse_b = per_mass * mass_a * tuning.impulse_damping;

    a.vel = clamp_components(a.vel + normal * impulse_a, tuning.max_speed);
    b.vel = clamp_components(b.vel - normal * impulse_b, tuning.max_speed);

    // Break perfectly symmetric stacks
    a.vel.x += (rng.random::<f32>() - 0.5) * tuning.jitter;
    b.vel.x += (rng.random::<f32>() - 0.5) * tuning.jitter;

    true
}

/// Resolve one orb against every other physical orb in the slice
pub fn resolve_against_all<R: Rng + ?Sized>(
    orbs: &mut [Orb],
    index: usize,
    tuning: &Tuning,
    rng: &mut R,
) -> u32 {
    let mut contacts = 0;
    for other in 0..orbs.len() {
        if other == index {
            continue;
        }
        let (a, b) = pair_mut(orbs, index, other);
        if !a.is_physical() || !b.is_physical() {
            continue;
        }
        if resolve_orb_pair(a, b, tuning, rng) {
            contacts += 1;
        }
    }
    contacts
}

/// Borrow two distinct elements mutably
pub fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert!(i != j, "pair_mut needs distinct indices");
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

/// Which container boundaries an orb touched this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContact {
    pub left: bool,
    pub right: bool,
    pub floor: bool,
}

impl WallContact {
    pub fn union(self, other: WallContact) -> WallContact {
        WallContact {
            left: self.left || other.left,
            right: self.right || other.right,
            floor: self.floor || other.floor,
        }
    }

    /// True if moving by `push` would drive the orb into a boundary it touched
    pub fn blocks(&self, push: Vec2) -> bool {
        (self.left && push.x < 0.0) || (self.right && push.x > 0.0) || (self.floor && push.y > 0.0)
    }
}

/// Push two overlapping orbs exactly apart, leaving velocities alone
///
/// The overlap is split by mass. An orb pinned against a boundary in the push
/// direction does not move and the other orb takes the whole correction.
/// Returns the overlap removed.
pub fn separate_pair(a: &mut Orb, b: &mut Orb, a_walls: WallContact, b_walls: WallContact) -> f32 {
    let delta = a.pos - b.pos;
    let distance = delta.length();
    let overlap = a.radius + b.radius - distance;
    if overlap <= 0.0 {
        return 0.0;
    }

    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec2::X
    };

    let total_mass = a.mass() + b.mass();
    let (share_a, share_b) = match (a_walls.blocks(normal), b_walls.blocks(-normal)) {
        (true, false) => (0.0, 1.0),
        (false, true) => (1.0, 0.0),
        _ => (b.mass() / total_mass, a.mass() / total_mass),
    };

    a.pos += normal * overlap * share_a;
    b.pos -= normal * overlap * share_b;
    overlap
}

/// Relax remaining overlaps over every unordered pair, re-containing orbs
/// after each sweep.
///
/// `pinned` holds the boundaries each orb has touched this tick. It grows as
/// sweeps clamp orbs and as orbs come to rest against pinned neighbours. Stops early once no sweep removes more than
/// `tolerance`. Returns the largest overlap removed by the last sweep.
pub fn relax_overlaps(orbs: &mut [Orb], pinned: &mut [WallContact], tuning: &Tuning) -> f32 {
    let container = tuning.container;
    let mut worst = 0.0f32;

    for _ in 0..tuning.relaxation_passes {
        worst = 0.0;
        for i in 0..orbs.len() {
            for j in (i + 1)..orbs.len() {
                let (a, b) = pair_mut(orbs, i, j);
                if !a.is_physical() || !b.is_physical() {
                    continue;
                }
                let removed = separate_pair(a, b, pinned[i], pinned[j]);
                if removed <= 0.0 {
                    continue;
                }
                worst = worst.max(removed);

                // An orb resting on a pinned neighbour is held by the same boundaries
                let normal = (a.pos - b.pos).normalize_or_zero();
                let a_held = pinned[i].blocks(normal);
                let b_held = pinned[j].blocks(-normal);
                if a_held && !b_held {
                    pinned[j] = pinned[j].union(pinned[i]);
                } else if b_held && !a_held {
                    pinned[i] = pinned[i].union(pinned[j]);
                }
            }
        }

        for (orb, walls) in orbs.iter_mut().zip(pinned.iter_mut()) {
            if orb.is_physical() {
                *walls = walls.union(contain_in_walls(orb, &container, tuning));
            }
        }

        if worst <= tuning.relaxation_tolerance {
            break;
        }
    }

    worst
}

/// Clamp an orb inside the side walls and above the floor
///
/// Side walls reflect the outward velocity with damping. The floor turns a
/// downward velocity into a small bounce (or zero) and applies ground friction.
pub fn contain_in_walls(orb: &mut Orb, container: &Container, tuning: &Tuning) -> WallContact {
    let mut contact = WallContact::default();

    if orb.pos.x - orb.radius < container.left() {
        orb.pos.x = container.left() + orb.radius;
        orb.vel.x = orb.vel.x.abs() * tuning.wall_bounce;
        contact.left = true;
    }
    if orb.pos.x + orb.radius > container.right() {
        orb.pos.x = container.right() - orb.radius;
        orb.vel.x = -orb.vel.x.abs() * tuning.wall_bounce;
        contact.right = true;
    }
    if orb.pos.y + orb.radius > container.floor() {
        orb.pos.y = container.floor() - orb.radius;
        orb.vel.y = (orb.vel.y * -tuning.floor_bounce).min(0.0);
        orb.vel.x *= tuning.ground_friction;
        contact.floor = true;
    }

    contact
}

/// Pull an orb that slipped past the walls back inside
///
/// Returns true if the guard fired. Under correct collision handling it never
/// does, so callers count and log every firing.
pub fn restore_escaped(orb: &mut Orb, container: &Container, margin: f32) -> bool {
    if !container.escaped(orb.pos, margin) {
        return false;
    }
    orb.pos = container.restore(orb.pos, orb.radius);
    orb.vel *= 0.5;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::orb::OrbId;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn orb(id: u32, tier: usize, pos: Vec2) -> Orb {
        let tuning = Tuning::default();
        Orb::new(OrbId(id), tier, tuning.catalog.radius(tier), pos)
    }

    #[test]
    fn test_contact_slack() {
        let a = orb(1, 0, Vec2::new(0.0, 0.0));
        // Just apart but inside the 5% slack
        let b = orb(2, 0, Vec2::new(66.0, 0.0));
        let result = orb_contact(&a, &b, 1.05);
        assert!(result.hit);
        assert!(result.penetration() < 0.0);
        assert!((result.normal - Vec2::new(-1.0, 0.0)).length() < 1e-6);

        let far = orb(3, 0, Vec2::new(70.0, 0.0));
        assert!(!orb_contact(&a, &far, 1.05).hit);
    }

    #[test]
    fn test_overlap_fully_separated() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut a = orb(1, 0, Vec2::new(100.0, 100.0));
        let mut b = orb(2, 1, Vec2::new(140.0, 100.0));

        assert!(resolve_orb_pair(&mut a, &mut b, &tuning, &mut rng));
        let distance = (a.pos - b.pos).length();
        assert!(distance >= (a.radius + b.radius) * 0.999, "distance {distance}");
    }

    #[test]
    fn test_heavier_orb_moves_less() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut small = orb(1, 0, Vec2::new(100.0, 100.0));
        let mut big = orb(2, 5, Vec2::new(200.0, 100.0));

        let small_start = small.pos;
        let big_start = big.pos;
        resolve_orb_pair(&mut small, &mut big, &tuning, &mut rng);

        let small_moved = (small.pos - small_start).length();
        let big_moved = (big.pos - big_start).length();
        assert!(small_moved > big_moved);
    }

    #[test]
    fn test_approaching_pair_loses_energy() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut a = orb(1, 0, Vec2::new(100.0, 100.0));
        let mut b = orb(2, 0, Vec2::new(164.0, 100.0));
        a.vel = Vec2::new(4.0, 0.0);
        b.vel = Vec2::new(-4.0, 0.0);

        let before = a.vel.length_squared() + b.vel.length_squared();
        resolve_orb_pair(&mut a, &mut b, &tuning, &mut rng);
        let after = a.vel.length_squared() + b.vel.length_squared();

        assert!(after < before);
        // Closing speed reduced
        assert!((a.vel.x - b.vel.x) < 8.0);
    }

    #[test]
    fn test_velocity_capped() {
        let tuning = Tuning {
            impulse_damping: 1.0,
            restitution: 1.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(4);
        let mut a = orb(1, 0, Vec2::new(100.0, 100.0));
        let mut b = orb(2, 9, Vec2::new(250.0, 100.0));
        a.vel = Vec2::new(8.0, 0.0);
        b.vel = Vec2::new(-8.0, 0.0);

        resolve_orb_pair(&mut a, &mut b, &tuning, &mut rng);
        let limit = tuning.max_speed + tuning.jitter;
        assert!(a.vel.x.abs() <= limit && b.vel.x.abs() <= limit);
    }

    #[test]
    fn test_separating_pair_keeps_velocity() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut a = orb(1, 0, Vec2::new(100.0, 100.0));
        let mut b = orb(2, 0, Vec2::new(164.0, 100.0));
        a.vel = Vec2::new(-2.0, 0.0);
        b.vel = Vec2::new(2.0, 0.0);

        resolve_orb_pair(&mut a, &mut b, &tuning, &mut rng);
        assert_eq!(a.vel, Vec2::new(-2.0, 0.0));
        assert_eq!(b.vel, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_coincident_centers_separate() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(6);
        let mut a = orb(1, 0, Vec2::new(100.0, 100.0));
        let mut b = orb(2, 0, Vec2::new(100.0, 100.0));

        resolve_orb_pair(&mut a, &mut b, &tuning, &mut rng);
        assert!((a.pos - b.pos).length() > 60.0);
    }

    #[test]
    fn test_resolve_against_all_skips_inactive() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut dead = orb(2, 0, Vec2::new(110.0, 100.0));
        dead.alive = false;
        let mut orbs = vec![orb(1, 0, Vec2::new(100.0, 100.0)), dead];

        assert_eq!(resolve_against_all(&mut orbs, 0, &tuning, &mut rng), 0);
        assert_eq!(orbs[0].pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_pair_mut_order() {
        let mut items = [1, 2, 3];
        let (a, b) = pair_mut(&mut items, 2, 0);
        assert_eq!((*a, *b), (3, 1));
    }

    #[test]
    fn test_side_wall_reflects() {
        let tuning = Tuning::default();
        let c = tuning.container;
        let mut o = orb(1, 0, Vec2::new(c.left() + 10.0, 300.0));
        o.vel = Vec2::new(-5.0, 0.0);

        let contact = contain_in_walls(&mut o, &c, &tuning);
        assert!(contact.left);
        assert_eq!(o.pos.x, c.left() + 32.0);
        assert!((o.vel.x - 3.0).abs() < 1e-6);

        let mut o = orb(2, 0, Vec2::new(c.right() - 10.0, 300.0));
        o.vel = Vec2::new(5.0, 0.0);
        let contact = contain_in_walls(&mut o, &c, &tuning);
        assert!(contact.right);
        assert!((o.vel.x + 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_floor_bounce_and_ground_friction() {
        let tuning = Tuning::default();
        let c = tuning.container;
        let mut o = orb(1, 0, Vec2::new(700.0, c.floor()));
        o.vel = Vec2::new(2.0, 6.0);

        let contact = contain_in_walls(&mut o, &c, &tuning);
        assert!(contact.floor);
        assert_eq!(o.pos.y, c.floor() - 32.0);
        assert!((o.vel.y + 1.8).abs() < 1e-5);
        assert!((o.vel.x - 1.6).abs() < 1e-6);

        // Already moving up: the floor zeroes it instead of bouncing
        let mut o = orb(2, 0, Vec2::new(700.0, c.floor()));
        o.vel = Vec2::new(0.0, -1.0);
        contain_in_walls(&mut o, &c, &tuning);
        assert_eq!(o.vel.y, 0.0);
    }

    #[test]
    fn test_wall_contact_blocks_only_into_the_wall() {
        let walls = WallContact {
            left: true,
            floor: true,
            ..Default::default()
        };
        assert!(walls.blocks(Vec2::new(-1.0, 0.0)));
        assert!(walls.blocks(Vec2::new(0.5, 1.0)));
        assert!(!walls.blocks(Vec2::new(1.0, -1.0)));
        assert!(!WallContact::default().blocks(Vec2::new(-1.0, 1.0)));
    }

    #[test]
    fn test_separate_pair_splits_by_mass() {
        let mut a = orb(1, 0, Vec2::new(100.0, 100.0));
        let mut b = orb(2, 0, Vec2::new(154.0, 100.0));

        let removed = separate_pair(&mut a, &mut b, WallContact::default(), WallContact::default());
        assert!((removed - 10.0).abs() < 1e-4);
        assert!((a.pos.x - 95.0).abs() < 1e-4);
        assert!((b.pos.x - 159.0).abs() < 1e-4);
        assert_eq!(a.vel, Vec2::ZERO);
    }

    #[test]
    fn test_separate_pair_pinned_orb_stays() {
        let tuning = Tuning::default();
        let c = tuning.container;
        let mut wall_orb = orb(1, 0, Vec2::new(c.left() + 32.0, 300.0));
        let mut other = orb(2, 0, Vec2::new(c.left() + 80.0, 300.0));
        let pinned = WallContact {
            left: true,
            ..Default::default()
        };

        separate_pair(&mut wall_orb, &mut other, pinned, WallContact::default());
        assert_eq!(wall_orb.pos.x, c.left() + 32.0);
        assert!((other.pos.x - (c.left() + 96.0)).abs() < 1e-4);
    }

    #[test]
    fn test_relax_overlaps_clears_a_squeezed_row() {
        let tuning = Tuning::default();
        let c = tuning.container;
        let y = c.floor() - 32.0;
        // Five small orbs squeezed together against the left wall
        let mut orbs: Vec<Orb> = (0..5)
            .map(|i| orb(i + 1, 0, Vec2::new(c.left() + 32.0 + i as f32 * 50.0, y)))
            .collect();
        let mut pinned = vec![WallContact::default(); orbs.len()];
        pinned[0].left = true;

        relax_overlaps(&mut orbs, &mut pinned, &tuning);

        for i in 0..orbs.len() {
            assert!(!c.escaped(orbs[i].pos, 0.0));
            for j in (i + 1)..orbs.len() {
                let d = orbs[i].pos.distance(orbs[j].pos);
                assert!(d >= 64.0 * 0.95, "orbs {i} and {j} at {d}");
            }
        }
    }

    #[test]
    fn test_escape_guard() {
        let tuning = Tuning::default();
        let c = tuning.container;
        let mut o = orb(1, 0, Vec2::new(c.right() + 40.0, 300.0));
        o.vel = Vec2::new(4.0, 2.0);

        assert!(restore_escaped(&mut o, &c, tuning.escape_margin));
        assert_eq!(o.pos.x, c.right() - 32.0);
        assert_eq!(o.vel, Vec2::new(2.0, 1.0));

        // Inside: untouched
        assert!(!restore_escaped(&mut o, &c, tuning.escape_margin));
    }
}
