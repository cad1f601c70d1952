//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session deterministically. One call runs,
//! strictly in order: input, timers, integration with collisions, escape
//! guard, merge, cleanup, combo decay, game-over check, preview respawn.

use super::collision::{WallContact, relax_overlaps, resolve_against_all, restore_escaped};
use super::game_over::DangerState;
use super::merge::{find_merge, merge_output};
use super::state::{GameEvent, GameState, Outcome};
use crate::consts::NOMINAL_FRAME_MS;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Aim position for the preview (pointer x in container space)
    pub aim_x: Option<f32>,
    /// Drop the preview orb (click/tap/space)
    pub drop: bool,
    /// Start a new run
    pub reset: bool,
    /// Wall-clock duration of this frame; the combo window is measured with it
    pub frame_ms: Option<f32>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    if input.reset {
        state.reset_session();
        return;
    }

    // Physics stops once the run is decided
    if !state.is_running() {
        return;
    }

    state.time_ticks += 1;
    state.clock_ms += input.frame_ms.unwrap_or(NOMINAL_FRAME_MS) as f64;
    state.drop_cooldown = state.drop_cooldown.saturating_sub(1);

    if let Some(x) = input.aim_x {
        state.set_aim_position(x);
    }
    if input.drop {
        state.request_drop();
    }

    step_physics(state);
    guard_containment(state);
    flag_danger_zone(state);

    resolve_merge(state);
    state.cleanup();
    state.normalize_order();

    if state.combo.tick() {
        state.events.push(GameEvent::ComboExpired);
    }

    // A winning merge ends the tick
    if !state.is_running() {
        return;
    }

    let line = state.tuning.container.danger_line();
    let speed = state.tuning.danger_speed;
    if state.danger.evaluate(&state.orbs, line, speed) == DangerState::Lost {
        state.finish(Outcome::Lost);
        return;
    }

    respawn_preview(state);
}

/// Integrate each orb, then resolve it against every other orb in the same pass.
/// Overlap left behind by that pass is relaxed over all pairs before
/// settlement is measured.
fn step_physics(state: &mut GameState) {
    let GameState {
        orbs, tuning, rng, ..
    } = state;

    let mut pinned = vec![WallContact::default(); orbs.len()];
    for i in 0..orbs.len() {
        if !orbs[i].is_physical() {
            continue;
        }
        pinned[i] = orbs[i].integrate(tuning);
        resolve_against_all(orbs, i, tuning, rng);
    }

    relax_overlaps(orbs, &mut pinned, tuning);

    for orb in orbs.iter_mut().filter(|o| o.is_physical()) {
        orb.update_settlement(tuning);
    }
}

/// Restore any orb that ended up outside the container
fn guard_containment(state: &mut GameState) {
    let container = state.tuning.container;
    let margin = state.tuning.escape_margin;

    for orb in state.orbs.iter_mut().filter(|o| o.is_physical()) {
        let escaped_at = orb.pos;
        if restore_escaped(orb, &container, margin) {
            state.anomalies += 1;
            log::warn!(
                "Orb {} (tier {}) escaped container at ({:.1}, {:.1}), forced back in",
                orb.id.0,
                orb.tier,
                escaped_at.x,
                escaped_at.y
            );
            state.events.push(GameEvent::ContainmentRestored { id: orb.id });
        }
    }
}

fn flag_danger_zone(state: &mut GameState) {
    let line = state.tuning.container.danger_line();
    for orb in &mut state.orbs {
        orb.in_danger_zone = orb.is_physical() && orb.top() < line;
    }
}

/// Resolve at most one merge
fn resolve_merge(state: &mut GameState) {
    let tuning = &state.tuning;
    let Some(pair) = find_merge(&state.orbs, &tuning.catalog, tuning.merge_slack) else {
        return;
    };

    let output = merge_output(
        &state.orbs[pair.first],
        &state.orbs[pair.second],
        tuning.merge_pop_vy,
    );
    let cooldown = tuning.merge_cooldown_ticks;
    let line = tuning.container.danger_line();
    state.orbs[pair.first].alive = false;
    state.orbs[pair.second].alive = false;

    let id = state.spawn_orb(output.to_tier, output.pos);
    if let Some(product) = state.orb_mut(id) {
        product.vel = output.vel;
        product.merge_cooldown = cooldown;
        product.has_cleared_danger_line = output.has_cleared_danger_line;
        product.in_danger_zone = product.top() < line;
    }

    let multiplier = state.combo.register_merge(state.clock_ms);
    let points = state.tuning.catalog.score(output.to_tier) * multiplier as u64;
    state.score += points;

    let name = |tier: usize| {
        state
            .tuning
            .catalog
            .get(tier)
            .map(|t| t.name.as_str())
            .unwrap_or("?")
    };
    if state.combo.count > 1 {
        log::info!(
            "Merged {} -> {} (+{}) [{}x COMBO]",
            name(output.from_tier),
            name(output.to_tier),
            points,
            state.combo.count
        );
    } else {
        log::info!(
            "Merged {} -> {} (+{})",
            name(output.from_tier),
            name(output.to_tier),
            points
        );
    }

    state.events.push(GameEvent::Merged {
        id,
        pos: output.pos,
        from_tier: output.from_tier,
        to_tier: output.to_tier,
        points,
        combo: state.combo.count,
        multiplier,
    });
    state.events.push(GameEvent::ScoreChanged { score: state.score });

    if state.tuning.catalog.is_terminal(output.to_tier) {
        state.finish(Outcome::Won);
    }
}

fn respawn_preview(state: &mut GameState) {
    match state.preview_respawn {
        Some(ticks) if ticks > 1 => state.preview_respawn = Some(ticks - 1),
        Some(_) => {
            state.preview_respawn = None;
            state.spawn_preview();
        }
        None => {}
    }
}
