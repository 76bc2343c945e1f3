//! Per-tick simulation step
//!
//! Advances a round deterministically: directors first, then the player,
//! then every enemy in id order, then combat and hazards.

use glam::Vec2;

use super::ai::{self, PlayerView};
use super::collision::resolve_move;
use super::geometry::Aabb;
use super::state::{RoundState, ShotRequest, Side, Tank};
use super::{bombardment, combat, powerup, safe_zone, waves};
use crate::bearing;

/// Player commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent; each component is clamped to [-1, 1]
    pub movement: Vec2,
    /// Point the player faces
    pub aim: Option<Vec2>,
    /// Fire trigger
    pub fire: bool,
}

/// Advance the round to clock time `now` (ms)
pub fn tick(state: &mut RoundState, input: &TickInput, now: u64) {
    if state.is_over() {
        return;
    }
    state.now = now;
    state.time_ticks += 1;

    waves::update(state, now);
    if state.is_over() {
        return;
    }
    bombardment::update(state, now);
    powerup::update(state, now);

    // Enemies act on where the player stood when the tick began
    let player_view = state.player.is_alive().then_some(PlayerView {
        pos: state.player.pos,
    });

    update_player(state, input, now);
    update_enemies(state, player_view, now);

    combat::advance_projectiles(state);
    combat::resolve_projectile_hits(state);

    bombardment::apply_strikes(state);
    safe_zone::apply(state, now);
    powerup::collect(state, now);

    state.player.clamp_stats();
    for enemy in &mut state.enemies {
        enemy.clamp_stats();
    }
    state.normalize_order();
}

fn update_player(state: &mut RoundState, input: &TickInput, now: u64) {
    if !state.player.is_alive() {
        return;
    }
    let interior = state.arena.interior();
    let blockers: Vec<Aabb> = state.enemies.iter().map(Tank::bounds).collect();
    let player = &mut state.player;

    if let Some(aim) = input.aim {
        if aim != player.pos {
            player.heading = bearing(player.pos, aim);
        }
    }

    let intended = input.movement.clamp(Vec2::splat(-1.0), Vec2::ONE) * state.settings.player_speed;
    resolve_move(
        &mut player.pos,
        player.size,
        intended,
        &state.arena.walls,
        &blockers,
        &interior,
    );

    if input.fire && player.can_fire(now, state.settings.player_shot_delay_ms) {
        let pos = player.take_shot(now);
        let shot = ShotRequest {
            pos,
            heading: player.heading,
            damage: player.damage,
            side: Side::Player,
        };
        state.spawn_shots(&[shot]);
    }
}

/// Decide, move, recover and fire for each enemy in id order
///
/// Blockers are rebuilt per enemy from live positions so a tank that already
/// moved this tick is never overlapped by the next one.
fn update_enemies(state: &mut RoundState, player: Option<PlayerView>, now: u64) {
    let interior = state.arena.interior();
    let mut shots = Vec::new();

    for i in 0..state.enemies.len() {
        let player_hull = state.player.is_alive().then(|| state.player.bounds());
        let blockers: Vec<Aabb> = player_hull
            .into_iter()
            .chain(
                state
                    .enemies
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, e)| e.bounds()),
            )
            .collect();

        let enemy = &mut state.enemies[i];
        let intended = ai::decide(
            enemy,
            player,
            &state.arena,
            &state.settings,
            &mut state.rng,
            now,
        );
        let result = resolve_move(
            &mut enemy.pos,
            enemy.size,
            intended,
            &state.arena.walls,
            &blockers,
            &interior,
        );
        if ai::recover_if_stuck(enemy, intended, &result, &mut state.rng, now) {
            log::debug!("Enemy {} stuck, forcing a turn", enemy.id);
        }
        if let Some(shot) = ai::try_fire(enemy, player, &state.settings, &mut state.rng, now) {
            shots.push(shot);
        }
    }

    state.spawn_shots(&shots);
}
