//! Enemy decision making
//!
//! Each enemy is a two-state machine: `Roaming` wanders with randomized
//! turns and steers away from predicted wall hits, `Chasing` points straight
//! at the player every tick. Once an enemy starts chasing it never stops.
//!
//! A tick runs in three steps per enemy: `decide` (heading and intended
//! displacement, from start-of-tick information only), movement through the
//! resolver, then `recover_if_stuck` and `try_fire`.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use super::arena::Arena;
use super::collision::MoveResult;
use super::state::{BrainState, ShotRequest, Side, Tank, TankKind};
use crate::consts::LOOKAHEAD_FACTOR;
use crate::{Settings, angle_diff, bearing, heading_vector, normalize_angle};

/// Turn range when the re-aim timer fires (degrees)
const ROAM_TURN_DEG: f32 = 90.0;
/// Turn range when the lookahead point predicts a hit (degrees)
const AVOID_TURN_DEG: f32 = 110.0;
/// Forced turns out of a dead end (degrees)
const STUCK_TURNS_DEG: [f32; 7] = [110.0, -110.0, 135.0, -135.0, 160.0, -160.0, 180.0];

/// Re-aim delays (ms)
const ROAM_REAIM_MS: (u64, u64) = (1_500, 4_000);
const AVOID_REAIM_MS: (u64, u64) = (300, 800);
const STUCK_REAIM_MS: (u64, u64) = (100, 400);
/// Timers of a freshly spawned enemy (ms)
pub(super) const SPAWN_REAIM_MS: (u64, u64) = (500, 1_500);
pub(super) const SPAWN_FIRE_READY_MS: (u64, u64) = (1_000, 2_500);
/// Fire-readiness delays (ms)
const AFTER_SHOT_MS: (u64, u64) = (500, 1_500);
const AIM_RECHECK_MS: (u64, u64) = (200, 500);

/// What the player looks like at the start of the tick
#[derive(Debug, Clone, Copy)]
pub struct PlayerView {
    pub pos: Vec2,
}

#[inline]
fn delay(rng: &mut Pcg32, range: (u64, u64)) -> u64 {
    rng.random_range(range.0..=range.1)
}

#[inline]
fn random_turn(rng: &mut Pcg32, max_deg: f32) -> f32 {
    rng.random_range(-max_deg..=max_deg).to_radians()
}

/// Does the lookahead point along the current heading hit something?
pub fn predicts_collision(tank: &Tank, arena: &Arena) -> bool {
    let ahead = tank.pos + heading_vector(tank.heading) * tank.size * LOOKAHEAD_FACTOR;
    arena.point_blocked(ahead)
}

/// Pick this tick's heading and return the intended displacement
pub fn decide(
    tank: &mut Tank,
    player: Option<PlayerView>,
    arena: &Arena,
    settings: &Settings,
    rng: &mut Pcg32,
    now: u64,
) -> Vec2 {
    // Probe with the heading we had coming into the tick
    let predicted = predicts_collision(tank, arena);
    let pos = tank.pos;

    let TankKind::Enemy(brain) = &mut tank.kind else {
        return Vec2::ZERO;
    };

    if let Some(player) = player {
        if brain.state == BrainState::Roaming && pos.distance(player.pos) < settings.chase_distance
        {
            log::debug!("Enemy {} starts chasing", tank.id);
            brain.state = BrainState::Chasing;
        }
    }

    match (brain.state, player) {
        (BrainState::Chasing, Some(player)) => {
            tank.heading = bearing(pos, player.pos);
        }
        _ => {
            if now > brain.reaim_at || predicted {
                let max_turn = if predicted { AVOID_TURN_DEG } else { ROAM_TURN_DEG };
                tank.heading = normalize_angle(tank.heading + random_turn(rng, max_turn));
                let wait = if predicted { AVOID_REAIM_MS } else { ROAM_REAIM_MS };
                brain.reaim_at = now + delay(rng, wait);
            }
        }
    }

    heading_vector(tank.heading) * brain.speed
}

/// Break out of dead ends: if a non-zero move went nowhere, swing round hard
/// and re-aim soon. Returns true if a forced turn happened.
pub fn recover_if_stuck(
    tank: &mut Tank,
    intended: Vec2,
    result: &MoveResult,
    rng: &mut Pcg32,
    now: u64,
) -> bool {
    if !result.is_stuck(intended) {
        return false;
    }
    let TankKind::Enemy(brain) = &mut tank.kind else {
        return false;
    };
    let turn = STUCK_TURNS_DEG.choose(rng).copied().unwrap_or(180.0);
    tank.heading = normalize_angle(tank.heading + turn.to_radians());
    brain.reaim_at = now + delay(rng, STUCK_REAIM_MS);
    true
}

/// Fire if ready and lined up with the player
///
/// A failed aim check reschedules a short recheck instead of the full delay,
/// so an enemy swinging toward the player fires as soon as it lines up.
pub fn try_fire(
    tank: &mut Tank,
    player: Option<PlayerView>,
    settings: &Settings,
    rng: &mut Pcg32,
    now: u64,
) -> Option<ShotRequest> {
    let player = player?;
    let ready = match tank.brain() {
        Some(brain) => now > brain.fire_ready_at,
        None => return None,
    };
    if !ready || !tank.can_fire(now, settings.enemy_shot_delay_ms) {
        return None;
    }

    let to_player = bearing(tank.pos, player.pos);
    let aimed = angle_diff(tank.heading, to_player).abs() < settings.aim_tolerance();

    let shot = if aimed {
        let pos = tank.take_shot(now);
        Some(ShotRequest {
            pos,
            heading: tank.heading,
            damage: tank.damage,
            side: Side::Enemy,
        })
    } else {
        None
    };

    if let TankKind::Enemy(brain) = &mut tank.kind {
        let wait = if aimed { AFTER_SHOT_MS } else { AIM_RECHECK_MS };
        brain.fire_ready_at = now + delay(rng, wait);
    }
    shot
}
