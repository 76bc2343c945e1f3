//! Area-denial bombardment
//!
//! Episodes alternate between `Inactive` and `Active`. Each activation lays
//! out a batch of hazard circles; any tank whose center is inside one while
//! the episode lasts is destroyed outright. The cooldown runs from the end of
//! an episode.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::geometry::Aabb;
use super::state::{BombardmentZone, DefeatCause, GameEvent, KillCause, RoundState};
use crate::Settings;
use crate::settings::BombardmentSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BombardmentPhase {
    Inactive { next_at: u64 },
    Active { started_at: u64 },
}

#[derive(Debug, Clone)]
pub struct BombardmentScheduler {
    pub phase: BombardmentPhase,
    /// Zones of the running episode (empty while inactive)
    pub zones: Vec<BombardmentZone>,
    /// Episodes started this round
    pub episodes: u32,
    /// Zones the latest episode failed to place
    pub last_shortfall: u32,
}

impl BombardmentScheduler {
    pub fn new(start: u64, settings: &Settings) -> Self {
        Self {
            phase: BombardmentPhase::Inactive {
                next_at: start + settings.bombardment.first_episode_ms,
            },
            zones: Vec::new(),
            episodes: 0,
            last_shortfall: 0,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.phase, BombardmentPhase::Active { .. })
    }

    /// Time until the episode starts or ends
    pub fn time_to_transition(&self, now: u64, settings: &BombardmentSettings) -> u64 {
        match self.phase {
            BombardmentPhase::Inactive { next_at } => next_at.saturating_sub(now),
            BombardmentPhase::Active { started_at } => {
                (started_at + settings.active_ms).saturating_sub(now)
            }
        }
    }

    /// Is `p` inside any zone of the running episode?
    pub fn covers(&self, p: Vec2) -> bool {
        self.is_active() && self.zones.iter().any(|z| z.covers(p))
    }
}

/// Advance the episode state machine by one tick
pub fn update(state: &mut RoundState, now: u64) {
    match state.bombardment.phase {
        BombardmentPhase::Inactive { next_at } => {
            if now >= next_at {
                start_episode(state, now);
            }
        }
        BombardmentPhase::Active { started_at } => {
            let ended_at = started_at + state.settings.bombardment.active_ms;
            if now >= ended_at {
                let next_at = ended_at + state.settings.bombardment.cooldown_ms;
                let scheduler = &mut state.bombardment;
                scheduler.zones.clear();
                scheduler.phase = BombardmentPhase::Inactive { next_at };
                log::info!("Bombardment over, next at {next_at}");
                state.events.push(GameEvent::BombardmentEnded);
            }
        }
    }
}

fn start_episode(state: &mut RoundState, now: u64) {
    let config = &state.settings.bombardment;
    let player = state.player.is_alive().then_some(state.player.pos);
    let zones = place_zones(
        &state.arena.interior(),
        config,
        player,
        &mut state.rng,
        now,
    );

    let placed = u32::try_from(zones.len()).unwrap_or(u32::MAX);
    let shortfall = config.zone_count.saturating_sub(placed);
    if shortfall > 0 {
        log::warn!(
            "Bombardment placed {placed}/{} zones after {} attempts",
            config.zone_count,
            config.attempts
        );
    } else {
        log::info!("Bombardment started with {placed} zones");
    }

    let scheduler = &mut state.bombardment;
    scheduler.zones = zones;
    scheduler.phase = BombardmentPhase::Active { started_at: now };
    scheduler.episodes += 1;
    scheduler.last_shortfall = shortfall;
    state.events.push(GameEvent::BombardmentStarted {
        zones: placed,
        shortfall,
    });
}

/// Rejection-sample one episode's zones
///
/// Centers are drawn uniformly from `interior` shrunk by the inset fraction of
/// each dimension. A candidate too close to an accepted zone, or covering the
/// player, is redrawn. The attempt cap covers the whole batch, so fewer than
/// `zone_count` zones may come back.
pub fn place_zones(
    interior: &Aabb,
    config: &BombardmentSettings,
    player: Option<Vec2>,
    rng: &mut Pcg32,
    now: u64,
) -> Vec<BombardmentZone> {
    let region = interior.inset(Vec2::new(
        interior.width() * config.inset_fraction,
        interior.height() * config.inset_fraction,
    ));
    let min_spacing = config.spacing_factor * config.zone_radius;
    let mut zones: Vec<BombardmentZone> = Vec::with_capacity(config.zone_count as usize);
    if region.width() < 0.0 || region.height() < 0.0 {
        return zones;
    }

    let mut attempts = 0;
    while zones.len() < config.zone_count as usize && attempts < config.attempts {
        attempts += 1;
        let center = Vec2::new(
            rng.random_range(region.min.x..=region.max.x),
            rng.random_range(region.min.y..=region.max.y),
        );
        if zones.iter().any(|z| z.center.distance(center) < min_spacing) {
            continue;
        }
        if player.is_some_and(|p| p.distance(center) <= config.zone_radius) {
            continue;
        }
        zones.push(BombardmentZone {
            center,
            radius: config.zone_radius,
            spawned_at: now,
        });
    }
    zones
}

/// Destroy every tank standing in an active zone
pub fn apply_strikes(state: &mut RoundState) {
    if !state.bombardment.is_active() {
        return;
    }

    if state.player.is_alive() && state.bombardment.covers(state.player.pos) {
        log::debug!("Player caught in bombardment");
        state.defeat(DefeatCause::Bombardment);
    }

    let scheduler = &state.bombardment;
    let events = &mut state.events;
    state.enemies.retain(|enemy| {
        if !scheduler.covers(enemy.pos) {
            return true;
        }
        log::debug!("Enemy {} destroyed by bombardment", enemy.id);
        if let Some(archetype) = enemy.archetype() {
            events.push(GameEvent::EnemyDestroyed {
                archetype,
                score: 0,
                cause: KillCause::Bombardment,
            });
        }
        events.push(GameEvent::Explosion { pos: enemy.pos });
        false
    });
}
