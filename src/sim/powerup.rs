//! Power-up timing
//!
//! At most one power-up is on the field. It appears when the respawn timer is
//! due, vanishes after its lifespan, and refills the player completely when
//! collected.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::arena::Arena;
use super::geometry::Aabb;
use super::state::{GameEvent, PowerUp, PowerUpKind, RoundState, Tank};
use crate::Settings;
use crate::settings::PowerUpSettings;

#[derive(Debug, Clone)]
pub struct PowerUpTimer {
    /// The power-up on the field, if any
    pub active: Option<PowerUp>,
    /// Earliest time a new one may appear (clock ms)
    pub next_spawn_at: u64,
}

impl PowerUpTimer {
    pub fn new(start: u64, settings: &Settings) -> Self {
        Self {
            active: None,
            next_spawn_at: start + settings.powerups.first_spawn_ms,
        }
    }
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::AmmoRefill, PowerUpKind::HealthRestore];

    pub fn random(rng: &mut Pcg32) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Refill the matching stat to its maximum
    pub fn apply(self, tank: &mut Tank) {
        match self {
            PowerUpKind::AmmoRefill => tank.ammo = tank.max_ammo,
            PowerUpKind::HealthRestore => tank.health = tank.max_health,
        }
    }
}

/// Expire a stale power-up or spawn a new one when due
pub fn update(state: &mut RoundState, now: u64) {
    let config = &state.settings.powerups;

    if let Some(powerup) = &state.powerups.active {
        if now.saturating_sub(powerup.spawned_at) > config.lifespan_ms {
            let kind = powerup.kind;
            log::debug!("Power-up {kind:?} expired");
            state.powerups.active = None;
            state.powerups.next_spawn_at = now + config.respawn_ms;
            state.events.push(GameEvent::PowerUpExpired { kind });
        }
        return;
    }

    if now < state.powerups.next_spawn_at {
        return;
    }

    let kind = PowerUpKind::random(&mut state.rng);
    match find_spot(&state.arena, config, &state.player, &mut state.rng) {
        Some(pos) => {
            log::debug!("Power-up {kind:?} spawned at ({:.0}, {:.0})", pos.x, pos.y);
            state.powerups.active = Some(PowerUp {
                id: state.ids.next(),
                kind,
                pos,
                size: config.size,
                spawned_at: now,
            });
            state.events.push(GameEvent::PowerUpSpawned { kind, pos });
        }
        None => {
            log::warn!("No power-up spot found after {} attempts", config.attempts);
            state.powerups.next_spawn_at = now + config.retry_ms;
            state.events.push(GameEvent::PlacementSkipped { what: "power-up" });
        }
    }
}

/// Rejection-sample a free spot away from walls and the player
fn find_spot(
    arena: &Arena,
    config: &PowerUpSettings,
    player: &Tank,
    rng: &mut Pcg32,
) -> Option<Vec2> {
    let region = arena.interior().inset(Vec2::splat(config.size));
    if region.width() < 0.0 || region.height() < 0.0 {
        return None;
    }
    let keep_out = player.bounds().inflate(player.size);

    (0..config.attempts).find_map(|_| {
        let pos = Vec2::new(
            rng.random_range(region.min.x..=region.max.x),
            rng.random_range(region.min.y..=region.max.y),
        );
        let hull = Aabb::square(pos, config.size);
        if arena.overlaps_wall(&hull) || hull.overlaps(&keep_out) {
            None
        } else {
            Some(pos)
        }
    })
}

/// Hand the power-up to the player on contact
pub fn collect(state: &mut RoundState, now: u64) {
    if !state.player.is_alive() {
        return;
    }
    let touching = state
        .powerups
        .active
        .as_ref()
        .is_some_and(|p| p.bounds().overlaps(&state.player.bounds()));
    if !touching {
        return;
    }

    if let Some(powerup) = state.powerups.active.take() {
        powerup.kind.apply(&mut state.player);
        state.powerups.next_spawn_at = now + state.settings.powerups.respawn_ms;
        log::debug!("Player collected {:?}", powerup.kind);
        state.events.push(GameEvent::PowerUpCollected { kind: powerup.kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_round() -> RoundState {
        let settings = Settings::default();
        let arena = Arena::open(&settings);
        RoundState::with_arena(31, settings, arena, 0)
    }

    fn drop_on_player(state: &mut RoundState, kind: PowerUpKind, now: u64) {
        state.powerups.active = Some(PowerUp {
            id: 99,
            kind,
            pos: state.player.pos,
            size: 18.0,
            spawned_at: now,
        });
    }

    #[test]
    fn test_spawns_when_due_away_from_player() {
        let mut state = open_round();
        update(&mut state, 7_999);
        assert!(state.powerups.active.is_none());

        update(&mut state, 8_000);
        let powerup = state.powerups.active.as_ref().expect("power-up spawned");
        let keep_out = state.player.bounds().inflate(state.player.size);
        assert!(!powerup.bounds().overlaps(&keep_out));
        assert!(!state.arena.overlaps_wall(&powerup.bounds()));
    }

    #[test]
    fn test_ammo_refill_is_full() {
        let mut state = open_round();
        state.player.ammo = 4;
        drop_on_player(&mut state, PowerUpKind::AmmoRefill, 10_000);
        collect(&mut state, 12_000);
        assert_eq!(state.player.ammo, 30);
        assert!(state.powerups.active.is_none());
        assert_eq!(state.powerups.next_spawn_at, 42_000);
    }

    #[test]
    fn test_health_restore_is_full() {
        let mut state = open_round();
        state.player.health = 0.5;
        drop_on_player(&mut state, PowerUpKind::HealthRestore, 10_000);
        collect(&mut state, 15_000);
        assert_eq!(state.player.health, 3.0);
        assert_eq!(state.powerups.next_spawn_at, 45_000);
    }

    #[test]
    fn test_expires_after_lifespan() {
        let mut state = open_round();
        let far = state.player.pos + Vec2::new(200.0, 0.0);
        drop_on_player(&mut state, PowerUpKind::AmmoRefill, 10_000);
        if let Some(p) = state.powerups.active.as_mut() {
            p.pos = far;
        }

        update(&mut state, 30_000);
        assert!(state.powerups.active.is_some());
        update(&mut state, 30_001);
        assert!(state.powerups.active.is_none());
        assert_eq!(state.powerups.next_spawn_at, 60_001);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::PowerUpExpired {
                    kind: PowerUpKind::AmmoRefill
                })
        );
    }

    #[test]
    fn test_failed_spawn_retries_later() {
        let mut state = open_round();
        // Too big to fit anywhere
        state.settings.powerups.size = 2_000.0;
        update(&mut state, 8_000);
        assert!(state.powerups.active.is_none());
        assert_eq!(state.powerups.next_spawn_at, 13_000);
    }
}
