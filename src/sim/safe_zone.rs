//! Shrinking safe circle
//!
//! Optional round timer: the circle closes linearly from beyond the arena
//! corners down to a small end radius. Standing outside drains the player,
//! enemies outside are destroyed. When time runs out the round is lost.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::arena::Arena;
use super::state::{DefeatCause, GameEvent, KillCause, RoundState};
use crate::settings::SafeZoneSettings;

#[derive(Debug, Clone, Serialize)]
pub struct SafeZone {
    pub center: Vec2,
    pub start_radius: f32,
    pub end_radius: f32,
    pub started_at: u64,
    pub duration_ms: u64,
    pub drain_per_tick: f32,
}

impl SafeZone {
    pub fn new(config: &SafeZoneSettings, arena: &Arena, rng: &mut Pcg32, start: u64) -> Self {
        let pad = Vec2::new(arena.width, arena.height) * config.center_inset_fraction;
        let center = Vec2::new(
            rng.random_range(pad.x..=arena.width - pad.x),
            rng.random_range(pad.y..=arena.height - pad.y),
        );
        let half_diagonal = Vec2::new(arena.width, arena.height).length() / 2.0;
        let start_radius = half_diagonal * config.start_radius_factor;

        log::info!(
            "Safe zone at ({:.0}, {:.0}), radius {start_radius:.0} -> {:.0}",
            center.x,
            center.y,
            config.end_radius
        );

        Self {
            center,
            start_radius,
            end_radius: config.end_radius,
            started_at: start,
            duration_ms: config.duration_ms,
            drain_per_tick: config.drain_per_tick,
        }
    }

    /// Radius at `now`, never below the end radius
    pub fn radius_at(&self, now: u64) -> f32 {
        let elapsed = now.saturating_sub(self.started_at) as f32;
        let t = elapsed / self.duration_ms.max(1) as f32;
        if t >= 1.0 {
            return self.end_radius;
        }
        let radius = self.start_radius + (self.end_radius - self.start_radius) * t;
        radius.max(self.end_radius)
    }

    /// Round time left
    pub fn remaining(&self, now: u64) -> u64 {
        (self.started_at + self.duration_ms).saturating_sub(now)
    }

    /// Strictly farther than the radius counts as outside
    pub fn is_outside(&self, p: Vec2, now: u64) -> bool {
        self.center.distance(p) > self.radius_at(now)
    }
}

/// End the round on timeout, drain the player, remove enemies outside
pub fn apply(state: &mut RoundState, now: u64) {
    let Some(zone) = state.safe_zone.clone() else {
        return;
    };

    if zone.remaining(now) == 0 {
        log::info!("Round time expired");
        state.defeat(DefeatCause::TimeExpired);
        return;
    }

    if state.player.is_alive() && zone.is_outside(state.player.pos, now) {
        state.player.apply_damage(zone.drain_per_tick);
        if !state.player.is_alive() {
            state.defeat(DefeatCause::SafeZone);
        }
    }

    let events = &mut state.events;
    state.enemies.retain(|enemy| {
        if !zone.is_outside(enemy.pos, now) {
            return true;
        }
        log::debug!("Enemy {} destroyed outside the safe zone", enemy.id);
        if let Some(archetype) = enemy.archetype() {
            events.push(GameEvent::EnemyDestroyed {
                archetype,
                score: 0,
                cause: KillCause::SafeZone,
            });
        }
        events.push(GameEvent::Explosion { pos: enemy.pos });
        false
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::sim::state::{Archetype, Outcome, Tank};
    use rand::SeedableRng;

    fn zoned_round() -> RoundState {
        let settings = Settings {
            safe_zone: Some(SafeZoneSettings::default()),
            ..Settings::default()
        };
        let arena = Arena::open(&settings);
        RoundState::with_arena(41, settings, arena, 0)
    }

    #[test]
    fn test_radius_shrinks_linearly() {
        let state = zoned_round();
        let zone = state.safe_zone.as_ref().expect("safe zone enabled");
        let half_diag = Vec2::new(1000.0, 800.0).length() / 2.0;
        assert!((zone.radius_at(0) - half_diag * 1.1).abs() < 1e-3);
        let mid = (half_diag * 1.1 + 75.0) / 2.0;
        assert!((zone.radius_at(60_000) - mid).abs() < 1e-2);
        assert_eq!(zone.radius_at(120_000), 75.0);
        assert_eq!(zone.radius_at(500_000), 75.0);
        assert_eq!(zone.remaining(100_000), 20_000);
    }

    #[test]
    fn test_center_respects_inset() {
        for seed in 0..20 {
            let settings = Settings::default();
            let arena = Arena::open(&settings);
            let mut rng = Pcg32::seed_from_u64(seed);
            let zone = SafeZone::new(&SafeZoneSettings::default(), &arena, &mut rng, 0);
            assert!(zone.center.x >= 150.0 && zone.center.x <= 850.0);
            assert!(zone.center.y >= 120.0 && zone.center.y <= 680.0);
        }
    }

    #[test]
    fn test_player_drained_outside() {
        let mut state = zoned_round();
        let now = 120_000 - 1;
        let zone = state.safe_zone.clone().expect("safe zone enabled");
        state.player.pos = zone.center + Vec2::new(200.0, 0.0);
        apply(&mut state, now);
        assert!((state.player.health - (3.0 - 0.05)).abs() < 1e-6);
        assert_eq!(state.outcome, Outcome::Ongoing);

        state.player.health = 0.01;
        apply(&mut state, now);
        assert_eq!(state.outcome, Outcome::Defeat(DefeatCause::SafeZone));
    }

    #[test]
    fn test_enemy_outside_removed_without_score() {
        let mut state = zoned_round();
        let zone = state.safe_zone.clone().expect("safe zone enabled");
        let mut rng = Pcg32::seed_from_u64(2);
        let id = state.ids.next();
        let pos = zone.center + Vec2::new(0.0, 100.0);
        let enemy = Tank::enemy(id, Archetype::Large, pos, 0, &mut rng, &state.settings);
        state.enemies.push(enemy);
        state.player.pos = zone.center;

        apply(&mut state, 119_000);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_time_expiry_is_defeat() {
        let mut state = zoned_round();
        apply(&mut state, 120_000);
        assert_eq!(state.outcome, Outcome::Defeat(DefeatCause::TimeExpired));
    }
}
