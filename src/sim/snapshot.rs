//! Read-only views for rendering and the HUD

use glam::Vec2;
use serde::Serialize;

use super::state::{Archetype, Outcome, PowerUpKind, RoundState, Side, TankKind};
use crate::consts::PROJECTILE_SIZE;

/// What to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Player,
    Enemy { archetype: Archetype },
    Projectile { side: Side },
    Obstacle,
    PowerUp { kind: PowerUpKind },
    /// Active bombardment zone (size is the diameter)
    Zone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub heading: f32,
    pub size: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    /// Time since the round started
    pub elapsed_ms: u64,
    pub score: u64,
    pub health: f32,
    pub max_health: f32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub wave: u32,
    pub max_waves: u32,
    pub enemies_remaining: u32,
    pub next_wave_in_ms: Option<u64>,
    pub bombardment_active: bool,
    pub bombardment_transition_in_ms: u64,
    pub safe_zone_remaining_ms: Option<u64>,
    pub safe_zone_radius: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub time_ms: u64,
    pub entities: Vec<EntityView>,
    pub hud: Hud,
    pub outcome: Outcome,
}

impl RoundState {
    pub fn hud(&self) -> Hud {
        let now = self.now;
        Hud {
            elapsed_ms: now.saturating_sub(self.started_at),
            score: self.score,
            health: self.player.health,
            max_health: self.player.max_health,
            ammo: self.player.ammo,
            max_ammo: self.player.max_ammo,
            wave: self.waves.wave.min(self.settings.waves.max_waves),
            max_waves: self.settings.waves.max_waves,
            enemies_remaining: self.waves.enemies_remaining(self.enemies.len()),
            next_wave_in_ms: self.waves.time_to_next_wave(now),
            bombardment_active: self.bombardment.is_active(),
            bombardment_transition_in_ms: self
                .bombardment
                .time_to_transition(now, &self.settings.bombardment),
            safe_zone_remaining_ms: self.safe_zone.as_ref().map(|z| z.remaining(now)),
            safe_zone_radius: self.safe_zone.as_ref().map(|z| z.radius_at(now)),
        }
    }

    /// Every live entity, obstacles first, then tanks, projectiles, pickups, zones
    pub fn snapshot(&self) -> Snapshot {
        let mut entities: Vec<EntityView> = self
            .arena
            .walls
            .iter()
            .map(|wall| EntityView {
                kind: EntityKind::Obstacle,
                pos: wall.center(),
                heading: 0.0,
                size: Vec2::new(wall.width(), wall.height()),
            })
            .collect();

        let tanks = std::iter::once(&self.player)
            .filter(|p| p.is_alive())
            .chain(self.enemies.iter());
        for tank in tanks {
            let kind = match &tank.kind {
                TankKind::Player => EntityKind::Player,
                TankKind::Enemy(brain) => EntityKind::Enemy {
                    archetype: brain.archetype,
                },
            };
            entities.push(EntityView {
                kind,
                pos: tank.pos,
                heading: tank.heading,
                size: Vec2::splat(tank.size),
            });
        }

        entities.extend(self.projectiles.iter().map(|p| EntityView {
            kind: EntityKind::Projectile { side: p.side },
            pos: p.pos,
            heading: p.heading,
            size: Vec2::splat(PROJECTILE_SIZE),
        }));

        entities.extend(self.powerups.active.iter().map(|p| EntityView {
            kind: EntityKind::PowerUp { kind: p.kind },
            pos: p.pos,
            heading: 0.0,
            size: Vec2::splat(p.size),
        }));

        entities.extend(self.bombardment.zones.iter().map(|z| EntityView {
            kind: EntityKind::Zone,
            pos: z.center,
            heading: 0.0,
            size: Vec2::splat(z.radius * 2.0),
        }));

        Snapshot {
            time_ms: self.now,
            entities,
            hud: self.hud(),
            outcome: self.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Settings;
    use crate::sim::arena::Arena;
    use crate::sim::snapshot::EntityKind;
    use crate::sim::state::RoundState;

    #[test]
    fn test_fresh_round_hud() {
        let settings = Settings::default();
        let arena = Arena::open(&settings);
        let state = RoundState::with_arena(3, settings, arena, 0);
        let hud = state.hud();
        assert_eq!(hud.health, 3.0);
        assert_eq!(hud.ammo, 30);
        assert_eq!(hud.wave, 0);
        assert_eq!(hud.next_wave_in_ms, Some(3_000));
        assert!(!hud.bombardment_active);
        assert_eq!(hud.bombardment_transition_in_ms, 20_000);
        assert_eq!(hud.safe_zone_radius, None);
        assert_eq!(hud.elapsed_ms, 0);
    }

    #[test]
    fn test_hud_times_are_relative_to_round_start() {
        let settings = Settings::default();
        let arena = Arena::open(&settings);
        let mut state = RoundState::with_arena(3, settings, arena, 50_000);
        state.now = 51_500;
        let hud = state.hud();
        assert_eq!(hud.elapsed_ms, 1_500);
        assert_eq!(hud.next_wave_in_ms, Some(1_500));
        assert_eq!(hud.bombardment_transition_in_ms, 18_500);
    }

    #[test]
    fn test_snapshot_lists_walls_and_player() {
        let settings = Settings::default();
        let arena = Arena::open(&settings);
        let state = RoundState::with_arena(3, settings, arena, 0);
        let snapshot = state.snapshot();
        let obstacles = snapshot
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Obstacle)
            .count();
        assert_eq!(obstacles, 4);
        assert!(snapshot.entities.iter().any(|e| e.kind == EntityKind::Player));
        assert!(serde_json::to_string(&snapshot).is_ok());
    }
}
