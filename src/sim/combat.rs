//! Projectile flight and impact resolution
//!
//! Player projectiles can only hit enemies and enemy projectiles only the
//! player. A projectile is spent on its first contact and damages at most one
//! tank. Removals happen after the whole pass so every projectile sees the
//! same population.

use super::collision::first_overlap;
use super::state::{DefeatCause, GameEvent, KillCause, RoundState, Side};

/// Move every projectile one tick and drop those that left the interior
pub fn advance_projectiles(state: &mut RoundState) {
    let interior = state.arena.interior();
    state.projectiles.retain_mut(|p| {
        p.pos += p.vel;
        interior.contains_point(p.pos)
    });
}

/// What a projectile ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Impact {
    Enemy(usize),
    Player,
    Wall,
}

/// Apply projectile hits: damage, deaths, score
pub fn resolve_projectile_hits(state: &mut RoundState) {
    let mut spent = Vec::new();
    let mut player_killed = false;

    for projectile in &state.projectiles {
        let hit_box = projectile.bounds();
        let tank_hit = match projectile.side {
            Side::Player => state
                .enemies
                .iter()
                .position(|e| e.is_alive() && e.bounds().overlaps(&hit_box))
                .map(Impact::Enemy),
            Side::Enemy => (state.player.is_alive() && state.player.bounds().overlaps(&hit_box))
                .then_some(Impact::Player),
        };
        // A tank in contact takes the hit before the wall behind it
        let impact = tank_hit.or_else(|| {
            first_overlap(&hit_box, &state.arena.walls).map(|_| Impact::Wall)
        });

        let Some(impact) = impact else {
            continue;
        };
        spent.push(projectile.id);
        state.events.push(GameEvent::Explosion {
            pos: projectile.pos,
        });

        match impact {
            Impact::Enemy(index) => {
                let enemy = &mut state.enemies[index];
                enemy.apply_damage(projectile.damage);
                state.events.push(GameEvent::TankDamaged {
                    id: enemy.id,
                    health: enemy.health,
                });
            }
            Impact::Player => {
                player_killed |= state.player.apply_damage(projectile.damage);
                state.events.push(GameEvent::TankDamaged {
                    id: state.player.id,
                    health: state.player.health,
                });
            }
            Impact::Wall => {}
        }
    }

    state.projectiles.retain(|p| !spent.contains(&p.id));
    remove_dead_enemies(state);

    if player_killed {
        state.defeat(DefeatCause::Shot);
    }
}

/// Credit score for enemies shot down this tick and drop them
fn remove_dead_enemies(state: &mut RoundState) {
    let score = &mut state.score;
    let events = &mut state.events;
    state.enemies.retain(|enemy| {
        if enemy.is_alive() {
            return true;
        }
        if let Some(archetype) = enemy.archetype() {
            let value = archetype.stats().score;
            *score += value;
            log::debug!("Enemy {} ({archetype:?}) destroyed, +{value}", enemy.id);
            events.push(GameEvent::EnemyDestroyed {
                archetype,
                score: value,
                cause: KillCause::Projectile,
            });
        }
        events.push(GameEvent::Explosion { pos: enemy.pos });
        false
    });
}
