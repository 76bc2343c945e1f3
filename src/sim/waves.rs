//! Wave director
//!
//! Enemy pacing over a round. Wave `n` targets `max(floor, fibonacci(n))`
//! enemies, spawned one at a time on the arena edges. A wave is cleared once
//! its whole target has spawned and no enemy is left alive.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::arena::Arena;
use super::geometry::Aabb;
use super::state::{Archetype, GameEvent, RoundState, Tank};
use crate::Settings;

/// Wave lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WavePhase {
    /// Between waves (or before the first)
    WaitingForWave { next_wave_at: u64 },
    /// Spawning and fighting the current wave
    SpawningWave,
    /// Final wave cleared, nothing more to spawn
    Victory,
}

#[derive(Debug, Clone)]
pub struct WaveDirector {
    pub phase: WavePhase,
    /// Current wave (1-based, 0 before the first)
    pub wave: u32,
    /// Enemies this wave spawns in total
    pub target: u32,
    /// Enemies spawned so far this wave
    pub spawned: u32,
    /// Next spawn attempt (clock ms)
    pub next_spawn_at: u64,
}

/// Fibonacci number with `fibonacci(0) = 0`, saturating instead of overflowing
pub fn fibonacci(n: u32) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}

/// Enemy count of wave `wave`
pub fn target_enemy_count(wave: u32, floor: u32) -> u32 {
    let count = fibonacci(wave).max(u64::from(floor));
    u32::try_from(count).unwrap_or(u32::MAX)
}

impl WaveDirector {
    pub fn new(start: u64, settings: &Settings) -> Self {
        Self {
            phase: WavePhase::WaitingForWave {
                next_wave_at: start + settings.waves.first_wave_delay_ms,
            },
            wave: 0,
            target: 0,
            spawned: 0,
            next_spawn_at: start,
        }
    }

    /// Enemies still to beat this wave: live ones plus those not spawned yet
    pub fn enemies_remaining(&self, live: usize) -> u32 {
        let live = u32::try_from(live).unwrap_or(u32::MAX);
        match self.phase {
            WavePhase::SpawningWave => self.target.saturating_sub(self.spawned).saturating_add(live),
            _ => live,
        }
    }

    /// Time until the next wave starts, if one is scheduled
    pub fn time_to_next_wave(&self, now: u64) -> Option<u64> {
        match self.phase {
            WavePhase::WaitingForWave { next_wave_at } => Some(next_wave_at.saturating_sub(now)),
            _ => None,
        }
    }

    fn all_spawned(&self) -> bool {
        self.spawned >= self.target
    }
}

/// Advance the wave state machine by one tick
pub fn update(state: &mut RoundState, now: u64) {
    match state.waves.phase {
        WavePhase::Victory => {}
        WavePhase::WaitingForWave { next_wave_at } => {
            if now >= next_wave_at {
                start_next_wave(state, now);
            }
        }
        WavePhase::SpawningWave => {
            if !state.waves.all_spawned() {
                spawn_step(state, now);
            } else if state.enemies.is_empty() {
                finish_wave(state, now);
            }
        }
    }
}

fn start_next_wave(state: &mut RoundState, now: u64) {
    let director = &mut state.waves;
    director.wave += 1;
    if director.wave > state.settings.waves.max_waves {
        director.phase = WavePhase::Victory;
        state.victory();
        return;
    }

    director.target = target_enemy_count(director.wave, state.settings.waves.min_enemies);
    director.spawned = 0;
    director.next_spawn_at = now;
    director.phase = WavePhase::SpawningWave;

    log::info!("Wave {} started: {} enemies", director.wave, director.target);
    state.events.push(GameEvent::WaveStarted {
        wave: director.wave,
        target: director.target,
    });
}

fn finish_wave(state: &mut RoundState, now: u64) {
    let wave = state.waves.wave;
    state.events.push(GameEvent::WaveCleared { wave });

    if wave >= state.settings.waves.max_waves {
        state.waves.phase = WavePhase::Victory;
        state.victory();
    } else {
        let next_wave_at = now + state.settings.waves.inter_wave_delay_ms;
        log::info!("Wave {wave} cleared, next wave at {next_wave_at}");
        state.waves.phase = WavePhase::WaitingForWave { next_wave_at };
    }
}

/// One placement attempt when the spawn timer is due
fn spawn_step(state: &mut RoundState, now: u64) {
    if now < state.waves.next_spawn_at {
        return;
    }

    let player = state.player.is_alive().then_some(state.player.pos);
    let placed = find_edge_spawn(
        &state.arena,
        &state.settings,
        player,
        &state.enemies,
        &mut state.rng,
    );

    match placed {
        Some((archetype, pos)) => {
            let enemy = Tank::enemy(
                state.ids.next(),
                archetype,
                pos,
                now,
                &mut state.rng,
                &state.settings,
            );
            log::debug!(
                "Spawned {archetype:?} enemy {} at ({:.0}, {:.0})",
                enemy.id,
                pos.x,
                pos.y
            );
            state.enemies.push(enemy);
            state.waves.spawned += 1;
            state.waves.next_spawn_at = now + state.settings.waves.spawn_interval_ms;
        }
        None => {
            log::warn!(
                "No edge spawn found after {} attempts (wave {})",
                state.settings.waves.spawn_attempts,
                state.waves.wave
            );
            state.events.push(GameEvent::PlacementSkipped { what: "enemy" });
            state.waves.next_spawn_at = now + state.settings.waves.spawn_retry_ms;
        }
    }
}

/// Pick an archetype and a free point on one of the arena edges
///
/// The edges are those of the interior inset by the largest archetype size,
/// so any archetype fits. Candidates overlapping a wall, too close to the
/// player or overlapping a live enemy are redrawn up to the attempt cap.
pub fn find_edge_spawn(
    arena: &Arena,
    settings: &Settings,
    player: Option<Vec2>,
    enemies: &[Tank],
    rng: &mut Pcg32,
) -> Option<(Archetype, Vec2)> {
    let archetype = Archetype::random(rng);
    let size = archetype.stats().size;
    let edges = arena
        .interior()
        .inset(Vec2::splat(Archetype::largest_size()));
    if edges.width() <= 0.0 || edges.height() <= 0.0 {
        return None;
    }

    for _ in 0..settings.waves.spawn_attempts {
        let pos = match rng.random_range(0..4u8) {
            0 => Vec2::new(rng.random_range(edges.min.x..=edges.max.x), edges.min.y),
            1 => Vec2::new(rng.random_range(edges.min.x..=edges.max.x), edges.max.y),
            2 => Vec2::new(edges.min.x, rng.random_range(edges.min.y..=edges.max.y)),
            _ => Vec2::new(edges.max.x, rng.random_range(edges.min.y..=edges.max.y)),
        };
        let hull = Aabb::square(pos, size);

        if arena.overlaps_wall(&hull) {
            continue;
        }
        if player.is_some_and(|p| p.distance(pos) < settings.waves.min_player_distance) {
            continue;
        }
        if enemies.iter().any(|e| e.bounds().overlaps(&hull)) {
            continue;
        }
        return Some((archetype, pos));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Outcome;
    use rand::SeedableRng;

    fn open_round(settings: Settings) -> RoundState {
        let arena = Arena::open(&settings);
        RoundState::with_arena(11, settings, arena, 0)
    }

    #[test]
    fn test_fibonacci_values() {
        assert_eq!(fibonacci(0), 0);
        assert_eq!(fibonacci(1), 1);
        assert_eq!(fibonacci(2), 1);
        assert_eq!(fibonacci(5), 5);
        assert_eq!(fibonacci(10), 55);
        assert_eq!(fibonacci(500), u64::MAX);
    }

    #[test]
    fn test_early_waves_hit_the_floor() {
        for wave in 1..=5 {
            assert_eq!(target_enemy_count(wave, 10), 10);
        }
        assert_eq!(target_enemy_count(7, 10), 13);
        assert_eq!(target_enemy_count(10, 10), 55);
    }

    #[test]
    fn test_first_wave_waits_for_delay() {
        let mut state = open_round(Settings::default());
        update(&mut state, 2_999);
        assert_eq!(state.waves.wave, 0);
        assert_eq!(state.waves.time_to_next_wave(2_999), Some(1));

        update(&mut state, 3_000);
        assert_eq!(state.waves.wave, 1);
        assert_eq!(state.waves.phase, WavePhase::SpawningWave);
        assert_eq!(state.waves.target, 10);
        assert_eq!(state.waves.time_to_next_wave(3_000), None);
    }

    #[test]
    fn test_spawns_one_at_a_time_at_interval() {
        let mut state = open_round(Settings::default());
        update(&mut state, 3_000);
        update(&mut state, 3_000);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.waves.next_spawn_at, 3_600);

        update(&mut state, 3_500);
        assert_eq!(state.enemies.len(), 1);
        update(&mut state, 3_600);
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.waves.enemies_remaining(state.enemies.len()), 10);
    }

    #[test]
    fn test_edge_spawns_keep_clear_of_player() {
        let settings = Settings::default();
        let arena = Arena::open(&settings);
        let mut rng = Pcg32::seed_from_u64(5);
        let player = Vec2::new(40.0, 40.0);
        for _ in 0..50 {
            let (archetype, pos) = find_edge_spawn(&arena, &settings, Some(player), &[], &mut rng)
                .expect("open arena has room");
            assert!(pos.distance(player) >= 150.0);
            assert!(!arena.overlaps_wall(&Aabb::square(pos, archetype.stats().size)));
        }
    }

    #[test]
    fn test_edge_spawns_never_overlap_enemies_until_saturated() {
        let settings = Settings::default();
        let arena = Arena::open(&settings);
        let mut rng = Pcg32::seed_from_u64(17);
        let mut enemies: Vec<Tank> = Vec::new();
        let mut failures = 0;

        for id in 0..400 {
            match find_edge_spawn(&arena, &settings, None, &enemies, &mut rng) {
                Some((archetype, pos)) => {
                    let hull = Aabb::square(pos, archetype.stats().size);
                    assert!(
                        enemies.iter().all(|e| !e.bounds().overlaps(&hull)),
                        "spawn {id} overlaps a live enemy"
                    );
                    enemies.push(Tank::enemy(id, archetype, pos, 0, &mut rng, &settings));
                }
                None => failures += 1,
            }
        }

        assert!(!enemies.is_empty());
        // The edge band fills up long before 400 tanks
        assert!(failures > 0);
        assert!(enemies.len() < 400);
    }

    #[test]
    fn test_failed_placement_schedules_fast_retry() {
        let mut settings = Settings::default();
        // Nowhere on the edges is far enough from the player
        settings.waves.min_player_distance = 10_000.0;
        let mut state = open_round(settings);
        update(&mut state, 3_000);
        update(&mut state, 3_000);
        assert!(state.enemies.is_empty());
        assert_eq!(state.waves.spawned, 0);
        assert_eq!(state.waves.next_spawn_at, 3_100);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::PlacementSkipped { what: "enemy" })
        );
    }

    #[test]
    fn test_cleared_wave_schedules_next() {
        let mut state = open_round(Settings::default());
        state.waves.wave = 1;
        state.waves.target = 10;
        state.waves.spawned = 10;
        state.waves.phase = WavePhase::SpawningWave;

        update(&mut state, 20_000);
        assert_eq!(
            state.waves.phase,
            WavePhase::WaitingForWave {
                next_wave_at: 25_000
            }
        );
        assert_eq!(state.outcome, Outcome::Ongoing);
    }

    #[test]
    fn test_past_last_wave_is_victory_without_spawning() {
        let settings = Settings::default();
        let max = settings.waves.max_waves;
        let mut state = open_round(settings);
        state.waves.wave = max;
        state.waves.phase = WavePhase::WaitingForWave { next_wave_at: 0 };

        update(&mut state, 10);
        assert_eq!(state.waves.wave, max + 1);
        assert_eq!(state.waves.phase, WavePhase::Victory);
        assert_eq!(state.outcome, Outcome::Victory);

        update(&mut state, 10_000);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_clearing_last_wave_is_victory() {
        let mut state = open_round(Settings::default());
        state.waves.wave = state.settings.waves.max_waves;
        state.waves.target = 3;
        state.waves.spawned = 3;
        state.waves.phase = WavePhase::SpawningWave;

        update(&mut state, 50_000);
        assert_eq!(state.outcome, Outcome::Victory);
    }
}
