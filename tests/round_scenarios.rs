//! Whole-round scenarios driven through the public API

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use tank_mayhem::{Settings, heading_vector};
use tank_mayhem::sim::{
    Aabb, Arena, Archetype, BombardmentPhase, BombardmentZone, DefeatCause, Outcome, PowerUp,
    PowerUpKind, Projectile, RoundState, Side, Tank, TickInput, WavePhase, resolve_move, tick,
};

const STEP_MS: u64 = 16;

fn open_round(seed: u64) -> RoundState {
    let settings = Settings::default();
    let arena = Arena::open(&settings);
    RoundState::with_arena(seed, settings, arena, 0)
}

fn spawn_enemy(state: &mut RoundState, archetype: Archetype, pos: Vec2) -> u32 {
    let mut rng = Pcg32::seed_from_u64(77);
    let id = state.ids.next();
    let enemy = Tank::enemy(id, archetype, pos, state.now, &mut rng, &state.settings);
    state.enemies.push(enemy);
    id
}

#[test]
fn test_stats_never_negative_over_long_rounds() {
    for seed in [1, 2, 3] {
        let mut state = RoundState::new(seed, Settings::default(), 0);
        let input = TickInput {
            movement: Vec2::new(0.3, -0.2),
            aim: Some(Vec2::new(100.0, 100.0)),
            fire: true,
        };
        for step in 1..=6_000u64 {
            tick(&mut state, &input, step * STEP_MS);
            assert!(state.player.health >= 0.0);
            for enemy in &state.enemies {
                assert!(enemy.health > 0.0, "dead enemy left in play");
                assert!(enemy.ammo <= enemy.max_ammo);
            }
            if state.is_over() {
                break;
            }
        }
    }
}

#[test]
fn test_large_enemy_shot_ends_round() {
    let mut state = open_round(5);
    let pos = state.player.pos;
    let damage = Archetype::Large.stats().damage;
    let id = state.ids.next();
    // Already touching the player when the tick resolves impacts
    state
        .projectiles
        .push(Projectile::new(id, pos - Vec2::new(3.0, 0.0), 0.0, 3.0, damage, Side::Enemy));

    tick(&mut state, &TickInput::default(), STEP_MS);
    assert_eq!(state.player.health, 0.0);
    assert_eq!(state.outcome, Outcome::Defeat(DefeatCause::Shot));

    // Round is frozen afterwards
    let ticks = state.time_ticks;
    tick(&mut state, &TickInput::default(), 2 * STEP_MS);
    assert_eq!(state.time_ticks, ticks);
}

#[test]
fn test_victory_after_last_wave_without_spawns() {
    let mut state = open_round(6);
    let max = state.settings.waves.max_waves;
    state.waves.wave = max;
    state.waves.phase = WavePhase::WaitingForWave { next_wave_at: 0 };

    tick(&mut state, &TickInput::default(), STEP_MS);
    assert_eq!(state.outcome, Outcome::Victory);
    assert!(state.enemies.is_empty());
    assert_eq!(state.waves.wave, max + 1);
}

#[test]
fn test_powerup_refills_and_resets_timer() {
    let mut state = open_round(7);
    state.player.ammo = 2;
    let now = 9_000;
    state.powerups.active = Some(PowerUp {
        id: 500,
        kind: PowerUpKind::AmmoRefill,
        pos: state.player.pos + Vec2::new(5.0, 0.0),
        size: 18.0,
        spawned_at: 8_000,
    });

    tick(&mut state, &TickInput::default(), now);
    assert_eq!(state.player.ammo, 30);
    assert!(state.powerups.active.is_none());
    assert_eq!(state.powerups.next_spawn_at, now + 30_000);
}

#[test]
fn test_bombardment_kill_scores_nothing() {
    let mut state = open_round(8);
    let target = Vec2::new(200.0, 200.0);
    spawn_enemy(&mut state, Archetype::Large, target);
    state.bombardment.phase = BombardmentPhase::Active { started_at: 0 };
    state.bombardment.zones = vec![BombardmentZone {
        center: target,
        radius: 40.0,
        spawned_at: 0,
    }];

    tick(&mut state, &TickInput::default(), STEP_MS);
    assert!(state.enemies.is_empty());
    assert_eq!(state.score, 0);
    assert_eq!(state.outcome, Outcome::Ongoing);
}

#[test]
fn test_boxed_enemy_turns_within_one_tick() {
    let settings = Settings::default();
    let center = Vec2::new(300.0, 300.0);
    // Flush against a medium hull on all four sides
    let arena = Arena::open(&settings)
        .with_barrier(Aabb::from_corner(307.5, 280.0, 10.0, 40.0))
        .with_barrier(Aabb::from_corner(282.5, 280.0, 10.0, 40.0))
        .with_barrier(Aabb::from_corner(280.0, 307.5, 40.0, 10.0))
        .with_barrier(Aabb::from_corner(280.0, 282.5, 40.0, 10.0));
    let mut state = RoundState::with_arena(9, settings, arena, 0);
    spawn_enemy(&mut state, Archetype::Medium, center);

    let heading = state.enemies[0].heading;
    let mut hull_pos = center;
    let intended = heading_vector(heading) * 0.6;
    let interior = state.arena.interior();
    let result = resolve_move(&mut hull_pos, 15.0, intended, &state.arena.walls, &[], &interior);
    assert_eq!(result.displacement, Vec2::ZERO);
    assert!(result.is_stuck(intended));

    tick(&mut state, &TickInput::default(), STEP_MS);
    let enemy = &state.enemies[0];
    assert_eq!(enemy.pos, center);
    let reaim_at = enemy.brain().map(|b| b.reaim_at).unwrap_or_default();
    assert!((STEP_MS + 100..=STEP_MS + 400).contains(&reaim_at));
}

#[test]
fn test_player_shot_kills_small_enemy_and_scores() {
    let mut state = open_round(10);
    let pos = state.player.pos + Vec2::new(60.0, 0.0);
    spawn_enemy(&mut state, Archetype::Small, pos);

    let input = TickInput {
        aim: Some(pos),
        fire: true,
        ..Default::default()
    };
    let mut now = 0;
    for _ in 0..40 {
        now += STEP_MS;
        tick(&mut state, &input, now);
        if state.enemies.is_empty() {
            break;
        }
    }
    assert!(state.enemies.is_empty());
    assert_eq!(state.score, 10);
}
