//! Round state and core simulation types
//!
//! A `RoundState` is built fresh for every round and owns every entity
//! collection exclusively; nothing outlives it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::{SPAWN_FIRE_READY_MS, SPAWN_REAIM_MS};
use super::arena::Arena;
use super::bombardment::BombardmentScheduler;
use super::geometry::Aabb;
use super::powerup::PowerUpTimer;
use super::safe_zone::SafeZone;
use super::waves::WaveDirector;
use crate::consts::*;
use crate::{Settings, heading_vector};

/// Which population a projectile belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Small,
    Medium,
    Large,
}

/// Fixed stat bundle of an archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeStats {
    pub size: f32,
    pub max_health: f32,
    /// Multiplier on the player speed
    pub speed_mod: f32,
    pub damage: f32,
    pub score: u64,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [Archetype::Small, Archetype::Medium, Archetype::Large];

    pub fn stats(self) -> ArchetypeStats {
        match self {
            // Small tanks are the fastest
            Archetype::Small => ArchetypeStats {
                size: 12.0,
                max_health: 1.0,
                speed_mod: 0.7,
                damage: 1.0,
                score: 10,
            },
            Archetype::Medium => ArchetypeStats {
                size: 15.0,
                max_health: 2.0,
                speed_mod: 0.6,
                damage: 1.0,
                score: 25,
            },
            // One hit from a large tank kills a full-health player
            Archetype::Large => ArchetypeStats {
                size: 18.0,
                max_health: 3.0,
                speed_mod: 0.55,
                damage: 3.0,
                score: 50,
            },
        }
    }

    /// Size of the biggest archetype (edge-spawn buffer)
    pub fn largest_size() -> f32 {
        Self::ALL
            .iter()
            .map(|a| a.stats().size)
            .fold(0.0, f32::max)
    }

    pub fn random(rng: &mut Pcg32) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Enemy behavioral state. There is no way back from `Chasing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrainState {
    Roaming,
    Chasing,
}

/// Per-enemy decision state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBrain {
    pub archetype: Archetype,
    pub state: BrainState,
    /// Next forced re-aim while roaming (clock ms)
    pub reaim_at: u64,
    /// Next fire-readiness check (clock ms)
    pub fire_ready_at: u64,
    /// Movement per tick
    pub speed: f32,
}

/// Player or enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TankKind {
    Player,
    Enemy(EnemyBrain),
}

/// A tank entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub id: u32,
    pub kind: TankKind,
    /// Center position
    pub pos: Vec2,
    /// Heading (radians, 0 = +X)
    pub heading: f32,
    /// Side length of the square hull
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    pub ammo: u32,
    pub max_ammo: u32,
    /// Clock time of the last shot (None = never fired)
    pub last_shot_at: Option<u64>,
    /// Damage dealt by this tank's projectiles
    pub damage: f32,
}

impl Tank {
    pub fn player(id: u32, pos: Vec2, settings: &Settings) -> Self {
        Self {
            id,
            kind: TankKind::Player,
            pos,
            heading: 0.0,
            size: PLAYER_SIZE,
            health: settings.player_max_health,
            max_health: settings.player_max_health,
            ammo: settings.player_max_ammo,
            max_ammo: settings.player_max_ammo,
            last_shot_at: None,
            damage: PLAYER_DAMAGE,
        }
    }

    /// Build an enemy with randomized heading and staggered timers
    pub fn enemy(
        id: u32,
        archetype: Archetype,
        pos: Vec2,
        now: u64,
        rng: &mut Pcg32,
        settings: &Settings,
    ) -> Self {
        let stats = archetype.stats();
        let heading = rng.random_range(0.0..std::f32::consts::TAU);
        Self {
            id,
            kind: TankKind::Enemy(EnemyBrain {
                archetype,
                state: BrainState::Roaming,
                reaim_at: now + rng.random_range(SPAWN_REAIM_MS.0..=SPAWN_REAIM_MS.1),
                fire_ready_at: now
                    + rng.random_range(SPAWN_FIRE_READY_MS.0..=SPAWN_FIRE_READY_MS.1),
                speed: settings.player_speed * stats.speed_mod,
            }),
            pos,
            heading: crate::normalize_angle(heading),
            size: stats.size,
            health: stats.max_health,
            max_health: stats.max_health,
            ammo: settings.enemy_max_ammo,
            max_ammo: settings.enemy_max_ammo,
            last_shot_at: None,
            damage: stats.damage,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::square(self.pos, self.size)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn brain(&self) -> Option<&EnemyBrain> {
        match &self.kind {
            TankKind::Enemy(brain) => Some(brain),
            TankKind::Player => None,
        }
    }

    pub fn archetype(&self) -> Option<Archetype> {
        self.brain().map(|b| b.archetype)
    }

    /// Apply damage, clamping at zero. Returns true if this killed the tank.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.is_alive();
        self.health = (self.health - amount).max(0.0);
        was_alive && !self.is_alive()
    }

    /// Kill outright (hazards)
    pub fn destroy(&mut self) {
        self.health = 0.0;
    }

    /// Ammo left and cooldown elapsed
    pub fn can_fire(&self, now: u64, delay_ms: u64) -> bool {
        self.ammo > 0
            && self
                .last_shot_at
                .is_none_or(|t| now.saturating_sub(t) > delay_ms)
    }

    /// Consume a round and return the muzzle position
    pub fn take_shot(&mut self, now: u64) -> Vec2 {
        self.ammo = self.ammo.saturating_sub(1);
        self.last_shot_at = Some(now);
        self.pos + heading_vector(self.heading) * self.size * PROJECTILE_SPAWN_OFFSET
    }

    /// Restore the non-negativity invariants
    pub fn clamp_stats(&mut self) {
        self.health = self.health.clamp(0.0, self.max_health);
        self.ammo = self.ammo.min(self.max_ammo);
    }
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Displacement per tick
    pub vel: Vec2,
    pub heading: f32,
    pub damage: f32,
    pub side: Side,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, heading: f32, speed: f32, damage: f32, side: Side) -> Self {
        Self {
            id,
            pos,
            vel: heading_vector(heading) * speed,
            heading,
            damage,
            side,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::square(self.pos, PROJECTILE_SIZE)
    }
}

/// A shot waiting for an entity id
#[derive(Debug, Clone, Copy)]
pub struct ShotRequest {
    pub pos: Vec2,
    pub heading: f32,
    pub damage: f32,
    pub side: Side,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    AmmoRefill,
    HealthRestore,
}

/// A power-up entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: f32,
    pub spawned_at: u64,
}

impl PowerUp {
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::square(self.pos, self.size)
    }
}

/// One hazard circle of a bombardment episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BombardmentZone {
    pub center: Vec2,
    pub radius: f32,
    pub spawned_at: u64,
}

impl BombardmentZone {
    /// Center strictly inside the radius
    #[inline]
    pub fn covers(&self, p: Vec2) -> bool {
        self.center.distance_squared(p) < self.radius * self.radius
    }
}

/// What killed an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCause {
    Projectile,
    Bombardment,
    SafeZone,
}

/// Why the player lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefeatCause {
    /// Health reduced to zero by enemy fire
    Shot,
    /// Standing in an active bombardment zone
    Bombardment,
    /// Drained outside the safe circle
    SafeZone,
    /// Round time limit reached
    TimeExpired,
}

/// Terminal signal for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    /// Final wave cleared
    Victory,
    Defeat(DefeatCause),
}

/// Things that happened during a tick, for audio/particles/UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// Any destruction (projectile, tank, zone kill)
    Explosion { pos: Vec2 },
    ProjectileFired { side: Side, pos: Vec2 },
    TankDamaged { id: u32, health: f32 },
    EnemyDestroyed { archetype: Archetype, score: u64, cause: KillCause },
    PlayerDestroyed { cause: DefeatCause },
    PowerUpSpawned { kind: PowerUpKind, pos: Vec2 },
    PowerUpCollected { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    WaveStarted { wave: u32, target: u32 },
    WaveCleared { wave: u32 },
    BombardmentStarted { zones: u32, shortfall: u32 },
    BombardmentEnded,
    /// A bounded placement ran out of attempts
    PlacementSkipped { what: &'static str },
}

/// Monotonic entity ID source
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_id: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete state of one round
#[derive(Debug, Clone)]
pub struct RoundState {
    /// Round seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub rng: Pcg32,
    /// Walls and barriers (immutable once built)
    pub arena: Arena,
    pub player: Tank,
    /// Live enemies (sorted by id)
    pub enemies: Vec<Tank>,
    /// Live projectiles (sorted by id)
    pub projectiles: Vec<Projectile>,
    pub waves: WaveDirector,
    pub bombardment: BombardmentScheduler,
    pub powerups: PowerUpTimer,
    pub safe_zone: Option<SafeZone>,
    pub score: u64,
    pub outcome: Outcome,
    /// Clock time the round started
    pub started_at: u64,
    /// Clock time of the latest tick
    pub now: u64,
    /// Ticks processed
    pub time_ticks: u64,
    /// Pending events (drained by the embedding layer)
    pub events: Vec<GameEvent>,
    pub ids: IdAllocator,
}

impl RoundState {
    /// New round with a randomly generated arena
    pub fn new(seed: u64, settings: Settings, start: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let arena = Arena::generate(&settings, &mut rng);
        Self::build(seed, settings, arena, rng, start)
    }

    /// New round on a caller-supplied arena
    pub fn with_arena(seed: u64, settings: Settings, arena: Arena, start: u64) -> Self {
        let rng = Pcg32::seed_from_u64(seed);
        Self::build(seed, settings, arena, rng, start)
    }

    fn build(seed: u64, settings: Settings, arena: Arena, mut rng: Pcg32, start: u64) -> Self {
        let mut ids = IdAllocator::new();
        let player = Tank::player(ids.next(), arena.player_start, &settings);
        let safe_zone = settings
            .safe_zone
            .as_ref()
            .map(|zone| SafeZone::new(zone, &arena, &mut rng, start));

        log::info!(
            "Round {seed}: {} barriers, player at ({:.0}, {:.0})",
            arena.barriers().len(),
            player.pos.x,
            player.pos.y
        );

        Self {
            seed,
            waves: WaveDirector::new(start, &settings),
            bombardment: BombardmentScheduler::new(start, &settings),
            powerups: PowerUpTimer::new(start, &settings),
            safe_zone,
            settings,
            rng,
            arena,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            score: 0,
            outcome: Outcome::Ongoing,
            started_at: start,
            now: start,
            time_ticks: 0,
            events: Vec::new(),
            ids,
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::Ongoing
    }

    /// Kill the player and end the round (first cause wins)
    pub fn defeat(&mut self, cause: DefeatCause) {
        self.player.destroy();
        if self.outcome == Outcome::Ongoing {
            log::info!("Defeat: {cause:?} (score {})", self.score);
            self.outcome = Outcome::Defeat(cause);
            self.events.push(GameEvent::PlayerDestroyed { cause });
            self.events.push(GameEvent::Explosion {
                pos: self.player.pos,
            });
        }
    }

    pub fn victory(&mut self) {
        if self.outcome == Outcome::Ongoing {
            log::info!("Victory after wave {} (score {})", self.waves.wave, self.score);
            self.outcome = Outcome::Victory;
        }
    }

    /// Turn queued shots into projectiles
    pub fn spawn_shots(&mut self, shots: &[ShotRequest]) {
        let speed = self.settings.projectile_speed;
        for shot in shots {
            let id = self.ids.next();
            self.projectiles.push(Projectile::new(
                id,
                shot.pos,
                shot.heading,
                speed,
                shot.damage,
                shot.side,
            ));
            self.events.push(GameEvent::ProjectileFired {
                side: shot.side,
                pos: shot.pos,
            });
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
    }
}
