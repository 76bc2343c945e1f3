//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clock time is passed in, never read
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod ai;
pub mod arena;
pub mod bombardment;
pub mod collision;
pub mod combat;
pub mod geometry;
pub mod powerup;
pub mod safe_zone;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod waves;

pub use arena::Arena;
pub use bombardment::{BombardmentPhase, BombardmentScheduler};
pub use collision::{MoveResult, resolve_move};
pub use geometry::Aabb;
pub use powerup::PowerUpTimer;
pub use safe_zone::SafeZone;
pub use snapshot::{EntityKind, EntityView, Hud, Snapshot};
pub use state::{
    Archetype, ArchetypeStats, BombardmentZone, BrainState, DefeatCause, EnemyBrain, GameEvent,
    KillCause, Outcome, PowerUp, PowerUpKind, Projectile, RoundState, Side, Tank, TankKind,
};
pub use tick::{TickInput, tick};
pub use waves::{WaveDirector, WavePhase, fibonacci, target_enemy_count};
