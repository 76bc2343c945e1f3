//! Tank Mayhem - top-down arena tank combat
//!
//! Core modules:
//! - `sim`: Simulation core (movement, enemy AI, combat, waves, hazards)
//! - `settings`: Data-driven round tuning

pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Default game constants (the tunable ones are mirrored in `Settings`)
pub mod consts {
    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 1000.0;
    pub const ARENA_HEIGHT: f32 = 800.0;
    pub const BORDER_THICKNESS: f32 = 10.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 15.0;
    pub const PLAYER_SPEED: f32 = 1.0;
    pub const PLAYER_MAX_HEALTH: f32 = 3.0; // 3 hits from small/medium, 1 from large
    pub const PLAYER_MAX_AMMO: u32 = 30;
    pub const PLAYER_SHOT_DELAY_MS: u64 = 300;
    pub const PLAYER_DAMAGE: f32 = 1.0;

    /// Enemy defaults
    pub const ENEMY_MAX_AMMO: u32 = 30;
    pub const CHASE_DISTANCE: f32 = 100.0;
    pub const ENEMY_AIM_TOLERANCE_DEG: f32 = 10.0;
    pub const ENEMY_SHOT_DELAY_MS: u64 = 900;
    /// Lookahead distance as a factor of tank size
    pub const LOOKAHEAD_FACTOR: f32 = 1.3;
    pub const LOOKAHEAD_PROBE_SIZE: f32 = 4.0;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 3.0;
    pub const PROJECTILE_SIZE: f32 = 6.0;
    /// Spawn offset along the heading as a factor of tank size
    pub const PROJECTILE_SPAWN_OFFSET: f32 = 0.7;

    /// Barrier generation
    pub const BARRIER_COUNT: u32 = 25;
    pub const BARRIER_MIN_SIZE: f32 = 10.0;
    pub const BARRIER_MAX_SIZE: f32 = 70.0;
    pub const BARRIER_ATTEMPTS: u32 = 100;
    pub const BARRIER_PADDING_FACTOR: f32 = 2.0;
    pub const PLAYER_START_CLEARANCE_FACTOR: f32 = 4.0;
    /// Step used when nudging a blocked player start
    pub const PLAYER_NUDGE_STEP: f32 = 5.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest signed difference `a - b`, in [-π, π)
#[inline]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    normalize_angle(a - b)
}

/// Unit vector for a heading (radians, 0 = +X, screen coordinates)
#[inline]
pub fn heading_vector(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Heading from `from` toward `to`
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
