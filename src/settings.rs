//! Round tuning
//!
//! Every balance knob of a round lives here. Files are JSON; missing fields
//! fall back to the defaults, so a file only needs the values it changes.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Failure to load or validate a settings file
#[derive(Debug)]
pub enum SettingsError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read settings {}: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "malformed settings json: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid setting `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Wave director pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSettings {
    /// Clearing this wave wins the round
    pub max_waves: u32,
    /// Floor on the per-wave enemy count
    pub min_enemies: u32,
    pub first_wave_delay_ms: u64,
    pub inter_wave_delay_ms: u64,
    /// Delay between two successful spawns
    pub spawn_interval_ms: u64,
    /// Delay before retrying after a failed edge placement
    pub spawn_retry_ms: u64,
    pub spawn_attempts: u32,
    /// Edge spawns closer than this to the player are rejected
    pub min_player_distance: f32,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            max_waves: 10,
            min_enemies: 10,
            first_wave_delay_ms: 3_000,
            inter_wave_delay_ms: 5_000,
            spawn_interval_ms: 600,
            spawn_retry_ms: 100,
            spawn_attempts: 50,
            min_player_distance: 150.0,
        }
    }
}

/// Area-denial (bombardment) episodes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BombardmentSettings {
    /// Nominal zones per episode (an episode may place fewer)
    pub zone_count: u32,
    pub zone_radius: f32,
    /// Minimum center distance between zones, as a factor of the radius
    pub spacing_factor: f32,
    pub active_ms: u64,
    /// Measured from the end of the previous episode
    pub cooldown_ms: u64,
    pub first_episode_ms: u64,
    /// Zone centers are drawn this fraction away from each interior edge
    pub inset_fraction: f32,
    /// Placement attempts for the whole batch
    pub attempts: u32,
}

impl Default for BombardmentSettings {
    fn default() -> Self {
        Self {
            zone_count: 5,
            zone_radius: 40.0,
            spacing_factor: 1.5,
            active_ms: 5_000,
            cooldown_ms: 15_000,
            first_episode_ms: 20_000,
            inset_fraction: 0.15,
            attempts: 100,
        }
    }
}

/// Power-up timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpSettings {
    pub size: f32,
    pub first_spawn_ms: u64,
    /// Respawn delay after collection or expiry
    pub respawn_ms: u64,
    pub lifespan_ms: u64,
    /// Delay before retrying after a failed placement
    pub retry_ms: u64,
    pub attempts: u32,
}

impl Default for PowerUpSettings {
    fn default() -> Self {
        Self {
            size: 18.0,
            first_spawn_ms: 8_000,
            respawn_ms: 30_000,
            lifespan_ms: 20_000,
            retry_ms: 5_000,
            attempts: 100,
        }
    }
}

/// Shrinking safe circle with a round time limit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeZoneSettings {
    pub duration_ms: u64,
    /// Starting radius as a factor of half the arena diagonal
    pub start_radius_factor: f32,
    pub end_radius: f32,
    /// Player health lost per tick spent outside
    pub drain_per_tick: f32,
    /// Center is drawn this fraction away from each arena edge
    pub center_inset_fraction: f32,
}

impl Default for SafeZoneSettings {
    fn default() -> Self {
        Self {
            duration_ms: 120_000,
            start_radius_factor: 1.1,
            end_radius: PLAYER_SIZE * 5.0,
            drain_per_tick: 0.05,
            center_inset_fraction: 0.15,
        }
    }
}

/// Complete round tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    pub border_thickness: f32,
    pub barrier_count: u32,
    pub barrier_min_size: f32,
    pub barrier_max_size: f32,
    pub barrier_attempts: u32,

    // === Player ===
    pub player_speed: f32,
    pub player_max_health: f32,
    pub player_max_ammo: u32,
    pub player_shot_delay_ms: u64,

    // === Enemies ===
    pub enemy_max_ammo: u32,
    /// Roaming enemies closer than this to the player start chasing
    pub chase_distance: f32,
    pub aim_tolerance_deg: f32,
    pub enemy_shot_delay_ms: u64,

    // === Projectiles ===
    pub projectile_speed: f32,

    pub waves: WaveSettings,
    pub bombardment: BombardmentSettings,
    pub powerups: PowerUpSettings,
    /// Disabled unless present
    pub safe_zone: Option<SafeZoneSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            border_thickness: BORDER_THICKNESS,
            barrier_count: BARRIER_COUNT,
            barrier_min_size: BARRIER_MIN_SIZE,
            barrier_max_size: BARRIER_MAX_SIZE,
            barrier_attempts: BARRIER_ATTEMPTS,

            player_speed: PLAYER_SPEED,
            player_max_health: PLAYER_MAX_HEALTH,
            player_max_ammo: PLAYER_MAX_AMMO,
            player_shot_delay_ms: PLAYER_SHOT_DELAY_MS,

            enemy_max_ammo: ENEMY_MAX_AMMO,
            chase_distance: CHASE_DISTANCE,
            aim_tolerance_deg: ENEMY_AIM_TOLERANCE_DEG,
            enemy_shot_delay_ms: ENEMY_SHOT_DELAY_MS,

            projectile_speed: PROJECTILE_SPEED,

            waves: WaveSettings::default(),
            bombardment: BombardmentSettings::default(),
            powerups: PowerUpSettings::default(),
            safe_zone: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty JSON (for writing a starter file)
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject combinations the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
            SettingsError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        // The interior must fit the largest tank with room to move
        let min_side = 2.0 * self.border_thickness + 4.0 * PLAYER_SIZE;
        if self.arena_width < min_side || self.arena_height < min_side {
            return Err(invalid(
                "arena_width/arena_height",
                format!("arena must be at least {min_side} on each side"),
            ));
        }
        if self.border_thickness < 0.0 {
            return Err(invalid("border_thickness", "must not be negative"));
        }
        if self.barrier_min_size <= 0.0 || self.barrier_min_size > self.barrier_max_size {
            return Err(invalid(
                "barrier_min_size",
                "must be positive and not larger than barrier_max_size",
            ));
        }
        if self.player_max_health <= 0.0 {
            return Err(invalid("player_max_health", "must be positive"));
        }
        if self.player_speed <= 0.0 || self.projectile_speed <= 0.0 {
            return Err(invalid("player_speed/projectile_speed", "must be positive"));
        }
        if self.waves.max_waves == 0 {
            return Err(invalid("waves.max_waves", "at least one wave is required"));
        }
        if self.bombardment.zone_radius <= 0.0 {
            return Err(invalid("bombardment.zone_radius", "must be positive"));
        }
        if !(0.0..0.5).contains(&self.bombardment.inset_fraction) {
            return Err(invalid("bombardment.inset_fraction", "must be in [0, 0.5)"));
        }
        if self.powerups.size <= 0.0 {
            return Err(invalid("powerups.size", "must be positive"));
        }
        if let Some(zone) = &self.safe_zone {
            if zone.duration_ms == 0 {
                return Err(invalid("safe_zone.duration_ms", "must be positive"));
            }
            if !(0.0..0.5).contains(&zone.center_inset_fraction) {
                return Err(invalid("safe_zone.center_inset_fraction", "must be in [0, 0.5)"));
            }
        }
        Ok(())
    }

    /// Aim tolerance in radians
    pub fn aim_tolerance(&self) -> f32 {
        self.aim_tolerance_deg.to_radians()
    }
}
