//! Headless round runner
//!
//! Plays one round with a simple autopilot on a simulated 16 ms clock and
//! prints the result as JSON.
//!
//! Usage:
//!   tank-mayhem --seed 7 --ticks 20000 --settings tuning.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use serde::Serialize;

use tank_mayhem::Settings;
use tank_mayhem::sim::{GameEvent, Hud, Outcome, RoundState, TickInput, tick};

/// Simulated time per tick (ms)
const STEP_MS: u64 = 16;
/// Preferred engagement range of the autopilot
const ENGAGE_MIN: f32 = 150.0;
const ENGAGE_MAX: f32 = 250.0;

#[derive(Parser)]
#[command(name = "tank-mayhem")]
#[command(about = "Run a headless tank arena round and report the outcome")]
struct Args {
    /// Round seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Maximum ticks to simulate
    #[arg(long, default_value_t = 40_000)]
    ticks: u64,

    /// JSON settings file (missing fields use defaults)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print a snapshot line every N ticks (0 = never)
    #[arg(long, default_value_t = 0)]
    snapshot_every: u64,
}

#[derive(Serialize)]
struct Report {
    seed: u64,
    ticks: u64,
    time_ms: u64,
    outcome: Outcome,
    enemies_destroyed: u32,
    hud: Hud,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let mut state = RoundState::new(args.seed, settings, 0);
    let mut enemies_destroyed = 0;

    for step in 1..=args.ticks {
        let input = autopilot(&state);
        tick(&mut state, &input, step * STEP_MS);

        for event in state.drain_events() {
            if matches!(event, GameEvent::EnemyDestroyed { .. }) {
                enemies_destroyed += 1;
            }
            log::trace!("{event:?}");
        }

        if args.snapshot_every > 0 && step % args.snapshot_every == 0 {
            let line = serde_json::to_string(&state.snapshot()).context("snapshot serialization")?;
            println!("{line}");
        }
        if state.is_over() {
            break;
        }
    }

    let report = Report {
        seed: args.seed,
        ticks: state.time_ticks,
        time_ms: state.now,
        outcome: state.outcome,
        enemies_destroyed,
        hud: state.hud(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("report serialization")?
    );
    Ok(())
}

/// Dodge zones, grab pickups when needed, otherwise hold range and shoot
fn autopilot(state: &RoundState) -> TickInput {
    let me = state.player.pos;

    let target = state
        .enemies
        .iter()
        .min_by(|a, b| me.distance_squared(a.pos).total_cmp(&me.distance_squared(b.pos)))
        .map(|e| e.pos);

    let danger = state
        .bombardment
        .zones
        .iter()
        .find(|z| z.center.distance(me) < z.radius + state.player.size * 2.0);

    let wants_pickup = state.player.ammo < state.player.max_ammo / 3
        || state.player.health < state.player.max_health;

    let movement = if let Some(zone) = danger {
        (me - zone.center).normalize_or_zero()
    } else if let Some(pickup) = state.powerups.active.as_ref().filter(|_| wants_pickup) {
        (pickup.pos - me).normalize_or_zero()
    } else if let Some(enemy) = target {
        let distance = me.distance(enemy);
        if distance > ENGAGE_MAX {
            (enemy - me).normalize_or_zero()
        } else if distance < ENGAGE_MIN {
            (me - enemy).normalize_or_zero()
        } else {
            Vec2::ZERO
        }
    } else {
        Vec2::ZERO
    };

    TickInput {
        movement,
        aim: target,
        fire: target.is_some(),
    }
}
