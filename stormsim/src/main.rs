//! Synthetic spawn-storm harness.
//!
//! Drives the admission policy against an in-memory world: a sheep farm
//! that keeps breeding, a mob-packed chunk feeding natural spawn
//! attempts, and a tick rate that collapses mid-run. Useful for eyeballing
//! verdict mix, alert dedup, and the warning snapshot round trip without
//! a game server attached.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::{fmt, EnvFilter};

use admission::alert::AlertSink;
use admission::{ops, snapshot, AdmissionPolicy, GuardConfig, SpawnAttempt, TpsMonitor};
use world_model::{
    EntityId, EntityKind, EntitySnapshot, GameMode, PlayerSnapshot, Position, SimWorld,
};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

struct SimOptions {
    config_path: PathBuf,
    state_path: PathBuf,
    ticks: u64,
    seed: u64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("guard.toml"),
            state_path: PathBuf::from("data/warnings.bin"),
            ticks: 900,
            seed: 1,
        }
    }
}

/// Parse CLI arguments.
/// Supports: --config <path> --state <path> --ticks <n> --seed <n>
fn parse_cli_args() -> SimOptions {
    let args: Vec<String> = std::env::args().collect();
    let mut options = SimOptions::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if !["--config", "--state", "--ticks", "--seed"].contains(&flag) {
            eprintln!("Unknown argument: {}", flag);
            std::process::exit(1);
        }
        let value = match args.get(i + 1) {
            Some(v) => v.as_str(),
            None => {
                eprintln!("{} requires a value", flag);
                std::process::exit(1);
            }
        };
        match flag {
            "--config" => options.config_path = PathBuf::from(value),
            "--state" => options.state_path = PathBuf::from(value),
            "--ticks" => match value.parse() {
                Ok(n) => options.ticks = n,
                Err(_) => {
                    eprintln!("--ticks expects a number");
                    std::process::exit(1);
                }
            },
            _ => match value.parse() {
                Ok(n) => options.seed = n,
                Err(_) => {
                    eprintln!("--seed expects a number");
                    std::process::exit(1);
                }
            },
        }
        i += 2;
    }
    options
}

/// Alert delivery for the simulation: player messages land in the log.
struct LogSink;

impl AlertSink for LogSink {
    fn message(&mut self, player: EntityId, text: &str) {
        tracing::info!(player = %player, "{}", text);
    }

    fn audible_cue(&mut self, player: EntityId, at: Position) {
        tracing::debug!(player = %player, x = at.x, z = at.z, "alert cue");
    }
}

fn build_world() -> SimWorld {
    let mut world = SimWorld::new("overworld");

    // One shepherd near the farm, one AFK player parked by the packed
    // chunk who no longer justifies spawns.
    world.insert_player(PlayerSnapshot {
        id: EntityId(1),
        name: "shepherd".into(),
        pos: Position::new(12.0, 64.0, 12.0),
        game_mode: GameMode::Survival,
        affects_spawning: true,
    });
    world.insert_player(PlayerSnapshot {
        id: EntityId(2),
        name: "afk".into(),
        pos: Position::new(210.0, 64.0, 210.0),
        game_mode: GameMode::Survival,
        affects_spawning: false,
    });

    // A chunk already packed with mobs, far from the farm.
    for i in 0..120u64 {
        world.insert_entity(EntitySnapshot::new(
            EntityId(10_000 + i),
            EntityKind::new("zombie"),
            Position::new(200.0 + (i % 16) as f64, 64.0, 200.0 + (i / 16) as f64),
        ));
    }
    world
}

/// Piecewise tick-rate curve: healthy, collapsing, recovering.
fn tick_rate(tick: u64, total: u64) -> f64 {
    let phase = tick as f64 / total.max(1) as f64;
    if phase < 0.33 {
        19.8
    } else if phase < 0.66 {
        14.0
    } else {
        18.5
    }
}

fn main() {
    init_logging();
    let options = parse_cli_args();

    let config = if options.config_path.exists() {
        match GuardConfig::load(&options.config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        tracing::info!(path = %options.config_path.display(), "no config file, using defaults");
        GuardConfig::default()
    };

    let tps = Arc::new(TpsMonitor::new());
    let mut policy = AdmissionPolicy::with_seed(config, Arc::clone(&tps), options.seed);

    // Pick up warnings from the previous run, if any.
    match snapshot::load_warnings(&options.state_path) {
        Ok(entries) => {
            tracing::info!(entries = entries.len(), "restored warning log");
            policy.restore_warnings(entries);
        }
        Err(e) => tracing::debug!(error = %e, "no previous warning log"),
    }

    let start = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut world = build_world();
    let mut sink = LogSink;
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed ^ 0x5701);
    let mut next_entity = 50_000u64;

    for tick in 0..options.ticks {
        let now = start + tick;
        tps.sample(tick_rate(tick, options.ticks));

        // A handful of spawn attempts per simulated second.
        for _ in 0..4 {
            let attempt = match rng.gen_range(0..10u32) {
                // The farm keeps breeding white sheep at one spot.
                0..=2 => {
                    let candidate = EntitySnapshot::new(
                        EntityId(next_entity),
                        EntityKind::new("sheep"),
                        Position::new(8.0 + rng.gen_range(-2.0..2.0), 64.0, 8.0),
                    )
                    .with_variant("white");
                    world.insert_entity(candidate.clone());
                    SpawnAttempt::new("breeding", candidate)
                }
                // Natural pressure out of the packed chunk.
                3..=6 => SpawnAttempt::new(
                    "natural",
                    EntitySnapshot::new(
                        EntityId(next_entity),
                        EntityKind::new("zombie"),
                        Position::new(203.0, 64.0, 205.0),
                    ),
                ),
                7 => SpawnAttempt::new(
                    "spawner",
                    EntitySnapshot::new(
                        EntityId(next_entity),
                        EntityKind::new("skeleton"),
                        Position::new(215.0, 64.0, 215.0),
                    ),
                ),
                8 => SpawnAttempt::new(
                    "pathfind",
                    EntitySnapshot::new(
                        EntityId(next_entity),
                        EntityKind::new("sheep"),
                        Position::new(8.0, 64.0, 8.0),
                    ),
                ),
                _ => SpawnAttempt::new(
                    "lightning",
                    EntitySnapshot::new(
                        EntityId(next_entity),
                        EntityKind::new("witch"),
                        Position::new(50.0, 64.0, 50.0),
                    ),
                ),
            };
            let breeding = attempt.cause == "breeding";
            let denied = policy.admit(&world, &mut sink, &attempt, now).is_denied();
            if breeding && denied {
                // Cancelled spawn: take the candidate back out.
                world.remove_entity(attempt.entity.id);
            }
            next_entity += 1;
        }

        if tick > 0 && tick % 60 == 0 {
            policy.sweep(now);
            let c = policy.counters();
            tracing::info!(
                tick,
                tps = tps.current(),
                attempts = c.attempts,
                passthrough = c.passthrough,
                breeding_denied = c.breeding_denied,
                environment_denied = c.environment_denied,
                natural_denied = c.natural_denied,
                pathfind_denied = c.pathfind_denied,
                warnings = c.warnings_issued,
                entities = world.entity_count(),
                "storm progress"
            );
        }
    }

    let end = start + options.ticks;
    for command in ["info", "list"] {
        match ops::handle_command(&mut policy, &options.config_path, command, end) {
            Ok(out) => println!("== {} ==\n{}", command, out),
            Err(e) => eprintln!("{}: {}", command, e),
        }
    }

    if let Err(e) = snapshot::save_warnings(&options.state_path, policy.warnings()) {
        tracing::warn!(error = %e, "failed to save warning log");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn tick_rate_curve_phases() {
        assert_eq!(tick_rate(0, 900), 19.8);
        assert_eq!(tick_rate(450, 900), 14.0);
        assert_eq!(tick_rate(899, 900), 18.5);
    }

    #[test]
    fn default_options() {
        let options = SimOptions::default();
        assert_eq!(options.ticks, 900);
        assert_eq!(options.config_path, Path::new("guard.toml"));
    }
}
