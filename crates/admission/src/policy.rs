use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use world_model::{EntityKind, EntitySnapshot, GameMode, WorldView};

use crate::alert::{emit_denial, AlertSink};
use crate::chunk_cache::ChunkDensityCache;
use crate::config::GuardConfig;
use crate::density;
use crate::monitor::TpsMonitor;
use crate::warnings::{IssuedWarning, WarningLog};

/// Host cause name for catch-all spawns without a specific reason.
const DEFAULT_CAUSE: &str = "default";
/// Cause name under which the host reports pathfinding requests.
const PATHFIND_CAUSE: &str = "pathfind";

/// One incoming spawn (or pathfinding) attempt. Ephemeral: built by the
/// host adapter per event, read once, never stored.
#[derive(Debug, Clone)]
pub struct SpawnAttempt {
    /// Host spawn cause name, e.g. "breeding", "natural", "spawner".
    pub cause: String,
    pub entity: EntitySnapshot,
}

impl SpawnAttempt {
    pub fn new(cause: impl Into<String>, entity: EntitySnapshot) -> Self {
        Self {
            cause: cause.into(),
            entity,
        }
    }
}

/// Routing decision for one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnCategory {
    Breeding,
    Environmental { player_range: f64 },
    Natural,
    Pathfind,
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DenyReason {
    /// A breeding density tier was violated.
    Crowded { radius: f64, limit: u32 },
    /// No qualifying player near an environmental spawn.
    NoActivePlayer,
    /// Probabilistic low-TPS throttle.
    LowTickRate,
    /// Natural spawn over the per-world chunk mob limit.
    ChunkCrowded { count: u32, limit: u32 },
}

/// The controller's answer. The host adapter performs the actual event
/// cancellation on `Deny`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_denied(&self) -> bool {
        matches!(self, Verdict::Deny(_))
    }
}

/// Decision tallies for the operator `info` dump. Reset on a periodic
/// cadence by the embedding.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Counters {
    pub attempts: u64,
    pub passthrough: u64,
    pub breeding_denied: u64,
    pub environment_denied: u64,
    pub natural_denied: u64,
    pub pathfind_denied: u64,
    pub warnings_issued: u64,
}

/// Whitelist lookups compiled from config so classification of the vast
/// majority of attempts (not subject to any control) is a couple of set
/// probes with no spatial work.
#[derive(Debug, Default)]
struct ClassifierIndex {
    breeding_causes: BTreeSet<String>,
    breeding_kinds: BTreeSet<String>,
    default_cause_kinds: BTreeSet<String>,
    environment_ranges: BTreeMap<String, f64>,
    natural_causes: BTreeSet<String>,
    pathfind_kinds: BTreeSet<String>,
}

impl ClassifierIndex {
    fn build(config: &GuardConfig) -> Self {
        Self {
            breeding_causes: config.breeding.causes.iter().cloned().collect(),
            breeding_kinds: config.breeding.kinds.iter().cloned().collect(),
            default_cause_kinds: config.breeding.default_cause_kinds.iter().cloned().collect(),
            environment_ranges: config
                .environment
                .rules
                .iter()
                .map(|r| (r.cause.clone(), r.player_range))
                .collect(),
            natural_causes: config.natural.causes.iter().cloned().collect(),
            pathfind_kinds: config.pathfind.kinds.iter().cloned().collect(),
        }
    }

    fn classify(&self, cause: &str, kind: &EntityKind) -> SpawnCategory {
        if self.breeding_causes.contains(cause) {
            if self.breeding_kinds.contains(kind.as_str()) {
                return SpawnCategory::Breeding;
            }
            return SpawnCategory::Passthrough;
        }
        if cause == DEFAULT_CAUSE && self.default_cause_kinds.contains(kind.as_str()) {
            return SpawnCategory::Breeding;
        }
        if let Some(range) = self.environment_ranges.get(cause) {
            return SpawnCategory::Environmental {
                player_range: *range,
            };
        }
        if self.natural_causes.contains(cause) {
            return SpawnCategory::Natural;
        }
        if cause == PATHFIND_CAUSE {
            if self.pathfind_kinds.contains(kind.as_str()) {
                return SpawnCategory::Pathfind;
            }
            return SpawnCategory::Passthrough;
        }
        SpawnCategory::Passthrough
    }
}

/// The admission decision core.
///
/// Owns all cross-attempt state explicitly: active config, warning log,
/// chunk density cache, counters, and the RNG behind the probabilistic
/// throttles. One instance is constructed at startup and handed to the
/// host adapter; there are no ambient singletons.
pub struct AdmissionPolicy {
    config: GuardConfig,
    index: ClassifierIndex,
    tps: Arc<TpsMonitor>,
    warnings: WarningLog,
    chunk_cache: ChunkDensityCache,
    counters: Counters,
    rng: ChaCha8Rng,
}

impl AdmissionPolicy {
    pub fn new(config: GuardConfig, tps: Arc<TpsMonitor>) -> Self {
        Self::build(config, tps, ChaCha8Rng::from_entropy())
    }

    /// Deterministic variant for tests and the simulation harness.
    pub fn with_seed(config: GuardConfig, tps: Arc<TpsMonitor>, seed: u64) -> Self {
        Self::build(config, tps, ChaCha8Rng::seed_from_u64(seed))
    }

    fn build(config: GuardConfig, tps: Arc<TpsMonitor>, rng: ChaCha8Rng) -> Self {
        Self {
            index: ClassifierIndex::build(&config),
            config,
            tps,
            warnings: WarningLog::new(),
            chunk_cache: ChunkDensityCache::new(),
            counters: Counters::default(),
            rng,
        }
    }

    /// Decide one attempt. `now` is the current time in seconds.
    pub fn admit<W: WorldView, S: AlertSink>(
        &mut self,
        world: &W,
        sink: &mut S,
        attempt: &SpawnAttempt,
        now: u64,
    ) -> Verdict {
        self.counters.attempts += 1;
        match self.index.classify(&attempt.cause, &attempt.entity.kind) {
            SpawnCategory::Passthrough => {
                self.counters.passthrough += 1;
                Verdict::Allow
            }
            SpawnCategory::Breeding => self.check_breeding(world, sink, attempt, now),
            SpawnCategory::Environmental { player_range } => {
                self.check_environment(world, attempt, player_range)
            }
            SpawnCategory::Natural => self.check_natural(world, attempt, now),
            SpawnCategory::Pathfind => self.check_pathfind(),
        }
    }

    fn check_breeding<W: WorldView, S: AlertSink>(
        &mut self,
        world: &W,
        sink: &mut S,
        attempt: &SpawnAttempt,
        now: u64,
    ) -> Verdict {
        let origin = attempt.entity.pos;
        // One spatial query bounded by the widest tier, filtered down to
        // the candidate's population.
        let nearby: Vec<EntitySnapshot> = world
            .entities_within(origin, self.config.breeding.max_radius())
            .into_iter()
            .filter(|e| density::same_group(&self.config.breeding, &attempt.entity, e))
            .collect();
        let Some(check) =
            density::evaluate(origin, attempt.entity.id, &nearby, &self.config.breeding.checks)
        else {
            return Verdict::Allow;
        };
        let (radius, limit) = (check.radius, check.limit);
        self.counters.breeding_denied += 1;

        let block = origin.block();
        let authorized = self.warnings.should_warn(
            &attempt.entity.kind,
            world.id(),
            block.x,
            block.z,
            now,
            self.config.breeding.warn_radius,
            self.config.breeding.warn_timer,
        );
        if authorized {
            self.warnings.record(IssuedWarning {
                kind: attempt.entity.kind.clone(),
                world: world.id().clone(),
                x: block.x,
                y: block.y,
                z: block.z,
                time: now,
            });
            self.counters.warnings_issued += 1;
            emit_denial(
                world,
                sink,
                &attempt.entity.kind,
                block,
                self.config.breeding.warn_radius,
                radius,
                limit,
            );
        } else {
            tracing::debug!(
                kind = %attempt.entity.kind,
                world = %world.id(),
                at = %block,
                "breeding spawn denied, alert suppressed"
            );
        }
        Verdict::Deny(DenyReason::Crowded { radius, limit })
    }

    fn check_environment<W: WorldView>(
        &mut self,
        world: &W,
        attempt: &SpawnAttempt,
        player_range: f64,
    ) -> Verdict {
        let origin = attempt.entity.pos;
        let justified = world.players().iter().any(|p| {
            p.game_mode != GameMode::Spectator
                && p.affects_spawning
                && (p.pos.x - origin.x).abs() <= player_range
                && (p.pos.y - origin.y).abs() <= player_range
                && (p.pos.z - origin.z).abs() <= player_range
        });
        if justified {
            Verdict::Allow
        } else {
            self.counters.environment_denied += 1;
            Verdict::Deny(DenyReason::NoActivePlayer)
        }
    }

    fn check_natural<W: WorldView>(&mut self, world: &W, attempt: &SpawnAttempt, now: u64) -> Verdict {
        let tps = self.tps.current();
        if tps < self.config.natural.tps_threshold {
            // Lagging already: mostly deny without paying for a density
            // scan, let a small fraction through.
            if self.rng.gen::<f64>() < self.config.natural.low_tps_spawn_chance {
                return Verdict::Allow;
            }
            self.counters.natural_denied += 1;
            return Verdict::Deny(DenyReason::LowTickRate);
        }
        let Some(rule) = self.config.natural.rule_for(world.id().as_str()) else {
            return Verdict::Allow;
        };
        if !rule.enabled {
            return Verdict::Allow;
        }
        let chunk = attempt.entity.pos.block().chunk();
        let count = self
            .chunk_cache
            .count_or_cached(world, chunk, rule, now, |e| e.mob);
        if count > rule.mob_limit {
            self.counters.natural_denied += 1;
            tracing::debug!(
                world = %world.id(),
                chunk_x = chunk.x,
                chunk_z = chunk.z,
                count,
                limit = rule.mob_limit,
                "natural spawn denied, chunk over mob limit"
            );
            return Verdict::Deny(DenyReason::ChunkCrowded {
                count,
                limit: rule.mob_limit,
            });
        }
        Verdict::Allow
    }

    fn check_pathfind(&mut self) -> Verdict {
        if self.tps.current() >= self.config.pathfind.tps_threshold {
            return Verdict::Allow;
        }
        if self.rng.gen::<f64>() < self.config.pathfind.pass_chance {
            return Verdict::Allow;
        }
        self.counters.pathfind_denied += 1;
        Verdict::Deny(DenyReason::LowTickRate)
    }

    /// Swap in a new validated config wholesale. The chunk cache is
    /// dropped with it: trusted-deny counts recorded under the old
    /// limits must not outlive them.
    pub fn reload(&mut self, config: GuardConfig) {
        self.index = ClassifierIndex::build(&config);
        self.config = config;
        self.chunk_cache.clear();
        tracing::info!("configuration replaced");
    }

    /// Periodic-timer hook: sweep expired cache and warning entries.
    pub fn sweep(&mut self, now: u64) {
        self.chunk_cache.sweep(now);
        self.warnings.sweep(now, self.config.breeding.warn_timer);
    }

    /// Periodic-timer hook.
    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn current_tps(&self) -> f64 {
        self.tps.current()
    }

    pub fn warnings(&self) -> &WarningLog {
        &self.warnings
    }

    /// Replace the warning log, e.g. from a snapshot loaded at startup.
    pub fn restore_warnings(&mut self, entries: Vec<IssuedWarning>) {
        self.warnings = WarningLog::from_entries(entries);
    }
}
