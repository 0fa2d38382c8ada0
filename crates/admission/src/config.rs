use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::density::{max_radius, DensityCheck};
use crate::error::ConfigError;

/// Breeding / player-driven spawn control.
///
/// Which causes and kinds participate moved around between deployments,
/// so the whitelists are configuration, not code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingSection {
    /// Density tiers, evaluated in declared order.
    pub checks: Vec<DensityCheck>,
    /// Player alert dedup radius in blocks (per-axis).
    pub warn_radius: f64,
    /// Player alert dedup window in seconds.
    pub warn_timer: u64,
    /// Spawn causes routed to the density check.
    pub causes: Vec<String>,
    /// Entity kinds subject to the density check.
    pub kinds: Vec<String>,
    /// Kinds density-checked even when the host reports its catch-all
    /// "default" cause.
    #[serde(default)]
    pub default_cause_kinds: Vec<String>,
    /// Kind groups counted as one population, regardless of variant.
    #[serde(default)]
    pub shared_groups: Vec<Vec<String>>,
}

impl BreedingSection {
    pub fn max_radius(&self) -> f64 {
        max_radius(&self.checks)
    }
}

impl Default for BreedingSection {
    fn default() -> Self {
        Self {
            checks: vec![
                DensityCheck { radius: 8.0, limit: 5 },
                DensityCheck { radius: 32.0, limit: 24 },
            ],
            warn_radius: 64.0,
            warn_timer: 300,
            causes: vec![
                "breeding".into(),
                "dispense_egg".into(),
                "egg".into(),
                "build_irongolem".into(),
                "build_snowman".into(),
            ],
            kinds: vec![
                "axolotl".into(),
                "bee".into(),
                "cat".into(),
                "chicken".into(),
                "cow".into(),
                "fox".into(),
                "frog".into(),
                "goat".into(),
                "iron_golem".into(),
                "llama".into(),
                "mooshroom".into(),
                "ocelot".into(),
                "panda".into(),
                "pig".into(),
                "rabbit".into(),
                "sheep".into(),
                "snow_golem".into(),
                "tadpole".into(),
                "turtle".into(),
                "villager".into(),
                "wolf".into(),
            ],
            default_cause_kinds: vec!["tadpole".into()],
            shared_groups: vec![vec!["frog".into(), "tadpole".into()]],
        }
    }
}

/// One environmental cause: the spawn is allowed only while a qualifying
/// player is within `player_range` blocks of the spawn point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentRule {
    pub cause: String,
    pub player_range: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSection {
    pub rules: Vec<EnvironmentRule>,
}

impl EnvironmentSection {
    pub fn rule_for(&self, cause: &str) -> Option<&EnvironmentRule> {
        self.rules.iter().find(|r| r.cause == cause)
    }
}

impl Default for EnvironmentSection {
    fn default() -> Self {
        let range64 = [
            "village_defense",
            "nether_portal",
            "beehive",
            "patrol",
            "metamorphosis",
            "phantom",
        ];
        let mut rules: Vec<EnvironmentRule> = range64
            .iter()
            .map(|cause| EnvironmentRule {
                cause: (*cause).into(),
                player_range: 64.0,
            })
            .collect();
        // Spawner blocks only require a player inside their activation range.
        rules.push(EnvironmentRule {
            cause: "spawner".into(),
            player_range: 16.0,
        });
        Self { rules }
    }
}

/// Per-world natural spawn rule. The entry named "default" is the
/// fallback for worlds without their own entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldRule {
    pub name: String,
    pub enabled: bool,
    /// Square chunk neighborhood radius scanned around the spawn chunk.
    pub chunk_radius: i32,
    /// Deny natural spawns while the scanned mob count exceeds this.
    pub mob_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaturalSection {
    pub causes: Vec<String>,
    /// Below this tick rate the probabilistic throttle engages.
    pub tps_threshold: f64,
    /// Fraction of natural spawns allowed through while throttled.
    pub low_tps_spawn_chance: f64,
    pub worlds: Vec<WorldRule>,
}

impl NaturalSection {
    /// Resolve the rule for a world: exact name first, then "default".
    /// `None` means the world is unthrottled.
    pub fn rule_for(&self, world: &str) -> Option<&WorldRule> {
        self.worlds
            .iter()
            .find(|w| w.name == world)
            .or_else(|| self.worlds.iter().find(|w| w.name == "default"))
    }
}

impl Default for NaturalSection {
    fn default() -> Self {
        Self {
            causes: vec!["natural".into()],
            tps_threshold: 16.0,
            low_tps_spawn_chance: 0.1,
            worlds: vec![WorldRule {
                name: "default".into(),
                enabled: true,
                chunk_radius: 3,
                mob_limit: 80,
            }],
        }
    }
}

/// Pathfinding throttle for crowd mobs while the server is lagging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathfindSection {
    pub kinds: Vec<String>,
    pub tps_threshold: f64,
    /// Fraction of pathfinding requests allowed through while throttled.
    pub pass_chance: f64,
}

impl Default for PathfindSection {
    fn default() -> Self {
        Self {
            kinds: vec![
                "chicken".into(),
                "cow".into(),
                "pig".into(),
                "sheep".into(),
                "villager".into(),
                "cod".into(),
                "salmon".into(),
                "tropical_fish".into(),
            ],
            tps_threshold: 17.0,
            pass_chance: 0.05,
        }
    }
}

/// Complete controller configuration.
///
/// All four sections must be present in the file; a missing or malformed
/// section fails the whole load so a reload can never leave a partially
/// applied mix of old and new settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    pub breeding: BreedingSection,
    pub environment: EnvironmentSection,
    pub natural: NaturalSection,
    pub pathfind: PathfindSection,
}

impl GuardConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for check in &self.breeding.checks {
            if !(check.radius > 0.0) {
                return Err(invalid(format!(
                    "breeding check radius must be positive, got {}",
                    check.radius
                )));
            }
            if check.limit == 0 {
                return Err(invalid("breeding check limit must be positive"));
            }
        }
        if !(self.breeding.warn_radius > 0.0) {
            return Err(invalid("breeding.warn_radius must be positive"));
        }
        if self.breeding.warn_timer == 0 {
            return Err(invalid("breeding.warn_timer must be positive"));
        }
        for group in &self.breeding.shared_groups {
            if group.len() < 2 {
                return Err(invalid("breeding.shared_groups entries need at least two kinds"));
            }
        }
        for rule in &self.environment.rules {
            if !(rule.player_range > 0.0) {
                return Err(invalid(format!(
                    "environment rule '{}' player_range must be positive",
                    rule.cause
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.natural.low_tps_spawn_chance) {
            return Err(invalid("natural.low_tps_spawn_chance must be within 0..=1"));
        }
        if !self.natural.tps_threshold.is_finite() || self.natural.tps_threshold < 0.0 {
            return Err(invalid("natural.tps_threshold must be a non-negative number"));
        }
        let defaults = self
            .natural
            .worlds
            .iter()
            .filter(|w| w.name == "default")
            .count();
        if defaults > 1 {
            return Err(invalid("natural.worlds may name at most one \"default\" entry"));
        }
        for (i, world) in self.natural.worlds.iter().enumerate() {
            if self.natural.worlds[..i].iter().any(|w| w.name == world.name) {
                return Err(invalid(format!("duplicate natural world entry '{}'", world.name)));
            }
            if world.chunk_radius < 0 {
                return Err(invalid(format!(
                    "natural world '{}' chunk_radius must not be negative",
                    world.name
                )));
            }
            if world.mob_limit == 0 {
                return Err(invalid(format!(
                    "natural world '{}' mob_limit must be positive",
                    world.name
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.pathfind.pass_chance) {
            return Err(invalid("pathfind.pass_chance must be within 0..=1"));
        }
        if !self.pathfind.tps_threshold.is_finite() || self.pathfind.tps_threshold < 0.0 {
            return Err(invalid("pathfind.tps_threshold must be a non-negative number"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}
