use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// Opaque host entity handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// World name as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub String);

impl WorldId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Spawnable entity kind discriminator, e.g. "sheep" or "snow_golem".
///
/// Kinds are host-defined strings; the controller never enumerates them,
/// it only compares them against configured whitelists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKind(pub String);

impl EntityKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Player-facing rendering: "snow_golem" becomes "snow golem".
    pub fn human(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host game mode of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

/// Read-only view of one entity at the moment of a spawn attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Kind-specific sub-variant (sheep color, rabbit breed). `None` for
    /// kinds without a meaningful discriminator.
    pub variant: Option<String>,
    pub pos: Position,
    /// Whether the entity counts toward the world mob population cap.
    pub mob: bool,
}

impl EntitySnapshot {
    pub fn new(id: EntityId, kind: EntityKind, pos: Position) -> Self {
        Self {
            id,
            kind,
            variant: None,
            pos,
            mob: true,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }
}

/// Read-only view of one connected player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: EntityId,
    pub name: String,
    pub pos: Position,
    pub game_mode: GameMode,
    /// Hosts clear this for AFK players so they stop justifying spawns.
    pub affects_spawning: bool,
}
