use serde::{Deserialize, Serialize};
use world_model::{EntityKind, WorldId};

/// Why, where, and when a player alert was issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedWarning {
    pub kind: EntityKind,
    pub world: WorldId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Issue time in seconds.
    pub time: u64,
}

/// Recently issued player alerts.
///
/// Serves two purposes: suppressing repeat alerts for the same farm, and
/// feeding the operator `list` command. Outdated entries are removed
/// lazily whenever the store is consulted, never by a background task.
#[derive(Debug, Default)]
pub struct WarningLog {
    entries: Vec<IssuedWarning>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<IssuedWarning>) -> Self {
        Self { entries }
    }

    /// Whether a fresh alert for this kind at this spot is authorized.
    ///
    /// Sweeps the whole store first, then suppresses if a surviving entry
    /// of the same kind and world lies within `warn_radius` blocks on
    /// both the x and z axis independently. Does not record: the caller
    /// records once the denial actually goes ahead.
    pub fn should_warn(
        &mut self,
        kind: &EntityKind,
        world: &WorldId,
        x: i32,
        z: i32,
        now: u64,
        warn_radius: f64,
        warn_timer: u64,
    ) -> bool {
        self.sweep(now, warn_timer);
        !self.entries.iter().any(|w| {
            w.kind == *kind
                && w.world == *world
                && (w.x - x).abs() as f64 <= warn_radius
                && (w.z - z).abs() as f64 <= warn_radius
        })
    }

    /// Remove entries older than `warn_timer`. Runs inline on every
    /// [`should_warn`](Self::should_warn); also usable as a periodic hook.
    pub fn sweep(&mut self, now: u64, warn_timer: u64) {
        self.entries
            .retain(|w| now.saturating_sub(w.time) <= warn_timer);
    }

    pub fn record(&mut self, warning: IssuedWarning) {
        self.entries.push(warning);
    }

    /// Read-only inspection for the operator surface; does not sweep.
    pub fn entries(&self) -> &[IssuedWarning] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
