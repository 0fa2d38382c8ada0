use serde::{Deserialize, Serialize};
use world_model::{EntityId, EntitySnapshot, Position};

use crate::config::BreedingSection;

/// One configured density tier: deny once `limit` equivalent entities sit
/// within `radius` of the spawn point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityCheck {
    pub radius: f64,
    pub limit: u32,
}

/// Largest configured tier radius; bounds the single spatial query.
pub fn max_radius(checks: &[DensityCheck]) -> f64 {
    checks.iter().map(|c| c.radius).fold(0.0, f64::max)
}

/// Whether two entities count toward the same population.
///
/// A configured shared group (e.g. frog + tadpole) matches across kinds
/// and ignores variants. Otherwise kinds must be equal, and so must the
/// sub-variant: a white sheep and a black sheep are separate populations.
pub fn same_group(breeding: &BreedingSection, a: &EntitySnapshot, b: &EntitySnapshot) -> bool {
    for group in &breeding.shared_groups {
        if group.iter().any(|k| k == a.kind.as_str()) {
            return group.iter().any(|k| k == b.kind.as_str());
        }
    }
    a.kind == b.kind && a.variant == b.variant
}

/// Evaluate the configured tiers against a neighborhood.
///
/// `nearby` is the result of one spatial query bounded by
/// [`max_radius`]; the candidate itself is excluded by id here. Checks
/// run in declared order and the first tier whose count reaches its
/// limit wins. An empty check list never violates.
pub fn evaluate<'c>(
    origin: Position,
    candidate: EntityId,
    nearby: &[EntitySnapshot],
    checks: &'c [DensityCheck],
) -> Option<&'c DensityCheck> {
    let distances: Vec<f64> = nearby
        .iter()
        .filter(|e| e.id != candidate)
        .map(|e| e.pos.distance(&origin))
        .collect();
    checks.iter().find(|check| {
        let count = distances.iter().filter(|d| **d <= check.radius).count();
        count as u32 >= check.limit
    })
}
