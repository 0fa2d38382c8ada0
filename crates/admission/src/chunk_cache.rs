use std::collections::BTreeMap;

use world_model::{ChunkPos, EntitySnapshot, WorldId, WorldView};

use crate::config::WorldRule;

/// How long an over-limit count may be reused before rescanning.
pub const REUSE_TTL_SECS: u64 = 60;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    count: u32,
    computed_at: u64,
}

/// Per-chunk mob-count cache for natural spawn throttling.
///
/// The trust rule is asymmetric on purpose: an entry is only reused while
/// its count exceeded the world's mob limit and it is younger than
/// [`REUSE_TTL_SECS`]. A low count is never trusted, so a stale "room
/// left" verdict can never keep feeding a runaway farm; a crowded chunk
/// keeps denying for up to a minute without rescanning.
#[derive(Debug, Default)]
pub struct ChunkDensityCache {
    entries: BTreeMap<(WorldId, i32, i32), CacheEntry>,
}

impl ChunkDensityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached or freshly scanned mob count around `chunk`.
    ///
    /// A fresh scan walks the square neighborhood of `rule.chunk_radius`
    /// chunks, skipping chunks that are not currently loaded, and counts
    /// entities matching `predicate`.
    pub fn count_or_cached<W, F>(
        &mut self,
        world: &W,
        chunk: ChunkPos,
        rule: &WorldRule,
        now: u64,
        predicate: F,
    ) -> u32
    where
        W: WorldView,
        F: Fn(&EntitySnapshot) -> bool,
    {
        let key = (world.id().clone(), chunk.x, chunk.z);
        if let Some(entry) = self.entries.get(&key) {
            if entry.count > rule.mob_limit && now.saturating_sub(entry.computed_at) < REUSE_TTL_SECS
            {
                return entry.count;
            }
        }

        let mut count: u32 = 0;
        for dx in -rule.chunk_radius..=rule.chunk_radius {
            for dz in -rule.chunk_radius..=rule.chunk_radius {
                let neighbor = ChunkPos::new(chunk.x + dx, chunk.z + dz);
                if !world.is_chunk_loaded(neighbor) {
                    continue;
                }
                count += world
                    .entities_in_chunk(neighbor)
                    .iter()
                    .filter(|e| predicate(e))
                    .count() as u32;
            }
        }
        self.entries.insert(key, CacheEntry { count, computed_at: now });
        count
    }

    /// Drop entries older than the reuse TTL. Periodic-timer hook.
    pub fn sweep(&mut self, now: u64) {
        self.entries
            .retain(|_, e| now.saturating_sub(e.computed_at) < REUSE_TTL_SECS);
    }

    /// Forget everything. Used when config is swapped, so counts recorded
    /// under old limits cannot outlive them.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_model::{EntityId, EntityKind, Position, SimWorld};

    fn rule(chunk_radius: i32, mob_limit: u32) -> WorldRule {
        WorldRule {
            name: "default".into(),
            enabled: true,
            chunk_radius,
            mob_limit,
        }
    }

    fn populate(world: &mut SimWorld, n: u64, base_x: f64) {
        for i in 0..n {
            world.insert_entity(EntitySnapshot::new(
                EntityId(1000 + i),
                EntityKind::new("zombie"),
                Position::new(base_x + (i % 16) as f64, 64.0, (i / 16) as f64),
            ));
        }
    }

    #[test]
    fn scan_counts_neighborhood() {
        let mut world = SimWorld::new("overworld");
        populate(&mut world, 10, 0.0); // chunk (0,0) area
        world.load_chunks_around(ChunkPos::new(0, 0), 2);

        let mut cache = ChunkDensityCache::new();
        let count = cache.count_or_cached(&world, ChunkPos::new(0, 0), &rule(2, 50), 100, |e| e.mob);
        assert_eq!(count, 10);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unloaded_chunks_contribute_nothing() {
        let mut world = SimWorld::new("overworld");
        populate(&mut world, 10, 0.0);
        world.unload_chunk(ChunkPos::new(0, 0));

        let mut cache = ChunkDensityCache::new();
        let count = cache.count_or_cached(&world, ChunkPos::new(0, 0), &rule(1, 50), 100, |e| e.mob);
        assert_eq!(count, 0);
    }

    #[test]
    fn over_limit_entry_is_reused_verbatim() {
        let mut world = SimWorld::new("overworld");
        populate(&mut world, 30, 0.0);
        world.load_chunks_around(ChunkPos::new(0, 0), 1);

        let mut cache = ChunkDensityCache::new();
        let r = rule(1, 20);
        assert_eq!(
            cache.count_or_cached(&world, ChunkPos::new(0, 0), &r, 100, |e| e.mob),
            30
        );

        // The farm empties out, but the over-limit entry stays trusted
        // while younger than the TTL.
        for i in 0..30 {
            world.remove_entity(EntityId(1000 + i));
        }
        assert_eq!(
            cache.count_or_cached(&world, ChunkPos::new(0, 0), &r, 100 + REUSE_TTL_SECS - 1, |e| e.mob),
            30
        );
        // Once expired it rescans and sees the empty chunks.
        assert_eq!(
            cache.count_or_cached(&world, ChunkPos::new(0, 0), &r, 100 + REUSE_TTL_SECS, |e| e.mob),
            0
        );
    }

    #[test]
    fn under_limit_entry_is_never_reused() {
        let mut world = SimWorld::new("overworld");
        populate(&mut world, 5, 0.0);
        world.load_chunks_around(ChunkPos::new(0, 0), 1);

        let mut cache = ChunkDensityCache::new();
        let r = rule(1, 20);
        assert_eq!(
            cache.count_or_cached(&world, ChunkPos::new(0, 0), &r, 100, |e| e.mob),
            5
        );

        // Population grows immediately past the limit: the next call must
        // rescan and see it, the low entry is not trusted.
        for i in 0..30 {
            world.insert_entity(EntitySnapshot::new(
                EntityId(2000 + i),
                EntityKind::new("zombie"),
                Position::new(1.0 + (i % 14) as f64, 64.0, 8.0 + (i / 14) as f64),
            ));
        }
        assert_eq!(
            cache.count_or_cached(&world, ChunkPos::new(0, 0), &r, 101, |e| e.mob),
            35
        );
    }

    #[test]
    fn predicate_filters_entities() {
        let mut world = SimWorld::new("overworld");
        populate(&mut world, 8, 0.0);
        let mut decoration = EntitySnapshot::new(
            EntityId(1),
            EntityKind::new("armor_stand"),
            Position::new(2.0, 64.0, 2.0),
        );
        decoration.mob = false;
        world.insert_entity(decoration);
        world.load_chunks_around(ChunkPos::new(0, 0), 1);

        let mut cache = ChunkDensityCache::new();
        let count = cache.count_or_cached(&world, ChunkPos::new(0, 0), &rule(1, 50), 100, |e| e.mob);
        assert_eq!(count, 8);
    }

    #[test]
    fn separate_worlds_do_not_share_entries() {
        let mut overworld = SimWorld::new("overworld");
        populate(&mut overworld, 25, 0.0);
        overworld.load_chunks_around(ChunkPos::new(0, 0), 1);
        let nether = SimWorld::new("the_nether");

        let mut cache = ChunkDensityCache::new();
        let r = rule(1, 20);
        assert_eq!(cache.count_or_cached(&overworld, ChunkPos::new(0, 0), &r, 100, |e| e.mob), 25);
        assert_eq!(cache.count_or_cached(&nether, ChunkPos::new(0, 0), &r, 100, |e| e.mob), 0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn sweep_drops_expired_entries() {
        let mut world = SimWorld::new("overworld");
        populate(&mut world, 3, 0.0);
        world.load_chunks_around(ChunkPos::new(0, 0), 1);

        let mut cache = ChunkDensityCache::new();
        cache.count_or_cached(&world, ChunkPos::new(0, 0), &rule(1, 20), 100, |e| e.mob);
        cache.sweep(100 + REUSE_TTL_SECS - 1);
        assert_eq!(cache.len(), 1);
        cache.sweep(100 + REUSE_TTL_SECS);
        assert!(cache.is_empty());
    }
}
