use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::{ChunkPos, Position};
use crate::types::{EntityId, EntitySnapshot, PlayerSnapshot, WorldId};
use crate::view::WorldView;

/// Deterministic in-memory world.
///
/// Backs tests and the stormsim harness. All indexes are BTree-based so
/// iteration order is stable across runs. Chunks an entity or player is
/// inserted into are marked loaded automatically; `unload_chunk` carves
/// out the not-resident case.
#[derive(Debug)]
pub struct SimWorld {
    id: WorldId,
    entities: BTreeMap<EntityId, EntitySnapshot>,
    players: BTreeMap<EntityId, PlayerSnapshot>,
    /// Spatial index: chunk → entities positioned inside it.
    chunk_index: BTreeMap<ChunkPos, BTreeSet<EntityId>>,
    loaded: BTreeSet<ChunkPos>,
}

impl SimWorld {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorldId::new(name),
            entities: BTreeMap::new(),
            players: BTreeMap::new(),
            chunk_index: BTreeMap::new(),
            loaded: BTreeSet::new(),
        }
    }

    /// Insert or replace an entity. Marks its chunk loaded.
    pub fn insert_entity(&mut self, entity: EntitySnapshot) {
        let chunk = entity.pos.block().chunk();
        if let Some(old) = self.entities.insert(entity.id, entity.clone()) {
            let old_chunk = old.pos.block().chunk();
            if let Some(set) = self.chunk_index.get_mut(&old_chunk) {
                set.remove(&old.id);
                if set.is_empty() {
                    self.chunk_index.remove(&old_chunk);
                }
            }
        }
        self.chunk_index.entry(chunk).or_default().insert(entity.id);
        self.loaded.insert(chunk);
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<EntitySnapshot> {
        let entity = self.entities.remove(&id)?;
        let chunk = entity.pos.block().chunk();
        if let Some(set) = self.chunk_index.get_mut(&chunk) {
            set.remove(&id);
            if set.is_empty() {
                self.chunk_index.remove(&chunk);
            }
        }
        Some(entity)
    }

    /// Insert or replace a player. Marks their chunk loaded.
    pub fn insert_player(&mut self, player: PlayerSnapshot) {
        self.loaded.insert(player.pos.block().chunk());
        self.players.insert(player.id, player);
    }

    pub fn remove_player(&mut self, id: EntityId) -> Option<PlayerSnapshot> {
        self.players.remove(&id)
    }

    pub fn load_chunk(&mut self, chunk: ChunkPos) {
        self.loaded.insert(chunk);
    }

    /// Mark a square neighborhood of chunks loaded.
    pub fn load_chunks_around(&mut self, center: ChunkPos, radius: i32) {
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                self.loaded.insert(ChunkPos::new(center.x + dx, center.z + dz));
            }
        }
    }

    pub fn unload_chunk(&mut self, chunk: ChunkPos) {
        self.loaded.remove(&chunk);
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

impl WorldView for SimWorld {
    fn id(&self) -> &WorldId {
        &self.id
    }

    fn entities_within(&self, center: Position, radius: f64) -> Vec<EntitySnapshot> {
        self.entities
            .values()
            .filter(|e| self.loaded.contains(&e.pos.block().chunk()))
            .filter(|e| e.pos.distance(&center) <= radius)
            .cloned()
            .collect()
    }

    fn players(&self) -> Vec<PlayerSnapshot> {
        self.players.values().cloned().collect()
    }

    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool {
        self.loaded.contains(&chunk)
    }

    fn entities_in_chunk(&self, chunk: ChunkPos) -> Vec<EntitySnapshot> {
        if !self.loaded.contains(&chunk) {
            return Vec::new();
        }
        let Some(ids) = self.chunk_index.get(&chunk) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.entities.get(id))
            .cloned()
            .collect()
    }
}
