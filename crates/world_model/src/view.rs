use crate::geometry::{ChunkPos, Position};
use crate::types::{EntitySnapshot, PlayerSnapshot, WorldId};

/// Spatial queries against one world of the host server.
///
/// All queries are restricted to currently loaded chunks: data that is not
/// resident contributes nothing, it is never waited for. Implementations
/// return snapshots by value; the controller holds nothing across calls.
pub trait WorldView {
    fn id(&self) -> &WorldId;

    /// Entities within `radius` (Euclidean) of `center`.
    fn entities_within(&self, center: Position, radius: f64) -> Vec<EntitySnapshot>;

    /// All connected players in this world.
    fn players(&self) -> Vec<PlayerSnapshot>;

    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool;

    /// Entities whose position falls inside the given chunk. Empty for
    /// unloaded chunks.
    fn entities_in_chunk(&self, chunk: ChunkPos) -> Vec<EntitySnapshot>;
}
