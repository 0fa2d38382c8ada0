//! Host-boundary model for the spawn admission controller.
//!
//! The controller never talks to a real game server directly: it reads
//! read-only snapshots of entities and players and issues spatial queries
//! through the [`WorldView`] trait. [`SimWorld`] is a deterministic
//! in-memory implementation used by tests and the stormsim harness.

pub mod geometry;
pub mod sim_world;
pub mod types;
pub mod view;

pub use geometry::{BlockPos, ChunkPos, Position, CHUNK_SIZE};
pub use sim_world::SimWorld;
pub use types::{EntityId, EntityKind, EntitySnapshot, GameMode, PlayerSnapshot, WorldId};
pub use view::WorldView;
