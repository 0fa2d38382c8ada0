//! Spawn admission control for a game server.
//!
//! Decides, per spawn or breeding attempt, whether to allow or deny it
//! so player-built mob farms and natural spawning storms cannot drag
//! down the tick rate. The host adapter feeds [`SpawnAttempt`]s through
//! [`AdmissionPolicy::admit`] and cancels the event when the verdict is
//! [`Verdict::Deny`]; denial alerts reach nearby players through an
//! [`AlertSink`] and are deduplicated across a spatial/temporal window.

pub mod alert;
pub mod chunk_cache;
pub mod config;
pub mod density;
pub mod error;
pub mod monitor;
pub mod ops;
pub mod policy;
pub mod snapshot;
pub mod warnings;

pub use alert::AlertSink;
pub use chunk_cache::ChunkDensityCache;
pub use config::GuardConfig;
pub use density::DensityCheck;
pub use error::{CommandError, ConfigError, SnapshotError};
pub use monitor::{TpsMonitor, NOMINAL_TPS};
pub use policy::{AdmissionPolicy, Counters, DenyReason, SpawnAttempt, SpawnCategory, Verdict};
pub use warnings::{IssuedWarning, WarningLog};
