//! Spawning
//!
//! Rate-driven instance generation on top of factories or pools.

mod spawner;

pub use spawner::{SpawnSource, Spawner, SpawnerConfig};
