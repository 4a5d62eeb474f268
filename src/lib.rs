//! Gameplay utility kernel
//!
//! Engine-agnostic building blocks driven by a per-frame `tick(delta)`:
//! - String-keyed state machines with lifecycle hooks
//! - Phase-timed ability runner (startup / active / recovery)
//! - Object pooling and rate-based spawning
//! - Cooldowns and health
//! - Input snapshots, an event hub and outlets into a `hecs` world

pub mod combat;
pub mod core;
pub mod fsm;
pub mod input;
pub mod outlet;
pub mod pool;
pub mod spawn;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::combat::{AbilityRunner, AbilitySpec, Cooldown, Health, Phase};
    pub use crate::core::{ConfigError, EventHub, GameEvent, KitConfig, Time};
    pub use crate::fsm::{State, StateKey, StateMachine, Transition, TypedStateMachine};
    pub use crate::input::{InputAction, InputSnapshot};
    pub use crate::outlet::{Outlet, OutletSet};
    pub use crate::pool::ObjectPool;
    pub use crate::spawn::{SpawnSource, Spawner, SpawnerConfig};
    pub use glam::Vec2;
}
