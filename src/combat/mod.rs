//! Combat timing and hit-point primitives
//!
//! Provides the ability phase runner, cooldowns and health.

mod ability;
mod cooldown;
mod health;

pub use ability::{AbilityRunner, AbilitySpec, Phase};
pub use cooldown::Cooldown;
pub use health::Health;
