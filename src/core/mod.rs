//! Core module
//!
//! Configuration, frame timing and the event hub shared by every component.

pub mod config;
pub mod events;
mod time;

pub use config::{ConfigError, KitConfig};
pub use events::{EventHub, GameEvent, SubscriptionId};
pub use time::Time;
