//! Input handling module
//!
//! Provides a per-frame snapshot of logical input actions.

mod snapshot;

pub use snapshot::{InputAction, InputSnapshot};
