//! Finite state machines
//!
//! A string-keyed machine with enter/exit/update hooks and a change
//! observer, plus an enum-keyed wrapper for typed call sites.

mod machine;
mod typed;

pub use machine::{State, StateMachine, Transition};
pub use typed::{StateKey, TypedStateMachine};
