//! Core state machine types.
//!
//! This module contains the building blocks the machine is assembled from:
//! - Identity keys via the `StateKey` trait
//! - The `State` trait with its lifecycle hooks
//! - The prohibition set restricting transition destinations
//! - The bounded transition history

mod history;
mod key;
mod prohibition;
mod state;

pub use history::{TransitionHistory, TransitionRecord};
pub use key::StateKey;
pub use prohibition::Prohibitions;
pub use state::{State, StateContext};
