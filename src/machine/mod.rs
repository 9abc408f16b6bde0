//! The state machine runtime.
//!
//! # Key Concepts
//!
//! - **Registration**: `add` takes ownership of a state and runs its
//!   `subscribe` hook once
//! - **Dispatch**: one bus listener per event type forwards events to the
//!   handler of the current state, if any, while the machine is enabled
//! - **Transitions**: `set_next` runs `on_exit`, clears prohibitions, swaps
//!   current/previous and runs `on_enter`
//! - **Restrictions**: a prohibition set refuses destinations until the
//!   next committed transition

mod config;
mod dispatch;
mod state_machine;
mod transition;

pub use config::{MachineConfig, DEFAULT_HISTORY_LIMIT};
pub use dispatch::Subscriptions;
pub use state_machine::StateMachine;
pub use transition::TransitionOutcome;
