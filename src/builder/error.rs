//! Build errors for the state machine builder.

use thiserror::Error;

/// Errors that can occur when building a state machine.
///
/// Keys are rendered with their `Debug` representation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("No states added. Call .state(state) at least once before .build()")]
    NoStates,

    #[error("State {key} added more than once")]
    DuplicateState { key: String },

    #[error("Prohibited state {key} is not registered")]
    UnknownProhibitedState { key: String },
}
