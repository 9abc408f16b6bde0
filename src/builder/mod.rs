//! Builder API for ergonomic state machine construction.
//!
//! This module provides a fluent builder that validates a machine's states
//! up front, and a macro for declaring key enums with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
