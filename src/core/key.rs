//! Identity keys for machine states.
//!
//! Every state registered with a [`StateMachine`](crate::machine::StateMachine)
//! is addressed by a key. Keys are small, copyable values drawn from a closed
//! set, usually a fieldless enum.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for values that identify a state inside a machine.
///
/// Blanket-implemented for every type meeting the bounds, so any fieldless
/// enum deriving `Clone, Copy, PartialEq, Eq, Hash, Debug` qualifies.
/// The [`state_keys!`](crate::state_keys) macro generates such an enum.
///
/// # Required Traits
///
/// - `Copy`: keys are passed by value through every machine operation
/// - `Eq` + `Hash`: keys index the state map, the prohibition set and the
///   handler tables
/// - `Debug`: keys appear in log output
///
/// # Example
///
/// ```rust
/// use statebus::core::StateKey;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn takes_key<K: StateKey>(key: K) -> K {
///     key
/// }
///
/// assert_eq!(takes_key(Door::Open), Door::Open);
/// ```
pub trait StateKey: Copy + Eq + Hash + Debug + 'static {}

impl<T> StateKey for T where T: Copy + Eq + Hash + Debug + 'static {}
