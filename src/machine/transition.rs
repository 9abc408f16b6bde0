//! Outcome of a transition request.

use crate::core::StateKey;
use std::fmt;

/// What `set_next` did with a destination.
///
/// Only `Committed` has side effects. Every other variant describes why the
/// request was a no-op: no hooks fired and no pointers moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome<K: StateKey> {
    /// The machine left `from` and entered `to`.
    Committed { from: K, to: K },

    /// The destination is in the prohibition set.
    Prohibited(K),

    /// The destination is already the current state.
    AlreadyCurrent(K),

    /// No state is registered under the destination key.
    UnknownState(K),
}

impl<K: StateKey> TransitionOutcome<K> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// The key that was requested as destination.
    pub fn destination(&self) -> K {
        match *self {
            Self::Committed { to, .. } => to,
            Self::Prohibited(key) | Self::AlreadyCurrent(key) | Self::UnknownState(key) => key,
        }
    }
}

impl<K: StateKey> fmt::Display for TransitionOutcome<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed { from, to } => write!(f, "transitioned from {from:?} to {to:?}"),
            Self::Prohibited(key) => write!(f, "destination {key:?} is prohibited"),
            Self::AlreadyCurrent(key) => write!(f, "{key:?} is already the current state"),
            Self::UnknownState(key) => write!(f, "no state registered under {key:?}"),
        }
    }
}
