//! Record of committed transitions.
//!
//! The machine appends a [`TransitionRecord`] every time `set_next` commits.
//! The log is bounded: once it holds `limit` records the oldest one is
//! evicted.

use super::key::StateKey;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::time::Duration;

/// One committed transition.
///
/// # Example
///
/// ```rust
/// use statebus::core::TransitionRecord;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum Task {
///     Pending,
///     Running,
/// }
///
/// let record = TransitionRecord::new(Task::Pending, Task::Running);
/// assert_eq!(record.from, Task::Pending);
/// assert_eq!(record.to, Task::Running);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionRecord<K: StateKey> {
    /// The state that was exited
    pub from: K,
    /// The state that was entered
    pub to: K,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

impl<K: StateKey> TransitionRecord<K> {
    /// Create a record stamped with the current time.
    pub fn new(from: K, to: K) -> Self {
        Self {
            from,
            to,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded, ordered log of committed transitions.
///
/// # Example
///
/// ```rust
/// use statebus::core::{TransitionHistory, TransitionRecord};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum Work {
///     Start,
///     Middle,
///     End,
/// }
///
/// let mut history = TransitionHistory::new(8);
/// history.record(TransitionRecord::new(Work::Start, Work::Middle));
/// history.record(TransitionRecord::new(Work::Middle, Work::End));
///
/// assert_eq!(history.get_path(), vec![Work::Start, Work::Middle, Work::End]);
/// ```
#[derive(Clone, Debug)]
pub struct TransitionHistory<K: StateKey> {
    records: VecDeque<TransitionRecord<K>>,
    limit: usize,
}

impl<K: StateKey> TransitionHistory<K> {
    /// Create an empty history keeping at most `limit` records.
    ///
    /// A limit of zero disables recording.
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    /// Append a record, evicting the oldest ones beyond the limit.
    pub fn record(&mut self, record: TransitionRecord<K>) {
        if self.limit == 0 {
            return;
        }
        self.records.push_back(record);
        while self.records.len() > self.limit {
            self.records.pop_front();
        }
    }

    /// Keys visited, oldest first: the `from` of the oldest retained record
    /// followed by the `to` of every record.
    pub fn get_path(&self) -> Vec<K> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from);
        }
        path.extend(self.records.iter().map(|record| record.to));
        path
    }

    /// Time between the oldest and newest retained records.
    ///
    /// `None` when empty. Clock steps backwards are reported as zero.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        Some(
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .unwrap_or(Duration::ZERO),
        )
    }

    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord<K>> + '_ {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord<K>> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
