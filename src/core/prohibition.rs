//! The set of keys currently forbidden as transition destinations.
//!
//! Prohibitions are transition-scoped: the machine clears the whole set
//! every time it commits a transition.

use super::key::StateKey;
use std::collections::HashSet;

/// Keys that `set_next` must refuse as destinations.
///
/// This is a thin wrapper over a `HashSet` whose methods mirror the
/// restriction controls of the machine.
///
/// # Example
///
/// ```rust
/// use statebus::core::Prohibitions;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum Step {
///     A,
///     B,
///     C,
/// }
///
/// let mut prohibitions = Prohibitions::new();
/// prohibitions.allow_only([Step::A, Step::B, Step::C], [Step::B]);
///
/// assert!(prohibitions.contains(Step::A));
/// assert!(!prohibitions.contains(Step::B));
/// assert!(prohibitions.contains(Step::C));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prohibitions<K: StateKey> {
    keys: HashSet<K>,
}

impl<K: StateKey> Default for Prohibitions<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateKey> Prohibitions<K> {
    /// Create an empty set: every destination allowed.
    pub fn new() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }

    /// Forbid one key.
    pub fn prohibit(&mut self, key: K) {
        self.keys.insert(key);
    }

    /// Forbid every key yielded by `keys`, keeping what was already forbidden.
    pub fn extend<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
    {
        self.keys.extend(keys);
    }

    /// Replace the whole set with `keys`.
    pub fn replace<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
    {
        self.keys = keys.into_iter().collect();
    }

    /// Allow one key again. Allowing a key that is not forbidden is a no-op.
    pub fn allow(&mut self, key: K) {
        self.keys.remove(&key);
    }

    /// Forbid every key in `all`, then allow exactly the keys in `allowed`.
    pub fn allow_only<A, B>(&mut self, all: A, allowed: B)
    where
        A: IntoIterator<Item = K>,
        B: IntoIterator<Item = K>,
    {
        self.extend(all);
        for key in allowed {
            self.allow(key);
        }
    }

    /// Allow every key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn contains(&self, key: K) -> bool {
        self.keys.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.keys.iter().copied()
    }

    /// Copy of the forbidden keys.
    pub fn to_set(&self) -> HashSet<K> {
        self.keys.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum TestKey {
        Idle,
        Running,
        Paused,
        Stopped,
    }

    const ALL: [TestKey; 4] = [
        TestKey::Idle,
        TestKey::Running,
        TestKey::Paused,
        TestKey::Stopped,
    ];

    #[test]
    fn new_set_allows_everything() {
        let prohibitions: Prohibitions<TestKey> = Prohibitions::new();

        assert!(prohibitions.is_empty());
        assert!(ALL.iter().all(|key| !prohibitions.contains(*key)));
    }

    #[test]
    fn prohibit_adds_to_existing_keys() {
        let mut prohibitions = Prohibitions::new();
        prohibitions.prohibit(TestKey::Idle);
        prohibitions.prohibit(TestKey::Paused);

        assert_eq!(prohibitions.len(), 2);
        assert!(prohibitions.contains(TestKey::Idle));
        assert!(prohibitions.contains(TestKey::Paused));
    }

    #[test]
    fn replace_discards_previous_keys() {
        let mut prohibitions = Prohibitions::new();
        prohibitions.prohibit(TestKey::Idle);

        prohibitions.replace([TestKey::Running, TestKey::Stopped]);

        assert!(!prohibitions.contains(TestKey::Idle));
        assert!(prohibitions.contains(TestKey::Running));
        assert!(prohibitions.contains(TestKey::Stopped));
    }

    #[test]
    fn allow_removes_single_key() {
        let mut prohibitions = Prohibitions::new();
        prohibitions.extend(ALL);

        prohibitions.allow(TestKey::Paused);
        prohibitions.allow(TestKey::Paused);

        assert_eq!(prohibitions.len(), 3);
        assert!(!prohibitions.contains(TestKey::Paused));
    }

    #[test]
    fn allow_only_keeps_whitelist_open() {
        let mut prohibitions = Prohibitions::new();

        prohibitions.allow_only(ALL, [TestKey::Idle, TestKey::Stopped]);

        let mut forbidden: Vec<_> = prohibitions.iter().collect();
        forbidden.sort_by_key(|key| *key as u8);
        assert_eq!(forbidden, vec![TestKey::Running, TestKey::Paused]);
    }

    #[test]
    fn allow_only_with_unknown_key_forbids_everything() {
        let mut prohibitions = Prohibitions::new();

        prohibitions.allow_only([TestKey::Idle, TestKey::Running], [TestKey::Stopped]);

        assert_eq!(prohibitions.len(), 2);
    }

    #[test]
    fn clear_allows_everything() {
        let mut prohibitions = Prohibitions::new();
        prohibitions.extend(ALL);

        prohibitions.clear();

        assert!(prohibitions.is_empty());
        assert!(prohibitions.to_set().is_empty());
    }
}
