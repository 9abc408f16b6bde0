//! State-scoped handler tables.
//!
//! Handlers are stored per event type and per state key behind a uniform,
//! type-erased signature. The typed wrapper built at subscription time
//! downcasts the event back to its concrete type before calling user code.

use super::StateMachine;
use crate::core::{State, StateContext, StateKey};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

pub(crate) type ErasedHandler<O, K> = Rc<dyn Fn(&dyn Any, &StateContext<'_, O, K>)>;

/// Event type -> state key -> handler.
pub(crate) struct HandlerTable<O: 'static, K: StateKey> {
    tables: HashMap<TypeId, HashMap<K, ErasedHandler<O, K>>>,
}

impl<O: 'static, K: StateKey> HandlerTable<O, K> {
    pub(crate) fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Insert or replace the handler for `(event, key)`.
    ///
    /// Returns true when this is the first handler ever stored for `event`,
    /// which is when the machine has to attach itself to the bus.
    pub(crate) fn insert(&mut self, event: TypeId, key: K, handler: ErasedHandler<O, K>) -> bool {
        let first = !self.tables.contains_key(&event);
        self.tables.entry(event).or_default().insert(key, handler);
        first
    }

    pub(crate) fn lookup(&self, event: TypeId, key: K) -> Option<ErasedHandler<O, K>> {
        self.tables.get(&event)?.get(&key).cloned()
    }

    /// Drop every handler scoped to `key`. The per-type tables stay, since
    /// the bus listener for each type stays attached.
    pub(crate) fn remove_key(&mut self, key: K) -> usize {
        self.tables
            .values_mut()
            .filter_map(|handlers| handlers.remove(&key))
            .count()
    }

    pub(crate) fn handler_count(&self, event: TypeId) -> usize {
        self.tables.get(&event).map_or(0, HashMap::len)
    }
}

/// Registrar handed to [`State::subscribe`].
///
/// Handlers installed through it are scoped to the state being registered
/// and receive that state as their first argument.
pub struct Subscriptions<'a, S, O: 'static, K: StateKey> {
    machine: &'a StateMachine<O, K>,
    state: &'a Rc<S>,
}

impl<'a, S, O, K> Subscriptions<'a, S, O, K>
where
    S: State<O, K>,
    O: 'static,
    K: StateKey,
{
    pub(crate) fn new(machine: &'a StateMachine<O, K>, state: &'a Rc<S>) -> Self {
        Self { machine, state }
    }

    /// Handle events of type `E` while this state is current.
    ///
    /// Registering a second handler for the same event type replaces the
    /// first one.
    pub fn on<E, F>(&mut self, handler: F) -> &mut Self
    where
        E: 'static,
        F: Fn(&S, &E, &StateContext<'_, O, K>) + 'static,
    {
        let state = Rc::clone(self.state);
        self.machine
            .subscribe(&**self.state, move |event: &E, ctx: &StateContext<'_, O, K>| {
                handler(&state, event, ctx)
            });
        self
    }

    /// The machine the state is being added to.
    pub fn machine(&self) -> &'a StateMachine<O, K> {
        self.machine
    }

    pub fn owner(&self) -> &'a O {
        self.machine.owner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum TestKey {
        Idle,
        Running,
    }

    struct Tick;
    struct Tock;

    fn noop() -> ErasedHandler<(), TestKey> {
        Rc::new(|_: &dyn Any, _: &StateContext<'_, (), TestKey>| {})
    }

    #[test]
    fn first_insert_per_event_type_is_reported() {
        let mut table = HandlerTable::new();

        assert!(table.insert(TypeId::of::<Tick>(), TestKey::Idle, noop()));
        assert!(!table.insert(TypeId::of::<Tick>(), TestKey::Running, noop()));
        assert!(table.insert(TypeId::of::<Tock>(), TestKey::Idle, noop()));
    }

    #[test]
    fn insert_replaces_same_pair() {
        let mut table = HandlerTable::new();
        table.insert(TypeId::of::<Tick>(), TestKey::Idle, noop());
        table.insert(TypeId::of::<Tick>(), TestKey::Idle, noop());

        assert_eq!(table.handler_count(TypeId::of::<Tick>()), 1);
    }

    #[test]
    fn lookup_is_scoped_by_key() {
        let mut table = HandlerTable::new();
        table.insert(TypeId::of::<Tick>(), TestKey::Idle, noop());

        assert!(table.lookup(TypeId::of::<Tick>(), TestKey::Idle).is_some());
        assert!(table.lookup(TypeId::of::<Tick>(), TestKey::Running).is_none());
        assert!(table.lookup(TypeId::of::<Tock>(), TestKey::Idle).is_none());
    }

    #[test]
    fn remove_key_clears_every_event_type() {
        let mut table = HandlerTable::new();
        table.insert(TypeId::of::<Tick>(), TestKey::Idle, noop());
        table.insert(TypeId::of::<Tock>(), TestKey::Idle, noop());
        table.insert(TypeId::of::<Tock>(), TestKey::Running, noop());

        assert_eq!(table.remove_key(TestKey::Idle), 2);
        assert_eq!(table.handler_count(TypeId::of::<Tick>()), 0);
        assert_eq!(table.handler_count(TypeId::of::<Tock>()), 1);
        assert!(!table.insert(TypeId::of::<Tick>(), TestKey::Running, noop()));
    }
}
