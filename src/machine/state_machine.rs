//! State machine binding states to an event bus.

use super::config::MachineConfig;
use super::dispatch::{ErasedHandler, HandlerTable, Subscriptions};
use super::transition::TransitionOutcome;
use crate::bus::{EventBus, Listener, ReceiverId};
use crate::core::{
    Prohibitions, State, StateContext, StateKey, TransitionHistory, TransitionRecord,
};
use std::any::{type_name, Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Mutable bookkeeping. Never borrowed across a call into user code.
struct MachineCore<O: 'static, K: StateKey> {
    states: HashMap<K, Rc<dyn State<O, K>>>,
    current: Option<K>,
    previous: Option<K>,
    prohibitions: Prohibitions<K>,
    handlers: HandlerTable<O, K>,
    history: TransitionHistory<K>,
    /// States whose `subscribe` hook is running, innermost last.
    pending: Vec<Rc<dyn State<O, K>>>,
}

impl<O: 'static, K: StateKey> MachineCore<O, K> {
    /// Registered state for `key`, falling back to one still subscribing.
    fn resolve(&self, key: K) -> Option<Rc<dyn State<O, K>>> {
        self.states.get(&key).cloned().or_else(|| {
            self.pending
                .iter()
                .rev()
                .find(|state| state.key() == key)
                .cloned()
        })
    }
}

struct MachineInner<O: 'static, K: StateKey> {
    owner: Rc<O>,
    bus: Rc<dyn EventBus>,
    receiver: ReceiverId,
    enabled: Cell<bool>,
    clear_replaced_handlers: bool,
    core: RefCell<MachineCore<O, K>>,
}

impl<O: 'static, K: StateKey> Drop for MachineInner<O, K> {
    fn drop(&mut self) {
        self.bus.forget(self.receiver);
        debug!(receiver = %self.receiver, "machine detached from bus");
    }
}

/// Finite state machine whose states handle bus events while active.
///
/// The machine owns its states and tracks the current and previous one by
/// key. Event handlers registered by a state only run while that state is
/// current and the machine is enabled. Invalid requests never fail: they
/// are no-ops.
///
/// # Re-entrancy
///
/// No internal borrow is held while hooks, handlers or bus listeners run,
/// so all of them may call back into the machine. A handler that commits a
/// transition sees the new current state for the rest of its own
/// invocation, even though the event was dispatched against the old one.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use statebus::{LocalBus, State, StateMachine, TransitionOutcome};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum Phase {
///     Idle,
///     Running,
///     Stopped,
/// }
///
/// struct Node(Phase);
///
/// impl State<(), Phase> for Node {
///     fn key(&self) -> Phase {
///         self.0
///     }
/// }
///
/// let machine: StateMachine<(), Phase> =
///     StateMachine::new(Rc::new(()), Rc::new(LocalBus::new()));
/// machine.add(Node(Phase::Idle));
/// machine.add(Node(Phase::Running));
/// machine.add(Node(Phase::Stopped));
///
/// machine.prohibit_state(Phase::Stopped);
/// assert_eq!(machine.set_next(Phase::Stopped), TransitionOutcome::Prohibited(Phase::Stopped));
///
/// assert!(machine.set_next(Phase::Running).is_committed());
/// assert_eq!(machine.previous_key(), Some(Phase::Idle));
///
/// // Committing cleared the prohibition.
/// assert!(machine.set_next(Phase::Stopped).is_committed());
/// ```
pub struct StateMachine<O: 'static, K: StateKey> {
    inner: Rc<MachineInner<O, K>>,
}

impl<O: 'static, K: StateKey> StateMachine<O, K> {
    /// Create an empty machine bound to `owner`, registering on `bus`.
    pub fn new(owner: Rc<O>, bus: Rc<dyn EventBus>) -> Self {
        Self::with_config(owner, bus, MachineConfig::default())
    }

    pub fn with_config(owner: Rc<O>, bus: Rc<dyn EventBus>, config: MachineConfig) -> Self {
        let receiver = ReceiverId::new();
        debug!(%receiver, enabled = config.enabled, "creating state machine");
        Self {
            inner: Rc::new(MachineInner {
                owner,
                bus,
                receiver,
                enabled: Cell::new(config.enabled),
                clear_replaced_handlers: config.clear_replaced_handlers,
                core: RefCell::new(MachineCore {
                    states: HashMap::new(),
                    current: None,
                    previous: None,
                    prohibitions: Prohibitions::new(),
                    handlers: HandlerTable::new(),
                    history: TransitionHistory::new(config.history_limit),
                    pending: Vec::new(),
                }),
            }),
        }
    }

    /// Register a state.
    ///
    /// The first state added becomes current. The state's `subscribe` hook
    /// runs once before it is stored; while it runs, the state already
    /// counts as current for [`set_next`](Self::set_next). A state already
    /// registered under the same key is replaced and returned. The handlers
    /// it subscribed stay in place unless the new state subscribes the same
    /// event types, or [`MachineConfig::clear_replaced_handlers`] is set.
    pub fn add<S: State<O, K>>(&self, state: S) -> Option<Rc<dyn State<O, K>>> {
        let key = state.key();
        let state = Rc::new(state);
        {
            let mut core = self.inner.core.borrow_mut();
            if core.current.is_none() {
                core.current = Some(key);
            }
            if core.states.contains_key(&key) {
                if self.inner.clear_replaced_handlers {
                    let dropped = core.handlers.remove_key(key);
                    warn!(
                        ?key,
                        dropped_handlers = dropped,
                        "replacing state registered under the same key"
                    );
                } else {
                    warn!(?key, "replacing state registered under the same key");
                }
            }
            core.pending.push(Rc::clone(&state) as Rc<dyn State<O, K>>);
        }

        state.subscribe(&mut Subscriptions::new(self, &state));

        let erased: Rc<dyn State<O, K>> = state;
        let replaced = {
            let mut core = self.inner.core.borrow_mut();
            if let Some(index) = core
                .pending
                .iter()
                .rposition(|pending| Rc::ptr_eq(pending, &erased))
            {
                core.pending.remove(index);
            }
            core.states.insert(key, erased)
        };
        debug!(?key, "state registered");
        replaced
    }

    /// Handle events of type `E` while `state` is current.
    ///
    /// Usually called from a state's `subscribe` hook, through
    /// [`Subscriptions::on`]. The first subscription for an event type
    /// attaches one listener to the bus; later ones only update the table.
    pub fn subscribe<E, S, H>(&self, state: &S, handler: H)
    where
        E: 'static,
        S: State<O, K> + ?Sized,
        H: Fn(&E, &StateContext<'_, O, K>) + 'static,
    {
        let erased: ErasedHandler<O, K> =
            Rc::new(move |event: &dyn Any, ctx: &StateContext<'_, O, K>| {
                if let Some(event) = event.downcast_ref::<E>() {
                    handler(event, ctx);
                }
            });
        self.insert_handler(TypeId::of::<E>(), type_name::<E>(), state.key(), erased);
    }

    fn insert_handler(
        &self,
        event: TypeId,
        event_name: &'static str,
        key: K,
        handler: ErasedHandler<O, K>,
    ) {
        let first = self
            .inner
            .core
            .borrow_mut()
            .handlers
            .insert(event, key, handler);
        trace!(?key, event = event_name, "handler subscribed");

        if first {
            let machine = Rc::downgrade(&self.inner);
            let listener: Listener = Rc::new(move |payload: &dyn Any| {
                if let Some(inner) = machine.upgrade() {
                    StateMachine { inner }.dispatch(event, event_name, payload);
                }
            });
            self.inner.bus.listen(self.inner.receiver, event, listener);
            debug!(event = event_name, "attached bus listener");
        }
    }

    fn dispatch(&self, event: TypeId, event_name: &'static str, payload: &dyn Any) {
        if !self.inner.enabled.get() {
            trace!(event = event_name, "machine disabled, event ignored");
            return;
        }

        let (current, handler) = {
            let core = self.inner.core.borrow();
            let handler = core
                .current
                .and_then(|key| core.handlers.lookup(event, key));
            (core.current, handler)
        };

        match handler {
            Some(handler) => {
                trace!(state = ?current, event = event_name, "dispatching event");
                handler(payload, &self.context());
            }
            None => trace!(state = ?current, event = event_name, "no handler for current state"),
        }
    }

    /// Request a transition to `key`.
    ///
    /// Refused, in this order, when `key` is prohibited, when it is the
    /// current state, or when no state is registered under it. Otherwise
    /// the current state's `on_exit` runs, the prohibition set is cleared,
    /// the current state becomes the previous one, and the destination's
    /// `on_enter` runs. Works regardless of the enable switch.
    ///
    /// A state whose `subscribe` hook is still running inside
    /// [`add`](Self::add) is resolved like a stored one, so a transition
    /// requested from there exits that state normally.
    pub fn set_next(&self, key: K) -> TransitionOutcome<K> {
        let (exiting, entering) = {
            let core = self.inner.core.borrow();
            if core.prohibitions.contains(key) {
                trace!(?key, "transition refused, destination prohibited");
                return TransitionOutcome::Prohibited(key);
            }
            if core.current == Some(key) {
                trace!(?key, "transition refused, already current");
                return TransitionOutcome::AlreadyCurrent(key);
            }
            let Some(entering) = core.resolve(key) else {
                trace!(?key, "transition refused, unknown state");
                return TransitionOutcome::UnknownState(key);
            };
            let Some(exiting) = core.current.and_then(|k| core.resolve(k)) else {
                trace!(?key, "transition refused, no current state");
                return TransitionOutcome::UnknownState(key);
            };
            (exiting, entering)
        };

        let ctx = self.context();
        exiting.on_exit(&ctx);

        let from = {
            let mut core = self.inner.core.borrow_mut();
            let from = core.current.unwrap_or_else(|| exiting.key());
            core.prohibitions.clear();
            core.previous = Some(from);
            core.current = Some(key);
            core.history.record(TransitionRecord::new(from, key));
            from
        };
        debug!(?from, to = ?key, "transition committed");

        entering.on_enter(&ctx);
        TransitionOutcome::Committed { from, to: key }
    }

    /// Forbid `key` as a destination until the next committed transition.
    pub fn prohibit_state(&self, key: K) {
        self.inner.core.borrow_mut().prohibitions.prohibit(key);
    }

    /// Replace the prohibition set with `keys`.
    pub fn prohibit_states<I>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
    {
        self.inner.core.borrow_mut().prohibitions.replace(keys);
    }

    /// Forbid every registered key.
    pub fn prohibit_all_states(&self) {
        let mut core = self.inner.core.borrow_mut();
        let MachineCore {
            states,
            prohibitions,
            ..
        } = &mut *core;
        prohibitions.extend(states.keys().copied());
    }

    pub fn allow_state(&self, key: K) {
        self.inner.core.borrow_mut().prohibitions.allow(key);
    }

    /// Forbid every registered key except `key`.
    pub fn allow_only(&self, key: K) {
        self.allow_only_states([key]);
    }

    /// Forbid every registered key except those in `keys`.
    pub fn allow_only_states<I>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
    {
        let mut core = self.inner.core.borrow_mut();
        let MachineCore {
            states,
            prohibitions,
            ..
        } = &mut *core;
        prohibitions.allow_only(states.keys().copied(), keys);
    }

    pub fn allow_all_states(&self) {
        self.inner.core.borrow_mut().prohibitions.clear();
    }

    pub fn is_prohibited(&self, key: K) -> bool {
        self.inner.core.borrow().prohibitions.contains(key)
    }

    pub fn prohibited_states(&self) -> HashSet<K> {
        self.inner.core.borrow().prohibitions.to_set()
    }

    /// Turn event dispatch on or off.
    ///
    /// Lifecycle hooks are not called: disabling does not exit the current
    /// state and enabling does not re-enter it.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.set(enabled);
        debug!(enabled, "dispatch switch changed");
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// The active state. `None` only before the first `add`.
    pub fn current_state(&self) -> Option<Rc<dyn State<O, K>>> {
        let core = self.inner.core.borrow();
        core.current.and_then(|key| core.resolve(key))
    }

    /// The state active before the last committed transition.
    pub fn previous_state(&self) -> Option<Rc<dyn State<O, K>>> {
        let core = self.inner.core.borrow();
        core.previous.and_then(|key| core.resolve(key))
    }

    pub fn current_key(&self) -> Option<K> {
        self.inner.core.borrow().current
    }

    pub fn previous_key(&self) -> Option<K> {
        self.inner.core.borrow().previous
    }

    pub fn state(&self, key: K) -> Option<Rc<dyn State<O, K>>> {
        self.inner.core.borrow().states.get(&key).cloned()
    }

    pub fn contains_state(&self, key: K) -> bool {
        self.inner.core.borrow().states.contains_key(&key)
    }

    pub fn state_count(&self) -> usize {
        self.inner.core.borrow().states.len()
    }

    /// Number of states holding a handler for events of type `E`.
    pub fn handler_count<E: 'static>(&self) -> usize {
        self.inner
            .core
            .borrow()
            .handlers
            .handler_count(TypeId::of::<E>())
    }

    pub fn owner(&self) -> &O {
        &self.inner.owner
    }

    /// Snapshot of the committed transitions.
    pub fn history(&self) -> TransitionHistory<K> {
        self.inner.core.borrow().history.clone()
    }

    /// Id under which the machine's listeners are attached to the bus.
    pub fn receiver(&self) -> ReceiverId {
        self.inner.receiver
    }

    fn context(&self) -> StateContext<'_, O, K> {
        StateContext::new(self)
    }
}

impl<O: 'static, K: StateKey> fmt::Debug for StateMachine<O, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.core.borrow();
        f.debug_struct("StateMachine")
            .field("receiver", &self.inner.receiver)
            .field("enabled", &self.inner.enabled.get())
            .field("current", &core.current)
            .field("previous", &core.previous)
            .field("states", &core.states.len())
            .field("prohibited", &core.prohibitions)
            .finish()
    }
}
