//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::bus::EventBus;
use crate::core::{State, StateKey};
use crate::machine::{MachineConfig, StateMachine};
use std::collections::HashSet;
use std::rc::Rc;

type Registration<O, K> = Box<dyn FnOnce(&StateMachine<O, K>)>;

/// Builder for constructing state machines with a fluent API.
///
/// Unlike [`StateMachine::add`], the builder is strict: duplicate keys and
/// prohibitions naming unregistered keys are reported as errors instead of
/// being accepted silently. States are added in the order given, so the
/// first one becomes the initial state.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use statebus::{LocalBus, State, StateMachineBuilder};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum Light {
///     Red,
///     Green,
/// }
///
/// struct Lamp(Light);
///
/// impl State<(), Light> for Lamp {
///     fn key(&self) -> Light {
///         self.0
///     }
/// }
///
/// let bus = Rc::new(LocalBus::new());
/// let machine = StateMachineBuilder::<(), Light>::new(Rc::new(()), bus)
///     .state(Lamp(Light::Red))
///     .state(Lamp(Light::Green))
///     .history_limit(16)
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.current_key(), Some(Light::Red));
/// ```
pub struct StateMachineBuilder<O: 'static, K: StateKey> {
    owner: Rc<O>,
    bus: Rc<dyn EventBus>,
    config: MachineConfig,
    keys: Vec<K>,
    registrations: Vec<Registration<O, K>>,
    prohibited: Vec<K>,
}

impl<O: 'static, K: StateKey> StateMachineBuilder<O, K> {
    /// Create a builder for a machine bound to `owner` and `bus`.
    pub fn new(owner: Rc<O>, bus: Rc<dyn EventBus>) -> Self {
        Self {
            owner,
            bus,
            config: MachineConfig::default(),
            keys: Vec::new(),
            registrations: Vec::new(),
            prohibited: Vec::new(),
        }
    }

    /// Add a state. The first state added is the initial state.
    pub fn state<S: State<O, K>>(mut self, state: S) -> Self {
        self.keys.push(state.key());
        self.registrations.push(Box::new(move |machine: &StateMachine<O, K>| {
            machine.add(state);
        }));
        self
    }

    /// Set the initial value of the dispatch switch (default `true`).
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Set how many committed transitions the history keeps.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Drop a key's handlers when a later state displaces the one
    /// registered under it (default `false`).
    pub fn clear_replaced_handlers(mut self, clear: bool) -> Self {
        self.config.clear_replaced_handlers = clear;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Prohibit `key` as the destination of the first transition.
    pub fn prohibit(mut self, key: K) -> Self {
        self.prohibited.push(key);
        self
    }

    /// Build the state machine.
    /// Returns an error if no state was added, if two states share a key, or
    /// if a prohibited key names no state.
    pub fn build(self) -> Result<StateMachine<O, K>, BuildError> {
        if self.keys.is_empty() {
            return Err(BuildError::NoStates);
        }

        let mut seen = HashSet::with_capacity(self.keys.len());
        if let Some(key) = self.keys.iter().find(|key| !seen.insert(**key)) {
            return Err(BuildError::DuplicateState {
                key: format!("{key:?}"),
            });
        }

        if let Some(key) = self.prohibited.iter().find(|key| !seen.contains(*key)) {
            return Err(BuildError::UnknownProhibitedState {
                key: format!("{key:?}"),
            });
        }

        let machine = StateMachine::with_config(self.owner, self.bus, self.config);
        for register in self.registrations {
            register(&machine);
        }
        machine.prohibit_states(self.prohibited);

        Ok(machine)
    }
}
