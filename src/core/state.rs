//! The State trait and the context handed to its hooks.
//!
//! A state is a node in the machine's graph. It owns three hooks:
//! `subscribe` runs once when the state is added to a machine, while
//! `on_enter` and `on_exit` run around every committed transition.

use super::key::StateKey;
use crate::machine::{StateMachine, Subscriptions};
use std::fmt;

/// Trait for states registered with a [`StateMachine`].
///
/// `O` is the owner context shared by every state of the machine and `K` is
/// the key type identifying states. Hooks take `&self`; states that need
/// to mutate their own data use `Cell`/`RefCell` fields, which keeps
/// re-entrant calls (a hook calling back into the machine) sound.
///
/// Every hook has an empty default, so a state only implements what it
/// reacts to.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use statebus::{LocalBus, State, StateContext, StateMachine, Subscriptions};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum Lamp {
///     Off,
///     On,
/// }
///
/// struct Toggle;
///
/// struct Switch {
///     key: Lamp,
/// }
///
/// impl State<Cell<u32>, Lamp> for Switch {
///     fn key(&self) -> Lamp {
///         self.key
///     }
///
///     fn subscribe(&self, subscriptions: &mut Subscriptions<'_, Self, Cell<u32>, Lamp>) {
///         subscriptions.on::<Toggle, _>(|state, _toggle, ctx| {
///             let next = if state.key == Lamp::Off { Lamp::On } else { Lamp::Off };
///             ctx.machine().set_next(next);
///         });
///     }
///
///     fn on_enter(&self, ctx: &StateContext<'_, Cell<u32>, Lamp>) {
///         ctx.owner().set(ctx.owner().get() + 1);
///     }
/// }
///
/// let bus = Rc::new(LocalBus::new());
/// let machine: StateMachine<Cell<u32>, Lamp> =
///     StateMachine::new(Rc::new(Cell::new(0)), bus.clone());
/// machine.add(Switch { key: Lamp::Off });
/// machine.add(Switch { key: Lamp::On });
///
/// bus.publish(&Toggle);
/// assert_eq!(machine.current_key(), Some(Lamp::On));
/// assert_eq!(machine.owner().get(), 1);
/// ```
pub trait State<O: 'static, K: StateKey>: 'static {
    /// The key this state is registered under. Must not change.
    fn key(&self) -> K;

    /// Install event handlers. Called exactly once, when the state is added.
    fn subscribe(&self, subscriptions: &mut Subscriptions<'_, Self, O, K>)
    where
        Self: Sized,
    {
        let _ = subscriptions;
    }

    /// Called after this state becomes the current state.
    fn on_enter(&self, ctx: &StateContext<'_, O, K>) {
        let _ = ctx;
    }

    /// Called while this state is still current, before it is replaced.
    fn on_exit(&self, ctx: &StateContext<'_, O, K>) {
        let _ = ctx;
    }
}

impl<O: 'static, K: StateKey> fmt::Debug for dyn State<O, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State").field("key", &self.key()).finish()
    }
}

/// Borrowed view of the machine and its owner, passed to hooks and handlers.
///
/// This stands in for back-references from a state to its machine: states
/// never hold the machine themselves, they receive it for the duration of a
/// call.
pub struct StateContext<'a, O: 'static, K: StateKey> {
    machine: &'a StateMachine<O, K>,
}

impl<'a, O: 'static, K: StateKey> StateContext<'a, O, K> {
    pub(crate) fn new(machine: &'a StateMachine<O, K>) -> Self {
        Self { machine }
    }

    /// The owner context shared by all states of the machine.
    pub fn owner(&self) -> &'a O {
        self.machine.owner()
    }

    /// The machine running this hook or handler.
    pub fn machine(&self) -> &'a StateMachine<O, K> {
        self.machine
    }
}
