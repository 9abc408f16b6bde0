//! Statebus: a finite state machine driven by a publish/subscribe event bus
//!
//! Each state registers event handlers that only fire while that state is
//! active. The machine coordinates transitions, a transient set of
//! prohibited destinations, and a global switch over event dispatch.
//!
//! # Core Concepts
//!
//! - **State**: a node implementing the `State` trait, with `subscribe`,
//!   `on_enter` and `on_exit` hooks
//! - **StateMachine**: owns the states, dispatches bus events to the current
//!   state's handlers and commits transitions
//! - **Prohibitions**: destinations refused until the next committed
//!   transition
//! - **EventBus**: the synchronous broker the machine listens on
//!
//! Everything is single-threaded and synchronous: publishing an event runs
//! the matching handler before `publish` returns.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use statebus::{state_keys, LocalBus, State, StateContext, StateMachine, Subscriptions};
//!
//! state_keys! {
//!     enum Door {
//!         Closed,
//!         Open,
//!     }
//! }
//!
//! struct Knock;
//!
//! struct DoorState(Door);
//!
//! impl State<RefCell<Vec<String>>, Door> for DoorState {
//!     fn key(&self) -> Door {
//!         self.0
//!     }
//!
//!     fn subscribe(&self, subscriptions: &mut Subscriptions<'_, Self, RefCell<Vec<String>>, Door>) {
//!         if self.0 == Door::Closed {
//!             subscriptions.on::<Knock, _>(|_, _, ctx| {
//!                 ctx.machine().set_next(Door::Open);
//!             });
//!         }
//!     }
//!
//!     fn on_enter(&self, ctx: &StateContext<'_, RefCell<Vec<String>>, Door>) {
//!         ctx.owner().borrow_mut().push(format!("{} entered", self.0.name()));
//!     }
//! }
//!
//! let bus = Rc::new(LocalBus::new());
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let machine: StateMachine<RefCell<Vec<String>>, Door> =
//!     StateMachine::new(log.clone(), bus.clone());
//! machine.add(DoorState(Door::Closed));
//! machine.add(DoorState(Door::Open));
//!
//! bus.publish(&Knock);
//! bus.publish(&Knock);
//!
//! assert_eq!(machine.current_key(), Some(Door::Open));
//! assert_eq!(*log.borrow(), vec!["Open entered"]);
//! ```

pub mod builder;
pub mod bus;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use crate::builder::{BuildError, StateMachineBuilder};
pub use crate::bus::{EventBus, Listener, LocalBus, ReceiverId};
pub use crate::core::{
    Prohibitions, State, StateContext, StateKey, TransitionHistory, TransitionRecord,
};
pub use crate::machine::{MachineConfig, StateMachine, Subscriptions, TransitionOutcome};
