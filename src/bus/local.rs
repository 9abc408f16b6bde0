//! In-process, single-threaded event bus.

use super::{EventBus, Listener, ReceiverId};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

/// Synchronous bus delivering events to listeners in subscription order.
///
/// `publish` snapshots the listeners for the event type before calling any
/// of them, so listeners can publish, subscribe or forget re-entrantly.
/// Listeners attached during a publish only see later publishes.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use statebus::{LocalBus, ReceiverId};
///
/// struct Ping(u32);
///
/// let bus = LocalBus::new();
/// let seen = Rc::new(Cell::new(0));
/// let sink = seen.clone();
/// bus.subscribe(ReceiverId::new(), move |ping: &Ping| sink.set(ping.0));
///
/// assert_eq!(bus.publish(&Ping(7)), 1);
/// assert_eq!(seen.get(), 7);
/// ```
#[derive(Default)]
pub struct LocalBus {
    listeners: RefCell<HashMap<TypeId, Vec<(ReceiverId, Listener)>>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a typed handler for events of type `E`.
    pub fn subscribe<E, F>(&self, receiver: ReceiverId, handler: F)
    where
        E: 'static,
        F: Fn(&E) + 'static,
    {
        let listener: Listener = Rc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });
        self.listen(receiver, TypeId::of::<E>(), listener);
    }

    /// Deliver `event` to every listener of its type.
    ///
    /// Returns the number of listeners invoked.
    pub fn publish<E: 'static>(&self, event: &E) -> usize {
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .get(&TypeId::of::<E>())
            .map(|entries| entries.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default();

        trace!(
            event = std::any::type_name::<E>(),
            listeners = snapshot.len(),
            "publishing event"
        );

        for listener in &snapshot {
            listener(event as &dyn Any);
        }
        snapshot.len()
    }

    /// Number of listeners attached for events of type `E`.
    pub fn listener_count<E: 'static>(&self) -> usize {
        self.listeners
            .borrow()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// True when no listener is attached for any event type.
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().values().all(Vec::is_empty)
    }
}

impl EventBus for LocalBus {
    fn listen(&self, receiver: ReceiverId, event: TypeId, listener: Listener) {
        self.listeners
            .borrow_mut()
            .entry(event)
            .or_default()
            .push((receiver, listener));
    }

    fn forget(&self, receiver: ReceiverId) {
        let mut listeners = self.listeners.borrow_mut();
        for entries in listeners.values_mut() {
            entries.retain(|(owner, _)| *owner != receiver);
        }
        listeners.retain(|_, entries| !entries.is_empty());
    }
}
