//! Event bus interface the machine registers against.
//!
//! The bus is an external collaborator: a type-indexed, synchronous
//! publish/subscribe broker. The machine only needs to attach one listener
//! per event type and to detach everything when it is dropped, so the
//! interface is object safe and type-erased at the boundary.
//!
//! [`LocalBus`] is a small in-process implementation.

mod local;

pub use local::LocalBus;

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Type-erased callback invoked with every published event of one type.
pub type Listener = Rc<dyn Fn(&dyn Any)>;

/// Identity of a party subscribed to a bus.
///
/// Every listener is registered under a receiver so that all of a receiver's
/// listeners can be detached at once.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ReceiverId(Uuid);

impl ReceiverId {
    /// Allocate a fresh, random receiver id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ReceiverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Synchronous publish/subscribe broker.
///
/// Implementations must invoke listeners synchronously from `publish` and
/// must tolerate re-entrant calls: a listener may publish, listen or forget
/// while it is being invoked.
pub trait EventBus {
    /// Attach `listener` for events whose type id is `event`.
    fn listen(&self, receiver: ReceiverId, event: TypeId, listener: Listener);

    /// Detach every listener attached by `receiver`.
    fn forget(&self, receiver: ReceiverId);
}
