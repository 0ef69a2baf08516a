// ── Change notification ──
//
// Synchronous fan-out to registered listeners. Every committed change is
// delivered to all listeners before the mutating call returns; deferred
// effects notify again when they are drained.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A change to an [`InterfaceCollection`](crate::InterfaceCollection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    /// A new interface was inserted at `index`.
    Added { name: String, index: usize },
    /// An existing interface was replaced in place.
    Updated { name: String, index: usize },
    /// An interface was deleted from `index`.
    Removed { name: String, index: usize },
    /// A deferred effect cleared the addressing of a new member.
    AddressingCleared { name: String },
    /// A deferred effect restored the addressing of a released member.
    AddressingRestored { name: String },
    /// The primary interface selection changed.
    PrimaryChanged { primary: Option<String> },
    /// The whole collection was reloaded.
    Reset,
}

impl CollectionEvent {
    /// Interface the event is about, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Added { name, .. }
            | Self::Updated { name, .. }
            | Self::Removed { name, .. }
            | Self::AddressingCleared { name }
            | Self::AddressingRestored { name } => Some(name),
            Self::PrimaryChanged { .. } | Self::Reset => None,
        }
    }
}

type Callback = Rc<RefCell<dyn FnMut(&CollectionEvent)>>;

#[derive(Default)]
struct Slots {
    next_id: u64,
    listeners: Vec<(u64, Callback)>,
}

/// Registered listeners of one collection.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    slots: Rc<RefCell<Slots>>,
}

impl ListenerRegistry {
    pub(crate) fn subscribe(&self, callback: impl FnMut(&CollectionEvent) + 'static) -> Subscription {
        let mut slots = self.slots.borrow_mut();
        let id = slots.next_id;
        slots.next_id += 1;
        slots.listeners.push((id, Rc::new(RefCell::new(callback))));
        Subscription {
            id,
            slots: Rc::downgrade(&self.slots),
        }
    }

    /// Deliver `event` to every listener registered at the time of the call.
    ///
    /// The listener list is copied first, so a callback may drop its own
    /// (or another) subscription without invalidating the iteration.
    pub(crate) fn emit(&self, event: &CollectionEvent) {
        let listeners: Vec<Callback> = self
            .slots
            .borrow()
            .listeners
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();

        for listener in listeners {
            // A listener already running further up the stack is skipped
            // rather than re-entered.
            if let Ok(mut callback) = listener.try_borrow_mut() {
                (*callback)(event);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.borrow().listeners.len()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Disposer handle returned by
/// [`InterfaceCollection::subscribe`](crate::InterfaceCollection::subscribe).
///
/// The listener stays registered while the handle lives. Dropping it, or
/// calling [`unsubscribe`](Self::unsubscribe), detaches the listener.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    slots: Weak<RefCell<Slots>>,
}

impl Subscription {
    /// Detach the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the listener registered for the lifetime of the collection.
    pub fn detach(mut self) {
        self.slots = Weak::new();
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.slots
            .upgrade()
            .is_some_and(|slots| slots.borrow().listeners.iter().any(|(id, _)| *id == self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            slots.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<CollectionEvent>>>, impl FnMut(&CollectionEvent)) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |e: &CollectionEvent| sink.borrow_mut().push(e.clone()))
    }

    #[test]
    fn emit_reaches_all_listeners() {
        let registry = ListenerRegistry::default();
        let (a, cb_a) = recorder();
        let (b, cb_b) = recorder();
        let _sa = registry.subscribe(cb_a);
        let _sb = registry.subscribe(cb_b);

        registry.emit(&CollectionEvent::Reset);

        assert_eq!(a.borrow().len(), 1);
        assert_eq!(b.borrow().len(), 1);
    }

    #[test]
    fn dropping_the_handle_unsubscribes() {
        let registry = ListenerRegistry::default();
        let (seen, cb) = recorder();
        let sub = registry.subscribe(cb);
        assert!(sub.is_active());

        sub.unsubscribe();
        registry.emit(&CollectionEvent::Reset);

        assert!(seen.borrow().is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn detached_listener_survives_handle() {
        let registry = ListenerRegistry::default();
        let (seen, cb) = recorder();
        registry.subscribe(cb).detach();

        registry.emit(&CollectionEvent::Reset);

        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn event_name_accessor() {
        let e = CollectionEvent::Added {
            name: "eth0".into(),
            index: 0,
        };
        assert_eq!(e.name(), Some("eth0"));
        assert_eq!(CollectionEvent::Reset.name(), None);
    }
}
