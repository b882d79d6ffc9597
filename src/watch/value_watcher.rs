//! ValueWatcher - a single value plus the listeners interested in it.

use std::cell::RefCell;
use std::rc::Rc;

/// Listener callback (Rc so the list can be snapshotted before notifying).
pub type Listener<V> = Rc<dyn Fn(&V)>;

/// Keeps track of a single value and notifies listeners when it changes.
///
/// Notification is synchronous and unbatched. Listeners are snapshotted
/// before each notification, so a listener may call back into the watcher.
pub struct ValueWatcher<V> {
    value: RefCell<Option<V>>,
    listeners: RefCell<Vec<Listener<V>>>,
}

impl<V: Clone> ValueWatcher<V> {
    pub fn new() -> Self {
        Self {
            value: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Current value, `None` until the first `set`.
    pub fn value(&self) -> Option<V> {
        self.value.borrow().clone()
    }

    /// Register a listener. It is not called with the current value.
    pub fn listen(&self, listener: impl Fn(&V) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Replace the value, then notify every listener in registration order.
    pub fn set(&self, value: V) {
        *self.value.borrow_mut() = Some(value.clone());

        let listeners = self.listeners.borrow().clone();
        for listener in &listeners {
            listener(&value);
        }
    }

    /// Remove all listeners. The value is kept.
    pub fn stop(&self) {
        self.listeners.borrow_mut().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl<V: Clone> Default for ValueWatcher<V> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
