//! Synchronous event delivery for stateful modules.
//!
//! An [`EventChannel`] is owned by the module that emits events. Emitting
//! calls every subscribed listener immediately, in subscription order, and
//! then appends the event to a pending queue that callers may drain at their
//! leisure. Modules emit only after the state change is applied, so
//! listeners always observe the new state's consequences and the event is
//! delivered before the triggering call returns.

use std::fmt;

/// A listener receives events read-only.
pub type Listener<E> = Box<dyn FnMut(&E)>;

/// Listener list plus a pending-event queue.
pub struct EventChannel<E> {
    listeners: Vec<Listener<E>>,
    pending: Vec<E>,
}

impl<E> EventChannel<E> {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Register a listener. Listeners run in registration order.
    pub fn subscribe(&mut self, listener: Listener<E>) {
        self.listeners.push(listener);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver an event to every listener, then queue it.
    pub fn emit(&mut self, event: E) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        self.pending.push(event);
    }

    /// Drain all pending events. Returns events and clears the queue.
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending)
    }

    /// Read-only view of pending events.
    pub fn pending(&self) -> &[E] {
        &self.pending
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: fmt::Debug> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.listeners.len())
            .field("pending", &self.pending)
            .finish()
    }
}
