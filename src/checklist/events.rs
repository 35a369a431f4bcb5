//! Change-notification channel for the stores.
//!
//! A [`Publisher`] delivers values synchronously to all current subscribers
//! in registration order, within the publishing call. There is no buffering
//! and no back-pressure: subscribers must return promptly. Unsubscribing is
//! done by dropping the [`Subscription`] guard; in-flight publishes always
//! run to completion.
//!
//! Single-threaded by design (`Rc`/`RefCell`), matching the rest of the
//! core.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

pub struct Publisher<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }
}

impl<T> Publisher<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. It stays registered until the returned guard
    /// is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription<T> {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push((id, Rc::new(callback)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver `value` to every current subscriber, in registration order.
    ///
    /// The subscriber list is snapshotted first, so a callback may
    /// subscribe or unsubscribe without poisoning the delivery loop; such
    /// changes take effect from the next publish.
    pub fn publish(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .registry
            .borrow()
            .subscribers
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in snapshot {
            callback(value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().subscribers.len()
    }
}

/// RAII guard: dropping it removes the subscriber before the next publish.
pub struct Subscription<T> {
    id: u64,
    registry: Weak<RefCell<Registry<T>>>,
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .subscribers
                .retain(|(id, _)| *id != self.id);
        }
    }
}
