#![forbid(unsafe_code)]

//! Multicast notification sources with RAII subscriptions.
//!
//! [`Notifier<A>`] is the native notification channel every trackable object
//! exposes: a member-change source is a `Notifier<str>` that emits the member
//! name, a membership-change source is a `Notifier<CollectionChange>`, and a
//! bare "something changed" pulse is a [`Signal`] (`Notifier<()>`).
//!
//! # Architecture
//!
//! `Notifier<A>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Subscribers are stored as `Weak` callbacks; the strong reference lives in
//! the [`Subscription`] returned to the caller. Dead entries are pruned lazily
//! at the start of every notification.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Dropping a [`Subscription`] stops delivery immediately, including for a
//!    notification that is already in flight.
//! 3. No interior borrow is held while a callback runs, so callbacks may
//!    subscribe, unsubscribe, or notify re-entrantly.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<A> = dyn Fn(&A);

struct NotifierInner<A: ?Sized + 'static> {
    subscribers: Vec<Weak<Callback<A>>>,
}

/// A single-threaded multicast notification source.
///
/// Cloning a `Notifier` creates a new handle to the **same** subscriber list.
pub struct Notifier<A: ?Sized + 'static> {
    inner: Rc<RefCell<NotifierInner<A>>>,
}

/// A zero-payload notification: "something changed".
pub type Signal = Notifier<()>;

impl<A: ?Sized + 'static> Notifier<A> {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(NotifierInner {
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register a callback. Delivery stops when the returned guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&A) + 'static) -> Subscription {
        let strong: Rc<Callback<A>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            guard: Some(Box::new(strong)),
        }
    }

    /// Deliver `args` to every live subscriber.
    pub fn notify(&self, args: &A) {
        let snapshot: Vec<Weak<Callback<A>>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner.subscribers.clone()
        };
        for weak in snapshot {
            if let Some(callback) = weak.upgrade() {
                callback(args);
            }
        }
    }

    /// Number of subscribers whose guard is still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Detach every subscriber. Outstanding guards become inert.
    pub fn clear(&self) {
        self.inner.borrow_mut().subscribers.clear();
    }
}

impl Notifier<()> {
    /// Emit a zero-payload pulse.
    pub fn raise(&self) {
        self.notify(&());
    }
}

impl<A: ?Sized + 'static> Clone for Notifier<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A: ?Sized + 'static> Default for Notifier<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized + 'static> fmt::Debug for Notifier<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// RAII guard for a [`Notifier`] callback.
///
/// Dropping the guard unsubscribes. The guard is type-erased so handles from
/// notifiers with different payloads can be stored side by side.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    guard: Option<Box<dyn Any>>,
}

impl Subscription {
    /// Explicitly unsubscribe. Equivalent to dropping the guard.
    pub fn unsubscribe(mut self) {
        self.guard = None;
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.guard.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn delivers_in_registration_order() {
        let notifier: Notifier<i32> = Notifier::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _s1 = notifier.subscribe(move |v| l1.borrow_mut().push(("first", *v)));
        let l2 = Rc::clone(&log);
        let _s2 = notifier.subscribe(move |v| l2.borrow_mut().push(("second", *v)));

        notifier.notify(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn dropping_guard_unsubscribes() {
        let signal = Signal::new();
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let sub = signal.subscribe(move |_| h.set(h.get() + 1));

        signal.raise();
        assert_eq!(hits.get(), 1);
        assert_eq!(signal.subscriber_count(), 1);

        drop(sub);
        signal.raise();
        assert_eq!(hits.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn explicit_unsubscribe_matches_drop() {
        let signal = Signal::new();
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let sub = signal.subscribe(move |_| h.set(h.get() + 1));
        sub.unsubscribe();
        signal.raise();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn str_payload_is_borrowed() {
        let notifier: Notifier<str> = Notifier::new();
        let seen = Rc::new(RefCell::new(String::new()));
        let s = Rc::clone(&seen);
        let _sub = notifier.subscribe(move |name: &str| s.borrow_mut().push_str(name));
        notifier.notify("spouse");
        assert_eq!(seen.borrow().as_str(), "spouse");
    }

    #[test]
    fn guard_dropped_mid_notification_is_skipped() {
        let signal = Signal::new();
        let second_hits = Rc::new(Cell::new(0u32));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot_clone = Rc::clone(&slot);
        let _first = signal.subscribe(move |_| {
            slot_clone.borrow_mut().take();
        });
        let h = Rc::clone(&second_hits);
        *slot.borrow_mut() = Some(signal.subscribe(move |_| h.set(h.get() + 1)));

        signal.raise();
        assert_eq!(second_hits.get(), 0);
    }

    #[test]
    fn reentrant_subscribe_during_notify() {
        let signal = Signal::new();
        let late: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));
        let late_hits = Rc::new(Cell::new(0u32));

        let signal_clone = signal.clone();
        let late_clone = Rc::clone(&late);
        let hits_clone = Rc::clone(&late_hits);
        let _outer = signal.subscribe(move |_| {
            let h = Rc::clone(&hits_clone);
            let sub = signal_clone.subscribe(move |_| h.set(h.get() + 1));
            late_clone.borrow_mut().push(sub);
        });

        signal.raise();
        assert_eq!(late_hits.get(), 0);
        signal.raise();
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn clear_detaches_everyone() {
        let signal = Signal::new();
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let _sub = signal.subscribe(move |_| h.set(h.get() + 1));
        signal.clear();
        signal.raise();
        assert_eq!(hits.get(), 0);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn clones_share_subscribers() {
        let a = Signal::new();
        let b = a.clone();
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let _sub = a.subscribe(move |_| h.set(h.get() + 1));
        b.raise();
        assert_eq!(hits.get(), 1);
    }
}
