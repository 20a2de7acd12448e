#![forbid(unsafe_code)]

//! An ordered collection that announces membership changes.
//!
//! [`ObservableVec<T>`] is the stock [`NotifyCollectionChanged`] source.
//! Every mutation updates the backing vector first, releases the borrow, and
//! only then emits its [`CollectionChange`], so subscribers always observe the
//! post-mutation state and may read the collection re-entrantly.
//!
//! Elements that do not convert to a trackable handle (scalars, `None`) are
//! stored as usual but never appear in emitted element lists.

use std::cell::RefCell;
use std::fmt;

use crate::capability::{
    CollectionChange, IntoTrackable, NotifyCollectionChanged, Trackable, TrackableRef,
};
use crate::notify::Notifier;

/// Ordered, membership-observable sequence.
pub struct ObservableVec<T> {
    items: RefCell<Vec<T>>,
    changed: Notifier<CollectionChange>,
}

impl<T: IntoTrackable + Clone + 'static> ObservableVec<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RefCell::new(items),
            changed: Notifier::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn push(&self, item: T) {
        let added = trackable(&item);
        self.items.borrow_mut().push(item);
        self.changed.notify(&CollectionChange::added(added));
    }

    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, item: T) {
        let added = trackable(&item);
        self.items.borrow_mut().insert(index, item);
        self.changed.notify(&CollectionChange::added(added));
    }

    /// Remove and return the element at `index`, or `None` when out of range.
    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.items.borrow_mut();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.changed
            .notify(&CollectionChange::removed(trackable(&removed)));
        Some(removed)
    }

    pub fn pop(&self) -> Option<T> {
        let removed = self.items.borrow_mut().pop()?;
        self.changed
            .notify(&CollectionChange::removed(trackable(&removed)));
        Some(removed)
    }

    /// Replace the element at `index`, returning the previous one.
    ///
    /// Emits a single update carrying both the removed and the added element.
    pub fn set(&self, index: usize, item: T) -> Option<T> {
        let added = trackable(&item);
        let previous = {
            let mut items = self.items.borrow_mut();
            let slot = items.get_mut(index)?;
            std::mem::replace(slot, item)
        };
        self.changed.notify(&CollectionChange::Update {
            added,
            removed: trackable(&previous),
        });
        Some(previous)
    }

    /// Remove the first element for which `pred` holds.
    pub fn remove_first(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        let index = self.items.borrow().iter().position(pred)?;
        self.remove(index)
    }

    /// Remove everything. Emits [`CollectionChange::Reset`].
    pub fn clear(&self) {
        self.items.borrow_mut().clear();
        self.changed.notify(&CollectionChange::Reset);
    }

    /// Swap in a new element list. Emits [`CollectionChange::Reset`].
    pub fn replace_all(&self, items: Vec<T>) {
        *self.items.borrow_mut() = items;
        self.changed.notify(&CollectionChange::Reset);
    }
}

fn trackable<T: IntoTrackable + Clone>(item: &T) -> Vec<TrackableRef> {
    item.clone().into_trackable().into_iter().collect()
}

impl<T: IntoTrackable + Clone + 'static> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObservableVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableVec")
            .field("len", &self.items.borrow().len())
            .field("subscribers", &self.changed.subscriber_count())
            .finish()
    }
}

impl<T: IntoTrackable + Clone + 'static> Trackable for ObservableVec<T> {
    fn as_notify_collection(&self) -> Option<&dyn NotifyCollectionChanged> {
        Some(self)
    }
}

impl<T: IntoTrackable + Clone + 'static> NotifyCollectionChanged for ObservableVec<T> {
    fn collection_changed(&self) -> &Notifier<CollectionChange> {
        &self.changed
    }

    fn elements(&self) -> Vec<TrackableRef> {
        self.items
            .borrow()
            .iter()
            .filter_map(|item| item.clone().into_trackable())
            .collect()
    }
}
