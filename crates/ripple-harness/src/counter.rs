#![forbid(unsafe_code)]

use std::cell::Cell;
use std::rc::Rc;

use ripple_core::{Signal, Subscription};

/// Counts how many times a [`Signal`] fired since it was last drained.
///
/// The counter stays subscribed for as long as it lives.
pub struct ChangeCounter {
    hits: Rc<Cell<usize>>,
    _subscription: Subscription,
}

impl ChangeCounter {
    pub fn watch(signal: &Signal) -> Self {
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let subscription = signal.subscribe(move |_| sink.set(sink.get() + 1));
        Self {
            hits,
            _subscription: subscription,
        }
    }

    /// Pulses seen since the last [`take`](Self::take).
    #[must_use]
    pub fn count(&self) -> usize {
        self.hits.get()
    }

    /// Return the pulse count and reset it to zero.
    pub fn take(&self) -> usize {
        self.hits.replace(0)
    }

    /// Whether anything fired since the last [`take`](Self::take).
    #[must_use]
    pub fn has_change(&self) -> bool {
        self.hits.get() > 0
    }
}
