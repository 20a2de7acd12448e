#![forbid(unsafe_code)]

//! The public root of a tracked object graph.
//!
//! A [`Tracker`] owns one tracked node per root object, relays every node's
//! bubbled signal into its own [`Signal`], and tears the whole graph down on
//! [`Tracker::release`] or drop.
//!
//! # Failure Modes
//!
//! - `track` validates its whole input before creating any node. An empty
//!   input, a `None` entry, or an entry with no trackable capability fails
//!   with [`TrackError::InvalidArgument`] and leaves the tracker unchanged.
//! - Under [`CyclePolicy::Error`] a cycle fails the call with
//!   [`TrackError::CycleDetected`]; every root created by that call is
//!   released again before the error is returned.
//! - Roots are not deduplicated. Tracking the same object twice yields two
//!   independent roots, so one mutation raises the signal twice.
//!
//! [`CyclePolicy::Error`]: crate::CyclePolicy::Error

use std::fmt;
use std::rc::Rc;

use ripple_core::{Capabilities, IntoTrackable, Signal, Subscription, TrackableRef};

use crate::config::TrackerConfig;
use crate::error::{Result, TrackError};
use crate::node::{RegistrationWalk, TrackContext, TrackedNode};

struct RootEntry {
    node: TrackedNode,
    _relay: Subscription,
}

/// Aggregates change notifications from a graph of trackable objects into
/// one [`Signal`].
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use ripple_harness::Person;
/// use ripple_tracker::Tracker;
///
/// let person = Person::new("A");
/// let mut tracker = Tracker::new();
/// tracker.track([person.clone()])?;
///
/// let refreshes = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&refreshes);
/// let _sub = tracker.subscribe(move || sink.set(sink.get() + 1));
///
/// person.set_name("B");
/// assert_eq!(refreshes.get(), 1);
/// # Ok::<(), ripple_tracker::TrackError>(())
/// ```
pub struct Tracker {
    ctx: Rc<TrackContext>,
    roots: Vec<RootEntry>,
    changed: Signal,
}

impl Tracker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    #[must_use]
    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            ctx: TrackContext::new(config),
            roots: Vec::new(),
            changed: Signal::new(),
        }
    }

    /// Track each object in `objects` as a new root.
    ///
    /// Returns `self` so calls can be chained.
    pub fn track<I>(&mut self, objects: I) -> Result<&mut Self>
    where
        I: IntoIterator,
        I::Item: IntoTrackable,
    {
        let targets = validate(objects)?;
        let _span = tracing::debug_span!("tracker.track", roots = targets.len()).entered();

        let first_new = self.roots.len();
        for target in targets {
            let mut walk = RegistrationWalk::new(self.ctx.config().cycle_policy);
            match TrackedNode::track(target, &self.ctx, &mut walk) {
                Ok(Some(node)) => {
                    let outward = self.changed.clone();
                    let relay = node.changed().subscribe(move |_| outward.raise());
                    self.roots.push(RootEntry {
                        node,
                        _relay: relay,
                    });
                }
                // A fresh walk has nothing in progress, so nothing is skipped.
                Ok(None) => {}
                Err(err) => {
                    self.release_from(first_new);
                    return Err(err);
                }
            }
        }
        Ok(self)
    }

    /// The aggregated "something changed" signal.
    pub fn changed(&self) -> &Signal {
        &self.changed
    }

    /// Run `callback` on every change until the returned handle drops.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.changed.subscribe(move |_| callback())
    }

    /// Drop all listeners and release every root. Idempotent.
    pub fn release(&mut self) {
        self.changed.clear();
        if self.roots.is_empty() {
            return;
        }
        let roots = self.roots.len();
        self.release_from(0);
        tracing::debug!(
            message = "tracker.release",
            roots,
            live_nodes = self.ctx.live_nodes()
        );
    }

    fn release_from(&mut self, first: usize) {
        for entry in self.roots.drain(first..) {
            entry.node.release();
        }
    }

    /// Number of roots, duplicates included.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Nodes currently alive under this tracker.
    pub fn live_nodes(&self) -> usize {
        self.ctx.live_nodes()
    }

    pub fn config(&self) -> &TrackerConfig {
        self.ctx.config()
    }
}

/// Convert every object up front so a bad entry fails before any node exists.
fn validate<I>(objects: I) -> Result<Vec<TrackableRef>>
where
    I: IntoIterator,
    I::Item: IntoTrackable,
{
    let mut targets = Vec::new();
    for (index, object) in objects.into_iter().enumerate() {
        let Some(target) = object.into_trackable() else {
            return Err(TrackError::invalid(format!(
                "object {index} is null or not a trackable type"
            )));
        };
        if !Capabilities::of(&*target).is_trackable() {
            return Err(TrackError::invalid(format!(
                "object {index} ({}) emits no change notifications",
                target.type_name()
            )));
        }
        targets.push(target);
    }
    if targets.is_empty() {
        return Err(TrackError::invalid("no objects to track"));
    }
    Ok(targets)
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("roots", &self.roots.iter().map(|r| &r.node).collect::<Vec<_>>())
            .field("live_nodes", &self.ctx.live_nodes())
            .field("config", self.ctx.config())
            .finish()
    }
}
