#![forbid(unsafe_code)]

//! Ripple public facade crate.
//!
//! This crate provides the stable surface: the capability contracts domain
//! types implement, the notification primitives they emit through, and the
//! [`Tracker`] that aggregates their changes.

pub use ripple_core as core;
pub use ripple_tracker as tracker;

pub use ripple_core::{ObservableVec, Signal, Subscription};
pub use ripple_tracker::{CyclePolicy, Result, TrackError, Tracker, TrackerConfig};

pub mod prelude {
    pub use ripple_core::{
        CollectionChange, IntoTrackable, MemberDescriptor, Notifier, NotifyCollectionChanged,
        NotifyPropertyChanged, ObservableVec, Signal, Subscription, TrackClass, TrackMember,
        Trackable, TrackableRef, TypeDescriptor,
    };
    pub use ripple_tracker::{CyclePolicy, TrackError, Tracker, TrackerConfig};
}
