#![forbid(unsafe_code)]

//! Core: notification primitives, capability contracts, and eligibility rules.
//!
//! Everything the tracking engine consumes from the outside world lives here:
//! the [`Notifier`]/[`Subscription`] pair native notifications are delivered
//! through, the [`Trackable`] capability traits domain objects implement, the
//! [`TypeDescriptor`] tables the eligibility rule is evaluated against, and
//! [`ObservableVec`], a stock membership-change source.

pub mod capability;
pub mod collection;
pub mod eligibility;
pub mod notify;

pub use capability::{
    Capabilities, CollectionChange, IntoTrackable, NotifyCollectionChanged,
    NotifyPropertyChanged, ObjectId, Trackable, TrackableRef,
};
pub use collection::ObservableVec;
pub use eligibility::{
    Declaration, EligibilityCache, EligibleMembers, MemberDescriptor, MemberScope, TrackClass,
    TrackMember, TypeDescriptor, Visibility, resolve_eligibility,
};
pub use notify::{Notifier, Signal, Subscription};
