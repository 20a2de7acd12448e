#![forbid(unsafe_code)]

//! Capability contracts consumed by the tracker.
//!
//! A value takes part in change tracking by implementing [`Trackable`] and
//! exposing one or both native notification capabilities:
//!
//! - [`NotifyPropertyChanged`]: emits the name of a member whose value just
//!   changed, after the new value is visible through
//!   [`member_value`](NotifyPropertyChanged::member_value).
//! - [`NotifyCollectionChanged`]: emits a [`CollectionChange`] after the
//!   collection already reflects it.
//!
//! Identity matters, not value equality: [`ObjectId`] is derived from the
//! `Rc` allocation a [`TrackableRef`] points to.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::eligibility::TypeDescriptor;
use crate::notify::Notifier;

/// Shared, type-erased handle to a trackable object.
pub type TrackableRef = Rc<dyn Trackable>;

/// An object that can be wrapped by a tracked node.
///
/// Both accessors default to `None`; an implementation that overrides
/// neither is rejected by the tracker.
pub trait Trackable: 'static {
    /// Member-level change notification, if supported.
    fn as_notify_property(&self) -> Option<&dyn NotifyPropertyChanged> {
        None
    }

    /// Membership change notification over an ordered sequence, if supported.
    fn as_notify_collection(&self) -> Option<&dyn NotifyCollectionChanged> {
        None
    }

    /// Concrete type name, used in diagnostics and errors.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Objects that announce member-level mutation.
pub trait NotifyPropertyChanged {
    /// Static member table and class-level configuration.
    fn type_descriptor(&self) -> &'static TypeDescriptor;

    /// Source emitting the name of each member after its value changed.
    fn property_changed(&self) -> &Notifier<str>;

    /// Read accessor. Returns `None` for members whose current value is
    /// absent, null, or not a trackable object.
    fn member_value(&self, name: &str) -> Option<TrackableRef>;
}

/// Objects that announce membership changes over an ordered sequence.
pub trait NotifyCollectionChanged {
    /// Source emitting each membership change.
    fn collection_changed(&self) -> &Notifier<CollectionChange>;

    /// Trackable elements in order, one entry per occurrence.
    fn elements(&self) -> Vec<TrackableRef>;
}

/// A membership change over an ordered collection.
#[derive(Clone)]
pub enum CollectionChange {
    /// Bulk or unknown change; previous membership must be discarded.
    Reset,
    /// Explicit element lists. Either may be empty.
    Update {
        added: Vec<TrackableRef>,
        removed: Vec<TrackableRef>,
    },
}

impl CollectionChange {
    /// Elements appended or inserted.
    #[must_use]
    pub fn added(items: Vec<TrackableRef>) -> Self {
        Self::Update {
            added: items,
            removed: Vec::new(),
        }
    }

    /// Elements taken out.
    #[must_use]
    pub fn removed(items: Vec<TrackableRef>) -> Self {
        Self::Update {
            added: Vec::new(),
            removed: items,
        }
    }

    /// Whether this is a [`CollectionChange::Reset`].
    #[must_use]
    pub const fn is_reset(&self) -> bool {
        matches!(self, Self::Reset)
    }
}

impl fmt::Debug for CollectionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("Reset"),
            Self::Update { added, removed } => f
                .debug_struct("Update")
                .field("added", &added.iter().map(ObjectId::of).collect::<Vec<_>>())
                .field(
                    "removed",
                    &removed.iter().map(ObjectId::of).collect::<Vec<_>>(),
                )
                .finish(),
        }
    }
}

bitflags! {
    /// Native notification capabilities an object exposes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Emits member-change notifications.
        const MEMBER_CHANGE = 1 << 0;
        /// Emits membership-change notifications.
        const MEMBERSHIP_CHANGE = 1 << 1;
    }
}

impl Capabilities {
    /// Inspect an object.
    #[must_use]
    pub fn of(object: &dyn Trackable) -> Self {
        let mut caps = Self::empty();
        if object.as_notify_property().is_some() {
            caps |= Self::MEMBER_CHANGE;
        }
        if object.as_notify_collection().is_some() {
            caps |= Self::MEMBERSHIP_CHANGE;
        }
        caps
    }

    /// At least one capability is present.
    #[must_use]
    pub const fn is_trackable(self) -> bool {
        !self.is_empty()
    }
}

/// Reference identity of a tracked object.
///
/// Two handles compare equal iff they point to the same allocation. The id
/// is only meaningful while some handle keeps the allocation alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Identity of the allocation behind `object`.
    #[must_use]
    pub fn of(object: &TrackableRef) -> Self {
        Self(Rc::as_ptr(object).cast::<()>() as usize)
    }

    /// Raw address value.
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Conversion into an optional trackable handle.
///
/// `None` is how a null entry is spelled; scalars convert to `None` as well.
pub trait IntoTrackable {
    /// Perform the conversion.
    fn into_trackable(self) -> Option<TrackableRef>;
}

impl<T: Trackable> IntoTrackable for Rc<T> {
    fn into_trackable(self) -> Option<TrackableRef> {
        Some(self)
    }
}

impl IntoTrackable for TrackableRef {
    fn into_trackable(self) -> Option<TrackableRef> {
        Some(self)
    }
}

impl<T: IntoTrackable> IntoTrackable for Option<T> {
    fn into_trackable(self) -> Option<TrackableRef> {
        self.and_then(IntoTrackable::into_trackable)
    }
}

impl<T: IntoTrackable + Clone> IntoTrackable for &T {
    fn into_trackable(self) -> Option<TrackableRef> {
        self.clone().into_trackable()
    }
}

macro_rules! never_trackable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoTrackable for $ty {
                fn into_trackable(self) -> Option<TrackableRef> {
                    None
                }
            }
        )*
    };
}

never_trackable!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);

#[cfg(test)]
mod tests {
    use super::*;

    struct Inert;
    impl Trackable for Inert {}

    #[test]
    fn inert_object_has_no_capabilities() {
        let obj: TrackableRef = Rc::new(Inert);
        let caps = Capabilities::of(&*obj);
        assert!(caps.is_empty());
        assert!(!caps.is_trackable());
        assert!(obj.type_name().ends_with("Inert"));
    }

    #[test]
    fn identity_follows_allocation_not_value() {
        let a: TrackableRef = Rc::new(Inert);
        let b: TrackableRef = Rc::new(Inert);
        let a2 = Rc::clone(&a);
        assert_eq!(ObjectId::of(&a), ObjectId::of(&a2));
        assert_ne!(ObjectId::of(&a), ObjectId::of(&b));
    }

    #[test]
    fn into_trackable_conversions() {
        let concrete = Rc::new(Inert);
        assert!(Rc::clone(&concrete).into_trackable().is_some());
        assert!((&concrete).into_trackable().is_some());
        assert!(Some(Rc::clone(&concrete)).into_trackable().is_some());
        assert!(None::<Rc<Inert>>.into_trackable().is_none());
        assert!(42_i32.into_trackable().is_none());
        assert!(String::from("x").into_trackable().is_none());
    }

    #[test]
    fn collection_change_constructors() {
        let item: TrackableRef = Rc::new(Inert);
        assert!(CollectionChange::Reset.is_reset());
        match CollectionChange::added(vec![Rc::clone(&item)]) {
            CollectionChange::Update { added, removed } => {
                assert_eq!(added.len(), 1);
                assert!(removed.is_empty());
            }
            CollectionChange::Reset => panic!("expected update"),
        }
        match CollectionChange::removed(vec![item]) {
            CollectionChange::Update { added, removed } => {
                assert!(added.is_empty());
                assert_eq!(removed.len(), 1);
            }
            CollectionChange::Reset => panic!("expected update"),
        }
    }
}
