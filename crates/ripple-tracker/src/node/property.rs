#![forbid(unsafe_code)]

//! Property node: tracks member-level mutation of one object.
//!
//! Children are keyed by member name. Only members in the type's
//! [`EligibleMembers`] set are ever walked or reacted to.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ripple_core::{
    Capabilities, EligibleMembers, NotifyPropertyChanged, ObjectId, Subscription, TrackableRef,
};

use super::{NodeCore, NodeState, RegistrationWalk, TrackContext, TrackedNode};
use crate::error::{Result, TrackError};
use crate::registry::ChildRegistry;

pub(crate) struct PropertyNode {
    inner: Rc<Inner>,
}

struct Inner {
    core: Rc<NodeCore>,
    eligible: Rc<EligibleMembers>,
    children: RefCell<ChildRegistry<&'static str, TrackedNode>>,
    native: RefCell<Option<Subscription>>,
}

impl PropertyNode {
    pub(super) fn new(
        target: TrackableRef,
        ctx: &Rc<TrackContext>,
        lineage: Rc<[ObjectId]>,
    ) -> Result<Self> {
        let Some(source) = target.as_notify_property() else {
            return Err(TrackError::InvalidObjectType {
                type_name: target.type_name(),
            });
        };
        let eligible = ctx.eligibility().resolve(source.type_descriptor());
        Ok(Self {
            inner: Rc::new(Inner {
                core: NodeCore::new(target, Rc::clone(ctx), lineage),
                eligible,
                children: RefCell::new(ChildRegistry::new()),
                native: RefCell::new(None),
            }),
        })
    }

    pub(super) fn core(&self) -> &Rc<NodeCore> {
        &self.inner.core
    }

    /// Walk every eligible member, then subscribe to member-change
    /// notifications.
    pub(super) fn register(&self, walk: &mut RegistrationWalk) -> Result<()> {
        let inner = &self.inner;
        if inner.core.state() != NodeState::Unregistered {
            return Ok(());
        }
        for &member in inner.eligible.names() {
            inner.attach_member(member, walk)?;
        }

        let weak: Weak<Inner> = Rc::downgrade(inner);
        let subscription = inner.source()?.property_changed().subscribe(move |member: &str| {
            if let Some(inner) = weak.upgrade() {
                inner.on_member_changed(member);
            }
        });
        *inner.native.borrow_mut() = Some(subscription);
        inner.core.mark_registered();
        Ok(())
    }

    pub(super) fn release(&self) {
        self.inner.release();
    }

    #[cfg(test)]
    pub(super) fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }
}

impl Inner {
    fn source(&self) -> Result<&dyn NotifyPropertyChanged> {
        let target = self.core.target();
        target
            .as_notify_property()
            .ok_or(TrackError::InvalidObjectType {
                type_name: target.type_name(),
            })
    }

    /// Track the current value of `member` if it is trackable.
    fn attach_member(&self, member: &'static str, walk: &mut RegistrationWalk) -> Result<()> {
        let Some(value) = self.source()?.member_value(member) else {
            return Ok(());
        };
        if !Capabilities::of(&*value).is_trackable() {
            return Ok(());
        }
        let Some(child) = TrackedNode::track(value, self.core.ctx(), walk)? else {
            return Ok(());
        };
        let relay = self.core.relay_from(child.changed());
        let displaced = self.children.borrow_mut().insert(member, child, relay);
        if let Some(stale) = displaced {
            stale.release();
        }
        Ok(())
    }

    fn on_member_changed(&self, member: &str) {
        if !self.core.is_registered() {
            return;
        }
        let Some(member) = self.eligible.lookup(member) else {
            tracing::trace!(
                message = "property.ignored",
                object = %self.core.id(),
                type_name = self.eligible.type_name(),
                member
            );
            return;
        };

        let previous = self.children.borrow_mut().remove(&member);
        if let Some(previous) = previous {
            previous.release();
        }

        let mut walk = self.core.notification_walk();
        if let Err(err) = self.attach_member(member, &mut walk) {
            tracing::warn!(
                message = "property.attach_failed",
                object = %self.core.id(),
                member,
                error = %err
            );
        }
        self.core.raise_changed();
    }

    fn release(&self) {
        if !self.core.begin_release() {
            return;
        }
        let native = self.native.borrow_mut().take();
        drop(native);
        let children = self.children.borrow_mut().drain();
        for child in children {
            child.release();
        }
    }
}
