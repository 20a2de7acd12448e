#![forbid(unsafe_code)]

//! Collection node: tracks membership mutation of one ordered sequence.
//!
//! Children are keyed by element identity and reference-counted: the same
//! `Rc` appearing twice in the sequence owns one child node with an
//! occurrence count of two. The node is created on the first occurrence and
//! released when the last occurrence leaves.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ripple_core::{
    Capabilities, CollectionChange, NotifyCollectionChanged, ObjectId, Subscription, TrackableRef,
};

use super::{NodeCore, NodeState, RegistrationWalk, TrackContext, TrackedNode};
use crate::error::{Result, TrackError};
use crate::registry::ChildRegistry;

pub(crate) struct CollectionNode {
    inner: Rc<Inner>,
}

struct Inner {
    core: Rc<NodeCore>,
    children: RefCell<ChildRegistry<ObjectId, TrackedNode>>,
    native: RefCell<Option<Subscription>>,
}

impl CollectionNode {
    pub(super) fn new(
        target: TrackableRef,
        ctx: &Rc<TrackContext>,
        lineage: Rc<[ObjectId]>,
    ) -> Result<Self> {
        if target.as_notify_collection().is_none() {
            return Err(TrackError::InvalidObjectType {
                type_name: target.type_name(),
            });
        }
        Ok(Self {
            inner: Rc::new(Inner {
                core: NodeCore::new(target, Rc::clone(ctx), lineage),
                children: RefCell::new(ChildRegistry::new()),
                native: RefCell::new(None),
            }),
        })
    }

    pub(super) fn core(&self) -> &Rc<NodeCore> {
        &self.inner.core
    }

    /// Walk the current elements, then subscribe to membership changes.
    pub(super) fn register(&self, walk: &mut RegistrationWalk) -> Result<()> {
        let inner = &self.inner;
        if inner.core.state() != NodeState::Unregistered {
            return Ok(());
        }
        inner.attach_current(walk)?;

        let weak: Weak<Inner> = Rc::downgrade(inner);
        let subscription = inner
            .source()?
            .collection_changed()
            .subscribe(move |change: &CollectionChange| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_collection_changed(change);
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
    fn source(&self) -> Result<&dyn NotifyCollectionChanged> {
        let target = self.core.target();
        target
            .as_notify_collection()
            .ok_or(TrackError::InvalidObjectType {
                type_name: target.type_name(),
            })
    }

    fn attach_current(&self, walk: &mut RegistrationWalk) -> Result<()> {
        for element in self.source()?.elements() {
            self.attach(element, walk)?;
        }
        Ok(())
    }

    /// Count one occurrence of `element`, creating its node on the first.
    fn attach(&self, element: TrackableRef, walk: &mut RegistrationWalk) -> Result<()> {
        if !Capabilities::of(&*element).is_trackable() {
            return Ok(());
        }
        let id = ObjectId::of(&element);
        let existing = self.children.borrow_mut().add_occurrence(&id);
        if let Some(occurrences) = existing {
            tracing::trace!(
                message = "collection.duplicate",
                object = %self.core.id(),
                element = %id,
                occurrences
            );
            return Ok(());
        }
        let Some(child) = TrackedNode::track(element, self.core.ctx(), walk)? else {
            return Ok(());
        };
        let relay = self.core.relay_from(child.changed());
        let displaced = self.children.borrow_mut().insert(id, child, relay);
        if let Some(stale) = displaced {
            stale.release();
        }
        Ok(())
    }

    /// Drop one occurrence of `element`, releasing its node on the last.
    fn detach(&self, element: &TrackableRef) {
        let id = ObjectId::of(element);
        let removed = self.children.borrow_mut().remove_occurrence(&id);
        if let Some(node) = removed {
            node.release();
        }
    }

    fn release_children(&self) {
        let children = self.children.borrow_mut().drain();
        for child in children {
            child.release();
        }
    }

    /// Attach one element from a notification. A failure only drops that
    /// element; its siblings are still attached.
    fn attach_or_warn(&self, element: TrackableRef, walk: &mut RegistrationWalk) {
        let id = ObjectId::of(&element);
        if let Err(err) = self.attach(element, walk) {
            tracing::warn!(
                message = "collection.attach_failed",
                object = %self.core.id(),
                element = %id,
                error = %err
            );
        }
    }

    fn on_collection_changed(&self, change: &CollectionChange) {
        if !self.core.is_registered() {
            return;
        }
        let mut walk = self.core.notification_walk();
        match change {
            CollectionChange::Reset => {
                self.release_children();
                let elements = self.source().map(|source| source.elements()).unwrap_or_default();
                for element in elements {
                    self.attach_or_warn(element, &mut walk);
                }
            }
            CollectionChange::Update { added, removed } => {
                for element in removed {
                    self.detach(element);
                }
                for element in added {
                    self.attach_or_warn(Rc::clone(element), &mut walk);
                }
            }
        }
        self.core.raise_changed();
    }

    fn release(&self) {
        if !self.core.begin_release() {
            return;
        }
        self.release_children();
        let native = self.native.borrow_mut().take();
        drop(native);
    }
}
