#![forbid(unsafe_code)]

//! Dual node: an object that announces both member and membership changes.
//!
//! Composes one [`PropertyNode`] and one [`CollectionNode`] over the same
//! object and relays both of their signals through its own.

use std::cell::RefCell;
use std::rc::Rc;

use ripple_core::{ObjectId, Subscription, TrackableRef};

use super::{CollectionNode, NodeCore, NodeState, PropertyNode, RegistrationWalk, TrackContext};
use crate::error::Result;

pub(crate) struct DualNode {
    core: Rc<NodeCore>,
    members: PropertyNode,
    elements: CollectionNode,
    relays: RefCell<Vec<Subscription>>,
}

impl DualNode {
    pub(super) fn new(
        target: TrackableRef,
        ctx: &Rc<TrackContext>,
        lineage: Rc<[ObjectId]>,
    ) -> Result<Self> {
        let members = PropertyNode::new(Rc::clone(&target), ctx, Rc::clone(&lineage))?;
        let elements = CollectionNode::new(Rc::clone(&target), ctx, Rc::clone(&lineage))?;
        Ok(Self {
            core: NodeCore::new(target, Rc::clone(ctx), lineage),
            members,
            elements,
            relays: RefCell::new(Vec::with_capacity(2)),
        })
    }

    pub(super) fn core(&self) -> &Rc<NodeCore> {
        &self.core
    }

    pub(super) fn register(&self, walk: &mut RegistrationWalk) -> Result<()> {
        if self.core.state() != NodeState::Unregistered {
            return Ok(());
        }
        {
            let mut relays = self.relays.borrow_mut();
            relays.push(self.core.relay_from(self.members.core().changed()));
            relays.push(self.core.relay_from(self.elements.core().changed()));
        }
        self.members.register(walk)?;
        self.elements.register(walk)?;
        self.core.mark_registered();
        Ok(())
    }

    pub(super) fn release(&self) {
        if !self.core.begin_release() {
            return;
        }
        self.relays.borrow_mut().clear();
        self.members.release();
        self.elements.release();
    }
}
