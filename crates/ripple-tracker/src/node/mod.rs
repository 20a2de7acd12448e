#![forbid(unsafe_code)]

//! Tracked nodes: one per wrapped object.
//!
//! A node wraps exactly one [`Trackable`] object for its whole lifetime,
//! subscribes to the object's native notifications, owns child nodes for the
//! eligible members or elements it reaches, and bubbles every change upward
//! through its own [`Signal`].
//!
//! The variant is chosen once, at creation, from the object's
//! [`Capabilities`]:
//!
//! | capabilities                      | variant                      |
//! |-----------------------------------|------------------------------|
//! | member-change + membership-change | [`TrackedNode::Dual`]        |
//! | membership-change only            | [`TrackedNode::Collection`]  |
//! | member-change only                | [`TrackedNode::Property`]    |
//! | neither                           | `TrackError::InvalidObjectType` |
//!
//! # State machine
//!
//! ```text
//! Unregistered --register--> Registered --release--> Disposed
//!       \________________________release_______________^
//! ```
//!
//! `Disposed` is terminal and `release` on a disposed node is a no-op.
//!
//! # Invariants
//!
//! 1. Registration never raises the node's signal; only notifications that
//!    arrive after registration do.
//! 2. A disposed node holds no native subscription, no children, and never
//!    raises its signal again.
//! 3. For one native notification the node finishes every structural update
//!    before raising its signal, and raises it exactly once.

mod collection;
mod dual;
mod property;

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashSet;
use ripple_core::{Capabilities, EligibilityCache, ObjectId, Signal, Subscription, TrackableRef};

use crate::config::{CyclePolicy, TrackerConfig};
use crate::error::{Result, TrackError};

pub(crate) use collection::CollectionNode;
pub(crate) use dual::DualNode;
pub(crate) use property::PropertyNode;

// ─── Shared context ──────────────────────────────────────────────────────────

/// State shared by every node under one tracker.
pub(crate) struct TrackContext {
    config: TrackerConfig,
    eligibility: EligibilityCache,
    live_nodes: Cell<usize>,
}

impl TrackContext {
    pub(crate) fn new(config: TrackerConfig) -> Rc<Self> {
        Rc::new(Self {
            config,
            eligibility: EligibilityCache::new(),
            live_nodes: Cell::new(0),
        })
    }

    pub(crate) fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub(crate) fn eligibility(&self) -> &EligibilityCache {
        &self.eligibility
    }

    pub(crate) fn live_nodes(&self) -> usize {
        self.live_nodes.get()
    }

    fn node_created(&self) {
        self.live_nodes.set(self.live_nodes.get() + 1);
    }

    fn node_released(&self) {
        self.live_nodes.set(self.live_nodes.get().saturating_sub(1));
    }
}

// ─── Registration walk ───────────────────────────────────────────────────────

/// Objects currently being registered on one recursive walk, outermost
/// first.
pub(crate) struct RegistrationWalk {
    policy: CyclePolicy,
    path: Vec<ObjectId>,
    in_progress: AHashSet<ObjectId>,
}

impl RegistrationWalk {
    pub(crate) fn new(policy: CyclePolicy) -> Self {
        Self {
            policy,
            path: Vec::new(),
            in_progress: AHashSet::new(),
        }
    }

    /// Put `object` on the path without cycle checks. Used to resume a walk
    /// below an existing node.
    fn mark(&mut self, object: ObjectId) {
        if self.in_progress.insert(object) {
            self.path.push(object);
        }
    }

    /// Snapshot of the current path.
    fn lineage(&self) -> Rc<[ObjectId]> {
        Rc::from(self.path.as_slice())
    }

    /// Mark `object` as in progress. `Ok(false)` means the object is a
    /// back-edge that should be skipped.
    fn enter(&mut self, object: ObjectId, type_name: &'static str) -> Result<bool> {
        if self.in_progress.insert(object) {
            self.path.push(object);
            return Ok(true);
        }
        match self.policy {
            CyclePolicy::Skip => {
                tracing::debug!(message = "walk.cycle_skipped", object = %object, type_name);
                Ok(false)
            }
            CyclePolicy::Error => Err(TrackError::CycleDetected { object, type_name }),
        }
    }

    fn exit(&mut self, object: ObjectId) {
        if !self.in_progress.remove(&object) {
            return;
        }
        if let Some(pos) = self.path.iter().rposition(|id| *id == object) {
            self.path.remove(pos);
        }
    }
}

// ─── Node core ───────────────────────────────────────────────────────────────

/// Lifecycle state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeState {
    Unregistered,
    Registered,
    Disposed,
}

/// Variant discriminant, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Property,
    Collection,
    Dual,
}

impl NodeKind {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Collection => "collection",
            Self::Dual => "dual",
        }
    }
}

/// State every variant carries: the wrapped object, lifecycle, and the
/// outward signal.
pub(crate) struct NodeCore {
    target: TrackableRef,
    id: ObjectId,
    /// Objects on the walk that created this node, itself included.
    lineage: Rc<[ObjectId]>,
    state: Cell<NodeState>,
    changed: Signal,
    ctx: Rc<TrackContext>,
}

impl NodeCore {
    pub(crate) fn new(
        target: TrackableRef,
        ctx: Rc<TrackContext>,
        lineage: Rc<[ObjectId]>,
    ) -> Rc<Self> {
        let id = ObjectId::of(&target);
        Rc::new(Self {
            target,
            id,
            lineage,
            state: Cell::new(NodeState::Unregistered),
            changed: Signal::new(),
            ctx,
        })
    }

    pub(crate) fn target(&self) -> &TrackableRef {
        &self.target
    }

    pub(crate) fn id(&self) -> ObjectId {
        self.id
    }

    pub(crate) fn ctx(&self) -> &Rc<TrackContext> {
        &self.ctx
    }

    pub(crate) fn state(&self) -> NodeState {
        self.state.get()
    }

    pub(crate) fn is_registered(&self) -> bool {
        self.state.get() == NodeState::Registered
    }

    pub(crate) fn changed(&self) -> &Signal {
        &self.changed
    }

    pub(crate) fn mark_registered(&self) {
        if self.state.get() == NodeState::Unregistered {
            self.state.set(NodeState::Registered);
        }
    }

    /// Enter `Disposed` and detach every listener. Returns `false` when the
    /// node was already disposed.
    pub(crate) fn begin_release(&self) -> bool {
        if self.state.get() == NodeState::Disposed {
            return false;
        }
        self.state.set(NodeState::Disposed);
        self.changed.clear();
        true
    }

    /// Fire the outward signal. Silent unless registered.
    pub(crate) fn raise_changed(&self) {
        if self.is_registered() {
            self.changed.raise();
        }
    }

    /// Bubble `source` into this node's signal.
    pub(crate) fn relay_from(self: &Rc<Self>, source: &Signal) -> Subscription {
        let weak: Weak<Self> = Rc::downgrade(self);
        source.subscribe(move |_| {
            if let Some(core) = weak.upgrade() {
                core.raise_changed();
            }
        })
    }

    /// Walk resumed below this node, for notification handlers. Every
    /// ancestor on the creating walk counts as in progress, so a back-edge
    /// closed by a later mutation is caught just as at registration.
    pub(crate) fn notification_walk(&self) -> RegistrationWalk {
        let mut walk = RegistrationWalk::new(self.ctx.config().cycle_policy);
        for &id in self.lineage.iter() {
            walk.mark(id);
        }
        walk.mark(self.id);
        walk
    }
}

// ─── Tracked node ────────────────────────────────────────────────────────────

/// A node wrapping one trackable object.
pub(crate) enum TrackedNode {
    Property(PropertyNode),
    Collection(CollectionNode),
    Dual(DualNode),
}

impl TrackedNode {
    /// Factory: classify `target` and build the matching unregistered node.
    pub(crate) fn for_object(
        target: TrackableRef,
        ctx: &Rc<TrackContext>,
        lineage: Rc<[ObjectId]>,
    ) -> Result<Self> {
        let caps = Capabilities::of(&*target);
        let node = if caps.contains(Capabilities::MEMBER_CHANGE | Capabilities::MEMBERSHIP_CHANGE) {
            Self::Dual(DualNode::new(target, ctx, lineage)?)
        } else if caps.contains(Capabilities::MEMBERSHIP_CHANGE) {
            Self::Collection(CollectionNode::new(target, ctx, lineage)?)
        } else if caps.contains(Capabilities::MEMBER_CHANGE) {
            Self::Property(PropertyNode::new(target, ctx, lineage)?)
        } else {
            return Err(TrackError::InvalidObjectType {
                type_name: target.type_name(),
            });
        };
        ctx.node_created();
        Ok(node)
    }

    /// Create and register a node for `target` on the given walk.
    ///
    /// Returns `Ok(None)` when `target` is a back-edge skipped by the cycle
    /// policy. On error nothing stays subscribed.
    pub(crate) fn track(
        target: TrackableRef,
        ctx: &Rc<TrackContext>,
        walk: &mut RegistrationWalk,
    ) -> Result<Option<Self>> {
        let id = ObjectId::of(&target);
        if !walk.enter(id, target.type_name())? {
            return Ok(None);
        }
        let lineage = walk.lineage();
        let result = Self::for_object(target, ctx, lineage).and_then(|node| match node.register(walk) {
            Ok(()) => Ok(node),
            Err(err) => {
                node.release();
                Err(err)
            }
        });
        walk.exit(id);
        result.map(Some)
    }

    fn core(&self) -> &Rc<NodeCore> {
        match self {
            Self::Property(node) => node.core(),
            Self::Collection(node) => node.core(),
            Self::Dual(node) => node.core(),
        }
    }

    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Self::Property(_) => NodeKind::Property,
            Self::Collection(_) => NodeKind::Collection,
            Self::Dual(_) => NodeKind::Dual,
        }
    }

    pub(crate) fn id(&self) -> ObjectId {
        self.core().id()
    }

    pub(crate) fn state(&self) -> NodeState {
        self.core().state()
    }

    pub(crate) fn changed(&self) -> &Signal {
        self.core().changed()
    }

    fn register(&self, walk: &mut RegistrationWalk) -> Result<()> {
        match self {
            Self::Property(node) => node.register(walk)?,
            Self::Collection(node) => node.register(walk)?,
            Self::Dual(node) => node.register(walk)?,
        }
        tracing::debug!(
            message = "node.register",
            kind = self.kind().as_str(),
            object = %self.id(),
            type_name = self.core().target().type_name()
        );
        Ok(())
    }

    /// Unsubscribe and dispose the whole subtree. Idempotent.
    pub(crate) fn release(&self) {
        if self.state() == NodeState::Disposed {
            return;
        }
        match self {
            Self::Property(node) => node.release(),
            Self::Collection(node) => node.release(),
            Self::Dual(node) => node.release(),
        }
        self.core().ctx().node_released();
        tracing::debug!(
            message = "node.release",
            kind = self.kind().as_str(),
            object = %self.id()
        );
    }
}

impl fmt::Debug for TrackedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedNode")
            .field("kind", &self.kind())
            .field("object", &self.id())
            .field("state", &self.state())
            .finish()
    }
}
