#![forbid(unsafe_code)]

//! Eligibility resolution: which members of a type are tracked.
//!
//! Types that emit member-change notifications describe their members with a
//! static [`TypeDescriptor`]. Class-level policy lives in an optional
//! [`TrackClass`]; per-member overrides live in an optional [`TrackMember`].
//!
//! # Rule
//!
//! For member `p` of a type carrying class configuration `C`:
//!
//! - indexed members are never eligible;
//! - if `p` carries a [`TrackMember`], it is eligible iff not excluded, and
//!   visibility is not consulted;
//! - otherwise `p` is eligible iff (`C` is absent or
//!   `C.require_explicit_inclusion` is false) and `p` is publicly readable.
//!
//! Enumeration covers every member regardless of visibility, restricted to
//! declared members when `C.include_inherited_members` is false.
//!
//! Resolution is a pure function of the descriptor. [`EligibilityCache`]
//! memoizes it per descriptor identity.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

/// Class-level tracking policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackClass {
    /// Enumerate inherited members as well as declared ones.
    pub include_inherited_members: bool,
    /// Only members with an explicit [`TrackMember`] are tracked.
    pub require_explicit_inclusion: bool,
}

impl TrackClass {
    /// Both switches on.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_inherited_members: true,
            require_explicit_inclusion: true,
        }
    }

    /// Set the inherited-members switch.
    #[must_use]
    pub const fn include_inherited_members(mut self, enabled: bool) -> Self {
        self.include_inherited_members = enabled;
        self
    }

    /// Set the explicit-inclusion switch.
    #[must_use]
    pub const fn require_explicit_inclusion(mut self, enabled: bool) -> Self {
        self.require_explicit_inclusion = enabled;
        self
    }
}

impl Default for TrackClass {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-member override. When present it bypasses visibility and the
/// class-level default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackMember {
    pub excluded: bool,
}

impl TrackMember {
    pub const INCLUDED: Self = Self { excluded: false };
    pub const EXCLUDED: Self = Self { excluded: true };
}

/// Visibility of a member's read accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Restricted,
}

/// Where a member is declared relative to the described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    Declared,
    Inherited,
}

/// Static description of one readable member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub name: &'static str,
    pub visibility: Visibility,
    pub declaration: Declaration,
    /// Parameterized accessor (indexer).
    pub indexed: bool,
    pub annotation: Option<TrackMember>,
}

impl MemberDescriptor {
    /// A declared member with a public read accessor.
    #[must_use]
    pub const fn public(name: &'static str) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            declaration: Declaration::Declared,
            indexed: false,
            annotation: None,
        }
    }

    /// A declared member whose read accessor is not public.
    #[must_use]
    pub const fn restricted(name: &'static str) -> Self {
        Self {
            visibility: Visibility::Restricted,
            ..Self::public(name)
        }
    }

    /// Mark as inherited from a base type.
    #[must_use]
    pub const fn inherited(mut self) -> Self {
        self.declaration = Declaration::Inherited;
        self
    }

    /// Mark as a parameterized (indexed) accessor.
    #[must_use]
    pub const fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Attach an explicit override.
    #[must_use]
    pub const fn annotated(mut self, annotation: TrackMember) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// Shorthand for `annotated(TrackMember::INCLUDED)`.
    #[must_use]
    pub const fn tracked(self) -> Self {
        self.annotated(TrackMember::INCLUDED)
    }

    /// Shorthand for `annotated(TrackMember::EXCLUDED)`.
    #[must_use]
    pub const fn excluded(self) -> Self {
        self.annotated(TrackMember::EXCLUDED)
    }
}

/// Static description of a type that emits member-change notifications.
#[derive(Debug)]
pub struct TypeDescriptor {
    pub name: &'static str,
    pub class: Option<TrackClass>,
    pub members: &'static [MemberDescriptor],
}

impl TypeDescriptor {
    /// A descriptor without class-level configuration.
    #[must_use]
    pub const fn new(name: &'static str, members: &'static [MemberDescriptor]) -> Self {
        Self {
            name,
            class: None,
            members,
        }
    }

    /// Attach class-level configuration.
    #[must_use]
    pub const fn with_class(mut self, class: TrackClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Enumeration scope implied by the class configuration.
    #[must_use]
    pub fn scope(&self) -> MemberScope {
        MemberScope::for_class(self.class.as_ref())
    }

    /// Members visible under the current scope, any visibility.
    pub fn members_in_scope(&self) -> impl Iterator<Item = &'static MemberDescriptor> + '_ {
        let scope = self.scope();
        self.members.iter().filter(move |m| scope.includes(m))
    }

    /// Look up a member by name under the current scope.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&'static MemberDescriptor> {
        self.members_in_scope().find(|m| m.name == name)
    }

    /// Resolve the full set of eligible members.
    #[must_use]
    pub fn eligible_members(&self) -> EligibleMembers {
        let names = self
            .members_in_scope()
            .filter(|m| resolve_eligibility(m, self.class.as_ref()))
            .map(|m| m.name)
            .collect();
        EligibleMembers {
            type_name: self.name,
            scope: self.scope(),
            names,
        }
    }
}

/// Member enumeration scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberScope {
    /// Declared and inherited members.
    All,
    /// Declared members only.
    DeclaredOnly,
}

impl MemberScope {
    #[must_use]
    pub fn for_class(class: Option<&TrackClass>) -> Self {
        match class {
            Some(c) if !c.include_inherited_members => Self::DeclaredOnly,
            _ => Self::All,
        }
    }

    #[must_use]
    pub fn includes(self, member: &MemberDescriptor) -> bool {
        match self {
            Self::All => true,
            Self::DeclaredOnly => member.declaration == Declaration::Declared,
        }
    }
}

/// Decide whether one member is tracked.
#[must_use]
pub fn resolve_eligibility(member: &MemberDescriptor, class: Option<&TrackClass>) -> bool {
    if member.indexed {
        return false;
    }
    if let Some(annotation) = member.annotation {
        return !annotation.excluded;
    }
    class.is_none_or(|c| !c.require_explicit_inclusion) && member.visibility == Visibility::Public
}

/// The resolved set of eligible member names for one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleMembers {
    type_name: &'static str,
    scope: MemberScope,
    names: Vec<&'static str>,
}

impl EligibleMembers {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn scope(&self) -> MemberScope {
        self.scope
    }

    /// Eligible names in declaration order.
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Canonical name for `member` if it is eligible.
    #[must_use]
    pub fn lookup(&self, member: &str) -> Option<&'static str> {
        self.names.iter().copied().find(|n| *n == member)
    }

    #[must_use]
    pub fn contains(&self, member: &str) -> bool {
        self.lookup(member).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Memoizes [`TypeDescriptor::eligible_members`] by descriptor identity.
#[derive(Debug, Default)]
pub struct EligibilityCache {
    table: RefCell<AHashMap<usize, Rc<EligibleMembers>>>,
}

impl EligibilityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved members for `descriptor`, computing them on first use.
    pub fn resolve(&self, descriptor: &'static TypeDescriptor) -> Rc<EligibleMembers> {
        let key = std::ptr::from_ref(descriptor) as usize;
        if let Some(hit) = self.table.borrow().get(&key) {
            return Rc::clone(hit);
        }
        let resolved = Rc::new(descriptor.eligible_members());
        tracing::trace!(
            message = "eligibility.resolve",
            type_name = descriptor.name,
            eligible = resolved.len()
        );
        self.table.borrow_mut().insert(key, Rc::clone(&resolved));
        resolved
    }

    /// Number of descriptors resolved so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }
}
