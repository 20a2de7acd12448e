#![forbid(unsafe_code)]

//! Stub domain objects.
//!
//! Every setter stores the new value and then announces the member by name,
//! so the new value is already readable when listeners run. Setters always
//! announce, even when the value is unchanged.
//!
//! | fixture        | class config                          | exercises |
//! |----------------|---------------------------------------|-----------|
//! | [`Person`]     | explicit inclusion required           | annotated, unannotated and restricted members; nested collection |
//! | [`Car`]        | none                                  | annotation overriding visibility both ways |
//! | [`Pair`]       | none                                  | two members holding the same object |
//! | [`Roster`]     | none                                  | both capabilities on one object |
//! | [`Employee`]   | declared members only, no explicit inclusion | inherited members out of scope |
//! | [`IndexerDummy`] | none                                | indexed members never eligible |
//! | [`Opaque`]     | n/a                                   | no capability at all |

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use ripple_core::{
    IntoTrackable, MemberDescriptor, Notifier, NotifyCollectionChanged, NotifyPropertyChanged,
    ObservableVec, TrackClass, Trackable, TrackableRef, TypeDescriptor,
};

/// Sequence of people, the collection type used across fixtures.
pub type People = ObservableVec<Rc<Person>>;

// ─── Person ──────────────────────────────────────────────────────────────────

static PERSON: TypeDescriptor = TypeDescriptor::new(
    "Person",
    &[
        MemberDescriptor::public("name").tracked(),
        MemberDescriptor::public("age"),
        MemberDescriptor::restricted("spouse").tracked(),
        MemberDescriptor::restricted("friends").tracked(),
    ],
)
.with_class(TrackClass::new());

/// `name`, `spouse` and `friends` are tracked; `age` is not.
pub struct Person {
    name: RefCell<String>,
    age: Cell<u32>,
    spouse: RefCell<Option<Rc<Person>>>,
    friends: RefCell<Option<Rc<People>>>,
    changed: Notifier<str>,
}

impl Person {
    pub fn new(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: RefCell::new(name.to_string()),
            age: Cell::new(0),
            spouse: RefCell::new(None),
            friends: RefCell::new(None),
            changed: Notifier::new(),
        })
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn age(&self) -> u32 {
        self.age.get()
    }

    pub fn spouse(&self) -> Option<Rc<Person>> {
        self.spouse.borrow().clone()
    }

    pub fn friends(&self) -> Option<Rc<People>> {
        self.friends.borrow().clone()
    }

    pub fn set_name(&self, name: &str) {
        *self.name.borrow_mut() = name.to_string();
        self.changed.notify("name");
    }

    pub fn set_age(&self, age: u32) {
        self.age.set(age);
        self.changed.notify("age");
    }

    pub fn set_spouse(&self, spouse: Option<Rc<Person>>) {
        let previous = self.spouse.replace(spouse);
        self.changed.notify("spouse");
        drop(previous);
    }

    pub fn set_friends(&self, friends: Option<Rc<People>>) {
        let previous = self.friends.replace(friends);
        self.changed.notify("friends");
        drop(previous);
    }

    /// Live member-change listeners.
    pub fn listener_count(&self) -> usize {
        self.changed.subscriber_count()
    }
}

impl Trackable for Person {
    fn as_notify_property(&self) -> Option<&dyn NotifyPropertyChanged> {
        Some(self)
    }
}

impl NotifyPropertyChanged for Person {
    fn type_descriptor(&self) -> &'static TypeDescriptor {
        &PERSON
    }

    fn property_changed(&self) -> &Notifier<str> {
        &self.changed
    }

    fn member_value(&self, name: &str) -> Option<TrackableRef> {
        match name {
            "spouse" => self.spouse().into_trackable(),
            "friends" => self.friends().into_trackable(),
            _ => None,
        }
    }
}

impl fmt::Debug for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Person")
            .field("name", &*self.name.borrow())
            .field("age", &self.age.get())
            .finish_non_exhaustive()
    }
}

// ─── Car ─────────────────────────────────────────────────────────────────────

static CAR: TypeDescriptor = TypeDescriptor::new(
    "Car",
    &[
        MemberDescriptor::restricted("model").tracked(),
        MemberDescriptor::public("make").excluded(),
        MemberDescriptor::public("year"),
    ],
);

/// No class config: `model` is tracked despite being restricted, `make` is
/// excluded despite being public, `year` is tracked by default.
pub struct Car {
    model: RefCell<String>,
    make: RefCell<String>,
    year: Cell<u16>,
    changed: Notifier<str>,
}

impl Car {
    pub fn new(model: &str, make: &str, year: u16) -> Rc<Self> {
        Rc::new(Self {
            model: RefCell::new(model.to_string()),
            make: RefCell::new(make.to_string()),
            year: Cell::new(year),
            changed: Notifier::new(),
        })
    }

    pub fn model(&self) -> String {
        self.model.borrow().clone()
    }

    pub fn make(&self) -> String {
        self.make.borrow().clone()
    }

    pub fn year(&self) -> u16 {
        self.year.get()
    }

    pub fn set_model(&self, model: &str) {
        *self.model.borrow_mut() = model.to_string();
        self.changed.notify("model");
    }

    pub fn set_make(&self, make: &str) {
        *self.make.borrow_mut() = make.to_string();
        self.changed.notify("make");
    }

    pub fn set_year(&self, year: u16) {
        self.year.set(year);
        self.changed.notify("year");
    }

    /// Announce an arbitrary member name without changing anything.
    pub fn raise_member(&self, member: &str) {
        self.changed.notify(member);
    }
}

impl Trackable for Car {
    fn as_notify_property(&self) -> Option<&dyn NotifyPropertyChanged> {
        Some(self)
    }
}

impl NotifyPropertyChanged for Car {
    fn type_descriptor(&self) -> &'static TypeDescriptor {
        &CAR
    }

    fn property_changed(&self) -> &Notifier<str> {
        &self.changed
    }

    fn member_value(&self, _name: &str) -> Option<TrackableRef> {
        None
    }
}

// ─── Pair ────────────────────────────────────────────────────────────────────

static PAIR: TypeDescriptor = TypeDescriptor::new(
    "Pair",
    &[MemberDescriptor::public("p1"), MemberDescriptor::public("p2")],
);

/// Two public members, free to point at the same person.
pub struct Pair {
    p1: RefCell<Option<Rc<Person>>>,
    p2: RefCell<Option<Rc<Person>>>,
    changed: Notifier<str>,
}

impl Pair {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            p1: RefCell::new(None),
            p2: RefCell::new(None),
            changed: Notifier::new(),
        })
    }

    pub fn p1(&self) -> Option<Rc<Person>> {
        self.p1.borrow().clone()
    }

    pub fn p2(&self) -> Option<Rc<Person>> {
        self.p2.borrow().clone()
    }

    pub fn set_p1(&self, person: Option<Rc<Person>>) {
        let previous = self.p1.replace(person);
        self.changed.notify("p1");
        drop(previous);
    }

    pub fn set_p2(&self, person: Option<Rc<Person>>) {
        let previous = self.p2.replace(person);
        self.changed.notify("p2");
        drop(previous);
    }
}

impl Trackable for Pair {
    fn as_notify_property(&self) -> Option<&dyn NotifyPropertyChanged> {
        Some(self)
    }
}

impl NotifyPropertyChanged for Pair {
    fn type_descriptor(&self) -> &'static TypeDescriptor {
        &PAIR
    }

    fn property_changed(&self) -> &Notifier<str> {
        &self.changed
    }

    fn member_value(&self, name: &str) -> Option<TrackableRef> {
        match name {
            "p1" => self.p1().into_trackable(),
            "p2" => self.p2().into_trackable(),
            _ => None,
        }
    }
}

// ─── Roster ──────────────────────────────────────────────────────────────────

static ROSTER: TypeDescriptor = TypeDescriptor::new("Roster", &[MemberDescriptor::public("name")]);

/// A named list of people: emits both member and membership changes.
pub struct Roster {
    name: RefCell<String>,
    members: People,
    changed: Notifier<str>,
}

impl Roster {
    pub fn new(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: RefCell::new(name.to_string()),
            members: People::new(),
            changed: Notifier::new(),
        })
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn members(&self) -> &People {
        &self.members
    }

    pub fn set_name(&self, name: &str) {
        *self.name.borrow_mut() = name.to_string();
        self.changed.notify("name");
    }

    /// Live listeners across both notification kinds.
    pub fn listener_count(&self) -> usize {
        self.changed.subscriber_count() + self.members.collection_changed().subscriber_count()
    }
}

impl Trackable for Roster {
    fn as_notify_property(&self) -> Option<&dyn NotifyPropertyChanged> {
        Some(self)
    }

    fn as_notify_collection(&self) -> Option<&dyn NotifyCollectionChanged> {
        Some(&self.members)
    }
}

impl NotifyPropertyChanged for Roster {
    fn type_descriptor(&self) -> &'static TypeDescriptor {
        &ROSTER
    }

    fn property_changed(&self) -> &Notifier<str> {
        &self.changed
    }

    fn member_value(&self, _name: &str) -> Option<TrackableRef> {
        None
    }
}

// ─── Employee ────────────────────────────────────────────────────────────────

static EMPLOYEE: TypeDescriptor = TypeDescriptor::new(
    "Employee",
    &[
        MemberDescriptor::public("title"),
        MemberDescriptor::public("mentor"),
        MemberDescriptor::public("name").inherited(),
        MemberDescriptor::public("manager").inherited(),
    ],
)
.with_class(
    TrackClass::new()
        .include_inherited_members(false)
        .require_explicit_inclusion(false),
);

/// Declared members only: `title` and `mentor` are tracked, the inherited
/// `name` and `manager` are out of scope.
pub struct Employee {
    title: RefCell<String>,
    name: RefCell<String>,
    mentor: RefCell<Option<Rc<Person>>>,
    manager: RefCell<Option<Rc<Person>>>,
    changed: Notifier<str>,
}

impl Employee {
    pub fn new(name: &str, title: &str) -> Rc<Self> {
        Rc::new(Self {
            title: RefCell::new(title.to_string()),
            name: RefCell::new(name.to_string()),
            mentor: RefCell::new(None),
            manager: RefCell::new(None),
            changed: Notifier::new(),
        })
    }

    pub fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = title.to_string();
        self.changed.notify("title");
    }

    pub fn set_name(&self, name: &str) {
        *self.name.borrow_mut() = name.to_string();
        self.changed.notify("name");
    }

    pub fn set_mentor(&self, mentor: Option<Rc<Person>>) {
        let previous = self.mentor.replace(mentor);
        self.changed.notify("mentor");
        drop(previous);
    }

    pub fn set_manager(&self, manager: Option<Rc<Person>>) {
        let previous = self.manager.replace(manager);
        self.changed.notify("manager");
        drop(previous);
    }
}

impl Trackable for Employee {
    fn as_notify_property(&self) -> Option<&dyn NotifyPropertyChanged> {
        Some(self)
    }
}

impl NotifyPropertyChanged for Employee {
    fn type_descriptor(&self) -> &'static TypeDescriptor {
        &EMPLOYEE
    }

    fn property_changed(&self) -> &Notifier<str> {
        &self.changed
    }

    fn member_value(&self, name: &str) -> Option<TrackableRef> {
        match name {
            "mentor" => self.mentor.borrow().clone().into_trackable(),
            "manager" => self.manager.borrow().clone().into_trackable(),
            _ => None,
        }
    }
}

// ─── IndexerDummy ────────────────────────────────────────────────────────────

static INDEXER_DUMMY: TypeDescriptor =
    TypeDescriptor::new("IndexerDummy", &[MemberDescriptor::public("Item").indexed()]);

/// Exposes only an indexed accessor, which is never eligible.
pub struct IndexerDummy {
    slots: RefCell<Vec<String>>,
    changed: Notifier<str>,
}

impl IndexerDummy {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            slots: RefCell::new(Vec::new()),
            changed: Notifier::new(),
        })
    }

    pub fn set_item(&self, index: usize, value: &str) {
        {
            let mut slots = self.slots.borrow_mut();
            if slots.len() <= index {
                slots.resize(index + 1, String::new());
            }
            slots[index] = value.to_string();
        }
        self.changed.notify("Item");
    }
}

impl Trackable for IndexerDummy {
    fn as_notify_property(&self) -> Option<&dyn NotifyPropertyChanged> {
        Some(self)
    }
}

impl NotifyPropertyChanged for IndexerDummy {
    fn type_descriptor(&self) -> &'static TypeDescriptor {
        &INDEXER_DUMMY
    }

    fn property_changed(&self) -> &Notifier<str> {
        &self.changed
    }

    fn member_value(&self, _name: &str) -> Option<TrackableRef> {
        None
    }
}

// ─── Opaque ──────────────────────────────────────────────────────────────────

/// Emits nothing; tracking it is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Opaque;

impl Trackable for Opaque {}
