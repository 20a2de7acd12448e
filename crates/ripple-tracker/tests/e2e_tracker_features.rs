#![forbid(unsafe_code)]

//! E2E scenarios for the tracker's public surface.
//!
//! Validates that:
//! 1. Nothing fires without tracking, and registration itself is silent.
//! 2. Member changes bubble from any depth, exactly once per mutation.
//! 3. Replaced members and removed elements stop propagating.
//! 4. Eligibility policy silences excluded and out-of-scope members.
//! 5. Duplicate collection references are reference-counted.
//! 6. Dual-capability objects report both kinds of change.
//! 7. Release is total and idempotent.

use std::rc::Rc;

use ripple_core::{IntoTrackable, ObservableVec, TrackableRef};
use ripple_harness::{Car, ChangeCounter, Employee, IndexerDummy, Pair, People, Person, Roster};
use ripple_tracker::{TrackError, Tracker};

// ============================================================================
// Helpers
// ============================================================================

fn watched<I>(objects: I) -> (Tracker, ChangeCounter)
where
    I: IntoIterator,
    I::Item: IntoTrackable,
{
    let mut tracker = Tracker::new();
    tracker.track(objects).expect("track");
    let counter = ChangeCounter::watch(tracker.changed());
    (tracker, counter)
}

fn people(names: &[&str]) -> Rc<People> {
    Rc::new(ObservableVec::from_vec(
        names.iter().map(|n| Person::new(n)).collect(),
    ))
}

// ============================================================================
// General
// ============================================================================

#[test]
fn untracked_mutation_never_fires() {
    let tracker = Tracker::new();
    let counter = ChangeCounter::watch(tracker.changed());
    Person::new("A").set_name("B");
    assert_eq!(counter.count(), 0);
}

#[test]
fn track_rejects_empty_null_and_inert_input() {
    let mut tracker = Tracker::new();
    let none: [Option<Rc<Person>>; 0] = [];
    assert!(tracker.track(none).expect_err("empty").is_invalid_argument());
    assert!(
        tracker
            .track([None::<Rc<Person>>])
            .expect_err("null")
            .is_invalid_argument()
    );
    assert!(tracker.track(["string"]).expect_err("str").is_invalid_argument());
    assert!(tracker.is_empty());
}

#[test]
fn error_messages_are_descriptive() {
    let mut tracker = Tracker::new();
    let err = tracker.track([42u32]).expect_err("scalar");
    assert!(matches!(err, TrackError::InvalidArgument { .. }));
    assert!(err.to_string().starts_with("invalid argument"));
}

// ============================================================================
// Member changes
// ============================================================================

#[test]
fn tracking_is_silent() {
    let person = Person::new("A");
    person.set_spouse(Some(Person::new("B")));
    let (_tracker, counter) = watched([person]);
    assert_eq!(counter.count(), 0);
}

#[test]
fn fires_once_per_member_change() {
    let person = Person::new("A");
    let (_tracker, counter) = watched([person.clone()]);
    person.set_name("A1");
    assert_eq!(counter.take(), 1);
    person.set_name("A2");
    assert_eq!(counter.take(), 1);
}

#[test]
fn tracks_multiple_roots_across_calls() {
    let (p1, p2, p3) = (Person::new("1"), Person::new("2"), Person::new("3"));
    let (mut tracker, counter) = watched([p1.clone(), p2.clone()]);

    p1.set_name("1a");
    p2.set_name("2a");
    assert_eq!(counter.take(), 2);

    tracker.track([p3.clone()]).expect("track third");
    p3.set_name("3a");
    p1.set_name("1b");
    p2.set_name("2b");
    assert_eq!(counter.take(), 3);
}

#[test]
fn nested_member_change_bubbles() {
    let person = Person::new("A");
    let spouse = Person::new("B");
    person.set_spouse(Some(spouse.clone()));
    let (_tracker, counter) = watched([person]);

    spouse.set_name("B2");
    assert_eq!(counter.take(), 1);
    spouse.set_age(40);
    assert_eq!(counter.take(), 0);
}

#[test]
fn replaced_member_stops_propagating() {
    let person = Person::new("A");
    let old = Person::new("B1");
    person.set_spouse(Some(old.clone()));
    let (_tracker, counter) = watched([person.clone()]);

    let new = Person::new("B2");
    person.set_spouse(Some(new.clone()));
    assert_eq!(counter.take(), 1);

    new.set_name("B2a");
    assert_eq!(counter.take(), 1);
    old.set_name("B1a");
    assert_eq!(counter.take(), 0);
}

#[test]
fn unannotated_member_is_silent_under_explicit_inclusion() {
    let person = Person::new("A");
    let (_tracker, counter) = watched([person.clone()]);
    person.set_age(31);
    assert_eq!(counter.count(), 0);
}

#[test]
fn annotations_override_visibility_without_class_config() {
    let car = Car::new("T", "Ford", 1908);
    let (_tracker, counter) = watched([car.clone()]);

    car.set_model("A");
    assert_eq!(counter.take(), 1);
    car.set_make("Lincoln");
    assert_eq!(counter.take(), 0);
    car.set_year(1927);
    assert_eq!(counter.take(), 1);
}

#[test]
fn declared_only_scope_hides_inherited_members() {
    let employee = Employee::new("E", "dev");
    let mentor = Person::new("M");
    let manager = Person::new("Boss");
    employee.set_mentor(Some(mentor.clone()));
    employee.set_manager(Some(manager.clone()));
    let (_tracker, counter) = watched([employee.clone()]);

    employee.set_title("lead");
    assert_eq!(counter.take(), 1);
    employee.set_name("E2");
    assert_eq!(counter.take(), 0);
    mentor.set_name("M2");
    assert_eq!(counter.take(), 1);
    manager.set_name("Boss2");
    assert_eq!(counter.take(), 0);
}

#[test]
fn indexed_members_are_never_tracked() {
    let dummy = IndexerDummy::new();
    let (_tracker, counter) = watched([dummy.clone()]);
    dummy.set_item(0, "see my change?");
    assert_eq!(counter.count(), 0);
}

#[test]
fn two_members_sharing_one_object_are_independent() {
    let pair = Pair::new();
    let shared = Person::new("S");
    pair.set_p1(Some(shared.clone()));
    pair.set_p2(Some(shared.clone()));
    let (_tracker, counter) = watched([pair.clone()]);

    pair.set_p1(Some(Person::new("other")));
    assert_eq!(counter.take(), 1);
    shared.set_name("S2");
    assert_eq!(counter.take(), 1);
    pair.set_p2(None);
    assert_eq!(counter.take(), 1);
    shared.set_name("S3");
    assert_eq!(counter.take(), 0);
}

// ============================================================================
// Collection members
// ============================================================================

#[test]
fn replacing_a_collection_member_fires() {
    let person = Person::new("A");
    let old = people(&["F"]);
    person.set_friends(Some(old.clone()));
    let (_tracker, counter) = watched([person.clone()]);

    person.set_friends(Some(people(&[])));
    assert_eq!(counter.take(), 1);
    old.push(Person::new("late"));
    old.get(0).expect("friend").set_name("F2");
    assert_eq!(counter.take(), 0);
}

#[test]
fn element_inside_collection_member_bubbles() {
    let person = Person::new("A");
    let friends = people(&["F"]);
    person.set_friends(Some(friends.clone()));
    let (_tracker, counter) = watched([person]);

    friends.get(0).expect("friend").set_name("F2");
    assert_eq!(counter.take(), 1);
}

#[test]
fn other_members_survive_a_collection_clear() {
    let person = Person::new("A");
    let spouse = Person::new("S");
    let friends = people(&["F"]);
    person.set_spouse(Some(spouse.clone()));
    person.set_friends(Some(friends.clone()));
    let (_tracker, counter) = watched([person]);

    friends.clear();
    assert_eq!(counter.take(), 1);
    spouse.set_name("S2");
    assert_eq!(counter.take(), 1);
}

// ============================================================================
// Collections as roots
// ============================================================================

#[test]
fn collection_addition_removal_and_clear_fire() {
    let list = people(&[]);
    let (_tracker, counter) = watched([list.clone()]);

    list.push(Person::new("A"));
    assert_eq!(counter.take(), 1);
    list.insert(0, Person::new("B"));
    assert_eq!(counter.take(), 1);
    list.remove(0);
    assert_eq!(counter.take(), 1);
    list.clear();
    assert_eq!(counter.take(), 1);
}

#[test]
fn appended_element_is_tracked_until_removed() {
    let list = people(&[]);
    let (_tracker, counter) = watched([list.clone()]);

    let a = Person::new("A");
    list.push(a.clone());
    assert_eq!(counter.take(), 1);
    a.set_name("A2");
    assert_eq!(counter.take(), 1);
    list.pop();
    assert_eq!(counter.take(), 1);
    a.set_name("A3");
    assert_eq!(counter.take(), 0);
}

#[test]
fn assigned_element_replaces_the_old_one() {
    let original = Person::new("A");
    let list = Rc::new(People::from_vec(vec![original.clone()]));
    let (_tracker, counter) = watched([list.clone()]);

    list.set(0, Person::new("B"));
    assert_eq!(counter.take(), 1);
    original.set_name("A2");
    assert_eq!(counter.take(), 0);
    list.get(0).expect("element").set_name("B2");
    assert_eq!(counter.take(), 1);
}

#[test]
fn duplicate_references_are_reference_counted() {
    let dup = Person::new("D");
    let list = Rc::new(People::from_vec(vec![dup.clone(), dup.clone()]));
    let (tracker, counter) = watched([list.clone()]);
    assert_eq!(tracker.live_nodes(), 2);

    list.remove(0);
    assert_eq!(counter.take(), 1);
    dup.set_name("D2");
    assert_eq!(counter.take(), 1);

    list.remove(0);
    assert_eq!(counter.take(), 1);
    dup.set_name("D3");
    assert_eq!(counter.take(), 0);
    assert_eq!(tracker.live_nodes(), 1);
}

#[test]
fn bulk_replace_tracks_the_new_elements() {
    let list = people(&["A", "B"]);
    let (_tracker, counter) = watched([list.clone()]);
    let fresh = Person::new("C");

    list.replace_all(vec![fresh.clone()]);
    assert_eq!(counter.take(), 1);
    fresh.set_name("C2");
    assert_eq!(counter.take(), 1);
}

// ============================================================================
// Dual capability
// ============================================================================

#[test]
fn dual_object_reports_member_and_membership_changes() {
    let roster = Roster::new("team");
    let (tracker, counter) = watched([roster.clone()]);
    assert_eq!(tracker.live_nodes(), 1);

    roster.set_name("squad");
    assert_eq!(counter.take(), 1);
    let member = Person::new("M");
    roster.members().push(member.clone());
    assert_eq!(counter.take(), 1);
    member.set_name("M2");
    assert_eq!(counter.take(), 1);
}

// ============================================================================
// Release
// ============================================================================

#[test]
fn release_terminates_propagation_everywhere() {
    let person = Person::new("A");
    let spouse = Person::new("S");
    let friends = people(&["F"]);
    person.set_spouse(Some(spouse.clone()));
    person.set_friends(Some(friends.clone()));
    let roster = Roster::new("team");
    let roots: Vec<TrackableRef> = vec![person.clone(), roster.clone()];
    let (mut tracker, counter) = watched(roots);

    tracker.release();
    tracker.release();

    person.set_name("x");
    spouse.set_name("x");
    friends.push(Person::new("x"));
    friends.get(0).expect("friend").set_name("x");
    roster.set_name("x");
    roster.members().push(Person::new("x"));
    assert_eq!(counter.count(), 0);
    assert_eq!(tracker.live_nodes(), 0);
    assert_eq!(person.listener_count(), 0);
    assert_eq!(roster.listener_count(), 0);
}

#[test]
fn subscribe_callback_runs_per_change() {
    let person = Person::new("A");
    let mut tracker = Tracker::new();
    tracker.track([person.clone()]).expect("track");

    let hits = Rc::new(std::cell::Cell::new(0));
    let sink = Rc::clone(&hits);
    let sub = tracker.subscribe(move || sink.set(sink.get() + 1));
    person.set_name("B");
    assert_eq!(hits.get(), 1);

    sub.unsubscribe();
    person.set_name("C");
    assert_eq!(hits.get(), 1);
}

// ============================================================================
// Literal scenario
// ============================================================================

#[test]
fn person_scenario() {
    let p = Person::new("A");
    p.set_age(30);
    let (_tracker, counter) = watched([p.clone()]);
    assert_eq!(counter.take(), 0);

    p.set_age(31);
    assert_eq!(counter.take(), 0);
    p.set_name("A2");
    assert_eq!(counter.take(), 1);
    p.set_spouse(Some(Person::new("B")));
    assert_eq!(counter.take(), 1);

    let spouse = p.spouse().expect("spouse");
    spouse.set_age(5);
    assert_eq!(counter.take(), 0);
    spouse.set_name("B2");
    assert_eq!(counter.take(), 1);
}
