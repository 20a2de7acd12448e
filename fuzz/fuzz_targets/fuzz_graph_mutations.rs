#![no_main]

use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ripple_core::ObservableVec;
use ripple_harness::{People, Person};
use ripple_tracker::{CyclePolicy, Tracker, TrackerConfig};

const POOL: usize = 6;

#[derive(Arbitrary, Debug)]
enum GraphOp {
    Marry { a: u8, b: u8 },
    Divorce(u8),
    GiveFriends(u8),
    DropFriends(u8),
    Befriend { owner: u8, friend: u8 },
    Unfriend(u8),
    ClearFriends(u8),
    Rename(u8),
    Track(u8),
}

#[derive(Arbitrary, Debug)]
struct Script {
    strict: bool,
    ops: Vec<GraphOp>,
}

fn pick(pool: &[Rc<Person>], i: u8) -> &Rc<Person> {
    &pool[usize::from(i) % pool.len()]
}

fuzz_target!(|script: Script| {
    let pool: Vec<Rc<Person>> = (0..POOL).map(|i| Person::new(&format!("p{i}"))).collect();
    let policy = if script.strict {
        CyclePolicy::Error
    } else {
        CyclePolicy::Skip
    };
    let mut tracker = Tracker::with_config(TrackerConfig::default().with_cycle_policy(policy));

    for op in script.ops.iter().take(256) {
        match *op {
            GraphOp::Marry { a, b } => pick(&pool, a).set_spouse(Some(Rc::clone(pick(&pool, b)))),
            GraphOp::Divorce(a) => pick(&pool, a).set_spouse(None),
            GraphOp::GiveFriends(a) => {
                pick(&pool, a).set_friends(Some(Rc::new(ObservableVec::new())));
            }
            GraphOp::DropFriends(a) => pick(&pool, a).set_friends(None),
            GraphOp::Befriend { owner, friend } => {
                if let Some(friends) = pick(&pool, owner).friends() {
                    friends.push(Rc::clone(pick(&pool, friend)));
                }
            }
            GraphOp::Unfriend(owner) => {
                if let Some(friends) = pick(&pool, owner).friends() {
                    friends.pop();
                }
            }
            GraphOp::ClearFriends(owner) => {
                if let Some(friends) = pick(&pool, owner).friends() {
                    friends.clear();
                }
            }
            GraphOp::Rename(a) => pick(&pool, a).set_name("renamed"),
            GraphOp::Track(a) => {
                let _ = tracker.track([Rc::clone(pick(&pool, a))]);
            }
        }
    }

    tracker.release();
    assert_eq!(tracker.live_nodes(), 0);
    for person in &pool {
        assert_eq!(person.listener_count(), 0);
        person.set_spouse(None);
        person.set_friends(None::<Rc<People>>);
    }
});
