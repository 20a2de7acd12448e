#![forbid(unsafe_code)]

//! Test harness and reference fixtures for Ripple.
//!
//! The [`fixtures`] are small hand-written domain objects covering each
//! eligibility rule and capability combination. [`ChangeCounter`] counts
//! pulses of any [`Signal`](ripple_core::Signal).

pub mod counter;
pub mod fixtures;

pub use counter::ChangeCounter;
pub use fixtures::{Car, Employee, IndexerDummy, Opaque, Pair, People, Person, Roster};
