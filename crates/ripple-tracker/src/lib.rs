#![forbid(unsafe_code)]

//! Recursive change-propagation tracking.
//!
//! [`Tracker::track`] wraps each root object in a tracked node, walks every
//! eligible member and collection element it can reach, and subscribes to
//! their native notifications. Any mutation anywhere in the reachable graph
//! raises the tracker's single [`changed`](Tracker::changed) signal. The
//! signal carries no payload: it says that something changed, never what.
//!
//! Everything is single-threaded and synchronous. Structural updates for one
//! notification complete before the signal is raised, and the signal is
//! raised once per native notification.

pub mod config;
pub mod error;
mod node;
mod registry;
pub mod tracker;

pub use config::{CYCLE_POLICY_ENV, CyclePolicy, ParseCyclePolicyError, TrackerConfig};
pub use error::{Result, TrackError};
pub use tracker::Tracker;
