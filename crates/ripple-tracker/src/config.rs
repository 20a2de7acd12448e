#![forbid(unsafe_code)]

//! Tracker configuration.
//!
//! The only tunable today is what a registration walk does when it meets an
//! object it is already in the middle of registering (a reference cycle).
//! Configuration is plain data with builder setters; [`TrackerConfig::from_env`]
//! layers `RIPPLE_*` environment variables over the defaults.

use std::env;
use std::fmt;
use std::str::FromStr;

/// Environment variable consulted by [`TrackerConfig::from_env`].
pub const CYCLE_POLICY_ENV: &str = "RIPPLE_CYCLE_POLICY";

/// Behavior on meeting an object already on the current registration walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Treat the back-edge as covered; create no node for it.
    #[default]
    Skip,
    /// Fail registration with `TrackError::CycleDetected`.
    Error,
}

impl CyclePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized cycle policy name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCyclePolicyError(String);

impl fmt::Display for ParseCyclePolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown cycle policy {:?} (expected \"skip\" or \"error\")", self.0)
    }
}

impl std::error::Error for ParseCyclePolicyError {}

impl FromStr for CyclePolicy {
    type Err = ParseCyclePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("skip") {
            Ok(Self::Skip)
        } else if trimmed.eq_ignore_ascii_case("error") {
            Ok(Self::Error)
        } else {
            Err(ParseCyclePolicyError(trimmed.to_string()))
        }
    }
}

/// Configuration for a [`Tracker`](crate::Tracker).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerConfig {
    pub cycle_policy: CyclePolicy,
}

impl TrackerConfig {
    /// Defaults overridden by `RIPPLE_CYCLE_POLICY` when it is set.
    ///
    /// Unrecognized values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_value(env::var(CYCLE_POLICY_ENV).ok().as_deref())
    }

    fn with_env_value(mut self, value: Option<&str>) -> Self {
        if let Some(raw) = value {
            match raw.parse() {
                Ok(policy) => self.cycle_policy = policy,
                Err(err) => tracing::warn!(
                    message = "config.invalid_env",
                    var = CYCLE_POLICY_ENV,
                    error = %err
                ),
            }
        }
        self
    }

    #[must_use]
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }
}
