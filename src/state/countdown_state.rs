//! Countdown state machine

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three states a countdown can be in.
///
/// Transitions never mutate a state in place; `next` and `previous` return
/// a fresh value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "current")]
pub enum CountDownState {
    /// Idle, waiting for a starting count
    #[default]
    Setup,
    /// Counting down; holds the remaining whole seconds
    Running(u32),
    /// Terminal state
    Finished,
}

impl CountDownState {
    /// Forward transition for a countdown configured with `initial_count`.
    ///
    /// Returns `None` from `Finished`.
    pub fn next(self, initial_count: u32) -> Option<Self> {
        match self {
            Self::Setup => Some(Self::Running(initial_count)),
            Self::Running(0) => Some(Self::Finished),
            Self::Running(current) => Some(Self::Running(current - 1)),
            Self::Finished => None,
        }
    }

    /// Inverse of [`next`](Self::next) over the reachable sequence.
    ///
    /// Returns `None` from `Setup`.
    pub fn previous(self, initial_count: u32) -> Option<Self> {
        match self {
            Self::Finished => Some(Self::Running(0)),
            Self::Running(current) if current == initial_count => Some(Self::Setup),
            Self::Running(current) => current.checked_add(1).map(Self::Running),
            Self::Setup => None,
        }
    }

    /// Stable key front ends use to tell numeral transitions apart
    pub fn key(&self) -> String {
        match self {
            Self::Setup => "Setup".to_string(),
            Self::Running(current) => format!("Running{{{}}}", current),
            Self::Finished => "Finished".to_string(),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Remaining count while running
    pub fn current(&self) -> Option<u32> {
        match self {
            Self::Running(current) => Some(*current),
            _ => None,
        }
    }
}

impl fmt::Display for CountDownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
