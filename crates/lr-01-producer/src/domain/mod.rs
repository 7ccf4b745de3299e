//! Producer domain types.

use std::fmt;

/// Producer loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProducerState {
    /// Publishing envelopes at the configured cadence.
    #[default]
    Sending,
    /// Cap reached; re-checking at the idle interval.
    Idle,
}

impl ProducerState {
    /// State for a given send count.
    pub fn for_count(sent_count: u64, cap: u64) -> Self {
        if sent_count < cap {
            Self::Sending
        } else {
            Self::Idle
        }
    }
}

impl fmt::Display for ProducerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sending => write!(f, "Sending"),
            Self::Idle => write!(f, "Idle"),
        }
    }
}
