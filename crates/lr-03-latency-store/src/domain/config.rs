//! Store configuration.

use serde::{Deserialize, Serialize};

/// How the two rows of one `append` are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriteMode {
    /// Two separate writes. The second is attempted even if the first fails.
    #[default]
    Independent,
    /// One batch holding both rows: both land or neither does.
    Atomic,
}

/// Latency store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub write_mode: WriteMode,
}

impl StoreConfig {
    /// Configuration committing both rows atomically.
    pub fn atomic() -> Self {
        Self {
            write_mode: WriteMode::Atomic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_independent() {
        assert_eq!(StoreConfig::default().write_mode, WriteMode::Independent);
        assert_eq!(StoreConfig::atomic().write_mode, WriteMode::Atomic);
    }
}
