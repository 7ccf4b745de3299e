//! Configuration types for the consumer dispatcher

use serde::Deserialize;
use shared_types::INPUT_QUEUE;

/// What the dispatcher does with a payload it cannot decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum DecodeFailurePolicy {
    /// Return `Disposition::Rejected` so the transport discards it.
    #[default]
    Reject,
    /// Log it and return `Disposition::Accepted`.
    Drop,
}

/// Runtime configuration for the consumer dispatcher
#[derive(Clone, Debug, Deserialize)]
pub struct ConsumerConfig {
    /// Input queue the dispatcher is bound to
    pub input_queue: String,

    /// Handling of undecodable payloads (default: Reject)
    pub decode_failure_policy: DecodeFailurePolicy,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            input_queue: INPUT_QUEUE.to_string(),
            decode_failure_policy: DecodeFailurePolicy::default(),
        }
    }
}
