//! Buffering policy for producer-to-consumer channels

use serde::{Deserialize, Serialize};

/// Default capacity when a bounded buffer is requested without a size
pub const DEFAULT_BOUNDED_SIZE: usize = 1000;

/// How many pending events a stream may buffer between a pushing
/// producer and a pulling consumer.
///
/// Every policy buffers at least one element deep, so a producer that
/// emits before the consumer asks for the next element never loses it.
/// Ticker-scale traffic defaults to unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "capacity")]
pub enum BufferPolicy {
    /// Never drop or block a producer; memory grows with consumer lag
    Unbounded,
    /// Block producers once `capacity` events are pending
    Bounded(usize),
}

impl Default for BufferPolicy {
    fn default() -> Self {
        BufferPolicy::Unbounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_unbounded() {
        assert_eq!(BufferPolicy::default(), BufferPolicy::Unbounded);
    }
}
