// Domain errors for window and reducer configuration
use thiserror::Error;

/// Raised when a chart cannot be sampled with the requested window or reducer.
/// Retrying with the same input fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("range yields too many timeslots ({slots} slots)")]
    TooManyTimeslots { slots: u64 },
    #[error("range yields too many timeslots ({slots} slots, limit {limit})")]
    SlotLimitExceeded { slots: u64, limit: u64 },
    #[error("slot size must be positive, got {0}ms")]
    NonPositiveSlotSize(i64),
    #[error("range end {to} precedes start {from}")]
    InvertedRange { from: i64, to: i64 },
    #[error("range start {from} cannot be aligned to {slot_size}ms slots")]
    UnalignedStart { from: i64, slot_size: i64 },
    #[error("percentile must be in (0, 100], got {0}")]
    InvalidPercentile(f64),
}
