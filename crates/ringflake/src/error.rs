/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `ringflake` can produce.
///
/// Two families are kept apart on purpose so callers can tell them apart:
///
/// - Configuration errors ([`Error::IdentityOutOfRange`],
///   [`Error::InvalidCapacity`], [`Error::InvalidPaddingFactor`],
///   [`Error::InvalidConfig`]) are returned from constructors.
/// - Fatal runtime errors ([`Error::ClockMovedBackward`],
///   [`Error::TimestampOverflow`], [`Error::ProtocolViolation`]) mean that
///   continuing could hand out a duplicate ID.
///
/// Backpressure (a full or empty ring) is never an error. It is reported
/// through [`crate::PutStatus::Full`] and [`crate::TakeStatus::Empty`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The wall clock reported a millisecond earlier than the last one used.
    ///
    /// Issuing an ID now could repeat one that was already handed out, so the
    /// allocator refuses instead of waiting.
    #[error("clock moved backwards: refusing to generate for {}ms (last {last}, now {now})", .last - .now)]
    ClockMovedBackward {
        /// Last millisecond (since the epoch) the allocator issued an ID for.
        last: u64,
        /// Millisecond (since the epoch) observed on this call.
        now: u64,
    },

    /// The clock is past the largest value the timestamp field can hold.
    #[error("timestamp bits exhausted: {now} exceeds max {max}")]
    TimestampOverflow {
        /// Millisecond (since the epoch) observed on this call.
        now: u64,
        /// Largest timestamp the layout can encode.
        max: u64,
    },

    /// The producer found its next slot still held by a consumer.
    ///
    /// The distance check had already admitted the put, so the slot flags and
    /// the counters disagree.
    #[error("ring protocol violation: slot {index} for sequence {sequence} is not puttable")]
    ProtocolViolation {
        /// Sequence the producer tried to publish.
        sequence: i64,
        /// Slot index that sequence maps to.
        index: usize,
    },

    /// An ID component handed to a constructor does not fit its bit field.
    #[error("{field} {value} exceeds the max {max}")]
    IdentityOutOfRange {
        /// Which field was rejected.
        field: &'static str,
        /// The rejected value.
        value: u64,
        /// Largest accepted value.
        max: u64,
    },

    /// Ring capacity must be a positive power of two.
    #[error("ring capacity {capacity} must be a positive power of two")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// Padding factor must be a percentage in `0..=100`.
    #[error("padding factor {factor} must be within 0..=100")]
    InvalidPaddingFactor {
        /// The rejected factor.
        factor: u32,
    },

    /// Any other rejected configuration value.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Human readable description of the problem.
        reason: String,
    },

    /// The padding worker thread could not be started.
    #[error("failed to spawn padding worker: {reason}")]
    WorkerSpawn {
        /// The OS error, rendered.
        reason: String,
    },

    /// The operation failed because the allocator lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is never produced.
    #[error("allocator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
