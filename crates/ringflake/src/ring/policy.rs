/// Counter values a [`crate::RingBuffer`] reports to its policy hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingSnapshot {
    pub capacity: usize,
    /// Highest sequence published by the producer, `-1` before the first put.
    pub tail: i64,
    /// Highest sequence claimed by a consumer, `-1` before the first take.
    pub cursor: i64,
}

impl RingSnapshot {
    /// Number of published values not yet claimed.
    pub const fn len(&self) -> i64 {
        self.tail - self.cursor
    }

    pub const fn is_empty(&self) -> bool {
        self.tail == self.cursor
    }
}

/// Hooks a [`crate::RingBuffer`] calls on backpressure and low watermark.
///
/// None of the hooks can fail or block the caller. A full ring still returns
/// [`crate::PutStatus::Full`] and an empty one [`crate::TakeStatus::Empty`]
/// whatever the policy does.
pub trait BufferPolicy: Send + Sync {
    /// A put was refused because the ring is full. `value` was not stored.
    fn reject_put(&self, value: u64, ring: RingSnapshot);

    /// A take found the ring empty.
    fn reject_take(&self, ring: RingSnapshot);

    /// A take left fewer values than the padding threshold.
    ///
    /// Called once per qualifying take, possibly from many threads at once.
    fn trigger_padding(&self, ring: RingSnapshot);
}

/// The default policy: log and carry on.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAndDrop;

impl BufferPolicy for LogAndDrop {
    fn reject_put(&self, value: u64, ring: RingSnapshot) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            value,
            tail = ring.tail,
            cursor = ring.cursor,
            "Rejected putting buffer"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (value, ring);
    }

    fn reject_take(&self, ring: RingSnapshot) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            tail = ring.tail,
            cursor = ring.cursor,
            "Rejected take buffer"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = ring;
    }

    fn trigger_padding(&self, ring: RingSnapshot) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            tail = ring.tail,
            cursor = ring.cursor,
            "Low watermark reached, nothing attached to refill"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = ring;
    }
}
