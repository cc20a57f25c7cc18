use core::fmt;
use portable_atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    ring::{BufferPolicy, LogAndDrop, RingSnapshot, Slot, SlotState},
};

/// Padding factor used by [`RingBuffer::with_default_padding`], in percent.
pub const DEFAULT_PADDING_FACTOR: u32 = 50;

#[cfg(feature = "cache-padded")]
type Counter = crossbeam_utils::CachePadded<AtomicI64>;
#[cfg(not(feature = "cache-padded"))]
type Counter = AtomicI64;

fn counter(start: i64) -> Counter {
    #[cfg(feature = "cache-padded")]
    {
        crossbeam_utils::CachePadded::new(AtomicI64::new(start))
    }
    #[cfg(not(feature = "cache-padded"))]
    {
        AtomicI64::new(start)
    }
}

/// Result of [`Producer::put`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PutStatus {
    /// The value is published under `sequence` and can be taken.
    Published { sequence: i64 },
    /// The ring holds `capacity - 1` values. Nothing was written.
    Full,
}

/// Result of [`RingBuffer::take`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TakeStatus {
    Ready { id: u64 },
    /// Every published value has been claimed.
    Empty,
}

/// A fixed-capacity, single-producer multi-consumer ring of `u64` IDs.
///
/// Two counters describe the ring, both starting at `-1`:
///
/// - `tail`: highest sequence ever published. Only the [`Producer`] moves it.
/// - `cursor`: highest sequence ever claimed. Consumers move it by CAS.
///
/// Sequence `s` lives in slot `s & (capacity - 1)`. At most `capacity - 1`
/// values are held at once, so `0 <= tail - cursor <= capacity - 1`.
///
/// `take` is lock-free: a consumer claims the next sequence by advancing
/// `cursor`, reads the payload, then hands the slot back to the producer by
/// flipping its flag to [`SlotState::CanPut`].
///
/// # Example
///
/// ```
/// use ringflake::{LogAndDrop, PutStatus, RingBuffer, TakeStatus};
///
/// let (ring, mut producer) = RingBuffer::with_default_padding(8, LogAndDrop)?;
/// assert_eq!(producer.put(7)?, PutStatus::Published { sequence: 0 });
/// assert_eq!(ring.take(), TakeStatus::Ready { id: 7 });
/// assert_eq!(ring.take(), TakeStatus::Empty);
/// # Ok::<(), ringflake::Error>(())
/// ```
pub struct RingBuffer<P = LogAndDrop>
where
    P: BufferPolicy,
{
    slots: Box<[Slot]>,
    index_mask: i64,
    padding_threshold: i64,
    tail: Counter,
    cursor: Counter,
    policy: P,
}

impl<P> RingBuffer<P>
where
    P: BufferPolicy,
{
    /// Creates a ring and its only [`Producer`].
    ///
    /// `padding_factor` is a percentage of `capacity`. Once a take leaves
    /// fewer than `capacity * padding_factor / 100` values, the policy's
    /// [`BufferPolicy::trigger_padding`] hook fires. A factor of 100 is
    /// clamped to `capacity - 1` since the ring never holds more than that.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCapacity`] unless `capacity` is a power of two of at
    ///   least 2.
    /// - [`Error::InvalidPaddingFactor`] if `padding_factor > 100`.
    pub fn new(
        capacity: usize,
        padding_factor: u32,
        policy: P,
    ) -> Result<(Arc<Self>, Producer<P>)> {
        if capacity < 2 || !capacity.is_power_of_two() || i64::try_from(capacity).is_err() {
            return Err(Error::InvalidCapacity { capacity });
        }
        if padding_factor > 100 {
            return Err(Error::InvalidPaddingFactor {
                factor: padding_factor,
            });
        }

        let capacity = capacity as i64;
        let padding_threshold = (capacity * i64::from(padding_factor) / 100).min(capacity - 1);
        let slots = (0..capacity).map(|_| Slot::new()).collect();

        let ring = Arc::new(Self {
            slots,
            index_mask: capacity - 1,
            padding_threshold,
            tail: counter(-1),
            cursor: counter(-1),
            policy,
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(capacity, padding_threshold, "Initialized ring buffer");

        let producer = Producer {
            ring: Arc::clone(&ring),
        };
        Ok((ring, producer))
    }

    /// Same as [`Self::new`] with a padding factor of
    /// [`DEFAULT_PADDING_FACTOR`].
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_default_padding(capacity: usize, policy: P) -> Result<(Arc<Self>, Producer<P>)> {
        Self::new(capacity, DEFAULT_PADDING_FACTOR, policy)
    }

    /// Claims the next published value.
    ///
    /// Never blocks: contention between consumers is resolved by retrying the
    /// CAS on `cursor`. An empty ring reports [`TakeStatus::Empty`] and leaves
    /// every slot untouched.
    pub fn take(&self) -> TakeStatus {
        let claimed = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| {
                (prev != self.tail.load(Ordering::Acquire)).then_some(prev + 1)
            });

        let Ok(prev) = claimed else {
            self.policy.reject_take(self.snapshot());
            return TakeStatus::Empty;
        };
        let sequence = prev + 1;

        let slot = self.slot_for(sequence);
        let state = slot.state(Ordering::Acquire);
        debug_assert_eq!(state, SlotState::CanTake, "claimed slot was never published");
        let id = slot.read();
        slot.set_state(SlotState::CanPut, Ordering::Release);

        let remaining = self.tail.load(Ordering::Acquire) - sequence;
        if remaining < self.padding_threshold {
            self.policy.trigger_padding(self.snapshot());
        }

        TakeStatus::Ready { id }
    }

    /// Slot count, a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Takes leaving fewer values than this signal the padding hook.
    pub fn padding_threshold(&self) -> usize {
        self.padding_threshold as usize
    }

    /// Highest published sequence, `-1` before the first put.
    pub fn tail(&self) -> i64 {
        self.tail.load(Ordering::Acquire)
    }

    /// Highest claimed sequence, `-1` before the first take.
    pub fn cursor(&self) -> i64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// Published values not yet claimed. Racy under concurrent use.
    pub fn len(&self) -> usize {
        self.snapshot().len().max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free slots a producer could fill right now.
    pub fn remaining_capacity(&self) -> usize {
        (self.capacity() - 1).saturating_sub(self.len())
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Reads both counters, cursor first so the pair never shows
    /// `cursor > tail`.
    pub fn snapshot(&self) -> RingSnapshot {
        let cursor = self.cursor.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        RingSnapshot {
            capacity: self.capacity(),
            tail,
            cursor,
        }
    }

    fn index_of(&self, sequence: i64) -> usize {
        (sequence & self.index_mask) as usize
    }

    fn slot_for(&self, sequence: i64) -> &Slot {
        &self.slots[self.index_of(sequence)]
    }

    #[cfg(test)]
    pub(crate) fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }
}

impl<P> fmt::Debug for RingBuffer<P>
where
    P: BufferPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("RingBuffer")
            .field("capacity", &snapshot.capacity)
            .field("padding_threshold", &self.padding_threshold)
            .field("tail", &snapshot.tail)
            .field("cursor", &snapshot.cursor)
            .finish_non_exhaustive()
    }
}

/// The write side of a [`RingBuffer`].
///
/// Exactly one exists per ring and it cannot be cloned, so `put` is
/// single-writer by construction. Move it to whichever thread refills the
/// ring, or guard it with a mutex when the refilling thread can change.
pub struct Producer<P = LogAndDrop>
where
    P: BufferPolicy,
{
    ring: Arc<RingBuffer<P>>,
}

impl<P> Producer<P>
where
    P: BufferPolicy,
{
    /// Publishes `value` in the next slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolViolation`] if the next slot is still held by
    /// a consumer that claimed it but has not released it yet. Counters and
    /// slots are left unchanged, so the caller may retry later.
    pub fn put(&mut self, value: u64) -> Result<PutStatus> {
        let ring = &*self.ring;
        let tail = ring.tail.load(Ordering::Relaxed);
        let cursor = ring.cursor.load(Ordering::Acquire);

        if tail - cursor == ring.index_mask {
            ring.policy.reject_put(
                value,
                RingSnapshot {
                    capacity: ring.capacity(),
                    tail,
                    cursor,
                },
            );
            return Ok(PutStatus::Full);
        }

        let sequence = tail + 1;
        let index = ring.index_of(sequence);
        let slot = &ring.slots[index];
        if slot.state(Ordering::Acquire) != SlotState::CanPut {
            return Err(cold_protocol_violation(sequence, index));
        }

        slot.write(value);
        slot.set_state(SlotState::CanTake, Ordering::Release);
        ring.tail.fetch_add(1, Ordering::Release);

        Ok(PutStatus::Published { sequence })
    }

    /// The ring this producer writes to.
    pub fn ring(&self) -> &Arc<RingBuffer<P>> {
        &self.ring
    }
}

impl<P> fmt::Debug for Producer<P>
where
    P: BufferPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").field("ring", &self.ring).finish()
    }
}

#[cold]
#[inline(never)]
fn cold_protocol_violation(sequence: i64, index: usize) -> Error {
    #[cfg(feature = "tracing")]
    tracing::error!(sequence, index, "Slot is not puttable, consumer still holds it");
    Error::ProtocolViolation { sequence, index }
}
