use portable_atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{LockSnowflakeAllocator, Mutex, MutexGuard},
    id::Snowflake,
    padding::PaddingPolicy,
    ring::{BufferPolicy, Producer, PutStatus, RingBuffer},
    time::TimeSource,
};

/// What a call to [`PaddingExecutor::padding_buffer`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaddingOutcome {
    /// `count` fresh IDs were published.
    Padded { count: usize },
    /// Another refill was in flight, so this call did nothing.
    AlreadyRunning,
}

/// Refills a [`RingBuffer`] from a [`LockSnowflakeAllocator`].
///
/// Owns the ring's only [`Producer`]. At most one refill runs at a time:
/// callers racing an in-flight refill get [`PaddingOutcome::AlreadyRunning`]
/// back instead of waiting.
pub struct PaddingExecutor<ID, T, P = PaddingPolicy>
where
    ID: Snowflake,
    T: TimeSource,
    P: BufferPolicy,
{
    allocator: Arc<LockSnowflakeAllocator<ID, T>>,
    producer: Mutex<Producer<P>>,
    running: AtomicBool,
}

impl<ID, T, P> PaddingExecutor<ID, T, P>
where
    ID: Snowflake,
    T: TimeSource,
    P: BufferPolicy,
{
    pub fn new(allocator: Arc<LockSnowflakeAllocator<ID, T>>, producer: Producer<P>) -> Self {
        Self {
            allocator,
            producer: Mutex::new(producer),
            running: AtomicBool::new(false),
        }
    }

    /// Fills every free slot of the ring with freshly allocated IDs.
    ///
    /// One ID is allocated per slot that was free when the refill started. A
    /// full ring ends the refill early and is not an error.
    ///
    /// # Errors
    ///
    /// Allocator errors ([`crate::Error::ClockMovedBackward`],
    /// [`crate::Error::TimestampOverflow`]) and
    /// [`crate::Error::ProtocolViolation`] abort the refill. IDs already
    /// published stay in the ring.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn padding_buffer(&self) -> Result<PaddingOutcome> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            #[cfg(feature = "tracing")]
            tracing::trace!("Padding already in progress");
            return Ok(PaddingOutcome::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);

        let mut producer = self.lock_producer()?;
        let ring = Arc::clone(producer.ring());
        let free = ring.remaining_capacity();

        let mut count = 0;
        for _ in 0..free {
            let id = self.allocator.try_next_id()?;
            match producer.put(id.to_raw())? {
                PutStatus::Published { .. } => count += 1,
                PutStatus::Full => break,
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            count,
            tail = ring.tail(),
            cursor = ring.cursor(),
            "Padded buffer"
        );

        Ok(PaddingOutcome::Padded { count })
    }

    /// Whether a refill is in flight right now.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn allocator(&self) -> &Arc<LockSnowflakeAllocator<ID, T>> {
        &self.allocator
    }

    /// The ring this executor refills.
    pub fn ring(&self) -> Result<Arc<RingBuffer<P>>> {
        Ok(Arc::clone(self.lock_producer()?.ring()))
    }

    fn lock_producer(&self) -> Result<MutexGuard<'_, Producer<P>>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.producer.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.producer.lock()?)
        }
    }
}

/// Clears the running flag on every exit path, including unwinding.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
