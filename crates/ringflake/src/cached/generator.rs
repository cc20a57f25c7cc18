use core::time::Duration;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    cached::CachedConfig,
    error::Result,
    generator::LockSnowflakeAllocator,
    id::{IdParts, Snowflake},
    padding::{PaddingExecutor, PaddingPolicy, PaddingSignal, PaddingWorker},
    ring::{RingBuffer, TakeStatus},
    time::TimeSource,
};

/// A Snowflake generator that serves IDs from a pre-filled ring buffer.
///
/// Construction fills the ring once, then a padding thread keeps it topped up
/// whenever a take drops below the padding threshold. Callers on any thread
/// take from the ring without touching the allocator's lock. If the ring runs
/// dry the call falls back to the allocator directly, so `next_id` only fails
/// on the allocator's fatal errors.
///
/// Because IDs are minted ahead of use, their timestamps record when they
/// were allocated, which may be earlier than when they are handed out.
///
/// # Example
///
/// ```
/// use ringflake::{CachedConfig, CachedGenerator, LockSnowflakeAllocator, RingflakeId, SystemClock};
///
/// let allocator = LockSnowflakeAllocator::<RingflakeId, _>::new(3, 7, SystemClock::default())?;
/// let generator = CachedGenerator::new(allocator, CachedConfig::default().with_boost_power(0))?;
///
/// let id = generator.next_id()?;
/// let parts = generator.parse(id.to_raw());
/// assert_eq!(parts.datacenter_id, 3);
/// assert_eq!(parts.worker_id, 7);
/// # Ok::<(), ringflake::Error>(())
/// ```
pub struct CachedGenerator<ID, T>
where
    ID: Snowflake + Send + Sync + 'static,
    T: TimeSource + Send + Sync + 'static,
{
    ring: Arc<RingBuffer<PaddingPolicy>>,
    executor: Arc<PaddingExecutor<ID, T>>,
    signal: Arc<PaddingSignal>,
    worker: PaddingWorker,
}

impl<ID, T> CachedGenerator<ID, T>
where
    ID: Snowflake + Send + Sync + 'static,
    T: TimeSource + Send + Sync + 'static,
{
    /// Builds the ring, fills it, and starts the padding thread.
    ///
    /// # Errors
    ///
    /// - Configuration errors from [`CachedConfig::validate`].
    /// - Any allocator error raised while filling the ring.
    /// - [`crate::Error::WorkerSpawn`] if the padding thread cannot start.
    pub fn new(allocator: LockSnowflakeAllocator<ID, T>, config: CachedConfig) -> Result<Self> {
        config.validate()?;

        let (signal, parker) = PaddingSignal::new();
        let signal = Arc::new(signal);
        let (ring, producer) = RingBuffer::new(
            config.capacity::<ID>(),
            config.padding_factor,
            PaddingPolicy::new(Arc::clone(&signal)),
        )?;

        let executor = Arc::new(PaddingExecutor::new(Arc::new(allocator), producer));
        executor.padding_buffer()?;

        let worker = PaddingWorker::spawn(
            Arc::clone(&executor),
            Arc::clone(&signal),
            parker,
            config.schedule_interval,
        )?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            capacity = ring.capacity(),
            padding_threshold = ring.padding_threshold(),
            schedule_interval = ?config.schedule_interval,
            "Initialized cached generator"
        );

        Ok(Self {
            ring,
            executor,
            signal,
            worker,
        })
    }

    /// Returns the next ID.
    ///
    /// # Errors
    ///
    /// Only when the ring is empty and the fallback allocation fails, see
    /// [`LockSnowflakeAllocator::try_next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<ID> {
        match self.ring.take() {
            TakeStatus::Ready { id } => Ok(ID::from_raw(id)),
            TakeStatus::Empty => self.executor.allocator().try_next_id(),
        }
    }

    /// Decodes a raw ID produced by this generator.
    pub fn parse(&self, raw: u64) -> IdParts {
        IdParts::decode(ID::from_raw(raw), self.epoch())
    }

    /// The epoch the allocator's clock counts from.
    pub fn epoch(&self) -> Duration {
        self.executor.allocator().epoch()
    }

    pub fn ring(&self) -> &Arc<RingBuffer<PaddingPolicy>> {
        &self.ring
    }

    pub fn allocator(&self) -> &Arc<LockSnowflakeAllocator<ID, T>> {
        self.executor.allocator()
    }

    /// Low-watermark requests seen so far, including coalesced ones.
    pub fn padding_requests(&self) -> u64 {
        self.signal.raised()
    }

    /// Stops the padding thread. IDs left in the ring can still be taken and
    /// `next_id` keeps working through the allocator fallback.
    ///
    /// Idempotent; also runs on drop.
    pub fn shutdown(&mut self) {
        if self.worker.is_running() {
            #[cfg(feature = "tracing")]
            tracing::debug!(remaining = self.ring.len(), "Shutting down cached generator");
            self.worker.shutdown();
        }
    }
}
