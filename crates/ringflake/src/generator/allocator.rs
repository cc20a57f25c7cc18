use core::{cmp::Ordering, time::Duration};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Result},
    generator::{IdGenStatus, IdentityAssigner, Mutex, MutexGuard},
    id::Snowflake,
    time::TimeSource,
};

/// A lock-based Snowflake ID allocator.
///
/// The last issued ID is the allocator's entire state: its timestamp is the
/// last millisecond observed and its sequence is the intra-millisecond
/// counter. Both are updated under one mutex, so IDs are exact and strictly
/// increasing for a fixed identity, at the cost of serializing every caller.
/// That cost is what [`crate::CachedGenerator`] hides behind a ring buffer.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Refuses to issue IDs when the clock moves backwards
/// - ❌ Lock-free
///
/// ## See Also
/// - [`crate::CachedGenerator`]
pub struct LockSnowflakeAllocator<ID, T>
where
    ID: Snowflake,
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<ID>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<ID>,
    time: T,
}

impl<ID, T> LockSnowflakeAllocator<ID, T>
where
    ID: Snowflake,
    T: TimeSource,
{
    /// Creates a new allocator for the given identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentityOutOfRange`] if either ID does not fit its bit
    /// field.
    ///
    /// # Example
    /// ```
    /// use ringflake::{LockSnowflakeAllocator, RingflakeId, SystemClock};
    ///
    /// let allocator = LockSnowflakeAllocator::<RingflakeId, _>::new(1, 1, SystemClock::default())?;
    /// let id = allocator.try_next_id()?;
    /// assert_eq!(id.worker_id(), 1);
    ///
    /// assert!(LockSnowflakeAllocator::<RingflakeId, _>::new(32, 0, SystemClock::default()).is_err());
    /// # Ok::<(), ringflake::Error>(())
    /// ```
    pub fn new(datacenter_id: u64, worker_id: u64, time: T) -> Result<Self> {
        Self::from_components(0, datacenter_id, worker_id, 0, time)
    }

    /// Creates a new allocator with the identity produced by `assigner`.
    ///
    /// # Errors
    ///
    /// Propagates the assigner's error, or [`Error::IdentityOutOfRange`].
    pub fn from_assigner(assigner: &impl IdentityAssigner, time: T) -> Result<Self> {
        let identity = assigner.assign()?;
        Self::new(identity.datacenter_id, identity.worker_id, time)
    }

    /// Creates a new allocator from explicit component values.
    ///
    /// `timestamp` and `sequence` seed the state as if that ID had just been
    /// issued. This is mostly useful in tests that need to start on the last
    /// sequence of a millisecond.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentityOutOfRange`] if any component does not fit its
    /// bit field.
    pub fn from_components(
        timestamp: u64,
        datacenter_id: u64,
        worker_id: u64,
        sequence: u64,
        time: T,
    ) -> Result<Self> {
        check_range("timestamp", timestamp, ID::max_timestamp())?;
        check_range("datacenter_id", datacenter_id, ID::max_datacenter_id())?;
        check_range("worker_id", worker_id, ID::max_worker_id())?;
        check_range("sequence", sequence, ID::max_sequence())?;

        let id = ID::from_components(timestamp, datacenter_id, worker_id, sequence);
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(id)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(id),
            time,
        })
    }

    /// Generates the next ID, spinning if the current millisecond's sequence
    /// is exhausted.
    ///
    /// The clock is sampled inside the critical section. Sampling it before
    /// taking the lock would let a thread that lost the race present an older
    /// reading than the winner just stored, which looks exactly like a clock
    /// regression.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockMovedBackward`] if the clock reads earlier than the last
    ///   issued ID. Fatal: the allocator does not wait it out.
    /// - [`Error::TimestampOverflow`] if the clock no longer fits the timestamp
    ///   field.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   std mutex.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<ID> {
        let mut id = self.lock()?;
        let now = self.time.current_millis();
        let current_ts = id.timestamp();

        let next = match now.cmp(&current_ts) {
            Ordering::Equal => {
                if id.has_sequence_room() {
                    id.increment_sequence()
                } else {
                    let now = self.wait_next_millis(current_ts);
                    check_timestamp::<ID>(now)?;
                    id.rollover_to_timestamp(now)
                }
            }
            Ordering::Greater => {
                check_timestamp::<ID>(now)?;
                id.rollover_to_timestamp(now)
            }
            Ordering::Less => return Err(cold_clock_behind(now, current_ts)),
        };

        *id = next;
        Ok(next)
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Identical to [`Self::try_next_id`] except that an exhausted sequence
    /// yields [`IdGenStatus::Pending`] instead of spinning.
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus<ID>> {
        let mut id = self.lock()?;
        let now = self.time.current_millis();
        let current_ts = id.timestamp();

        let next = match now.cmp(&current_ts) {
            Ordering::Equal => {
                if id.has_sequence_room() {
                    id.increment_sequence()
                } else {
                    return Ok(IdGenStatus::Pending { yield_for: 1 });
                }
            }
            Ordering::Greater => {
                check_timestamp::<ID>(now)?;
                id.rollover_to_timestamp(now)
            }
            Ordering::Less => return Err(cold_clock_behind(now, current_ts)),
        };

        *id = next;
        Ok(IdGenStatus::Ready { id: next })
    }

    /// The datacenter ID packed into every issued ID.
    pub fn datacenter_id(&self) -> Result<u64> {
        Ok(self.lock()?.datacenter_id())
    }

    /// The worker ID packed into every issued ID.
    pub fn worker_id(&self) -> Result<u64> {
        Ok(self.lock()?.worker_id())
    }

    /// The epoch timestamps are measured from.
    pub fn epoch(&self) -> Duration {
        self.time.epoch()
    }

    fn wait_next_millis(&self, last: u64) -> u64 {
        loop {
            let now = self.time.current_millis();
            if now > last {
                return now;
            }
            core::hint::spin_loop();
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ID>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }
}

fn check_range(field: &'static str, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(Error::IdentityOutOfRange { field, value, max });
    }
    Ok(())
}

fn check_timestamp<ID: Snowflake>(now: u64) -> Result<()> {
    let max = ID::max_timestamp();
    if now > max {
        #[cfg(feature = "tracing")]
        tracing::error!(now, max, "Timestamp bits are exhausted, refusing to generate");
        return Err(Error::TimestampOverflow { now, max });
    }
    Ok(())
}

#[cold]
#[inline(never)]
fn cold_clock_behind(now: u64, last: u64) -> Error {
    #[cfg(feature = "tracing")]
    tracing::error!(
        last,
        now,
        "Clock moved backwards, refusing to generate for {}ms",
        last - now
    );
    Error::ClockMovedBackward { last, now }
}
