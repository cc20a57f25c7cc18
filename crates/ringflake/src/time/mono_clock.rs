use core::time::Duration;
use portable_atomic::{AtomicU64, Ordering};
use std::{
    sync::Arc,
    thread,
    time::{Instant, SystemTime},
};

use crate::{
    error::{Error, Result},
    time::TimeSource,
};

/// A time source that never goes backwards.
///
/// The wall clock is sampled once, at construction, to align tick zero with
/// `epoch`. After that a background ticker thread advances a shared counter
/// from [`Instant`] once per millisecond, so NTP steps and manual clock
/// changes are invisible. Clones share the same ticker; the thread exits after
/// the last clone is dropped.
///
/// The trade-off against [`crate::SystemClock`] is that a long-running process
/// slowly drifts from wall time, and a restart after a backward step can
/// overlap IDs issued before it. Prefer the wall clock where clock regression
/// should be reported rather than absorbed.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    ticks: Arc<AtomicU64>,
    epoch: Duration,
    epoch_offset: u64, // in milliseconds
}

impl MonotonicClock {
    /// Constructs a monotonic clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as the origin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerSpawn`] if the ticker thread cannot be started.
    ///
    /// # Example
    ///
    /// ```
    /// use ringflake::{DEFAULT_EPOCH, MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::with_epoch(DEFAULT_EPOCH)?;
    /// let a = clock.current_millis();
    /// std::thread::sleep(std::time::Duration::from_millis(5));
    /// assert!(clock.current_millis() >= a);
    /// # Ok::<(), ringflake::Error>(())
    /// ```
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let start = Instant::now();
        let epoch_offset = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()
            .and_then(|now| now.checked_sub(epoch))
            .map_or(0, |since| since.as_millis() as u64);

        let ticks = Arc::new(AtomicU64::new(0));
        let weak = Arc::downgrade(&ticks);

        thread::Builder::new()
            .name("ringflake-clock".into())
            .spawn(move || {
                let mut tick = 0;
                while let Some(ticks) = weak.upgrade() {
                    let target = start + Duration::from_millis(tick);
                    let now = Instant::now();
                    if now < target {
                        thread::sleep(target - now);
                    }

                    let elapsed = start.elapsed().as_millis() as u64;
                    ticks.store(elapsed, Ordering::Relaxed);
                    tick = elapsed + 1;
                }
            })
            .map_err(|e| Error::WorkerSpawn {
                reason: e.to_string(),
            })?;

        Ok(Self {
            ticks,
            epoch,
            epoch_offset,
        })
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.epoch_offset + self.ticks.load(Ordering::Relaxed)
    }

    fn epoch(&self) -> Duration {
        self.epoch
    }
}
