use core::time::Duration;
use std::time::SystemTime;

use crate::time::{DEFAULT_EPOCH, TimeSource};

/// Wall-clock time source offset from a fixed epoch.
///
/// Every call samples [`SystemTime::now`], so NTP steps or manual adjustments
/// are visible to the allocator. That is the point: a backward step surfaces
/// as [`crate::Error::ClockMovedBackward`] instead of being hidden. Use
/// [`crate::MonotonicClock`] when hiding it is preferred.
///
/// Readings earlier than the epoch saturate to zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    /// Constructs a wall clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }
}

impl SystemClock {
    /// Constructs a wall clock counting from `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC).
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()
            .and_then(|now| now.checked_sub(self.epoch))
            .map_or(0, |since| since.as_millis() as u64)
    }

    fn epoch(&self) -> Duration {
        self.epoch
    }
}
