use core::time::Duration;

/// Default epoch: Thursday, January 1, 2015 00:00:00 UTC+8
/// (`2014-12-31T16:00:00Z`).
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_420_041_600_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Standard UNIX epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const UNIX_EPOCH: Duration = Duration::from_millis(0);

/// A trait for time sources that return a millisecond timestamp relative to a
/// fixed epoch.
///
/// This abstraction allows you to plug in the wall clock, a monotonic timer,
/// or a mocked time source in tests. The allocator packs whatever this returns
/// straight into the timestamp field, so the epoch subtraction happens here.
///
/// # Example
///
/// ```
/// use ringflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;

    /// The epoch, as a [`Duration`] since 1970-01-01 UTC, that
    /// [`Self::current_millis`] counts from.
    fn epoch(&self) -> Duration {
        UNIX_EPOCH
    }
}
