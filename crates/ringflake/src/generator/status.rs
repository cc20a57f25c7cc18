use crate::id::Snowflake;

/// Represents the result of polling the allocator for a new ID.
///
/// This type models the outcome of
/// [`LockSnowflakeAllocator::try_poll_id`](crate::LockSnowflakeAllocator::try_poll_id):
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means every sequence value for the current
///   millisecond is spent and the caller should back off for `yield_for`
///   milliseconds.
///
/// The blocking [`try_next_id`](crate::LockSnowflakeAllocator::try_next_id)
/// spins through the pending case itself.
///
/// # Example
///
/// ```
/// use ringflake::{IdGenStatus, LockSnowflakeAllocator, RingflakeId, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let allocator = LockSnowflakeAllocator::<RingflakeId, _>::new(0, 1, FixedTime)?;
/// match allocator.try_poll_id()? {
///     IdGenStatus::Ready { id } => println!("ID: {}", id.timestamp()),
///     IdGenStatus::Pending { yield_for } => println!("Back off for {yield_for}ms"),
/// }
/// # Ok::<(), ringflake::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus<T: Snowflake> {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated Snowflake ID.
        id: T,
    },
    /// No ID could be generated because the sequence has been exhausted for the
    /// current millisecond.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}
