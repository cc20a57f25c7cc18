use core::{fmt, time::Duration};

use crate::id::Snowflake;

/// The decoded components of a packed ID.
///
/// `timestamp` is relative to the epoch the ID was generated with;
/// `unix_millis` adds that epoch back so the value can be read as wall-clock
/// time.
///
/// # Example
///
/// ```
/// use ringflake::{DEFAULT_EPOCH, IdParts, RingflakeId, Snowflake};
///
/// let id = RingflakeId::from_components(1_000, 1, 2, 7);
/// let parts = IdParts::decode(id, DEFAULT_EPOCH);
///
/// assert_eq!(parts.datacenter_id, 1);
/// assert_eq!(parts.worker_id, 2);
/// assert_eq!(parts.sequence, 7);
/// assert_eq!(parts.unix_millis, DEFAULT_EPOCH.as_millis() as u64 + 1_000);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IdParts {
    pub id: u64,
    pub timestamp: u64,
    pub unix_millis: u64,
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl IdParts {
    /// Splits `id` into its fields, resolving the timestamp against `epoch`.
    pub fn decode<ID: Snowflake>(id: ID, epoch: Duration) -> Self {
        let timestamp = id.timestamp();
        Self {
            id: id.to_raw(),
            timestamp,
            unix_millis: epoch.as_millis() as u64 + timestamp,
            datacenter_id: id.datacenter_id(),
            worker_id: id.worker_id(),
            sequence: id.sequence(),
        }
    }
}

impl fmt::Display for IdParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"id\":{},\"timestamp\":{},\"unix_millis\":{},\"datacenter_id\":{},\"worker_id\":{},\"sequence\":{}}}",
            self.id,
            self.timestamp,
            self.unix_millis,
            self.datacenter_id,
            self.worker_id,
            self.sequence
        )
    }
}
