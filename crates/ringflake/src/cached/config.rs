use core::time::Duration;

use crate::{
    error::{Error, Result},
    id::Snowflake,
    ring::DEFAULT_PADDING_FACTOR,
};

/// Default left shift applied to the per-millisecond sequence space to size
/// the ring.
pub const DEFAULT_BOOST_POWER: u32 = 3;

/// Largest accepted `boost_power`. With a 12-bit sequence this is a ring of
/// 16M slots.
pub const MAX_BOOST_POWER: u32 = 12;

/// Tuning knobs for [`crate::CachedGenerator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachedConfig {
    /// Ring capacity is `(max_sequence + 1) << boost_power`, i.e. this many
    /// doublings of one millisecond's worth of IDs.
    pub boost_power: u32,
    /// Percentage of the capacity below which a take requests a refill.
    pub padding_factor: u32,
    /// Also refill on this period, whether or not a take asked for it.
    pub schedule_interval: Option<Duration>,
}

impl Default for CachedConfig {
    fn default() -> Self {
        Self {
            boost_power: DEFAULT_BOOST_POWER,
            padding_factor: DEFAULT_PADDING_FACTOR,
            schedule_interval: None,
        }
    }
}

impl CachedConfig {
    pub const fn with_boost_power(mut self, boost_power: u32) -> Self {
        self.boost_power = boost_power;
        self
    }

    pub const fn with_padding_factor(mut self, padding_factor: u32) -> Self {
        self.padding_factor = padding_factor;
        self
    }

    pub const fn with_schedule_interval(mut self, interval: Duration) -> Self {
        self.schedule_interval = Some(interval);
        self
    }

    /// Checks every field without building anything.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] for a `boost_power` above
    ///   [`MAX_BOOST_POWER`] or a zero `schedule_interval`.
    /// - [`Error::InvalidPaddingFactor`] for a factor above 100.
    pub fn validate(&self) -> Result<()> {
        if self.boost_power > MAX_BOOST_POWER {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "boost_power {} exceeds the max {MAX_BOOST_POWER}",
                    self.boost_power
                ),
            });
        }
        if self.padding_factor > 100 {
            return Err(Error::InvalidPaddingFactor {
                factor: self.padding_factor,
            });
        }
        if self.schedule_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(Error::InvalidConfig {
                reason: "schedule_interval must be positive".into(),
            });
        }
        Ok(())
    }

    /// Ring capacity for IDs of type `ID`.
    pub fn capacity<ID: Snowflake>(&self) -> usize {
        ((ID::max_sequence() + 1) << self.boost_power) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RingflakeId;

    #[test]
    fn default_capacity_is_eight_milliseconds_of_ids() {
        let config = CachedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity::<RingflakeId>(), 4096 * 8);
        assert_eq!(config.padding_factor, 50);
        assert_eq!(config.schedule_interval, None);
    }

    #[test]
    fn builders_set_fields() {
        let config = CachedConfig::default()
            .with_boost_power(0)
            .with_padding_factor(20)
            .with_schedule_interval(Duration::from_secs(300));
        assert_eq!(config.capacity::<RingflakeId>(), 4096);
        assert_eq!(config.padding_factor, 20);
        assert_eq!(config.schedule_interval, Some(Duration::from_secs(300)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            CachedConfig::default()
                .with_boost_power(MAX_BOOST_POWER + 1)
                .validate(),
            Err(Error::InvalidConfig { .. })
        ));
        assert_eq!(
            CachedConfig::default().with_padding_factor(101).validate(),
            Err(Error::InvalidPaddingFactor { factor: 101 })
        );
        assert!(matches!(
            CachedConfig::default()
                .with_schedule_interval(Duration::ZERO)
                .validate(),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(
            CachedConfig::default()
                .with_boost_power(MAX_BOOST_POWER)
                .validate()
                .is_ok()
        );
    }
}
