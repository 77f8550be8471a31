//! Tick rate configuration.

use fugit::{MicrosDurationU32, MillisDurationU32};

/// Tick period used when a host does not pick one.
pub const DEFAULT_TICK_PERIOD_MS: u32 = 5;

/// Rejected tick configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Counter frequency of 0 Hz.
    ZeroRate,
    /// Period shorter than one counter increment.
    PeriodTooShort,
    /// Compare target does not fit the counter.
    PeriodTooLong { target: u64, max_count: u32 },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroRate => f.write_str("counter frequency is zero"),
            ConfigError::PeriodTooShort => {
                f.write_str("tick period is shorter than one counter increment")
            }
            ConfigError::PeriodTooLong { target, max_count } => write!(
                f,
                "compare target {target} exceeds counter maximum {max_count}"
            ),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Counter frequency plus the tick period derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickConfig {
    /// Counter increments per second, after any clock divider.
    pub counter_hz: u32,
    /// Time between compare-match interrupts.
    pub period: MicrosDurationU32,
}

impl TickConfig {
    pub const fn new(counter_hz: u32, period: MicrosDurationU32) -> Self {
        Self { counter_hz, period }
    }

    pub const fn with_period_ms(counter_hz: u32, period_ms: u32) -> Self {
        Self::new(counter_hz, MicrosDurationU32::millis(period_ms))
    }

    /// Counter increments per tick period.
    pub const fn compare_target(&self) -> u64 {
        self.counter_hz as u64 * self.period.ticks() as u64 / 1_000_000
    }

    /// Check the configuration against a counter that wraps after `max_count`
    /// and return the compare target.
    pub fn validate(&self, max_count: u32) -> Result<u32, ConfigError> {
        if self.counter_hz == 0 {
            return Err(ConfigError::ZeroRate);
        }
        let target = self.compare_target();
        if target == 0 {
            return Err(ConfigError::PeriodTooShort);
        }
        if target > max_count as u64 {
            return Err(ConfigError::PeriodTooLong { target, max_count });
        }
        Ok(target as u32)
    }

    /// Number of ticks covering `duration`, rounded up, at least one.
    pub fn ticks_for(&self, duration: MillisDurationU32) -> u32 {
        let period_us = (self.period.ticks() as u64).max(1);
        let wanted_us = duration.ticks() as u64 * 1_000;
        let ticks = wanted_us.div_ceil(period_us).max(1);
        ticks.min(u32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_ticks_round_up() {
        let config = TickConfig::with_period_ms(1_000_000, 5);
        assert_eq!(config.ticks_for(MillisDurationU32::millis(1000)), 200);
        assert_eq!(config.ticks_for(MillisDurationU32::millis(11)), 3);
        assert_eq!(config.ticks_for(MillisDurationU32::millis(0)), 1);
    }
}
