//! Tick pacing over a free-running counter.
//!
//! The counter is never stopped. At each compare match the handler reads the
//! counter, works out how far past the target it got, and writes that
//! overshoot back as the new count so the next match lands one full period
//! after the ideal time rather than after the late one.

pub mod config;

pub use config::{ConfigError, TickConfig, DEFAULT_TICK_PERIOD_MS};

use frt_hal::TickSource;

/// Compare-match pacing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pacer {
    target: u32,
}

impl Pacer {
    pub const fn new(target: u32) -> Self {
        Self { target }
    }

    /// Pacer for `config`, checked against the counter width of `source`.
    pub fn from_config<T: TickSource>(config: &TickConfig, source: &T) -> Result<Self, ConfigError> {
        config.validate(source.max_count()).map(Self::new)
    }

    /// Counter value at which the compare match fires.
    pub const fn target(&self) -> u32 {
        self.target
    }

    /// Start the counter: configure it, arm the compare match, zero it.
    pub fn start<T: TickSource>(&self, source: &mut T) {
        source.init();
        source.arm_compare(self.target);
        source.reset();
    }

    /// Handle one compare match and return the drift (actual minus target).
    ///
    /// A non-negative drift is carried into the counter. A negative drift
    /// means the match was early or spurious; the counter is left running.
    pub fn on_compare_match<T: TickSource>(&self, source: &mut T) -> i32 {
        let count = source.read();
        let drift = count.wrapping_sub(self.target) as i32;
        if drift >= 0 {
            source.write(drift as u32);
        }
        source.acknowledge();
        drift
    }
}
