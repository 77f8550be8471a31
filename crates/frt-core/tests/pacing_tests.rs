//! Tests for compare-match pacing and tick configuration.

use frt_core::tick::{ConfigError, Pacer, TickConfig, DEFAULT_TICK_PERIOD_MS};
use frt_hal::TickSource;
use fugit::{MicrosDurationU32, MillisDurationU32};

/// Counter with an optional width limit that records every write.
struct Counter {
    count: u32,
    max: u32,
    writes: Vec<u32>,
    acks: u32,
}

impl Counter {
    fn new(max: u32) -> Self {
        Self {
            count: 0,
            max,
            writes: Vec::new(),
            acks: 0,
        }
    }
}

impl TickSource for Counter {
    fn init(&mut self) {}

    fn read(&self) -> u32 {
        self.count
    }

    fn write(&mut self, count: u32) {
        self.count = count & self.max;
        self.writes.push(count);
    }

    fn arm_compare(&mut self, _target: u32) {}

    fn acknowledge(&mut self) {
        self.acks += 1;
    }

    fn max_count(&self) -> u32 {
        self.max
    }
}

mod drift {
    use super::*;

    #[test]
    fn late_match_carries_overshoot() {
        let pacer = Pacer::new(1_000);
        let mut counter = Counter::new(u32::MAX);
        counter.count = 1_012;

        assert_eq!(pacer.on_compare_match(&mut counter), 12);
        assert_eq!(counter.writes, vec![12]);
        assert_eq!(counter.read(), 12);
        assert_eq!(counter.acks, 1);
    }

    #[test]
    fn exact_match_resets_to_zero() {
        let pacer = Pacer::new(1_000);
        let mut counter = Counter::new(u32::MAX);
        counter.count = 1_000;

        assert_eq!(pacer.on_compare_match(&mut counter), 0);
        assert_eq!(counter.writes, vec![0]);
    }

    #[test]
    fn early_match_reports_negative_and_leaves_counter() {
        let pacer = Pacer::new(1_000);
        let mut counter = Counter::new(u32::MAX);
        counter.count = 990;

        assert_eq!(pacer.on_compare_match(&mut counter), -10);
        assert!(counter.writes.is_empty());
        assert_eq!(counter.read(), 990);
        assert_eq!(counter.acks, 1);
    }

    #[test]
    fn cumulative_timing_does_not_skew() {
        // Each match is serviced 3 counts late. With the overshoot carried,
        // the ideal match points stay exactly `target` apart.
        let target = 400;
        let pacer = Pacer::new(target);
        let mut counter = Counter::new(u32::MAX);
        let mut elapsed: u64 = 0;

        for _ in 0..10 {
            let before = counter.read();
            counter.count = target + 3;
            elapsed += (counter.count - before) as u64;
            pacer.on_compare_match(&mut counter);
        }

        // Ten ticks took ten full periods plus the still-pending overshoot.
        assert_eq!(elapsed, 10 * target as u64 + 3);
        assert_eq!(counter.read(), 3);
    }
}

mod config {
    use super::*;

    #[test]
    fn compare_target_from_rate_and_period() {
        let config = TickConfig::with_period_ms(1_000_000, DEFAULT_TICK_PERIOD_MS);
        assert_eq!(config.compare_target(), 5_000);

        let config = TickConfig::new(209_000, MicrosDurationU32::micros(200_000));
        assert_eq!(config.compare_target(), 41_800);
    }

    #[test]
    fn pacer_from_config_checks_counter_width() {
        let sixteen_bit = Counter::new(0xFFFF);

        let fits = TickConfig::with_period_ms(209_000, 200);
        assert_eq!(Pacer::from_config(&fits, &sixteen_bit).unwrap().target(), 41_800);

        let too_long = TickConfig::with_period_ms(209_000, 400);
        assert_eq!(
            Pacer::from_config(&too_long, &sixteen_bit).unwrap_err(),
            ConfigError::PeriodTooLong {
                target: 83_600,
                max_count: 0xFFFF
            }
        );
    }

    #[test]
    fn degenerate_configs_are_rejected() {
        let counter = Counter::new(u32::MAX);

        let zero_rate = TickConfig::with_period_ms(0, 5);
        assert_eq!(Pacer::from_config(&zero_rate, &counter).unwrap_err(), ConfigError::ZeroRate);

        let too_short = TickConfig::new(1_000, MicrosDurationU32::micros(10));
        assert_eq!(
            Pacer::from_config(&too_short, &counter).unwrap_err(),
            ConfigError::PeriodTooShort
        );
    }

    #[test]
    fn ticks_for_window() {
        let config = TickConfig::with_period_ms(1_000_000, 200);
        assert_eq!(config.ticks_for(MillisDurationU32::millis(1_000)), 5);
        assert_eq!(config.ticks_for(MillisDurationU32::millis(1_001)), 6);
    }
}
