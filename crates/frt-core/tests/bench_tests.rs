//! Tests for the memory benchmark runner and its timer-driven window.

use std::cell::Cell;

use frt_core::bench::{
    close_gate, open_window, suite, Access, Bench, Gate, Probe, Sample, Width, BURST, SUITE_LEN,
};
use frt_core::timer::handler::ignore_step;
use frt_core::timer::{Callbacks, TimerDesc, TimerService};
use frt_hal::TickSource;
use fugit::MillisDurationU32;

/// Closure that allows exactly `n` more iterations.
fn iterations(mut n: u32) -> impl FnMut() -> bool {
    move || {
        if n == 0 {
            false
        } else {
            n -= 1;
            true
        }
    }
}

#[test]
fn window_counts_bursts() {
    let word = Cell::new(0);
    let mut bench: Bench<'_, 4> = Bench::new();
    bench
        .push(Probe::on_cell("Stack", Access::Write, Width::Long, &word))
        .unwrap();

    let sample = bench.run_while(iterations(3)).unwrap();
    assert_eq!(sample.accesses, 3 * BURST);
    assert_eq!(sample.region, "Stack");
    assert_eq!(word.get(), 0xDE);
}

#[test]
fn probes_rotate_and_restart_from_zero() {
    let word = Cell::new(0);
    let mut bench: Bench<'_, SUITE_LEN> = Bench::new();
    bench.extend(suite("LowRAM", &word)).unwrap();
    assert_eq!(bench.len(), SUITE_LEN);

    let first = bench.run_while(iterations(2)).unwrap();
    assert_eq!((first.access, first.width), (Access::Write, Width::Byte));

    for _ in 1..SUITE_LEN {
        bench.run_while(iterations(1)).unwrap();
    }

    // Back at the first probe, whose counter was zeroed on the way in.
    let again = bench.run_while(iterations(1)).unwrap();
    assert_eq!((again.access, again.width), (Access::Write, Width::Byte));
    assert_eq!(again.accesses, BURST);
}

#[test]
fn full_bench_hands_probe_back() {
    let word = Cell::new(0);
    let mut bench: Bench<'_, 2> = Bench::new();
    let rejected = bench.extend(suite("HighRAM", &word)).unwrap_err();
    assert_eq!(bench.len(), 2);
    assert_eq!((rejected.access(), rejected.width()), (Access::Write, Width::Long));
}

#[test]
fn empty_bench_reports_nothing() {
    let mut bench: Bench<'_, 2> = Bench::new();
    assert!(bench.current().is_none());
    assert!(bench.run_while(iterations(5)).is_none());
}

#[test]
fn per_second_scales_by_window() {
    let sample = Sample {
        region: "HighRAM",
        access: Access::Read,
        width: Width::Word,
        accesses: 2_500,
    };
    assert_eq!(sample.per_second(MillisDurationU32::millis(500)), 5_000);
    assert_eq!(sample.per_second(MillisDurationU32::millis(1_000)), 2_500);
    assert_eq!(sample.to_string(), "HighRAM R Word : 2500 accesses");
}

#[test]
fn timer_expiry_closes_window() {
    static GATE: Gate = Gate::new();
    static TIMERS: TimerService<Callbacks<&'static Gate>, 2> = TimerService::new();

    let word = Cell::new(0);
    let mut bench: Bench<'_, 1> = Bench::new();
    bench
        .push(Probe::on_cell("Stack", Access::Read, Width::Byte, &word))
        .unwrap();

    let id = TIMERS
        .add(TimerDesc::new(3, Callbacks::new(close_gate, ignore_step, &GATE)))
        .unwrap();
    GATE.open();

    // Each loop check stands in for one compare-match interrupt.
    let sample = bench
        .run_while(|| {
            TIMERS.dispatch(0);
            GATE.is_open()
        })
        .unwrap();

    assert!(!GATE.is_open());
    assert_eq!(sample.accesses, 2 * BURST);
    // The window timer stays armed for the next window.
    assert_eq!(TIMERS.remaining(id), Ok(Some(3)));
}

#[test]
fn gate_opened_after_expiry_still_closes() {
    static GATE: Gate = Gate::new();
    static TIMERS: TimerService<Callbacks<&'static Gate>, 2> = TimerService::new();

    let word = Cell::new(0);
    let mut bench: Bench<'_, 1> = Bench::new();
    bench
        .push(Probe::on_cell("Stack", Access::Write, Width::Word, &word))
        .unwrap();

    TIMERS
        .add(TimerDesc::new(1, Callbacks::new(close_gate, ignore_step, &GATE)))
        .unwrap();

    // The window timer expires before the main loop gets to open the gate.
    TIMERS.dispatch(0);
    GATE.open();

    let mut ticks = 0;
    let sample = bench
        .run_while(|| {
            ticks += 1;
            assert!(ticks < 1_000, "window never closed");
            TIMERS.dispatch(0);
            GATE.is_open()
        })
        .unwrap();

    assert!(!GATE.is_open());
    assert_eq!(sample.accesses, 0);
    assert_eq!(TIMERS.len(), Ok(1));
}

/// Counter that only remembers its value.
struct Counter {
    count: u32,
}

impl TickSource for Counter {
    fn init(&mut self) {}

    fn read(&self) -> u32 {
        self.count
    }

    fn write(&mut self, count: u32) {
        self.count = count;
    }

    fn arm_compare(&mut self, _target: u32) {}
}

#[test]
fn open_window_zeroes_counter_and_opens_gate() {
    let gate = Gate::new();
    let mut counter = Counter { count: 1234 };

    open_window(&gate, &mut counter);

    assert!(gate.is_open());
    assert_eq!(counter.read(), 0);
}
