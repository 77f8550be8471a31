//! PC host for the FRT software timers.
//!
//! Runs the timer service against a simulated free-running counter, with a
//! background thread playing the compare-match interrupt, and uses it to gate
//! the memory access benchmark the same way the firmware does.

mod error;
mod frt;
mod irq;

use std::cell::Cell;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use fugit::MillisDurationU32;

use frt_core::bench::{close_gate, open_window, suite, Bench, Gate, DEFAULT_WINDOW_MS, SUITE_LEN};
use frt_core::tick::DEFAULT_TICK_PERIOD_MS;
use frt_core::timer::handler::ignore_step;
use frt_core::timer::{Callbacks, TimerDesc, TimerService, MAX_TIMERS};
use frt_core::{Pacer, TickConfig};

use error::HostError;
use frt::SimFrt;

/// Timer table shared with the interrupt thread.
pub(crate) static TIMERS: TimerService<Callbacks<&'static Gate>, MAX_TIMERS> = TimerService::new();

/// Open while a benchmark window is running.
static GATE: Gate = Gate::new();

/// Two regions of six probes each.
const PROBES: usize = 2 * SUITE_LEN;

#[derive(Parser)]
#[command(name = "frt-pc")]
#[command(about = "Software timers on a simulated free-running counter, gating a memory benchmark", long_about = None)]
#[command(version)]
struct Cli {
    /// Simulated counter frequency in Hz
    #[arg(long, default_value_t = 1_000_000)]
    counter_hz: u32,

    /// Compare-match period in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_PERIOD_MS)]
    tick_ms: u32,

    /// Benchmark window per probe in milliseconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_MS)]
    window_ms: u32,

    /// Number of windows to run (0 runs every probe once)
    #[arg(long, default_value_t = 0)]
    rounds: usize,

    /// Only show warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.quiet {
            log::LevelFilter::Warn
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(e) = run(&cli) {
        log::error!("{e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), HostError> {
    log::info!("frt-pc: starting");

    let config = TickConfig::with_period_ms(cli.counter_hz, cli.tick_ms);
    let mut frt = SimFrt::new(cli.counter_hz);
    let pacer = Pacer::from_config(&config, &frt)?;
    TIMERS.init(&pacer, &mut frt)?;

    let window = MillisDurationU32::millis(cli.window_ms);
    let window_ticks = config.ticks_for(window);
    log::info!(
        "tick every {} ms ({} counts), window {} ms ({} ticks)",
        cli.tick_ms,
        pacer.target(),
        cli.window_ms,
        window_ticks
    );

    let stop = Arc::new(AtomicBool::new(false));
    let irq = irq::spawn(frt.clone(), pacer, stop.clone())?;

    let heap_word: &'static Cell<u32> = Box::leak(Box::new(Cell::new(0)));
    let stack_word = Cell::new(0);
    let mut bench: Bench<'_, PROBES> = Bench::new();
    for probes in [suite("Heap", heap_word), suite("Stack", &stack_word)] {
        bench.extend(probes).map_err(|probe| HostError::BenchFull {
            probe: probe.to_string(),
        })?;
    }

    let rounds = if cli.rounds == 0 { bench.len() } else { cli.rounds };
    let result = run_windows(&mut bench, &mut frt, window, window_ticks, rounds);

    stop.store(true, Ordering::Release);
    irq.join().map_err(|_| HostError::IrqPanicked)?;
    result
}

/// Run `rounds` benchmark windows. One periodic timer closes the gate at
/// the end of every window; each window starts from a zeroed counter.
fn run_windows(
    bench: &mut Bench<'_, PROBES>,
    frt: &mut SimFrt,
    window: MillisDurationU32,
    window_ticks: u32,
    rounds: usize,
) -> Result<(), HostError> {
    let timer = TIMERS.add(TimerDesc::new(
        window_ticks,
        Callbacks::new(close_gate, ignore_step, &GATE),
    ))?;

    for _ in 0..rounds {
        open_window(&GATE, frt);

        if let Some(sample) = bench.run_window(&GATE) {
            log::info!(
                "{:<7} {} {:<4} : {} access/s",
                sample.region,
                sample.access,
                sample.width,
                sample.per_second(window)
            );
        }
    }

    TIMERS.remove(timer)?;
    Ok(())
}
