//! RP2350 firmware for the FRT software timers.
//!
//! TIMER0 plays the free-running counter and its ALARM0 interrupt drives the
//! timer table. The main loop runs the memory access benchmark, one window
//! per probe, with a periodic software timer closing each window.

#![no_std]
#![no_main]

mod frt;

use core::cell::{Cell, RefCell};
use core::ptr::NonNull;

use critical_section::Mutex;
use defmt_rtt as _;
use panic_probe as _;
use rp235x_hal as hal;

use embedded_hal::digital::OutputPin;
use fugit::MillisDurationU32;
use hal::clocks::Clock;
use hal::pac::interrupt;
use hal::sio::Sio;

use frt_core::bench::{
    close_gate, open_window, suite, Access, Bench, Gate, Probe, Width, DEFAULT_WINDOW_MS,
    SUITE_LEN,
};
use frt_core::tick::DEFAULT_TICK_PERIOD_MS;
use frt_core::timer::handler::ignore_step;
use frt_core::timer::{Callbacks, TimerDesc, TimerService, MAX_TIMERS};
use frt_core::{Pacer, TickConfig};

use frt::{Timer0Frt, COUNTER_HZ};

/// Boot ROM image definition for Cortex-M33 secure mode.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: hal::block::ImageDef = hal::block::ImageDef::secure_exe();

/// External crystal frequency (Pico 2 standard).
const XTAL_FREQ_HZ: u32 = 12_000_000;

/// Compare-match rate of the software timers.
const TICK: TickConfig = TickConfig::with_period_ms(COUNTER_HZ, DEFAULT_TICK_PERIOD_MS);

/// First word of SRAM8, kept out of the linker's RAM region.
const SRAM8_WORD: usize = 0x2008_0000;

/// Probes in the bench: the stack suite plus SRAM8 long accesses.
const PROBES: usize = SUITE_LEN + 2;

/// Timer table shared between the main loop and `TIMER0_IRQ_0`.
static TIMERS: TimerService<Callbacks<&'static Gate>, MAX_TIMERS> = TimerService::new();

/// Counter and pacing used by the interrupt handler, installed by `main`.
static FRT: Mutex<RefCell<Option<(Timer0Frt, Pacer)>>> = Mutex::new(RefCell::new(None));

/// Open while a benchmark window is running.
static GATE: Gate = Gate::new();

#[hal::entry]
fn main() -> ! {
    defmt::info!("frt-rp2350: starting");

    let mut pac = hal::pac::Peripherals::take().unwrap();
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    // Initialize clocks from 12 MHz crystal.
    let clocks = hal::clocks::init_clocks_and_plls(
        XTAL_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    let sys_freq = clocks.system_clock.freq().to_Hz();
    let sio = Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // Error LED (onboard GP25).
    let mut led = pins.gpio25.into_push_pull_output();

    // --- Software timers on TIMER0 ---
    let timer = hal::Timer::new_timer0(pac.TIMER0, &mut pac.RESETS, &clocks);
    let mut frt = Timer0Frt::new(timer);

    let pacer = match Pacer::from_config(&TICK, &frt) {
        Ok(pacer) => pacer,
        Err(e) => {
            defmt::error!("tick configuration rejected: {}", e);
            halt(&mut led, sys_freq);
        }
    };

    let started = critical_section::with(|cs| {
        let result = TIMERS.init(&pacer, &mut frt);
        FRT.borrow_ref_mut(cs).replace((frt, pacer));
        result
    });
    if let Err(e) = started {
        defmt::error!("timer service init failed: {}", e);
        halt(&mut led, sys_freq);
    }

    // Safety: the handler only touches state installed above.
    unsafe { cortex_m::peripheral::NVIC::unmask(hal::pac::Interrupt::TIMER0_IRQ_0) };
    defmt::info!(
        "timers running: {} us tick, compare target {}",
        TICK.period.ticks(),
        pacer.target()
    );

    // --- Benchmark ---
    let stack_word = Cell::new(0);
    let mut bench: Bench<'_, PROBES> = Bench::new();
    if let Err(probe) = bench.extend(suite("Stack", &stack_word)) {
        defmt::warn!("bench full, {=str} probes dropped", probe.region());
    }
    if let Some(sram8) = NonNull::new(SRAM8_WORD as *mut u32) {
        for access in [Access::Write, Access::Read] {
            // Safety: SRAM8 is outside every linker region; this is the only
            // user of its first word.
            let probe = unsafe { Probe::at_address("SRAM8", access, Width::Long, sram8) };
            if let Err(probe) = bench.push(probe) {
                defmt::warn!("bench full, {=str} probe dropped", probe.region());
            }
        }
    }

    let window = MillisDurationU32::millis(DEFAULT_WINDOW_MS);
    let window_ticks = TICK.ticks_for(window);

    let added = TIMERS.add(TimerDesc::new(
        window_ticks,
        Callbacks::new(close_gate, ignore_step, &GATE),
    ));
    if let Err(e) = added {
        defmt::error!("window timer not added: {}", e);
        halt(&mut led, sys_freq);
    }

    loop {
        critical_section::with(|cs| {
            if let Some((frt, _)) = FRT.borrow_ref_mut(cs).as_mut() {
                open_window(&GATE, frt);
            }
        });

        if let Some(sample) = bench.run_window(&GATE) {
            defmt::info!(
                "{=str} {} {} : {} access/s",
                sample.region,
                sample.access,
                sample.width,
                sample.per_second(window)
            );
        }
    }
}

#[interrupt]
fn TIMER0_IRQ_0() {
    critical_section::with(|cs| {
        if let Some((frt, pacer)) = FRT.borrow_ref_mut(cs).as_mut() {
            TIMERS.on_compare_match(pacer, frt);
        }
    });
}

/// Blink the LED forever.
fn halt(led: &mut impl OutputPin, sys_freq: u32) -> ! {
    let core = unsafe { cortex_m::Peripherals::steal() };
    let mut delay = cortex_m::delay::Delay::new(core.SYST, sys_freq);
    loop {
        let _ = led.set_high();
        delay.delay_ms(100);
        let _ = led.set_low();
        delay.delay_ms(100);
    }
}

/// Program metadata for `picotool info`.
#[link_section = ".bi_entries"]
#[used]
pub static PICOTOOL_ENTRIES: [hal::binary_info::EntryAddr; 5] = [
    hal::binary_info::rp_cargo_bin_name!(),
    hal::binary_info::rp_cargo_version!(),
    hal::binary_info::rp_program_description!(c"FRT software timers and memory benchmark"),
    hal::binary_info::rp_cargo_homepage_url!(),
    hal::binary_info::rp_program_build_attribute!(),
];
