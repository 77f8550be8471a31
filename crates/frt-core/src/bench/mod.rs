//! Memory access benchmark gated by a software timer.
//!
//! Each [`Probe`] hammers one memory word with a burst of volatile accesses
//! of a single width and direction. [`Bench`] runs the current probe for as
//! long as a [`Gate`] stays open, reports the access count, and moves on to
//! the next probe. One periodic timer closes the gate every window;
//! [`open_window`] zeroes the counter and reopens it.

use core::cell::Cell;
use core::marker::PhantomData;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, Ordering};

use frt_hal::TickSource;
use fugit::MillisDurationU32;

use crate::timer::TimerEvent;

/// Volatile accesses performed by one probe run.
pub const BURST: u32 = 10;

/// Default measurement window.
pub const DEFAULT_WINDOW_MS: u32 = 1000;

/// Probes per memory region in [`suite`].
pub const SUITE_LEN: usize = 6;

const WRITE_PATTERN: u32 = 0xDE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Width {
    Byte,
    Word,
    Long,
}

impl core::fmt::Display for Access {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(match self {
            Access::Read => "R",
            Access::Write => "W",
        })
    }
}

impl core::fmt::Display for Width {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(match self {
            Width::Byte => "Byte",
            Width::Word => "Word",
            Width::Long => "Long",
        })
    }
}

/// One benchmark case: a region label, an access kind, and the word it hits.
#[derive(Debug, Clone, Copy)]
pub struct Probe<'a> {
    region: &'static str,
    access: Access,
    width: Width,
    target: NonNull<u32>,
    _word: PhantomData<&'a Cell<u32>>,
}

impl<'a> Probe<'a> {
    /// Probe on a word the caller owns.
    pub fn on_cell(region: &'static str, access: Access, width: Width, word: &'a Cell<u32>) -> Self {
        Self {
            region,
            access,
            width,
            target: NonNull::from(word).cast(),
            _word: PhantomData,
        }
    }

    /// Probe on a fixed address, e.g. a word in a specific SRAM bank.
    ///
    /// # Safety
    ///
    /// `addr` must be 4-byte aligned and valid for volatile reads and writes
    /// of 4 bytes for as long as the probe is used, and nothing else may hold
    /// a reference to that word.
    pub unsafe fn at_address(region: &'static str, access: Access, width: Width, addr: NonNull<u32>) -> Self {
        Self {
            region,
            access,
            width,
            target: addr,
            _word: PhantomData,
        }
    }

    pub fn region(&self) -> &'static str {
        self.region
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn width(&self) -> Width {
        self.width
    }

    /// Perform one burst and return the number of accesses made.
    pub fn run(&self) -> u32 {
        let word = self.target.as_ptr();
        // Safety: `target` is valid for 4-byte volatile access per the
        // constructors; byte and halfword accesses stay inside that word.
        unsafe {
            match (self.access, self.width) {
                (Access::Write, Width::Byte) => burst(|| word.cast::<u8>().write_volatile(WRITE_PATTERN as u8)),
                (Access::Write, Width::Word) => burst(|| word.cast::<u16>().write_volatile(WRITE_PATTERN as u16)),
                (Access::Write, Width::Long) => burst(|| word.write_volatile(WRITE_PATTERN)),
                (Access::Read, Width::Byte) => burst(|| {
                    let _ = word.cast::<u8>().read_volatile();
                }),
                (Access::Read, Width::Word) => burst(|| {
                    let _ = word.cast::<u16>().read_volatile();
                }),
                (Access::Read, Width::Long) => burst(|| {
                    let _ = word.read_volatile();
                }),
            }
        }
        BURST
    }
}

#[inline(always)]
fn burst(mut access: impl FnMut()) {
    for _ in 0..BURST {
        access();
    }
}

impl core::fmt::Display for Probe<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {} {}", self.region, self.access, self.width)
    }
}

/// The six write/read by byte/word/long probes for one region.
pub fn suite<'a>(region: &'static str, word: &'a Cell<u32>) -> [Probe<'a>; SUITE_LEN] {
    [
        Probe::on_cell(region, Access::Write, Width::Byte, word),
        Probe::on_cell(region, Access::Write, Width::Word, word),
        Probe::on_cell(region, Access::Write, Width::Long, word),
        Probe::on_cell(region, Access::Read, Width::Byte, word),
        Probe::on_cell(region, Access::Read, Width::Word, word),
        Probe::on_cell(region, Access::Read, Width::Long, word),
    ]
}

/// Measurement window flag, opened by the main loop and closed from the
/// timer interrupt.
#[derive(Debug, Default)]
pub struct Gate {
    open: AtomicBool,
}

impl Gate {
    pub const fn new() -> Self {
        Self {
            open: AtomicBool::new(false),
        }
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

/// Expiry hook for the periodic window timer whose user data is the gate.
/// The timer keeps its interval, so a gate opened late is still closed by
/// the next expiry.
pub fn close_gate(event: &TimerEvent, gate: &mut &'static Gate) -> u32 {
    gate.close();
    event.interval
}

/// Start a measurement window.
///
/// Zeroes the counter so the next compare match is a full tick away, then
/// opens the gate. Both happen inside one critical section, so no tick can
/// land between them.
pub fn open_window<T: TickSource>(gate: &Gate, source: &mut T) {
    critical_section::with(|_| {
        source.reset();
        gate.open();
    });
}

/// Result of one measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub region: &'static str,
    pub access: Access,
    pub width: Width,
    pub accesses: u32,
}

impl Sample {
    /// Accesses per second for a window of the given length.
    pub fn per_second(&self, window: MillisDurationU32) -> u32 {
        let window_ms = (window.ticks() as u64).max(1);
        (self.accesses as u64 * 1_000 / window_ms).min(u32::MAX as u64) as u32
    }
}

impl core::fmt::Display for Sample {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {} {} : {} accesses", self.region, self.access, self.width, self.accesses)
    }
}

struct Entry<'a> {
    probe: Probe<'a>,
    count: u32,
}

/// Round-robin runner over up to `N` probes.
pub struct Bench<'a, const N: usize> {
    entries: heapless::Vec<Entry<'a>, N>,
    current: usize,
}

impl<const N: usize> Default for Bench<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> Bench<'a, N> {
    pub const fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
            current: 0,
        }
    }

    /// Add a probe. Hands it back when the bench is full.
    pub fn push(&mut self, probe: Probe<'a>) -> Result<(), Probe<'a>> {
        self.entries
            .push(Entry { probe, count: 0 })
            .map_err(|entry| entry.probe)
    }

    /// Add several probes, stopping at the first that does not fit.
    pub fn extend(&mut self, probes: impl IntoIterator<Item = Probe<'a>>) -> Result<(), Probe<'a>> {
        probes.into_iter().try_for_each(|probe| self.push(probe))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Probe the next window will run.
    pub fn current(&self) -> Option<&Probe<'a>> {
        self.entries.get(self.current).map(|entry| &entry.probe)
    }

    /// Run the current probe until `gate` closes.
    pub fn run_window(&mut self, gate: &Gate) -> Option<Sample> {
        self.run_while(|| gate.is_open())
    }

    /// Run the current probe while `keep_going` returns true, report its
    /// count, then advance to the next probe and zero that one's counter.
    pub fn run_while(&mut self, mut keep_going: impl FnMut() -> bool) -> Option<Sample> {
        let len = self.entries.len();
        let entry = self.entries.get_mut(self.current)?;

        while keep_going() {
            entry.count = entry.count.wrapping_add(entry.probe.run());
        }

        let sample = Sample {
            region: entry.probe.region,
            access: entry.probe.access,
            width: entry.probe.width,
            accesses: entry.count,
        };

        self.current = (self.current + 1) % len;
        self.entries[self.current].count = 0;

        Some(sample)
    }
}
