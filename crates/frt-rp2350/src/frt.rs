//! RP2350 TIMER0 as a free-running counter with one compare match.
//!
//! TIMER0 counts microseconds. ALARM0 compares against the low 32 bits of
//! the count and disarms itself when it fires, so every acknowledged match
//! rewrites ALARM0 to put it back in service.

use frt_hal::TickSource;
use rp235x_hal as hal;

/// TIMER0 tick rate.
pub const COUNTER_HZ: u32 = 1_000_000;

/// ALARM0 bit in INTR / INTE.
const ALARM0_BIT: u32 = 1 << 0;

/// TIMER0 driven through its registers. Owns the HAL timer so nothing else
/// can reprogram the block.
pub struct Timer0Frt {
    _timer: hal::Timer<hal::timer::CopyableTimer0>,
    target: u32,
}

impl Timer0Frt {
    pub fn new(timer: hal::Timer<hal::timer::CopyableTimer0>) -> Self {
        Self { _timer: timer, target: 0 }
    }

    fn regs(&self) -> &hal::pac::timer0::RegisterBlock {
        // Safety: `self` owns the only handle to TIMER0.
        unsafe { &*hal::pac::TIMER0::ptr() }
    }
}

impl TickSource for Timer0Frt {
    fn init(&mut self) {
        // Counter is already running at 1 MHz from the tick generator; only
        // the ALARM0 interrupt needs enabling.
        self.regs()
            .inte()
            .modify(|r, w| unsafe { w.bits(r.bits() | ALARM0_BIT) });
    }

    fn read(&self) -> u32 {
        self.regs().timerawl().read().bits()
    }

    fn write(&mut self, count: u32) {
        // TIMELW is latched and committed by the TIMEHW write.
        let regs = self.regs();
        regs.timelw().write(|w| unsafe { w.bits(count) });
        regs.timehw().write(|w| unsafe { w.bits(0) });
    }

    fn arm_compare(&mut self, target: u32) {
        self.target = target;
        self.regs().alarm0().write(|w| unsafe { w.bits(target) });
    }

    fn acknowledge(&mut self) {
        let regs = self.regs();
        regs.intr().write(|w| unsafe { w.bits(ALARM0_BIT) });
        regs.alarm0().write(|w| unsafe { w.bits(self.target) });
    }
}
