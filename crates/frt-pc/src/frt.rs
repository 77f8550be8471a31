//! Simulated free-running counter for the PC host.
//!
//! The count is derived from wall-clock time at a fixed rate, so it advances
//! on its own like the hardware counter does. Handles are cheap clones of one
//! shared counter: the main thread and the interrupt thread each hold one.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use frt_hal::TickSource;

#[derive(Debug)]
struct State {
    counter_hz: u32,
    /// Count at `epoch`.
    base: u32,
    epoch: Instant,
    compare: Option<u32>,
    running: bool,
}

impl State {
    fn count(&self) -> u32 {
        if !self.running {
            return self.base;
        }
        let elapsed = self.epoch.elapsed().as_nanos();
        let advanced = elapsed * self.counter_hz as u128 / 1_000_000_000;
        self.base.wrapping_add(advanced as u32)
    }
}

/// Clonable handle on a simulated counter.
#[derive(Debug, Clone)]
pub struct SimFrt {
    state: Arc<Mutex<State>>,
}

impl SimFrt {
    pub fn new(counter_hz: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                counter_hz,
                base: 0,
                epoch: Instant::now(),
                compare: None,
                running: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicked holder cannot leave the counter half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Time until the armed compare match, `None` when stopped or unarmed.
    pub fn until_compare(&self) -> Option<Duration> {
        let state = self.lock();
        let target = state.compare.filter(|_| state.running)?;
        let count = state.count();
        if count >= target || state.counter_hz == 0 {
            return Some(Duration::ZERO);
        }
        let nanos = (target - count) as u64 * 1_000_000_000 / state.counter_hz as u64;
        Some(Duration::from_nanos(nanos))
    }

    /// Counter has reached the compare target.
    pub fn compare_pending(&self) -> bool {
        let state = self.lock();
        match state.compare {
            Some(target) => state.running && state.count() >= target,
            None => false,
        }
    }
}

impl TickSource for SimFrt {
    fn init(&mut self) {
        let mut state = self.lock();
        state.running = true;
        state.epoch = Instant::now();
    }

    fn read(&self) -> u32 {
        self.lock().count()
    }

    fn write(&mut self, count: u32) {
        let mut state = self.lock();
        state.base = count;
        state.epoch = Instant::now();
    }

    fn arm_compare(&mut self, target: u32) {
        self.lock().compare = Some(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_counter_holds_value() {
        let mut frt = SimFrt::new(1_000_000);
        frt.write(42);
        assert_eq!(frt.read(), 42);
        assert!(frt.until_compare().is_none());
    }

    #[test]
    fn running_counter_advances() {
        let mut frt = SimFrt::new(1_000_000);
        frt.init();
        frt.reset();
        std::thread::sleep(Duration::from_millis(2));
        assert!(frt.read() >= 2_000);
    }

    #[test]
    fn compare_becomes_pending() {
        let mut frt = SimFrt::new(1_000_000);
        frt.init();
        frt.arm_compare(1_000);
        frt.write(1_000);
        assert!(frt.compare_pending());
        assert_eq!(frt.until_compare(), Some(Duration::ZERO));

        frt.write(0);
        let wait = frt.until_compare().unwrap();
        assert!(wait <= Duration::from_millis(1));
    }
}
