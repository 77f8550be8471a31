//! Timer table shared between the main loop and the compare-match interrupt.
//!
//! Every access runs inside `critical_section::with`, which masks interrupts
//! on the target and restores the previous mask when the closure returns, on
//! the error paths too. The table sits in a `RefCell` inside the mutex; a
//! hook that calls back into the service while `dispatch` holds the table
//! gets [`TimerError::Busy`] instead of a second mutable borrow.

use core::cell::RefCell;

use critical_section::Mutex;
use frt_hal::TickSource;

use super::handler::TimerHandler;
use super::table::{TimerDesc, TimerTable};
use super::{TimerError, TimerId};
use crate::tick::Pacer;

/// Interrupt-safe wrapper around a [`TimerTable`].
pub struct TimerService<H, const N: usize> {
    table: Mutex<RefCell<TimerTable<H, N>>>,
}

impl<H, const N: usize> Default for TimerService<H, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, const N: usize> TimerService<H, N> {
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(RefCell::new(TimerTable::new())),
        }
    }

    /// Run `f` on the table with interrupts masked.
    pub fn with<R>(&self, f: impl FnOnce(&mut TimerTable<H, N>) -> R) -> Result<R, TimerError> {
        critical_section::with(|cs| {
            let mut table = self
                .table
                .borrow(cs)
                .try_borrow_mut()
                .map_err(|_| TimerError::Busy)?;
            Ok(f(&mut *table))
        })
    }

    /// Clear every slot, then start the counter and arm the compare match.
    pub fn init<T: TickSource>(&self, pacer: &Pacer, source: &mut T) -> Result<(), TimerError> {
        self.with(|table| table.clear())?;
        pacer.start(source);
        log::debug!("timer service started, compare target {}", pacer.target());
        Ok(())
    }

    /// Remove a timer by identifier and hand its descriptor back.
    pub fn remove(&self, id: TimerId) -> Result<TimerDesc<H>, TimerError> {
        let result = self.with(|table| table.remove(id)).and_then(|removed| removed);
        match &result {
            Ok(_) => log::debug!("timer {} removed", id),
            Err(e) => log::warn!("timer {} not removed: {}", id, e),
        }
        result
    }

    /// Number of active timers. Like every query here, fails with
    /// [`TimerError::Busy`] when called from a hook during dispatch.
    pub fn len(&self) -> Result<usize, TimerError> {
        self.with(|table| table.len())
    }

    pub fn is_empty(&self) -> Result<bool, TimerError> {
        self.with(|table| table.is_empty())
    }

    pub fn contains(&self, id: TimerId) -> Result<bool, TimerError> {
        self.with(|table| table.contains(id))
    }

    pub fn remaining(&self, id: TimerId) -> Result<Option<u32>, TimerError> {
        self.with(|table| table.remaining(id))
    }
}

impl<H: TimerHandler, const N: usize> TimerService<H, N> {
    pub fn add(&self, desc: TimerDesc<H>) -> Result<TimerId, TimerError> {
        let result = self.with(|table| table.add(desc)).and_then(|added| added);
        match &result {
            Ok(id) => log::debug!("timer {} added", id),
            Err(e) => log::warn!("timer not added: {}", e),
        }
        result
    }

    /// Advance all timers by one tick. A reentrant call fires nothing.
    pub fn dispatch(&self, step: i32) -> usize {
        self.with(|table| table.dispatch(step)).unwrap_or(0)
    }

    /// Compare-match interrupt body: rearm the counter, then dispatch with the
    /// measured drift. Returns how many timers expired.
    pub fn on_compare_match<T: TickSource>(&self, pacer: &Pacer, source: &mut T) -> usize {
        critical_section::with(|_| {
            let step = pacer.on_compare_match(source);
            self.dispatch(step)
        })
    }
}
