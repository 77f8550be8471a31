//! Compare-match "interrupt" for the PC host.
//!
//! A dedicated thread sleeps until the simulated counter reaches its compare
//! target, then runs the same handler body the firmware runs from its ISR.
//! On the host the critical section is a process-wide lock, so the main
//! thread's add/remove and this thread's dispatch still exclude each other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use frt_core::Pacer;

use crate::frt::SimFrt;
use crate::TIMERS;

/// Poll interval while the compare match is not armed.
const IDLE_POLL: Duration = Duration::from_millis(1);

/// Start the interrupt thread. It runs until `stop` is set.
pub fn spawn(mut frt: SimFrt, pacer: Pacer, stop: Arc<AtomicBool>) -> std::io::Result<JoinHandle<u64>> {
    thread::Builder::new()
        .name("frt-irq".into())
        .spawn(move || {
            let mut ticks: u64 = 0;
            while !stop.load(Ordering::Acquire) {
                match frt.until_compare() {
                    Some(wait) if !wait.is_zero() => thread::sleep(wait),
                    Some(_) => {}
                    None => {
                        thread::sleep(IDLE_POLL);
                        continue;
                    }
                }

                if frt.compare_pending() {
                    let fired = TIMERS.on_compare_match(&pacer, &mut frt);
                    ticks += 1;
                    if fired > 0 {
                        log::trace!("tick {ticks}: {fired} timer(s) expired");
                    }
                }
            }
            log::debug!("interrupt thread stopped after {ticks} ticks");
            ticks
        })
}
