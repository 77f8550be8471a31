//! Platform-agnostic software timers over a free-running counter.
//!
//! `timer` holds the fixed-capacity timer table and the interrupt-shared
//! service around it, `tick` turns compare-match interrupts into paced ticks,
//! and `bench` is the memory-access benchmark the timers gate.

#![cfg_attr(not(test), no_std)]

pub mod bench;
pub mod tick;
pub mod timer;

pub use tick::{ConfigError, Pacer, TickConfig};
pub use timer::{
    Callbacks, TimerDesc, TimerError, TimerEvent, TimerHandler, TimerId, TimerService,
    TimerTable, MAX_TIMERS,
};
