//! Software timers driven by a periodic compare-match interrupt.
//!
//! The table itself ([`TimerTable`]) is plain data with `&mut self`
//! operations. [`TimerService`] wraps it in a critical-section mutex so a
//! `static` instance can be shared between the main loop and the interrupt
//! handler.

pub mod handler;
pub mod service;
pub mod table;

pub use handler::{Callbacks, ExpireFn, StepFn, TimerEvent, TimerHandler};
pub use service::TimerService;
pub use table::{TimerDesc, TimerTable};

/// Slot count used by the reference hosts.
pub const MAX_TIMERS: usize = 16;

/// Identifier handed out by [`TimerTable::add`].
///
/// Unique among the currently active timers of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId(pub u32);

impl core::fmt::Display for TimerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Error type for timer table operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Zero interval, or a handler with an unset expiry or step callback.
    InvalidDescriptor,
    /// Every slot is occupied.
    CapacityExhausted,
    /// No active timer carries the requested identifier.
    NotFound,
    /// The table is already borrowed by a dispatch in progress, i.e. the call
    /// came from inside a timer callback.
    Busy,
}

impl core::fmt::Display for TimerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TimerError::InvalidDescriptor => f.write_str("invalid timer descriptor"),
            TimerError::CapacityExhausted => f.write_str("timer table full"),
            TimerError::NotFound => f.write_str("timer not found"),
            TimerError::Busy => f.write_str("timer table busy (called from a timer callback)"),
        }
    }
}

impl core::error::Error for TimerError {}
