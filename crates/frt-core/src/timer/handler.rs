//! Timer callbacks: the per-tick step hook and the expiry hook.

use super::TimerId;

/// Snapshot handed to both callbacks of a timer on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerEvent {
    /// Identifier of the slot being serviced.
    pub id: TimerId,
    /// Nominal interval from the descriptor. This is also what a periodic
    /// expiry handler normally returns.
    pub interval: u32,
    /// Ticks left before expiry, after this tick's decrement.
    pub remaining: u32,
    /// Counter drift at this tick: actual minus ideal compare value.
    pub step: i32,
}

/// Behavior attached to a timer.
///
/// Both hooks run inside the compare-match interrupt with the timer table
/// locked, so they must be short and must not block. Calling back into the
/// owning [`TimerService`](super::TimerService) from a hook fails with
/// [`TimerError::Busy`](super::TimerError::Busy).
pub trait TimerHandler {
    /// Called on every tick the timer is active, before any expiry.
    fn on_step(&mut self, event: &TimerEvent);

    /// Called when the countdown reaches zero. Returns the next interval in
    /// ticks; 0 frees the slot.
    fn on_expire(&mut self, event: &TimerEvent) -> u32;

    /// False when a required hook is missing. Unbound handlers are rejected
    /// at add time.
    fn is_bound(&self) -> bool {
        true
    }
}

pub type StepFn<D> = fn(&TimerEvent, &mut D);
pub type ExpireFn<D> = fn(&TimerEvent, &mut D) -> u32;

/// Function-pointer handler with user data.
///
/// Either pointer may be left `None`; such a handler reports itself unbound
/// and the table refuses it.
#[derive(Debug, Clone, Copy)]
pub struct Callbacks<D> {
    pub on_expire: Option<ExpireFn<D>>,
    pub on_step: Option<StepFn<D>>,
    pub data: D,
}

impl<D> Callbacks<D> {
    pub const fn new(on_expire: ExpireFn<D>, on_step: StepFn<D>, data: D) -> Self {
        Self {
            on_expire: Some(on_expire),
            on_step: Some(on_step),
            data,
        }
    }
}

impl<D> TimerHandler for Callbacks<D> {
    fn on_step(&mut self, event: &TimerEvent) {
        if let Some(step) = self.on_step {
            step(event, &mut self.data);
        }
    }

    fn on_expire(&mut self, event: &TimerEvent) -> u32 {
        match self.on_expire {
            Some(expire) => expire(event, &mut self.data),
            None => 0,
        }
    }

    fn is_bound(&self) -> bool {
        self.on_expire.is_some() && self.on_step.is_some()
    }
}

/// No-op step hook.
pub fn ignore_step<D>(_event: &TimerEvent, _data: &mut D) {}

/// Expiry hook that keeps the timer periodic at its nominal interval.
pub fn repeat<D>(event: &TimerEvent, _data: &mut D) -> u32 {
    event.interval
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_expiry(_event: &TimerEvent, hits: &mut u32) -> u32 {
        *hits += 1;
        0
    }

    #[test]
    fn missing_hooks_are_unbound() {
        let full = Callbacks::new(count_expiry, ignore_step, 0u32);
        assert!(full.is_bound());

        let no_step = Callbacks { on_step: None, ..full };
        assert!(!no_step.is_bound());

        let no_expire = Callbacks { on_expire: None, ..full };
        assert!(!no_expire.is_bound());
    }

    #[test]
    fn expiry_sees_user_data() {
        let mut cb = Callbacks::new(count_expiry, ignore_step, 0u32);
        let event = TimerEvent {
            id: TimerId(3),
            interval: 5,
            remaining: 0,
            step: 0,
        };
        assert_eq!(cb.on_expire(&event), 0);
        assert_eq!(cb.on_expire(&event), 0);
        assert_eq!(cb.data, 2);
    }

    #[test]
    fn repeat_returns_nominal_interval() {
        let event = TimerEvent {
            id: TimerId(0),
            interval: 7,
            remaining: 0,
            step: -2,
        };
        assert_eq!(repeat(&event, &mut ()), 7);
    }
}
