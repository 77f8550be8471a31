//! Fixed-capacity timer table.
//!
//! Slots are allocated round-robin: the slot under the cursor is tried
//! first, then the table is scanned from the start for the first free slot.
//! Removing a timer points the cursor at the freed slot so the next add
//! reuses it.

use super::handler::{TimerEvent, TimerHandler};
use super::{TimerError, TimerId};

/// A timer as registered by the caller: interval in ticks plus behavior.
#[derive(Debug, Clone, Copy)]
pub struct TimerDesc<H> {
    /// Ticks until the first expiry. Must be non-zero.
    pub interval: u32,
    pub handler: H,
}

impl<H> TimerDesc<H> {
    pub const fn new(interval: u32, handler: H) -> Self {
        Self { interval, handler }
    }
}

#[derive(Debug)]
struct Slot<H> {
    id: TimerId,
    desc: TimerDesc<H>,
    remaining: u32,
}

/// Table of up to `N` active timers.
#[derive(Debug)]
pub struct TimerTable<H, const N: usize> {
    slots: [Option<Slot<H>>; N],
    /// Slot index tried first by the next add. May equal `N` only when `N == 0`.
    cursor: usize,
    next_id: u32,
}

impl<H, const N: usize> Default for TimerTable<H, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, const N: usize> TimerTable<H, N> {
    /// Empty table. Usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            slots: [const { None }; N],
            cursor: 0,
            next_id: 0,
        }
    }

    /// Drop every timer. Identifiers keep counting from where they were.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.cursor = 0;
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of active timers.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Ticks left before the given timer expires.
    pub fn remaining(&self, id: TimerId) -> Option<u32> {
        self.slot(id).map(|slot| slot.remaining)
    }

    /// Handler of an active timer.
    pub fn handler(&self, id: TimerId) -> Option<&H> {
        self.slot(id).map(|slot| &slot.desc.handler)
    }

    /// Active timers in slot order as `(id, remaining)`.
    pub fn iter(&self) -> impl Iterator<Item = (TimerId, u32)> + '_ {
        self.slots
            .iter()
            .flatten()
            .map(|slot| (slot.id, slot.remaining))
    }

    /// Slot the next add would use, if any.
    pub fn find_free(&self) -> Option<usize> {
        match self.slots.get(self.cursor) {
            Some(None) => Some(self.cursor),
            _ => self.slots.iter().position(Option::is_none),
        }
    }

    /// Slot index holding the active timer `id`.
    pub fn find_by_id(&self, id: TimerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(s) if s.id == id))
    }

    fn slot(&self, id: TimerId) -> Option<&Slot<H>> {
        self.find_by_id(id).and_then(|index| self.slots[index].as_ref())
    }

    /// Next identifier not held by an active timer.
    fn fresh_id(&mut self) -> TimerId {
        loop {
            let id = TimerId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if self.find_by_id(id).is_none() {
                return id;
            }
        }
    }

    /// Remove a timer by identifier and hand its descriptor back.
    pub fn remove(&mut self, id: TimerId) -> Result<TimerDesc<H>, TimerError> {
        let index = self.find_by_id(id).ok_or(TimerError::NotFound)?;
        let slot = self.slots[index].take().ok_or(TimerError::NotFound)?;
        self.cursor = index;
        Ok(slot.desc)
    }
}

impl<H: TimerHandler, const N: usize> TimerTable<H, N> {
    /// Register a timer. Its first expiry happens `desc.interval` ticks from now.
    pub fn add(&mut self, desc: TimerDesc<H>) -> Result<TimerId, TimerError> {
        if desc.interval == 0 || !desc.handler.is_bound() {
            return Err(TimerError::InvalidDescriptor);
        }

        let index = self.find_free().ok_or(TimerError::CapacityExhausted)?;
        let id = self.fresh_id();
        self.slots[index] = Some(Slot {
            id,
            remaining: desc.interval,
            desc,
        });
        self.cursor = (index + 1) % N;

        Ok(id)
    }

    /// Advance every active timer by one tick.
    ///
    /// `step` is the counter drift measured for this tick and is passed
    /// through to the callbacks. Returns how many timers expired.
    pub fn dispatch(&mut self, step: i32) -> usize {
        let mut fired = 0;

        for slot in self.slots.iter_mut() {
            let Some(active) = slot.as_mut() else {
                continue;
            };

            active.remaining = active.remaining.saturating_sub(1);

            let event = TimerEvent {
                id: active.id,
                interval: active.desc.interval,
                remaining: active.remaining,
                step,
            };
            active.desc.handler.on_step(&event);

            if active.remaining != 0 {
                continue;
            }

            fired += 1;
            let next = active.desc.handler.on_expire(&event);
            if next > 0 {
                active.remaining = next;
            } else {
                *slot = None;
            }
        }

        fired
    }
}
