#![no_std]

/// Abstracts a free-running hardware counter with one compare-match output.
///
/// The counter runs continuously once initialized. When it reaches the armed
/// compare target the platform raises an interrupt, and the interrupt handler
/// is expected to call back into the timer service. How the handler is bound
/// to the interrupt vector is platform-specific and not part of this trait.
pub trait TickSource {
    /// Configure the counter clock and interrupt priority and start counting.
    fn init(&mut self);

    /// Current counter value.
    fn read(&self) -> u32;

    /// Overwrite the counter value.
    fn write(&mut self, count: u32);

    /// Reset the counter to zero.
    fn reset(&mut self) {
        self.write(0);
    }

    /// Set the compare-match target and enable its interrupt.
    fn arm_compare(&mut self, target: u32);

    /// Clear a pending compare-match flag. Called once per handled match.
    fn acknowledge(&mut self) {}

    /// Largest value the counter can hold before wrapping.
    fn max_count(&self) -> u32 {
        u32::MAX
    }
}
