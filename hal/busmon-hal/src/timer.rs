//! One-shot deadline timer abstraction
//!
//! The byte-stream framer detects the end of a frame by a silence gap. It
//! arms a deadline on the first byte and pushes it out on every following
//! byte; expiry is delivered to the framer as a separate event.

/// A one-shot timer with a fixed, preconfigured period
pub trait DeadlineTimer {
    /// Arm the timer for one period starting now
    fn start(&mut self);

    /// Restart the running period without changing its duration
    fn reload(&mut self);

    /// Disarm the timer
    fn stop(&mut self);

    /// Whether the timer is currently armed
    fn is_armed(&self) -> bool;
}
