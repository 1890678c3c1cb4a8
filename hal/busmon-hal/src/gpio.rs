//! GPIO pin abstractions
//!
//! Only digital outputs are needed: the board's status LED.

/// Digital output pin
pub trait OutputPin {
    /// Toggle the pin state
    fn toggle(&mut self);
}
