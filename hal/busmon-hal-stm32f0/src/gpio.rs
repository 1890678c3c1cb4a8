//! GPIO for STM32F0
//!
//! The gateway drives a single status LED.

use embassy_stm32::gpio::Output;

use busmon_hal::OutputPin;

/// Status LED on a push-pull output
pub struct StatusLed<'d> {
    pin: Output<'d>,
}

impl<'d> StatusLed<'d> {
    /// Wrap an already configured output
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl OutputPin for StatusLed<'_> {
    fn toggle(&mut self) {
        self.pin.toggle();
    }
}
