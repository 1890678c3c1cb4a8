//! Independent watchdog
//!
//! Runs from the LSI clock. Once started it cannot be stopped; the
//! gateway loop must refresh it within the timeout.

use embassy_stm32::peripherals::IWDG;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_stm32::Peri;

use busmon_hal::Watchdog;

/// Independent watchdog wrapper
pub struct Iwdg<'d> {
    wdg: IndependentWatchdog<'d, IWDG>,
    timeout_ms: u32,
}

impl<'d> Iwdg<'d> {
    /// Configure the watchdog; it does not run until [`start`](Self::start)
    pub fn new(iwdg: Peri<'d, IWDG>, timeout_ms: u32) -> Self {
        Self {
            wdg: IndependentWatchdog::new(iwdg, timeout_ms.saturating_mul(1_000)),
            timeout_ms,
        }
    }

    /// Start counting down
    pub fn start(&mut self) {
        self.wdg.unleash();
    }

    /// Configured timeout
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}

impl Watchdog for Iwdg<'_> {
    fn refresh(&mut self) {
        self.wdg.pet();
    }
}
