//! Status LED task

use defmt::*;
use embassy_time::{Duration, Ticker};

use busmon_hal::OutputPin;
use busmon_hal_stm32f0::gpio::StatusLed;

/// Blink period
pub const LED_TOGGLE_MS: u64 = 1000;

/// LED task - toggles the status LED while the executor is alive
#[embassy_executor::task]
pub async fn led_task(mut led: StatusLed<'static>) {
    info!("LED task started");

    let mut ticker = Ticker::every(Duration::from_millis(LED_TOGGLE_MS));

    loop {
        ticker.next().await;
        led.toggle();
    }
}
