//! Debug console tasks
//!
//! RX parses command lines and hands them to the gateway task; TX writes
//! queued lines out in order.

use defmt::*;
use embassy_stm32::mode::Async;
use embassy_stm32::usart::{UartRx, UartTx};
use embassy_time::Timer;

use busmon_hal_stm32f0::uart::UartBusError;
use busmon_protocol::ConsoleParser;

use crate::channels::{CONSOLE_COMMANDS, CONSOLE_OUT};

/// Console RX task - parses commands typed on the debug console
#[embassy_executor::task]
pub async fn console_rx_task(mut rx: UartRx<'static, Async>) {
    info!("Console RX task started");

    let mut parser = ConsoleParser::new();
    let mut buf = [0u8; 1];

    loop {
        match rx.read(&mut buf).await {
            Ok(()) => {
                if let Some(command) = parser.feed(buf[0]) {
                    CONSOLE_COMMANDS.send(command).await;
                }
            }
            Err(e) => {
                warn!("Console read error: {:?}", UartBusError::from(e));
                parser.reset();
                Timer::after_millis(10).await;
            }
        }
    }
}

/// Console TX task - writes queued lines
#[embassy_executor::task]
pub async fn console_tx_task(mut tx: UartTx<'static, Async>) {
    info!("Console TX task started");

    loop {
        let line = CONSOLE_OUT.receive().await;
        if let Err(e) = tx.write(line.as_bytes()).await {
            warn!("Console write error: {:?}", UartBusError::from(e));
        }
    }
}
