//! Device bus receive task
//!
//! The bus USART receives into a circular DMA buffer, so bytes keep
//! landing while the executor is busy sending an ACK. This task feeds
//! them to the framer and races the next read against the framer's
//! silence deadline. When the deadline wins, the collected bytes become a
//! frame for the gateway task.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_stm32::usart::RingBufferedUartRx;
use embassy_time::Timer;

use busmon_hal_stm32f0::uart::UartBusError;
use busmon_protocol::FramerEvent;

use crate::channels::{FRAMER, FRAME_READY};

/// Circular DMA buffer for the bus receiver
pub const BUS_DMA_BUF_SIZE: usize = 256;

/// Bytes taken from the DMA buffer per read
const RX_BUF_SIZE: usize = 64;

/// Bus RX task - frames the device bus byte stream
#[embassy_executor::task]
pub async fn bus_rx_task(mut rx: RingBufferedUartRx<'static>) {
    info!("Bus RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let deadline = FRAMER.lock(|framer| framer.borrow().timer().deadline());

        let received = match deadline {
            Some(at) => match select(rx.read(&mut buf), Timer::at(at)).await {
                Either::First(result) => Some(result),
                Either::Second(()) => None,
            },
            None => Some(rx.read(&mut buf).await),
        };

        match received {
            Some(Ok(n)) => {
                trace!("Bus RX: {} bytes", n);
                let discarded = FRAMER.lock(|framer| {
                    let mut framer = framer.borrow_mut();
                    buf[..n]
                        .iter()
                        .filter(|&&byte| framer.on_byte(byte) == FramerEvent::Discarded)
                        .count()
                });
                if discarded > 0 {
                    trace!("Frame buffer full, {} bytes dropped", discarded);
                }
            }
            Some(Err(e)) => {
                // The ring buffer restarts after an overrun; the partial
                // frame fails its CRC or length check downstream.
                warn!("Bus read error: {:?}", UartBusError::from(e));
            }
            None => {
                if FRAMER.lock(|framer| framer.borrow_mut().on_deadline()) {
                    FRAME_READY.signal(());
                }
            }
        }
    }
}
