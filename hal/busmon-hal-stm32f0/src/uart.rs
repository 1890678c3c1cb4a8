//! UART driver for STM32F0
//!
//! The device bus transmitter used for ACK frames, plus conversion of the
//! board-agnostic UART configuration to embassy's.

use embassy_stm32::mode::Mode;
use embassy_stm32::usart::{self, Error as UsartError};
use embassy_time::{Duration, Instant};

use busmon_hal::uart::{DataBits, Parity, StopBits, UartConfig};
use busmon_hal::{TxError, UartTx};

/// Error from UART operations
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Framing error
    Framing,
    /// Noise error
    Noise,
    /// Overrun error
    Overrun,
    /// Parity error
    Parity,
    /// Buffer too small
    BufferTooSmall,
    /// Other error
    Other,
}

impl From<UsartError> for UartBusError {
    fn from(e: UsartError) -> Self {
        match e {
            UsartError::Framing => UartBusError::Framing,
            UsartError::Noise => UartBusError::Noise,
            UsartError::Overrun => UartBusError::Overrun,
            UsartError::Parity => UartBusError::Parity,
            UsartError::BufferTooLong => UartBusError::BufferTooSmall,
            _ => UartBusError::Other,
        }
    }
}

impl From<UartBusError> for TxError {
    fn from(_: UartBusError) -> Self {
        TxError::Bus
    }
}

/// Build the embassy USART configuration
pub fn usart_config(config: &UartConfig) -> usart::Config {
    let mut out = usart::Config::default();
    out.baudrate = config.baudrate;
    out.data_bits = match config.data_bits {
        DataBits::Seven => usart::DataBits::DataBits7,
        DataBits::Eight => usart::DataBits::DataBits8,
        DataBits::Nine => usart::DataBits::DataBits9,
    };
    out.parity = match config.parity {
        Parity::None => usart::Parity::ParityNone,
        Parity::Even => usart::Parity::ParityEven,
        Parity::Odd => usart::Parity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        StopBits::One => usart::StopBits::STOP1,
        StopBits::Two => usart::StopBits::STOP2,
    };
    out
}

/// Device bus transmitter
///
/// Writes one byte at a time with the blocking driver and checks the
/// deadline between bytes, so a stalled line costs at most the timeout
/// plus one byte time.
pub struct BusTx<'d, M: Mode> {
    tx: usart::UartTx<'d, M>,
}

impl<'d, M: Mode> BusTx<'d, M> {
    /// Wrap the transmit half of the bus UART
    pub fn new(tx: usart::UartTx<'d, M>) -> Self {
        Self { tx }
    }
}

impl<M: Mode> UartTx for BusTx<'_, M> {
    fn write_timeout(&mut self, data: &[u8], timeout_ms: u32) -> Result<(), TxError> {
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));

        for byte in data {
            if Instant::now() >= deadline {
                return Err(TxError::Timeout);
            }
            self.tx
                .blocking_write(core::slice::from_ref(byte))
                .map_err(UartBusError::from)?;
        }

        self.tx.blocking_flush().map_err(UartBusError::from)?;
        Ok(())
    }
}
