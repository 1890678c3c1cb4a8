//! UART serial communication abstractions
//!
//! The monitoring core only ever transmits synchronously: an ACK frame is
//! pushed out with a bounded timeout and abandoned if the line is not free
//! in time. Reception is interrupt/task driven and lives in the firmware.

/// Errors from a bounded transmit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxError {
    /// The data could not be written before the deadline expired
    Timeout,
    /// The peripheral reported an error
    Bus,
}

/// UART transmitter
pub trait UartTx {
    /// Write all of `data`, giving up after `timeout_ms` milliseconds
    ///
    /// Implementations busy-wait on the peripheral; this is the only place
    /// the processing loop may stall, and never longer than the timeout.
    fn write_timeout(&mut self, data: &[u8], timeout_ms: u32) -> Result<(), TxError>;
}

impl<T: UartTx + ?Sized> UartTx for &mut T {
    fn write_timeout(&mut self, data: &[u8], timeout_ms: u32) -> Result<(), TxError> {
        (**self).write_timeout(data, timeout_ms)
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}
