//! Gateway configuration
//!
//! Tunables that the firmware bakes in at build time from `gateway.toml`.
//! The defaults match the production gateway board.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bits per byte on the wire assumed for gap validation (8N1)
const BITS_PER_BYTE: u32 = 10;

/// Minimum frame gap, in byte times
const MIN_GAP_BYTES: u32 = 2;

/// Gateway configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GatewayConfig {
    /// Device bus baud rate
    pub bus_baudrate: u32,
    /// Debug console baud rate
    pub console_baudrate: u32,
    /// Inter-byte silence that ends a frame (µs)
    pub frame_gap_us: u32,
    /// Liveness sweep period (ms)
    pub sweep_period_ms: u32,
    /// Consecutive silent sweeps before a device is declared failed
    pub failure_threshold: u8,
    /// Maximum packets drained from the queue per loop iteration
    pub drain_batch: u8,
    /// ACK transmit timeout (ms)
    pub ack_timeout_ms: u32,
    /// Independent watchdog timeout (ms)
    pub watchdog_timeout_ms: u32,
    /// Size of the program image covered by the integrity check (bytes)
    pub image_size: u32,
    /// Bytes fed to the image CRC per step
    pub image_chunk_size: u16,
    /// Known-good CRC of the program image
    pub expected_image_crc: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bus_baudrate: 115_200,
            console_baudrate: 115_200,
            frame_gap_us: 2_000,
            sweep_period_ms: 100,
            failure_threshold: 28,
            drain_batch: 5,
            ack_timeout_ms: 100,
            watchdog_timeout_ms: 1_000,
            image_size: 0x7000,
            image_chunk_size: 32,
            expected_image_crc: 0x9401,
        }
    }
}

impl GatewayConfig {
    /// Time to transmit one byte on the device bus (µs, rounded up)
    pub const fn bus_byte_time_us(&self) -> u32 {
        if self.bus_baudrate == 0 {
            return 0;
        }
        (BITS_PER_BYTE * 1_000_000).div_ceil(self.bus_baudrate)
    }

    /// Effective frame gap (µs)
    ///
    /// The gap must leave room for at least two byte times, otherwise the
    /// framer would split frames between consecutive bytes. A shorter
    /// configured gap is raised to that minimum.
    pub const fn frame_gap_us(&self) -> u32 {
        let min_gap = MIN_GAP_BYTES * self.bus_byte_time_us();
        if self.frame_gap_us < min_gap {
            min_gap
        } else {
            self.frame_gap_us
        }
    }

    /// Time after which a silent device is declared failed (ms)
    pub const fn failure_timeout_ms(&self) -> u32 {
        self.sweep_period_ms * self.failure_threshold as u32
    }
}
