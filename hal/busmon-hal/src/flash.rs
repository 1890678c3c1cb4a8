//! Program memory abstractions
//!
//! The integrity checker sweeps the firmware's own program image and
//! compares its CRC with a value baked in at build time. It only needs
//! sequential read access; nothing is ever written.

/// Errors from program memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Requested range lies outside the readable region
    OutOfBounds,
}

/// Read-only view of the program image
pub trait ProgramMemory {
    /// Number of readable bytes, starting at offset 0
    fn len(&self) -> u32;

    /// Whether the region is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buffer` with the bytes starting at `offset`
    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), FlashError>;
}
