//! Program flash access for STM32F0
//!
//! The integrity check reads the running image from the start of flash.
//! STM32F072RB has 128KB flash; reads past the end are rejected.

use embassy_stm32::flash::{Blocking, Error as EmbassyFlashError, Flash};

use busmon_hal::{FlashError, ProgramMemory};

/// Total flash size
pub const FLASH_SIZE: u32 = 128 * 1024;

fn flash_error(e: EmbassyFlashError) -> FlashError {
    match e {
        EmbassyFlashError::Size | EmbassyFlashError::Unaligned => FlashError::OutOfBounds,
        _ => FlashError::Flash,
    }
}

/// Read-only view of the program image
pub struct ImageFlash<'d> {
    flash: Flash<'d, Blocking>,
    len: u32,
}

impl<'d> ImageFlash<'d> {
    /// Expose the first `len` bytes of flash
    pub fn new(flash: Flash<'d, Blocking>, len: u32) -> Self {
        Self {
            flash,
            len: len.min(FLASH_SIZE),
        }
    }
}

impl ProgramMemory for ImageFlash<'_> {
    fn len(&self) -> u32 {
        self.len
    }

    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), FlashError> {
        let end = offset
            .checked_add(buffer.len() as u32)
            .ok_or(FlashError::OutOfBounds)?;
        if end > self.len {
            return Err(FlashError::OutOfBounds);
        }
        self.flash.blocking_read(offset, buffer).map_err(flash_error)
    }
}
