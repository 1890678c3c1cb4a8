//! Program image integrity check
//!
//! Sweeps the program image in fixed-size chunks through one running CRC
//! and compares the result with the known-good value baked in at build
//! time. The same checker serves the one-time check at boot
//! ([`ImageChecker::check_all`]) and an optional background check that
//! advances one chunk per call ([`ImageChecker::step`]).

use busmon_hal::{FlashError, ProgramMemory};
use busmon_protocol::Crc16Digest;

/// Largest chunk read per step
pub const MAX_CHUNK_SIZE: usize = 64;

/// Default chunk size
pub const DEFAULT_CHUNK_SIZE: usize = 32;

/// Integrity check errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegrityError {
    /// Reading the image failed
    Flash(FlashError),
    /// Nothing to check
    EmptyImage,
}

impl From<FlashError> for IntegrityError {
    fn from(err: FlashError) -> Self {
        IntegrityError::Flash(err)
    }
}

/// Outcome of one full pass over the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntegrityReport {
    /// CRC computed over the image
    pub computed: u16,
    /// Known-good CRC
    pub expected: u16,
}

impl IntegrityReport {
    /// Whether the image matches
    pub fn is_valid(&self) -> bool {
        self.computed == self.expected
    }
}

/// Chunked CRC sweep over program memory
pub struct ImageChecker<M> {
    memory: M,
    image_len: u32,
    chunk_size: usize,
    expected: u16,
    offset: u32,
    digest: Crc16Digest,
}

impl<M: ProgramMemory> ImageChecker<M> {
    /// Create a checker over the first `image_len` bytes of `memory`
    ///
    /// The length is clamped to the readable region and the chunk size to
    /// `1..=MAX_CHUNK_SIZE`.
    pub fn new(memory: M, image_len: u32, chunk_size: usize, expected: u16) -> Self {
        let image_len = image_len.min(memory.len());
        Self {
            memory,
            image_len,
            chunk_size: chunk_size.clamp(1, MAX_CHUNK_SIZE),
            expected,
            offset: 0,
            digest: Crc16Digest::new(),
        }
    }

    /// Bytes covered by the check
    pub fn image_len(&self) -> u32 {
        self.image_len
    }

    /// Offset of the next chunk in the current pass
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Discard the current pass and start again from the image start
    pub fn restart(&mut self) {
        self.offset = 0;
        self.digest = Crc16Digest::new();
    }

    /// Feed the next chunk into the running CRC
    ///
    /// Returns a report when this call completed a pass; the next call
    /// starts a new pass. A read error abandons the current pass.
    pub fn step(&mut self) -> Result<Option<IntegrityReport>, IntegrityError> {
        if self.image_len == 0 {
            return Err(IntegrityError::EmptyImage);
        }

        let remaining = (self.image_len - self.offset) as usize;
        let len = remaining.min(self.chunk_size);
        let mut chunk = [0u8; MAX_CHUNK_SIZE];

        if let Err(err) = self.memory.read(self.offset, &mut chunk[..len]) {
            self.restart();
            return Err(err.into());
        }
        self.digest.update(&chunk[..len]);
        self.offset += len as u32;

        if self.offset < self.image_len {
            return Ok(None);
        }

        let digest = core::mem::take(&mut self.digest);
        self.offset = 0;
        Ok(Some(IntegrityReport {
            computed: digest.finalize(),
            expected: self.expected,
        }))
    }

    /// Run a complete pass from the image start
    pub fn check_all(&mut self) -> Result<IntegrityReport, IntegrityError> {
        self.restart();
        loop {
            if let Some(report) = self.step()? {
                return Ok(report);
            }
        }
    }
}
