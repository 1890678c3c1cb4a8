//! CRC-16 used on the device bus and for the program image check
//!
//! Parameters: width 16, polynomial 0x8005, initial value 0xFFFF, input and
//! output reflected, no final XOR. This is the catalogued CRC-16/MODBUS and
//! matches the STM32 CRC unit configured with byte-wise input inversion and
//! output inversion.

use ::crc::{Crc, Digest, CRC_16_MODBUS};

/// Shared CRC engine
///
/// A `static` so running digests can borrow it for `'static`.
static CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Compute the CRC of one buffer
///
/// Each call starts from the initial value; nothing carries over between
/// packets.
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Running CRC over data that arrives in chunks
pub struct Crc16Digest {
    digest: Digest<'static, u16>,
}

impl Default for Crc16Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc16Digest {
    /// Start a new digest from the initial value
    pub fn new() -> Self {
        Self {
            digest: CRC16.digest(),
        }
    }

    /// Feed more bytes
    pub fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Finish and return the CRC
    pub fn finalize(self) -> u16 {
        self.digest.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        // Catalogue check value for CRC-16/MODBUS
        assert_eq!(crc16(b"123456789"), 0x4B37);
    }

    #[test]
    fn test_empty_input_is_init_value() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn test_digest_matches_one_shot() {
        let data = b"monitoring gateway program image";
        let mut digest = Crc16Digest::new();
        for chunk in data.chunks(5) {
            digest.update(chunk);
        }
        assert_eq!(digest.finalize(), crc16(data));
    }

    #[test]
    fn test_no_state_between_calls() {
        let first = crc16(&[0x00, 0x01, 0x10, 0x02, 0x00]);
        let _ = crc16(&[0xDE, 0xAD]);
        assert_eq!(crc16(&[0x00, 0x01, 0x10, 0x02, 0x00]), first);
    }
}
