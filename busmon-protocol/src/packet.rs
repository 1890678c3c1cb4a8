//! Device packet encoding and decoding.
//!
//! Frame format:
//! - DEST (1 byte): receiver address, 0 is the monitoring gateway
//! - SRC (1 byte): sender address, 1..=10 for field devices
//! - MSG ID (1 byte): sequence / command identifier
//! - FLAGS (1 byte): bit 0 ack, bit 1 command, bit 2 heartbeat, bits 3..7 reserved
//! - LEN (1 byte): payload length, 0 for the control packets used here
//! - CRC (2 bytes): CRC-16 of all preceding bytes, big-endian
//!
//! MSG ID and FLAGS together form a 16-bit little-endian field: the id is
//! bits 0..8 and the flags are bits 8..16.

use crate::crc::crc16;

/// Address of the monitoring gateway on the bus
pub const MONITORING_DEVICE_ID: u8 = 0;

/// Header size in bytes (everything before the CRC)
pub const HEADER_LEN: usize = 5;

/// CRC trailer size in bytes
pub const CRC_LEN: usize = 2;

/// Size of a control frame: header plus CRC
pub const FRAME_LEN: usize = HEADER_LEN + CRC_LEN;

// Status bits within the upper byte of the message-id field
const FLAG_ACK: u8 = 1 << 0;
const FLAG_COMMAND: u8 = 1 << 1;
const FLAG_HEART: u8 = 1 << 2;
const RESERVED_SHIFT: u8 = 3;
const RESERVED_MASK: u8 = 0x1F;

/// An encoded ACK frame, ready for the wire
pub type AckFrame = [u8; FRAME_LEN];

/// Errors that can occur while decoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Frame is shorter than a header plus CRC
    TooShort,
    /// Frame is addressed to someone other than the gateway
    Unaddressed,
    /// CRC trailer does not match the frame contents
    CrcMismatch {
        /// CRC computed over the received bytes
        computed: u16,
        /// CRC carried in the frame trailer
        received: u16,
    },
}

/// The 16-bit message-id field: an 8-bit id and the status bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageId {
    /// Sequence or command identifier
    pub id: u8,
    /// Packet is an acknowledgement
    pub ack: bool,
    /// Packet carries a counted application message
    pub command: bool,
    /// Packet is a liveness heartbeat
    pub heart: bool,
    /// Unused bits, preserved as received (5 bits)
    pub reserved: u8,
}

impl MessageId {
    /// Unpack from the raw 16-bit field
    pub fn from_bits(bits: u16) -> Self {
        let [id, flags] = bits.to_le_bytes();
        Self {
            id,
            ack: flags & FLAG_ACK != 0,
            command: flags & FLAG_COMMAND != 0,
            heart: flags & FLAG_HEART != 0,
            reserved: (flags >> RESERVED_SHIFT) & RESERVED_MASK,
        }
    }

    /// Pack into the raw 16-bit field
    pub fn to_bits(self) -> u16 {
        u16::from_le_bytes([self.id, self.flags()])
    }

    /// The upper byte: status bits and reserved bits
    fn flags(self) -> u8 {
        let mut flags = (self.reserved & RESERVED_MASK) << RESERVED_SHIFT;
        if self.ack {
            flags |= FLAG_ACK;
        }
        if self.command {
            flags |= FLAG_COMMAND;
        }
        if self.heart {
            flags |= FLAG_HEART;
        }
        flags
    }

    /// Keep the id, drop every status and reserved bit
    pub fn status_cleared(self) -> Self {
        Self::from_bits(self.to_bits() & 0x00FF)
    }
}

/// Fixed-layout packet header exchanged with field devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DevicePacket {
    /// Intended receiver
    pub destination: u8,
    /// Sending device
    pub source: u8,
    /// Id and status bits
    pub message_id: MessageId,
    /// Payload length
    pub len: u8,
}

impl DevicePacket {
    /// Parse the header bytes
    pub fn from_header(header: &[u8; HEADER_LEN]) -> Self {
        Self {
            destination: header[0],
            source: header[1],
            message_id: MessageId::from_bits(u16::from_le_bytes([header[2], header[3]])),
            len: header[4],
        }
    }

    /// Serialize the header bytes
    pub fn header_bytes(&self) -> [u8; HEADER_LEN] {
        let [id, flags] = self.message_id.to_bits().to_le_bytes();
        [self.destination, self.source, id, flags, self.len]
    }

    /// Serialize header and CRC trailer
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let header = self.header_bytes();
        let crc = crc16(&header).to_be_bytes();

        let mut frame = [0u8; FRAME_LEN];
        frame[..HEADER_LEN].copy_from_slice(&header);
        frame[HEADER_LEN..].copy_from_slice(&crc);
        frame
    }

    /// Validate and decode a received frame
    ///
    /// The destination byte is checked first so foreign traffic is dropped
    /// without spending a CRC on it. The CRC covers every byte except the
    /// two-byte trailer; any bytes between the header and the trailer are
    /// covered by the CRC but not interpreted.
    pub fn decode(frame: &[u8]) -> Result<Self, DecodeError> {
        let first = *frame.first().ok_or(DecodeError::TooShort)?;
        if first != MONITORING_DEVICE_ID {
            return Err(DecodeError::Unaddressed);
        }
        if frame.len() < FRAME_LEN {
            return Err(DecodeError::TooShort);
        }

        let (body, trailer) = frame.split_at(frame.len() - CRC_LEN);
        let computed = crc16(body);
        let received = u16::from_be_bytes([trailer[0], trailer[1]]);
        if computed != received {
            return Err(DecodeError::CrcMismatch { computed, received });
        }

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&body[..HEADER_LEN]);
        Ok(Self::from_header(&header))
    }

    /// Whether this is a liveness heartbeat
    pub fn is_heartbeat(&self) -> bool {
        self.message_id.heart
    }

    /// Whether this carries a counted message
    ///
    /// The heartbeat bit takes precedence, so a packet with both bits set
    /// is a heartbeat.
    pub fn is_command(&self) -> bool {
        !self.message_id.heart && self.message_id.command
    }

    /// Build the acknowledgement for this packet
    ///
    /// Addresses are swapped, the status byte is cleared and only the ack
    /// bit set, and the payload length is zeroed.
    pub fn ack(&self) -> Self {
        let mut message_id = self.message_id.status_cleared();
        message_id.ack = true;
        Self {
            destination: self.source,
            source: self.destination,
            message_id,
            len: 0,
        }
    }

    /// Encode the acknowledgement for this packet
    pub fn encode_ack(&self) -> AckFrame {
        self.ack().encode()
    }
}
