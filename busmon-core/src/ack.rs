//! Acknowledgement transmission
//!
//! Every CRC-valid packet addressed to the gateway is acknowledged on the
//! bus it arrived on. A transmit that does not complete within the timeout
//! is abandoned; devices retransmit when they miss an ACK.

use busmon_hal::{TxError, UartTx};
use busmon_protocol::{AckFrame, DevicePacket};

/// Default ACK transmit timeout (ms)
pub const DEFAULT_ACK_TIMEOUT_MS: u32 = 100;

/// Sends ACK frames on the device bus
#[derive(Debug)]
pub struct AckResponder<U> {
    uart: U,
    timeout_ms: u32,
}

impl<U: UartTx> AckResponder<U> {
    /// Create a responder transmitting on `uart`
    pub fn new(uart: U, timeout_ms: u32) -> Self {
        Self { uart, timeout_ms }
    }

    /// Acknowledge `packet`
    ///
    /// Returns the frame that was sent, or the transmit error.
    pub fn respond(&mut self, packet: &DevicePacket) -> Result<AckFrame, TxError> {
        let frame = packet.encode_ack();
        self.uart.write_timeout(&frame, self.timeout_ms)?;
        Ok(frame)
    }

    /// Access the underlying transmitter
    pub fn uart(&self) -> &U {
        &self.uart
    }

    /// Release the underlying transmitter
    pub fn into_inner(self) -> U {
        self.uart
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use busmon_protocol::crc16;
    use std::vec::Vec;

    /// UART that records every write and can be told to time out
    #[derive(Debug, Default)]
    pub struct RecordingUart {
        pub frames: Vec<Vec<u8>>,
        pub timeouts: Vec<u32>,
        pub fail_with: Option<TxError>,
    }

    impl UartTx for RecordingUart {
        fn write_timeout(&mut self, data: &[u8], timeout_ms: u32) -> Result<(), TxError> {
            self.timeouts.push(timeout_ms);
            if let Some(err) = self.fail_with {
                return Err(err);
            }
            self.frames.push(data.to_vec());
            Ok(())
        }
    }

    fn command_from(source: u8, id: u8) -> DevicePacket {
        let mut packet = DevicePacket {
            source,
            len: 3,
            ..Default::default()
        };
        packet.message_id.id = id;
        packet.message_id.command = true;
        packet
    }

    #[test]
    fn test_ack_sent_with_timeout() {
        let mut responder = AckResponder::new(RecordingUart::default(), DEFAULT_ACK_TIMEOUT_MS);
        let frame = responder.respond(&command_from(4, 0x22)).unwrap();

        let header = [0x04, 0x00, 0x22, 0x01, 0x00];
        assert_eq!(&frame[..5], &header);
        assert_eq!(&frame[5..], &crc16(&header).to_be_bytes());

        let uart = responder.into_inner();
        assert_eq!(uart.frames, [frame.to_vec()]);
        assert_eq!(uart.timeouts, [DEFAULT_ACK_TIMEOUT_MS]);
    }

    #[test]
    fn test_timeout_abandons_ack() {
        let uart = RecordingUart {
            fail_with: Some(TxError::Timeout),
            ..Default::default()
        };
        let mut responder = AckResponder::new(uart, 25);
        assert_eq!(
            responder.respond(&command_from(1, 0)),
            Err(TxError::Timeout)
        );

        // Exactly one attempt, no retry
        assert_eq!(responder.uart().timeouts, [25]);
        assert!(responder.uart().frames.is_empty());
    }
}
