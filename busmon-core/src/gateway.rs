//! Monitoring gateway context
//!
//! Owns all monitoring state: the inbound queue, the device registry, the
//! ACK responder and diagnostic counters. The firmware drives it from a
//! single task:
//!
//! 1. [`Gateway::handle_frame`] for every frame the framer produces
//! 2. [`Gateway::drain`] once per loop iteration
//! 3. [`Gateway::sweep`] every sweep period

use heapless::Vec;

use busmon_hal::{TxError, UartTx};
use busmon_protocol::{AckFrame, DecodeError, DevicePacket};

use crate::ack::AckResponder;
use crate::config::GatewayConfig;
use crate::queue::PacketQueue;
use crate::registry::{DeviceRegistry, RecordOutcome, MAX_DEVICES};

/// Diagnostic frame counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    /// Frames that passed validation
    pub accepted: u32,
    /// Frames dropped for a bad CRC
    pub crc_errors: u32,
    /// Frames addressed to another node
    pub foreign: u32,
    /// Frames too short to hold a header and CRC
    pub too_short: u32,
    /// ACKs abandoned after a transmit error or timeout
    pub ack_timeouts: u32,
    /// Queued packets lost to the overwrite-oldest policy
    pub overwritten: u32,
}

fn bump(counter: &mut u32) {
    *counter = counter.wrapping_add(1);
}

/// A frame that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcceptedFrame {
    /// Decoded packet, now queued
    pub packet: DevicePacket,
    /// ACK sent back, or why it was abandoned
    pub ack: Result<AckFrame, TxError>,
    /// Queueing it evicted the oldest unread packet
    pub evicted: bool,
}

/// Totals of one drain pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrainSummary {
    /// Packets taken from the queue
    pub processed: usize,
    /// Heartbeats among them
    pub heartbeats: usize,
    /// Counted command packets among them
    pub counted: usize,
}

/// Monitoring state plus the bus transmitter used for ACKs
#[derive(Debug)]
pub struct Gateway<U> {
    queue: PacketQueue,
    registry: DeviceRegistry,
    responder: AckResponder<U>,
    stats: FrameStats,
    drain_batch: usize,
}

impl<U: UartTx> Gateway<U> {
    /// Create a gateway transmitting ACKs on `uart`
    pub fn new(uart: U, config: &GatewayConfig) -> Self {
        Self {
            queue: PacketQueue::new(),
            registry: DeviceRegistry::new(config.failure_threshold),
            responder: AckResponder::new(uart, config.ack_timeout_ms),
            stats: FrameStats::default(),
            drain_batch: usize::from(config.drain_batch.max(1)),
        }
    }

    /// Validate a received frame, queue it and acknowledge it
    ///
    /// Rejected frames never reach the queue and are never acknowledged.
    /// A failed ACK is not retried.
    pub fn handle_frame(&mut self, frame: &[u8]) -> Result<AcceptedFrame, DecodeError> {
        let packet = DevicePacket::decode(frame).inspect_err(|err| match err {
            DecodeError::TooShort => bump(&mut self.stats.too_short),
            DecodeError::Unaddressed => bump(&mut self.stats.foreign),
            DecodeError::CrcMismatch { .. } => bump(&mut self.stats.crc_errors),
        })?;
        bump(&mut self.stats.accepted);

        let evicted = self.queue.enqueue(packet);
        if evicted {
            bump(&mut self.stats.overwritten);
        }

        let ack = self.responder.respond(&packet);
        if ack.is_err() {
            bump(&mut self.stats.ack_timeouts);
        }

        Ok(AcceptedFrame {
            packet,
            ack,
            evicted,
        })
    }

    /// Apply up to one batch of queued packets to the registry
    pub fn drain(&mut self) -> DrainSummary {
        let mut summary = DrainSummary::default();

        while summary.processed < self.drain_batch {
            let Some(packet) = self.queue.dequeue() else {
                break;
            };
            summary.processed += 1;
            match self.registry.record(&packet) {
                RecordOutcome::Heartbeat => summary.heartbeats += 1,
                RecordOutcome::Counted => summary.counted += 1,
                RecordOutcome::Ignored | RecordOutcome::UnknownSource => {}
            }
        }

        summary
    }

    /// Run the periodic liveness sweep
    ///
    /// Returns the devices that were declared failed by this sweep.
    pub fn sweep(&mut self) -> Vec<u8, MAX_DEVICES> {
        self.registry.sweep()
    }

    /// Device statistics
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Diagnostic counters
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Packets waiting to be drained
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Bus transmitter
    pub fn uart(&self) -> &U {
        self.responder.uart()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ack::tests::RecordingUart;
    use busmon_protocol::crc16;
    use std::vec::Vec as StdVec;

    fn gateway() -> Gateway<RecordingUart> {
        Gateway::new(RecordingUart::default(), &GatewayConfig::default())
    }

    fn frame(header: [u8; 5]) -> StdVec<u8> {
        let mut frame = header.to_vec();
        frame.extend_from_slice(&crc16(&header).to_be_bytes());
        frame
    }

    fn command_frame(source: u8, id: u8) -> StdVec<u8> {
        frame([0x00, source, id, 0x02, 0x00])
    }

    fn heartbeat_frame(source: u8) -> StdVec<u8> {
        frame([0x00, source, 0x00, 0x04, 0x00])
    }

    #[test]
    fn test_happy_path() {
        let mut gw = gateway();
        let accepted = gw.handle_frame(&command_frame(1, 0x10)).unwrap();
        assert!(accepted.packet.is_command());
        assert!(!accepted.evicted);

        // ACK goes out immediately, before the packet is drained
        let ack = frame([0x01, 0x00, 0x10, 0x01, 0x00]);
        assert_eq!(accepted.ack.unwrap().as_slice(), ack.as_slice());
        assert_eq!(gw.uart().frames, [ack]);
        assert_eq!(gw.uart().timeouts, [100]);

        assert_eq!(gw.registry().total_messages(), 0);
        let summary = gw.drain();
        assert_eq!(summary.counted, 1);
        assert_eq!(gw.registry().device_messages(1), 1);
        assert_eq!(gw.registry().total_messages(), 1);
        assert_eq!(gw.stats().accepted, 1);
    }

    #[test]
    fn test_wrong_address_dropped() {
        let mut gw = gateway();
        let mut foreign = command_frame(1, 0x10);
        foreign[0] = 0x03;

        assert_eq!(gw.handle_frame(&foreign), Err(DecodeError::Unaddressed));
        assert_eq!(gw.pending(), 0);
        assert!(gw.uart().frames.is_empty());
        assert_eq!(gw.stats().foreign, 1);
    }

    #[test]
    fn test_bad_crc_dropped() {
        let mut gw = gateway();
        let mut corrupt = command_frame(2, 0x01);
        corrupt[2] ^= 0x40;

        assert!(matches!(
            gw.handle_frame(&corrupt),
            Err(DecodeError::CrcMismatch { .. })
        ));
        assert_eq!(gw.pending(), 0);
        assert!(gw.uart().frames.is_empty());
        assert_eq!(gw.stats().crc_errors, 1);
    }

    #[test]
    fn test_short_frame_counted() {
        let mut gw = gateway();
        assert_eq!(gw.handle_frame(&[0x00, 0x01]), Err(DecodeError::TooShort));
        assert_eq!(gw.stats().too_short, 1);
    }

    #[test]
    fn test_six_byte_frame_rejected() {
        // Header without the 16-bit message-id field
        let header = [0x00, 0x01, 0x10, 0x00];
        let mut six = header.to_vec();
        six.extend_from_slice(&crc16(&header).to_be_bytes());
        assert_eq!(six.len(), 6);

        assert_eq!(gw_reject(&six), DecodeError::TooShort);
    }

    fn gw_reject(frame: &[u8]) -> DecodeError {
        let mut gw = gateway();
        let err = gw.handle_frame(frame).unwrap_err();
        assert_eq!(gw.pending(), 0);
        assert!(gw.uart().frames.is_empty());
        err
    }

    #[test]
    fn test_stats_wrap_instead_of_overflowing() {
        let mut gw = gateway();
        gw.stats.foreign = u32::MAX;
        gw.stats.accepted = u32::MAX;

        let mut foreign = command_frame(1, 0x10);
        foreign[0] = 0x05;
        assert_eq!(gw.handle_frame(&foreign), Err(DecodeError::Unaddressed));
        assert_eq!(gw.stats().foreign, 0);

        gw.handle_frame(&command_frame(1, 0x11)).unwrap();
        assert_eq!(gw.stats().accepted, 0);
    }

    #[test]
    fn test_drain_batching() {
        let mut gw = gateway();
        for id in 0..8 {
            gw.handle_frame(&command_frame(1, id)).unwrap();
        }
        assert_eq!(gw.pending(), 8);

        assert_eq!(gw.drain().processed, 5);
        assert_eq!(gw.pending(), 3);
        assert_eq!(gw.drain().processed, 3);
        assert_eq!(gw.pending(), 0);
        assert_eq!(gw.drain(), DrainSummary::default());
        assert_eq!(gw.registry().device_messages(1), 8);
    }

    #[test]
    fn test_ack_failure_still_queues() {
        let uart = RecordingUart {
            fail_with: Some(TxError::Timeout),
            ..Default::default()
        };
        let mut gw = Gateway::new(uart, &GatewayConfig::default());

        let accepted = gw.handle_frame(&command_frame(5, 1)).unwrap();
        assert_eq!(accepted.ack, Err(TxError::Timeout));
        assert_eq!(gw.pending(), 1);
        assert_eq!(gw.stats().ack_timeouts, 1);
    }

    #[test]
    fn test_unknown_source_acked_not_counted() {
        let mut gw = gateway();
        gw.handle_frame(&command_frame(42, 1)).unwrap();
        assert_eq!(gw.uart().frames.len(), 1);

        gw.drain();
        assert_eq!(gw.registry().total_messages(), 0);
    }

    #[test]
    fn test_overload_evicts_oldest() {
        let mut gw = gateway();
        for id in 0..25 {
            gw.handle_frame(&command_frame(1, id)).unwrap();
        }
        assert_eq!(gw.pending(), 19);
        assert_eq!(gw.stats().overwritten, 6);
    }

    #[test]
    fn test_liveness_through_gateway() {
        let mut gw = gateway();
        let threshold = GatewayConfig::default().failure_threshold;

        // Heartbeat every 50 ms for a while: two per sweep
        for _ in 0..40 {
            gw.handle_frame(&heartbeat_frame(6)).unwrap();
            gw.handle_frame(&heartbeat_frame(6)).unwrap();
            gw.drain();
            assert!(!gw.sweep().contains(&6));
        }

        // Then 2.8 s of silence
        let mut notifications = 0;
        for _ in 0..(threshold as usize * 2) {
            gw.drain();
            if gw.sweep().contains(&6) {
                notifications += 1;
            }
        }
        assert_eq!(notifications, 1);

        gw.handle_frame(&heartbeat_frame(6)).unwrap();
        gw.drain();
        gw.sweep();
        assert_eq!(gw.registry().device(6).unwrap().failure_count, 0);
    }
}
