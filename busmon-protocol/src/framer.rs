//! Silence-gap framing for the device bus
//!
//! The bus protocol has no delimiter or length prefix. Bytes are collected
//! as they arrive; the first byte of a frame arms a one-shot deadline and
//! every further byte restarts it. When the line has been quiet for the
//! whole deadline, the collected bytes are snapshotted as one frame.
//!
//! The accumulation buffer is only cleared once the consumer has finished
//! with the snapshot (see [`Framer::finish_frame`]), never by the deadline
//! itself.

use heapless::Vec;

use busmon_hal::DeadlineTimer;

/// Maximum number of bytes accepted into one frame
pub const MAX_FRAME_SIZE: usize = 100;

/// A frame as captured from the wire
pub type RawFrame = Vec<u8, MAX_FRAME_SIZE>;

/// Outcome of feeding one byte to the framer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramerEvent {
    /// First byte of a frame; the deadline was armed
    FrameStarted,
    /// Byte appended; the deadline was restarted
    ByteAppended,
    /// Buffer already full; the byte was dropped
    Discarded,
}

/// Byte-stream framer driven by byte arrival and deadline expiry
#[derive(Debug)]
pub struct Framer<T> {
    timer: T,
    /// Bytes received since the last frame was consumed
    accumulator: RawFrame,
    /// Snapshot taken at the last deadline, waiting for the consumer
    incoming: RawFrame,
    /// Snapshot present and not yet taken
    ready: bool,
}

impl<T: DeadlineTimer> Framer<T> {
    /// Create a framer using the given deadline timer
    ///
    /// The timer must already be configured with the inter-byte gap.
    pub const fn new(timer: T) -> Self {
        Self {
            timer,
            accumulator: Vec::new(),
            incoming: Vec::new(),
            ready: false,
        }
    }

    /// Access the deadline timer
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Number of bytes accumulated so far
    pub fn pending_len(&self) -> usize {
        self.accumulator.len()
    }

    /// Whether a snapshot is waiting to be taken
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Feed one received byte
    ///
    /// Constant time and never blocks; callable from an interrupt handler.
    pub fn on_byte(&mut self, byte: u8) -> FramerEvent {
        if self.accumulator.push(byte).is_err() {
            return FramerEvent::Discarded;
        }

        if self.accumulator.len() == 1 {
            self.timer.start();
            FramerEvent::FrameStarted
        } else {
            self.timer.reload();
            FramerEvent::ByteAppended
        }
    }

    /// Handle expiry of the inter-byte deadline
    ///
    /// Copies the accumulated bytes into the incoming slot and returns
    /// `true` if a frame is now ready. An expiry with nothing accumulated
    /// is a no-op.
    pub fn on_deadline(&mut self) -> bool {
        self.timer.stop();

        if self.accumulator.is_empty() {
            return false;
        }

        self.incoming.clear();
        // Both buffers share the same capacity
        let _ = self.incoming.extend_from_slice(&self.accumulator);
        self.ready = true;
        true
    }

    /// Take the pending snapshot, if any
    ///
    /// The accumulation buffer keeps its contents until
    /// [`finish_frame`](Self::finish_frame) is called.
    pub fn take_frame(&mut self) -> Option<RawFrame> {
        if !self.ready {
            return None;
        }
        self.ready = false;
        Some(self.incoming.clone())
    }

    /// Release the accumulation buffer after the snapshot was processed
    pub fn finish_frame(&mut self) {
        self.accumulator.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct MockTimer {
        armed: bool,
        starts: u32,
        reloads: u32,
    }

    impl DeadlineTimer for MockTimer {
        fn start(&mut self) {
            self.armed = true;
            self.starts += 1;
        }

        fn reload(&mut self) {
            self.armed = true;
            self.reloads += 1;
        }

        fn stop(&mut self) {
            self.armed = false;
        }

        fn is_armed(&self) -> bool {
            self.armed
        }
    }

    fn feed(framer: &mut Framer<MockTimer>, bytes: &[u8]) {
        for &byte in bytes {
            framer.on_byte(byte);
        }
    }

    #[test]
    fn test_first_byte_starts_timer() {
        let mut framer = Framer::new(MockTimer::default());
        assert_eq!(framer.on_byte(0x00), FramerEvent::FrameStarted);
        assert_eq!(framer.on_byte(0x01), FramerEvent::ByteAppended);
        assert_eq!(framer.on_byte(0x02), FramerEvent::ByteAppended);

        assert!(framer.timer().is_armed());
        assert_eq!(framer.timer().starts, 1);
        assert_eq!(framer.timer().reloads, 2);
    }

    #[test]
    fn test_deadline_snapshots_frame() {
        let mut framer = Framer::new(MockTimer::default());
        feed(&mut framer, &[0x00, 0x01, 0x10, 0x02, 0x00]);

        assert!(framer.on_deadline());
        assert!(!framer.timer().is_armed());

        let frame = framer.take_frame().unwrap();
        assert_eq!(frame.as_slice(), &[0x00, 0x01, 0x10, 0x02, 0x00]);
        assert!(framer.take_frame().is_none());
    }

    #[test]
    fn test_deadline_on_empty_buffer_is_noop() {
        let mut framer = Framer::new(MockTimer::default());
        assert!(!framer.on_deadline());
        assert!(!framer.is_ready());
        assert!(framer.take_frame().is_none());
    }

    #[test]
    fn test_accumulator_kept_until_finished() {
        let mut framer = Framer::new(MockTimer::default());
        feed(&mut framer, &[0x00, 0x01]);
        framer.on_deadline();

        let _ = framer.take_frame();
        assert_eq!(framer.pending_len(), 2);

        framer.finish_frame();
        assert_eq!(framer.pending_len(), 0);

        // Next byte opens a new frame and re-arms the deadline
        assert_eq!(framer.on_byte(0x00), FramerEvent::FrameStarted);
        assert_eq!(framer.timer().starts, 2);
    }

    #[test]
    fn test_overflow_discards_bytes() {
        let mut framer = Framer::new(MockTimer::default());
        for i in 0..MAX_FRAME_SIZE {
            assert_ne!(framer.on_byte(i as u8), FramerEvent::Discarded);
        }
        assert_eq!(framer.on_byte(0xFF), FramerEvent::Discarded);
        assert_eq!(framer.pending_len(), MAX_FRAME_SIZE);

        framer.on_deadline();
        let frame = framer.take_frame().unwrap();
        assert_eq!(frame.len(), MAX_FRAME_SIZE);
        assert_eq!(frame[MAX_FRAME_SIZE - 1], (MAX_FRAME_SIZE - 1) as u8);
    }

    #[test]
    fn test_deadline_after_finish_is_noop() {
        let mut framer = Framer::new(MockTimer::default());
        feed(&mut framer, &[0x00, 0x01, 0x02]);
        framer.on_deadline();
        let _ = framer.take_frame();

        // A byte sneaks in before processing completes, then is released
        framer.on_byte(0x00);
        framer.finish_frame();

        assert!(!framer.on_deadline());
    }

    #[test]
    fn test_buffered_bursts_stay_separate() {
        let first = [0x00, 0x01, 0x10, 0x02, 0x00, 0xAA, 0xBB];
        let second = [0x00, 0x02, 0x11, 0x02, 0x00, 0xCC, 0xDD];
        let mut framer = Framer::new(MockTimer::default());

        // A whole frame handed over in one read
        feed(&mut framer, &first);
        assert!(framer.on_deadline());
        let frame = framer.take_frame().unwrap();
        framer.finish_frame();
        assert_eq!(frame.as_slice(), &first);

        // Bytes held back while the first frame was processed
        feed(&mut framer, &second);
        assert_eq!(framer.timer().starts, 2);
        assert!(framer.on_deadline());
        assert_eq!(framer.take_frame().unwrap().as_slice(), &second);
    }
}
