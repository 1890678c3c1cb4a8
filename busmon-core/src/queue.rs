//! Inbound packet queue
//!
//! Fixed-capacity ring of decoded packets between the frame decoder and
//! the drain loop. Read and write cursors are compared for equality only,
//! so one slot always stays unused: at most `QUEUE_CAPACITY - 1` packets
//! are retrievable. When a write would make the cursors meet, the oldest
//! unread packet is dropped.

use busmon_protocol::{DevicePacket, MessageId};

/// Number of slots in the ring
pub const QUEUE_CAPACITY: usize = 20;

/// Overwrite-oldest ring buffer of packets
#[derive(Debug, Clone)]
pub struct PacketQueue {
    slots: [DevicePacket; QUEUE_CAPACITY],
    read: usize,
    write: usize,
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketQueue {
    /// Create an empty queue
    pub const fn new() -> Self {
        const EMPTY: DevicePacket = DevicePacket {
            destination: 0,
            source: 0,
            message_id: MessageId {
                id: 0,
                ack: false,
                command: false,
                heart: false,
                reserved: 0,
            },
            len: 0,
        };
        Self {
            slots: [EMPTY; QUEUE_CAPACITY],
            read: 0,
            write: 0,
        }
    }

    /// Number of retrievable packets
    pub fn len(&self) -> usize {
        (self.write + QUEUE_CAPACITY - self.read) % QUEUE_CAPACITY
    }

    /// Whether nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Append a packet
    ///
    /// Returns `true` if the oldest unread packet was dropped to make room.
    pub fn enqueue(&mut self, packet: DevicePacket) -> bool {
        self.slots[self.write] = packet;
        self.write = (self.write + 1) % QUEUE_CAPACITY;

        if self.write == self.read {
            self.read = (self.read + 1) % QUEUE_CAPACITY;
            return true;
        }
        false
    }

    /// Remove the oldest packet
    pub fn dequeue(&mut self) -> Option<DevicePacket> {
        if self.is_empty() {
            return None;
        }
        let packet = self.slots[self.read];
        self.read = (self.read + 1) % QUEUE_CAPACITY;
        Some(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec;

    fn packet(id: u8) -> DevicePacket {
        let mut packet = DevicePacket {
            source: 1,
            ..Default::default()
        };
        packet.message_id.id = id;
        packet.message_id.command = true;
        packet
    }

    fn drain(queue: &mut PacketQueue) -> Vec<u8> {
        core::iter::from_fn(|| queue.dequeue())
            .map(|p| p.message_id.id)
            .collect()
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = PacketQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = PacketQueue::new();
        for id in 0..5 {
            assert!(!queue.enqueue(packet(id)));
        }
        assert_eq!(queue.len(), 5);
        assert_eq!(drain(&mut queue), [0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_effective_capacity_is_one_less() {
        let mut queue = PacketQueue::new();
        for id in 0..(QUEUE_CAPACITY as u8 - 1) {
            assert!(!queue.enqueue(packet(id)));
        }
        assert_eq!(queue.len(), QUEUE_CAPACITY - 1);

        // The next write meets the read cursor and evicts the oldest
        assert!(queue.enqueue(packet(99)));
        assert_eq!(queue.len(), QUEUE_CAPACITY - 1);
        assert_eq!(queue.dequeue().map(|p| p.message_id.id), Some(1));
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let mut queue = PacketQueue::new();
        for id in 0..25 {
            queue.enqueue(packet(id));
        }
        let expected: Vec<u8> = (6..25).collect();
        assert_eq!(drain(&mut queue), expected);
    }

    #[test]
    fn test_wraparound() {
        let mut queue = PacketQueue::new();
        for round in 0..3u8 {
            for id in 0..15 {
                queue.enqueue(packet(round * 15 + id));
            }
            let expected: Vec<u8> = (round * 15..round * 15 + 15).collect();
            assert_eq!(drain(&mut queue), expected);
        }
    }

    proptest! {
        #[test]
        fn prop_fifo_without_loss(count in 0usize..QUEUE_CAPACITY) {
            let mut queue = PacketQueue::new();
            for id in 0..count {
                prop_assert!(!queue.enqueue(packet(id as u8)));
            }
            let expected: Vec<u8> = (0..count as u8).collect();
            prop_assert_eq!(drain(&mut queue), expected);
        }

        #[test]
        fn prop_retains_most_recent(count in 0usize..100) {
            let mut queue = PacketQueue::new();
            for id in 0..count {
                queue.enqueue(packet(id as u8));
            }
            let kept = count.min(QUEUE_CAPACITY - 1);
            let expected: Vec<u8> = ((count - kept)..count).map(|id| id as u8).collect();
            prop_assert_eq!(drain(&mut queue), expected);
        }
    }
}
