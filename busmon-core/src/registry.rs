//! Device registry and liveness tracking
//!
//! One entry per device address. Drained packets update message counters
//! and mark heartbeats; a periodic sweep turns missing heartbeats into a
//! failure streak. A device whose streak reaches the threshold is reported
//! once, and stays failed (without further reports) until its next
//! heartbeat.

use heapless::Vec;

use busmon_protocol::DevicePacket;

/// Highest valid device address
pub const MAX_DEVICES: usize = 10;

/// Table size; slot 0 is the gateway's own address and stays unused
pub const DEVICE_SLOTS: usize = MAX_DEVICES + 1;

/// Default consecutive silent sweeps before a device is declared failed
pub const DEFAULT_FAILURE_THRESHOLD: u8 = 28;

/// Liveness view of a device entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Liveness {
    /// No sweep has run since start-up
    Unknown,
    /// Heartbeat seen in the last sweep period
    Alive,
    /// Silent for this many sweeps, below the threshold
    Degraded(u8),
    /// Silent for at least the threshold
    Failed,
}

/// What a drained packet did to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordOutcome {
    /// Heartbeat flag set for the device
    Heartbeat,
    /// Message counters incremented
    Counted,
    /// Neither heartbeat nor command; nothing changed
    Ignored,
    /// Source address has no table entry
    UnknownSource,
}

/// Per-device statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceEntry {
    /// Device address
    pub id: u8,
    /// Counted messages since start-up
    pub total_messages: u32,
    /// Heartbeat drained since the last sweep
    pub heartbeat_seen: bool,
    /// Consecutive sweeps without a heartbeat
    pub failure_count: u8,
    swept: bool,
}

impl DeviceEntry {
    const fn new(id: u8) -> Self {
        Self {
            id,
            total_messages: 0,
            heartbeat_seen: false,
            failure_count: 0,
            swept: false,
        }
    }

    /// Classify the entry against a failure threshold
    pub fn liveness(&self, threshold: u8) -> Liveness {
        if self.failure_count >= threshold {
            Liveness::Failed
        } else if self.failure_count > 0 {
            Liveness::Degraded(self.failure_count)
        } else if self.swept || self.heartbeat_seen {
            Liveness::Alive
        } else {
            Liveness::Unknown
        }
    }
}

/// Device table plus aggregate statistics
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    devices: [DeviceEntry; DEVICE_SLOTS],
    total_messages: u32,
    failure_threshold: u8,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}

impl DeviceRegistry {
    /// Create a registry with every device unknown
    pub fn new(failure_threshold: u8) -> Self {
        let mut devices = [DeviceEntry::default(); DEVICE_SLOTS];
        for (id, entry) in devices.iter_mut().enumerate() {
            *entry = DeviceEntry::new(id as u8);
        }
        Self {
            devices,
            total_messages: 0,
            failure_threshold,
        }
    }

    /// Apply a drained packet
    ///
    /// A heartbeat only marks the device as alive; a command packet bumps
    /// both the device's and the aggregate counter.
    pub fn record(&mut self, packet: &DevicePacket) -> RecordOutcome {
        let Some(entry) = Self::slot(packet.source).and_then(|i| self.devices.get_mut(i)) else {
            return RecordOutcome::UnknownSource;
        };

        if packet.is_heartbeat() {
            entry.heartbeat_seen = true;
            RecordOutcome::Heartbeat
        } else if packet.is_command() {
            entry.total_messages = entry.total_messages.wrapping_add(1);
            self.total_messages = self.total_messages.wrapping_add(1);
            RecordOutcome::Counted
        } else {
            RecordOutcome::Ignored
        }
    }

    /// Run one liveness sweep over all devices
    ///
    /// Returns the ids whose failure streak reached the threshold during
    /// this sweep. A saturated streak is not incremented again, so each
    /// failure episode is reported exactly once.
    pub fn sweep(&mut self) -> Vec<u8, MAX_DEVICES> {
        let mut failed = Vec::new();

        for entry in self.devices.iter_mut().skip(1) {
            entry.swept = true;
            if entry.heartbeat_seen {
                entry.heartbeat_seen = false;
                entry.failure_count = 0;
            } else if entry.failure_count < self.failure_threshold {
                entry.failure_count += 1;
                if entry.failure_count == self.failure_threshold {
                    // At most MAX_DEVICES entries are swept
                    let _ = failed.push(entry.id);
                }
            }
        }

        failed
    }

    /// Aggregate counted messages
    pub fn total_messages(&self) -> u32 {
        self.total_messages
    }

    /// Counted messages of one device, 0 for an unknown id
    pub fn device_messages(&self, id: usize) -> u32 {
        self.devices.get(id).map_or(0, |entry| entry.total_messages)
    }

    /// Entry for a device address
    pub fn device(&self, id: u8) -> Option<&DeviceEntry> {
        Self::slot(id).and_then(|i| self.devices.get(i))
    }

    /// Liveness of a device address
    pub fn liveness(&self, id: u8) -> Option<Liveness> {
        self.device(id).map(|e| e.liveness(self.failure_threshold))
    }

    /// Configured failure threshold
    pub fn failure_threshold(&self) -> u8 {
        self.failure_threshold
    }

    fn slot(id: u8) -> Option<usize> {
        let id = usize::from(id);
        (1..=MAX_DEVICES).contains(&id).then_some(id)
    }
}
