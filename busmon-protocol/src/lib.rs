//! Device Bus Protocol
//!
//! This crate defines the byte-level protocol spoken between the monitoring
//! gateway and its field devices on a shared UART bus, plus the line
//! protocol of the gateway's debug console.
//!
//! # Protocol Overview
//!
//! There are no start or end markers on the bus. A frame is whatever arrives
//! between two silence gaps; the [`Framer`] detects those gaps with a
//! deadline timer. Every frame carries a fixed header and a CRC trailer:
//! ```text
//! ┌──────┬─────┬────────┬───────┬─────┬────────┬────────┐
//! │ DEST │ SRC │ MSG ID │ FLAGS │ LEN │ CRC HI │ CRC LO │
//! │ 1B   │ 1B  │ 1B     │ 1B    │ 1B  │ 1B     │ 1B     │
//! └──────┴─────┴────────┴───────┴─────┴────────┴────────┘
//! ```
//!
//! FLAGS holds the ack, command and heartbeat bits (bits 0, 1, 2) and five
//! reserved bits. The CRC is CRC-16/MODBUS over all preceding bytes,
//! appended big-endian.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod console;
pub mod crc;
pub mod framer;
pub mod packet;

pub use crate::crc::{crc16, Crc16Digest};
pub use console::{ConsoleCommand, ConsoleParser};
pub use framer::{Framer, FramerEvent, RawFrame, MAX_FRAME_SIZE};
pub use packet::{
    AckFrame, DecodeError, DevicePacket, MessageId, FRAME_LEN, HEADER_LEN, MONITORING_DEVICE_ID,
};
