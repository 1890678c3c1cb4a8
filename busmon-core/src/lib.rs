//! Board-agnostic monitoring logic for the bus gateway
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Inbound packet queue (overwrite-oldest ring)
//! - Device registry and liveness sweep
//! - ACK responder
//! - The owning [`Gateway`] context tying them together
//! - Program image integrity check
//! - Debug console output formatting
//! - Configuration type definitions
//!
//! Hardware is reached only through the `busmon-hal` traits, so everything
//! here runs in host tests with mock implementations.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod ack;
pub mod config;
pub mod console;
pub mod gateway;
pub mod integrity;
pub mod queue;
pub mod registry;

pub use ack::AckResponder;
pub use config::GatewayConfig;
pub use gateway::{AcceptedFrame, DrainSummary, FrameStats, Gateway};
pub use integrity::{ImageChecker, IntegrityError, IntegrityReport};
pub use queue::{PacketQueue, QUEUE_CAPACITY};
pub use registry::{DeviceEntry, DeviceRegistry, Liveness, RecordOutcome, MAX_DEVICES};
