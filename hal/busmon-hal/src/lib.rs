//! Busmon Hardware Abstraction Layer
//!
//! This crate defines the narrow set of hardware services the monitoring
//! core depends on. Chip-specific HALs implement them; host tests provide
//! mock implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (busmon-firmware)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  busmon-core / busmon-protocol          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  busmon-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  busmon-hal-  │
//!             │    stm32f0    │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`] - Transmit N bytes with a timeout
//! - [`timer::DeadlineTimer`] - One-shot deadline that can be started, reloaded, stopped
//! - [`watchdog::Watchdog`] - Watchdog refresh
//! - [`flash::ProgramMemory`] - Read access to the program image
//! - [`gpio::OutputPin`] - Digital output (status LED)

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod timer;
pub mod uart;
pub mod watchdog;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, ProgramMemory};
pub use gpio::OutputPin;
pub use timer::DeadlineTimer;
pub use uart::{TxError, UartTx};
pub use watchdog::Watchdog;
