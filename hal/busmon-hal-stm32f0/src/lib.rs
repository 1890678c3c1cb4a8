//! STM32F0-specific HAL for the Busmon gateway
//!
//! This crate implements the `busmon-hal` traits on top of embassy-stm32
//! for the STM32F0 series. Supported chips:
//!
//! - STM32F072RB (gateway board)
//!
//! # Features
//!
//! - `stm32f072rb` - Chip selection
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! The firmware creates the embassy peripherals and wraps them here before
//! handing them to `busmon-core`:
//!
//! - [`uart::BusTx`] - blocking ACK transmitter with a deadline
//! - [`timer::EmbassyDeadline`] - framer deadline on the embassy time driver
//! - [`flash::ImageFlash`] - program image reader for the integrity check
//! - [`watchdog::Iwdg`] - independent watchdog
//! - [`gpio::StatusLed`] - status LED

#![no_std]

pub mod flash;
pub mod gpio;
pub mod timer;
pub mod uart;
pub mod watchdog;

pub use busmon_hal::{FlashError, TxError};
