//! Inter-task communication channels
//!
//! Defines the statics shared between Embassy tasks. The framer is shared
//! between the bus receive task and the gateway task under a critical
//! section; everything else moves through channels and signals.

use core::cell::RefCell;

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use busmon_core::console::ConsoleLine;
use busmon_hal_stm32f0::timer::EmbassyDeadline;
use busmon_protocol::{ConsoleCommand, Framer};

use crate::config::GATEWAY;

/// Channel capacity for console commands
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for console output lines
const CONSOLE_CHANNEL_SIZE: usize = 8;

/// Device bus framer
pub type BusFramer = Framer<EmbassyDeadline>;

/// Framer fed by the bus RX task, drained by the gateway task
pub static FRAMER: Mutex<CriticalSectionRawMutex, RefCell<BusFramer>> =
    Mutex::new(RefCell::new(Framer::new(EmbassyDeadline::from_micros(
        GATEWAY.frame_gap_us() as u64,
    ))));

/// Signal that the framer holds a complete frame
pub static FRAME_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Commands parsed from the debug console
pub static CONSOLE_COMMANDS: Channel<CriticalSectionRawMutex, ConsoleCommand, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Lines waiting to be written to the debug console
pub static CONSOLE_OUT: Channel<CriticalSectionRawMutex, ConsoleLine, CONSOLE_CHANNEL_SIZE> =
    Channel::new();

/// Queue a line for the debug console, dropping it if the console is backed up
pub fn console_print(line: ConsoleLine) {
    if CONSOLE_OUT.try_send(line).is_err() {
        warn!("Console output full, dropping line");
    }
}
