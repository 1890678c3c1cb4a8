//! Debug console line protocol
//!
//! Commands are a single upper-case letter or digit followed by optional
//! arguments and a carriage return:
//!
//! - `M\r` - aggregate message count
//! - `D<digit>\r` - message count of one device
//!
//! Bytes outside `0-9`/`A-Z` are ignored until a valid first character
//! arrives.

use heapless::Vec;

/// Maximum line length including the terminator
pub const MAX_LINE_LEN: usize = 20;

/// Line terminator
pub const LINE_END: u8 = b'\r';

// Command codes
const CMD_TOTAL_MESSAGES: u8 = b'M';
const CMD_DEVICE_MESSAGES: u8 = b'D';

/// A parsed console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleCommand {
    /// Report the aggregate message count
    TotalMessages,
    /// Report the message count of one device
    DeviceMessages(u8),
}

impl ConsoleCommand {
    /// Interpret a complete line (without terminator)
    pub fn parse(line: &[u8]) -> Option<Self> {
        match line {
            [CMD_TOTAL_MESSAGES, ..] => Some(ConsoleCommand::TotalMessages),
            [CMD_DEVICE_MESSAGES, digit, ..] if digit.is_ascii_digit() => {
                Some(ConsoleCommand::DeviceMessages(digit - b'0'))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for a command character
    Idle,
    /// Collecting the rest of the line
    Collecting,
}

/// Byte-at-a-time console line parser
#[derive(Debug, Clone)]
pub struct ConsoleParser {
    state: ParseState,
    line: Vec<u8, MAX_LINE_LEN>,
}

impl Default for ConsoleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self {
            state: ParseState::Idle,
            line: Vec::new(),
        }
    }

    /// Reset to idle, dropping any partial line
    pub fn reset(&mut self) {
        self.state = ParseState::Idle;
        self.line.clear();
    }

    /// Feed one received byte
    ///
    /// Returns a command when a carriage return completes a recognized line.
    /// Unrecognized lines are dropped silently.
    pub fn feed(&mut self, byte: u8) -> Option<ConsoleCommand> {
        match self.state {
            ParseState::Idle => {
                if byte.is_ascii_digit() || byte.is_ascii_uppercase() {
                    self.line.clear();
                    // Cannot fail, the line was just cleared
                    let _ = self.line.push(byte);
                    self.state = ParseState::Collecting;
                }
                None
            }
            ParseState::Collecting => {
                if byte == LINE_END {
                    let command = ConsoleCommand::parse(&self.line);
                    self.reset();
                    return command;
                }
                // Leave room for the terminator
                if self.line.len() + 1 >= MAX_LINE_LEN || self.line.push(byte).is_err() {
                    self.reset();
                }
                None
            }
        }
    }

    /// Feed several bytes, returning the first completed command
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Option<ConsoleCommand> {
        bytes.iter().find_map(|&byte| self.feed(byte))
    }
}
