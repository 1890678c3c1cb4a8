//! Debug console text output
//!
//! Formats the human-readable lines the gateway writes to its debug
//! console: command replies and notifications from the monitoring core.

use core::fmt::Write;

use heapless::String;

use busmon_protocol::{ConsoleCommand, DecodeError};

use crate::integrity::IntegrityReport;
use crate::registry::DeviceRegistry;

/// Longest console line
pub const MAX_CONSOLE_LINE: usize = 64;

/// One line of console output, including the `\r\n` terminator
pub type ConsoleLine = String<MAX_CONSOLE_LINE>;

/// Application version reported in the banner
pub const APP_VERSION: &str = "1.0.0";

fn line(args: core::fmt::Arguments<'_>) -> ConsoleLine {
    let mut out = ConsoleLine::new();
    // Every line produced here fits in MAX_CONSOLE_LINE
    let _ = out.write_fmt(args);
    out
}

/// Start-up banner
pub fn banner() -> ConsoleLine {
    line(format_args!(
        "Monitoring Device Application Ver - {}\r\n",
        APP_VERSION
    ))
}

/// Reply to a console command
pub fn reply(command: ConsoleCommand, registry: &DeviceRegistry) -> ConsoleLine {
    match command {
        ConsoleCommand::TotalMessages => line(format_args!(
            "MD Total Message [{}]\r\n",
            registry.total_messages()
        )),
        ConsoleCommand::DeviceMessages(id) => line(format_args!(
            "Dev#{} Total Message [{}]\r\n",
            id,
            registry.device_messages(usize::from(id))
        )),
    }
}

/// Notification for a dropped frame, if the reason is user-visible
pub fn frame_rejected(err: DecodeError) -> Option<ConsoleLine> {
    match err {
        DecodeError::CrcMismatch { .. } => Some(line(format_args!("InValid CRC\r\n"))),
        DecodeError::Unaddressed => Some(line(format_args!(
            "Message not intended for MonitoringDevice\r\n"
        ))),
        DecodeError::TooShort => None,
    }
}

/// Notification for a device whose failure streak saturated
pub fn device_failed(id: u8) -> ConsoleLine {
    line(format_args!("ERR_DEV#{}\r\n", id))
}

/// Result of a program image check
pub fn integrity(report: &IntegrityReport) -> ConsoleLine {
    if report.is_valid() {
        line(format_args!(
            "Flash Checksum CRC [{}] = [{}]\r\n",
            report.computed, report.expected
        ))
    } else {
        line(format_args!(
            "CRC MisMatch [{}] = [{}]\r\n",
            report.computed, report.expected
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busmon_protocol::DevicePacket;

    #[test]
    fn test_banner() {
        assert_eq!(
            banner().as_str(),
            "Monitoring Device Application Ver - 1.0.0\r\n"
        );
    }

    #[test]
    fn test_replies() {
        let mut registry = DeviceRegistry::default();
        let mut packet = DevicePacket {
            source: 3,
            ..Default::default()
        };
        packet.message_id.command = true;
        registry.record(&packet);
        registry.record(&packet);

        assert_eq!(
            reply(ConsoleCommand::TotalMessages, &registry).as_str(),
            "MD Total Message [2]\r\n"
        );
        assert_eq!(
            reply(ConsoleCommand::DeviceMessages(3), &registry).as_str(),
            "Dev#3 Total Message [2]\r\n"
        );
        assert_eq!(
            reply(ConsoleCommand::DeviceMessages(0), &registry).as_str(),
            "Dev#0 Total Message [0]\r\n"
        );
    }

    #[test]
    fn test_rejection_lines() {
        let crc = DecodeError::CrcMismatch {
            computed: 1,
            received: 2,
        };
        assert_eq!(frame_rejected(crc).unwrap().as_str(), "InValid CRC\r\n");
        assert_eq!(
            frame_rejected(DecodeError::Unaddressed).unwrap().as_str(),
            "Message not intended for MonitoringDevice\r\n"
        );
        assert!(frame_rejected(DecodeError::TooShort).is_none());
    }

    #[test]
    fn test_notifications() {
        assert_eq!(device_failed(7).as_str(), "ERR_DEV#7\r\n");

        let ok = IntegrityReport {
            computed: 37889,
            expected: 37889,
        };
        assert_eq!(
            integrity(&ok).as_str(),
            "Flash Checksum CRC [37889] = [37889]\r\n"
        );

        let bad = IntegrityReport {
            computed: 1,
            expected: 37889,
        };
        assert_eq!(integrity(&bad).as_str(), "CRC MisMatch [1] = [37889]\r\n");
    }
}
