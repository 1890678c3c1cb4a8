//! Build script for busmon-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates gateway.toml and bakes it into `gateway_config.rs`

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Flash size of the STM32F072RB
const FLASH_SIZE: i64 = 128 * 1024;

/// Longest IWDG timeout (LSI 40 kHz, prescaler 256, reload 4095)
const MAX_WATCHDOG_MS: i64 = 26_214;

/// Largest chunk the integrity checker reads at once
const MAX_IMAGE_CHUNK: i64 = 64;

/// Ring slots in the inbound queue
const QUEUE_CAPACITY: i64 = 20;

fn main() {
    setup_linker();
    let config = load_config();
    write_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated gateway settings
struct GatewaySettings {
    bus_baudrate: i64,
    frame_gap_us: i64,
    ack_timeout_ms: i64,
    console_baudrate: i64,
    sweep_period_ms: i64,
    failure_threshold: i64,
    drain_batch: i64,
    watchdog_timeout_ms: i64,
    image_size: i64,
    image_chunk_size: i64,
    expected_image_crc: i64,
    periodic_image_check: bool,
}

/// Read and validate gateway.toml
fn load_config() -> GatewaySettings {
    println!("cargo:rerun-if-changed=gateway.toml");

    let config_path = Path::new("gateway.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: gateway.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a gateway.toml configuration file.        ║\n\
            ║  Please create one in the busmon-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read gateway.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in gateway.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let settings = GatewaySettings {
        bus_baudrate: int_in(&config, "bus", "baudrate", 115_200, 1200..=1_000_000, &mut errors),
        frame_gap_us: int_in(&config, "bus", "frame_gap_us", 2_000, 1..=1_000_000, &mut errors),
        ack_timeout_ms: int_in(&config, "bus", "ack_timeout_ms", 100, 1..=1_000, &mut errors),
        console_baudrate: int_in(
            &config,
            "console",
            "baudrate",
            115_200,
            1200..=1_000_000,
            &mut errors,
        ),
        sweep_period_ms: int_in(&config, "liveness", "sweep_period_ms", 100, 10..=10_000, &mut errors),
        failure_threshold: int_in(&config, "liveness", "failure_threshold", 28, 1..=255, &mut errors),
        drain_batch: int_in(
            &config,
            "liveness",
            "drain_batch",
            5,
            1..=QUEUE_CAPACITY - 1,
            &mut errors,
        ),
        watchdog_timeout_ms: int_in(
            &config,
            "watchdog",
            "timeout_ms",
            1_000,
            1..=MAX_WATCHDOG_MS,
            &mut errors,
        ),
        image_size: int_in(&config, "image", "size", 0x7000, 1..=FLASH_SIZE, &mut errors),
        image_chunk_size: int_in(&config, "image", "chunk_size", 32, 1..=MAX_IMAGE_CHUNK, &mut errors),
        expected_image_crc: int_in(&config, "image", "expected_crc", 0x9401, 0..=0xFFFF, &mut errors),
        periodic_image_check: bool_in(&config, "image", "periodic_check", false, &mut errors),
    };

    // The loop refreshes the watchdog at least once per sweep; an ACK may
    // stall it for the ACK timeout on top of that.
    if settings.watchdog_timeout_ms <= settings.sweep_period_ms + settings.ack_timeout_ms {
        errors.push(format!(
            "[watchdog] timeout_ms ({}) must exceed sweep_period_ms + ack_timeout_ms ({})",
            settings.watchdog_timeout_ms,
            settings.sweep_period_ms + settings.ack_timeout_ms
        ));
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid gateway configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=gateway.toml validated successfully");
    settings
}

/// Fetch an integer key, checking its range
fn int_in(
    config: &toml::Value,
    section: &str,
    key: &str,
    default: i64,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        None => default,
        Some(toml::Value::Integer(value)) => {
            if !range.contains(value) {
                errors.push(format!(
                    "[{}] {} must be {}-{}",
                    section,
                    key,
                    range.start(),
                    range.end()
                ));
            }
            *value
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            default
        }
    }
}

/// Fetch a boolean key
fn bool_in(
    config: &toml::Value,
    section: &str,
    key: &str,
    default: bool,
    errors: &mut Vec<String>,
) -> bool {
    match config.get(section).and_then(|s| s.get(key)) {
        None => default,
        Some(toml::Value::Boolean(value)) => *value,
        Some(_) => {
            errors.push(format!("[{}] {} must be true or false", section, key));
            default
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emit the validated settings as Rust constants
fn write_config(settings: &GatewaySettings) {
    let mut out = String::new();
    out.push_str("// Generated by build.rs from gateway.toml\n\n");

    let consts: [(&str, &str, String); 11] = [
        ("BUS_BAUDRATE", "u32", settings.bus_baudrate.to_string()),
        ("FRAME_GAP_US", "u32", settings.frame_gap_us.to_string()),
        ("ACK_TIMEOUT_MS", "u32", settings.ack_timeout_ms.to_string()),
        ("CONSOLE_BAUDRATE", "u32", settings.console_baudrate.to_string()),
        ("SWEEP_PERIOD_MS", "u32", settings.sweep_period_ms.to_string()),
        ("FAILURE_THRESHOLD", "u8", settings.failure_threshold.to_string()),
        ("DRAIN_BATCH", "u8", settings.drain_batch.to_string()),
        ("WATCHDOG_TIMEOUT_MS", "u32", settings.watchdog_timeout_ms.to_string()),
        ("IMAGE_SIZE", "u32", format!("{:#x}", settings.image_size)),
        ("IMAGE_CHUNK_SIZE", "u16", settings.image_chunk_size.to_string()),
        ("EXPECTED_IMAGE_CRC", "u16", format!("{:#06x}", settings.expected_image_crc)),
    ];
    for (name, ty, value) in consts {
        writeln!(out, "pub const {}: {} = {};", name, ty, value).unwrap();
    }
    writeln!(
        out,
        "pub const PERIODIC_IMAGE_CHECK: bool = {};",
        settings.periodic_image_check
    )
    .unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("gateway_config.rs"), out).unwrap();
}
