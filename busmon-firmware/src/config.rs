//! Board configuration baked in from gateway.toml

use busmon_core::GatewayConfig;

include!(concat!(env!("OUT_DIR"), "/gateway_config.rs"));

/// Gateway settings for this build
pub const GATEWAY: GatewayConfig = GatewayConfig {
    bus_baudrate: BUS_BAUDRATE,
    console_baudrate: CONSOLE_BAUDRATE,
    frame_gap_us: FRAME_GAP_US,
    sweep_period_ms: SWEEP_PERIOD_MS,
    failure_threshold: FAILURE_THRESHOLD,
    drain_batch: DRAIN_BATCH,
    ack_timeout_ms: ACK_TIMEOUT_MS,
    watchdog_timeout_ms: WATCHDOG_TIMEOUT_MS,
    image_size: IMAGE_SIZE,
    image_chunk_size: IMAGE_CHUNK_SIZE,
    expected_image_crc: EXPECTED_IMAGE_CRC,
};
