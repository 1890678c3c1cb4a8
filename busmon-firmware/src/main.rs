//! Busmon - Bus Monitoring Gateway Firmware
//!
//! Main firmware binary for the STM32F072 gateway board. Listens to up to
//! ten field devices on a shared UART bus, acknowledges their packets,
//! tracks message counts and liveness, and reports on a debug console.
//!
//! Peripherals:
//! - USART1 (PA9 TX, PA10 RX): device bus
//! - USART3 (PB10 TX, PB11 RX): debug console
//! - PC6: status LED
//! - IWDG: independent watchdog

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::flash::Flash;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::peripherals::{USART1, USART3};
use embassy_stm32::usart::{self, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use busmon_core::{console, Gateway, ImageChecker};
use busmon_hal::uart::UartConfig;
use busmon_hal_stm32f0::flash::ImageFlash;
use busmon_hal_stm32f0::gpio::StatusLed;
use busmon_hal_stm32f0::uart::{usart_config, BusTx};
use busmon_hal_stm32f0::watchdog::Iwdg;

use crate::channels::console_print;
use crate::config::{GATEWAY, PERIODIC_IMAGE_CHECK};
use crate::tasks::bus_rx::BUS_DMA_BUF_SIZE;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    USART1 => usart::InterruptHandler<USART1>;
    USART3_4 => usart::InterruptHandler<USART3>;
});

// Circular DMA buffer for bus reception
static BUS_RX_BUF: StaticCell<[u8; BUS_DMA_BUF_SIZE]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Busmon gateway firmware starting...");

    let p = embassy_stm32::init(Default::default());
    info!("Peripherals initialized");

    // Debug console
    let console_config = usart_config(&UartConfig {
        baudrate: GATEWAY.console_baudrate,
        ..Default::default()
    });
    let console_uart = Uart::new(
        p.USART3,
        p.PB11, // RX
        p.PB10, // TX
        Irqs,
        p.DMA1_CH7,
        p.DMA1_CH6,
        console_config,
    )
    .unwrap();
    let (console_tx, console_rx) = console_uart.split();

    console_print(console::banner());

    // Program image integrity check at boot
    let image = ImageFlash::new(Flash::new_blocking(p.FLASH), GATEWAY.image_size);
    let mut checker = ImageChecker::new(
        image,
        GATEWAY.image_size,
        usize::from(GATEWAY.image_chunk_size),
        GATEWAY.expected_image_crc,
    );
    match checker.check_all() {
        Ok(report) => {
            if report.is_valid() {
                info!("Image CRC ok: {=u16:#x}", report.computed);
            } else {
                error!(
                    "Image CRC mismatch: {=u16:#x} != {=u16:#x}",
                    report.computed, report.expected
                );
            }
            console_print(console::integrity(&report));
        }
        Err(e) => error!("Image check failed: {:?}", e),
    }

    // Device bus
    let bus_config = usart_config(&UartConfig {
        baudrate: GATEWAY.bus_baudrate,
        ..Default::default()
    });
    let bus_uart = Uart::new(
        p.USART1,
        p.PA10, // RX
        p.PA9,  // TX
        Irqs,
        p.DMA1_CH2,
        p.DMA1_CH3,
        bus_config,
    )
    .unwrap();
    let (bus_tx, bus_rx) = bus_uart.split();
    let bus_rx = bus_rx.into_ring_buffered(BUS_RX_BUF.init([0u8; BUS_DMA_BUF_SIZE]));

    let gateway = Gateway::new(BusTx::new(bus_tx), &GATEWAY);
    info!(
        "Gateway ready: frame gap {} us, sweep {} ms, failure after {} ms",
        GATEWAY.frame_gap_us(),
        GATEWAY.sweep_period_ms,
        GATEWAY.failure_timeout_ms()
    );

    let led = StatusLed::new(Output::new(p.PC6, Level::Low, Speed::Low));

    let mut watchdog = Iwdg::new(p.IWDG, GATEWAY.watchdog_timeout_ms);
    watchdog.start();
    info!("IWDG armed: timeout={=u32}ms", watchdog.timeout_ms());

    let checker = if PERIODIC_IMAGE_CHECK {
        Some(checker)
    } else {
        None
    };

    // Spawn tasks
    spawner.spawn(tasks::console_tx_task(console_tx)).unwrap();
    spawner.spawn(tasks::console_rx_task(console_rx)).unwrap();
    spawner.spawn(tasks::bus_rx_task(bus_rx)).unwrap();
    spawner
        .spawn(tasks::gateway_task(gateway, watchdog, checker))
        .unwrap();
    spawner.spawn(tasks::led_task(led)).unwrap();

    info!("All tasks spawned");
}
