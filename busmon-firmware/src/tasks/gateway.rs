//! Gateway processing task
//!
//! Owns the monitoring state. Validates and acknowledges frames, drains the
//! packet queue in batches, runs the liveness sweep, answers console
//! queries and keeps the watchdog fed.

use defmt::*;
use embassy_futures::select::{select4, Either4};
use embassy_futures::yield_now;
use embassy_stm32::mode::Async;
use embassy_time::{Duration, Ticker};

use busmon_core::{console, Gateway, ImageChecker};
use busmon_hal::Watchdog;
use busmon_hal_stm32f0::flash::ImageFlash;
use busmon_hal_stm32f0::uart::BusTx;
use busmon_hal_stm32f0::watchdog::Iwdg;

use crate::channels::{console_print, CONSOLE_COMMANDS, FRAMER, FRAME_READY};
use crate::config::GATEWAY;

/// Gateway transmitting ACKs on the device bus
pub type BusGateway = Gateway<BusTx<'static, Async>>;

/// Integrity checker over the program flash
pub type FlashChecker = ImageChecker<ImageFlash<'static>>;

/// Gateway task - main monitoring loop
///
/// `checker` is only passed when periodic image checking is enabled; it
/// then advances one chunk per sweep.
#[embassy_executor::task]
pub async fn gateway_task(
    mut gateway: BusGateway,
    mut watchdog: Iwdg<'static>,
    mut checker: Option<FlashChecker>,
) {
    info!("Gateway task started");

    let mut sweep = Ticker::every(Duration::from_millis(GATEWAY.sweep_period_ms as u64));

    loop {
        let backlog = gateway.pending() > 0;

        match select4(
            FRAME_READY.wait(),
            sweep.next(),
            CONSOLE_COMMANDS.receive(),
            async {
                // Queued packets left over from the last batch
                if backlog {
                    yield_now().await
                } else {
                    core::future::pending::<()>().await
                }
            },
        )
        .await
        {
            Either4::First(()) => process_frame(&mut gateway),
            Either4::Second(()) => run_sweep(&mut gateway, checker.as_mut()),
            Either4::Third(command) => {
                debug!("Console command: {:?}", command);
                console_print(console::reply(command, gateway.registry()));
            }
            Either4::Fourth(()) => {}
        }

        let summary = gateway.drain();
        if summary.processed > 0 {
            trace!(
                "Drained {} packets ({} heartbeats, {} counted), {} pending",
                summary.processed,
                summary.heartbeats,
                summary.counted,
                gateway.pending()
            );
        }

        watchdog.refresh();
    }
}

/// Validate, queue and acknowledge the frame waiting in the framer
fn process_frame(gateway: &mut BusGateway) {
    let Some(frame) = FRAMER.lock(|framer| framer.borrow_mut().take_frame()) else {
        return;
    };

    match gateway.handle_frame(&frame) {
        Ok(accepted) => {
            debug!(
                "Packet from device {}: id={} heart={} command={}",
                accepted.packet.source,
                accepted.packet.message_id.id,
                accepted.packet.is_heartbeat(),
                accepted.packet.is_command()
            );
            if let Err(e) = accepted.ack {
                warn!("ACK to device {} abandoned: {:?}", accepted.packet.source, e);
            }
            if accepted.evicted {
                warn!("Packet queue full, oldest packet dropped");
            }
        }
        Err(e) => {
            debug!("Frame rejected: {:?}", e);
            if let Some(line) = console::frame_rejected(e) {
                console_print(line);
            }
        }
    }

    FRAMER.lock(|framer| framer.borrow_mut().finish_frame());
}

/// Liveness sweep plus one step of the background image check
fn run_sweep(gateway: &mut BusGateway, checker: Option<&mut FlashChecker>) {
    for id in gateway.sweep() {
        error!("Device {} failed: no heartbeat for {} ms", id, GATEWAY.failure_timeout_ms());
        console_print(console::device_failed(id));
    }

    let Some(checker) = checker else {
        return;
    };
    match checker.step() {
        Ok(Some(report)) if report.is_valid() => {
            debug!("Image check pass complete: {=u16:#x}", report.computed);
        }
        Ok(Some(report)) => {
            error!(
                "Image CRC mismatch: {=u16:#x} != {=u16:#x}",
                report.computed, report.expected
            );
            console_print(console::integrity(&report));
        }
        Ok(None) => {}
        Err(e) => warn!("Image check step failed: {:?}", e),
    }
}
