use std::sync::Arc;
use std::thread;

use anyhow::{bail, Context};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use rover_drive::{DriveController, PinSet, RampConfig};
use rover_firmata::{discover, DigitalPin, FirmataSession, PortCandidate, PwmPin};

use crate::bus::{LinkBus, LinkEvent};
use crate::settings::{PinMap, Settings};

pub type Controller = DriveController<DigitalPin, PwmPin>;

/// A live board: the drive controller and the port it speaks through.
///
/// The serial session has no field here. The pin handles inside the
/// controller keep it alive, so dropping the link (after a stop) flushes
/// and closes the port.
pub struct BoardLink {
    pub controller: Controller,
    pub port: String,
}

/// Handoff point between the link worker and the UI thread.
pub type LinkSlot = Arc<Mutex<Option<BoardLink>>>;

pub fn new_slot() -> LinkSlot {
    Arc::new(Mutex::new(None))
}

/// Scan for the configured device and open it, on a background thread.
///
/// The worker runs once, parks the finished link in `slot` and publishes
/// the outcome on the bus. Scanning and opening block on the OS, which
/// for a Bluetooth bind can take seconds, so they never run on the frame
/// loop. There is no retry; a failed scan means restarting the station.
pub fn spawn_connect(
    settings: Settings,
    ramp: RampConfig,
    slot: LinkSlot,
    bus: LinkBus,
) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("link".into())
        .spawn(move || {
            info!(device = %settings.serial.device, "link worker started");
            match locate_and_open(&settings, ramp) {
                Ok(link) => {
                    let port = link.port.clone();
                    *slot.lock() = Some(link);
                    bus.publish(LinkEvent::Connected { port });
                }
                Err(e) => {
                    error!(error = %e, "connection failed");
                    bus.publish(LinkEvent::ConnectFailed {
                        reason: format!("{e:#}"),
                    });
                }
            }
        })
        .context("failed to spawn link worker")?;
    Ok(())
}

/// Pick the first discovered port whose name carries the configured
/// substring, then open it. First match wins; if several ports match,
/// the rest are ignored.
fn locate_and_open(settings: &Settings, ramp: RampConfig) -> anyhow::Result<BoardLink> {
    let candidates = discover().context("scanning serial ports")?;
    for candidate in &candidates {
        debug!(port = %candidate, "discovered serial port");
    }
    let device = settings.serial.device.as_str();
    let Some(candidate) = candidates.iter().find(|c| c.matches(device)) else {
        bail!("{device} not found ({} serial ports scanned)", candidates.len());
    };
    info!(port = %candidate, device, "matched configured device");
    open_link(candidate, settings, ramp)
}

fn open_link(
    candidate: &PortCandidate,
    settings: &Settings,
    ramp: RampConfig,
) -> anyhow::Result<BoardLink> {
    let session = FirmataSession::open(
        candidate.path(),
        settings.serial.baud,
        settings.serial.timeout(),
        settings.serial.settle(),
    )
    .with_context(|| format!("opening {}", candidate.path()))?;
    let pins = claim_pins(&session, &settings.pins)?;
    Ok(BoardLink {
        controller: DriveController::new(pins, ramp),
        port: candidate.path().to_string(),
    })
}

fn claim_pins(
    session: &FirmataSession,
    map: &PinMap,
) -> anyhow::Result<PinSet<DigitalPin, PwmPin>> {
    let ena = session.pwm_pin(map.ena).context("claiming ENA")?;
    let enb = session.pwm_pin(map.enb).context("claiming ENB")?;
    let in1 = session.digital_pin(map.in1).context("claiming IN1")?;
    let in2 = session.digital_pin(map.in2).context("claiming IN2")?;
    let in3 = session.digital_pin(map.in3).context("claiming IN3")?;
    let in4 = session.digital_pin(map.in4).context("claiming IN4")?;
    Ok(PinSet::new(ena, enb, in1, in2, in3, in4))
}

/// Stop the motors and close the link.
///
/// Best effort: a dead port cannot be zeroed, so failures are logged and
/// the link is dropped either way.
pub fn teardown(mut link: BoardLink) {
    if let Err(e) = link.controller.stop_all() {
        warn!(port = %link.port, error = %e, "could not zero pins during teardown");
    }
    info!(port = %link.port, "link closed");
}
