mod blackboard; // brings `blackboard.rs` in as `crate::blackboard`
mod bus; // brings `bus.rs` in as `crate::bus`
mod connection; // brings `connection.rs` in as `crate::connection`
mod graphics; // brings `graphics.rs` in as `crate::graphics`
mod settings; // brings `settings.rs` in as `crate::settings`

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use blackboard::{set_phase, set_speed, Blackboard, LinkPhase};
use graphics::window_conf;

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("HW-095 motor controller station starting");

    if let Err(e) = run().await {
        error!("Station failed: {e:?}");
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = settings::load_settings()?;
    let ramp = settings.drive.ramp()?;
    let default_speed = settings.drive.speed()?;
    let device = settings.serial.device.clone();

    let bb: Blackboard = Arc::default();
    set_speed(&bb, default_speed);
    set_phase(&bb, LinkPhase::Connecting);

    let bus = bus::LinkBus::new(16);
    let slot = connection::new_slot();
    connection::spawn_connect(settings, ramp, Arc::clone(&slot), bus.clone())?;

    graphics::run(bb, bus, slot, device).await;

    info!("Station stopped");
    Ok(())
}
