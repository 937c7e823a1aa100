//! Light policy task: arms the alarm at night and watches the beam.
//!
//! One cycle:
//!
//! ```text
//!   read light ─▶ alarm tick ─┬─[armed]─▶ settle ─▶ read beam ─▶ alarm tick ─┐
//!                             └──────────────────────────────────────────────┴─▶ heartbeat ─▶ sleep
//! ```
//!
//! The light sensor module is inverted (HIGH = dark); the beam receiver
//! reads HIGH when the beam is broken.

use core::convert::Infallible;
use core::time::Duration;

use async_io_mini::Timer;
use log::info;

use super::Supervisor;
use crate::app::ports::Hardware;
use crate::app::service::Controller;
use crate::error::IoError;
use crate::fsm::StateId;

/// Run exactly one policy cycle. Returns the alarm state it ended in.
pub async fn cycle<H: Hardware>(controller: &Controller<H>) -> Result<StateId, IoError> {
    let config = controller.config();
    let dark = controller.read_input(config.pins.light_sensor)?;
    let mut state = controller.run_alarm_cycle(dark, None);

    if state.is_armed() {
        Timer::after(Duration::from_millis(u64::from(config.beam_settle_ms))).await;
        let broken = controller.read_input(config.pins.beam_receiver)?;
        state = controller.run_alarm_cycle(dark, Some(broken));
    }

    controller.heartbeat(dark);
    Ok(state)
}

async fn run_cycles<H: Hardware>(controller: &Controller<H>) -> Result<Infallible, IoError> {
    let interval = Duration::from_millis(u64::from(controller.config().policy_poll_ms));
    loop {
        cycle(controller).await?;
        Timer::after(interval).await;
    }
}

/// Drive the light policy for the life of the process, under the
/// configured failure policy.
pub async fn run<H: Hardware>(controller: &Controller<H>) {
    let mut supervisor = Supervisor::new("light", controller.config().sensor_failure);
    info!("SENSOR[light]: policy started");
    loop {
        let Err(err) = run_cycles(controller).await;
        match supervisor.on_failure(err) {
            Some(backoff) => {
                Timer::after(backoff).await;
            }
            None => return,
        }
    }
}
