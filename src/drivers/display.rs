//! Text display task.
//!
//! A single task owns the character LCD. Everyone else posts a
//! [`DisplayRequest`] into the controller's coalescing signal: a burst of
//! requests collapses to the most recent one, and a request arriving
//! mid-render interrupts the render.
//!
//! Display errors are logged and otherwise ignored; the LCD is an
//! indicator, never a source of truth.

use core::time::Duration;

use async_io_mini::Timer;
use futures_lite::future;
use log::{debug, info, warn};

use crate::app::ports::{Hardware, TextDisplay};
use crate::app::service::Controller;
use crate::app::state::ZONE_COUNT;
use crate::error::DisplayError;

/// What the display should show next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRequest {
    /// One zone's name and state.
    Zone(usize),
    /// Cycle through every zone.
    AllZones,
    /// Barrier position.
    Servo,
    /// RC actuator state.
    RcMotor,
}

/// Drive the display for the life of the process.
///
/// Shows the banner first, then a full zone cycle, then serves requests.
pub async fn run<H, D>(controller: &Controller<H>, mut display: D)
where
    H: Hardware,
    D: TextDisplay,
{
    let config = controller.config();
    let requests = controller.display_requests();

    show(&mut display, &format!("{}\n", config.banner_text));
    info!("DISPLAY: banner up");
    let mut pending = Some(
        interruptible_wait(controller, config.banner_hold_ms)
            .await
            .unwrap_or(DisplayRequest::AllZones),
    );

    loop {
        let request = match pending.take() {
            Some(request) => request,
            None => requests.wait().await,
        };
        pending = render(controller, &mut display, request).await;
    }
}

/// Render one request. Returns a request that interrupted it, if any.
pub async fn render<H, D>(
    controller: &Controller<H>,
    display: &mut D,
    request: DisplayRequest,
) -> Option<DisplayRequest>
where
    H: Hardware,
    D: TextDisplay,
{
    debug!("DISPLAY: {:?}", request);
    let state = controller.state();
    match request {
        DisplayRequest::Zone(index) => {
            if let Some(zone) = state.zone(index) {
                show(display, &zone_line(&zone.name, zone.on));
            }
            None
        }
        DisplayRequest::AllZones => {
            for index in 0..ZONE_COUNT {
                // Re-read each step so a cycle never shows stale levels.
                let state = controller.state();
                if let Some(zone) = state.zone(index) {
                    show(display, &zone_line(&zone.name, zone.on));
                }
                if let Some(next) =
                    interruptible_wait(controller, controller.config().display_dwell_ms).await
                {
                    debug!("DISPLAY: cycle interrupted at zone {}", index);
                    return Some(next);
                }
            }
            None
        }
        DisplayRequest::Servo => {
            let position = if state.servo_engaged() { "Open" } else { "Closed" };
            show(display, &format!("BARRIER: {position}"));
            None
        }
        DisplayRequest::RcMotor => {
            show(display, &format!("RC MOTOR: {}", on_off(state.rc_active())));
            None
        }
    }
}

/// `"<NAME>: On"` / `"<NAME>: Off"`.
pub fn zone_line(name: &str, on: bool) -> String {
    format!("{name}: {}", on_off(on))
}

fn on_off(on: bool) -> &'static str {
    if on { "On" } else { "Off" }
}

/// Wait `ms`, or return early with the request that cut the wait short.
async fn interruptible_wait<H: Hardware>(
    controller: &Controller<H>,
    ms: u32,
) -> Option<DisplayRequest> {
    let requests = controller.display_requests();
    future::or(
        async {
            Timer::after(Duration::from_millis(u64::from(ms))).await;
            None
        },
        async { Some(requests.wait().await) },
    )
    .await
}

fn show<D: TextDisplay>(display: &mut D, text: &str) {
    let result: Result<(), DisplayError> = display.clear().and_then(|()| display.write(text));
    if let Err(e) = result {
        warn!("DISPLAY: write failed: {}", e);
    }
}
