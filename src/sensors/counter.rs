//! People counter: entry and exit turnstile contacts.
//!
//! Two independent monitors, one per contact. Contacts are pull-up
//! switches, so a pressed contact reads LOW. Each press (the
//! [`Edge::Activated`] edge) adjusts the count by ±1 through the
//! controller, which clamps at zero, renders the last digit and
//! broadcasts.

use core::time::Duration;

use super::{Edge, SensorMonitor, Supervisor, supervise};
use crate::app::ports::Hardware;
use crate::app::service::Controller;
use crate::config::PinMap;
use crate::pins::Pin;

/// Which side of the turnstile a contact sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Entry,
    Exit,
}

impl Direction {
    pub fn delta(self) -> i32 {
        match self {
            Self::Entry => 1,
            Self::Exit => -1,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
        }
    }

    fn pin(self, pins: &PinMap) -> Pin {
        match self {
            Self::Entry => pins.entry_switch,
            Self::Exit => pins.exit_switch,
        }
    }
}

/// Build the monitor for one contact from the controller's config.
pub fn monitor_for<H: Hardware>(controller: &Controller<H>, direction: Direction) -> SensorMonitor {
    let config = controller.config();
    SensorMonitor::new(
        direction.name(),
        direction.pin(&config.pins),
        Duration::from_millis(u64::from(config.counter_poll_ms)),
        false,
    )
}

/// Count presses on one contact for the life of the process (or until the
/// failure policy halts the monitor).
pub async fn run<H: Hardware>(controller: &Controller<H>, direction: Direction) {
    let mut monitor = monitor_for(controller, direction);
    let mut supervisor = Supervisor::new(direction.name(), controller.config().sensor_failure);
    supervise(controller, &mut monitor, &mut supervisor, |edge| {
        if edge == Edge::Activated {
            controller.adjust_people_count(direction.delta());
        }
    })
    .await;
}
