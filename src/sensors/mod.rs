//! Sensor subsystem: debounced digital monitors and their supervisor.
//!
//! A [`SensorMonitor`] samples one pin on a fixed cadence and turns levels
//! into [`Edge`] events through an [`EdgeLatch`]. A failed read ends the
//! monitor's loop with an [`IoError`]; the [`Supervisor`] then decides,
//! per [`SensorFailurePolicy`], whether to halt it or restart it after a
//! backoff. The latch lives in the monitor, so it survives restarts.
//!
//! Each monitor runs as its own task on the executor and never blocks the
//! others.

pub mod counter;
pub mod policy;

use core::convert::Infallible;
use core::time::Duration;

use async_io_mini::Timer;
use log::{error, info, warn};

use crate::app::ports::Hardware;
use crate::app::service::Controller;
use crate::config::SensorFailurePolicy;
use crate::error::IoError;
use crate::pins::Pin;

// ---------------------------------------------------------------------------
// Edge latch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Inactive → active.
    Activated,
    /// Active → inactive.
    Released,
}

/// Remembers the last level so each physical transition is reported once.
///
/// Purely edge-latched: there is no time window, so a release re-arms the
/// latch immediately.
#[derive(Debug, Clone, Copy)]
pub struct EdgeLatch {
    active_level: bool,
    was_active: bool,
}

impl EdgeLatch {
    /// `active_level` is the raw level that counts as active (`false` for
    /// pull-up contacts).
    pub fn new(active_level: bool) -> Self {
        Self {
            active_level,
            was_active: false,
        }
    }

    pub fn sample(&mut self, level: bool) -> Option<Edge> {
        let active = level == self.active_level;
        let edge = match (self.was_active, active) {
            (false, true) => Some(Edge::Activated),
            (true, false) => Some(Edge::Released),
            _ => None,
        };
        self.was_active = active;
        edge
    }

    pub fn is_active(&self) -> bool {
        self.was_active
    }
}

// ---------------------------------------------------------------------------
// Poll loop
// ---------------------------------------------------------------------------

/// Periodic sampler for one digital input.
pub struct SensorMonitor {
    name: &'static str,
    pin: Pin,
    interval: Duration,
    latch: EdgeLatch,
}

impl SensorMonitor {
    pub fn new(name: &'static str, pin: Pin, interval: Duration, active_level: bool) -> Self {
        Self {
            name,
            pin,
            interval,
            latch: EdgeLatch::new(active_level),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Feed one level through the latch.
    pub fn sample(&mut self, level: bool) -> Option<Edge> {
        self.latch.sample(level)
    }

    /// Sample forever, calling `on_edge` for every transition. Only
    /// returns when a read fails.
    pub async fn run<H: Hardware>(
        &mut self,
        controller: &Controller<H>,
        mut on_edge: impl FnMut(Edge),
    ) -> Result<Infallible, IoError> {
        loop {
            let level = controller.read_input(self.pin)?;
            if let Some(edge) = self.latch.sample(level) {
                on_edge(edge);
            }
            Timer::after(self.interval).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

/// Applies the configured failure policy to one monitor.
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    name: &'static str,
    policy: SensorFailurePolicy,
    restarts: u32,
}

impl Supervisor {
    pub fn new(name: &'static str, policy: SensorFailurePolicy) -> Self {
        Self {
            name,
            policy,
            restarts: 0,
        }
    }

    /// Record a failure. Returns the backoff before restarting, or `None`
    /// when the monitor must stay down.
    pub fn on_failure(&mut self, err: IoError) -> Option<Duration> {
        match self.policy {
            SensorFailurePolicy::Halt => {
                error!("SENSOR[{}]: {}, monitor halted", self.name, err);
                None
            }
            SensorFailurePolicy::Restart {
                backoff_ms,
                max_restarts,
            } => {
                if max_restarts.is_some_and(|max| self.restarts >= max) {
                    error!(
                        "SENSOR[{}]: {}, giving up after {} restart(s)",
                        self.name, err, self.restarts
                    );
                    return None;
                }
                self.restarts += 1;
                warn!(
                    "SENSOR[{}]: {}, restart #{} in {} ms",
                    self.name, err, self.restarts, backoff_ms
                );
                Some(Duration::from_millis(u64::from(backoff_ms)))
            }
        }
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

/// Run `monitor` under `supervisor` until the policy gives up.
pub async fn supervise<H: Hardware>(
    controller: &Controller<H>,
    monitor: &mut SensorMonitor,
    supervisor: &mut Supervisor,
    mut on_edge: impl FnMut(Edge),
) {
    info!("SENSOR[{}]: monitor started", monitor.name());
    loop {
        let Err(err) = monitor.run(controller, &mut on_edge).await;
        match supervisor.on_failure(err) {
            Some(backoff) => {
                Timer::after(backoff).await;
            }
            None => return,
        }
    }
}
