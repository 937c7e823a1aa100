//! System configuration parameters
//!
//! All tunable parameters for the site controller. Values are loaded from a
//! JSON file through [`ConfigPort`](crate::app::ports::ConfigPort); anything
//! missing from the file falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::app::state::ZONE_COUNT;
use crate::pins::{self, Pin};
use crate::rpc::io_task::MAX_SESSIONS;

/// GPIO assignment for every peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinMap {
    pub zone_lights: [Pin; ZONE_COUNT],
    pub light_sensor: Pin,
    pub beam_receiver: Pin,
    pub laser_emitter: Pin,
    pub servo: Pin,
    pub rc_motor: Pin,
    pub entry_switch: Pin,
    pub exit_switch: Pin,
    /// Segments a, b, c, d, e, f, g in that order.
    pub segments: [Pin; 7],
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            zone_lights: pins::ZONE_LIGHT_GPIOS,
            light_sensor: pins::LIGHT_SENSOR_GPIO,
            beam_receiver: pins::BEAM_RECEIVER_GPIO,
            laser_emitter: pins::LASER_EMITTER_GPIO,
            servo: pins::SERVO_GPIO,
            rc_motor: pins::RC_MOTOR_GPIO,
            entry_switch: pins::ENTRY_SWITCH_GPIO,
            exit_switch: pins::EXIT_SWITCH_GPIO,
            segments: pins::SEGMENT_GPIOS,
        }
    }
}

impl PinMap {
    /// Every pin in the map, outputs and inputs alike.
    pub fn all(&self) -> impl Iterator<Item = Pin> + '_ {
        self.zone_lights
            .iter()
            .chain(self.segments.iter())
            .copied()
            .chain([
                self.light_sensor,
                self.beam_receiver,
                self.laser_emitter,
                self.servo,
                self.rc_motor,
                self.entry_switch,
                self.exit_switch,
            ])
    }
}

/// Whether the people counter broadcasts on an adjustment that did not
/// change the count (an exit absorbed at zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountBroadcast {
    /// Only real changes are rendered and broadcast.
    #[default]
    OnChange,
    /// Every adjustment re-renders and broadcasts the current total.
    EveryAdjustment,
}

/// What a sensor monitor does after a failed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SensorFailurePolicy {
    /// Log and stop the monitor for good.
    Halt,
    /// Log, wait `backoff_ms`, restart. `max_restarts = None` never gives up.
    Restart {
        backoff_ms: u32,
        max_restarts: Option<u32>,
    },
}

impl Default for SensorFailurePolicy {
    fn default() -> Self {
        Self::Restart {
            backoff_ms: 1000,
            max_restarts: None,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Network ---
    /// Address the client listener binds to.
    pub listen_addr: String,
    /// Maximum simultaneously connected observers.
    pub max_observers: usize,

    // --- Hardware ---
    pub pins: PinMap,
    /// Display names, one per zone (index 7 is the outside light).
    pub zone_names: [String; ZONE_COUNT],

    // --- Timing ---
    /// Entry/exit contact sample interval (milliseconds)
    pub counter_poll_ms: u32,
    /// Light policy cycle interval (milliseconds)
    pub policy_poll_ms: u32,
    /// Delay between arming check and beam sample (milliseconds)
    pub beam_settle_ms: u32,
    /// How long the servo drive signal is held before release (milliseconds)
    pub servo_hold_ms: u32,
    /// Time each zone stays on the LCD during a full refresh (milliseconds)
    pub display_dwell_ms: u32,

    // --- Display ---
    /// Text shown on the LCD at startup.
    pub banner_text: String,
    /// How long the banner stays up (milliseconds)
    pub banner_hold_ms: u32,

    // --- Policies ---
    pub count_broadcast: CountBroadcast,
    pub sensor_failure: SensorFailurePolicy,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Network
            listen_addr: "0.0.0.0:8000".into(),
            max_observers: 16,

            // Hardware
            pins: PinMap::default(),
            zone_names: [
                "BATHROOM".into(),
                "LOADING-DOCK".into(),
                "DINING".into(),
                "WORKSHOP".into(),
                "CONFERENCE".into(),
                "ADMIN".into(),
                "RECEPTION".into(),
                "OUTSIDE".into(),
            ],

            // Timing
            counter_poll_ms: 50,  // 20 Hz
            policy_poll_ms: 100,  // 10 Hz
            beam_settle_ms: 50,
            servo_hold_ms: 150,
            display_dwell_ms: 800,

            // Display
            banner_text: "Server Started".into(),
            banner_hold_ms: 2000,

            // Policies
            count_broadcast: CountBroadcast::OnChange,
            sensor_failure: SensorFailurePolicy::default(),
        }
    }
}

/// Upper bound for the servo hold; longer holds stall the barrier motor.
const MAX_SERVO_HOLD_MS: u32 = 2000;

impl SystemConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_observers == 0 {
            return Err("max_observers must be at least 1");
        }
        if self.max_observers > MAX_SESSIONS {
            return Err("max_observers exceeds the executor's session capacity");
        }
        if self.counter_poll_ms == 0 || self.policy_poll_ms == 0 {
            return Err("poll intervals must be non-zero");
        }
        if self.servo_hold_ms == 0 || self.servo_hold_ms > MAX_SERVO_HOLD_MS {
            return Err("servo_hold_ms must be within 1..=2000");
        }
        if self.display_dwell_ms == 0 {
            return Err("display_dwell_ms must be non-zero");
        }
        if let SensorFailurePolicy::Restart { backoff_ms: 0, .. } = self.sensor_failure {
            return Err("sensor restart backoff must be non-zero");
        }
        if self.zone_names.iter().any(String::is_empty) {
            return Err("zone names must not be empty");
        }

        let mut seen = [false; 256];
        for pin in self.pins.all() {
            if seen[pin as usize] {
                return Err("pin map assigns a GPIO twice");
            }
            seen[pin as usize] = true;
        }
        Ok(())
    }
}
