//! Outbound messages.
//!
//! Every state change the [`Controller`](super::service::Controller) makes
//! is described by a [`ServerMessage`] and pushed through the
//! [`BroadcastHub`](crate::rpc::hub::BroadcastHub). The serde shape of each
//! variant is the JSON object clients receive.

use serde::Serialize;

use super::state::ZONE_COUNT;

/// Full device view sent once to every observer on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub initial_states: [bool; ZONE_COUNT],
    pub servo_state: bool,
    pub people_count: u32,
    pub rc_motor_state: bool,
}

/// Server → client messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// Connect-time snapshot.
    Snapshot(Snapshot),

    /// A zone light changed.
    Light { led_index: u8, state: bool },

    /// The barrier servo changed position.
    Servo { servo_state: bool },

    /// The RC actuator was switched.
    RcMotor { rc_motor_state: bool },

    /// The people count changed (or was re-asserted).
    PeopleCount { people_count: u32 },

    /// The intrusion alarm started or stopped.
    Alarm { alarm: bool },

    /// The outside light changed, by hand or by the night policy.
    OutsideLight { outside_led: bool },

    /// Light-policy heartbeat, once per cycle.
    LightStatus { light_status: u8, outside_led_auto: bool },

    /// Reply to a status request.
    Status { status: &'static str },

    /// The requester's last message could not be processed.
    Error { error: String },
}

impl ServerMessage {
    /// Short tag for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Light { .. } => "light",
            Self::Servo { .. } => "servo",
            Self::RcMotor { .. } => "rc_motor",
            Self::PeopleCount { .. } => "people_count",
            Self::Alarm { .. } => "alarm",
            Self::OutsideLight { .. } => "outside_led",
            Self::LightStatus { .. } => "light_status",
            Self::Status { .. } => "status",
            Self::Error { .. } => "error",
        }
    }

    /// Serialize to the wire JSON text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
