//! Shared mutable context threaded through every alarm handler.
//!
//! `AlarmContext` is the blackboard the state handlers read from and write
//! to: the latest sensor inputs, the latched alarm flags, and the output
//! commands and notices the [`Controller`](crate::app::service::Controller)
//! applies after each tick while it still holds the state lock.

use heapless::Vec;

// ---------------------------------------------------------------------------
// Inputs (written by the controller before each tick)
// ---------------------------------------------------------------------------

/// One policy cycle's worth of sensor readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmInputs {
    /// Ambient light sensor reads dark.
    pub dark: bool,
    /// Beam receiver level. `None` when the beam was not sampled this tick
    /// (it is only sampled while armed).
    pub beam_broken: Option<bool>,
    /// The siren is currently audible.
    pub siren_playing: bool,
}

// ---------------------------------------------------------------------------
// Outputs (written by handlers, consumed by the controller)
// ---------------------------------------------------------------------------

/// What to do with the siren after this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SirenCommand {
    #[default]
    Keep,
    Start,
    Stop,
}

/// Actuator requests. `None` leaves the output alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmCommands {
    pub laser: Option<bool>,
    /// Policy-driven outside light (sets the auto flag with it).
    pub outside_light: Option<bool>,
    pub siren: SirenCommand,
}

/// A change observers must hear about, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmNotice {
    Alarm(bool),
    OutsideLight(bool),
}

// ---------------------------------------------------------------------------
// AlarmContext
// ---------------------------------------------------------------------------

pub struct AlarmContext {
    // -- Sensor data --
    pub inputs: AlarmInputs,

    // -- Latched flags --
    /// Beam breaks are acted upon. Set on arming, cleared on disarm.
    pub armed: bool,
    /// An intrusion was detected. Only ever set while `armed`.
    pub triggered: bool,

    // -- Outputs --
    pub commands: AlarmCommands,
    pub notices: Vec<AlarmNotice, 4>,
}

impl AlarmContext {
    pub fn new() -> Self {
        Self {
            inputs: AlarmInputs::default(),
            armed: false,
            triggered: false,
            commands: AlarmCommands::default(),
            notices: Vec::new(),
        }
    }

    /// Load fresh inputs and clear last tick's outputs.
    pub fn begin_cycle(&mut self, inputs: AlarmInputs) {
        self.inputs = inputs;
        self.commands = AlarmCommands::default();
        self.notices.clear();
    }

    /// Queue a notice. At most two are produced per transition, so the
    /// buffer cannot overflow within one tick.
    pub fn notify(&mut self, notice: AlarmNotice) {
        if self.notices.push(notice).is_err() {
            log::warn!("alarm notice dropped: {:?}", notice);
        }
    }

    /// Beam was sampled this tick and reads broken.
    pub fn beam_broken(&self) -> bool {
        self.inputs.beam_broken == Some(true)
    }
}

impl Default for AlarmContext {
    fn default() -> Self {
        Self::new()
    }
}
