//! Host simulation adapters.
//!
//! Used by the binary when no GPIO backend is wired in, and handy for
//! driving the controller by hand. Inputs idle at their inactive levels
//! (bright, beam intact, contacts released); outputs are remembered and
//! logged at `debug`.

use std::collections::HashMap;

use embassy_time::{Duration, Instant};
use log::{debug, info};

use crate::app::ports::{DigitalIo, ServoPulse, SoundPort, TextDisplay};
use crate::config::PinMap;
use crate::error::{DisplayError, IoError, SoundError};
use crate::pins::Pin;

// ── Digital I/O ───────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimIo {
    inputs: HashMap<Pin, bool>,
    outputs: HashMap<Pin, bool>,
    servo: HashMap<Pin, ServoPulse>,
}

impl SimIo {
    /// Inputs at rest for `pins`: light sensor LOW (bright), beam LOW
    /// (intact), contacts HIGH (released).
    pub fn new(pins: &PinMap) -> Self {
        let mut io = Self::default();
        io.set_input(pins.light_sensor, false);
        io.set_input(pins.beam_receiver, false);
        io.set_input(pins.entry_switch, true);
        io.set_input(pins.exit_switch, true);
        io
    }

    pub fn set_input(&mut self, pin: Pin, level: bool) {
        self.inputs.insert(pin, level);
    }

    pub fn output(&self, pin: Pin) -> Option<bool> {
        self.outputs.get(&pin).copied()
    }

    pub fn servo(&self, pin: Pin) -> Option<ServoPulse> {
        self.servo.get(&pin).copied()
    }
}

impl DigitalIo for SimIo {
    fn read(&mut self, pin: Pin) -> Result<bool, IoError> {
        self.inputs
            .get(&pin)
            .copied()
            .ok_or(IoError::UnknownPin(pin))
    }

    fn write(&mut self, pin: Pin, high: bool) -> Result<(), IoError> {
        if self.inputs.contains_key(&pin) {
            return Err(IoError::UnknownPin(pin));
        }
        if self.outputs.insert(pin, high) != Some(high) {
            debug!("SIM: GPIO {} → {}", pin, if high { "HIGH" } else { "LOW" });
        }
        Ok(())
    }

    fn pwm(&mut self, pin: Pin, pulse: ServoPulse) -> Result<(), IoError> {
        debug!("SIM: servo GPIO {} → {:?}", pin, pulse);
        self.servo.insert(pin, pulse);
        Ok(())
    }
}

// ── Sound ─────────────────────────────────────────────────────

/// A siren that "plays" for a fixed clip length.
#[derive(Debug)]
pub struct SimSound {
    clip: Duration,
    started: Option<Instant>,
}

impl SimSound {
    pub fn new(clip: Duration) -> Self {
        Self {
            clip,
            started: None,
        }
    }
}

impl SoundPort for SimSound {
    fn play(&mut self) -> Result<(), SoundError> {
        info!("SIM: siren playing");
        self.started = Some(Instant::now());
        Ok(())
    }

    fn stop(&mut self) {
        if self.started.take().is_some() {
            info!("SIM: siren stopped");
        }
    }

    fn is_playing(&self) -> bool {
        self.started.is_some_and(|t| t.elapsed() < self.clip)
    }
}

// ── Text display ──────────────────────────────────────────────

/// Mirrors the 16x2 LCD into the log.
#[derive(Debug, Default)]
pub struct LogDisplay {
    text: String,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextDisplay for LogDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.text.clear();
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), DisplayError> {
        self.text.push_str(text);
        info!("LCD: {}", self.text.replace('\n', " | "));
        Ok(())
    }
}
