//! Board adapter: bundles the peripherals behind the [`Hardware`] ports.
//!
//! Combines a [`DigitalIo`] backend and a [`SoundPort`] into one value the
//! controller can own. The numeric display is the seven-segment digit,
//! rendered through the same I/O backend.
//!
//! [`Hardware`]: crate::app::ports::Hardware

use crate::app::ports::{DigitalIo, NumericDisplay, ServoPulse, SoundPort};
use crate::drivers::segment::SevenSegment;
use crate::error::{DisplayError, IoError, SoundError};
use crate::pins::Pin;

pub struct Board<IO, S> {
    io: IO,
    sound: S,
    digit: SevenSegment,
}

impl<IO: DigitalIo, S: SoundPort> Board<IO, S> {
    pub fn new(io: IO, sound: S, segment_pins: [Pin; 7]) -> Self {
        Self {
            io,
            sound,
            digit: SevenSegment::new(segment_pins),
        }
    }

    pub fn io(&self) -> &IO {
        &self.io
    }
}

// ── DigitalIo ─────────────────────────────────────────────────

impl<IO: DigitalIo, S> DigitalIo for Board<IO, S> {
    fn read(&mut self, pin: Pin) -> Result<bool, IoError> {
        self.io.read(pin)
    }

    fn write(&mut self, pin: Pin, high: bool) -> Result<(), IoError> {
        self.io.write(pin, high)
    }

    fn pwm(&mut self, pin: Pin, pulse: ServoPulse) -> Result<(), IoError> {
        self.io.pwm(pin, pulse)
    }
}

// ── NumericDisplay ────────────────────────────────────────────

impl<IO: DigitalIo, S> NumericDisplay for Board<IO, S> {
    fn show_digit(&mut self, digit: u8) -> Result<(), DisplayError> {
        self.digit.render(&mut self.io, digit)
    }
}

// ── SoundPort ─────────────────────────────────────────────────

impl<IO, S: SoundPort> SoundPort for Board<IO, S> {
    fn play(&mut self) -> Result<(), SoundError> {
        self.sound.play()
    }

    fn stop(&mut self) {
        self.sound.stop();
    }

    fn is_playing(&self) -> bool {
        self.sound.is_playing()
    }
}
