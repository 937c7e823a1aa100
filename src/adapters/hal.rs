//! `embedded-hal` GPIO adapter.
//!
//! Implements [`DigitalIo`] over any set of `embedded-hal` 1.0 pins, so the
//! controller runs on whatever board support crate provides them (Linux
//! character-device GPIO, a microcontroller HAL, ...). Pins are looked up
//! by their BCM number; a pin used in the wrong direction is reported as
//! [`IoError::UnknownPin`].
//!
//! The servo expects a 50 Hz pulse train: 2 ms at one end stop, 1 ms at
//! the other. Releasing it turns the channel fully off.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;
use log::debug;

use crate::app::ports::{DigitalIo, ServoPulse};
use crate::error::IoError;
use crate::pins::Pin;

/// Servo frame period in microseconds (50 Hz).
const SERVO_PERIOD_US: u16 = 20_000;
const SERVO_MAX_US: u16 = 2_000;
const SERVO_MIN_US: u16 = 1_000;

pub struct HalIo<I, O, P> {
    inputs: Vec<(Pin, I)>,
    outputs: Vec<(Pin, O)>,
    servo: Option<(Pin, P)>,
}

impl<I, O, P> HalIo<I, O, P>
where
    I: InputPin,
    O: OutputPin,
    P: SetDutyCycle,
{
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            servo: None,
        }
    }

    pub fn with_input(mut self, pin: Pin, input: I) -> Self {
        self.inputs.push((pin, input));
        self
    }

    pub fn with_output(mut self, pin: Pin, output: O) -> Self {
        self.outputs.push((pin, output));
        self
    }

    pub fn with_servo(mut self, pin: Pin, channel: P) -> Self {
        self.servo = Some((pin, channel));
        self
    }
}

impl<I, O, P> Default for HalIo<I, O, P>
where
    I: InputPin,
    O: OutputPin,
    P: SetDutyCycle,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O, P> DigitalIo for HalIo<I, O, P>
where
    I: InputPin,
    O: OutputPin,
    P: SetDutyCycle,
{
    fn read(&mut self, pin: Pin) -> Result<bool, IoError> {
        let (_, input) = self
            .inputs
            .iter_mut()
            .find(|(p, _)| *p == pin)
            .ok_or(IoError::UnknownPin(pin))?;
        input.is_high().map_err(|_| IoError::ReadFailed(pin))
    }

    fn write(&mut self, pin: Pin, high: bool) -> Result<(), IoError> {
        let (_, output) = self
            .outputs
            .iter_mut()
            .find(|(p, _)| *p == pin)
            .ok_or(IoError::UnknownPin(pin))?;
        let result = if high {
            output.set_high()
        } else {
            output.set_low()
        };
        result.map_err(|_| IoError::WriteFailed(pin))
    }

    fn pwm(&mut self, pin: Pin, pulse: ServoPulse) -> Result<(), IoError> {
        let channel = match self.servo.as_mut() {
            Some((p, channel)) if *p == pin => channel,
            _ => return Err(IoError::UnknownPin(pin)),
        };
        debug!("HAL: servo GPIO {} → {:?}", pin, pulse);
        let result = match pulse {
            ServoPulse::Max => channel.set_duty_cycle_fraction(SERVO_MAX_US, SERVO_PERIOD_US),
            ServoPulse::Min => channel.set_duty_cycle_fraction(SERVO_MIN_US, SERVO_PERIOD_US),
            ServoPulse::Detached => channel.set_duty_cycle_fully_off(),
        };
        result.map_err(|_| IoError::PwmFailed(pin))
    }
}
