//! Seven-segment digit renderer.
//!
//! ```text
//!    aaa
//!   f   b
//!    ggg
//!   e   c
//!    ddd
//! ```
//!
//! Segments are driven active HIGH through [`DigitalIo`], one pin each.

use crate::app::ports::DigitalIo;
use crate::error::DisplayError;
use crate::pins::Pin;

/// Segment levels `[a, b, c, d, e, f, g]` for digits 0–9.
pub const DIGIT_SEGMENTS: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],     // 0
    [false, true, true, false, false, false, false], // 1
    [true, true, false, true, true, false, true],    // 2
    [true, true, true, true, false, false, true],    // 3
    [false, true, true, false, false, true, true],   // 4
    [true, false, true, true, false, true, true],    // 5
    [true, false, true, true, true, true, true],     // 6
    [true, true, true, false, false, false, false],  // 7
    [true, true, true, true, true, true, true],      // 8
    [true, true, true, true, false, true, true],     // 9
];

/// A single common-cathode digit wired to seven GPIOs.
#[derive(Debug, Clone, Copy)]
pub struct SevenSegment {
    pins: [Pin; 7],
}

impl SevenSegment {
    pub fn new(pins: [Pin; 7]) -> Self {
        Self { pins }
    }

    /// Light the segments for `digit`. Digits above 9 are rejected before
    /// any pin is touched.
    pub fn render(&self, io: &mut impl DigitalIo, digit: u8) -> Result<(), DisplayError> {
        let segments = DIGIT_SEGMENTS
            .get(usize::from(digit))
            .ok_or(DisplayError::Unrenderable)?;
        for (&pin, &lit) in self.pins.iter().zip(segments) {
            io.write(pin, lit)?;
        }
        Ok(())
    }
}
