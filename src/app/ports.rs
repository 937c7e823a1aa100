//! Port traits: the hexagonal boundary between the control core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (GPIO, displays, audio, config storage) implement these
//! traits. The [`Controller`](super::service::Controller) consumes them via
//! generics, so the core never touches hardware directly and runs unchanged
//! against the recording mocks in `tests/integration/mock_hw.rs`.

use crate::config::SystemConfig;
use crate::error::{DisplayError, IoError, SoundError};
use crate::pins::Pin;

// ───────────────────────────────────────────────────────────────
// Digital I/O port (driven adapter: domain ↔ GPIO)
// ───────────────────────────────────────────────────────────────

/// Servo drive level for a [`DigitalIo::pwm`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoPulse {
    /// Full deflection one way (barrier open).
    Max,
    /// Full deflection the other way (barrier closed).
    Min,
    /// No pulse train: the servo goes limp and holds no torque.
    Detached,
}

/// Pin-level access to the board.
pub trait DigitalIo {
    /// Sample an input. `true` = HIGH.
    fn read(&mut self, pin: Pin) -> Result<bool, IoError>;

    /// Drive an output. `true` = HIGH.
    fn write(&mut self, pin: Pin, high: bool) -> Result<(), IoError>;

    /// Set the servo pulse on a PWM-capable pin.
    fn pwm(&mut self, pin: Pin, pulse: ServoPulse) -> Result<(), IoError>;
}

// ───────────────────────────────────────────────────────────────
// Display ports
// ───────────────────────────────────────────────────────────────

/// Character display (16x2 LCD behind an I²C expander).
pub trait TextDisplay {
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Write `text` at the cursor. `'\n'` moves to the second row.
    fn write(&mut self, text: &str) -> Result<(), DisplayError>;
}

/// Single-digit numeric display for the people counter.
pub trait NumericDisplay {
    /// Show `digit` (0–9). Anything larger is [`DisplayError::Unrenderable`].
    fn show_digit(&mut self, digit: u8) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Sound port
// ───────────────────────────────────────────────────────────────

/// Alarm siren playback.
pub trait SoundPort {
    /// Start the alarm clip from the beginning.
    fn play(&mut self) -> Result<(), SoundError>;

    /// Stop playback. A no-op when nothing is playing.
    fn stop(&mut self);

    fn is_playing(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Hardware bundle
// ───────────────────────────────────────────────────────────────

/// Everything the controller drives while holding its state lock.
///
/// Blanket-implemented; an adapter satisfies it by implementing the three
/// ports on one type (see [`Board`](crate::adapters::board::Board)).
pub trait Hardware: DigitalIo + NumericDisplay + SoundPort {}

impl<T: DigitalIo + NumericDisplay + SoundPort> Hardware for T {}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config could not be parsed.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError(std::io::Error),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted(detail) => write!(f, "config corrupted: {}", detail),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(e) => Some(e),
            _ => None,
        }
    }
}
