//! Unified error types for the site controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! supervisor and task loops' error handling uniform. The hardware-facing
//! variants are `Copy` so they can be passed through the sensor supervisor
//! without allocation.

use core::fmt;

use crate::pins::Pin;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A digital input/output operation failed.
    Io(IoError),
    /// The text or numeric display rejected a write.
    Display(DisplayError),
    /// The sound device failed.
    Sound(SoundError),
    /// A client link failed.
    Link(LinkError),
    /// The broadcast hub refused an operation.
    Hub(HubError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Sound(e) => write!(f, "sound: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Hub(e) => write!(f, "hub: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Digital I/O errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// Reading an input pin failed.
    ReadFailed(Pin),
    /// Driving an output pin failed.
    WriteFailed(Pin),
    /// Setting a servo pulse failed.
    PwmFailed(Pin),
    /// The pin is not configured for the requested direction.
    UnknownPin(Pin),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed(pin) => write!(f, "read of GPIO {pin} failed"),
            Self::WriteFailed(pin) => write!(f, "write to GPIO {pin} failed"),
            Self::PwmFailed(pin) => write!(f, "PWM on GPIO {pin} failed"),
            Self::UnknownPin(pin) => write!(f, "GPIO {pin} not configured"),
        }
    }
}

impl std::error::Error for IoError {}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The bus transaction to the display failed.
    BusFailed,
    /// The value cannot be shown on this display.
    Unrenderable,
    /// A segment/backlight pin could not be driven.
    Io(IoError),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusFailed => write!(f, "display bus write failed"),
            Self::Unrenderable => write!(f, "value cannot be rendered"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DisplayError {}

impl From<IoError> for DisplayError {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Sound errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundError {
    /// The alarm clip could not be loaded.
    ClipUnavailable,
    /// The audio device refused playback.
    DeviceFailed,
}

impl fmt::Display for SoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClipUnavailable => write!(f, "alarm clip unavailable"),
            Self::DeviceFailed => write!(f, "audio device failed"),
        }
    }
}

impl std::error::Error for SoundError {}

impl From<SoundError> for Error {
    fn from(e: SoundError) -> Self {
        Self::Sound(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The peer went away mid-operation.
    Disconnected,
    /// Socket-level failure (carries the `io::ErrorKind` text).
    Io(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "peer disconnected"),
            Self::Io(kind) => write!(f, "socket error: {kind}"),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<std::io::Error> for LinkError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof => Self::Disconnected,
            kind => Self::Io(kind.to_string()),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Hub errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    /// `max_observers` clients are already registered.
    Full,
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "observer limit reached"),
        }
    }
}

impl std::error::Error for HubError {}

impl From<HubError> for Error {
    fn from(e: HubError) -> Self {
        Self::Hub(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
