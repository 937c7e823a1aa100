//! Default GPIO assignments for the site controller board (BCM numbering).
//!
//! These are the factory defaults used by [`PinMap::default`]; a deployment
//! overrides them through the config file rather than editing this module.
//!
//! [`PinMap::default`]: crate::config::PinMap

/// A BCM GPIO number.
pub type Pin = u8;

// ---------------------------------------------------------------------------
// Zone lights (relay / LED outputs, active HIGH)
// ---------------------------------------------------------------------------

/// One output per zone. The last entry is the outside light, which the
/// alarm policy also drives automatically at night.
pub const ZONE_LIGHT_GPIOS: [Pin; 8] = [4, 17, 27, 22, 5, 6, 13, 14];

// ---------------------------------------------------------------------------
// Intrusion detection
// ---------------------------------------------------------------------------

/// Digital input: ambient light sensor. HIGH = dark (inverted module).
pub const LIGHT_SENSOR_GPIO: Pin = 16;
/// Digital input: laser receiver with pull-down. HIGH = beam broken.
pub const BEAM_RECEIVER_GPIO: Pin = 12;
/// Digital output: laser emitter (active HIGH).
pub const LASER_EMITTER_GPIO: Pin = 7;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Barrier servo signal (50 Hz PWM).
pub const SERVO_GPIO: Pin = 18;
/// RC motor relay. LOW = running, HIGH = stopped.
pub const RC_MOTOR_GPIO: Pin = 15;

// ---------------------------------------------------------------------------
// Turnstile contacts (snap-action switches, pull-up, pressed = LOW)
// ---------------------------------------------------------------------------

pub const ENTRY_SWITCH_GPIO: Pin = 20;
pub const EXIT_SWITCH_GPIO: Pin = 21;

// ---------------------------------------------------------------------------
// Seven-segment display, segments a..g
// ---------------------------------------------------------------------------

pub const SEGMENT_GPIOS: [Pin; 7] = [10, 19, 26, 9, 11, 23, 24];
