//! Mock hardware and client adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/PWM lines, and provides an in-memory
//! client link so sessions run without sockets.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use serde_json::Value;
use sitegate::app::events::ServerMessage;
use sitegate::app::ports::{DigitalIo, NumericDisplay, ServoPulse, SoundPort, TextDisplay};
use sitegate::app::service::Controller;
use sitegate::config::SystemConfig;
use sitegate::error::{DisplayError, IoError, LinkError, SoundError};
use sitegate::pins::Pin;
use sitegate::rpc::hub::Observer;
use sitegate::rpc::transport::ObserverLink;

// ── MockHardware ──────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockHardware {
    /// Steady input levels.
    levels: HashMap<Pin, bool>,
    /// Per-pin scripted levels, consumed one per read before falling back
    /// to the steady level.
    script: HashMap<Pin, VecDeque<bool>>,
    /// Per-pin count of upcoming reads that fail.
    read_failures: HashMap<Pin, u32>,
    /// Pins whose reads always fail.
    dead_inputs: Vec<Pin>,
    pub writes: Vec<(Pin, bool)>,
    pub pulses: Vec<(Pin, ServoPulse)>,
    pub digits: Vec<u8>,
    pub plays: u32,
    pub stops: u32,
    pub playing: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, pin: Pin, high: bool) {
        self.levels.insert(pin, high);
    }

    pub fn script_input(&mut self, pin: Pin, levels: &[bool]) {
        self.script.entry(pin).or_default().extend(levels);
        if let Some(&last) = levels.last() {
            self.levels.insert(pin, last);
        }
    }

    pub fn fail_reads(&mut self, pin: Pin, count: u32) {
        self.read_failures.insert(pin, count);
    }

    pub fn kill_input(&mut self, pin: Pin) {
        self.dead_inputs.push(pin);
    }

    /// Last level written to `pin`.
    pub fn output(&self, pin: Pin) -> Option<bool> {
        self.writes
            .iter()
            .rev()
            .find(|(p, _)| *p == pin)
            .map(|&(_, high)| high)
    }

    pub fn pulses_on(&self, pin: Pin) -> Vec<ServoPulse> {
        self.pulses
            .iter()
            .filter(|(p, _)| *p == pin)
            .map(|&(_, pulse)| pulse)
            .collect()
    }

    /// Finish the current clip as if it had played out.
    pub fn finish_clip(&mut self) {
        self.playing = false;
    }
}

impl DigitalIo for MockHardware {
    fn read(&mut self, pin: Pin) -> Result<bool, IoError> {
        if self.dead_inputs.contains(&pin) {
            return Err(IoError::ReadFailed(pin));
        }
        if let Some(left) = self.read_failures.get_mut(&pin) {
            if *left > 0 {
                *left -= 1;
                return Err(IoError::ReadFailed(pin));
            }
        }
        if let Some(level) = self.script.get_mut(&pin).and_then(VecDeque::pop_front) {
            return Ok(level);
        }
        Ok(self.levels.get(&pin).copied().unwrap_or(false))
    }

    fn write(&mut self, pin: Pin, high: bool) -> Result<(), IoError> {
        self.writes.push((pin, high));
        Ok(())
    }

    fn pwm(&mut self, pin: Pin, pulse: ServoPulse) -> Result<(), IoError> {
        self.pulses.push((pin, pulse));
        Ok(())
    }
}

impl NumericDisplay for MockHardware {
    fn show_digit(&mut self, digit: u8) -> Result<(), DisplayError> {
        if digit > 9 {
            return Err(DisplayError::Unrenderable);
        }
        self.digits.push(digit);
        Ok(())
    }
}

impl SoundPort for MockHardware {
    fn play(&mut self) -> Result<(), SoundError> {
        self.plays += 1;
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

// ── Controller fixtures ───────────────────────────────────────

/// Defaults with every timer shortened so tests finish quickly.
#[allow(dead_code)]
pub fn fast_config() -> SystemConfig {
    SystemConfig {
        counter_poll_ms: 1,
        policy_poll_ms: 1,
        beam_settle_ms: 1,
        servo_hold_ms: 5,
        display_dwell_ms: 2,
        banner_hold_ms: 5,
        ..SystemConfig::default()
    }
}

/// A controller whose inputs all sit at their idle levels: bright, beam
/// intact, both turnstile contacts released.
#[allow(dead_code)]
pub fn controller_with(config: SystemConfig) -> Controller<MockHardware> {
    let mut hw = MockHardware::new();
    hw.set_input(config.pins.entry_switch, true);
    hw.set_input(config.pins.exit_switch, true);
    Controller::new(config, hw)
}

#[allow(dead_code)]
pub fn controller() -> Controller<MockHardware> {
    controller_with(fast_config())
}

/// Everything queued for `observer`, decoded.
#[allow(dead_code)]
pub fn drain(observer: &Observer) -> Vec<Value> {
    std::iter::from_fn(|| observer.try_next())
        .map(|text| serde_json::from_str(&text).expect("outbound message is JSON"))
        .collect()
}

#[allow(dead_code)]
pub fn json(msg: &ServerMessage) -> Value {
    serde_json::to_value(msg).expect("message serializes")
}

// ── In-memory client link ─────────────────────────────────────

/// Both directions of one client connection. The test holds the pipe and
/// hands [`Pipe::link`] to the session.
pub struct Pipe {
    /// `None` closes the connection.
    to_server: Channel<CriticalSectionRawMutex, Option<String>, 16>,
    to_client: Channel<CriticalSectionRawMutex, String, 64>,
}

#[allow(dead_code)]
impl Pipe {
    pub fn new() -> Self {
        Self {
            to_server: Channel::new(),
            to_client: Channel::new(),
        }
    }

    pub fn link(&self) -> PipeLink<'_> {
        PipeLink { pipe: self }
    }

    pub async fn send(&self, text: &str) {
        self.to_server.send(Some(text.to_owned())).await;
    }

    pub async fn close(&self) {
        self.to_server.send(None).await;
    }

    pub async fn recv(&self) -> Value {
        let text = self.to_client.receive().await;
        serde_json::from_str(&text).expect("server sent JSON")
    }

    pub fn try_recv(&self) -> Option<Value> {
        self.to_client
            .try_receive()
            .ok()
            .map(|text| serde_json::from_str(&text).expect("server sent JSON"))
    }
}

pub struct PipeLink<'a> {
    pipe: &'a Pipe,
}

impl ObserverLink for PipeLink<'_> {
    async fn recv(&mut self) -> Result<Option<String>, LinkError> {
        Ok(self.pipe.to_server.receive().await)
    }

    async fn send(&mut self, text: &str) -> Result<(), LinkError> {
        self.pipe.to_client.send(text.to_owned()).await;
        Ok(())
    }
}

/// A link whose socket has already failed.
pub struct BrokenLink;

impl ObserverLink for BrokenLink {
    async fn recv(&mut self) -> Result<Option<String>, LinkError> {
        Err(LinkError::Io("connection timed out".into()))
    }

    async fn send(&mut self, _text: &str) -> Result<(), LinkError> {
        Err(LinkError::Disconnected)
    }
}

// ── Recording text display ────────────────────────────────────

/// Keeps every completed screen. Cloned handles share one history.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    screens: Rc<RefCell<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screens(&self) -> Vec<String> {
        self.screens.borrow().clone()
    }
}

impl TextDisplay for RecordingDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.screens.borrow_mut().push(String::new());
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), DisplayError> {
        let mut screens = self.screens.borrow_mut();
        match screens.last_mut() {
            Some(screen) => screen.push_str(text),
            None => screens.push(text.to_owned()),
        }
        Ok(())
    }
}
