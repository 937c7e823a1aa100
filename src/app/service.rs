//! Application service: the hexagonal core.
//!
//! [`Controller`] owns the device state, the alarm policy, the hardware
//! bundle and the broadcast hub. Every mutation follows one path:
//!
//! ```text
//!   lock ─▶ mutate DeviceState ─▶ drive Hardware ─▶ broadcast ─▶ unlock
//! ```
//!
//! State and hardware share a single `embassy-sync` blocking mutex, so
//! mutations are linearizable and each observer sees changes in mutation
//! order. Nothing awaits while the lock is held; the servo hold is a timer
//! wait between two short critical sections.

use core::cell::RefCell;
use core::time::Duration;

use async_io_mini::Timer;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, info, warn};

use crate::config::{CountBroadcast, SystemConfig};
use crate::drivers::display::DisplayRequest;
use crate::error::{HubError, IoError};
use crate::fsm::context::{AlarmInputs, AlarmNotice, SirenCommand};
use crate::fsm::{AlarmPolicy, StateId};
use crate::pins::Pin;
use crate::rpc::hub::{BroadcastHub, Observer, ObserverId};

use super::commands::ClientCommand;
use super::events::{ServerMessage, Snapshot};
use super::ports::{Hardware, ServoPulse};
use super::state::{CountChange, DeviceState, OUTSIDE_ZONE};

struct Core<H> {
    state: DeviceState,
    policy: AlarmPolicy,
    hw: H,
}

/// Coalescing display request slot: the latest request wins.
pub type DisplaySignal = Signal<CriticalSectionRawMutex, DisplayRequest>;

pub struct Controller<H: Hardware> {
    config: SystemConfig,
    core: Mutex<CriticalSectionRawMutex, RefCell<Core<H>>>,
    hub: BroadcastHub,
    display: DisplaySignal,
}

impl<H: Hardware> Controller<H> {
    /// Take ownership of the hardware and drive every output to its
    /// startup level: lights off, RC actuator HIGH (off), laser off,
    /// servo released.
    pub fn new(config: SystemConfig, mut hw: H) -> Self {
        let pins = &config.pins;
        for pin in pins.zone_lights {
            log_io(hw.write(pin, false));
        }
        log_io(hw.write(pins.rc_motor, true));
        log_io(hw.write(pins.laser_emitter, false));
        log_io(hw.pwm(pins.servo, ServoPulse::Detached));
        if let Err(e) = hw.show_digit(0) {
            warn!("CTRL: counter display init failed: {}", e);
        }

        let state = DeviceState::new(&config.zone_names);
        let hub = BroadcastHub::new(config.max_observers);
        info!("CTRL: outputs initialised, alarm disarmed");

        Self {
            config,
            core: Mutex::new(RefCell::new(Core {
                state,
                policy: AlarmPolicy::new(),
                hw,
            })),
            hub,
            display: Signal::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Request slot consumed by the display task.
    pub fn display_requests(&self) -> &DisplaySignal {
        &self.display
    }

    pub fn snapshot(&self) -> Snapshot {
        self.with_core(|core| core.state.snapshot())
    }

    /// Copy of the full device state.
    pub fn state(&self) -> DeviceState {
        self.with_core(|core| core.state.clone())
    }

    pub fn alarm_state(&self) -> StateId {
        self.with_core(|core| core.policy.state())
    }

    /// Run `f` against the hardware bundle under the state lock.
    pub fn with_hardware<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        self.with_core(|core| f(&mut core.hw))
    }

    // ── Observers ─────────────────────────────────────────────

    /// Register an observer and queue its snapshot. Both happen under the
    /// state lock, so no change can slip in between.
    pub fn connect(&self) -> Result<Observer, HubError> {
        self.with_core(|core| {
            let observer = self.hub.register()?;
            let snapshot = ServerMessage::Snapshot(core.state.snapshot());
            self.hub.send_to(observer.id(), &snapshot);
            Ok(observer)
        })
    }

    pub fn disconnect(&self, id: ObserverId) {
        self.hub.unregister(id);
    }

    // ── Client commands ───────────────────────────────────────

    /// Parse and apply one client message. Changes are broadcast to all
    /// observers; status replies and errors go to `from` only.
    pub async fn handle_message(&self, from: ObserverId, text: &str) {
        match ClientCommand::parse(text) {
            Ok(command) => self.apply(from, command).await,
            Err(e) => {
                warn!("CTRL: observer {} sent bad message: {}", from, e);
                self.hub.send_to(
                    from,
                    &ServerMessage::Error {
                        error: e.to_string(),
                    },
                );
            }
        }
    }

    async fn apply(&self, from: ObserverId, command: ClientCommand) {
        debug!("CTRL: observer {} → {:?}", from, command);
        match command {
            ClientCommand::ToggleLight(index) => {
                self.toggle_light(index);
            }
            ClientCommand::ToggleServo => {
                self.toggle_servo().await;
            }
            ClientCommand::ToggleRcMotor => {
                self.toggle_rc_motor();
            }
            ClientCommand::Status => {
                self.hub
                    .send_to(from, &ServerMessage::Status { status: "running" });
            }
        }
    }

    /// Flip one zone light. Out-of-range indices are ignored and return
    /// `None`.
    pub fn toggle_light(&self, index: i64) -> Option<bool> {
        let zone = usize::try_from(index).ok();
        let result = zone.and_then(|zone| {
            self.with_core(|core| {
                let on = core.state.toggle_zone(zone)?;
                log_io(core.hw.write(self.config.pins.zone_lights[zone], on));
                self.hub.broadcast(&ServerMessage::Light {
                    led_index: zone as u8,
                    state: on,
                });
                if zone == OUTSIDE_ZONE {
                    self.hub
                        .broadcast(&ServerMessage::OutsideLight { outside_led: on });
                }
                Some(on)
            })
        });

        match (zone, result) {
            (Some(zone), Some(on)) => {
                info!("CTRL: zone {} → {}", zone, on_off(on));
                self.request_display(DisplayRequest::Zone(zone));
            }
            _ => warn!("CTRL: ignoring toggle of unknown zone {}", index),
        }
        result
    }

    /// Flip the RC actuator. The line is active LOW.
    pub fn toggle_rc_motor(&self) -> bool {
        let active = self.with_core(|core| {
            let active = core.state.toggle_rc();
            log_io(core.hw.write(self.config.pins.rc_motor, !active));
            self.hub.broadcast(&ServerMessage::RcMotor {
                rc_motor_state: active,
            });
            active
        });
        info!("CTRL: RC actuator {}", on_off(active));
        self.request_display(DisplayRequest::RcMotor);
        active
    }

    /// Flip the barrier: drive the servo to the new end stop, hold for
    /// `servo_hold_ms`, then release it. A release belonging to an older
    /// pulse is skipped so it never cuts a newer pulse short.
    pub async fn toggle_servo(&self) -> bool {
        let servo = self.config.pins.servo;
        let (engaged, seq) = self.with_core(|core| {
            let (engaged, seq) = core.state.toggle_servo();
            let pulse = if engaged {
                ServoPulse::Max
            } else {
                ServoPulse::Min
            };
            log_io(core.hw.pwm(servo, pulse));
            self.hub.broadcast(&ServerMessage::Servo {
                servo_state: engaged,
            });
            (engaged, seq)
        });
        info!("CTRL: barrier {}", if engaged { "open" } else { "closed" });
        self.request_display(DisplayRequest::Servo);

        Timer::after(Duration::from_millis(u64::from(self.config.servo_hold_ms))).await;

        self.with_core(|core| {
            if core.state.servo_pulse_seq() == seq {
                log_io(core.hw.pwm(servo, ServoPulse::Detached));
            } else {
                debug!("CTRL: servo pulse {} superseded, release skipped", seq);
            }
        });
        engaged
    }

    // ── Sensor-driven updates ─────────────────────────────────

    /// Sample one input pin.
    pub fn read_input(&self, pin: Pin) -> Result<bool, IoError> {
        self.with_core(|core| core.hw.read(pin))
    }

    /// Apply a turnstile edge. Clamps at zero; whether a no-op is rendered
    /// and broadcast depends on `count_broadcast`.
    pub fn adjust_people_count(&self, delta: i32) -> CountChange {
        let change = self.with_core(|core| {
            let change = core.state.adjust_people_count(delta);
            let publish = change.changed()
                || self.config.count_broadcast == CountBroadcast::EveryAdjustment;
            if publish {
                if let Err(e) = core.hw.show_digit((change.after % 10) as u8) {
                    warn!("CTRL: counter display failed: {}", e);
                }
                self.hub.broadcast(&ServerMessage::PeopleCount {
                    people_count: change.after,
                });
            }
            change
        });
        if change.changed() {
            info!("CTRL: people count {} → {}", change.before, change.after);
        } else {
            debug!("CTRL: people count steady at {}", change.after);
        }
        change
    }

    /// Advance the alarm policy by one tick and apply its outputs,
    /// all under one lock. `beam_broken` is `None` when the beam was not
    /// sampled. Returns the resulting state.
    pub fn run_alarm_cycle(&self, dark: bool, beam_broken: Option<bool>) -> StateId {
        let pins = &self.config.pins;
        let (state, outside_changed) = self.with_core(|core| {
            let inputs = AlarmInputs {
                dark,
                beam_broken,
                siren_playing: core.hw.is_playing(),
            };
            let ctx = core.policy.cycle(inputs);
            let commands = ctx.commands;
            let notices = ctx.notices.clone();
            let (armed, triggered) = (ctx.armed, ctx.triggered);

            if let Some(on) = commands.laser {
                log_io(core.hw.write(pins.laser_emitter, on));
            }
            let mut outside_changed = false;
            if let Some(on) = commands.outside_light {
                outside_changed = core.state.set_outside_auto(on);
                log_io(core.hw.write(pins.zone_lights[OUTSIDE_ZONE], on));
            }
            match commands.siren {
                SirenCommand::Keep => {}
                SirenCommand::Start => {
                    if let Err(e) = core.hw.play() {
                        warn!("CTRL: siren failed to start: {}", e);
                    }
                }
                SirenCommand::Stop => core.hw.stop(),
            }

            if armed {
                core.state.arm();
                if triggered {
                    core.state.trigger();
                }
            } else {
                core.state.disarm();
            }

            for notice in notices {
                let msg = match notice {
                    AlarmNotice::Alarm(alarm) => ServerMessage::Alarm { alarm },
                    AlarmNotice::OutsideLight(outside_led) => {
                        ServerMessage::OutsideLight { outside_led }
                    }
                };
                self.hub.broadcast(&msg);
            }
            (core.policy.state(), outside_changed)
        });

        if outside_changed {
            self.request_display(DisplayRequest::Zone(OUTSIDE_ZONE));
        }
        state
    }

    /// Per-cycle light-policy heartbeat.
    pub fn heartbeat(&self, dark: bool) {
        self.with_core(|core| {
            self.hub.broadcast(&ServerMessage::LightStatus {
                light_status: u8::from(dark),
                outside_led_auto: core.state.outside_auto(),
            });
        });
    }

    // ── Internal ──────────────────────────────────────────────

    fn with_core<R>(&self, f: impl FnOnce(&mut Core<H>) -> R) -> R {
        self.core.lock(|cell| f(&mut cell.borrow_mut()))
    }

    fn request_display(&self, request: DisplayRequest) {
        self.display.signal(request);
    }
}

/// Actuator failures never undo a state change; the next change to the
/// same output re-asserts it.
fn log_io(result: Result<(), IoError>) {
    if let Err(e) = result {
        warn!("CTRL: actuator write failed: {}", e);
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
