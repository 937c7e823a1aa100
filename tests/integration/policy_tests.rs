//! Sensor-task tests: the light policy cycle, the turnstile counter, the
//! failure supervisor and the display task, all against mock hardware.

use std::time::Duration;

use async_io_mini::Timer;
use futures_lite::future::{self, block_on};
use serde_json::{Value, json};
use sitegate::app::state::AlarmFlags;
use sitegate::config::{SensorFailurePolicy, SystemConfig};
use sitegate::drivers::display::{self, DisplayRequest};
use sitegate::error::IoError;
use sitegate::fsm::StateId;
use sitegate::sensors::counter::{self, Direction};
use sitegate::sensors::policy;

use super::mock_hw::{RecordingDisplay, controller, controller_with, drain, fast_config};

/// Drop the per-cycle heartbeats so assertions see only state changes.
fn changes(messages: Vec<Value>) -> Vec<Value> {
    messages
        .into_iter()
        .filter(|m| m.get("light_status").is_none())
        .collect()
}

/// Run `task` until it finishes or `ms` elapse.
fn run_for<F: Future<Output = ()>>(ms: u64, task: F) {
    block_on(future::or(task, async {
        Timer::after(Duration::from_millis(ms)).await;
    }));
}

// ── Light policy ──────────────────────────────────────────────

#[test]
fn daylight_cycle_stays_disarmed() {
    let ctrl = controller();
    let observer = ctrl.connect().unwrap();
    drain(&observer);

    assert_eq!(block_on(policy::cycle(&ctrl)), Ok(StateId::DayDisarmed));
    assert_eq!(
        drain(&observer),
        vec![json!({"light_status": 0, "outside_led_auto": false})]
    );
    let laser = ctrl.config().pins.laser_emitter;
    ctrl.with_hardware(|hw| assert_eq!(hw.output(laser), Some(false)));
}

#[test]
fn intrusion_at_night_latches_until_dawn() {
    let ctrl = controller();
    let pins = ctrl.config().pins.clone();
    let observer = ctrl.connect().unwrap();
    drain(&observer);

    // Dusk: arm, laser and outside light on.
    ctrl.with_hardware(|hw| hw.set_input(pins.light_sensor, true));
    assert_eq!(block_on(policy::cycle(&ctrl)), Ok(StateId::NightArmedIdle));
    ctrl.with_hardware(|hw| {
        assert_eq!(hw.output(pins.laser_emitter), Some(true));
        assert_eq!(hw.output(pins.zone_lights[7]), Some(true));
    });
    assert_eq!(
        drain(&observer),
        vec![
            json!({"outside_led": true}),
            json!({"light_status": 1, "outside_led_auto": true}),
        ]
    );
    assert!(ctrl.state().alarm().armed);

    // Beam broken: siren.
    ctrl.with_hardware(|hw| hw.set_input(pins.beam_receiver, true));
    assert_eq!(
        block_on(policy::cycle(&ctrl)),
        Ok(StateId::NightArmedTriggered)
    );
    assert_eq!(changes(drain(&observer)), vec![json!({"alarm": true})]);
    ctrl.with_hardware(|hw| assert_eq!(hw.plays, 1));

    // Beam restored: still latched, siren not restarted while playing.
    ctrl.with_hardware(|hw| hw.set_input(pins.beam_receiver, false));
    assert_eq!(
        block_on(policy::cycle(&ctrl)),
        Ok(StateId::NightArmedTriggered)
    );
    assert!(changes(drain(&observer)).is_empty());
    assert!(ctrl.state().alarm().triggered);

    // Dawn: disarm and silence.
    ctrl.with_hardware(|hw| hw.set_input(pins.light_sensor, false));
    assert_eq!(block_on(policy::cycle(&ctrl)), Ok(StateId::DayDisarmed));
    assert_eq!(
        changes(drain(&observer)),
        vec![json!({"alarm": false}), json!({"outside_led": false})]
    );
    ctrl.with_hardware(|hw| {
        assert!(!hw.playing);
        assert_eq!(hw.output(pins.laser_emitter), Some(false));
        assert_eq!(hw.output(pins.zone_lights[7]), Some(false));
    });
    assert_eq!(ctrl.state().alarm(), AlarmFlags::default());
    assert!(!ctrl.state().outside_auto());
}

#[test]
fn finished_siren_replays_on_new_break() {
    let ctrl = controller();
    let pins = ctrl.config().pins.clone();
    ctrl.with_hardware(|hw| {
        hw.set_input(pins.light_sensor, true);
        hw.set_input(pins.beam_receiver, true);
    });
    block_on(policy::cycle(&ctrl)).unwrap();
    assert_eq!(ctrl.alarm_state(), StateId::NightArmedTriggered);

    let observer = ctrl.connect().unwrap();
    drain(&observer);
    ctrl.with_hardware(|hw| hw.finish_clip());
    block_on(policy::cycle(&ctrl)).unwrap();

    ctrl.with_hardware(|hw| assert_eq!(hw.plays, 2));
    // Already alarmed: no second alarm notice.
    assert!(changes(drain(&observer)).is_empty());
}

#[test]
fn beam_is_not_sampled_by_day() {
    let ctrl = controller();
    let beam = ctrl.config().pins.beam_receiver;
    ctrl.with_hardware(|hw| hw.kill_input(beam));

    assert_eq!(block_on(policy::cycle(&ctrl)), Ok(StateId::DayDisarmed));
}

#[test]
fn light_sensor_failure_surfaces_from_cycle() {
    let ctrl = controller();
    let light = ctrl.config().pins.light_sensor;
    ctrl.with_hardware(|hw| hw.fail_reads(light, 1));

    assert_eq!(block_on(policy::cycle(&ctrl)), Err(IoError::ReadFailed(light)));
    assert_eq!(block_on(policy::cycle(&ctrl)), Ok(StateId::DayDisarmed));
}

#[test]
fn halted_policy_task_returns() {
    let ctrl = controller_with(SystemConfig {
        sensor_failure: SensorFailurePolicy::Halt,
        ..fast_config()
    });
    let light = ctrl.config().pins.light_sensor;
    ctrl.with_hardware(|hw| hw.kill_input(light));

    block_on(policy::run(&ctrl));
    assert_eq!(ctrl.alarm_state(), StateId::DayDisarmed);
}

#[test]
fn restarted_policy_keeps_the_latch() {
    let ctrl = controller_with(SystemConfig {
        sensor_failure: SensorFailurePolicy::Restart {
            backoff_ms: 1,
            max_restarts: Some(1),
        },
        ..fast_config()
    });
    let pins = ctrl.config().pins.clone();
    ctrl.with_hardware(|hw| {
        hw.set_input(pins.light_sensor, true);
        hw.set_input(pins.beam_receiver, true);
    });
    block_on(policy::cycle(&ctrl)).unwrap();

    // One failure restarts, the second exhausts the budget.
    ctrl.with_hardware(|hw| hw.kill_input(pins.light_sensor));
    block_on(policy::run(&ctrl));

    assert_eq!(ctrl.alarm_state(), StateId::NightArmedTriggered);
    assert!(ctrl.state().alarm().triggered);
}

// ── People counter ────────────────────────────────────────────

#[test]
fn entry_presses_count_once_each() {
    let ctrl = controller();
    let entry = ctrl.config().pins.entry_switch;
    // Pull-up contact: LOW while pressed.
    ctrl.with_hardware(|hw| {
        hw.script_input(entry, &[true, false, false, false, true, false, true]);
    });

    run_for(100, counter::run(&ctrl, Direction::Entry));

    assert_eq!(ctrl.snapshot().people_count, 2);
    ctrl.with_hardware(|hw| assert_eq!(hw.digits, vec![0, 1, 2]));
}

#[test]
fn exit_presses_clamp_at_zero() {
    let ctrl = controller();
    let pins = ctrl.config().pins.clone();
    ctrl.adjust_people_count(1);
    ctrl.with_hardware(|hw| {
        hw.script_input(pins.exit_switch, &[true, false, true, false, true, false, true]);
    });

    run_for(100, counter::run(&ctrl, Direction::Exit));

    assert_eq!(ctrl.snapshot().people_count, 0);
}

#[test]
fn entry_and_exit_run_side_by_side() {
    let ctrl = controller();
    let pins = ctrl.config().pins.clone();
    ctrl.with_hardware(|hw| {
        hw.script_input(pins.entry_switch, &[true, false, true, false, true, false, true]);
        hw.script_input(pins.exit_switch, &[true, true, true, true, true, true, false, true]);
    });

    run_for(100, async {
        future::zip(
            counter::run(&ctrl, Direction::Entry),
            counter::run(&ctrl, Direction::Exit),
        )
        .await;
    });

    // Three in, one out.
    assert_eq!(ctrl.snapshot().people_count, 2);
}

#[test]
fn halted_counter_stops_counting() {
    let ctrl = controller_with(SystemConfig {
        sensor_failure: SensorFailurePolicy::Halt,
        ..fast_config()
    });
    let entry = ctrl.config().pins.entry_switch;
    ctrl.with_hardware(|hw| hw.kill_input(entry));

    // Returns once the halt policy gives up on the contact.
    block_on(counter::run(&ctrl, Direction::Entry));
    assert_eq!(ctrl.snapshot().people_count, 0);
}

// ── Display task ──────────────────────────────────────────────

#[test]
fn display_shows_banner_then_cycles_zones() {
    let ctrl = controller();
    let lcd = RecordingDisplay::new();

    run_for(200, display::run(&ctrl, lcd.clone()));

    let screens = lcd.screens();
    assert_eq!(screens[0], "Server Started\n");
    assert_eq!(screens[1], "BATHROOM: Off");
    assert_eq!(screens[8], "OUTSIDE: Off");
}

#[test]
fn display_request_interrupts_banner() {
    let ctrl = controller_with(SystemConfig {
        banner_hold_ms: 10_000,
        ..fast_config()
    });
    let lcd = RecordingDisplay::new();
    ctrl.toggle_rc_motor();

    run_for(100, display::run(&ctrl, lcd.clone()));

    let screens = lcd.screens();
    assert_eq!(screens[0], "Server Started\n");
    assert_eq!(screens[1], "RC MOTOR: On");
}

#[test]
fn render_reports_barrier_position() {
    let ctrl = controller();
    let mut lcd = RecordingDisplay::new();
    block_on(ctrl.toggle_servo());

    let interrupted = block_on(display::render(&ctrl, &mut lcd, DisplayRequest::Servo));
    assert_eq!(interrupted, None);
    assert_eq!(lcd.screens(), vec!["BARRIER: Open".to_owned()]);
}
