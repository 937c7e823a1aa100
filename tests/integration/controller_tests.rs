//! Integration tests for the Controller using mock hardware.
//!
//! Exercises startup levels, client commands, broadcast fan-out, the
//! servo pulse and the people counter end-to-end through the public API.

use futures_lite::future::{self, block_on};
use serde_json::json;
use sitegate::app::ports::ServoPulse;
use sitegate::config::{CountBroadcast, SystemConfig};
use sitegate::error::HubError;

use super::mock_hw::{controller, controller_with, drain, fast_config};

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_drives_every_output_to_rest() {
    let ctrl = controller();
    let pins = ctrl.config().pins.clone();

    ctrl.with_hardware(|hw| {
        for pin in pins.zone_lights {
            assert_eq!(hw.output(pin), Some(false), "zone pin {pin}");
        }
        // RC relay is active LOW: HIGH means stopped.
        assert_eq!(hw.output(pins.rc_motor), Some(true));
        assert_eq!(hw.output(pins.laser_emitter), Some(false));
        assert_eq!(hw.pulses_on(pins.servo), vec![ServoPulse::Detached]);
        assert_eq!(hw.digits, vec![0]);
        assert_eq!(hw.plays, 0);
    });
}

#[test]
fn connect_queues_snapshot_first() {
    let ctrl = controller();
    ctrl.toggle_light(3);

    let observer = ctrl.connect().unwrap();
    assert_eq!(
        drain(&observer),
        vec![json!({
            "initial_states": [false, false, false, true, false, false, false, false],
            "servo_state": false,
            "people_count": 0,
            "rc_motor_state": false,
        })]
    );
}

#[test]
fn observer_limit_is_enforced() {
    let ctrl = controller_with(SystemConfig {
        max_observers: 1,
        ..fast_config()
    });
    let first = ctrl.connect().unwrap();
    assert!(matches!(ctrl.connect(), Err(HubError::Full)));

    ctrl.disconnect(first.id());
    assert!(ctrl.connect().is_ok());
}

// ── Lights ────────────────────────────────────────────────────

#[test]
fn light_toggle_reaches_every_observer() {
    let ctrl = controller();
    let a = ctrl.connect().unwrap();
    let b = ctrl.connect().unwrap();
    drain(&a);
    drain(&b);

    block_on(ctrl.handle_message(a.id(), r#"{"led_index": 2}"#));

    let expected = vec![json!({"led_index": 2, "state": true})];
    assert_eq!(drain(&a), expected);
    assert_eq!(drain(&b), expected);
    let pin = ctrl.config().pins.zone_lights[2];
    ctrl.with_hardware(|hw| assert_eq!(hw.output(pin), Some(true)));
}

#[test]
fn outside_light_toggle_also_reports_outside_led() {
    let ctrl = controller();
    let observer = ctrl.connect().unwrap();
    drain(&observer);

    assert_eq!(ctrl.toggle_light(7), Some(true));
    assert_eq!(
        drain(&observer),
        vec![
            json!({"led_index": 7, "state": true}),
            json!({"outside_led": true}),
        ]
    );
    // A manual toggle leaves the night-policy flag alone.
    assert!(!ctrl.state().outside_auto());
}

#[test]
fn out_of_range_light_is_ignored() {
    let ctrl = controller();
    let observer = ctrl.connect().unwrap();
    drain(&observer);

    for index in [8, -1, 1_000_000] {
        assert_eq!(ctrl.toggle_light(index), None);
    }
    block_on(ctrl.handle_message(observer.id(), r#"{"led_index": 8}"#));
    block_on(ctrl.handle_message(observer.id(), r#"{"led_index": 18446744073709551615}"#));

    assert!(drain(&observer).is_empty());
    assert_eq!(ctrl.snapshot().initial_states, [false; 8]);
}

#[test]
fn toggling_twice_restores_level() {
    let ctrl = controller();
    assert_eq!(ctrl.toggle_light(0), Some(true));
    assert_eq!(ctrl.toggle_light(0), Some(false));
    let pin = ctrl.config().pins.zone_lights[0];
    ctrl.with_hardware(|hw| assert_eq!(hw.output(pin), Some(false)));
}

// ── Requester-only replies ────────────────────────────────────

#[test]
fn status_goes_to_requester_only() {
    let ctrl = controller();
    let a = ctrl.connect().unwrap();
    let b = ctrl.connect().unwrap();
    drain(&a);
    drain(&b);

    block_on(ctrl.handle_message(b.id(), r#"{"status": null}"#));

    assert!(drain(&a).is_empty());
    assert_eq!(drain(&b), vec![json!({"status": "running"})]);
}

#[test]
fn bad_messages_answer_sender_with_error() {
    let ctrl = controller();
    let a = ctrl.connect().unwrap();
    let b = ctrl.connect().unwrap();
    drain(&a);
    drain(&b);

    for text in ["not json", "[1, 2]", r#"{"volume": 3}"#, r#"{"led_index": "2"}"#] {
        block_on(ctrl.handle_message(a.id(), text));
        let replies = drain(&a);
        assert_eq!(replies.len(), 1, "{text}");
        assert!(replies[0]["error"].is_string(), "{text}");
    }
    assert!(drain(&b).is_empty());
    assert_eq!(ctrl.snapshot().initial_states, [false; 8]);
}

// ── RC actuator ───────────────────────────────────────────────

#[test]
fn rc_motor_is_active_low() {
    let ctrl = controller();
    let observer = ctrl.connect().unwrap();
    drain(&observer);
    let pin = ctrl.config().pins.rc_motor;

    assert!(ctrl.toggle_rc_motor());
    ctrl.with_hardware(|hw| assert_eq!(hw.output(pin), Some(false)));
    assert!(!ctrl.toggle_rc_motor());
    ctrl.with_hardware(|hw| assert_eq!(hw.output(pin), Some(true)));

    assert_eq!(
        drain(&observer),
        vec![
            json!({"rc_motor_state": true}),
            json!({"rc_motor_state": false}),
        ]
    );
}

// ── Servo ─────────────────────────────────────────────────────

#[test]
fn servo_pulses_then_releases() {
    let ctrl = controller();
    let observer = ctrl.connect().unwrap();
    drain(&observer);
    let pin = ctrl.config().pins.servo;

    assert!(block_on(ctrl.toggle_servo()));
    assert!(!block_on(ctrl.toggle_servo()));

    ctrl.with_hardware(|hw| {
        assert_eq!(
            hw.pulses_on(pin),
            vec![
                ServoPulse::Detached,
                ServoPulse::Max,
                ServoPulse::Detached,
                ServoPulse::Min,
                ServoPulse::Detached,
            ]
        );
    });
    assert_eq!(
        drain(&observer),
        vec![json!({"servo_state": true}), json!({"servo_state": false})]
    );
}

#[test]
fn overlapping_servo_toggles_release_once() {
    let ctrl = controller();
    let pin = ctrl.config().pins.servo;

    let (first, second) = block_on(future::zip(ctrl.toggle_servo(), ctrl.toggle_servo()));
    assert!(first);
    assert!(!second);

    // The first pulse's release is superseded by the second pulse.
    ctrl.with_hardware(|hw| {
        assert_eq!(
            hw.pulses_on(pin),
            vec![
                ServoPulse::Detached,
                ServoPulse::Max,
                ServoPulse::Min,
                ServoPulse::Detached,
            ]
        );
    });
    assert!(!ctrl.state().servo_engaged());
}

// ── People counter ────────────────────────────────────────────

#[test]
fn count_renders_last_digit() {
    let ctrl = controller();
    let observer = ctrl.connect().unwrap();
    drain(&observer);

    for _ in 0..12 {
        ctrl.adjust_people_count(1);
    }
    assert_eq!(ctrl.snapshot().people_count, 12);
    ctrl.with_hardware(|hw| assert_eq!(hw.digits.last(), Some(&2)));

    let updates = drain(&observer);
    assert_eq!(updates.len(), 12);
    assert_eq!(updates[11], json!({"people_count": 12}));
}

#[test]
fn exit_at_zero_is_silent_by_default() {
    let ctrl = controller();
    let observer = ctrl.connect().unwrap();
    drain(&observer);

    let change = ctrl.adjust_people_count(-1);
    assert!(!change.changed());
    assert_eq!(change.after, 0);
    assert!(drain(&observer).is_empty());
    ctrl.with_hardware(|hw| assert_eq!(hw.digits, vec![0]));
}

#[test]
fn every_adjustment_mode_reasserts_zero() {
    let ctrl = controller_with(SystemConfig {
        count_broadcast: CountBroadcast::EveryAdjustment,
        ..fast_config()
    });
    let observer = ctrl.connect().unwrap();
    drain(&observer);

    ctrl.adjust_people_count(-1);
    assert_eq!(drain(&observer), vec![json!({"people_count": 0})]);
    ctrl.with_hardware(|hw| assert_eq!(hw.digits, vec![0, 0]));
}
