//! Session tests: whole client conversations over in-memory links.

use futures_lite::future::{self, block_on};
use serde_json::json;
use sitegate::config::SystemConfig;
use sitegate::error::LinkError;
use sitegate::rpc::session::run_session;

use super::mock_hw::{BrokenLink, Pipe, controller, controller_with, fast_config};

#[test]
fn client_gets_snapshot_then_its_own_change() {
    let ctrl = controller();
    let client = Pipe::new();

    let (result, ()) = block_on(future::zip(run_session(&ctrl, client.link()), async {
        let snapshot = client.recv().await;
        assert_eq!(snapshot["people_count"], json!(0));
        assert_eq!(snapshot["initial_states"], json!(vec![false; 8]));

        client.send(r#"{"led_index": 5}"#).await;
        assert_eq!(client.recv().await, json!({"led_index": 5, "state": true}));

        client.send(r#"{"rc_motor": true}"#).await;
        assert_eq!(client.recv().await, json!({"rc_motor_state": true}));

        client.close().await;
    }));

    assert_eq!(result, Ok(()));
    assert_eq!(ctrl.hub().observer_count(), 0);
}

#[test]
fn change_from_one_client_reaches_the_other() {
    let ctrl = controller();
    let alice = Pipe::new();
    let bob = Pipe::new();

    let sessions = future::zip(
        run_session(&ctrl, alice.link()),
        run_session(&ctrl, bob.link()),
    );
    let script = async {
        alice.recv().await;
        bob.recv().await;

        alice.send(r#"{"servo": 1}"#).await;
        let expected = json!({"servo_state": true});
        assert_eq!(alice.recv().await, expected);
        assert_eq!(bob.recv().await, expected);

        // Status replies stay private.
        bob.send(r#"{"status": "?"}"#).await;
        assert_eq!(bob.recv().await, json!({"status": "running"}));

        alice.close().await;
        bob.close().await;
    };

    let ((a, b), ()) = block_on(future::zip(sessions, script));
    assert_eq!(a, Ok(()));
    assert_eq!(b, Ok(()));
    assert!(alice.try_recv().is_none());
    assert!(ctrl.state().servo_engaged());
}

#[test]
fn malformed_message_does_not_end_session() {
    let ctrl = controller();
    let client = Pipe::new();

    let (result, ()) = block_on(future::zip(run_session(&ctrl, client.link()), async {
        client.recv().await;

        client.send("{oops").await;
        assert!(client.recv().await["error"].is_string());

        client.send(r#"{"led_index": 0}"#).await;
        assert_eq!(client.recv().await, json!({"led_index": 0, "state": true}));

        client.close().await;
    }));
    assert_eq!(result, Ok(()));
}

#[test]
fn full_hub_rejects_with_error_message() {
    let ctrl = controller_with(SystemConfig {
        max_observers: 1,
        ..fast_config()
    });
    let _holder = ctrl.connect().unwrap();
    let client = Pipe::new();

    let result = block_on(run_session(&ctrl, client.link()));
    assert_eq!(result, Ok(()));
    assert_eq!(
        client.try_recv(),
        Some(json!({"error": "observer limit reached"}))
    );
    assert_eq!(ctrl.hub().observer_count(), 1);
}

#[test]
fn link_failure_unregisters_observer() {
    let ctrl = controller();

    let result = block_on(run_session(&ctrl, BrokenLink));
    // The snapshot send fails before the failing recv is even polled.
    assert_eq!(result, Err(LinkError::Disconnected));
    assert_eq!(ctrl.hub().observer_count(), 0);

    // Later broadcasts have nowhere to go.
    assert_eq!(ctrl.toggle_light(1), Some(true));
}
