//! Application core: domain state and the serialized mutation path.
//!
//! This module contains the business rules for the site controller:
//! device state, client commands, outbound messages and the
//! [`Controller`](service::Controller) that ties them to the alarm policy
//! and the broadcast hub. All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod state;
