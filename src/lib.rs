//! Sitegate site controller library.
//!
//! Exposes every module for the binary and for integration testing. The
//! control core is hardware-agnostic: it reaches peripherals only through
//! the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod rpc;
pub mod sensors;
