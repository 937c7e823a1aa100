//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters. All tests run on the host with no real hardware
//! and no sockets.

mod controller_tests;
mod mock_hw;
mod policy_tests;
mod session_tests;
