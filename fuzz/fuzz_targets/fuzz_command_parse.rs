//! Fuzz target: `ClientCommand::parse`
//!
//! Any UTF-8 text must parse to a command or a typed error, and every
//! error must render to a non-empty reason for the `{"error": ...}` reply.
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use sitegate::app::commands::ClientCommand;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Err(e) = ClientCommand::parse(text) {
        assert!(!e.to_string().is_empty());
    }
});
