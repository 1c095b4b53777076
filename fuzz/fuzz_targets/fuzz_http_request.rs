//! Fuzz target: `parse_request_line`
//!
//! Drives arbitrary byte sequences through the HTTP request-line parser
//! and asserts that it never panics and that any command it accepts
//! carries an in-range relay id.
//!
//! cargo fuzz run fuzz_http_request

#![no_main]

use libfuzzer_sys::fuzz_target;
use relayboard::app::commands::RelayCommand;
use relayboard::http::request::{Route, parse_request_line};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(Route::Control(cmd)) = parse_request_line(line) {
        // Anything the parser lets through must be safe to hand to the
        // control service without further range checks.
        if let RelayCommand::Set { id, .. } = cmd {
            assert!((1..=16).contains(&id), "parser accepted id {}", id);
        }
    }
});
