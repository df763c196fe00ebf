//! Fuzz target: `parse_command`
//!
//! Arbitrary console lines must never panic the parser, and a parsed
//! manual command must always name a valid pump.
//!
//! cargo fuzz run fuzz_console_parse

#![no_main]

use barbot::adapters::console::parse_command;
use barbot::app::commands::AppCommand;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    match parse_command(&line) {
        Ok(AppCommand::Manual { channel, .. }) => assert!(channel.number() >= 1),
        Ok(AppCommand::Pour(name)) => assert!(!name.trim().is_empty()),
        _ => {}
    }
});
