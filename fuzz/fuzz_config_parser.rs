//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that parses has already validated; it must also map onto a rule.
    if let Ok(config) = turbod_config::AppConfig::parse(text) {
        assert!(config.validate().is_ok());
        let _ = turbod_core::EntryPointRule::from(&config.entry_point);
    }
});
