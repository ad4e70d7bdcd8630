//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Feeds arbitrary text to `AppConfig::parse()`, then pushes the same text
//! through the environment override path.

#![no_main]

use libfuzzer_sys::fuzz_target;
use seedbox_config::AppConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let _ = AppConfig::parse(s);

    let mut config = AppConfig::default();
    if config.apply_env_from(|_| Some(s.to_string())).is_ok() {
        let _ = config.validate();
    }
});
