#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and presence validation must reject bad input without panicking.
    if let Ok(raw) = garage_config::parse_raw(data) {
        let missing = raw.missing_keys();
        match garage_config::Config::from_raw(raw) {
            Ok(_) => assert!(missing.is_empty()),
            Err(garage_config::ConfigError::MissingKeys(keys)) => assert_eq!(keys, missing),
            Err(e) => panic!("unexpected error after parse: {e}"),
        }
    }
});
