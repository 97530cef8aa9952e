#![no_main]
use composite_core::Config;
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;

const KEYS: [&str; 8] = [
    "INPUT_GITHUB-TOKEN",
    "INPUT_TIMEOUT",
    "INPUT_INTERVAL",
    "INPUT_CHECKS-YAML",
    "INPUT_CHECKS-FILENAME",
    "GITHUB_EVENT_NAME",
    "GITHUB_REPOSITORY",
    "GITHUB_API_URL",
];

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // One value per line, assigned to the keys in order
        let inputs: HashMap<&str, &str> = KEYS.iter().copied().zip(s.lines()).collect();
        if let Ok(config) = Config::from_inputs(&inputs) {
            let _ = config.validate();
        }
    }
});
