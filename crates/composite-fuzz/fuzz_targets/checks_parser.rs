#![no_main]
use composite_core::config::parse_checks;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Checks YAML comes from either an input or a repository file
    if let Ok(checks) = parse_checks(data) {
        for check in &checks {
            let _ = composite_core::patterns::CheckMatcher::new(check);
        }
    }
});
