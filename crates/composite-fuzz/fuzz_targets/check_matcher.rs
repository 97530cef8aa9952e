#![no_main]
use composite_core::patterns::CheckMatcher;
use composite_core::{ChangedFile, Check};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // First line holds comma-separated patterns, the rest are paths
        let mut lines = s.lines();
        let patterns = lines.next().unwrap_or_default();
        let check = Check {
            job: "fuzz".to_string(),
            paths: patterns.split(',').map(str::to_string).collect(),
        };

        if let Ok(matcher) = CheckMatcher::new(&check) {
            let files: Vec<ChangedFile> = lines.map(ChangedFile::modified).collect();
            let any = matcher.matches(&files);
            assert_eq!(any, files.iter().any(|f| matcher.matches_path(&f.path)));
        }
    }
});
