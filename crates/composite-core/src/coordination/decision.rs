//! Required/skipped decision for the declared checks

use crate::error::Result;
use crate::patterns::CheckMatcher;
use crate::types::{ChangedFile, Check, CheckDecision};

/// Partition `checks` into those touched by `files` and the rest.
///
/// Declaration order is kept on both sides. Each check stops at its first
/// matching file.
pub fn decide(checks: &[Check], files: &[ChangedFile]) -> Result<CheckDecision> {
    let mut decision = CheckDecision::default();

    for check in checks {
        let matcher = CheckMatcher::new(check)?;
        if matcher.matches(files) {
            decision.required.push(check.clone());
        } else {
            decision.skipped.push(check.clone());
        }
    }

    tracing::debug!(
        required = ?decision.required_jobs(),
        skipped = ?decision.skipped_jobs(),
        "decided checks"
    );

    Ok(decision)
}
