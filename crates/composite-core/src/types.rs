//! Core type definitions

use serde::{Deserialize, Serialize};

/// A job gated on a set of path globs
///
/// Parsed from one entry of the checks declaration:
///
/// ```yaml
/// - job: court
///   paths:
///   - spotlight/**
///   - docs/**
/// ```
///
/// Unknown keys are ignored; a missing `paths` is an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// Job label, matched against check run names
    #[serde(default)]
    pub job: String,
    /// Glob patterns, in declaration order
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Pull request activity type from the event payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestAction {
    /// `opened`
    Opened,
    /// `reopened`
    Reopened,
    /// `synchronize` (new commits pushed)
    Synchronize,
    /// Any other activity type (`edited`, `labeled`, `converted_to_draft`, ...)
    Other,
}

impl PullRequestAction {
    /// Parse from the payload's `action` field - zero allocation
    #[inline]
    pub fn parse(action: &str) -> Self {
        match action {
            "opened" => Self::Opened,
            "reopened" => Self::Reopened,
            "synchronize" => Self::Synchronize,
            _ => Self::Other,
        }
    }

    /// True for the activity types that carry a new set of changed files.
    ///
    /// `ready_for_review` and `converted_to_draft` flip the draft flag only,
    /// so they are rejected along with every metadata-only action.
    #[inline]
    pub const fn is_code_change(&self) -> bool {
        matches!(self, Self::Opened | Self::Reopened | Self::Synchronize)
    }
}

/// Change type for a file (matches the compare API `status` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ChangeType {
    /// Added file
    Added = b'A',
    /// Copied file
    Copied = b'C',
    /// Deleted file
    Deleted = b'D',
    /// Modified file
    Modified = b'M',
    /// Renamed file
    Renamed = b'R',
    /// Type changed (permissions/mode)
    TypeChanged = b'T',
    /// Unknown change type
    Unknown = b'X',
}

impl ChangeType {
    /// Parse from the compare API status string - zero allocation
    #[inline]
    pub fn from_status(status: &str) -> Self {
        match status {
            "added" => Self::Added,
            "copied" => Self::Copied,
            "removed" => Self::Deleted,
            "modified" => Self::Modified,
            "renamed" => Self::Renamed,
            "changed" => Self::TypeChanged,
            _ => Self::Unknown,
        }
    }

    /// Get string representation
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Copied => "copied",
            Self::Deleted => "deleted",
            Self::Modified => "modified",
            Self::Renamed => "renamed",
            Self::TypeChanged => "type_changed",
            Self::Unknown => "unknown",
        }
    }
}

/// A single file changed between base and head
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    /// Path relative to the repository root
    pub path: String,
    /// Change type
    pub change_type: ChangeType,
    /// Previous path for renames/copies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
}

impl ChangedFile {
    /// Shorthand for a modified file
    pub fn modified(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            change_type: ChangeType::Modified,
            previous_path: None,
        }
    }

    /// Every path this change touches (current, then previous for renames)
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.path.as_str()).chain(self.previous_path.as_deref())
    }
}

/// Check run status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Queued, requested, waiting or pending
    Queued,
    /// Currently running
    InProgress,
    /// Finished (has a conclusion)
    Completed,
}

/// Check run conclusion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckConclusion {
    /// Succeeded
    Success,
    /// Failed
    Failure,
    /// Finished without a verdict
    Neutral,
    /// Cancelled
    Cancelled,
    /// Skipped (e.g. an `if:` evaluated to false)
    Skipped,
    /// Timed out
    TimedOut,
    /// Needs manual action
    ActionRequired,
    /// Marked stale by GitHub
    Stale,
}

impl CheckConclusion {
    /// Conclusions that let the composite check pass
    #[inline]
    pub const fn is_passing(&self) -> bool {
        matches!(self, Self::Success | Self::Neutral | Self::Skipped)
    }

    /// Get string representation (as used by the checks API)
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Neutral => "neutral",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::TimedOut => "timed_out",
            Self::ActionRequired => "action_required",
            Self::Stale => "stale",
        }
    }
}

/// A check run attached to a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRun {
    /// Check run ID
    pub id: u64,
    /// Check run name (the job name for GitHub Actions)
    pub name: String,
    /// Status
    pub status: CheckStatus,
    /// Conclusion, once completed
    pub conclusion: Option<CheckConclusion>,
}

impl CheckRun {
    /// True if this run was produced by `job`, including matrix expansions
    /// such as `test (ubuntu-latest, 1.75)`.
    pub fn belongs_to(&self, job: &str) -> bool {
        match self.name.strip_prefix(job) {
            Some("") => true,
            Some(rest) => rest.starts_with(" ("),
            None => false,
        }
    }
}

/// Which declared checks apply to the changed files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckDecision {
    /// Checks with at least one matching changed path, in declaration order
    pub required: Vec<Check>,
    /// Checks with no matching changed path, in declaration order
    pub skipped: Vec<Check>,
}

impl CheckDecision {
    /// Job labels of the required checks
    pub fn required_jobs(&self) -> Vec<&str> {
        self.required.iter().map(|c| c.job.as_str()).collect()
    }

    /// Job labels of the skipped checks
    pub fn skipped_jobs(&self) -> Vec<&str> {
        self.skipped.iter().map(|c| c.job.as_str()).collect()
    }
}

/// Final state of the waited-on jobs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Jobs whose runs all passed
    pub passed: Vec<String>,
    /// Jobs with a non-passing run, with the first offending conclusion
    pub failed: Vec<(String, CheckConclusion)>,
    /// Jobs still running when a failure ended the wait early
    pub pending: Vec<String>,
}

impl WaitOutcome {
    /// True if no job failed
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
