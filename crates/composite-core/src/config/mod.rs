//! Action configuration: construction, validation and check resolution

pub mod builder;
pub mod checks;
pub mod validate;

pub use checks::parse_checks;
pub use validate::{ChecksSourceConflict, ValidationError};

use std::time::Duration;

/// Input names declared by the action
pub mod names {
    /// GitHub API token
    pub const GITHUB_TOKEN: &str = "github-token";
    /// How long to wait for the required checks
    pub const TIMEOUT: &str = "timeout";
    /// Delay between check run polls
    pub const INTERVAL: &str = "interval";
    /// Inline checks declaration
    pub const CHECKS_YAML: &str = "checks-yaml";
    /// Path of a checks declaration in the repository
    pub const CHECKS_FILENAME: &str = "checks-filename";
}

/// Timeout used when the `timeout` input is empty
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Interval used when the `interval` input is empty
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for one invocation
///
/// Built once by [`Config::from_inputs`], checked once by
/// [`Config::validate`], then read-only. Empty strings mean "not set".
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// GitHub API token
    pub github_token: String,
    /// How long to wait for the required checks
    pub timeout: Duration,
    /// Delay between check run polls
    pub interval: Duration,
    /// Inline checks declaration (trimmed)
    pub checks_yaml: String,
    /// Path of a checks declaration in the repository
    pub checks_filename: String,
    /// GitHub API root (`https://api.github.com` or a GHE `/api/v3` URL)
    pub github_root_url: String,
    /// Triggering event name
    pub event_name: String,
    /// Pull request activity type
    pub event_action: String,
    /// Repository owner
    pub github_org: String,
    /// Repository name
    pub github_repo: String,
    /// Pull request base SHA
    pub base_sha: String,
    /// Pull request head SHA
    pub head_sha: String,
}

impl Config {
    /// `org/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.github_org, self.github_repo)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = (!self.github_token.is_empty()).then_some("<redacted>");
        f.debug_struct("Config")
            .field("github_token", &token)
            .field("timeout", &self.timeout)
            .field("interval", &self.interval)
            .field("checks_yaml", &self.checks_yaml)
            .field("checks_filename", &self.checks_filename)
            .field("github_root_url", &self.github_root_url)
            .field("event_name", &self.event_name)
            .field("event_action", &self.event_action)
            .field("github_org", &self.github_org)
            .field("github_repo", &self.github_repo)
            .field("base_sha", &self.base_sha)
            .field("head_sha", &self.head_sha)
            .finish()
    }
}
