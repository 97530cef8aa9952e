//! Fail-fast config validation

use super::Config;
use crate::error::Result;
use crate::inputs::context::PULL_REQUEST_EVENT;
use crate::types::PullRequestAction;

/// Which side of the checks-source exclusivity rule was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksSourceConflict {
    /// Neither `checks-yaml` nor `checks-filename` is set
    Neither,
    /// Both `checks-yaml` and `checks-filename` are set
    Both,
}

impl std::fmt::Display for ChecksSourceConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Neither => f.write_str("neither are set"),
            Self::Both => f.write_str("both are set"),
        }
    }
}

/// A violated config rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The event is not `pull_request`
    #[error("The Composite Action can only run on pull requests; Event Name: \"{0}\"")]
    NotPullRequest(String),
    /// The activity type does not represent a code change
    #[error("The Composite Action can only run on pull request types spawned by code changes; Event Action: \"{0}\"")]
    NotCodeChange(String),
    /// Base SHA missing from the event payload
    #[error("Could not determine the base SHA for this pull request")]
    MissingBaseSha,
    /// Head SHA missing from the event payload
    #[error("Could not determine the head SHA for this pull request")]
    MissingHeadSha,
    /// Repository owner missing
    #[error("The Composite Action requires a GitHub owner or org")]
    MissingOrg,
    /// Repository name missing
    #[error("The Composite Action requires a GitHub repository")]
    MissingRepo,
    /// API root URL missing
    #[error("The Composite Action requires a GitHub root URL")]
    MissingRootUrl,
    /// API token missing
    #[error("The Composite Action requires a GitHub API token")]
    MissingToken,
    /// Checks source is not exactly one of inline YAML or a filename
    #[error("The Composite Action requires exactly one of checks YAML or checks filename; {0}")]
    ChecksSource(ChecksSourceConflict),
}

type Rule = fn(&Config) -> Option<ValidationError>;

/// Rules in priority order; the first violation is reported.
const RULES: &[Rule] = &[
    |c| {
        (c.event_name != PULL_REQUEST_EVENT)
            .then(|| ValidationError::NotPullRequest(c.event_name.clone()))
    },
    |c| {
        (!PullRequestAction::parse(&c.event_action).is_code_change())
            .then(|| ValidationError::NotCodeChange(c.event_action.clone()))
    },
    |c| c.base_sha.is_empty().then_some(ValidationError::MissingBaseSha),
    |c| c.head_sha.is_empty().then_some(ValidationError::MissingHeadSha),
    |c| c.github_org.is_empty().then_some(ValidationError::MissingOrg),
    |c| c.github_repo.is_empty().then_some(ValidationError::MissingRepo),
    |c| c.github_root_url.is_empty().then_some(ValidationError::MissingRootUrl),
    |c| c.github_token.is_empty().then_some(ValidationError::MissingToken),
    |c| match (c.checks_yaml.is_empty(), c.checks_filename.is_empty()) {
        (true, true) => Some(ValidationError::ChecksSource(ChecksSourceConflict::Neither)),
        (false, false) => Some(ValidationError::ChecksSource(ChecksSourceConflict::Both)),
        _ => None,
    },
];

impl Config {
    /// First rule this config violates, if any
    pub fn violation(&self) -> Option<ValidationError> {
        RULES.iter().find_map(|rule| rule(self))
    }

    /// Check the config is coherent and runnable.
    ///
    /// Rules run in a fixed order and the first violation is returned:
    /// event name, event action, base SHA, head SHA, org, repo, root URL,
    /// token, checks source.
    pub fn validate(&self) -> Result<()> {
        match self.violation() {
            Some(violation) => Err(violation.into()),
            None => Ok(()),
        }
    }
}
