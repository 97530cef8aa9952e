//! Config construction from an input source

use super::{names, Config, DEFAULT_INTERVAL, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};
use crate::inputs::context::{split_repository, WorkflowContext};
use crate::traits::InputSource;
use std::time::Duration;

impl Config {
    /// Build a config from action inputs and the workflow context.
    ///
    /// Syntactic checks run eagerly in this order, first failure wins:
    /// `timeout`, `interval`, the event file, the repository slug.
    /// Cross-field rules are left to [`Config::validate`].
    pub fn from_inputs<I: InputSource + ?Sized>(inputs: &I) -> Result<Self> {
        let timeout = duration_input(inputs, names::TIMEOUT, DEFAULT_TIMEOUT)?;
        let interval = duration_input(inputs, names::INTERVAL, DEFAULT_INTERVAL)?;
        let context = WorkflowContext::from_inputs(inputs)?;
        let (org, repo) = split_repository(&context.repository)?;

        // Only a pull_request payload carries these fields
        let (event_action, base_sha, head_sha) = if context.is_pull_request() {
            (
                context.action().to_string(),
                context.base_sha().to_string(),
                context.head_sha().to_string(),
            )
        } else {
            Default::default()
        };

        let config = Config {
            github_token: inputs.input(names::GITHUB_TOKEN),
            timeout,
            interval,
            checks_yaml: inputs.input(names::CHECKS_YAML),
            checks_filename: inputs.input(names::CHECKS_FILENAME),
            github_root_url: context.api_url.clone(),
            event_name: context.event_name.clone(),
            event_action,
            github_org: org.to_string(),
            github_repo: repo.to_string(),
            base_sha,
            head_sha,
        };

        tracing::debug!(
            repository = %config.repository(),
            event = %config.event_name,
            action = %config.event_action,
            "built config"
        );

        Ok(config)
    }
}

/// Parse a duration input, falling back to `default` when it is empty
fn duration_input<I: InputSource + ?Sized>(
    inputs: &I,
    name: &'static str,
    default: Duration,
) -> Result<Duration> {
    let value = inputs.input(name);
    if value.is_empty() {
        return Ok(default);
    }

    humantime::parse_duration(&value).map_err(|source| Error::InvalidInput {
        input: name,
        value,
        source,
    })
}
