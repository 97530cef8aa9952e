//! # Composite Core
//!
//! Path-gated pull request checks for GitHub Actions.
//!
//! Given a pull request event and a declaration of named checks (a job
//! label plus path globs), this library works out which checks are relevant
//! to the files the pull request changes:
//! - **Config** built from an injected [`InputSource`] and validated fail-fast
//! - **Check resolution** from inline YAML or a repository file
//! - **Decision** by glob-matching declared paths against `base...head`
//! - **Waiting** for the required jobs' check runs on the head SHA
//!
//! GitHub access goes through the [`GitHubGateway`] trait so every step can
//! be driven by a fake gateway in tests.
//!
//! ## Example
//!
//! ```no_run
//! use composite_core::{inputs::EnvInputs, Config, GitHubClient};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> composite_core::Result<()> {
//! let config = Config::from_inputs(&EnvInputs)?;
//! config.validate()?;
//!
//! let client = GitHubClient::new(&config.github_root_url, &config.github_token);
//! let resolution = composite_core::resolve(&config, &CancellationToken::new(), &client).await?;
//! println!("Required: {:?}", resolution.decision.required_jobs());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod coordination;
pub mod error;
pub mod http;
pub mod inputs;
pub mod output;
pub mod patterns;
pub mod traits;
pub mod types;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use http::{ApiError, GitHubClient};
pub use traits::{GitHubGateway, InputSource};
pub use types::{
    ChangeType, ChangedFile, Check, CheckConclusion, CheckDecision, CheckRun, CheckStatus,
    PullRequestAction, WaitOutcome,
};

use tokio_util::sync::CancellationToken;

/// Everything resolved for one pull request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Declared checks, in declaration order
    pub checks: Vec<Check>,
    /// Files changed in `base...head`
    pub changed_files: Vec<ChangedFile>,
    /// Required and skipped checks
    pub decision: CheckDecision,
}

/// Resolve the declared checks and decide which ones the pull request needs.
///
/// The config must already have passed [`Config::validate`].
pub async fn resolve<G: GitHubGateway>(
    config: &Config,
    cancel: &CancellationToken,
    gateway: &G,
) -> Result<Resolution> {
    let checks = config.get_checks(cancel, gateway).await?;

    let compare = gateway.compare_files(
        &config.github_org,
        &config.github_repo,
        &config.base_sha,
        &config.head_sha,
    );
    let changed_files = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        result = compare => result.map_err(|source| Error::Compare {
            org: config.github_org.clone(),
            repo: config.github_repo.clone(),
            base: config.base_sha.clone(),
            head: config.head_sha.clone(),
            source,
        })?,
    };

    let decision = coordination::decide(&checks, &changed_files)?;

    Ok(Resolution {
        checks,
        changed_files,
        decision,
    })
}
