//! Check resolution from inline YAML or a repository file

use super::Config;
use crate::error::{Error, Result};
use crate::traits::GitHubGateway;
use crate::types::Check;
use tokio_util::sync::CancellationToken;

/// Parse a checks declaration.
///
/// The document is a YAML sequence of `{job, paths}` mappings. Order is
/// preserved; an empty or `null` document is an empty list.
pub fn parse_checks(raw: &[u8]) -> Result<Vec<Check>> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let checks: Option<Vec<Check>> = serde_yaml::from_slice(raw).map_err(Error::ChecksYaml)?;
    Ok(checks.unwrap_or_default())
}

impl Config {
    /// Resolve the declared checks.
    ///
    /// Inline `checks_yaml` is parsed directly and the gateway is never
    /// called. Otherwise `checks_filename` is fetched from `org/repo` at the
    /// head SHA. Call only on a config that passed [`Config::validate`].
    pub async fn get_checks<G: GitHubGateway>(
        &self,
        cancel: &CancellationToken,
        gateway: &G,
    ) -> Result<Vec<Check>> {
        if !self.checks_yaml.is_empty() {
            let checks = parse_checks(self.checks_yaml.as_bytes())?;
            tracing::debug!(count = checks.len(), "parsed inline checks");
            return Ok(checks);
        }

        let fetch = gateway.get_contents(
            &self.github_org,
            &self.github_repo,
            &self.checks_filename,
            &self.head_sha,
        );

        let contents = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = fetch => result.map_err(|source| Error::Download {
                org: self.github_org.clone(),
                repo: self.github_repo.clone(),
                reference: self.head_sha.clone(),
                path: self.checks_filename.clone(),
                source,
            })?,
        };

        let checks = parse_checks(&contents)?;
        tracing::debug!(
            path = %self.checks_filename,
            reference = %self.head_sha,
            count = checks.len(),
            "downloaded checks file"
        );
        Ok(checks)
    }
}
