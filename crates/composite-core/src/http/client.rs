//! GitHub REST API client

use super::error::ApiError;
use crate::traits::GitHubGateway;
use crate::types::{ChangeType, ChangedFile, CheckConclusion, CheckRun, CheckStatus};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;

/// Page size requested from paginated endpoints
const PER_PAGE: u32 = 100;

/// Safety limit to prevent infinite pagination loops
const MAX_PAGES: u32 = 100;

/// GitHub API response for a compare
#[derive(Debug, Deserialize)]
struct CompareResponse {
    #[serde(default)]
    files: Vec<GitHubFile>,
}

/// GitHub API response for a changed file
#[derive(Debug, Deserialize)]
struct GitHubFile {
    /// File path
    filename: String,
    /// Change status (added, removed, modified, renamed, copied, changed)
    status: String,
    /// Previous filename (for renamed files)
    previous_filename: Option<String>,
}

/// GitHub API response for check runs list
#[derive(Debug, Deserialize)]
struct CheckRunsResponse {
    total_count: u32,
    check_runs: Vec<GitHubCheckRun>,
}

/// GitHub API check run object
#[derive(Debug, Deserialize)]
struct GitHubCheckRun {
    id: u64,
    name: String,
    status: String,
    conclusion: Option<String>,
}

/// Parse check run status string to enum
///
/// Anything not yet `in_progress` or `completed` (`queued`, `requested`,
/// `waiting`, `pending`) is treated as queued.
fn parse_status(s: &str) -> CheckStatus {
    match s {
        "completed" => CheckStatus::Completed,
        "in_progress" => CheckStatus::InProgress,
        _ => CheckStatus::Queued,
    }
}

/// Parse check run conclusion string to enum
fn parse_conclusion(s: &str) -> CheckConclusion {
    match s {
        "success" => CheckConclusion::Success,
        "failure" => CheckConclusion::Failure,
        "neutral" => CheckConclusion::Neutral,
        "cancelled" => CheckConclusion::Cancelled,
        "skipped" => CheckConclusion::Skipped,
        "timed_out" => CheckConclusion::TimedOut,
        "action_required" => CheckConclusion::ActionRequired,
        "stale" => CheckConclusion::Stale,
        // Unknown verdicts never count as passing
        _ => CheckConclusion::Failure,
    }
}

/// GitHub API client
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a new GitHub API client
    ///
    /// `base_url` is the API root, e.g. `https://api.github.com` or
    /// `https://ghe.example.com/api/v3`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("composite/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            token: token.into(),
        }
    }

    /// API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL under the API root.
    ///
    /// Each segment is percent-encoded, so `/`, `#` and `?` inside a
    /// segment stay part of it.
    fn endpoint<'s>(
        &self,
        segments: impl IntoIterator<Item = &'s str>,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Url, ApiError> {
        let invalid = |message: String| ApiError::InvalidUrl {
            method: "GET".to_string(),
            url: self.base_url.clone(),
            message,
        };

        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn request(&self, url: &reqwest::Url, accept: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url.clone())
            .header("Accept", accept)
            .header("X-GitHub-Api-Version", "2022-11-28");

        if self.token.is_empty() {
            request
        } else {
            request.header("Authorization", format!("Bearer {}", self.token))
        }
    }

    /// Send a GET and return the response if the status is a success.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &reqwest::Url,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Transport {
            method: "GET".to_string(),
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Check for rate limiting
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if matches!(status.as_u16(), 403 | 429) {
            if let Some(remaining) = remaining.filter(|r| r == "0") {
                return Err(ApiError::RateLimited {
                    method: "GET".to_string(),
                    url: url.to_string(),
                    status: status.as_u16(),
                    remaining,
                });
            }
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(ApiError::from_body("GET", url.as_str(), status.as_u16(), &body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &reqwest::Url,
    ) -> Result<(T, bool), ApiError> {
        let response = self.send(request, url).await?;

        // Check for pagination via Link header
        let has_next = response
            .headers()
            .get("Link")
            .and_then(|v| v.to_str().ok())
            .map(|link| link.contains("rel=\"next\""))
            .unwrap_or(false);

        let body = response.bytes().await.map_err(|source| ApiError::Transport {
            method: "GET".to_string(),
            url: url.to_string(),
            source,
        })?;

        let parsed = serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            method: "GET".to_string(),
            url: url.to_string(),
            source,
        })?;

        Ok((parsed, has_next))
    }

    /// Download raw file contents
    ///
    /// Endpoint: GET /repos/{owner}/{repo}/contents/{path}?ref={reference}
    pub async fn download_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let segments = ["repos", owner, repo, "contents"]
            .into_iter()
            .chain(path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(segments, &[("ref", reference)])?;

        let request = self.request(&url, "application/vnd.github.raw");
        let response = self.send(request, &url).await?;

        let body = response.bytes().await.map_err(|source| ApiError::Transport {
            method: "GET".to_string(),
            url: url.to_string(),
            source,
        })?;

        Ok(body.to_vec())
    }

    /// Files changed between two commits
    ///
    /// Endpoint: GET /repos/{owner}/{repo}/compare/{base}...{head}
    /// Paginates the file list via the Link header
    pub async fn fetch_changed_files(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<ChangedFile>, ApiError> {
        let mut all_files = Vec::new();
        let per_page = PER_PAGE.to_string();
        let mut page = 1;

        loop {
            let range = format!("{base}...{head}");
            let url = self.endpoint(
                ["repos", owner, repo, "compare", range.as_str()],
                &[("per_page", per_page.as_str()), ("page", page.to_string().as_str())],
            )?;
            let request = self.request(&url, "application/vnd.github+json");
            let (compare, has_next): (CompareResponse, bool) = self.get_json(request, &url).await?;

            all_files.extend(compare.files.into_iter().map(|file| ChangedFile {
                path: file.filename,
                change_type: ChangeType::from_status(&file.status),
                previous_path: file.previous_filename,
            }));

            if !has_next || page >= MAX_PAGES {
                break;
            }
            page += 1;
        }

        tracing::debug!(count = all_files.len(), base, head, "fetched changed files");
        Ok(all_files)
    }

    /// Check runs attached to a ref
    ///
    /// Endpoint: GET /repos/{owner}/{repo}/commits/{reference}/check-runs
    pub async fn fetch_check_runs(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<Vec<CheckRun>, ApiError> {
        let mut all_runs = Vec::new();
        let per_page = PER_PAGE.to_string();
        let mut page = 1;

        loop {
            let url = self.endpoint(
                ["repos", owner, repo, "commits", reference, "check-runs"],
                &[
                    ("filter", "latest"),
                    ("per_page", per_page.as_str()),
                    ("page", page.to_string().as_str()),
                ],
            )?;
            let request = self.request(&url, "application/vnd.github+json");
            let (runs, _): (CheckRunsResponse, bool) = self.get_json(request, &url).await?;

            let received = runs.check_runs.len();
            all_runs.extend(runs.check_runs.into_iter().map(convert_check_run));

            if received == 0 || all_runs.len() >= runs.total_count as usize || page >= MAX_PAGES {
                break;
            }
            page += 1;
        }

        Ok(all_runs)
    }
}

/// Convert GitHub API check run to our type
fn convert_check_run(run: GitHubCheckRun) -> CheckRun {
    let status = parse_status(&run.status);
    // A conclusion is only meaningful once the run completed
    let conclusion = match status {
        CheckStatus::Completed => Some(
            run.conclusion
                .as_deref()
                .map_or(CheckConclusion::Neutral, parse_conclusion),
        ),
        _ => None,
    };

    CheckRun {
        id: run.id,
        name: run.name,
        status,
        conclusion,
    }
}

impl GitHubGateway for GitHubClient {
    fn get_contents<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        path: &'a str,
        reference: &'a str,
    ) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send + 'a {
        self.download_contents(owner, repo, path, reference)
    }

    fn compare_files<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        base: &'a str,
        head: &'a str,
    ) -> impl Future<Output = Result<Vec<ChangedFile>, ApiError>> + Send + 'a {
        self.fetch_changed_files(owner, repo, base, head)
    }

    fn list_check_runs<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        reference: &'a str,
    ) -> impl Future<Output = Result<Vec<CheckRun>, ApiError>> + Send + 'a {
        self.fetch_check_runs(owner, repo, reference)
    }
}
