//! Polling loop that waits for the required jobs to conclude

use crate::config::Config;
use crate::error::{Error, Result};
use crate::traits::GitHubGateway;
use crate::types::{CheckConclusion, CheckRun, CheckStatus, WaitOutcome};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

/// Shortest pause between polls, whatever `interval` says
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// State of one job at a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    /// No runs yet, or a run is queued or in progress
    Pending,
    /// Every run completed with a passing conclusion
    Passed,
    /// A completed run did not pass
    Failed(CheckConclusion),
}

fn job_state(job: &str, runs: &[CheckRun]) -> JobState {
    let mut seen = false;
    let mut pending = false;

    for run in runs.iter().filter(|r| r.belongs_to(job)) {
        seen = true;
        match (run.status, run.conclusion) {
            (CheckStatus::Completed, Some(c)) if !c.is_passing() => return JobState::Failed(c),
            (CheckStatus::Completed, _) => {}
            _ => pending = true,
        }
    }

    if !seen || pending {
        JobState::Pending
    } else {
        JobState::Passed
    }
}

/// Waits for check runs on the head SHA
///
/// Polls every `config.interval` until every job has concluded, a job
/// fails, or `config.timeout` elapses.
pub struct CheckWaiter<'a, G> {
    gateway: &'a G,
    config: &'a Config,
}

impl<'a, G: GitHubGateway> CheckWaiter<'a, G> {
    /// Create a new waiter over a validated config
    pub fn new(gateway: &'a G, config: &'a Config) -> Self {
        Self { gateway, config }
    }

    /// Wait for `jobs` to conclude.
    ///
    /// Returns as soon as any job fails; remaining jobs are reported as
    /// pending in the outcome. Errors with [`Error::Timeout`] when jobs are
    /// still pending at the deadline and [`Error::Cancelled`] when `cancel`
    /// fires.
    pub async fn wait(&self, cancel: &CancellationToken, jobs: &[&str]) -> Result<WaitOutcome> {
        if jobs.is_empty() {
            return Ok(WaitOutcome::default());
        }

        // No deadline when the timeout does not fit in an Instant
        let deadline = Instant::now().checked_add(self.config.timeout);
        let mut attempt = 1u32;

        loop {
            let runs = self.poll(cancel).await?;
            let outcome = summarize(jobs, &runs);

            if !outcome.failed.is_empty() || outcome.pending.is_empty() {
                return Ok(outcome);
            }

            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(Error::Timeout {
                            timeout: self.config.timeout,
                            pending: outcome.pending,
                        });
                    }
                    Some(deadline - now)
                }
                None => None,
            };

            tracing::info!(
                attempt,
                pending = ?outcome.pending,
                passed = outcome.passed.len(),
                "waiting for checks"
            );

            let pause = poll_pause(self.config.interval, remaining);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = sleep(pause) => {}
            }
            attempt += 1;
        }
    }

    async fn poll(&self, cancel: &CancellationToken) -> Result<Vec<CheckRun>> {
        let config = self.config;
        let list = self
            .gateway
            .list_check_runs(&config.github_org, &config.github_repo, &config.head_sha);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = list => result.map_err(|source| Error::CheckRuns {
                org: config.github_org.clone(),
                repo: config.github_repo.clone(),
                reference: config.head_sha.clone(),
                source,
            }),
        }
    }
}

/// Sleep before the next poll: `interval` raised to [`MIN_POLL_INTERVAL`],
/// cut short at the deadline
fn poll_pause(interval: Duration, remaining: Option<Duration>) -> Duration {
    let pause = interval.max(MIN_POLL_INTERVAL);
    remaining.map_or(pause, |remaining| pause.min(remaining))
}

/// Classify every job against one snapshot of check runs
fn summarize(jobs: &[&str], runs: &[CheckRun]) -> WaitOutcome {
    let mut outcome = WaitOutcome::default();

    for &job in jobs {
        match job_state(job, runs) {
            JobState::Passed => outcome.passed.push(job.to_string()),
            JobState::Failed(c) => outcome.failed.push((job.to_string(), c)),
            JobState::Pending => outcome.pending.push(job.to_string()),
        }
    }

    outcome
}
