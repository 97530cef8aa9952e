//! GitHub workflow context (`GITHUB_*` variables and the event payload)

use crate::error::{Error, Result};
use crate::traits::InputSource;
use serde_json::Value;

/// API root used when `GITHUB_API_URL` is unset
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Event name the action accepts
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// Workflow context read from the input source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowContext {
    /// `GITHUB_EVENT_NAME`
    pub event_name: String,
    /// `GITHUB_EVENT_PATH`
    pub event_path: String,
    /// `GITHUB_REPOSITORY` (`org/repo`)
    pub repository: String,
    /// `GITHUB_API_URL`, defaulted to the public API
    pub api_url: String,
    /// Parsed event payload, `Null` when no event file is configured
    pub event: Value,
}

impl WorkflowContext {
    /// Read the context and parse the event file.
    ///
    /// An empty `GITHUB_EVENT_PATH` leaves the payload `Null`.
    pub fn from_inputs<I: InputSource + ?Sized>(inputs: &I) -> Result<Self> {
        let event_path = inputs.get("GITHUB_EVENT_PATH");
        let event = if event_path.is_empty() {
            tracing::warn!("GITHUB_EVENT_PATH is not set, using an empty event payload");
            Value::Null
        } else {
            load_event(&event_path)?
        };

        let api_url = match inputs.get("GITHUB_API_URL") {
            url if url.is_empty() => DEFAULT_API_URL.to_string(),
            url => url,
        };

        Ok(Self {
            event_name: inputs.get("GITHUB_EVENT_NAME"),
            event_path,
            repository: inputs.get("GITHUB_REPOSITORY"),
            api_url,
            event,
        })
    }

    /// True if the workflow was triggered by `pull_request`
    #[inline]
    pub fn is_pull_request(&self) -> bool {
        self.event_name == PULL_REQUEST_EVENT
    }

    /// Activity type (`opened`, `synchronize`, ...)
    pub fn action(&self) -> &str {
        self.event_str("/action")
    }

    /// `pull_request.base.sha`
    pub fn base_sha(&self) -> &str {
        self.event_str("/pull_request/base/sha")
    }

    /// `pull_request.head.sha`
    pub fn head_sha(&self) -> &str {
        self.event_str("/pull_request/head/sha")
    }

    fn event_str(&self, pointer: &str) -> &str {
        self.event
            .pointer(pointer)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

fn load_event(path: &str) -> Result<Value> {
    let raw = std::fs::read(path).map_err(|source| Error::EventRead {
        path: path.to_string(),
        source,
    })?;

    serde_json::from_slice(&raw).map_err(|source| Error::EventParse {
        path: path.to_string(),
        source,
    })
}

/// Split an `org/repo` slug; both halves must be non-empty.
pub fn split_repository(slug: &str) -> Result<(&str, &str)> {
    match slug.split_once('/') {
        Some((org, repo)) if !org.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((org, repo))
        }
        _ => Err(Error::RepositoryFormat(slug.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_split_repository() {
        assert_eq!(split_repository("mess/clean").unwrap(), ("mess", "clean"));

        for slug in ["", "mess", "/clean", "mess/", "/", "a/b/c", "mess//clean"] {
            let err = split_repository(slug).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Unexpected GitHub repository format; Repository: \"{slug}\"")
            );
        }
    }

    #[test]
    fn test_context_defaults() {
        let inputs: HashMap<&str, &str> = HashMap::new();
        let ctx = WorkflowContext::from_inputs(&inputs).unwrap();
        assert_eq!(ctx.api_url, DEFAULT_API_URL);
        assert_eq!(ctx.event, Value::Null);
        assert_eq!(ctx.action(), "");
        assert_eq!(ctx.base_sha(), "");
        assert!(!ctx.is_pull_request());
    }

    #[test]
    fn test_context_reads_pull_request_payload() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"action":"synchronize","pull_request":{{"base":{{"sha":"b1"}},"head":{{"sha":"h1"}}}}}}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let inputs = HashMap::from([
            ("GITHUB_EVENT_PATH", path.as_str()),
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_API_URL", "https://ghe.k8s.invalid/api/v3"),
        ]);
        let ctx = WorkflowContext::from_inputs(&inputs).unwrap();
        assert!(ctx.is_pull_request());
        assert_eq!(ctx.action(), "synchronize");
        assert_eq!(ctx.base_sha(), "b1");
        assert_eq!(ctx.head_sha(), "h1");
        assert_eq!(ctx.api_url, "https://ghe.k8s.invalid/api/v3");
    }

    #[test]
    fn test_context_non_string_fields_are_empty() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"action":7,"pull_request":{{"base":null}}}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let inputs = HashMap::from([("GITHUB_EVENT_PATH", path.as_str())]);
        let ctx = WorkflowContext::from_inputs(&inputs).unwrap();
        assert_eq!(ctx.action(), "");
        assert_eq!(ctx.base_sha(), "");
    }

    #[test]
    fn test_missing_event_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let path = path.to_str().unwrap();

        let inputs = HashMap::from([("GITHUB_EVENT_PATH", path)]);
        let err = WorkflowContext::from_inputs(&inputs).unwrap_err();
        assert!(matches!(err, Error::EventRead { .. }));
        assert!(err
            .to_string()
            .starts_with(&format!("Failed to read GitHub Event file; Path: {path}\n")));
    }
}
