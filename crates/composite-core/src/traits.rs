//! Capability traits injected into the config builder and check resolver

use crate::http::ApiError;
use crate::types::{ChangedFile, CheckRun};
use std::future::Future;

/// Environment-like key/value lookup
///
/// Absent keys yield an empty string, never an error.
pub trait InputSource {
    /// Raw value for `key`
    fn get(&self, key: &str) -> String;

    /// Action input `name`, read from `INPUT_<NAME>` and trimmed
    fn input(&self, name: &str) -> String {
        self.get(&input_key(name)).trim().to_string()
    }
}

/// Environment key for an action input: `INPUT_` + upper-cased name with
/// spaces replaced by `_` (`github-token` → `INPUT_GITHUB-TOKEN`).
pub fn input_key(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

impl<S: InputSource + ?Sized> InputSource for &S {
    fn get(&self, key: &str) -> String {
        (**self).get(key)
    }
}

/// GitHub API operations needed by the resolver and the waiter
///
/// Each future is `Send` so gateways can be driven from a multi-threaded
/// runtime. No boxing - implementations return concrete futures.
pub trait GitHubGateway {
    /// Raw contents of `path` in `owner/repo` at `reference`
    fn get_contents<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        path: &'a str,
        reference: &'a str,
    ) -> impl Future<Output = std::result::Result<Vec<u8>, ApiError>> + Send + 'a;

    /// Files changed in `base...head`
    fn compare_files<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        base: &'a str,
        head: &'a str,
    ) -> impl Future<Output = std::result::Result<Vec<ChangedFile>, ApiError>> + Send + 'a;

    /// All check runs attached to `reference`
    fn list_check_runs<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        reference: &'a str,
    ) -> impl Future<Output = std::result::Result<Vec<CheckRun>, ApiError>> + Send + 'a;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_key() {
        assert_eq!(input_key("github-token"), "INPUT_GITHUB-TOKEN");
        assert_eq!(input_key("checks yaml"), "INPUT_CHECKS_YAML");
        assert_eq!(input_key("timeout"), "INPUT_TIMEOUT");
    }
}
