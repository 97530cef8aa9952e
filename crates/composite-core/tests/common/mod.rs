//! Shared test helpers

#![allow(dead_code)]

use composite_core::{ApiError, ChangedFile, CheckRun, GitHubGateway};
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Absolute path of a file under `tests/testdata`
pub fn testdata(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

/// In-memory gateway that counts calls
#[derive(Default)]
pub struct FakeGateway {
    /// Body returned by `get_contents`; `None` answers 404
    pub contents: Option<Vec<u8>>,
    /// Files returned by `compare_files`
    pub changed: Vec<ChangedFile>,
    /// Runs returned by `list_check_runs`
    pub runs: Vec<CheckRun>,
    /// Never resolve `get_contents`
    pub hang: bool,
    pub contents_calls: AtomicUsize,
    pub compare_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn calls(&self) -> usize {
        self.contents_calls.load(Ordering::SeqCst) + self.compare_calls.load(Ordering::SeqCst)
    }
}

impl GitHubGateway for FakeGateway {
    fn get_contents<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        path: &'a str,
        reference: &'a str,
    ) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send + 'a {
        self.contents_calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.contents.clone().ok_or_else(|| ApiError::Status {
                method: "GET".to_string(),
                url: format!(
                    "https://ghe.k8s.invalid/api/v3/repos/{owner}/{repo}/contents/{path}?ref={reference}"
                ),
                status: 404,
                message: "Not Found".to_string(),
            })
        }
    }

    fn compare_files<'a>(
        &'a self,
        _owner: &'a str,
        _repo: &'a str,
        _base: &'a str,
        _head: &'a str,
    ) -> impl Future<Output = Result<Vec<ChangedFile>, ApiError>> + Send + 'a {
        self.compare_calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok(self.changed.clone()) }
    }

    fn list_check_runs<'a>(
        &'a self,
        _owner: &'a str,
        _repo: &'a str,
        _reference: &'a str,
    ) -> impl Future<Output = Result<Vec<CheckRun>, ApiError>> + Send + 'a {
        async move { Ok(self.runs.clone()) }
    }
}
