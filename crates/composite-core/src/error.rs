//! Error types for composite-core

use crate::config::ValidationError;
use crate::http::ApiError;
use std::time::Duration;

/// Result type alias for composite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for composite operations
///
/// Every `Display` format here is stable: downstream tooling and the
/// action's log output match on them verbatim. Wrapped errors are printed
/// on their own line after the description.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A duration input (`timeout`, `interval`) failed to parse
    #[error("Invalid input; Input: \"{input}\", Value: \"{value}\"\n{source}")]
    InvalidInput {
        /// Input name, as declared by the action
        input: &'static str,
        /// Raw value supplied
        value: String,
        /// Underlying parser error
        source: humantime::DurationError,
    },

    /// The GitHub event file could not be read
    #[error("Failed to read GitHub Event file; Path: {path}\n{source}")]
    EventRead {
        /// Event file path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The GitHub event file is not valid JSON
    #[error("Failed to parse GitHub Event file as JSON; Path: {path}\n{source}")]
    EventParse {
        /// Event file path
        path: String,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// The repository slug is not of the form `org/repo`
    #[error("Unexpected GitHub repository format; Repository: \"{0}\"")]
    RepositoryFormat(String),

    /// The config failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The checks declaration is not valid YAML
    #[error("Failed to parse checks file as YAML\n{0}")]
    ChecksYaml(#[source] serde_yaml::Error),

    /// The remote checks declaration could not be downloaded
    #[error("Failed to download file; Repository: {org}/{repo}, Ref: {reference}, Path: {path}\n{source}")]
    Download {
        /// Repository owner
        org: String,
        /// Repository name
        repo: String,
        /// Git ref the file was requested at
        reference: String,
        /// Path within the repository
        path: String,
        /// Transport error
        source: ApiError,
    },

    /// The base...head comparison failed
    #[error("Failed to compare commits; Repository: {org}/{repo}, Base: {base}, Head: {head}\n{source}")]
    Compare {
        /// Repository owner
        org: String,
        /// Repository name
        repo: String,
        /// Base SHA
        base: String,
        /// Head SHA
        head: String,
        /// Transport error
        source: ApiError,
    },

    /// Listing check runs for a ref failed
    #[error("Failed to list check runs; Repository: {org}/{repo}, Ref: {reference}\n{source}")]
    CheckRuns {
        /// Repository owner
        org: String,
        /// Repository name
        repo: String,
        /// Git ref the runs were listed for
        reference: String,
        /// Transport error
        source: ApiError,
    },

    /// A declared path pattern is not a valid glob
    #[error("Invalid path pattern; Job: \"{job}\", Pattern: \"{pattern}\"\n{source}")]
    Pattern {
        /// Job the pattern belongs to
        job: String,
        /// Offending pattern
        pattern: String,
        /// Underlying glob error
        source: globset::Error,
    },

    /// Required checks did not conclude within the configured timeout
    #[error("Timed out waiting for checks; Timeout: {}, Pending: {}", humantime::format_duration(*.timeout), .pending.join(", "))]
    Timeout {
        /// Configured timeout
        timeout: Duration,
        /// Jobs still pending when the timeout fired
        pending: Vec<String>,
    },

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,
}

/// Fieldless error category for zero-cost pattern matching.
///
/// Single byte representation (`#[repr(u8)]`), `Copy`, no allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorKind {
    /// Input syntax error (duration, event file, repository slug)
    Input,
    /// Semantic validation error
    Validation,
    /// Checks declaration parse error
    Declaration,
    /// Remote API error
    Remote,
    /// Path pattern error
    Pattern,
    /// Timed out waiting for checks
    Timeout,
    /// Cancelled by the caller
    Cancelled,
}

impl Error {
    /// Get the error kind. Zero allocation, returns a Copy enum.
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. }
            | Error::EventRead { .. }
            | Error::EventParse { .. }
            | Error::RepositoryFormat(_) => ErrorKind::Input,
            Error::Validation(_) => ErrorKind::Validation,
            Error::ChecksYaml(_) => ErrorKind::Declaration,
            Error::Download { .. } | Error::Compare { .. } | Error::CheckRuns { .. } => {
                ErrorKind::Remote
            }
            Error::Pattern { .. } => ErrorKind::Pattern,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// HTTP status of the underlying API failure, if there was one
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Download { source, .. }
            | Error::Compare { source, .. }
            | Error::CheckRuns { source, .. } => source.status(),
            _ => None,
        }
    }
}
