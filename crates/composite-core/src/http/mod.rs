//! HTTP client for GitHub API

pub mod client;
pub mod error;

pub use client::GitHubClient;
pub use error::ApiError;
