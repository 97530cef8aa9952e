//! Transport errors returned by GitHub API gateways

use serde::Deserialize;

/// A failed GitHub API request
///
/// Every variant carries the request method and URL so the message is
/// usable on its own in a job log.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The API answered with a non-success status
    #[error("{method} {url}: {status} {message}")]
    Status {
        /// HTTP method
        method: String,
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// GitHub's error message, or the raw body
        message: String,
    },

    /// The API refused the request because the rate limit is exhausted
    #[error("{method} {url}: {status} GitHub API rate limit exceeded; Remaining: {remaining}")]
    RateLimited {
        /// HTTP method
        method: String,
        /// Request URL
        url: String,
        /// HTTP status code (403 or 429)
        status: u16,
        /// Value of `x-ratelimit-remaining`
        remaining: String,
    },

    /// The request never produced a response
    #[error("{method} {url}: {source}")]
    Transport {
        /// HTTP method
        method: String,
        /// Request URL
        url: String,
        /// Underlying client error
        source: reqwest::Error,
    },

    /// The response body did not match the expected schema
    #[error("{method} {url}: failed to decode response body\n{source}")]
    Decode {
        /// HTTP method
        method: String,
        /// Request URL
        url: String,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// The request URL could not be built from the API root
    #[error("{method} {url}: invalid request URL\n{message}")]
    InvalidUrl {
        /// HTTP method
        method: String,
        /// API root the URL was built from
        url: String,
        /// URL parser message
        message: String,
    },
}

impl ApiError {
    /// HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::RateLimited { status, .. } => {
                Some(*status)
            }
            ApiError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            ApiError::Decode { .. } | ApiError::InvalidUrl { .. } => None,
        }
    }

    /// Build a `Status` error from a response body.
    ///
    /// GitHub error bodies are JSON objects with a `message` field; anything
    /// else is reported as the trimmed raw body.
    pub fn from_body(method: &str, url: &str, status: u16, body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct GitHubErrorBody {
            message: String,
        }

        let message = match serde_json::from_slice::<GitHubErrorBody>(body) {
            Ok(parsed) => parsed.message,
            Err(_) => String::from_utf8_lossy(body).trim().to_string(),
        };

        ApiError::Status {
            method: method.to_string(),
            url: url.to_string(),
            status,
            message,
        }
    }
}
