//! Error types exposed by the GitHub gateway layer.

use thiserror::Error;

/// Errors surfaced while resolving inputs or communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitHubError {
    /// The repository slug was not of the form `owner/repo`.
    #[error("repository must be given as owner/repo, got {slug:?}")]
    InvalidRepository {
        /// The slug that failed to parse.
        slug: String,
    },

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// The API base URL could not be parsed.
    #[error("GitHub API URL is invalid: {0}")]
    InvalidUrl(String),

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub refused the request because the rate limit was exhausted.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from GitHub.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },
}

impl GitHubError {
    /// Returns true when repeating the same request later may succeed.
    ///
    /// Transport failures, rate limiting and server-side API errors are
    /// retryable. Input and credential problems are not: the same request
    /// will be rejected again however long the caller waits.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::RateLimitExceeded { .. } | Self::Api { .. }
        )
    }
}
