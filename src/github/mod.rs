//! GitHub boundary for the gate.
//!
//! This module wraps Octocrab behind the [`PullRequestGateway`] trait: it
//! resolves the pull request being gated, reads its metadata and comment
//! feed, and performs the few writes the gate needs (approval, command
//! comments, reviewer requests). Octocrab errors are mapped into
//! [`GitHubError`] so callers can tell transient failures from permanent ones.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;

pub use error::GitHubError;
pub use gateway::{OctocrabGateway, PullRequestGateway};
pub use locator::{
    DEFAULT_API_BASE, PersonalAccessToken, PullRequestLocator, PullRequestNumber, RepositoryName,
    RepositoryOwner,
};
pub use models::{IssueComment, PullRequestMetadata, SubmittedReview};

#[cfg(test)]
pub use gateway::MockPullRequestGateway;
