//! Gateways for talking to GitHub through Octocrab.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests.

mod client;
mod comments;
mod error_mapping;
mod pull_request;


pub use pull_request::OctocrabGateway;

use async_trait::async_trait;

use crate::github::error::GitHubError;
use crate::github::locator::PullRequestLocator;
use crate::github::models::{IssueComment, PullRequestMetadata, SubmittedReview};

/// Gateway covering every pull request operation the gate performs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestGateway: Send + Sync {
    /// Fetch the pull request metadata.
    async fn pull_request(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<PullRequestMetadata, GitHubError>;

    /// Fetch all issue comments for the pull request, across every page.
    async fn issue_comments(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<Vec<IssueComment>, GitHubError>;

    /// Submit an approving review.
    async fn approve(&self, locator: &PullRequestLocator)
    -> Result<SubmittedReview, GitHubError>;

    /// Post an issue comment and return it as GitHub stored it.
    async fn create_comment(
        &self,
        locator: &PullRequestLocator,
        body: &str,
    ) -> Result<IssueComment, GitHubError>;

    /// Request reviews from the given user logins.
    async fn request_reviewers(
        &self,
        locator: &PullRequestLocator,
        reviewers: &[String],
    ) -> Result<(), GitHubError>;
}
