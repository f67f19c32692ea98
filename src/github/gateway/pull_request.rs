//! Octocrab implementation of the pull request gateway.

use async_trait::async_trait;
use octocrab::Octocrab;
use serde_json::json;

use crate::github::error::GitHubError;
use crate::github::locator::{PersonalAccessToken, PullRequestLocator};
use crate::github::models::{
    ApiPullRequest, ApiReview, IssueComment, PullRequestMetadata, SubmittedReview,
};

use super::PullRequestGateway;
use super::client::build_octocrab_client;
use super::comments::{fetch_issue_comments, post_issue_comment};
use super::error_mapping::map_octocrab_error;

/// Octocrab-backed gateway.
pub struct OctocrabGateway {
    client: Octocrab,
}

impl OctocrabGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an Octocrab client for the given token and the locator's API
    /// base.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when the base URI cannot be parsed or
    /// `GitHubError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: &PersonalAccessToken,
        locator: &PullRequestLocator,
    ) -> Result<Self, GitHubError> {
        let octocrab = build_octocrab_client(token, locator.api_base().as_str())?;
        Ok(Self::new(octocrab))
    }
}

#[async_trait]
impl PullRequestGateway for OctocrabGateway {
    async fn pull_request(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<PullRequestMetadata, GitHubError> {
        self.client
            .get::<ApiPullRequest, _, _>(locator.pull_request_path(), None::<&()>)
            .await
            .map(ApiPullRequest::into)
            .map_err(|error| map_octocrab_error("pull request", &error))
    }

    async fn issue_comments(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<Vec<IssueComment>, GitHubError> {
        fetch_issue_comments(&self.client, locator).await
    }

    async fn approve(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<SubmittedReview, GitHubError> {
        self.client
            .post::<_, ApiReview>(locator.reviews_path(), Some(&json!({ "event": "APPROVE" })))
            .await
            .map(ApiReview::into)
            .map_err(|error| map_octocrab_error("approve review", &error))
    }

    async fn create_comment(
        &self,
        locator: &PullRequestLocator,
        body: &str,
    ) -> Result<IssueComment, GitHubError> {
        post_issue_comment(&self.client, locator, body).await
    }

    async fn request_reviewers(
        &self,
        locator: &PullRequestLocator,
        reviewers: &[String],
    ) -> Result<(), GitHubError> {
        self.client
            .post::<_, serde_json::Value>(
                locator.requested_reviewers_path(),
                Some(&json!({ "reviewers": reviewers })),
            )
            .await
            .map(drop)
            .map_err(|error| map_octocrab_error("request reviewers", &error))
    }
}
