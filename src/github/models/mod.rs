//! Data models for the pull request and its discussion feed.
//!
//! Types prefixed with `Api` are internal deserialisation targets that convert
//! into public domain types.

use chrono::{DateTime, Utc};
use serde::Deserialize;


/// Pull request fields the gate needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestMetadata {
    /// Pull request number.
    pub number: u64,
    /// When the pull request was opened.
    pub created_at: DateTime<Utc>,
    /// Whether the pull request has already been merged.
    pub merged: bool,
    /// State (e.g. open, closed).
    pub state: Option<String>,
    /// HTML URL for displaying to a user.
    pub html_url: Option<String>,
}

/// Issue comment posted on the pull request conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComment {
    /// Comment identifier.
    pub id: u64,
    /// Author login.
    pub author: Option<String>,
    /// Comment body; empty when GitHub omits it.
    pub body: String,
    /// When the comment was created.
    pub created_at: DateTime<Utc>,
}

impl IssueComment {
    /// Returns true when the comment was written by `login`.
    #[must_use]
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.author.as_deref() == Some(login)
    }

    /// First line of the body, without the trailing newline.
    #[must_use]
    pub fn first_line(&self) -> &str {
        self.body.lines().next().unwrap_or_default()
    }
}

/// Review submitted on the pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedReview {
    /// Review identifier.
    pub id: u64,
    /// Review state reported by GitHub (e.g. `APPROVED`).
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub(crate) number: u64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) merged: Option<bool>,
    pub(crate) merged_at: Option<DateTime<Utc>>,
    pub(crate) state: Option<String>,
    pub(crate) html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiComment {
    pub(crate) id: u64,
    pub(crate) body: Option<String>,
    pub(crate) user: Option<ApiUser>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    pub(crate) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiReview {
    pub(crate) id: u64,
    pub(crate) state: Option<String>,
}

impl From<ApiPullRequest> for PullRequestMetadata {
    fn from(value: ApiPullRequest) -> Self {
        let merged = value.merged.unwrap_or(value.merged_at.is_some());
        Self {
            number: value.number,
            created_at: value.created_at,
            merged,
            state: value.state,
            html_url: value.html_url,
        }
    }
}

impl From<ApiComment> for IssueComment {
    fn from(value: ApiComment) -> Self {
        Self {
            id: value.id,
            author: value.user.and_then(|user| user.login),
            body: value.body.unwrap_or_default(),
            created_at: value.created_at,
        }
    }
}

impl From<ApiReview> for SubmittedReview {
    fn from(value: ApiReview) -> Self {
        Self {
            id: value.id,
            state: value.state,
        }
    }
}
