//! Issue comment fetching and posting helpers.

use octocrab::{Octocrab, Page};
use serde_json::json;

use crate::github::error::GitHubError;
use crate::github::locator::PullRequestLocator;
use crate::github::models::{ApiComment, IssueComment};

use super::error_mapping::map_octocrab_error;

pub(super) async fn fetch_issue_comments(
    client: &Octocrab,
    locator: &PullRequestLocator,
) -> Result<Vec<IssueComment>, GitHubError> {
    let page = client
        .get::<Page<ApiComment>, _, _>(locator.comments_path(), None::<&()>)
        .await
        .map_err(|error| map_octocrab_error("issue comments", &error))?;

    client
        .all_pages(page)
        .await
        .map(|comments| comments.into_iter().map(ApiComment::into).collect())
        .map_err(|error| map_octocrab_error("issue comments", &error))
}

pub(super) async fn post_issue_comment(
    client: &Octocrab,
    locator: &PullRequestLocator,
    body: &str,
) -> Result<IssueComment, GitHubError> {
    client
        .post::<_, ApiComment>(locator.comments_path(), Some(&json!({ "body": body })))
        .await
        .map(ApiComment::into)
        .map_err(|error| map_octocrab_error("create comment", &error))
}
