//! Text contract with the Atlantis bot.
//!
//! The bot has no structured output, so these literals are matched as plain
//! substrings and must stay byte-for-byte identical to what the bot posts.

/// Marker at the start of a successful plan comment.
pub const PLAN_SUCCESS: &str = "Ran Plan for dir";
/// Marker anywhere in a failed plan comment.
pub const PLAN_ERROR: &str = "Plan Error";
/// Marker at the start of a successful apply comment.
pub const APPLY_SUCCESS: &str = "Ran Apply for dir";
/// Marker anywhere in a failed apply comment.
pub const APPLY_ERROR: &str = "Apply Error";
/// Plan failure caused by the bot failing to read the pull request; another
/// plan usually succeeds.
pub const STALE_PULL_REQUEST_SIGNATURE: &str = "404 Not Found";
/// Command asking the bot to plan again.
pub const PLAN_COMMAND: &str = "atlantis plan";

const PATH_DELIMITER: char = '`';

/// Extracts the directory from the first line of a plan comment: the text
/// between the first pair of backticks.
///
/// ```
/// use atlantis_gate::gate::protocol::resource_path;
///
/// let body = "Ran Plan for dir: `infra/network` workspace: `default`\n\n```diff";
/// assert_eq!(resource_path(body), Some("infra/network"));
/// assert_eq!(resource_path("Ran Plan for dir"), None);
/// ```
#[must_use]
pub fn resource_path(body: &str) -> Option<&str> {
    let first_line = body.lines().next()?;
    let mut pieces = first_line.splitn(3, PATH_DELIMITER);
    pieces.next()?;
    let path = pieces.next()?;
    pieces.next()?;
    (!path.is_empty()).then_some(path)
}

/// Workspace name the bot uses for `path`: separators become underscores.
#[must_use]
pub fn workspace_name(path: &str) -> String {
    path.replace('/', "_")
}

/// Command asking the bot to apply `path` in `workspace`.
#[must_use]
pub fn apply_command(path: &str, workspace: &str) -> String {
    format!("atlantis apply -d {path} -w {workspace}")
}
