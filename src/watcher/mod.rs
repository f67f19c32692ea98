//! Comment watcher: polls the pull request's comment feed until the bot
//! reports on the watched step.
//!
//! Each attempt re-reads the pull request (for its creation time) and the
//! whole comment feed, then hands the snapshot to [`scan_comments`]. Attempts
//! are spaced by an [`ExponentialBackoff`]; the watch ends with exactly one
//! [`WatchOutcome`] no later than the configured elapsed budget. Watching has
//! no side effects, so callers may repeat a watch freely.

pub mod backoff;
pub mod scan;


use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::context::GateContext;
use crate::github::{GitHubError, IssueComment, PullRequestGateway};

pub use backoff::{BackoffConfig, ExponentialBackoff};
pub use scan::{Verdict, scan_comments};

/// What a watch looks for and how long it may take.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSpec {
    /// Text whose presence in a bot comment means the step succeeded.
    pub success_pattern: String,
    /// Text whose presence in a bot comment means the step failed.
    pub error_pattern: String,
    /// Largest accepted distance between the reference time and the match.
    pub tolerance: Duration,
    /// Polling schedule and total budget.
    pub backoff: BackoffConfig,
    /// When set, only comments posted after the anchor count, and the
    /// tolerance is measured from it instead of from the pull request
    /// creation time.
    pub since: Option<WatchAnchor>,
}

/// Comment a watch starts after, usually a command posted by the gate.
///
/// GitHub stamps comments with whole seconds, so ordering uses the comment
/// id to split comments created in the same second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchAnchor {
    /// Id of the anchoring comment.
    pub comment_id: u64,
    /// Creation time of the anchoring comment.
    pub created_at: DateTime<Utc>,
}

impl WatchAnchor {
    /// Reports whether `comment` was posted after the anchor.
    #[must_use]
    pub fn precedes(&self, comment: &IssueComment) -> bool {
        (comment.created_at, comment.id) > (self.created_at, self.comment_id)
    }
}

impl From<&IssueComment> for WatchAnchor {
    fn from(comment: &IssueComment) -> Self {
        Self {
            comment_id: comment.id,
            created_at: comment.created_at,
        }
    }
}

impl WatchSpec {
    /// Creates a watch whose tolerance is measured from the pull request
    /// creation time.
    #[must_use]
    pub fn new(
        success_pattern: impl Into<String>,
        error_pattern: impl Into<String>,
        tolerance: Duration,
        backoff: BackoffConfig,
    ) -> Self {
        Self {
            success_pattern: success_pattern.into(),
            error_pattern: error_pattern.into(),
            tolerance,
            backoff,
            since: None,
        }
    }

    /// Restricts the watch to comments posted after `anchor`.
    #[must_use]
    pub const fn since(mut self, anchor: WatchAnchor) -> Self {
        self.since = Some(anchor);
        self
    }
}

/// Terminal result of a watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The bot posted a fresh matching comment.
    Found(IssueComment),
    /// The budget ran out before the bot reported.
    TimedOut {
        /// Time spent watching.
        elapsed: Duration,
    },
    /// The bot reported the error pattern.
    ErrorDetected {
        /// The comment carrying the error.
        comment: IssueComment,
    },
    /// The newest matching comment is outside the tolerance window and
    /// therefore belongs to some other event.
    Stale {
        /// The matching comment.
        comment: IssueComment,
        /// Whole-second distance from the reference time.
        delta: Duration,
        /// Tolerance that was exceeded.
        tolerance: Duration,
    },
    /// Fetching the feed failed and could not be retried, either because the
    /// error is permanent or because the budget ran out.
    TransientFailure {
        /// Last fetch error.
        error: GitHubError,
        /// Time spent watching.
        elapsed: Duration,
    },
}

/// Polls the comment feed of the context's pull request.
pub struct CommentWatcher<'ctx, Gateway>
where
    Gateway: PullRequestGateway,
{
    context: &'ctx GateContext<'ctx, Gateway>,
}

impl<'ctx, Gateway> CommentWatcher<'ctx, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Creates a watcher bound to a gate context.
    #[must_use]
    pub const fn new(context: &'ctx GateContext<'ctx, Gateway>) -> Self {
        Self { context }
    }

    /// Watches until the bot reports on `spec` or the budget runs out.
    pub async fn watch(&self, spec: &WatchSpec) -> WatchOutcome {
        let mut backoff = ExponentialBackoff::start(spec.backoff);
        info!(
            pattern = %spec.success_pattern,
            budget_secs = spec.backoff.max_elapsed.as_secs(),
            tolerance_secs = spec.tolerance.as_secs(),
            "waiting for bot comment"
        );

        loop {
            let last_failure = match self.attempt(spec).await {
                Ok(Verdict::Found(comment)) => {
                    info!(
                        comment_id = comment.id,
                        created_at = %comment.created_at,
                        elapsed_ms = backoff.elapsed().as_millis(),
                        "bot comment found"
                    );
                    return WatchOutcome::Found(comment);
                }
                Ok(Verdict::ErrorDetected(comment)) => {
                    warn!(comment_id = comment.id, body = %comment.body, "bot reported an error");
                    return WatchOutcome::ErrorDetected { comment };
                }
                Ok(Verdict::Stale { comment, delta }) => {
                    return WatchOutcome::Stale {
                        comment,
                        delta,
                        tolerance: spec.tolerance,
                    };
                }
                Ok(Verdict::NotYet) => None,
                Err(error) if error.is_retryable() => {
                    warn!(%error, "fetching comments failed; will retry");
                    Some(error)
                }
                Err(error) => {
                    return WatchOutcome::TransientFailure {
                        error,
                        elapsed: backoff.elapsed(),
                    };
                }
            };

            let Some(delay) = backoff.next_backoff() else {
                let elapsed = backoff.elapsed();
                return last_failure.map_or(WatchOutcome::TimedOut { elapsed }, |error| {
                    WatchOutcome::TransientFailure { error, elapsed }
                });
            };

            debug!(
                pattern = %spec.success_pattern,
                elapsed_ms = backoff.elapsed().as_millis(),
                next_delay_ms = delay.as_millis(),
                "bot comment not found yet"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, spec: &WatchSpec) -> Result<Verdict, GitHubError> {
        let client = self.context.client();
        let locator = self.context.locator();

        let pull_request = client.pull_request(locator).await?;
        let comments = client.issue_comments(locator).await?;
        let reference = spec
            .since
            .map_or(pull_request.created_at, |anchor| anchor.created_at);

        Ok(scan_comments(
            &comments,
            reference,
            spec,
            self.context.bot_login(),
        ))
    }
}
