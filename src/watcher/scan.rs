//! Evaluation of a single snapshot of the comment feed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::github::IssueComment;

use super::WatchSpec;

/// What one snapshot of the feed says about the watched pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The newest qualifying bot comment matches and is fresh.
    Found(IssueComment),
    /// A bot comment carries the error pattern.
    ErrorDetected(IssueComment),
    /// The newest matching bot comment is too far from the reference time.
    Stale {
        /// The matching comment.
        comment: IssueComment,
        /// Whole-second distance from the reference time.
        delta: Duration,
    },
    /// No bot comment mentions either pattern yet.
    NotYet,
}

/// Scans `comments` newest first for the bot's verdict on `spec`.
///
/// Provider order is ignored: comments are ranked by `created_at`, with the
/// later position winning ties. Within one comment the error pattern takes
/// precedence over the success pattern. Staleness is measured against
/// `reference` in whole seconds, inclusive of the tolerance.
#[must_use]
pub fn scan_comments(
    comments: &[IssueComment],
    reference: DateTime<Utc>,
    spec: &WatchSpec,
    bot_login: &str,
) -> Verdict {
    let mut ranked: Vec<(usize, &IssueComment)> = comments.iter().enumerate().collect();
    ranked.sort_by(|(left_index, left), (right_index, right)| {
        right
            .created_at
            .cmp(&left.created_at)
            .then(right_index.cmp(left_index))
    });

    for (_, comment) in ranked {
        if !comment.is_authored_by(bot_login) {
            continue;
        }
        if spec.since.is_some_and(|anchor| !anchor.precedes(comment)) {
            trace!(comment_id = comment.id, "skipping comment older than the watch window");
            continue;
        }

        if comment.body.contains(&spec.error_pattern) {
            return Verdict::ErrorDetected(comment.clone());
        }

        if comment.body.contains(&spec.success_pattern) {
            let delta = seconds_between(reference, comment.created_at);
            if delta <= spec.tolerance.as_secs() {
                return Verdict::Found(comment.clone());
            }
            return Verdict::Stale {
                comment: comment.clone(),
                delta: Duration::from_secs(delta),
            };
        }

        trace!(
            comment_id = comment.id,
            pattern = %spec.success_pattern,
            "bot comment does not mention the watched pattern"
        );
    }

    Verdict::NotYet
}

fn seconds_between(left: DateTime<Utc>, right: DateTime<Utc>) -> u64 {
    (left - right).num_seconds().unsigned_abs()
}
