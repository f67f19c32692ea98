//! Errors that end a gate run.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::github::{GitHubError, IssueComment};
use crate::watcher::WatchOutcome;

/// Step of the bot workflow a watch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the plan comment.
    Plan,
    /// Waiting for the apply comment.
    Apply,
}

impl fmt::Display for Phase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Plan => "plan",
            Self::Apply => "apply",
        })
    }
}

/// Fatal conditions of a gate run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// A GitHub call outside the watch loop failed.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// The bot did not report within the watch budget.
    #[error(
        "no {phase} comment from the bot after {minutes} minutes",
        minutes = format_minutes(*.elapsed)
    )]
    TimedOut {
        /// Phase being watched.
        phase: Phase,
        /// Time spent watching.
        elapsed: Duration,
    },

    /// The bot posted its error marker.
    #[error("the bot reported a {phase} error:\n{body}")]
    BotReportedError {
        /// Phase being watched.
        phase: Phase,
        /// Full comment body.
        body: String,
    },

    /// The matching comment is too far from the reference time to belong to
    /// this run.
    #[error(
        "{phase} comment posted {delta_secs}s from the reference time exceeds the {tolerance_secs}s tolerance",
        delta_secs = .delta.as_secs(),
        tolerance_secs = .tolerance.as_secs()
    )]
    StaleComment {
        /// Phase being watched.
        phase: Phase,
        /// Distance from the reference time.
        delta: Duration,
        /// Configured tolerance.
        tolerance: Duration,
    },

    /// The comment feed could not be read.
    #[error("could not read the {phase} comment feed: {source}")]
    FetchFailed {
        /// Phase being watched.
        phase: Phase,
        /// Last fetch error.
        source: GitHubError,
    },

    /// The plan comment does not name a directory.
    #[error("plan comment does not name a directory between backticks: {line:?}")]
    MissingResourcePath {
        /// First line of the plan comment.
        line: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}

/// Unwraps the comment of a successful watch, mapping every other outcome
/// onto the matching [`GateError`].
pub(crate) fn found_comment(phase: Phase, outcome: WatchOutcome) -> Result<IssueComment, GateError> {
    match outcome {
        WatchOutcome::Found(comment) => Ok(comment),
        WatchOutcome::TimedOut { elapsed } => Err(GateError::TimedOut { phase, elapsed }),
        WatchOutcome::ErrorDetected { comment } => Err(GateError::BotReportedError {
            phase,
            body: comment.body,
        }),
        WatchOutcome::Stale {
            delta, tolerance, ..
        } => Err(GateError::StaleComment {
            phase,
            delta,
            tolerance,
        }),
        WatchOutcome::TransientFailure { error, .. } => Err(GateError::FetchFailed {
            phase,
            source: error,
        }),
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "minutes are shown with one decimal place"
)]
fn format_minutes(elapsed: Duration) -> String {
    format!("{:.1}", elapsed.as_secs_f64() / 60.0)
}
