//! Gate controller: drives a pull request through the bot's plan and apply
//! steps.
//!
//! A run is strictly sequential:
//!
//! 1. stop early if the pull request is already merged;
//! 2. wait for the plan comment, re-requesting a plan a bounded number of
//!    times when the bot could not read the pull request;
//! 3. approve, optionally request reviewers, and let GitHub settle;
//! 4. post the apply command for the planned directory;
//! 5. wait for the apply confirmation.
//!
//! Every failure is returned as a [`GateError`]; nothing here exits the
//! process.

mod error;
pub mod protocol;


use std::time::Duration;

use tracing::{info, warn};

use crate::context::GateContext;
use crate::github::{IssueComment, PullRequestGateway};
use crate::watcher::{BackoffConfig, CommentWatcher, WatchAnchor, WatchOutcome, WatchSpec};

pub use error::{GateError, Phase};

use error::found_comment;

/// Default pause between approval and the apply command.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);
/// Default number of corrective plans after a stale-data plan error.
pub const DEFAULT_MAX_REPLANS: u32 = 1;
/// Default plan tolerance.
pub const DEFAULT_PLAN_TOLERANCE: Duration = Duration::from_secs(65);
/// Default apply tolerance.
pub const DEFAULT_APPLY_TOLERANCE: Duration = Duration::from_secs(120);

/// Tunables for a gate run.
#[derive(Debug, Clone, PartialEq)]
pub struct GateSettings {
    /// Largest distance between the reference time and the plan comment.
    pub plan_tolerance: Duration,
    /// Largest distance between the reference time and the apply comment.
    pub apply_tolerance: Duration,
    /// Polling schedule shared by both watches.
    pub backoff: BackoffConfig,
    /// Pause between approval and the apply command.
    pub settle_delay: Duration,
    /// Corrective plans allowed after a stale-data plan error.
    pub max_replans: u32,
    /// Logins asked to review after approval; empty skips the request.
    pub reviewers: Vec<String>,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            plan_tolerance: DEFAULT_PLAN_TOLERANCE,
            apply_tolerance: DEFAULT_APPLY_TOLERANCE,
            backoff: BackoffConfig::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_replans: DEFAULT_MAX_REPLANS,
            reviewers: Vec::new(),
        }
    }
}

/// Successful end of a gate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The pull request was merged before the run started; nothing was done.
    AlreadyMerged,
    /// The bot confirmed the apply.
    Applied {
        /// Directory the bot planned and applied.
        resource_path: String,
        /// Workspace passed to the apply command.
        workspace: String,
        /// The bot's apply confirmation.
        apply_comment: IssueComment,
    },
}

/// Plan comment together with the directory it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    /// The bot's plan comment.
    pub comment: IssueComment,
    /// Directory between the first pair of backticks.
    pub resource_path: String,
    /// Corrective plan command the plan was awaited after, if one was
    /// posted.
    pub since: Option<WatchAnchor>,
}

/// Runs the gate workflow for one pull request.
pub struct GateController<'ctx, Gateway>
where
    Gateway: PullRequestGateway,
{
    context: &'ctx GateContext<'ctx, Gateway>,
    settings: GateSettings,
}

impl<'ctx, Gateway> GateController<'ctx, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Creates a controller over a shared context.
    #[must_use]
    pub const fn new(context: &'ctx GateContext<'ctx, Gateway>, settings: GateSettings) -> Self {
        Self { context, settings }
    }

    /// Runs the full workflow.
    ///
    /// # Errors
    ///
    /// Returns the first [`GateError`] raised by any step.
    pub async fn run(&self) -> Result<GateOutcome, GateError> {
        let locator = self.context.locator();
        info!(pull_request = %locator, "gating pull request");

        if self.check_already_merged().await? {
            info!(pull_request = %locator, "pull request already merged; nothing to do");
            return Ok(GateOutcome::AlreadyMerged);
        }

        let plan = self.await_plan().await?;
        self.approve().await?;
        self.request_reviewers().await?;
        self.settle().await;

        let workspace = self.trigger_apply(&plan.resource_path).await?;
        let apply_comment = self.await_apply(plan.since).await?;

        info!(
            resource_path = %plan.resource_path,
            %workspace,
            "apply confirmed"
        );
        Ok(GateOutcome::Applied {
            resource_path: plan.resource_path,
            workspace,
            apply_comment,
        })
    }

    /// Reports whether the pull request has already been merged.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::GitHub`] when the pull request cannot be read.
    pub async fn check_already_merged(&self) -> Result<bool, GateError> {
        let pull_request = self
            .context
            .client()
            .pull_request(self.context.locator())
            .await?;
        Ok(pull_request.merged)
    }

    /// Waits for a fresh plan comment and extracts its directory.
    ///
    /// A plan error caused by the bot failing to read the pull request is
    /// answered with a corrective plan command, up to `max_replans` times.
    /// Each later watch only considers comments posted after the command.
    ///
    /// # Errors
    ///
    /// Returns the watch failure as a [`GateError`], or
    /// [`GateError::MissingResourcePath`] when the plan comment names no
    /// directory.
    pub async fn await_plan(&self) -> Result<PlanReport, GateError> {
        let watcher = CommentWatcher::new(self.context);
        let mut spec = WatchSpec::new(
            protocol::PLAN_SUCCESS,
            protocol::PLAN_ERROR,
            self.settings.plan_tolerance,
            self.settings.backoff,
        );
        let mut replans = 0;
        let mut since = None;

        let comment = loop {
            match watcher.watch(&spec).await {
                WatchOutcome::Found(comment) => break comment,
                WatchOutcome::ErrorDetected { comment }
                    if replans < self.settings.max_replans
                        && comment.body.contains(protocol::STALE_PULL_REQUEST_SIGNATURE) =>
                {
                    replans += 1;
                    warn!(
                        comment_id = comment.id,
                        attempt = replans,
                        "bot could not read the pull request; requesting a new plan"
                    );
                    let command = self.post_comment(protocol::PLAN_COMMAND).await?;
                    let anchor = WatchAnchor::from(&command);
                    spec = spec.since(anchor);
                    since = Some(anchor);
                }
                outcome => break found_comment(Phase::Plan, outcome)?,
            }
        };

        let resource_path = protocol::resource_path(&comment.body)
            .map(str::to_owned)
            .ok_or_else(|| GateError::MissingResourcePath {
                line: comment.first_line().to_owned(),
            })?;
        info!(comment_id = comment.id, %resource_path, "plan succeeded");

        Ok(PlanReport {
            comment,
            resource_path,
            since,
        })
    }

    /// Approves the pull request.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::GitHub`] when the review is rejected.
    pub async fn approve(&self) -> Result<(), GateError> {
        let review = self
            .context
            .client()
            .approve(self.context.locator())
            .await?;
        info!(review_id = review.id, state = ?review.state, "pull request approved");
        Ok(())
    }

    /// Requests the configured reviewers; does nothing when none are set.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::GitHub`] when the request is rejected.
    pub async fn request_reviewers(&self) -> Result<(), GateError> {
        if self.settings.reviewers.is_empty() {
            return Ok(());
        }
        self.context
            .client()
            .request_reviewers(self.context.locator(), &self.settings.reviewers)
            .await?;
        info!(reviewers = ?self.settings.reviewers, "reviewers requested");
        Ok(())
    }

    /// Posts the apply command for `resource_path` and returns the workspace
    /// it names.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::GitHub`] when the comment cannot be posted.
    pub async fn trigger_apply(&self, resource_path: &str) -> Result<String, GateError> {
        let workspace = protocol::workspace_name(resource_path);
        let command = protocol::apply_command(resource_path, &workspace);
        self.post_comment(&command).await?;
        Ok(workspace)
    }

    /// Waits for the apply confirmation.
    ///
    /// The tolerance is measured from `since` when the plan needed a
    /// corrective command, otherwise from the pull request creation time. A
    /// comment carrying the apply error marker ends the watch as an error
    /// even when it also carries the success marker.
    ///
    /// # Errors
    ///
    /// Returns the watch failure as a [`GateError`].
    pub async fn await_apply(
        &self,
        since: Option<WatchAnchor>,
    ) -> Result<IssueComment, GateError> {
        let mut spec = WatchSpec::new(
            protocol::APPLY_SUCCESS,
            protocol::APPLY_ERROR,
            self.settings.apply_tolerance,
            self.settings.backoff,
        );
        if let Some(anchor) = since {
            spec = spec.since(anchor);
        }
        let outcome = CommentWatcher::new(self.context).watch(&spec).await;
        found_comment(Phase::Apply, outcome)
    }

    async fn settle(&self) {
        if self.settings.settle_delay.is_zero() {
            return;
        }
        tokio::time::sleep(self.settings.settle_delay).await;
    }

    async fn post_comment(&self, body: &str) -> Result<IssueComment, GateError> {
        let comment = self
            .context
            .client()
            .create_comment(self.context.locator(), body)
            .await?;
        info!(comment_id = comment.id, %body, "comment posted");
        Ok(comment)
    }
}
