//! Atlantis gate library crate: approves and applies pull requests planned
//! by the Atlantis bot.
//!
//! The library watches a pull request's comment feed for the bot's plan
//! report, approves the pull request, asks the bot to apply the planned
//! directory, and waits for the apply confirmation. GitHub access goes
//! through Octocrab behind a trait so the workflow can be driven by a mock.

pub mod config;
pub mod context;
pub mod gate;
pub mod github;
pub mod watcher;

pub use config::AtlantisGateConfig;
pub use context::GateContext;
pub use gate::{GateController, GateError, GateOutcome, GateSettings};
pub use github::{
    GitHubError, OctocrabGateway, PersonalAccessToken, PullRequestGateway, PullRequestLocator,
};
pub use watcher::{CommentWatcher, WatchAnchor, WatchOutcome, WatchSpec};
