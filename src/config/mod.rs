//! Gate configuration loaded from CLI, environment, and files.
//!
//! Values are merged with ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in defaults matching the bot's usual timing
//! 2. **Configuration file** – `.atlantis-gate.toml` in current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `ATLANTIS_GATE_*`, plus the legacy
//!    `GITHUB_API_TOKEN`, `GITHUB_TOKEN`, and `GITHUB_REPOSITORY` fallbacks
//! 4. **Command-line arguments** – `--pr-number`/`-p`, `--token`/`-t`,
//!    `--repository`/`-r`, and one long flag per tunable
//!
//! # Configuration File
//!
//! ```toml
//! repository = "octo/infra"
//! bot_login = "atlantis-bot"
//! plan_tolerance_seconds = 90
//! apply_tolerance_seconds = 300
//! reviewers = "alice,bob"
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::gate::{
    DEFAULT_APPLY_TOLERANCE, DEFAULT_MAX_REPLANS, DEFAULT_PLAN_TOLERANCE, GateError, GateSettings,
};
use crate::github::{DEFAULT_API_BASE, GitHubError, PullRequestLocator};
use crate::watcher::BackoffConfig;

/// Login the Atlantis bot posts under when none is configured.
pub const DEFAULT_BOT_LOGIN: &str = "blinkhealthgithub";

const LEGACY_TOKEN_VARIABLES: [&str; 2] = ["GITHUB_API_TOKEN", "GITHUB_TOKEN"];
const LEGACY_REPOSITORY_VARIABLE: &str = "GITHUB_REPOSITORY";

/// Gate configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `ATLANTIS_GATE_PR_NUMBER` or `--pr-number`: Pull request number
/// - `ATLANTIS_GATE_TOKEN`, `GITHUB_API_TOKEN`, `GITHUB_TOKEN`, or `--token`:
///   Authentication token
/// - `ATLANTIS_GATE_REPOSITORY`, `GITHUB_REPOSITORY`, or `--repository`:
///   Repository slug (`owner/repo`)
///
/// # Example
///
/// ```no_run
/// use atlantis_gate::AtlantisGateConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = AtlantisGateConfig::load().expect("failed to load configuration");
/// let locator = config.locator().expect("pull request required");
/// let settings = config.gate_settings().expect("valid tunables");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "ATLANTIS_GATE",
    discovery(
        dotfile_name = ".atlantis-gate.toml",
        config_file_name = "atlantis-gate.toml",
        app_name = "atlantis-gate"
    )
)]
pub struct AtlantisGateConfig {
    /// Number of the pull request to gate.
    ///
    /// Can be provided via:
    /// - CLI: `--pr-number <N>` or `-p <N>`
    /// - Environment: `ATLANTIS_GATE_PR_NUMBER`
    #[ortho_config(cli_short = 'p')]
    pub pr_number: Option<u64>,

    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `ATLANTIS_GATE_TOKEN`, or legacy `GITHUB_API_TOKEN` /
    ///   `GITHUB_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Repository slug in `owner/repo` form.
    ///
    /// Can be provided via:
    /// - CLI: `--repository <SLUG>` or `-r <SLUG>`
    /// - Environment: `ATLANTIS_GATE_REPOSITORY`, or legacy
    ///   `GITHUB_REPOSITORY` as set by GitHub Actions
    /// - Config file: `repository = "..."`
    #[ortho_config(cli_short = 'r')]
    pub repository: Option<String>,

    /// GitHub API base URL; override for GitHub Enterprise.
    #[ortho_config()]
    pub api_base: String,

    /// Login the Atlantis bot comments under.
    #[ortho_config()]
    pub bot_login: String,

    /// Largest distance, in seconds, between pull request creation (or the
    /// last corrective plan) and an accepted plan comment.
    #[ortho_config()]
    pub plan_tolerance_seconds: u64,

    /// Largest distance, in seconds, between pull request creation and an
    /// accepted apply comment.
    #[ortho_config()]
    pub apply_tolerance_seconds: u64,

    /// First delay between comment polls, in milliseconds.
    #[ortho_config()]
    pub initial_interval_ms: u64,

    /// Growth factor applied to the poll delay after every attempt.
    #[ortho_config()]
    pub backoff_multiplier: f64,

    /// Relative jitter applied to every poll delay, between 0 and 1.
    #[ortho_config()]
    pub randomization_factor: f64,

    /// Cap on a single poll delay, in seconds.
    #[ortho_config()]
    pub max_interval_seconds: u64,

    /// Total time budget of one watch, in seconds.
    #[ortho_config()]
    pub max_elapsed_seconds: u64,

    /// Pause between approving and posting the apply command, in
    /// milliseconds.
    #[ortho_config()]
    pub settle_delay_ms: u64,

    /// Corrective `atlantis plan` comments allowed when the bot could not
    /// read the pull request.
    #[ortho_config()]
    pub max_replans: u32,

    /// Comma-separated logins to request reviews from after approval.
    #[ortho_config()]
    pub reviewers: Option<String>,
}

const DEFAULT_INITIAL_INTERVAL_MS: u64 = 800;
const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;

impl Default for AtlantisGateConfig {
    fn default() -> Self {
        Self {
            pr_number: None,
            token: None,
            repository: None,
            api_base: DEFAULT_API_BASE.to_owned(),
            bot_login: DEFAULT_BOT_LOGIN.to_owned(),
            plan_tolerance_seconds: DEFAULT_PLAN_TOLERANCE.as_secs(),
            apply_tolerance_seconds: DEFAULT_APPLY_TOLERANCE.as_secs(),
            initial_interval_ms: DEFAULT_INITIAL_INTERVAL_MS,
            backoff_multiplier: BackoffConfig::DEFAULT_MULTIPLIER,
            randomization_factor: BackoffConfig::DEFAULT_RANDOMIZATION_FACTOR,
            max_interval_seconds: BackoffConfig::DEFAULT_MAX_INTERVAL.as_secs(),
            max_elapsed_seconds: BackoffConfig::DEFAULT_MAX_ELAPSED.as_secs(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            max_replans: DEFAULT_MAX_REPLANS,
            reviewers: None,
        }
    }
}

impl AtlantisGateConfig {
    /// Resolves the token from configuration or the legacy
    /// `GITHUB_API_TOKEN` and `GITHUB_TOKEN` environment variables, in that
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::MissingToken`] when no token source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, GitHubError> {
        self.token
            .clone()
            .or_else(|| {
                LEGACY_TOKEN_VARIABLES
                    .iter()
                    .find_map(|name| env::var(name).ok())
            })
            .ok_or(GitHubError::MissingToken)
    }

    /// Returns the pull request number or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Configuration`] when no number is configured.
    pub fn require_pr_number(&self) -> Result<u64, GateError> {
        self.pr_number.ok_or_else(|| GateError::Configuration {
            message: "pull request number is required (use --pr-number or -p)".to_owned(),
        })
    }

    /// Returns the repository slug, falling back to `GITHUB_REPOSITORY`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Configuration`] when no slug is configured.
    pub fn require_repository(&self) -> Result<String, GateError> {
        self.repository
            .clone()
            .or_else(|| env::var(LEGACY_REPOSITORY_VARIABLE).ok())
            .ok_or_else(|| GateError::Configuration {
                message: "repository is required (use --repository or -r, or set \
                          GITHUB_REPOSITORY)"
                    .to_owned(),
            })
    }

    /// Builds the locator for the configured pull request.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Configuration`] when the number or repository is
    /// missing, or [`GateError::GitHub`] when they do not form a valid
    /// locator.
    pub fn locator(&self) -> Result<PullRequestLocator, GateError> {
        let number = self.require_pr_number()?;
        let repository = self.require_repository()?;
        Ok(PullRequestLocator::from_slug(
            &repository,
            number,
            &self.api_base,
        )?)
    }

    /// Builds the polling schedule.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Configuration`] when either interval is zero, the
    /// multiplier is below one, or the randomization factor lies outside
    /// `0..=1`.
    pub fn backoff_config(&self) -> Result<BackoffConfig, GateError> {
        if self.initial_interval_ms == 0 {
            return Err(GateError::Configuration {
                message: "initial_interval_ms must be greater than zero".to_owned(),
            });
        }
        if self.max_interval_seconds == 0 {
            return Err(GateError::Configuration {
                message: "max_interval_seconds must be greater than zero".to_owned(),
            });
        }
        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err(GateError::Configuration {
                message: format!(
                    "backoff_multiplier must be at least 1, got {}",
                    self.backoff_multiplier
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.randomization_factor) {
            return Err(GateError::Configuration {
                message: format!(
                    "randomization_factor must be between 0 and 1, got {}",
                    self.randomization_factor
                ),
            });
        }

        Ok(BackoffConfig {
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            multiplier: self.backoff_multiplier,
            randomization_factor: self.randomization_factor,
            max_interval: Duration::from_secs(self.max_interval_seconds),
            max_elapsed: Duration::from_secs(self.max_elapsed_seconds),
        })
    }

    /// Splits the reviewer list, dropping blanks.
    #[must_use]
    pub fn reviewer_logins(&self) -> Vec<String> {
        self.reviewers
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|login| !login.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Collects the tunables of a gate run.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Configuration`] when the backoff settings are
    /// invalid.
    pub fn gate_settings(&self) -> Result<GateSettings, GateError> {
        Ok(GateSettings {
            plan_tolerance: Duration::from_secs(self.plan_tolerance_seconds),
            apply_tolerance: Duration::from_secs(self.apply_tolerance_seconds),
            backoff: self.backoff_config()?,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            max_replans: self.max_replans,
            reviewers: self.reviewer_logins(),
        })
    }
}
