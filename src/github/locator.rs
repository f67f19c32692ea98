//! Identity wrappers for the pull request being gated.

use url::Url;

use super::error::GitHubError;

/// Public GitHub API endpoint used when no override is configured.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    fn new(value: &str, slug: &str) -> Result<Self, GitHubError> {
        if value.is_empty() {
            return Err(GitHubError::InvalidRepository {
                slug: slug.to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    fn new(value: &str, slug: &str) -> Result<Self, GitHubError> {
        if value.is_empty() {
            return Err(GitHubError::InvalidRepository {
                slug: slug.to_owned(),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Wraps a pull request number.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, GitHubError> {
        if value == 0 {
            return Err(GitHubError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GitHubError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GitHubError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl std::fmt::Debug for PersonalAccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("PersonalAccessToken(<redacted>)")
    }
}

/// Fully resolved pull request reference plus the API base that serves it.
///
/// # Example
///
/// ```
/// use atlantis_gate::github::PullRequestLocator;
///
/// let locator = PullRequestLocator::from_slug("octo/infra", 22, "https://api.github.com")
///     .expect("slug should parse");
/// assert_eq!(locator.owner().as_str(), "octo");
/// assert_eq!(locator.repository().as_str(), "infra");
/// assert_eq!(locator.number().get(), 22);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
    number: PullRequestNumber,
}

impl PullRequestLocator {
    /// Builds a locator from an `owner/repo` slug, a PR number and an API
    /// base URL.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidRepository` when the slug is not exactly
    /// two non-empty segments, `InvalidPullRequestNumber` for zero, and
    /// `InvalidUrl` when the API base cannot be parsed.
    pub fn from_slug(slug: &str, number: u64, api_base: &str) -> Result<Self, GitHubError> {
        let (owner_segment, repository_segment) =
            slug.trim().split_once('/').ok_or_else(|| GitHubError::InvalidRepository {
                slug: slug.to_owned(),
            })?;

        if repository_segment.contains('/') {
            return Err(GitHubError::InvalidRepository {
                slug: slug.to_owned(),
            });
        }

        let owner = RepositoryOwner::new(owner_segment, slug)?;
        let repository = RepositoryName::new(repository_segment, slug)?;
        let pull_request = PullRequestNumber::new(number)?;
        let api_url =
            Url::parse(api_base).map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

        Ok(Self {
            api_base: api_url,
            owner,
            repository,
            number: pull_request,
        })
    }

    /// API base URL the gateway talks to.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    pub(crate) fn pull_request_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls/{}",
            self.owner.as_str(),
            self.repository.as_str(),
            self.number.get()
        )
    }

    pub(crate) fn comments_path(&self) -> String {
        format!(
            "/repos/{}/{}/issues/{}/comments",
            self.owner.as_str(),
            self.repository.as_str(),
            self.number.get()
        )
    }

    pub(crate) fn reviews_path(&self) -> String {
        format!("{}/reviews", self.pull_request_path())
    }

    pub(crate) fn requested_reviewers_path(&self) -> String {
        format!("{}/requested_reviewers", self.pull_request_path())
    }
}

impl std::fmt::Display for PullRequestLocator {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}/{}/pull/{}",
            self.owner.as_str(),
            self.repository.as_str(),
            self.number.get()
        )
    }
}
