//! Per-invocation context shared by the comment watcher and the gate.

use crate::github::{PullRequestGateway, PullRequestLocator};

/// Everything a gate run needs to reach the pull request and recognise the
/// bot: the gateway handle, the pull request, and the bot's login.
///
/// Built once by the driver and borrowed by every component.
pub struct GateContext<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    client: &'client Gateway,
    locator: PullRequestLocator,
    bot_login: String,
}

impl<'client, Gateway> GateContext<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Creates a context around a gateway.
    #[must_use]
    pub fn new(
        client: &'client Gateway,
        locator: PullRequestLocator,
        bot_login: impl Into<String>,
    ) -> Self {
        Self {
            client,
            locator,
            bot_login: bot_login.into(),
        }
    }

    /// Gateway used for every GitHub call.
    #[must_use]
    pub const fn client(&self) -> &'client Gateway {
        self.client
    }

    /// Pull request being gated.
    #[must_use]
    pub const fn locator(&self) -> &PullRequestLocator {
        &self.locator
    }

    /// Login the bot posts its comments under.
    #[must_use]
    pub fn bot_login(&self) -> &str {
        &self.bot_login
    }
}
