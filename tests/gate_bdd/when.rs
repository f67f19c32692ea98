//! When steps for gate behavioural tests.

use std::time::Duration;

use atlantis_gate::gate::GateSettings;
use atlantis_gate::watcher::BackoffConfig;
use atlantis_gate::{
    GateContext, GateController, OctocrabGateway, PersonalAccessToken,
    PullRequestLocator,
};
use rstest_bdd_macros::when;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::gate_bdd_state::{BOT_LOGIN, GateState};
use crate::support::runtime;

fn quick_settings() -> GateSettings {
    GateSettings {
        backoff: BackoffConfig {
            initial_interval: Duration::from_millis(20),
            multiplier: 1.5,
            randomization_factor: 0.0,
            max_interval: Duration::from_millis(200),
            max_elapsed: Duration::from_secs(3),
        },
        settle_delay: Duration::ZERO,
        ..GateSettings::default()
    }
}

fn comment_feed_mocks(gate_state: &GateState, pr: u64) -> Vec<Mock> {
    let comments_path = format!("/api/v3/repos/octo/infra/issues/{pr}/comments");
    let mut mocks = Vec::new();

    if let Some(first) = gate_state.first_feed.get() {
        mocks.push(
            Mock::given(method("GET"))
                .and(path(comments_path.clone()))
                .respond_with(ResponseTemplate::new(200).set_body_json(first))
                .up_to_n_times(1)
                .with_priority(1),
        );
    }
    if let Some(feed) = gate_state.feed.get() {
        mocks.push(
            Mock::given(method("GET"))
                .and(path(comments_path))
                .respond_with(ResponseTemplate::new(200).set_body_json(feed)),
        );
    }
    mocks
}

#[expect(
    clippy::expect_used,
    reason = "integration test step; allow-expect-in-tests does not cover integration tests"
)]
#[when("the gate runs for pull request {pr:u64}")]
fn run_gate(gate_state: &GateState, pr: u64) {
    let shared_runtime = gate_state.runtime.get().expect("runtime not initialised");
    let server_url = gate_state
        .server
        .with_ref(MockServer::uri)
        .expect("mock server not initialised");

    runtime::mount_all(
        &gate_state.runtime,
        &gate_state.server,
        comment_feed_mocks(gate_state, pr),
    )
    .expect("comment feed should mount");

    let result = shared_runtime.block_on(async {
        let locator =
            PullRequestLocator::from_slug("octo/infra", pr, &format!("{server_url}/api/v3"))?;
        let token = PersonalAccessToken::new("test-token")?;
        let gateway = OctocrabGateway::for_token(&token, &locator)?;
        let context = GateContext::new(&gateway, locator, BOT_LOGIN);
        GateController::new(&context, quick_settings()).run().await
    });

    match result {
        Ok(outcome) => {
            drop(gate_state.error.take());
            gate_state.outcome.set(outcome);
        }
        Err(error) => {
            drop(gate_state.outcome.take());
            gate_state.error.set(error);
        }
    }
}
