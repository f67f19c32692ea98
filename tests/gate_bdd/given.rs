//! Given steps for gate behavioural tests.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use rstest_bdd_macros::given;

use crate::gate_bdd_state::{BOT_LOGIN, GateState, OPENED_AT, comment_json};
use crate::support::runtime;

const STALE_PLAN: &str = "**Plan Error**\n```\nGET https://api.github.com/repos/octo/infra/pulls/22: \
                          404 Not Found\n```";

fn pull_request_path(pr: u64) -> String {
    format!("/api/v3/repos/octo/infra/pulls/{pr}")
}

fn mount_all(gate_state: &GateState, mocks: Vec<Mock>) {
    runtime::mount_all(&gate_state.runtime, &gate_state.server, mocks)
        .unwrap_or_else(|error| panic!("failed to prepare mock GitHub server: {error}"));
}

fn pull_request_mock(pr: u64, merged: bool) -> Mock {
    Mock::given(method("GET"))
        .and(path(pull_request_path(pr)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": pr,
            "created_at": OPENED_AT,
            "merged": merged,
            "state": if merged { "closed" } else { "open" },
            "html_url": format!("https://github.com/octo/infra/pull/{pr}")
        })))
}

#[given("a GitHub server where pull request {pr:u64} is merged")]
fn merged_pull_request(gate_state: &GateState, pr: u64) {
    mount_all(gate_state, vec![pull_request_mock(pr, true)]);
}

#[given("a GitHub server where pull request {pr:u64} is open")]
fn open_pull_request(gate_state: &GateState, pr: u64) {
    let approve = Mock::given(method("POST"))
        .and(path(format!("{}/reviews", pull_request_path(pr))))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 7, "state": "APPROVED" })),
        );
    let post_comment = Mock::given(method("POST"))
        .and(path(format!("/api/v3/repos/octo/infra/issues/{pr}/comments")))
        .respond_with(ResponseTemplate::new(201).set_body_json(comment_json(
            900,
            "release-robot",
            "command",
            60,
        )));

    mount_all(
        gate_state,
        vec![pull_request_mock(pr, false), approve, post_comment],
    );
}

#[given("a GitHub server that rejects the token for pull request {pr:u64}")]
fn rejecting_server(gate_state: &GateState, pr: u64) {
    let rejection = Mock::given(method("GET"))
        .and(path(pull_request_path(pr)))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
        );
    mount_all(gate_state, vec![rejection]);
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[given("the bot planned directory {directory}")]
fn planned_directory(gate_state: &GateState, directory: String) {
    let body = format!(
        "Ran Plan for dir: `{}` workspace: `default`\n\n```diff\n+ aws_vpc.main\n```",
        directory.trim_matches('"')
    );
    gate_state.push_comment(comment_json(2, BOT_LOGIN, &body, 40));
}

#[given("the bot first failed to read the pull request while planning")]
fn stale_plan(gate_state: &GateState) {
    let failure = comment_json(2, BOT_LOGIN, STALE_PLAN, 20);
    gate_state.first_feed.set(vec![failure.clone()]);
    gate_state.push_comment(failure);
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[given("after the corrective plan the bot planned directory {directory}")]
fn replanned_directory(gate_state: &GateState, directory: String) {
    let body = format!(
        "Ran Plan for dir: `{}` workspace: `default`",
        directory.trim_matches('"')
    );
    gate_state.push_comment(comment_json(4, BOT_LOGIN, &body, 80));
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[given("the bot answered the apply command with {body}")]
fn apply_answer(gate_state: &GateState, body: String) {
    gate_state.push_comment(comment_json(6, BOT_LOGIN, body.trim_matches('"'), 100));
}
