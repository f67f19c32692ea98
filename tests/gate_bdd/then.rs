//! Then steps for gate behavioural tests.

use atlantis_gate::gate::Phase;
use atlantis_gate::{GateError, GateOutcome, GitHubError};
use rstest_bdd_macros::then;
use serde_json::Value;
use wiremock::Request;

use crate::gate_bdd_state::GateState;

#[expect(
    clippy::expect_used,
    reason = "integration test helper; allow-expect-in-tests does not cover integration tests"
)]
fn received_posts(gate_state: &GateState, suffix: &str) -> Vec<Request> {
    let runtime = gate_state.runtime.get().expect("runtime not initialised");
    gate_state
        .server
        .with_ref(|server| runtime.block_on(server.received_requests()))
        .expect("mock server not initialised")
        .expect("request recording is not enabled")
        .into_iter()
        .filter(|request| request.method.as_str() == "POST" && request.url.path().ends_with(suffix))
        .collect()
}

fn posted_comment_bodies(gate_state: &GateState) -> Vec<String> {
    received_posts(gate_state, "/comments")
        .iter()
        .filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .filter_map(|payload| payload.get("body").and_then(Value::as_str).map(str::to_owned))
        .collect()
}

fn last_error(gate_state: &GateState) -> GateError {
    gate_state.error.with_ref(Clone::clone).unwrap_or_else(|| {
        let outcome = gate_state.outcome.with_ref(Clone::clone);
        panic!("expected the gate to fail; outcome: {outcome:?}")
    })
}

#[then("the gate reports the pull request as already merged")]
fn assert_already_merged(gate_state: &GateState) {
    let outcome = gate_state.outcome.with_ref(Clone::clone);
    let error = gate_state.error.with_ref(Clone::clone);
    assert_eq!(
        outcome,
        Some(GateOutcome::AlreadyMerged),
        "unexpected outcome; last error: {error:?}"
    );
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[then("the gate reports directory {directory} applied in workspace {workspace}")]
fn assert_applied(gate_state: &GateState, directory: String, workspace: String) {
    let Some(outcome) = gate_state.outcome.with_ref(Clone::clone) else {
        let error = gate_state.error.with_ref(Clone::clone);
        panic!("gate outcome missing; last error: {error:?}");
    };

    match outcome {
        GateOutcome::Applied {
            resource_path,
            workspace: applied_workspace,
            apply_comment,
        } => {
            assert_eq!(resource_path, directory.trim_matches('"'));
            assert_eq!(applied_workspace, workspace.trim_matches('"'));
            assert!(
                apply_comment.body.starts_with("Ran Apply for dir"),
                "unexpected apply comment {:?}",
                apply_comment.body
            );
        }
        GateOutcome::AlreadyMerged => panic!("expected Applied, got AlreadyMerged"),
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[then("the gate fails with a bot-reported {phase} error")]
fn assert_bot_error(gate_state: &GateState, phase: String) {
    match last_error(gate_state) {
        GateError::BotReportedError {
            phase: reported, ..
        } => {
            let expected = match phase.as_str() {
                "plan" => Phase::Plan,
                "apply" => Phase::Apply,
                other => panic!("unknown phase {other}"),
            };
            assert_eq!(reported, expected, "error reported for the wrong phase");
        }
        other => panic!("expected BotReportedError, got {other:?}"),
    }
}

#[then("the gate fails with an authentication error")]
fn assert_authentication_error(gate_state: &GateState) {
    let error = last_error(gate_state);
    assert!(
        matches!(
            error,
            GateError::GitHub(GitHubError::Authentication { ref message })
                if message.contains("Bad credentials")
        ),
        "expected authentication failure, got {error:?}"
    );
}

#[then("the pull request was approved")]
fn assert_approved(gate_state: &GateState) {
    let reviews = received_posts(gate_state, "/reviews");
    assert_eq!(reviews.len(), 1, "expected exactly one review submission");
    let payload = reviews
        .first()
        .and_then(|request| serde_json::from_slice::<Value>(&request.body).ok())
        .unwrap_or_default();
    assert_eq!(
        payload.get("event").and_then(Value::as_str),
        Some("APPROVE")
    );
}

#[then("the pull request was not approved")]
fn assert_not_approved(gate_state: &GateState) {
    assert!(
        received_posts(gate_state, "/reviews").is_empty(),
        "no review should have been submitted"
    );
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[then("the comment {body} was posted once")]
fn assert_posted_once(gate_state: &GateState, body: String) {
    let expected = body.trim_matches('"');
    let matching = posted_comment_bodies(gate_state)
        .iter()
        .filter(|posted| posted.as_str() == expected)
        .count();
    assert_eq!(matching, 1, "expected {expected:?} to be posted once");
}

#[then("no comment was posted")]
fn assert_nothing_posted(gate_state: &GateState) {
    let posted = posted_comment_bodies(gate_state);
    assert!(posted.is_empty(), "unexpected comments {posted:?}");
}
