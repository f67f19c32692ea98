//! Atlantis gate CLI entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use atlantis_gate::{
    AtlantisGateConfig, GateContext, GateController, GateError, GateOutcome, OctocrabGateway,
    PersonalAccessToken,
};
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(outcome) => {
            if write_outcome(&outcome).is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<GateOutcome, GateError> {
    let config = load_config()?;

    let locator = config.locator()?;
    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let settings = config.gate_settings()?;

    let gateway = OctocrabGateway::for_token(&token, &locator)?;
    let context = GateContext::new(&gateway, locator, config.bot_login.as_str());
    GateController::new(&context, settings).run().await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`GateError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<AtlantisGateConfig, GateError> {
    AtlantisGateConfig::load().map_err(|error| GateError::Configuration {
        message: error.to_string(),
    })
}

/// Sends progress logs to stdout, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stdout)
        .with_target(false)
        .init();
}

fn write_outcome(outcome: &GateOutcome) -> Result<(), GateError> {
    let mut stdout = io::stdout().lock();
    let message = match outcome {
        GateOutcome::AlreadyMerged => "Pull request already merged; nothing to do".to_owned(),
        GateOutcome::Applied {
            resource_path,
            workspace,
            ..
        } => format!("Applied {resource_path} in workspace {workspace}"),
    };

    writeln!(stdout, "{message}").map_err(|error| GateError::Io {
        message: error.to_string(),
    })
}
