//! Send a sample of log events to Slack.
//!
//! Configured entirely through the environment, optionally via a `.env` file.
//! See [SinkConfig::from_env] for the variables read. Run with
//! `RUST_LOG=debug` to see each delivery attempt.

use dotenvy::dotenv;
use slack_sink::{EventError, Level, LogEvent, LogEventSink, SinkConfig};
use std::{fmt, process::ExitCode};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Stands in for a real failure so the error attachment can be seen.
#[derive(Debug)]
struct DeployError;

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Release artefact missing")
    }
}

impl std::error::Error for DeployError {}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let has_dotenv = dotenv().is_ok();
    if !has_dotenv {
        warn!("No .env found");
    }

    let sink = match SinkConfig::from_env().and_then(SinkConfig::build) {
        Ok(x) => x,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Sending sample events");

    for level in Level::ALL {
        sink.emit(
            &LogEvent::new(level, "Hello from {Program} at {Level:l}")
                .with_property("Program", "slack-sink")
                .with_property("Level", level.to_string()),
        );
    }

    sink.emit(
        &LogEvent::new(Level::Error, "Deployment of {Version} failed")
            .with_property("Version", "v1.4.2")
            .with_error(EventError::from_error(&DeployError)),
    );

    info!("Done");
    ExitCode::SUCCESS
}
