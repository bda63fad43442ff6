//! The log event shape consumed by the sink.
//!
//! Events are produced by whatever logging pipeline hosts the sink and are
//! only ever read here. See [LogEvent].

use crate::error::ConfigError;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::{fmt, str::FromStr};

mod template;

/// Event severity, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Level {
    Verbose,
    Debug,
    Information,
    Warning,
    Error,
    Fatal,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Verbose,
        Level::Debug,
        Level::Information,
        Level::Warning,
        Level::Error,
        Level::Fatal,
    ];

    fn name(&self) -> &'static str {
        match self {
            Level::Verbose => "Verbose",
            Level::Debug => "Debug",
            Level::Information => "Information",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
        }
    }
}

/// Format as the bare variant name, e.g. `Information`.
impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a level name, ignoring case.
///
/// ```
/// # use slack_sink::event::Level;
/// assert_eq!("warning".parse::<Level>().unwrap(), Level::Warning);
/// ```
impl FromStr for Level {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownLevel(s.to_owned()))
    }
}

impl TryFrom<String> for Level {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, ConfigError> {
        s.parse()
    }
}

/// An error attached to a log event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventError {
    pub type_name: String,
    pub message: String,
    /// May be empty.
    pub stack_trace: String,
}

impl EventError {
    pub fn new(
        type_name: impl Into<String>,
        message: impl Into<String>,
        stack_trace: impl Into<String>,
    ) -> Self {
        EventError {
            type_name: type_name.into(),
            message: message.into(),
            stack_trace: stack_trace.into(),
        }
    }

    /// Capture any error value. Rust errors don't carry stack traces, so the
    /// chain of `source()` causes stands in for one, a cause per line.
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {}", cause));
            source = cause.source();
        }

        EventError::new(
            short_type_name(std::any::type_name::<E>()),
            err.to_string(),
            causes.join("\n"),
        )
    }
}

/// Strip the module path and any generic arguments from a type name.
///
/// ```ignore
/// assert_eq!(short_type_name("std::io::error::Error"), "Error");
/// assert_eq!(short_type_name("my::Wrapper<std::io::Error>"), "Wrapper");
/// ```
fn short_type_name(full: &str) -> &str {
    let sans_generics = full.split('<').next().unwrap_or(full);
    sans_generics.rsplit("::").next().unwrap_or(sans_generics)
}

/// A single structured log event.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEvent {
    pub level: Level,
    pub timestamp: DateTime<FixedOffset>,
    /// Message template with `{Name}` holes, see [LogEvent::render_message].
    pub template: String,
    /// Property values in the order they were captured.
    pub properties: Vec<(String, Value)>,
    pub error: Option<EventError>,
}

impl LogEvent {
    /// A new event stamped with the current time.
    pub fn new(level: Level, template: impl Into<String>) -> Self {
        LogEvent {
            level,
            timestamp: Utc::now().into(),
            template: template.into(),
            properties: Vec::new(),
            error: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    pub fn with_error(mut self, error: EventError) -> Self {
        self.error = Some(error);
        self
    }

    /// The message with every known property substituted into its hole.
    pub fn render_message(&self) -> String {
        template::render(&self.template, &self.properties)
    }

    /// The timestamp as shown to humans in Slack.
    pub fn fmt_timestamp(&self) -> String {
        self.timestamp
            .format("%Y-%m-%d %H:%M:%S%.3f %:z")
            .to_string()
    }
}
