//! A log event sink that posts to Slack.
//!
//! Each event handed to a [SlackSink] is rendered into a Slack message (the
//! interpolated text plus colour-coded attachments for the level, timestamp
//! and any attached error) and delivered to every configured
//! [Destination], either an incoming webhook or a channel via
//! `chat.postMessage`.
//!
//! Delivery is best-effort. Failures are reported through [tracing] and never
//! reach the code that logged the event.
//!
//! ```no_run
//! use slack_sink::{Level, LogEvent, LogEventSink, Renderer, SinkOptions, SlackSink};
//!
//! let sink = SlackSink::webhook(
//!     "https://hooks.slack.com/services/T000/B000/XXXX",
//!     Renderer::Default,
//!     SinkOptions::default().with_username("deploybot"),
//! )?;
//!
//! sink.emit(&LogEvent::new(Level::Information, "Deployed {App}").with_property("App", "web"));
//! # Ok::<(), slack_sink::ConfigError>(())
//! ```

pub mod config;
mod de;
pub mod error;
pub mod event;
pub mod sink;
pub mod slack;

pub use config::SinkConfig;
pub use error::ConfigError;
pub use event::{EventError, Level, LogEvent};
pub use sink::{LogEventSink, Restricted, SinkOptions, SlackSink};
pub use slack::{Destination, DestinationKind, Destinations, Icon, Presentation, Renderer};
