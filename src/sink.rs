//! The sink a logging pipeline hands events to.
//!
//! [SlackSink::emit][LogEventSink::emit] renders each event and delivers it to
//! every configured destination in turn, returning only once all of them have
//! been attempted. Delivery failures are reported through tracing and never
//! reach the caller.

use crate::{
    error::ConfigError,
    event::{Level, LogEvent},
    slack::{
        api::{Delivered, SlackClient, API_BASE, DEFAULT_TIMEOUT},
        Destination, Destinations, Icon, MessageFormatter, Presentation, Renderer, SlackError,
    },
};
use std::{fmt, sync::Arc, time::Duration};
use tokio::runtime::{self, Runtime};
use tracing::{debug, warn};

/// Anything that accepts log events.
pub trait LogEventSink: Send + Sync {
    fn emit(&self, event: &LogEvent);
}

/// Everything about a sink besides where it delivers to.
#[derive(Clone)]
pub struct SinkOptions {
    pub presentation: Presentation,
    /// When set, replaces the rendered body entirely.
    pub formatter: Option<MessageFormatter>,
    pub timeout: Duration,
    pub api_base: String,
}

impl Default for SinkOptions {
    fn default() -> Self {
        SinkOptions {
            presentation: Presentation::default(),
            formatter: None,
            timeout: DEFAULT_TIMEOUT,
            api_base: API_BASE.to_owned(),
        }
    }
}

impl SinkOptions {
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.presentation.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.presentation.icon = Some(icon);
        self
    }

    #[must_use]
    pub fn with_formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&LogEvent) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the Web API base URL, useful for testing.
    #[must_use]
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }
}

/// Writes log events as messages to Slack.
pub struct SlackSink {
    destinations: Destinations,
    client: SlackClient,
    renderer: Renderer,
    formatter: Option<MessageFormatter>,
    presentation: Presentation,
    // Only `None` once dropped.
    runtime: Option<Runtime>,
}

impl SlackSink {
    /// Post to a single channel with an access token.
    pub fn channel(
        channel_id: impl Into<String>,
        token: impl Into<String>,
        options: SinkOptions,
    ) -> Result<Self, ConfigError> {
        let dest = Destination::channel(channel_id, token)?;

        SlackSink::build(vec![dest].into(), Renderer::Default, options)
    }

    /// Post to a single incoming webhook.
    pub fn webhook(
        url: impl AsRef<str>,
        renderer: Renderer,
        options: SinkOptions,
    ) -> Result<Self, ConfigError> {
        let dest = Destination::webhook(url)?;

        SlackSink::build(vec![dest].into(), renderer, options)
    }

    /// Post to every destination in order. An empty set is allowed, but such a
    /// sink never sends anything.
    pub fn with_destinations(
        destinations: Destinations,
        renderer: Renderer,
        options: SinkOptions,
    ) -> Result<Self, ConfigError> {
        if destinations.is_empty() {
            warn!("There are 0 Slack destinations defined. Slack sink will not send messages.");
        }

        SlackSink::build(destinations, renderer, options)
    }

    fn build(
        destinations: Destinations,
        renderer: Renderer,
        options: SinkOptions,
    ) -> Result<Self, ConfigError> {
        let client = SlackClient::new(options.api_base, options.timeout)?;
        let runtime = runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(SlackSink {
            destinations,
            client,
            renderer,
            formatter: options.formatter,
            presentation: options.presentation,
            runtime: Some(runtime),
        })
    }

    pub fn destinations(&self) -> &Destinations {
        &self.destinations
    }

    /// The body for one delivery. A formatter, if any, wins over the renderer.
    fn render(&self, event: &LogEvent) -> String {
        match &self.formatter {
            Some(f) => f(event),
            None => self.renderer.render(event, &self.presentation),
        }
    }

    /// Render and deliver to each destination in order, carrying on past
    /// failures. Returns one outcome per attempted delivery; blank bodies are
    /// not attempted.
    ///
    /// This is the non-blocking core of [LogEventSink::emit] for hosts that are
    /// already async.
    pub async fn deliver(&self, event: &LogEvent) -> Vec<Result<Delivered, SlackError>> {
        let mut outcomes = Vec::with_capacity(self.destinations.len());

        for dest in &self.destinations {
            let body = self.render(event);
            if body.trim().is_empty() {
                debug!(destination = %dest, "Rendered message is blank, not sending");
                continue;
            }

            outcomes.push(self.client.send(dest, &body).await);
        }

        outcomes
    }
}

impl LogEventSink for SlackSink {
    fn emit(&self, event: &LogEvent) {
        let rt = match &self.runtime {
            Some(rt) if !self.destinations.is_empty() => rt,
            _ => return,
        };

        let deliver = || rt.block_on(self.deliver(event));

        if runtime::Handle::try_current().is_err() {
            deliver();
        } else {
            // Blocking on a runtime from within another one panics, so wait
            // from a helper thread instead.
            std::thread::scope(|s| {
                if let Err(panic) = s.spawn(deliver).join() {
                    std::panic::resume_unwind(panic);
                }
            });
        }
    }
}

impl Drop for SlackSink {
    fn drop(&mut self) {
        // A plain drop blocks, which panics inside async contexts.
        if let Some(rt) = self.runtime.take() {
            rt.shutdown_background();
        }
    }
}

impl fmt::Debug for SlackSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackSink")
            .field("destinations", &self.destinations)
            .field("renderer", &self.renderer)
            .field("formatter", &self.formatter.as_ref().map(|_| ".."))
            .field("presentation", &self.presentation)
            .finish()
    }
}

/// Drops events below a minimum level before they reach the inner sink.
#[derive(Debug)]
pub struct Restricted<S> {
    inner: S,
    minimum: Level,
}

impl<S: LogEventSink> Restricted<S> {
    pub fn new(inner: S, minimum: Level) -> Self {
        Restricted { inner, minimum }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: LogEventSink> LogEventSink for Restricted<S> {
    fn emit(&self, event: &LogEvent) {
        if event.level >= self.minimum {
            self.inner.emit(event);
        }
    }
}

impl<S: LogEventSink + ?Sized> LogEventSink for Box<S> {
    fn emit(&self, event: &LogEvent) {
        (**self).emit(event)
    }
}
