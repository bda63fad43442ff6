//! Turn a [LogEvent] into the JSON body posted to Slack.
//!
//! The default rendering puts the interpolated message in `text` and adds a
//! colour-coded attachment carrying the level and timestamp. Events with an
//! attached error get a second, always red, attachment with its details.

use super::message::{Attachment, Field, Message, Presentation};
use crate::event::{EventError, Level, LogEvent};
use std::{fmt, sync::Arc};

pub const COLOR_INFORMATION: &str = "#5bc0de";
pub const COLOR_WARNING: &str = "#f0ad4e";
pub const COLOR_ERROR: &str = "#d9534f";
pub const COLOR_DEFAULT: &str = "#777";

/// A caller-supplied replacement for [render].
pub type RenderFn = dyn Fn(&LogEvent, &Presentation) -> String + Send + Sync;

/// Replaces the whole body with plain text, skipping attachments entirely.
pub type MessageFormatter = Arc<dyn Fn(&LogEvent) -> String + Send + Sync>;

/// How a sink renders events, fixed when the sink is built.
#[derive(Clone, Default)]
pub enum Renderer {
    #[default]
    Default,
    Custom(Arc<RenderFn>),
}

impl Renderer {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&LogEvent, &Presentation) -> String + Send + Sync + 'static,
    {
        Renderer::Custom(Arc::new(f))
    }

    pub fn render(&self, event: &LogEvent, presentation: &Presentation) -> String {
        match self {
            Renderer::Default => render(event, presentation),
            Renderer::Custom(f) => f(event, presentation),
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderer::Default => write!(f, "Renderer::Default"),
            Renderer::Custom(_) => write!(f, "Renderer::Custom(..)"),
        }
    }
}

/// Render an event to a serialised [Message].
pub fn render(event: &LogEvent, presentation: &Presentation) -> String {
    // Plain structs with string keys always serialise.
    serde_json::to_string(&build_message(event, presentation)).unwrap_or_default()
}

pub fn build_message(event: &LogEvent, presentation: &Presentation) -> Message {
    let text = event.render_message();

    let mut attachments = Vec::with_capacity(2);
    attachments.push(summary_attachment(event, &text));
    if let Some(err) = &event.error {
        attachments.push(error_attachment(err));
    }

    Message {
        text,
        username: presentation.username().map(str::to_owned),
        icon_emoji: presentation.icon_emoji().map(str::to_owned),
        icon_url: presentation.icon_url().cloned(),
        attachments,
    }
}

pub fn attachment_color(level: Level) -> &'static str {
    match level {
        Level::Information => COLOR_INFORMATION,
        Level::Warning => COLOR_WARNING,
        Level::Error | Level::Fatal => COLOR_ERROR,
        _ => COLOR_DEFAULT,
    }
}

fn summary_attachment(event: &LogEvent, text: &str) -> Attachment {
    Attachment {
        title: None,
        fallback: format!("[{}]{}", event.level, text),
        color: attachment_color(event.level).to_owned(),
        fields: vec![
            Field::short("Level", event.level.to_string()),
            Field::short("Timestamp", event.fmt_timestamp()),
        ],
        mrkdwn_in: None,
    }
}

fn error_attachment(err: &EventError) -> Attachment {
    Attachment {
        title: Some("Exception".to_owned()),
        fallback: format!("Exception: {} \n {}", err.message, err.stack_trace),
        color: attachment_color(Level::Fatal).to_owned(),
        fields: vec![
            Field::short("Message", err.message.to_owned()),
            Field::short("Type", format!("`{}`", err.type_name)),
            // Fenced so that `mrkdwn_in` shows it as a code block.
            Field::long("Stack Trace", format!("```{}```", err.stack_trace)),
        ],
        mrkdwn_in: Some(vec!["fields".to_owned()]),
    }
}
