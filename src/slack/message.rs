//! The message payload Slack expects, shared by incoming webhooks and
//! `chat.postMessage`.
//!
//! <https://api.slack.com/reference/messaging/payload>

use serde::Serialize;
use serde_with::skip_serializing_none;
use url::Url;

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Message {
    pub text: String,
    pub username: Option<String>,
    pub icon_emoji: Option<String>,
    pub icon_url: Option<Url>,
    pub attachments: Vec<Attachment>,
}

/// A colour-coded block beneath the message text.
///
/// <https://api.slack.com/reference/messaging/attachments>
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attachment {
    pub title: Option<String>,
    pub fallback: String,
    pub color: String,
    pub fields: Vec<Field>,
    pub mrkdwn_in: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    /// Whether the field may sit side by side with others.
    pub short: bool,
}

impl Field {
    pub fn short(title: impl Into<String>, value: impl Into<String>) -> Self {
        Field {
            title: title.into(),
            value: value.into(),
            short: true,
        }
    }

    pub fn long(title: impl Into<String>, value: impl Into<String>) -> Self {
        Field {
            title: title.into(),
            value: value.into(),
            short: false,
        }
    }
}

/// The bot's avatar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Icon {
    /// An emoji code such as `:ghost:`.
    Emoji(String),
    Url(Url),
}

/// Per-sink overrides of how the bot presents itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Presentation {
    pub username: Option<String>,
    pub icon: Option<Icon>,
}

impl Presentation {
    pub fn username(&self) -> Option<&str> {
        non_blank(self.username.as_deref())
    }

    pub fn icon_emoji(&self) -> Option<&str> {
        match &self.icon {
            Some(Icon::Emoji(x)) => non_blank(Some(x)),
            _ => None,
        }
    }

    pub fn icon_url(&self) -> Option<&Url> {
        match &self.icon {
            Some(Icon::Url(x)) => Some(x),
            _ => None,
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|x| !x.trim().is_empty())
}
