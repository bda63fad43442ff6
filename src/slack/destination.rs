//! Where rendered messages go.
//!
//! A [Destination] is either an incoming webhook or a channel posted to via
//! the Web API with an access token. A sink fans out to every member of its
//! [Destinations], in order.

use super::{auth::SlackAccessToken, channel::ChannelId};
use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use url::Url;

/// One configured Slack target.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDestination")]
pub enum Destination {
    /// <https://api.slack.com/messaging/webhooks>
    Webhook { url: Url },
    /// <https://api.slack.com/methods/chat.postMessage>
    ChannelToken {
        channel: ChannelId,
        token: SlackAccessToken,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestinationKind {
    Webhook,
    ChannelToken,
}

impl Destination {
    pub fn webhook(url: impl AsRef<str>) -> Result<Self, ConfigError> {
        let raw = url.as_ref().trim();
        if raw.is_empty() {
            return Err(ConfigError::BlankWebhookUrl);
        }

        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(raw.to_owned(), e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_owned()));
        }

        Ok(Destination::Webhook { url })
    }

    pub fn channel(
        channel_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Destination::ChannelToken {
            channel: ChannelId::new(channel_id)?,
            token: SlackAccessToken::new(token)?,
        })
    }

    pub fn kind(&self) -> DestinationKind {
        match self {
            Destination::Webhook { .. } => DestinationKind::Webhook,
            Destination::ChannelToken { .. } => DestinationKind::ChannelToken,
        }
    }
}

/// Short form for diagnostics. Webhook paths embed a secret, so only the host
/// is shown.
impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Webhook { url } => {
                write!(f, "webhook {}", url.host_str().unwrap_or("<no host>"))
            }
            Destination::ChannelToken { channel, .. } => write!(f, "channel {}", channel),
        }
    }
}

/// The configuration file shape of a [Destination].
///
/// ```json
/// { "kind": "webhook", "url": "https://hooks.slack.com/services/..." }
/// { "kind": "channel", "channel_id": "C0123", "token": "xoxb-..." }
/// ```
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawDestination {
    Webhook { url: String },
    Channel { channel_id: String, token: String },
}

impl TryFrom<RawDestination> for Destination {
    type Error = ConfigError;

    fn try_from(raw: RawDestination) -> Result<Self, Self::Error> {
        match raw {
            RawDestination::Webhook { url } => Destination::webhook(url),
            RawDestination::Channel { channel_id, token } => {
                Destination::channel(channel_id, token)
            }
        }
    }
}

/// An ordered, possibly empty, collection of destinations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Destinations(Vec<Destination>);

impl Destinations {
    pub fn new() -> Self {
        Destinations(Vec::new())
    }

    pub fn push(&mut self, d: Destination) {
        self.0.push(d);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Destination> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Destination>> for Destinations {
    fn from(xs: Vec<Destination>) -> Self {
        Destinations(xs)
    }
}

impl FromIterator<Destination> for Destinations {
    fn from_iter<I: IntoIterator<Item = Destination>>(iter: I) -> Self {
        Destinations(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Destinations {
    type Item = &'a Destination;
    type IntoIter = std::slice::Iter<'a, Destination>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Destinations {
    type Item = Destination;
    type IntoIter = std::vec::IntoIter<Destination>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        let hook = Destination::webhook("https://hooks.slack.com/services/T/B/X").unwrap();
        assert_eq!(hook.kind(), DestinationKind::Webhook);

        let chan = Destination::channel("C0123", "xoxb-foo").unwrap();
        assert_eq!(chan.kind(), DestinationKind::ChannelToken);
    }

    #[test]
    fn test_blank_credentials_rejected() {
        assert!(matches!(
            Destination::webhook(" "),
            Err(ConfigError::BlankWebhookUrl)
        ));
        assert!(matches!(
            Destination::webhook("hooks.slack.com"),
            Err(ConfigError::InvalidUrl(..))
        ));
        assert!(matches!(
            Destination::channel("", "xoxb-foo"),
            Err(ConfigError::BlankChannelId)
        ));
        assert!(matches!(
            Destination::channel("C0123", ""),
            Err(ConfigError::BlankToken)
        ));
    }

    #[test]
    fn test_webhook_scheme_checked() {
        assert!(matches!(
            Destination::webhook("mailto:ops@example.com"),
            Err(ConfigError::UnsupportedScheme(s)) if s == "mailto"
        ));
        assert!(matches!(
            Destination::webhook("file:///etc/hook"),
            Err(ConfigError::UnsupportedScheme(s)) if s == "file"
        ));
        assert!(Destination::webhook("http://localhost:8080/hook").is_ok());
    }

    #[test]
    fn test_channel_credentials_trimmed() {
        let chan = Destination::channel(" C1 ", " xoxb-foo\n").unwrap();
        match chan {
            Destination::ChannelToken { channel, token } => {
                assert_eq!(channel.as_str(), "C1");
                assert_eq!(token.as_str(), "xoxb-foo");
            }
            _ => panic!("expected a channel destination"),
        }
    }

    #[test]
    fn test_display_hides_secrets() {
        let hook = Destination::webhook("https://hooks.slack.com/services/T/B/secret").unwrap();
        assert_eq!(hook.to_string(), "webhook hooks.slack.com");

        let chan = Destination::channel("C0123", "xoxb-secret").unwrap();
        assert_eq!(chan.to_string(), "channel C0123");
        assert!(!format!("{:?}", chan).contains("secret"));
    }

    #[test]
    fn test_deserialize() {
        let raw = r#"[
            { "kind": "webhook", "url": "https://hooks.slack.com/services/T/B/X" },
            { "kind": "channel", "channel_id": "C0123", "token": "xoxb-foo" }
        ]"#;
        let xs: Destinations = serde_json::from_str(raw).unwrap();

        let kinds: Vec<_> = xs.iter().map(Destination::kind).collect();
        assert_eq!(
            kinds,
            vec![DestinationKind::Webhook, DestinationKind::ChannelToken]
        );
    }

    #[test]
    fn test_deserialize_rejects_blank() {
        let raw = r#"[{ "kind": "channel", "channel_id": "C0123", "token": "" }]"#;
        let err = serde_json::from_str::<Destinations>(raw).unwrap_err();

        assert!(err.to_string().contains("Slack token must not be blank."));
    }

    #[test]
    fn test_order_preserved() {
        let xs: Destinations = ["C1", "C2", "C3"]
            .iter()
            .map(|c| Destination::channel(*c, "xoxb-foo").unwrap())
            .collect();

        let shown: Vec<_> = xs.iter().map(|d| d.to_string()).collect();
        assert_eq!(shown, vec!["channel C1", "channel C2", "channel C3"]);
        assert!(Destinations::new().is_empty());
    }
}
