//! Build a sink from configuration rather than code.
//!
//! Configuration comes either from any serde format (see [SinkConfig]) or from
//! `SLACK_*` environment variables (see [SinkConfig::from_env]). Custom
//! renderers and formatters can only be supplied in code.

use crate::{
    error::ConfigError,
    event::Level,
    sink::{Restricted, SinkOptions, SlackSink},
    slack::{api::API_BASE, Destinations, Icon, Renderer},
};
use serde::Deserialize;
use std::{env, time::Duration};
use url::Url;

/// Where and how a sink delivers.
///
/// Exactly which destinations are used depends on what's present, in order of
/// preference: `destinations`, then `webhook_url`, then `channel_id` and
/// `token`.
///
/// ```json
/// {
///     "webhook_url": "https://hooks.slack.com/services/T/B/X",
///     "minimum_level": "warning",
///     "username": "logbot",
///     "icon_emoji": ":rotating_light:"
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    #[serde(deserialize_with = "crate::de::blank_as_none")]
    pub webhook_url: Option<String>,
    #[serde(deserialize_with = "crate::de::blank_as_none")]
    pub channel_id: Option<String>,
    #[serde(deserialize_with = "crate::de::blank_as_none")]
    pub token: Option<String>,
    pub destinations: Destinations,
    pub minimum_level: Option<Level>,
    #[serde(deserialize_with = "crate::de::blank_as_none")]
    pub username: Option<String>,
    /// Takes precedence over `icon_url`.
    #[serde(deserialize_with = "crate::de::blank_as_none")]
    pub icon_emoji: Option<String>,
    #[serde(deserialize_with = "crate::de::blank_as_none")]
    pub icon_url: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(deserialize_with = "crate::de::blank_as_none")]
    pub api_base: Option<String>,
}

impl SinkConfig {
    /// Read configuration from the process environment:
    ///
    /// - `SLACK_WEBHOOK_URL`
    /// - `SLACK_CHANNEL_ID` and `SLACK_TOKEN`
    /// - `SLACK_MIN_LEVEL`, e.g. `warning`
    /// - `SLACK_USERNAME`, `SLACK_ICON_EMOJI`, `SLACK_ICON_URL`
    /// - `SLACK_TIMEOUT_SECS`
    /// - `SLACK_API_BASE`
    pub fn from_env() -> Result<Self, ConfigError> {
        SinkConfig::from_vars(|k| env::var(k).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| var(k).filter(|v| !v.trim().is_empty());

        let minimum_level = get("SLACK_MIN_LEVEL").map(|x| x.parse::<Level>()).transpose()?;
        let timeout_secs = get("SLACK_TIMEOUT_SECS")
            .map(|x| {
                x.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(x.to_owned()))
            })
            .transpose()?;

        Ok(SinkConfig {
            webhook_url: get("SLACK_WEBHOOK_URL"),
            channel_id: get("SLACK_CHANNEL_ID"),
            token: get("SLACK_TOKEN"),
            destinations: Destinations::new(),
            minimum_level,
            username: get("SLACK_USERNAME"),
            icon_emoji: get("SLACK_ICON_EMOJI"),
            icon_url: get("SLACK_ICON_URL"),
            timeout_secs,
            api_base: get("SLACK_API_BASE"),
        })
    }

    fn options(&self) -> Result<SinkOptions, ConfigError> {
        let mut options = SinkOptions::default()
            .with_api_base(self.api_base.as_deref().unwrap_or(API_BASE));

        if let Some(secs) = self.timeout_secs {
            options = options.with_timeout(Duration::from_secs(secs));
        }

        if let Some(x) = &self.username {
            options = options.with_username(x);
        }

        if let Some(x) = &self.icon_emoji {
            options = options.with_icon(Icon::Emoji(x.to_owned()));
        } else if let Some(x) = &self.icon_url {
            let url = Url::parse(x).map_err(|e| ConfigError::InvalidUrl(x.to_owned(), e))?;
            options = options.with_icon(Icon::Url(url));
        }

        Ok(options)
    }

    /// Build a sink, restricted to the configured minimum level.
    pub fn build(self) -> Result<Restricted<SlackSink>, ConfigError> {
        let options = self.options()?;
        let minimum = self.minimum_level.unwrap_or(Level::Verbose);

        let sink = if !self.destinations.is_empty() {
            SlackSink::with_destinations(self.destinations, Renderer::Default, options)?
        } else if let Some(url) = self.webhook_url {
            SlackSink::webhook(url, Renderer::Default, options)?
        } else if self.channel_id.is_some() || self.token.is_some() {
            SlackSink::channel(
                self.channel_id.unwrap_or_default(),
                self.token.unwrap_or_default(),
                options,
            )?
        } else {
            return Err(ConfigError::NoDestination);
        };

        Ok(Restricted::new(sink, minimum))
    }
}
