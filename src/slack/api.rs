//! Delivery of rendered message bodies to Slack over HTTP.
//!
//! Webhooks take the body as-is. Channel deliveries go through
//! `chat.postMessage`, authenticated with the destination's token.

use super::{
    auth::{to_auth_header_val, SlackAccessToken},
    channel::ChannelId,
    destination::Destination,
    error::SlackError,
};
use crate::error::ConfigError;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{fmt, time::Duration};
use tracing::{debug, warn};
use url::Url;

/// The base URL of the Slack API.
pub const API_BASE: &str = "https://slack.com/api";

/// Every delivery attempt gives up after this long unless configured
/// otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// A reusable client for webhooks and the Web API. Every request is bounded
/// by the client's timeout.
#[derive(Clone, Debug)]
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
}

/// What a successful delivery got back.
#[derive(Debug, PartialEq, Eq)]
pub enum Delivered {
    /// A webhook answered. Any status counts.
    Webhook(StatusCode),
    /// `chat.postMessage` accepted the message, with its timestamp ID if
    /// Slack returned one.
    Posted { ts: Option<String> },
}

impl fmt::Display for Delivered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivered::Webhook(status) => write!(f, "{}", status),
            Delivered::Posted { ts: Some(ts) } => write!(f, "posted at {}", ts),
            Delivered::Posted { ts: None } => write!(f, "posted"),
        }
    }
}

/// Slack's API returns a common "untagged" response, representing whether a
/// request was successful.
///
/// ```json
/// {
///     "ok": true,
///     "ts": "1503435956.000247"
/// }
/// ```
///
/// ```json
/// {
///     "ok": false,
///     "error": "channel_not_found"
/// }
/// ```
#[derive(Deserialize)]
#[serde(untagged)]
enum APIResult<T> {
    Ok(T),
    Err(ErrorResponse),
}

/// The universal response in case of an unsuccessful request.
#[derive(Deserialize)]
struct ErrorResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_false")]
    ok: bool,
    error: Option<String>,
}

/// <https://api.slack.com/methods/chat.postMessage#examples>
#[derive(Deserialize)]
struct PostMessageResponse {
    #[allow(dead_code)]
    #[serde(deserialize_with = "crate::de::only_true")]
    ok: bool,
    ts: Option<String>,
}

impl SlackClient {
    /// `api_base` is the Web API root, without a trailing `/method`. Point it
    /// at a mock server in tests.
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            // Idle connections would sit on a runtime that only runs while a
            // delivery is in flight.
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(SlackClient {
            http,
            api_base: api_base.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Create a POST request to any Slack API endpoint, handling authentication.
    fn post<T: ToString>(&self, path: T, token: &SlackAccessToken) -> reqwest::RequestBuilder {
        self.http
            .post(self.api_base.to_owned() + &path.to_string())
            .header(header::AUTHORIZATION, to_auth_header_val(token))
    }

    /// Deliver a rendered body to one destination, reporting the attempt and
    /// its outcome via tracing.
    pub async fn send(&self, dest: &Destination, body: &str) -> Result<Delivered, SlackError> {
        debug!(destination = %dest, body, "Trying to send message");

        let res = match dest {
            Destination::Webhook { url } => self.post_webhook(url, body).await,
            Destination::ChannelToken { channel, token } => {
                self.post_message(channel, token, body).await
            }
        };

        match &res {
            Ok(x) => debug!(destination = %dest, result = %x, "Message sent"),
            Err(e) => warn!(destination = %dest, error = %e, "Message not sent"),
        }

        res
    }

    async fn post_webhook(&self, url: &Url, body: &str) -> Result<Delivered, SlackError> {
        let res = self
            .http
            .post(url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .await?;

        Ok(Delivered::Webhook(res.status()))
    }

    async fn post_message(
        &self,
        channel: &ChannelId,
        token: &SlackAccessToken,
        body: &str,
    ) -> Result<Delivered, SlackError> {
        let raw = self
            .post("/chat.postMessage", token)
            .json(&with_channel(channel, body))
            .send()
            .await?
            .text()
            .await?;

        let res: APIResult<PostMessageResponse> = serde_json::from_str(&raw)?;

        match res {
            APIResult::Ok(PostMessageResponse { ts, .. }) => Ok(Delivered::Posted { ts }),
            APIResult::Err(res) => Err(SlackError::APIResponseError(
                res.error.unwrap_or_else(|| "unknown_error".to_owned()),
            )),
        }
    }
}

/// Address a rendered body to a channel. A body that isn't a JSON object,
/// as produced by a message formatter, becomes the message text.
fn with_channel(channel: &ChannelId, body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut fields)) => {
            fields.insert("channel".to_owned(), json!(channel));
            Value::Object(fields)
        }
        _ => json!({ "channel": channel, "text": body }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    async fn server() -> mockito::ServerGuard {
        mockito::Server::new_async().await
    }

    fn client(base: String) -> SlackClient {
        SlackClient::new(base, Duration::from_secs(5)).unwrap()
    }

    fn channel() -> Destination {
        Destination::channel("C0123", "xoxb-foo").unwrap()
    }

    #[test]
    fn test_with_channel() {
        let c = ChannelId::new("C0123").unwrap();

        assert_eq!(
            with_channel(&c, r#"{"text":"hi","attachments":[]}"#),
            json!({ "channel": "C0123", "text": "hi", "attachments": [] })
        );
        assert_eq!(
            with_channel(&c, "[Information] plain"),
            json!({ "channel": "C0123", "text": "[Information] plain" })
        );
        assert_eq!(
            with_channel(&c, "42"),
            json!({ "channel": "C0123", "text": "42" })
        );
    }

    #[tokio::test]
    async fn test_webhook_posts_body_verbatim() {
        let mut srv = server().await;
        let body = r#"{"text":"hi","attachments":[]}"#;

        let hook_mock = srv
            .mock("POST", "/services/T/B/X")
            .match_header("content-type", "application/json")
            .match_body(body)
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let dest = Destination::webhook(format!("{}/services/T/B/X", srv.url())).unwrap();
        let res = client(API_BASE.into()).send(&dest, body).await;

        hook_mock.assert_async().await;
        assert_eq!(res.unwrap(), Delivered::Webhook(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_webhook_any_status_is_delivered() {
        let mut srv = server().await;

        let hook_mock = srv
            .mock("POST", "/hook")
            .with_status(500)
            .with_body("invalid_payload")
            .create_async()
            .await;

        let dest = Destination::webhook(format!("{}/hook", srv.url())).unwrap();
        let res = client(API_BASE.into()).send(&dest, "{}").await;

        hook_mock.assert_async().await;
        assert_eq!(
            res.unwrap(),
            Delivered::Webhook(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }

    #[tokio::test]
    async fn test_post_message_success() {
        let mut srv = server().await;

        let msg_mock = srv
            .mock("POST", "/chat.postMessage")
            .match_header("authorization", "Bearer xoxb-foo")
            .match_body(Matcher::Json(json!({
                "channel": "C0123",
                "text": "hi",
                "username": "logbot",
                "attachments": []
            })))
            .with_body(r#"{ "ok": true, "channel": "C0123", "ts": "1503435956.000247" }"#)
            .create_async()
            .await;

        let res = client(srv.url())
            .send(
                &channel(),
                r#"{"text":"hi","username":"logbot","attachments":[]}"#,
            )
            .await;

        msg_mock.assert_async().await;
        assert_eq!(
            res.unwrap(),
            Delivered::Posted {
                ts: Some("1503435956.000247".into())
            }
        );
    }

    #[tokio::test]
    async fn test_post_message_api_error() {
        let mut srv = server().await;

        let msg_mock = srv
            .mock("POST", "/chat.postMessage")
            .with_body(r#"{ "ok": false, "error": "channel_not_found" }"#)
            .create_async()
            .await;

        let res = client(srv.url()).send(&channel(), "plain text").await;

        msg_mock.assert_async().await;
        assert!(matches!(
            res,
            Err(SlackError::APIResponseError(e)) if e == "channel_not_found"
        ));
    }

    #[tokio::test]
    async fn test_post_message_error_without_code() {
        let mut srv = server().await;

        let msg_mock = srv
            .mock("POST", "/chat.postMessage")
            .with_body(r#"{ "ok": false }"#)
            .create_async()
            .await;

        let res = client(srv.url()).send(&channel(), "plain text").await;

        msg_mock.assert_async().await;
        assert!(matches!(
            res,
            Err(SlackError::APIResponseError(e)) if e == "unknown_error"
        ));
    }

    #[tokio::test]
    async fn test_post_message_unreadable_response() {
        let mut srv = server().await;

        let msg_mock = srv
            .mock("POST", "/chat.postMessage")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let res = client(srv.url()).send(&channel(), "plain text").await;

        msg_mock.assert_async().await;
        assert!(matches!(res, Err(SlackError::APIResponseUnreadable(_))));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to find a port nothing listens on.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let dest = Destination::webhook(format!("http://{}/hook", addr)).unwrap();
        let res = client(API_BASE.into()).send(&dest, "{}").await;

        assert!(matches!(res, Err(SlackError::APIRequestFailed(_))));
    }

    #[tokio::test]
    async fn test_timeout() {
        // Connections complete in the kernel backlog but are never answered.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let c = SlackClient::new(API_BASE, Duration::from_millis(200)).unwrap();
        let dest = Destination::webhook(format!("http://{}/hook", addr)).unwrap();

        match c.send(&dest, "{}").await {
            Err(SlackError::APIRequestFailed(e)) => assert!(e.is_timeout()),
            _ => panic!("expected a timeout"),
        }

        drop(listener);
    }
}
