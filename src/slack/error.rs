use std::fmt;

/// Sum type representing every way a single delivery can fail. None of these
/// escape the sink; they are reported and the delivery is dropped.
#[derive(Debug)]
pub enum SlackError {
    /// Connection, DNS, TLS or timeout failure. No response arrived.
    APIRequestFailed(reqwest::Error),
    /// Slack answered `ok: false` with this error code.
    APIResponseError(String),
    APIResponseUnreadable(serde_json::Error),
}

impl From<reqwest::Error> for SlackError {
    fn from(e: reqwest::Error) -> Self {
        SlackError::APIRequestFailed(e)
    }
}

impl From<serde_json::Error> for SlackError {
    fn from(e: serde_json::Error) -> Self {
        SlackError::APIResponseUnreadable(e)
    }
}

impl fmt::Display for SlackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            SlackError::APIRequestFailed(e) => format!("Slack API request failed: {}", e),
            SlackError::APIResponseError(e) => format!("Slack API returned error: {}", e),
            SlackError::APIResponseUnreadable(e) => {
                format!("Slack API returned an unreadable response: {}", e)
            }
        };

        write!(f, "{}", x)
    }
}

impl std::error::Error for SlackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SlackError::APIRequestFailed(e) => Some(e),
            SlackError::APIResponseError(_) => None,
            SlackError::APIResponseUnreadable(e) => Some(e),
        }
    }
}
