use std::fmt;

/// Sum type representing every way a sink can be misconfigured. These are
/// raised at construction time and never during delivery.
#[derive(Debug)]
pub enum ConfigError {
    BlankWebhookUrl,
    BlankChannelId,
    BlankToken,
    InvalidToken,
    InvalidUrl(String, url::ParseError),
    UnsupportedScheme(String),
    NoDestination,
    UnknownLevel(String),
    InvalidTimeout(String),
    HttpClient(reqwest::Error),
    Runtime(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            ConfigError::BlankWebhookUrl => "Slack webhook URL must not be blank.".into(),
            ConfigError::BlankChannelId => "Slack channel ID must not be blank.".into(),
            ConfigError::BlankToken => "Slack token must not be blank.".into(),
            ConfigError::InvalidToken => {
                "Slack token contains characters not allowed in an HTTP header.".into()
            }
            ConfigError::InvalidUrl(u, e) => format!("Invalid URL {:?}: {}", u, e),
            ConfigError::UnsupportedScheme(s) => {
                format!("Webhook URL must use http or https, not {:?}.", s)
            }
            ConfigError::NoDestination => {
                "One of a webhook URL, a channel ID and token, or a list of destinations is required."
                    .into()
            }
            ConfigError::UnknownLevel(l) => format!("Unknown log level: {}", l),
            ConfigError::InvalidTimeout(t) => format!("Invalid timeout in seconds: {}", t),
            ConfigError::HttpClient(e) => format!("Could not build HTTP client: {}", e),
            ConfigError::Runtime(e) => format!("Could not start delivery runtime: {}", e),
        };

        write!(f, "{}", x)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidUrl(_, e) => Some(e),
            ConfigError::HttpClient(e) => Some(e),
            ConfigError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ConfigError {
    fn from(e: reqwest::Error) -> Self {
        ConfigError::HttpClient(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Runtime(e)
    }
}
