use serde::de::{Deserialize, Deserializer, Error};

/// Accept only `true`. Used to tell Slack's success and failure responses
/// apart when deserialising untagged.
pub fn only_true<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    bool::deserialize(deserializer).and_then(|b| {
        if b {
            Ok(b)
        } else {
            Err(Error::custom("invalid bool: false"))
        }
    })
}

/// Accept only `false`. See [only_true].
pub fn only_false<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    bool::deserialize(deserializer).and_then(|b| {
        if b {
            Err(Error::custom("invalid bool: true"))
        } else {
            Ok(b)
        }
    })
}

/// Treat a missing, null, empty or whitespace-only string as `None`. Unset
/// environment variables and empty config entries mean the same thing.
pub fn blank_as_none<'a, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'a>,
{
    Option::<String>::deserialize(deserializer)
        .map(|x| x.filter(|s| !s.trim().is_empty()))
}
