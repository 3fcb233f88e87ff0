use crate::consumer_error;
use crate::error::ErrorKind;
use anyhow::Result;
use std::time::Duration;
use url::Url;

pub const DEFAULT_RECONNECT_WAIT: Duration = Duration::from_secs(5);
pub const DEFAULT_REOPEN_CHANNEL_WAIT: Duration = Duration::from_secs(2);

/// Max length of a consumer tag in AMQP 0.9.1 (short string).
const MAX_CONSUMER_TAG: usize = 256;
/// Length of a hyphenated v4 UUID.
const CONSUMER_ID_LEN: usize = 36;
/// 256 - 36 (UUID) - 1 ("-" separator)
pub const MAX_CONSUMER_PREFIX: usize = MAX_CONSUMER_TAG - CONSUMER_ID_LEN - 1;

/// Customizes a [`crate::Consumer`].
///
/// ```
/// use amqp_consumer::Options;
/// use std::time::Duration;
///
/// let options = Options::default()
///     .with_consumer_prefix("billing")
///     .with_reconnect_wait(Duration::from_secs(1));
///
/// assert_eq!(options.reopen_channel_wait, Duration::from_secs(2));
/// ```
#[derive(Clone, Debug)]
pub struct Options {
    /// Prefix of the generated consumer tags. It helps to find the consumers of a channel in the
    /// RabbitMQ management UI or CLI.
    pub consumer_prefix: Option<String>,
    /// Time to wait after a failed attempt to connect to the broker.
    pub reconnect_wait: Duration,
    /// Time to wait after a failed attempt to open a channel on the connection.
    pub reopen_channel_wait: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            consumer_prefix: None,
            reconnect_wait: DEFAULT_RECONNECT_WAIT,
            reopen_channel_wait: DEFAULT_REOPEN_CHANNEL_WAIT,
        }
    }
}

impl Options {
    /// Set the prefix of the consumer tags returned by `consume`. The prefix and the unique part is
    /// separated by a `-`. An empty prefix means no prefix.
    pub fn with_consumer_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();

        self.consumer_prefix = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    pub fn with_reconnect_wait(mut self, wait: Duration) -> Self {
        self.reconnect_wait = wait;
        self
    }

    pub fn with_reopen_channel_wait(mut self, wait: Duration) -> Self {
        self.reopen_channel_wait = wait;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(prefix) = &self.consumer_prefix {
            if prefix.len() > MAX_CONSUMER_PREFIX {
                return consumer_error!(
                    ErrorKind::Validation,
                    format!("consumer prefix exceeded max length of {MAX_CONSUMER_PREFIX}")
                );
            }
        }

        Ok(())
    }

    /// Generate a new unique consumer tag.
    pub(crate) fn consumer_tag(&self) -> String {
        let id = uuid::Uuid::new_v4().as_hyphenated().to_string();

        match &self.consumer_prefix {
            Some(prefix) => format!("{prefix}-{id}"),
            None => id,
        }
    }
}

/// Check that `uri` is an AMQP URI.
pub(crate) fn validate_uri(uri: &str) -> Result<()> {
    match Url::parse(uri) {
        Ok(url) if url.scheme() == "amqp" || url.scheme() == "amqps" => Ok(()),
        Ok(url) => consumer_error!(ErrorKind::Validation, format!("unsupported URI scheme {:?}", url.scheme())),
        Err(e) => consumer_error!(ErrorKind::Validation, format!("invalid URI: {e}")),
    }
}

/// Render the URI for log messages without the password.
pub(crate) fn redacted(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }

            url.to_string()
        }
        Err(_) => "<invalid uri>".to_owned(),
    }
}
