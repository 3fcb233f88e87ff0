use crate::Status;
use std::fmt;

/// Category of a [`ConsumerError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The options or the URI given to the consumer are invalid.
    Validation,
    /// The initial connection to the broker cannot be established.
    Connect,
    /// The initial channel cannot be opened.
    Channel,
    /// The consumer is re-connecting, the operation can be retried shortly.
    Temporary,
    /// The consumer is not in a state where the operation makes sense.
    State,
    /// Closing the channel or the connection failed.
    Close,
}

/// Represents an error raised by the consumer itself. Errors of the underlying broker client are
/// either passed through unchanged or carry a `ConsumerError` as their context, so it can be
/// retrieved by `downcast_ref`.
///
/// ```no_run
/// # async fn run(consumer: amqp_consumer::Consumer) {
/// use amqp_consumer::ConsumerError;
///
/// if let Err(e) = consumer.cancel("tag").await {
///     if e.downcast_ref::<ConsumerError>().is_some_and(ConsumerError::is_temporary) {
///         // try again a bit later
///     }
/// }
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ConsumerError {
    pub kind: ErrorKind,
    /// The status of the consumer when the error happened, if it matters.
    pub status: Option<Status>,
    pub message: String,
}

impl ConsumerError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// The operation failed because the consumer is re-connecting to the broker.
    pub fn is_temporary(&self) -> bool {
        self.kind == ErrorKind::Temporary
    }
}

impl fmt::Display for ConsumerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConsumerError {}

/// Shorthand for returning a `ConsumerError` wrapped in `anyhow::Error`.
#[macro_export]
macro_rules! consumer_error {
    ($kind:expr, $message:expr) => {
        ::std::result::Result::Err(::anyhow::Error::new($crate::ConsumerError::new($kind, $message)))
    };
    ($kind:expr, $status:expr, $message:expr) => {
        ::std::result::Result::Err(::anyhow::Error::new($crate::ConsumerError {
            kind: $kind,
            status: ::std::option::Option::Some($status),
            message: ::std::string::String::from($message),
        }))
    };
}

/// Fails the operation named `op` unless the consumer is connected. Re-connecting gives a
/// temporary error, every other status is a state error.
pub(crate) fn check_connected(op: &str, status: Status) -> anyhow::Result<()> {
    match status {
        Status::Connected => Ok(()),
        Status::Reconnecting => consumer_error!(
            ErrorKind::Temporary,
            status,
            format!("temporarily failed to {op}: re-connecting with broker")
        ),
        _ => consumer_error!(
            ErrorKind::State,
            status,
            format!("failed to {op}: connection is in {:?} state", status.as_str())
        ),
    }
}
