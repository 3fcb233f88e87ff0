use std::fmt;

/// Lifecycle state of a [`crate::Consumer`].
///
/// The consumer starts `Disconnected`, moves to `Connecting` while the first connection and channel
/// are opened and becomes `Connected` once both are up. Losing the connection or the channel moves
/// it to `Reconnecting` until the supervisor brings both back. `Closed` is terminal and only
/// reachable by [`crate::Consumer::close`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Closed,
}

const STATUS_NAMES: [(Status, &str); 5] = [
    (Status::Disconnected, "disconnected"),
    (Status::Connecting, "connecting"),
    (Status::Connected, "connected"),
    (Status::Reconnecting, "reconnecting"),
    (Status::Closed, "closed"),
];

impl Status {
    pub fn as_str(&self) -> &'static str {
        STATUS_NAMES
            .iter()
            .find(|(status, _)| status == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    /// The status the consumer moves to when it (re)creates its connection or channel.
    ///
    /// A consumer which has already been connected is reconnecting, otherwise it is still in the
    /// initial connecting phase.
    pub(crate) fn next_attempt(self) -> Status {
        match self {
            Status::Connected | Status::Reconnecting => Status::Reconnecting,
            _ => Status::Connecting,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
