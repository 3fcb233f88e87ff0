//! The supervisor keeps the connection and the channel of a consumer open.
//!
//! It waits for the close of the current connection or channel, or for the shutdown of the
//! consumer. A closed connection is re-dialed (and a new channel is opened on it), a closed
//! channel is re-opened. Failed attempts are retried after a fixed wait without limit until they
//! succeed or the consumer is closed.

use crate::broker::{Broker, CloseNotify};
use crate::consumer::{Attempt, Shared};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of re-opening a channel.
enum Reopen {
    Opened(CloseNotify),
    /// The channel cannot be opened because the connection is gone.
    ConnectionLost,
    Shutdown,
}

pub(crate) async fn run<B: Broker>(shared: Arc<Shared<B>>, mut conn_closed: CloseNotify, mut chan_closed: CloseNotify) {
    loop {
        tokio::select! {
            biased;

            _ = shared.shutdown.cancelled() => {
                break;
            }
            reason = &mut conn_closed => {
                warn!("Connection closed ({}). Re-connecting...", describe(reason));

                match reconnect(&shared).await {
                    Some((conn, chan)) => {
                        info!("Consumer connection and channel re-established");

                        conn_closed = conn;
                        chan_closed = chan;
                    }
                    None => break,
                }
            }
            reason = &mut chan_closed => {
                warn!("Channel closed ({}). Re-opening new one...", describe(reason));

                match reopen_channel(&shared).await {
                    Reopen::Opened(chan) => {
                        info!("Consumer channel re-established");

                        chan_closed = chan;
                    }
                    Reopen::ConnectionLost => {
                        match reconnect(&shared).await {
                            Some((conn, chan)) => {
                                info!("Consumer connection and channel re-established");

                                conn_closed = conn;
                                chan_closed = chan;
                            }
                            None => break,
                        }
                    }
                    Reopen::Shutdown => break,
                }
            }
        }
    }

    info!("Stopping connection loop, consumer is closed");
}

/// Dial until a connection and a channel on it are open. Returns `None` if the consumer is closed
/// in the meantime.
async fn reconnect<B: Broker>(shared: &Shared<B>) -> Option<(CloseNotify, CloseNotify)> {
    loop {
        match shared.create_connection().await {
            Attempt::Ready(conn_closed) => {
                debug!("Consumer connection re-established");

                match reopen_channel(shared).await {
                    Reopen::Opened(chan_closed) => return Some((conn_closed, chan_closed)),
                    Reopen::ConnectionLost => {
                        // lost again before the channel could be opened
                    }
                    Reopen::Shutdown => return None,
                }
            }
            Attempt::Failed(e) => {
                warn!(
                    "Failed to connect: {:#}. Retrying in {:?}",
                    e, shared.options.reconnect_wait
                );
            }
            Attempt::Shutdown => return None,
        }

        if !backoff(shared, shared.options.reconnect_wait).await {
            return None;
        }
    }
}

/// Open channels on the current connection until one succeeds.
async fn reopen_channel<B: Broker>(shared: &Shared<B>) -> Reopen {
    loop {
        match shared.create_channel().await {
            Attempt::Ready(chan_closed) => return Reopen::Opened(chan_closed),
            Attempt::Failed(e) => {
                if shared.connection_lost().await {
                    warn!("Failed to open channel: {:#}. Connection is lost", e);

                    return Reopen::ConnectionLost;
                }

                warn!(
                    "Failed to open channel: {:#}. Retrying in {:?}",
                    e, shared.options.reopen_channel_wait
                );
            }
            Attempt::Shutdown => return Reopen::Shutdown,
        }

        if !backoff(shared, shared.options.reopen_channel_wait).await {
            return Reopen::Shutdown;
        }
    }
}

/// Sleep before the next attempt. Returns `false` if the consumer got closed during the wait.
async fn backoff<B: Broker>(shared: &Shared<B>, wait: Duration) -> bool {
    tokio::select! {
        _ = shared.shutdown.cancelled() => false,
        _ = tokio::time::sleep(wait) => true,
    }
}

fn describe(reason: Result<String, tokio::sync::oneshot::error::RecvError>) -> String {
    reason.unwrap_or_else(|_| "handle dropped".to_owned())
}
