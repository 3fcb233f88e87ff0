//! The part of a broker client library the consumer is built on.
//!
//! The consumer only dials, opens a channel, declares a queue, consumes and cancels. Those calls
//! are abstracted by the traits here, so the reconnect logic doesn't depend on the library
//! speaking the AMQP protocol. [`crate::LapinBroker`] implements them with `lapin`.

use anyhow::Result;
use futures::stream::BoxStream;
use std::future::Future;
use tokio::sync::oneshot;

/// Single-shot notification of a closed connection or channel. It carries the reason of the close.
///
/// Every connection and channel handle gives a new one, they are never reused. If the sender side
/// is dropped that also means the handle is gone.
pub type CloseNotify = oneshot::Receiver<String>;

/// Stream of the messages delivered to one consumer. It ends when the consumer is cancelled or the
/// channel is closed.
pub type Deliveries<D> = BoxStream<'static, D>;

/// The queue survives a broker restart.
#[derive(Clone, Copy, Debug)]
pub struct Durable(pub bool);
/// The queue is deleted when the last consumer is cancelled.
#[derive(Clone, Copy, Debug)]
pub struct AutoDelete(pub bool);
/// The queue or the consumer is used only by this connection.
#[derive(Clone, Copy, Debug)]
pub struct Exclusive(pub bool);
/// Don't wait for the answer of the broker.
#[derive(Clone, Copy, Debug)]
pub struct NoWait(pub bool);
/// Delivered messages are considered acked, the consumer doesn't need to ack them.
#[derive(Clone, Copy, Debug)]
pub struct NoAck(pub bool);
/// Don't deliver messages published on the same connection.
#[derive(Clone, Copy, Debug)]
pub struct NoLocal(pub bool);

/// Creates connections.
pub trait Broker: Send + Sync + 'static {
    type Connection: Connection;

    fn dial(&self, uri: &str) -> impl Future<Output = Result<Self::Connection>> + Send;
}

pub trait Connection: Send + Sync + 'static {
    type Channel: Channel;

    fn open_channel(&self) -> impl Future<Output = Result<Self::Channel>> + Send;

    /// Register for the close of this connection. It is called once per connection.
    fn notify_close(&self) -> CloseNotify;

    fn is_closed(&self) -> bool;

    fn close(&self) -> impl Future<Output = Result<()>> + Send;
}

pub trait Channel: Send + Sync + 'static {
    /// A message delivered by the broker.
    type Delivery: Send + 'static;

    fn queue_declare(
        &self,
        queue: &str,
        durable: Durable,
        auto_delete: AutoDelete,
        exclusive: Exclusive,
        no_wait: NoWait,
    ) -> impl Future<Output = Result<()>> + Send;

    fn consume(
        &self,
        queue: &str,
        consumer_tag: &str,
        no_ack: NoAck,
        exclusive: Exclusive,
        no_local: NoLocal,
        no_wait: NoWait,
    ) -> impl Future<Output = Result<Deliveries<Self::Delivery>>> + Send;

    fn cancel(&self, consumer_tag: &str, no_wait: NoWait) -> impl Future<Output = Result<()>> + Send;

    /// Register for the close of this channel. It is called once per channel.
    fn notify_close(&self) -> CloseNotify;

    fn is_closed(&self) -> bool;

    fn close(&self) -> impl Future<Output = Result<()>> + Send;
}

/// The channel type of a broker.
pub type ChannelOf<B> = <<B as Broker>::Connection as Connection>::Channel;
/// The delivered message type of a broker.
pub type DeliveryOf<B> = <ChannelOf<B> as Channel>::Delivery;
