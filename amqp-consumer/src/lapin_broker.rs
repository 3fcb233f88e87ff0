use crate::broker::{self, AutoDelete, CloseNotify, Deliveries, Durable, Exclusive, NoAck, NoLocal, NoWait};
use anyhow::Result;
use futures::{future, StreamExt};
use lapin::message::Delivery;
use lapin::options::{BasicCancelOptions, BasicConsumeOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::ConnectionProperties;
use log::debug;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

const REPLY_SUCCESS: u16 = 200;

/// [`broker::Broker`] implementation on top of `lapin`, it can talk to RabbitMQ or any AMQP 0.9.1
/// compatible server.
#[derive(Clone, Default)]
pub struct LapinBroker {
    properties: ConnectionProperties,
}

pub struct LapinConnection(lapin::Connection);

pub struct LapinChannel(lapin::Channel);

type CloseSink = Arc<Mutex<Option<oneshot::Sender<String>>>>;

impl LapinBroker {
    pub fn new(properties: ConnectionProperties) -> Self {
        Self { properties }
    }
}

impl broker::Broker for LapinBroker {
    type Connection = LapinConnection;

    async fn dial(&self, uri: &str) -> Result<LapinConnection> {
        let conn = lapin::Connection::connect(uri, self.properties.clone()).await?;

        Ok(LapinConnection(conn))
    }
}

/// Send the close reason at most once, lapin may report more errors on the same handle.
fn fire(sink: &CloseSink, reason: String) {
    let sender = match sink.lock() {
        Ok(mut sender) => sender.take(),
        Err(_) => None,
    };

    if let Some(sender) = sender {
        let _ = sender.send(reason);
    }
}

fn close_sink() -> (CloseSink, CloseNotify) {
    let (tx, rx) = oneshot::channel();

    (Arc::new(Mutex::new(Some(tx))), rx)
}

impl broker::Connection for LapinConnection {
    type Channel = LapinChannel;

    async fn open_channel(&self) -> Result<LapinChannel> {
        let channel = self.0.create_channel().await?;

        Ok(LapinChannel(channel))
    }

    fn notify_close(&self) -> CloseNotify {
        let (sink, notify) = close_sink();
        let on_error = sink.clone();

        self.0.on_error(move |err| fire(&on_error, err.to_string()));

        // The connection may have been lost before the handler got registered.
        if !self.0.status().connected() {
            fire(&sink, "connection is not open".to_owned());
        }

        notify
    }

    fn is_closed(&self) -> bool {
        !self.0.status().connected()
    }

    async fn close(&self) -> Result<()> {
        self.0.close(REPLY_SUCCESS, "OK").await?;

        Ok(())
    }
}

impl broker::Channel for LapinChannel {
    type Delivery = Delivery;

    async fn queue_declare(
        &self,
        queue: &str,
        durable: Durable,
        auto_delete: AutoDelete,
        exclusive: Exclusive,
        no_wait: NoWait,
    ) -> Result<()> {
        let options = QueueDeclareOptions {
            passive: false,
            durable: durable.0,
            exclusive: exclusive.0,
            auto_delete: auto_delete.0,
            nowait: no_wait.0,
        };

        self.0.queue_declare(queue, options, FieldTable::default()).await?;

        Ok(())
    }

    async fn consume(
        &self,
        queue: &str,
        consumer_tag: &str,
        no_ack: NoAck,
        exclusive: Exclusive,
        no_local: NoLocal,
        no_wait: NoWait,
    ) -> Result<Deliveries<Delivery>> {
        let options = BasicConsumeOptions {
            no_local: no_local.0,
            no_ack: no_ack.0,
            exclusive: exclusive.0,
            nowait: no_wait.0,
        };

        let consumer = self
            .0
            .basic_consume(queue, consumer_tag, options, FieldTable::default())
            .await?;
        let tag = consumer_tag.to_owned();

        // lapin reports the channel error as the last item of the stream.
        let deliveries = consumer
            .take_while(move |delivery| {
                if let Err(e) = delivery {
                    debug!("Consumer {} stopped with {:?}", tag, e);
                }

                future::ready(delivery.is_ok())
            })
            .filter_map(|delivery| future::ready(delivery.ok()));

        Ok(deliveries.boxed())
    }

    async fn cancel(&self, consumer_tag: &str, no_wait: NoWait) -> Result<()> {
        self.0
            .basic_cancel(consumer_tag, BasicCancelOptions { nowait: no_wait.0 })
            .await?;

        Ok(())
    }

    fn notify_close(&self) -> CloseNotify {
        let (sink, notify) = close_sink();
        let on_error = sink.clone();

        self.0.on_error(move |err| fire(&on_error, err.to_string()));

        if !self.0.status().connected() {
            fire(&sink, "channel is not open".to_owned());
        }

        notify
    }

    fn is_closed(&self) -> bool {
        !self.0.status().connected()
    }

    async fn close(&self) -> Result<()> {
        self.0.close(REPLY_SUCCESS, "OK").await?;

        Ok(())
    }
}
