#![allow(dead_code)]

pub mod proxy;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicPublishOptions, QueueDeclareOptions, QueuePurgeOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Connection, ConnectionProperties};
use tokio::sync::mpsc;

pub const BROKER_ADDR: &str = "localhost:5672";

/// Publishes directly to the broker, not through the proxy.
pub struct Publisher {
    connection: Connection,
    channel: lapin::Channel,
}

impl Publisher {
    pub async fn connect() -> Result<Self> {
        let uri = format!("amqp://guest:guest@{BROKER_ADDR}/%2f");
        let connection = Connection::connect(&uri, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        Ok(Self { connection, channel })
    }

    /// Declare the queue the same way the consumer does and drop the messages of earlier runs.
    pub async fn fresh_queue(&self, queue: &str) -> Result<()> {
        self.channel
            .queue_declare(queue, QueueDeclareOptions::default(), FieldTable::default())
            .await?;
        self.channel.queue_purge(queue, QueuePurgeOptions::default()).await?;

        Ok(())
    }

    pub async fn publish(&self, queue: &str, body: &str) -> Result<()> {
        self.channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                body.as_bytes(),
                BasicProperties::default(),
            )
            .await?
            .await?;

        Ok(())
    }

    pub async fn close(self) -> Result<()> {
        self.channel.close(200, "OK").await?;
        self.connection.close(200, "OK").await?;

        Ok(())
    }
}

/// A handler which acks the deliveries and forwards their bodies.
pub fn ack_and_forward(tx: mpsc::UnboundedSender<String>) -> impl FnMut(Delivery) -> BoxFuture<'static, ()> + Send {
    move |delivery: Delivery| {
        let tx = tx.clone();

        async move {
            if let Err(e) = delivery.acker.ack(BasicAckOptions::default()).await {
                eprintln!("Ack failed {e:?}");
            }

            let _ = tx.send(String::from_utf8_lossy(&delivery.data).into_owned());
        }
        .boxed()
    }
}
