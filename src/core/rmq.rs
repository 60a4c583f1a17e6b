use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures_lite::StreamExt;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties,
    message::Delivery,
    options::{BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
};

use crate::core::app_state::AppState;

/// Signature every queue consumer registered at bootstrap must satisfy.
pub type ConsumerHandler = fn(Delivery, Arc<AppState>) -> BoxFuture<'static, Result<()>>;

pub async fn connect(url: &str) -> Result<Connection> {
    Connection::connect(url, ConnectionProperties::default())
        .await
        .context("Failed to connect to AMQP broker")
}

/// Declares the queue and spawns a task that feeds deliveries to `handler`.
/// A handler failure is logged and the delivery stays unacked; handlers ack
/// on success themselves.
pub async fn spawn_consumer(
    channel: Channel,
    queue: &'static str,
    handler: ConsumerHandler,
    state: Arc<AppState>,
) -> Result<()> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .with_context(|| format!("Failed to declare queue {queue}"))?;

    let mut consumer = channel
        .basic_consume(
            queue,
            queue,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .with_context(|| format!("Failed to start consumer for {queue}"))?;

    tokio::spawn(async move {
        while let Some(delivery) = consumer.next().await {
            match delivery {
                Ok(delivery) => {
                    if let Err(err) = handler(delivery, state.clone()).await {
                        tracing::error!("Consumer {queue} failed to handle delivery: {err:#}");
                    }
                }
                Err(err) => tracing::error!("Consumer {queue} stream error: {err}"),
            }
        }
        tracing::warn!("Consumer {queue} stream ended");
    });

    Ok(())
}

/// Publishes a payload to the default exchange under `routing_key`.
pub async fn publish(channel: &Channel, routing_key: &str, payload: &[u8]) -> Result<()> {
    channel
        .basic_publish(
            "",
            routing_key,
            BasicPublishOptions::default(),
            payload,
            BasicProperties::default(),
        )
        .await
        .with_context(|| format!("Failed to publish to {routing_key}"))?
        .await
        .context("Broker did not confirm publish")?;
    Ok(())
}
