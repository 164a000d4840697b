use crate::Manager;
use async_trait::async_trait;
use events::{channel, BroadcastError, Envelope, EventBroadcaster};
use futures_util::StreamExt;
use log::*;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;

/// In-process broadcast transport for single-instance deployments.
///
/// Fan-out goes straight to the local registry; an envelope published while no
/// session is subscribed is simply lost, there is no buffering.
pub struct LocalTransport {
    manager: Arc<Manager>,
}

impl LocalTransport {
    pub fn new(manager: Arc<Manager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl EventBroadcaster for LocalTransport {
    async fn publish(&self, envelope: Envelope) -> Result<(), BroadcastError> {
        self.manager.fan_out(&envelope);
        Ok(())
    }
}

/// Redis pub/sub transport for multi-instance deployments.
///
/// `publish` pushes the envelope onto the Redis channel matching its
/// metadata; every server process runs a pattern-subscribed listener that
/// forwards received envelopes into its own local registry, so sessions held
/// by other processes see the event too. Delivery is at-most-once: a process
/// whose subscription is reconnecting at publish time misses the event and
/// its clients heal via REST re-fetch.
pub struct RedisTransport {
    client: redis::Client,
}

const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(2);

impl RedisTransport {
    pub fn new(redis_url: &str) -> Result<Self, BroadcastError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| BroadcastError::with_source("invalid Redis URL", e))?;
        Ok(Self { client })
    }

    /// Spawn the listener task that forwards remote envelopes into the local
    /// registry. Resubscribes with a delay whenever the subscription drops.
    pub fn spawn_listener(&self, manager: Arc<Manager>) -> tokio::task::JoinHandle<()> {
        let client = self.client.clone();
        tokio::spawn(async move {
            loop {
                match Self::listen(&client, &manager).await {
                    Ok(()) => warn!("Redis subscription ended, resubscribing"),
                    Err(e) => warn!("Redis subscription failed: {e}, resubscribing"),
                }
                tokio::time::sleep(RESUBSCRIBE_DELAY).await;
            }
        })
    }

    async fn listen(client: &redis::Client, manager: &Manager) -> Result<(), redis::RedisError> {
        let mut pubsub = client.get_async_pubsub().await?;
        let pattern = format!("{}*", channel::ARTICLE_UPDATES_PREFIX);
        pubsub.psubscribe(&pattern).await?;
        info!("Subscribed to Redis pattern '{pattern}'");

        let mut stream = pubsub.on_message();
        while let Some(msg) = stream.next().await {
            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    debug!("Dropping unreadable Redis frame: {e}");
                    continue;
                }
            };

            match serde_json::from_str::<Envelope>(&payload) {
                Ok(envelope) => manager.fan_out(&envelope),
                Err(e) => debug!("Dropping malformed envelope from Redis: {e}"),
            }
        }

        Ok(())
    }
}

#[async_trait]
impl EventBroadcaster for RedisTransport {
    async fn publish(&self, envelope: Envelope) -> Result<(), BroadcastError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| BroadcastError::with_source("Redis connection unavailable", e))?;

        let data = serde_json::to_string(&envelope)
            .map_err(|e| BroadcastError::with_source("envelope serialization failed", e))?;

        conn.publish::<_, _, ()>(&envelope.metadata.channel, data)
            .await
            .map_err(|e| BroadcastError::with_source("Redis publish failed", e))?;

        Ok(())
    }
}
