use crate::connection::{ChannelName, ChannelRegistry, SessionId};
use crate::message;
use axum::response::sse::Event;
use events::Envelope;
use log::*;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

/// High-level session and fan-out coordination (delegates to ChannelRegistry).
pub struct Manager {
    registry: Arc<ChannelRegistry>,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ChannelRegistry::new()),
        }
    }

    /// Register a new stream session subscribed to `channels` and return its
    /// unique ID.
    pub fn register_session(
        &self,
        channels: Vec<ChannelName>,
        sender: Sender<Result<Event, Infallible>>,
    ) -> SessionId {
        let session_id = self.registry.register(channels, sender);
        info!("Registered new stream session {}", session_id.as_str());
        session_id
    }

    /// Unregister a session by ID. Idempotent.
    pub fn unregister_session(&self, session_id: &SessionId) {
        info!("Unregistering stream session {}", session_id.as_str());
        self.registry.unregister(session_id);
    }

    /// Serialize an envelope once and fan it out to every session subscribed
    /// to its channel. A serialization failure drops the envelope with a log
    /// line; it never tears sessions down.
    pub fn fan_out(&self, envelope: &Envelope) {
        let event = match message::to_sse_event(envelope) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to serialize publish event: {e}");
                return;
            }
        };

        let delivered = self
            .registry
            .publish_to_channel(&envelope.metadata.channel, event);
        debug!(
            "Fanned out {} event on {} to {} session(s)",
            envelope.action.event_name(),
            envelope.metadata.channel,
            delivered
        );
    }

    /// Close every live session. Called once on server shutdown.
    pub fn shutdown(&self) {
        info!(
            "Shutting down stream sessions ({} open)",
            self.registry.session_count()
        );
        self.registry.close_all();
    }

    pub fn session_count(&self) -> usize {
        self.registry.session_count()
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.registry.subscriber_count(channel)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
