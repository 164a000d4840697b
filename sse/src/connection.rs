use axum::response::sse::Event;
use dashmap::DashMap;
use log::*;
use std::collections::HashSet;
use std::convert::Infallible;
use std::time::Instant;
use tokio::sync::mpsc::{error::TrySendError, Sender};

/// Logical channel name, e.g. `article-updates-en`.
pub type ChannelName = String;

/// Unique identifier for a stream session (server-generated).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-session state owned by the registry for the session's lifetime.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub channels: HashSet<ChannelName>,
    pub sender: Sender<Result<Event, Infallible>>,
    pub created_at: Instant,
}

/// Session registry with dual indices for O(1) lookups.
///
/// Senders are bounded: a session whose buffer is full at publish time is
/// disconnected rather than allowed to back-pressure the fan-out, so a slow
/// consumer degrades only its own session. There is no lock spanning the
/// whole registry; consistency of the subscriber sets relies on the DashMap
/// shard locks alone.
pub struct ChannelRegistry {
    /// Primary storage: lookup by session id for registration/teardown - O(1)
    sessions: DashMap<SessionId, SessionInfo>,

    /// Secondary index: lookup by channel for fan-out - O(1)
    channel_index: DashMap<ChannelName, HashSet<SessionId>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            channel_index: DashMap::new(),
        }
    }

    /// Register a new session subscribed to `channels` - O(1)
    pub fn register(
        &self,
        channels: Vec<ChannelName>,
        sender: Sender<Result<Event, Infallible>>,
    ) -> SessionId {
        let session_id = SessionId::new();
        let channel_set: HashSet<ChannelName> = channels.into_iter().collect();

        for channel in &channel_set {
            self.channel_index
                .entry(channel.clone())
                .or_default()
                .insert(session_id.clone());
        }

        self.sessions.insert(
            session_id.clone(),
            SessionInfo {
                channels: channel_set,
                sender,
                created_at: Instant::now(),
            },
        );

        session_id
    }

    /// Unregister a session and drop all of its subscriptions - O(1).
    ///
    /// Idempotent: safe to call from every disconnect detection path without
    /// double-release.
    pub fn unregister(&self, session_id: &SessionId) {
        if let Some((_, info)) = self.sessions.remove(session_id) {
            for channel in info.channels {
                if let Some(mut entry) = self.channel_index.get_mut(&channel) {
                    entry.remove(session_id);

                    // Clean up empty channel entries
                    if entry.is_empty() {
                        drop(entry); // Release lock before removal
                        self.channel_index.remove(&channel);
                    }
                }
            }
        }
    }

    /// Fan an event out to every session subscribed to `channel`, in the
    /// order the publish arrived. Returns the number of sessions the event
    /// was buffered for.
    pub fn publish_to_channel(&self, channel: &str, event: Event) -> usize {
        let mut delivered = 0;
        let mut stale: Vec<SessionId> = Vec::new();

        if let Some(session_ids) = self.channel_index.get(channel) {
            for session_id in session_ids.iter() {
                if let Some(info) = self.sessions.get(session_id) {
                    match info.sender.try_send(Ok(event.clone())) {
                        Ok(()) => delivered += 1,
                        Err(TrySendError::Full(_)) => {
                            warn!(
                                "Session {} cannot drain its buffer, disconnecting slow consumer",
                                session_id.as_str()
                            );
                            stale.push(session_id.clone());
                        }
                        Err(TrySendError::Closed(_)) => {
                            debug!(
                                "Session {} receiver already gone, cleaning up",
                                session_id.as_str()
                            );
                            stale.push(session_id.clone());
                        }
                    }
                }
            }
        }

        // Teardown happens outside the index read guard held above.
        for session_id in &stale {
            self.unregister(session_id);
        }

        delivered
    }

    /// Disconnect every live session. Used on server shutdown.
    pub fn close_all(&self) {
        let session_ids: Vec<SessionId> =
            self.sessions.iter().map(|entry| entry.key().clone()).collect();
        for session_id in &session_ids {
            self.unregister(session_id);
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channel_index
            .get(channel)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn frame(name: &str) -> Event {
        Event::default().event(name).data("{}")
    }

    #[tokio::test]
    async fn test_publish_reaches_only_subscribed_sessions() {
        let registry = ChannelRegistry::new();

        let (en_tx, mut en_rx) = mpsc::channel(8);
        let (th_tx, mut th_rx) = mpsc::channel(8);
        registry.register(vec!["article-updates-en".to_string()], en_tx);
        registry.register(vec!["article-updates-th".to_string()], th_tx);

        let delivered = registry.publish_to_channel("article-updates-en", frame("article-published"));

        assert_eq!(delivered, 1);
        assert!(en_rx.try_recv().is_ok(), "en session should receive the event");
        assert!(
            th_rx.try_recv().is_err(),
            "th session must not see en channel traffic"
        );
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent_and_clears_indices() {
        let registry = ChannelRegistry::new();

        let (tx, _rx) = mpsc::channel(8);
        let session_id = registry.register(vec!["article-updates-en".to_string()], tx);

        registry.unregister(&session_id);
        registry.unregister(&session_id);

        assert_eq!(registry.session_count(), 0);
        assert_eq!(registry.subscriber_count("article-updates-en"), 0);
    }

    #[tokio::test]
    async fn test_overflowing_session_is_disconnected() {
        let registry = ChannelRegistry::new();

        let (slow_tx, _slow_rx) = mpsc::channel(1);
        let (healthy_tx, mut healthy_rx) = mpsc::channel(8);
        registry.register(vec!["article-updates-en".to_string()], slow_tx);
        registry.register(vec!["article-updates-en".to_string()], healthy_tx);

        // First publish fills the slow session's one-slot buffer.
        registry.publish_to_channel("article-updates-en", frame("article-published"));
        // Second publish overflows it; only the healthy session survives.
        registry.publish_to_channel("article-updates-en", frame("article-updated"));

        assert_eq!(registry.session_count(), 1);
        assert_eq!(registry.subscriber_count("article-updates-en"), 1);
        assert!(healthy_rx.try_recv().is_ok());
        assert!(healthy_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_cleaned_up_on_next_publish() {
        let registry = ChannelRegistry::new();

        let (tx, rx) = mpsc::channel(8);
        registry.register(vec!["article-updates-th".to_string()], tx);
        drop(rx);

        let delivered = registry.publish_to_channel("article-updates-th", frame("article-published"));

        assert_eq!(delivered, 0);
        assert_eq!(registry.session_count(), 0);
    }

    #[tokio::test]
    async fn test_close_all_releases_every_session() {
        let registry = ChannelRegistry::new();

        let (en_tx, _en_rx) = mpsc::channel(8);
        let (th_tx, _th_rx) = mpsc::channel(8);
        registry.register(vec!["article-updates-en".to_string()], en_tx);
        registry.register(vec!["article-updates-th".to_string()], th_tx);

        registry.close_all();

        assert_eq!(registry.session_count(), 0);
        assert_eq!(registry.subscriber_count("article-updates-en"), 0);
        assert_eq!(registry.subscriber_count("article-updates-th"), 0);
    }
}
