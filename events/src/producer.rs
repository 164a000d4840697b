use crate::envelope::{Envelope, EventAction};
use crate::EventBroadcaster;
use domain::{Article, Locale, PublicationStatus, SavedArticle};
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Builds publish-event envelopes from content-state transitions and hands
/// them to the broadcaster.
///
/// The producer is invoked synchronously after a repository write commits. It
/// is fire-and-forget at the broadcaster boundary: envelopes are queued onto
/// an ordered channel drained by a single dispatcher task, so the mutation
/// path never awaits delivery and broadcast failures are only logged. The
/// dispatcher publishes one envelope at a time, which keeps per-channel
/// delivery in publish order even when the transport is slow. Retry policy,
/// if any, belongs to the transport. The producer writes nothing back to the
/// repository, so it cannot re-trigger itself.
pub struct Producer {
    queue: mpsc::UnboundedSender<Envelope>,
}

impl Producer {
    /// Spawns the dispatcher task; must be called from within a runtime.
    pub fn new(broadcaster: Arc<dyn EventBroadcaster>) -> Self {
        let (queue, mut rx) = mpsc::unbounded_channel::<Envelope>();

        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                if let Err(e) = broadcaster.publish(envelope).await {
                    warn!("Dropping publish event, transport unavailable: {e}");
                }
            }
        });

        Self { queue }
    }

    /// Notify the pipeline that an article was saved.
    ///
    /// Produces zero or one envelope per affected locale and queues each for
    /// sequential dispatch without awaiting delivery.
    pub fn article_saved(&self, saved: &SavedArticle) {
        let envelopes = envelopes_for_transition(
            saved.previous_status,
            &saved.previous_locales,
            &saved.article,
        );

        if envelopes.is_empty() {
            return;
        }

        debug!(
            "Producing {} envelope(s) for article {}",
            envelopes.len(),
            saved.article.id
        );

        for envelope in envelopes {
            if self.queue.send(envelope).is_err() {
                warn!(
                    "Publish dispatcher stopped, dropping event for article {}",
                    saved.article.id
                );
            }
        }
    }
}

/// Resolve the envelopes a save produces, one per affected locale.
///
/// - not published -> published: `published` for every translated locale
/// - published -> still published: `updated` for locales that already had a
///   translation, `published` for locales translated by this save
/// - published -> not published: `unpublished` for every previously
///   translated locale
/// - anything else (e.g. editing a still-draft article): nothing
pub fn envelopes_for_transition(
    previous_status: PublicationStatus,
    previous_locales: &[Locale],
    article: &Article,
) -> Vec<Envelope> {
    let was_published = previous_status.is_published();
    let is_published = article.status.is_published();

    match (was_published, is_published) {
        (false, true) => article
            .locales()
            .into_iter()
            .filter_map(|locale| article.summary(locale))
            .map(|payload| Envelope::article(EventAction::Published, payload))
            .collect(),
        (true, true) => article
            .locales()
            .into_iter()
            .filter_map(|locale| {
                let action = if previous_locales.contains(&locale) {
                    EventAction::Updated
                } else {
                    EventAction::Published
                };
                article
                    .summary(locale)
                    .map(|payload| Envelope::article(action, payload))
            })
            .collect(),
        (true, false) => previous_locales
            .iter()
            .filter_map(|locale| article.summary(*locale))
            .map(|payload| Envelope::article(EventAction::Unpublished, payload))
            .collect(),
        (false, false) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{AuthorSummary, Translation};

    fn article(status: PublicationStatus, locales: &[Locale]) -> Article {
        Article {
            id: 1,
            status,
            author: AuthorSummary {
                id: 9,
                name: "Somchai".to_string(),
            },
            category: None,
            featured_image: None,
            reading_time: 5,
            published_at: status.is_published().then(Utc::now),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            translations: locales
                .iter()
                .map(|locale| Translation {
                    locale: *locale,
                    title: format!("Hello {locale}"),
                    slug: format!("hello-{locale}"),
                    excerpt: "".to_string(),
                    meta_description: "".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_first_publish_produces_one_envelope_per_locale() {
        let article = article(PublicationStatus::Published, &[Locale::En, Locale::Th]);
        let envelopes =
            envelopes_for_transition(PublicationStatus::Draft, &[Locale::En, Locale::Th], &article);

        assert_eq!(envelopes.len(), 2);
        assert!(envelopes
            .iter()
            .all(|e| e.action == EventAction::Published));

        let channels: Vec<&str> = envelopes
            .iter()
            .map(|e| e.metadata.channel.as_str())
            .collect();
        assert!(channels.contains(&"article-updates-en"));
        assert!(channels.contains(&"article-updates-th"));
    }

    #[test]
    fn test_editing_a_draft_produces_nothing() {
        let article = article(PublicationStatus::Draft, &[Locale::En]);
        let envelopes =
            envelopes_for_transition(PublicationStatus::Draft, &[Locale::En], &article);
        assert!(envelopes.is_empty());
    }

    #[test]
    fn test_update_while_published_produces_updated_envelopes() {
        let article = article(PublicationStatus::Published, &[Locale::En]);
        let envelopes =
            envelopes_for_transition(PublicationStatus::Published, &[Locale::En], &article);

        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].action, EventAction::Updated);
        assert_eq!(envelopes[0].payload.title, "Hello en");
    }

    #[test]
    fn test_new_translation_on_published_article_is_published_for_that_locale() {
        // The Thai translation arrives while the article is already live.
        let article = article(PublicationStatus::Published, &[Locale::En, Locale::Th]);
        let envelopes =
            envelopes_for_transition(PublicationStatus::Published, &[Locale::En], &article);

        assert_eq!(envelopes.len(), 2);
        let en = envelopes
            .iter()
            .find(|e| e.payload.locale == Locale::En)
            .unwrap();
        let th = envelopes
            .iter()
            .find(|e| e.payload.locale == Locale::Th)
            .unwrap();
        assert_eq!(en.action, EventAction::Updated);
        assert_eq!(th.action, EventAction::Published);
    }

    #[test]
    fn test_unpublish_produces_unpublished_per_previous_locale() {
        let article = article(PublicationStatus::Unpublished, &[Locale::En, Locale::Th]);
        let envelopes = envelopes_for_transition(
            PublicationStatus::Published,
            &[Locale::En, Locale::Th],
            &article,
        );

        assert_eq!(envelopes.len(), 2);
        assert!(envelopes
            .iter()
            .all(|e| e.action == EventAction::Unpublished));
    }

    struct RecordingBroadcaster {
        tx: tokio::sync::mpsc::UnboundedSender<Envelope>,
    }

    #[async_trait::async_trait]
    impl EventBroadcaster for RecordingBroadcaster {
        async fn publish(&self, envelope: Envelope) -> Result<(), crate::BroadcastError> {
            let _ = self.tx.send(envelope);
            Ok(())
        }
    }

    struct StallFirstBroadcaster {
        tx: tokio::sync::mpsc::UnboundedSender<String>,
        stall_first: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl EventBroadcaster for StallFirstBroadcaster {
        async fn publish(&self, envelope: Envelope) -> Result<(), crate::BroadcastError> {
            // Only the first publish stalls, so a racy dispatch would let the
            // second envelope overtake it.
            if self
                .stall_first
                .swap(false, std::sync::atomic::Ordering::SeqCst)
            {
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
            let _ = self.tx.send(envelope.payload.title.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_transport_does_not_reorder_a_channel() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let producer = Producer::new(Arc::new(StallFirstBroadcaster {
            tx,
            stall_first: std::sync::atomic::AtomicBool::new(true),
        }));

        let mut v1 = article(PublicationStatus::Published, &[Locale::En]);
        v1.translations[0].title = "Hello v1".to_string();
        let mut v2 = v1.clone();
        v2.translations[0].title = "Hello v2".to_string();

        producer.article_saved(&SavedArticle {
            previous_status: PublicationStatus::Published,
            previous_locales: vec![Locale::En],
            article: v1,
        });
        producer.article_saved(&SavedArticle {
            previous_status: PublicationStatus::Published,
            previous_locales: vec![Locale::En],
            article: v2,
        });

        assert_eq!(rx.recv().await.as_deref(), Some("Hello v1"));
        assert_eq!(rx.recv().await.as_deref(), Some("Hello v2"));
    }

    #[tokio::test]
    async fn test_producer_hands_each_envelope_to_the_broadcaster() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let producer = Producer::new(Arc::new(RecordingBroadcaster { tx }));

        let saved = SavedArticle {
            previous_status: PublicationStatus::Draft,
            previous_locales: vec![Locale::En, Locale::Th],
            article: article(PublicationStatus::Published, &[Locale::En, Locale::Th]),
        };
        producer.article_saved(&saved);

        let first = rx.recv().await.expect("missing first envelope");
        let second = rx.recv().await.expect("missing second envelope");
        assert_ne!(first.payload.locale, second.payload.locale);
        assert!(first.action == EventAction::Published);
    }

    #[test]
    fn test_payload_snapshots_post_change_state() {
        let article = article(PublicationStatus::Published, &[Locale::En]);
        let envelopes =
            envelopes_for_transition(PublicationStatus::Draft, &[], &article);

        assert_eq!(envelopes[0].payload.id, article.id);
        assert_eq!(envelopes[0].payload.title, "Hello en");
        assert_eq!(envelopes[0].payload.locale, Locale::En);
    }
}
