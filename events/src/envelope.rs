use crate::channel;
use chrono::{DateTime, Utc};
use domain::ArticleSummary;
use serde::{Deserialize, Serialize};

/// Content type an envelope refers to. Currently only articles publish
/// events; the enum leaves room for other content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Article,
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Published,
    Updated,
    Unpublished,
}

impl EventAction {
    /// The SSE event name frames of this action are tagged with.
    pub fn event_name(&self) -> &'static str {
        match self {
            EventAction::Published => "article-published",
            EventAction::Updated => "article-updated",
            EventAction::Unpublished => "article-unpublished",
        }
    }
}

/// Delivery metadata stamped at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub timestamp: DateTime<Utc>,
    pub channel: String,
}

/// The unit transported end-to-end, from producer to client cache.
///
/// An envelope is immutable once constructed: `payload.locale` fixes the
/// channel it routes to at construction time and nothing mutates it
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub kind: EventKind,
    pub action: EventAction,
    pub payload: ArticleSummary,
    pub metadata: EventMetadata,
}

impl Envelope {
    /// Build an article envelope, resolving the target channel from the
    /// payload's locale.
    pub fn article(action: EventAction, payload: ArticleSummary) -> Self {
        let metadata = EventMetadata {
            timestamp: Utc::now(),
            channel: channel::article_updates(payload.locale),
        };

        Self {
            kind: EventKind::Article,
            action,
            payload,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{AuthorSummary, Locale};

    fn summary(id: i64, locale: Locale, title: &str) -> ArticleSummary {
        ArticleSummary {
            id,
            title: title.to_string(),
            slug: title.to_lowercase(),
            excerpt: "".to_string(),
            author: AuthorSummary {
                id: 1,
                name: "Somchai".to_string(),
            },
            category: None,
            featured_image: None,
            reading_time: 2,
            published_at: Some(Utc::now()),
            locale,
            meta_description: "".to_string(),
        }
    }

    #[test]
    fn test_envelope_routes_to_locale_channel() {
        let envelope = Envelope::article(EventAction::Published, summary(1, Locale::En, "Hello"));
        assert_eq!(envelope.metadata.channel, "article-updates-en");

        let envelope = Envelope::article(EventAction::Updated, summary(1, Locale::Th, "Hello"));
        assert_eq!(envelope.metadata.channel, "article-updates-th");
    }

    #[test]
    fn test_envelope_survives_json_round_trip() {
        let envelope = Envelope::article(EventAction::Published, summary(1, Locale::En, "Hello"));
        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_action_event_names() {
        assert_eq!(EventAction::Published.event_name(), "article-published");
        assert_eq!(EventAction::Updated.event_name(), "article-updated");
        assert_eq!(EventAction::Unpublished.event_name(), "article-unpublished");
    }
}
