use domain::{ArticleSummary, Id, Locale};
use events::{Envelope, EventAction};
use std::collections::HashMap;

/// Client-side cache of the latest known state of every published article,
/// partitioned by locale.
///
/// Records are keyed by `(article id, locale)`, so the same article carries
/// independent entries per translation. Merging is last-write-wins on
/// arrival order: whatever envelope the transport delivers last is the state
/// kept, envelope timestamps are not compared. Replaying an envelope is a
/// no-op in effect, which makes merging safe across reconnects.
#[derive(Debug, Default)]
pub struct EventStore {
    records: HashMap<(Id, Locale), ArticleSummary>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one stream envelope to the cache.
    ///
    /// Published and updated envelopes replace the record wholesale;
    /// unpublished envelopes remove it.
    pub fn merge(&mut self, envelope: &Envelope) {
        let key = (envelope.payload.id, envelope.payload.locale);

        match envelope.action {
            EventAction::Unpublished => {
                self.records.remove(&key);
            }
            EventAction::Published | EventAction::Updated => {
                self.records.insert(key, envelope.payload.clone());
            }
        }
    }

    /// Seeds the cache from REST records, which share the event payload
    /// shape.
    pub fn hydrate(&mut self, records: Vec<ArticleSummary>) {
        for record in records {
            self.records.insert((record.id, record.locale), record);
        }
    }

    /// All cached records for one locale, newest publication first, id as
    /// tiebreaker.
    pub fn query(&self, locale: Locale) -> Vec<ArticleSummary> {
        let mut records: Vec<ArticleSummary> = self
            .records
            .values()
            .filter(|record| record.locale == locale)
            .cloned()
            .collect();

        records.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.id.cmp(&a.id))
        });

        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn summary(id: Id, locale: Locale, title: &str, published_secs: i64) -> ArticleSummary {
        ArticleSummary {
            id,
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            excerpt: String::new(),
            author: domain::AuthorSummary {
                id: 1,
                name: "Somchai".to_string(),
            },
            category: None,
            featured_image: None,
            reading_time: 4,
            published_at: Some(Utc.timestamp_opt(published_secs, 0).unwrap()),
            locale,
            meta_description: String::new(),
        }
    }

    fn envelope(action: EventAction, payload: ArticleSummary) -> Envelope {
        Envelope::article(action, payload)
    }

    #[test]
    fn test_replayed_envelope_is_idempotent() {
        let mut store = EventStore::new();
        let published = envelope(
            EventAction::Published,
            summary(1, Locale::En, "First", 100),
        );

        store.merge(&published);
        store.merge(&published);

        assert_eq!(store.len(), 1);
        assert_eq!(store.query(Locale::En)[0].title, "First");
    }

    #[test]
    fn test_later_arrival_wins() {
        let mut store = EventStore::new();
        store.merge(&envelope(
            EventAction::Published,
            summary(1, Locale::En, "Original", 100),
        ));
        store.merge(&envelope(
            EventAction::Updated,
            summary(1, Locale::En, "Revised", 100),
        ));

        let records = store.query(Locale::En);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Revised");
    }

    #[test]
    fn test_unpublished_removes_record() {
        let mut store = EventStore::new();
        store.merge(&envelope(
            EventAction::Published,
            summary(1, Locale::En, "Gone soon", 100),
        ));
        store.merge(&envelope(
            EventAction::Unpublished,
            summary(1, Locale::En, "Gone soon", 100),
        ));

        assert!(store.query(Locale::En).is_empty());
    }

    #[test]
    fn test_translations_are_independent_records() {
        let mut store = EventStore::new();
        store.merge(&envelope(
            EventAction::Published,
            summary(1, Locale::En, "English", 100),
        ));
        store.merge(&envelope(
            EventAction::Published,
            summary(1, Locale::Th, "Thai", 100),
        ));

        // Removing one translation leaves the other intact.
        store.merge(&envelope(
            EventAction::Unpublished,
            summary(1, Locale::En, "English", 100),
        ));

        assert!(store.query(Locale::En).is_empty());
        assert_eq!(store.query(Locale::Th).len(), 1);
    }

    #[test]
    fn test_query_is_locale_pure_and_ordered() {
        let mut store = EventStore::new();
        store.merge(&envelope(
            EventAction::Published,
            summary(1, Locale::En, "Older", 100),
        ));
        store.merge(&envelope(
            EventAction::Published,
            summary(2, Locale::En, "Newer", 200),
        ));
        store.merge(&envelope(
            EventAction::Published,
            summary(3, Locale::En, "Same instant", 200),
        ));
        store.merge(&envelope(
            EventAction::Published,
            summary(4, Locale::Th, "Thai only", 300),
        ));

        let records = store.query(Locale::En);
        let ids: Vec<Id> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(records.iter().all(|r| r.locale == Locale::En));
    }

    #[test]
    fn test_hydration_then_stream_merge() {
        let mut store = EventStore::new();
        store.hydrate(vec![
            summary(1, Locale::En, "Seeded", 100),
            summary(2, Locale::En, "Also seeded", 200),
        ]);

        store.merge(&envelope(
            EventAction::Updated,
            summary(1, Locale::En, "Seeded then revised", 100),
        ));

        let records = store.query(Locale::En);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "Seeded then revised");
    }
}
