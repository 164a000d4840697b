use crate::article::{Article, ArticleSummary, AuthorSummary, CategorySummary, PublicationStatus, Translation};
use crate::error::Error;
use crate::locale::Locale;
use crate::Id;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// The outcome of a repository write, carrying enough of the pre-change state
/// for the event producer to detect a publication transition.
#[derive(Debug, Clone)]
pub struct SavedArticle {
    pub previous_status: PublicationStatus,
    pub previous_locales: Vec<Locale>,
    pub article: Article,
}

/// Concurrent in-memory article store.
///
/// Persistent relational storage is an external collaborator of this system;
/// this repository provides the same seam (create / translate / change status /
/// published listings) over a DashMap so the rest of the platform is agnostic
/// to what backs it.
pub struct ContentRepository {
    articles: DashMap<Id, Article>,
    next_id: AtomicI64,
}

impl ContentRepository {
    pub fn new() -> Self {
        Self {
            articles: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Create a new draft article with no translations yet.
    pub fn create(
        &self,
        author: AuthorSummary,
        category: Option<CategorySummary>,
        featured_image: Option<String>,
        reading_time: u32,
    ) -> Article {
        let now = Utc::now();
        let article = Article {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            status: PublicationStatus::Draft,
            author,
            category,
            featured_image,
            reading_time,
            published_at: None,
            created_at: now,
            updated_at: now,
            translations: Vec::new(),
        };

        self.articles.insert(article.id, article.clone());
        article
    }

    pub fn find(&self, id: Id) -> Option<Article> {
        self.articles.get(&id).map(|entry| entry.clone())
    }

    /// Insert or replace the translation for one locale.
    pub fn upsert_translation(&self, id: Id, translation: Translation) -> Result<SavedArticle, Error> {
        if translation.title.trim().is_empty() || translation.slug.trim().is_empty() {
            return Err(Error::invalid("translation requires a title and a slug"));
        }

        let mut entry = self.articles.get_mut(&id).ok_or_else(Error::not_found)?;

        let previous_status = entry.status;
        let previous_locales = entry.locales();

        match entry
            .translations
            .iter_mut()
            .find(|t| t.locale == translation.locale)
        {
            Some(existing) => *existing = translation,
            None => entry.translations.push(translation),
        }
        entry.updated_at = Utc::now();

        Ok(SavedArticle {
            previous_status,
            previous_locales,
            article: entry.clone(),
        })
    }

    /// Change the publication status, stamping `published_at` on the first
    /// transition into `Published`.
    pub fn set_status(&self, id: Id, status: PublicationStatus) -> Result<SavedArticle, Error> {
        let mut entry = self.articles.get_mut(&id).ok_or_else(Error::not_found)?;

        let previous_status = entry.status;
        let previous_locales = entry.locales();

        let now = Utc::now();
        entry.status = status;
        entry.updated_at = now;
        if status.is_published() && entry.published_at.is_none() {
            entry.published_at = Some(now);
        }

        Ok(SavedArticle {
            previous_status,
            previous_locales,
            article: entry.clone(),
        })
    }

    /// All published articles translated into `locale`, optionally narrowed to
    /// one category, newest publication first (ties broken by id descending).
    pub fn list_published(&self, locale: Locale, category: Option<Id>) -> Vec<ArticleSummary> {
        let mut summaries: Vec<ArticleSummary> = self
            .articles
            .iter()
            .filter(|entry| entry.status.is_published())
            .filter(|entry| match category {
                Some(category_id) => entry
                    .category
                    .as_ref()
                    .is_some_and(|c| c.id == category_id),
                None => true,
            })
            .filter_map(|entry| entry.summary(locale))
            .collect();

        summaries.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.id.cmp(&a.id))
        });
        summaries
    }

    pub fn latest_published(&self, locale: Locale, limit: usize) -> Vec<ArticleSummary> {
        let mut summaries = self.list_published(locale, None);
        summaries.truncate(limit);
        summaries
    }
}

impl Default for ContentRepository {
    fn default() -> Self {
        Self::new()
    }
}
