use crate::locale::Locale;
use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Publication lifecycle of an article.
///
/// Only the `Published` state is visible on the read-side; transitions into
/// and out of it are what the event producer watches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Draft,
    Published,
    Unpublished,
}

impl PublicationStatus {
    pub fn is_published(&self) -> bool {
        matches!(self, PublicationStatus::Published)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct PublicationStatusParseError;

impl fmt::Display for PublicationStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unrecognized publication status")
    }
}

impl std::error::Error for PublicationStatusParseError {}

impl FromStr for PublicationStatus {
    type Err = PublicationStatusParseError;

    fn from_str(status: &str) -> Result<PublicationStatus, Self::Err> {
        match status.to_lowercase().as_str() {
            "draft" => Ok(PublicationStatus::Draft),
            "published" => Ok(PublicationStatus::Published),
            "unpublished" => Ok(PublicationStatus::Unpublished),
            _ => Err(PublicationStatusParseError),
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PublicationStatus::Draft => write!(f, "draft"),
            PublicationStatus::Published => write!(f, "published"),
            PublicationStatus::Unpublished => write!(f, "unpublished"),
        }
    }
}

/// Author fields exposed on the public read-side and in event payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Id,
    pub name: String,
}

/// Category fields exposed on the public read-side and in event payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: Id,
    pub name: String,
    pub slug: String,
}

/// Locale-specific fields of an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub locale: Locale,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub meta_description: String,
}

/// A content article with its shared fields and per-locale translations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Id,
    pub status: PublicationStatus,
    pub author: AuthorSummary,
    pub category: Option<CategorySummary>,
    pub featured_image: Option<String>,
    pub reading_time: u32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub translations: Vec<Translation>,
}

impl Article {
    /// The set of locales this article currently has translations for.
    pub fn locales(&self) -> Vec<Locale> {
        self.translations.iter().map(|t| t.locale).collect()
    }

    pub fn translation(&self, locale: Locale) -> Option<&Translation> {
        self.translations.iter().find(|t| t.locale == locale)
    }

    /// Build the public snapshot of this article for one locale.
    ///
    /// Returns `None` when no translation exists for the locale. The returned
    /// shape is identical for the REST read-side and event payloads.
    pub fn summary(&self, locale: Locale) -> Option<ArticleSummary> {
        let translation = self.translation(locale)?;

        Some(ArticleSummary {
            id: self.id,
            title: translation.title.clone(),
            slug: translation.slug.clone(),
            excerpt: translation.excerpt.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
            featured_image: self.featured_image.clone(),
            reading_time: self.reading_time,
            published_at: self.published_at,
            locale,
            meta_description: translation.meta_description.clone(),
        })
    }
}

/// Public snapshot of one article translation.
///
/// This is the unit transported in event envelope payloads and returned by the
/// read-side listing endpoints. A client record is keyed by `(id, locale)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: Id,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub author: AuthorSummary,
    pub category: Option<CategorySummary>,
    pub featured_image: Option<String>,
    pub reading_time: u32,
    pub published_at: Option<DateTime<Utc>>,
    pub locale: Locale,
    pub meta_description: String,
}
