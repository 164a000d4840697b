use domain::{AuthorSummary, CategorySummary, Id, Locale, PublicationStatus, Translation};
use serde::Deserialize;

/// Query params for the published-article listing.
#[derive(Debug, Deserialize)]
pub struct IndexParams {
    pub locale: Locale,
    pub category: Option<Id>,
}

/// Query params for the latest-articles listing.
#[derive(Debug, Deserialize)]
pub struct LatestParams {
    pub locale: Locale,
    pub limit: Option<usize>,
}

/// Body of an article-creation request.
#[derive(Debug, Deserialize)]
pub struct CreateParams {
    pub author: AuthorSummary,
    pub category: Option<CategorySummary>,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub reading_time: u32,
}

/// Body of a translation upsert; the locale comes from the request path.
#[derive(Debug, Deserialize)]
pub struct TranslationParams {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub meta_description: String,
}

impl TranslationParams {
    pub fn into_translation(self, locale: Locale) -> Translation {
        Translation {
            locale,
            title: self.title,
            slug: self.slug,
            excerpt: self.excerpt,
            meta_description: self.meta_description,
        }
    }
}

/// Body of a publication-status change.
#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub status: PublicationStatus,
}
