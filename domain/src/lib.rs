//! Domain types for the bilingual publishing platform.
//!
//! This crate holds the content model (articles with per-locale translations,
//! categories, author summaries), the `Locale` type that drives channel
//! routing, and the in-memory `ContentRepository` that stands in for the
//! relational store at the persistence seam. The wire-facing
//! [`ArticleSummary`](article::ArticleSummary) shape is shared by the REST
//! read-side and the publish-event payloads so that both are structurally
//! interchangeable on the client.

pub mod article;
pub mod error;
pub mod locale;
pub mod repository;

pub use article::{
    Article, ArticleSummary, AuthorSummary, CategorySummary, PublicationStatus, Translation,
};
pub use locale::Locale;
pub use repository::{ContentRepository, SavedArticle};

/// A type alias that represents any content entity's internal id field data type.
pub type Id = i64;
