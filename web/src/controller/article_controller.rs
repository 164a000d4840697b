use crate::error::Result;
use crate::params::article::{
    CreateParams, IndexParams, LatestParams, StatusParams, TranslationParams,
};
use axum::extract::{Path, Query, State};
use axum::Json;
use domain::{error::Error as DomainError, Article, ArticleSummary, Id, Locale};
use log::*;
use service::AppState;

const DEFAULT_LATEST_LIMIT: usize = 5;

/// GET all published articles for one locale, optionally narrowed to a
/// category. The response records are shaped exactly like event payloads so
/// clients can hydrate their cache from either source.
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<Json<Vec<ArticleSummary>>> {
    debug!("GET /articles for locale {}", params.locale);

    Ok(Json(
        app_state
            .repository_ref()
            .list_published(params.locale, params.category),
    ))
}

/// GET the most recently published articles for one locale.
pub async fn latest(
    State(app_state): State<AppState>,
    Query(params): Query<LatestParams>,
) -> Result<Json<Vec<ArticleSummary>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LATEST_LIMIT);
    debug!("GET /articles/latest for locale {} limit {limit}", params.locale);

    Ok(Json(
        app_state
            .repository_ref()
            .latest_published(params.locale, limit),
    ))
}

/// GET one article by id, including all of its translations.
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Article>> {
    let article = app_state
        .repository_ref()
        .find(id)
        .ok_or_else(DomainError::not_found)?;

    Ok(Json(article))
}

/// POST a new draft article. Drafts produce no publish events.
pub async fn create(
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Article>> {
    let article = app_state.repository_ref().create(
        params.author,
        params.category,
        params.featured_image,
        params.reading_time,
    );
    info!("Created draft article {}", article.id);

    Ok(Json(article))
}

/// PUT a locale translation onto an article.
///
/// The producer is notified after the write commits; for a live article this
/// emits `updated` envelopes (and `published` for a locale translated for the
/// first time), for a draft it emits nothing.
pub async fn upsert_translation(
    State(app_state): State<AppState>,
    Path((id, locale)): Path<(Id, Locale)>,
    Json(params): Json<TranslationParams>,
) -> Result<Json<Article>> {
    let saved = app_state
        .repository_ref()
        .upsert_translation(id, params.into_translation(locale))?;

    app_state.producer.article_saved(&saved);
    info!("Upserted {locale} translation for article {id}");

    Ok(Json(saved.article))
}

/// PUT a publication status change, the signal the whole event pipeline hangs
/// off of. The repository write commits first; event production can never
/// fail the mutation.
pub async fn update_status(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<StatusParams>,
) -> Result<Json<Article>> {
    let saved = app_state.repository_ref().set_status(id, params.status)?;

    app_state.producer.article_saved(&saved);
    info!(
        "Article {id} status: {} -> {}",
        saved.previous_status, saved.article.status
    );

    Ok(Json(saved.article))
}
