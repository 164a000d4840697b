use crate::controller::{article_controller, health_check_controller};
use crate::{sse, AppState};
use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post, put},
    Router,
};
use log::*;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(article_routes(app_state.clone()))
        .merge(event_stream_routes(app_state.clone()))
        .merge(health_routes())
        .layer(cors_layer(&app_state))
}

fn article_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/articles", get(article_controller::index))
        .route("/articles", post(article_controller::create))
        .route("/articles/latest", get(article_controller::latest))
        .route("/articles/:id", get(article_controller::read))
        .route(
            "/articles/:id/translations/:locale",
            put(article_controller::upsert_translation),
        )
        .route("/articles/:id/status", put(article_controller::update_status))
        .with_state(app_state)
}

fn event_stream_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/events/:channel", get(sse::handler::article_updates_stream))
        .with_state(app_state)
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// Stream responses carry credentials, so origins are an explicit list rather
// than a wildcard.
fn cors_layer(app_state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Skipping unparseable CORS origin '{origin}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::sse::{transport::LocalTransport, Manager};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use clap::Parser;
    use domain::ContentRepository;
    use events::Producer;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> Router {
        let config = service::Config::parse_from(["content_platform_rs"]);
        let repository = Arc::new(ContentRepository::new());
        let sse_manager = Arc::new(Manager::new());
        let producer = Arc::new(Producer::new(Arc::new(LocalTransport::new(
            sse_manager.clone(),
        ))));
        define_routes(AppState::new(config, repository, sse_manager, producer))
    }

    #[tokio::test]
    async fn test_health_endpoint_responds_ok() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stream_endpoint_rejects_unknown_channels() {
        for uri in ["/events/user-42", "/events/article-updates-de"] {
            let response = router()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn test_stream_endpoint_opens_locale_channel_sessions() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/events/article-updates-th")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-cache"
        );
    }
}
