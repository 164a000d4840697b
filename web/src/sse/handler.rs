use ::sse::connection::SessionId;
use ::sse::Manager;
use crate::error::Result;
use async_stream::stream;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use domain::error::Error as DomainError;
use log::*;
use service::AppState;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

type SessionFrame = std::result::Result<Event, Infallible>;

/// Unsubscribes the session when the response stream is dropped.
///
/// On client disconnect the generator is dropped mid-`recv().await` and its
/// body never resumes, so cleanup has to live in a drop impl rather than
/// after the loop. Unregistration is idempotent, so this and the registry's
/// write-failure path can both fire.
struct SessionGuard {
    manager: Arc<Manager>,
    session_id: SessionId,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        debug!(
            "Stream session {} closed, cleaning up",
            self.session_id.as_str()
        );
        self.manager.unregister_session(&self.session_id);
    }
}

/// Stream handler establishing one long-lived session per client connection.
///
/// The channel path segment must name a known locale channel
/// (`article-updates-en`, `article-updates-th`); anything else is 404. The
/// session lives exactly as long as the response stream: a [`SessionGuard`]
/// moved into the generator unsubscribes it whenever the stream is dropped,
/// whether the server closed the session or the client went away.
pub(crate) async fn article_updates_stream(
    State(app_state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<impl IntoResponse> {
    let locale = events::channel::parse_article_updates(&channel)
        .ok_or_else(DomainError::not_found)?;
    debug!("Establishing stream session on {channel} ({locale})");

    let (tx, mut rx) = mpsc::channel::<SessionFrame>(app_state.config.session_buffer_capacity);
    let session_id = app_state
        .sse_manager
        .register_session(vec![channel.clone()], tx);

    let guard = SessionGuard {
        manager: app_state.sse_manager.clone(),
        session_id,
    };

    // Events arrive from the session's bounded buffer and pass straight
    // through; the channel item type is already Result<Event, Infallible>.
    let event_stream = stream! {
        let _guard = guard;
        while let Some(event) = rx.recv().await {
            yield event;
        }
    };

    let sse = Sse::new(event_stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(app_state.config.keepalive_interval_secs))
            .text("keep-alive"),
    );

    // Intermediaries must not cache or coalesce the long-lived response.
    Ok(([(header::CACHE_CONTROL, "no-cache")], sse))
}
