use axum::response::sse::Event;
use events::Envelope;

/// Build the SSE wire frame for an envelope.
///
/// The frame's event name reflects the action (`article-published`,
/// `article-updated`, `article-unpublished`) and the data field carries the
/// JSON-encoded envelope, so a client can rebuild the exact structure the
/// producer emitted.
pub fn to_sse_event(envelope: &Envelope) -> Result<Event, serde_json::Error> {
    let data = serde_json::to_string(envelope)?;
    Ok(Event::default()
        .event(envelope.action.event_name())
        .data(data))
}
