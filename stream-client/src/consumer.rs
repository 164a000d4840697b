use crate::fsm::{ConnectionFsm, ConnectionStatus, Directive, ReconnectPolicy};
use events::Envelope;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::sleep;

/// Options applied when opening a stream connection.
#[derive(Debug, Clone, Default)]
pub struct ConsumerOptions {
    pub policy: ReconnectPolicy,
    /// Session cookie forwarded on the stream request, when the server
    /// requires one.
    pub cookie: Option<String>,
}

/// A long-lived subscription to one event-stream endpoint.
///
/// The consumer owns a background task that dials the endpoint, feeds every
/// transport outcome into a [`ConnectionFsm`], and hands each decoded
/// [`Envelope`] to the supplied callback. Reconnects are driven by the FSM's
/// bounded fixed-delay policy; the library's own retry loop is disabled so
/// every attempt is observable. A consumer serves exactly one endpoint —
/// switching channels means closing this one and opening another.
pub struct Consumer {
    status_rx: watch::Receiver<ConnectionStatus>,
    task: tokio::task::JoinHandle<()>,
}

impl Consumer {
    /// Opens the stream and starts the connection runner.
    ///
    /// `on_envelope` runs on the runner task for every well-formed event
    /// frame; malformed frames are dropped with a debug log.
    pub fn open<F>(endpoint: String, options: ConsumerOptions, on_envelope: F) -> Self
    where
        F: Fn(Envelope) + Send + Sync + 'static,
    {
        let mut fsm = ConnectionFsm::new(options.policy);
        let (status_tx, status_rx) = watch::channel(fsm.status());
        let on_envelope = Arc::new(on_envelope);

        let task = tokio::spawn(async move {
            loop {
                let attempt_outcome =
                    run_attempt(&endpoint, options.cookie.as_deref(), &mut fsm, &status_tx, &on_envelope)
                        .await;

                if let Err(e) = attempt_outcome {
                    debug!("Stream attempt against {} failed: {}", endpoint, e);
                }

                match fsm.on_transport_error() {
                    Directive::GiveUp => {
                        let status = fsm.status();
                        warn!(
                            "Giving up on {} after {} failed attempts",
                            endpoint, status.attempts
                        );
                        let _ = status_tx.send(status);
                        break;
                    }
                    Directive::RetryAfter(delay) => {
                        let _ = status_tx.send(fsm.status());
                        sleep(delay).await;
                        fsm.on_retry();
                        let _ = status_tx.send(fsm.status());
                    }
                    Directive::Continue => {}
                }
            }
        });

        Self { status_rx, task }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Watch channel for connection-state transitions, for status displays.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// Tears the connection down, cancelling any pending reconnect timer.
    pub fn close(self) {
        self.task.abort();
    }
}

impl Drop for Consumer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Drives a single connection attempt until the transport fails or ends.
///
/// Any received frame, keep-alive comments included, marks the connection
/// as open and resets the attempt counter.
async fn run_attempt(
    endpoint: &str,
    cookie: Option<&str>,
    fsm: &mut ConnectionFsm,
    status_tx: &watch::Sender<ConnectionStatus>,
    on_envelope: &Arc<impl Fn(Envelope) + Send + Sync>,
) -> Result<(), es::Error> {
    let mut builder = es::ClientBuilder::for_url(endpoint)?;
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie)?;
    }

    // The library's internal retry would hide attempts from the FSM.
    let client = builder
        .reconnect(es::ReconnectOptions::reconnect(false).build())
        .build();

    let mut stream = client.stream();

    loop {
        match stream.next().await {
            Some(Ok(es::SSE::Event(event))) => {
                fsm.on_frame();
                let _ = status_tx.send(fsm.status());

                match serde_json::from_str::<Envelope>(&event.data) {
                    Ok(envelope) => on_envelope(envelope),
                    Err(e) => {
                        debug!("Dropping malformed {} frame: {}", event.event_type, e);
                    }
                }
            }
            Some(Ok(es::SSE::Comment(_))) => {
                // Keep-alive; proves the connection is open.
                fsm.on_frame();
                let _ = status_tx.send(fsm.status());
            }
            Some(Err(e)) => return Err(e),
            None => return Ok(()),
        }
    }
}
