//! Publish-event infrastructure for the content platform.
//!
//! This crate owns the signal side of the publish pipeline and enables loose
//! coupling between content mutations and stream delivery:
//!
//! - **Envelope**: the immutable, locale-scoped unit transported end-to-end
//! - **Producer**: detects publication transitions and builds one envelope per
//!   affected locale
//! - **EventBroadcaster**: trait implemented by the delivery transports (the
//!   `sse` crate provides in-process and Redis-backed implementations)
//!
//! This crate has no dependency on the transport crates, avoiding circular
//! dependencies; it only knows the broadcaster trait.

use async_trait::async_trait;
use std::fmt;

pub mod channel;
pub mod envelope;
pub mod producer;

pub use envelope::{Envelope, EventAction, EventKind, EventMetadata};
pub use producer::Producer;

/// Error returned by a broadcast transport.
///
/// Producers treat this as diagnostic only: a failed broadcast never fails the
/// content mutation that triggered it.
#[derive(Debug)]
pub struct BroadcastError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BroadcastError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "broadcast error: {}", self.message)
    }
}

impl std::error::Error for BroadcastError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Trait for routing an envelope onto its logical channel.
///
/// Implementations fan the envelope out to every session subscribed to the
/// channel named in its metadata, either directly in-process or through an
/// external pub/sub transport. Delivery is at-most-once, best-effort.
#[async_trait]
pub trait EventBroadcaster: Send + Sync {
    async fn publish(&self, envelope: Envelope) -> Result<(), BroadcastError>;
}
