//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the event-stream endpoint.
//! The core fan-out infrastructure (Manager, ChannelRegistry, transports)
//! lives in the `sse` crate to avoid circular dependencies.

pub mod handler;
