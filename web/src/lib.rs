//! HTTP layer for the content platform: the long-lived event-stream endpoint,
//! the read-side article listings it hydrates from, and the admin mutation
//! endpoints that drive the event producer.

pub mod controller;
pub mod error;
pub mod params;
pub mod router;
pub mod sse;

pub use router::define_routes;
pub use service::AppState;
