//! Server-Sent Events (SSE) fan-out for locale-scoped publish events.
//!
//! This crate holds the server half of the publish pipeline: the channel
//! registry that tracks live stream sessions, the manager that serializes
//! envelopes into wire frames and fans them out, and the broadcast transports.
//!
//! # Architecture
//!
//! - **One session per connection**: each open client stream owns one
//!   ephemeral session, subscribed to the locale channels its request path
//!   implies, destroyed on disconnect or shutdown.
//! - **Dual-index registry**: O(1) lookups for both session teardown and
//!   channel-scoped fan-out via separate DashMap indices.
//! - **Bounded per-session buffers**: a slow consumer fills only its own
//!   outbound buffer; on overflow that session is disconnected instead of
//!   back-pressuring the publish path.
//! - **Ephemeral channels**: no persisted history. A session that is not
//!   subscribed at publish time misses the event and heals from the REST
//!   read-side on its next hydration.
//! - **Pluggable transport**: in-process fan-out for single-instance
//!   deployments, Redis pub/sub for multi-instance fan-out, both behind the
//!   `events::EventBroadcaster` trait.
//!
//! # Message Flow
//!
//! 1. Client opens `GET /events/article-updates-<locale>` and the web layer
//!    registers a session for that channel
//! 2. A content mutation makes the producer publish an envelope
//! 3. The transport resolves the channel from the envelope metadata and hands
//!    it to every subscribed session's buffer (local mode directly, Redis mode
//!    via a pattern-subscribed listener on each process)
//! 4. Each session's stream drains its buffer into SSE frames
//!
//! # Modules
//!
//! - `connection`: ChannelRegistry with dual-index architecture and type-safe SessionId
//! - `manager`: envelope serialization and channel-scoped fan-out
//! - `message`: wire frame construction
//! - `transport`: local and Redis-backed `EventBroadcaster` implementations

pub mod connection;
pub mod manager;
pub mod message;
pub mod transport;

pub use manager::Manager;
