//! Client side of the publish-event pipeline.
//!
//! - `fsm`: the connection state machine (connecting / connected / error /
//!   disconnected) and its bounded reconnect policy, testable without a
//!   network
//! - `consumer`: the long-lived stream connection driving the FSM from real
//!   transport events and parsing wire frames into envelopes
//! - `store`: the idempotent, locale-partitioned cache of the latest known
//!   article records
//! - `api_client`: REST hydration of initial state, shaped identically to
//!   event payloads
//!
//! A UI observes the consumer's connection status and the store's contents;
//! it never blocks on stream health because the store hydrates from REST
//! regardless.

pub mod api_client;
pub mod consumer;
pub mod fsm;
pub mod store;

pub use consumer::{Consumer, ConsumerOptions};
pub use fsm::{ConnectionFsm, ConnectionState, ConnectionStatus, Directive, ReconnectPolicy};
pub use store::EventStore;
