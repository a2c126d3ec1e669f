//! WebSocket broadcast hub for the Homeboard admin panel.
//!
//! This crate keeps every open admin-panel browser session up to date with
//! configuration changes, widget status, system metrics, log entries and
//! notifications produced elsewhere in the server.
//!
//! # Architecture
//!
//! - **Single coordinator**: One task owns the set of active connections and
//!   applies register, unregister and broadcast requests one at a time. There
//!   is no shared mutable connection map.
//! - **Bounded per-connection queues**: Each connection has an outbound queue
//!   (256 envelopes by default). A broadcast never waits on a client; a
//!   connection whose queue is full is evicted on the spot.
//! - **Two pumps per connection**: The outbound pump is the only socket writer
//!   and sends keepalive pings; the inbound pump is the only reader and
//!   enforces the read deadline.
//! - **Ephemeral messages**: Nothing is persisted or replayed. A browser that
//!   reconnects fetches fresh state over HTTP.
//! - **Typed envelopes**: The wire `type` tag is derived from the payload
//!   variant, so a tag and its payload can never disagree.
//!
//! # Message Flow
//!
//! 1. Browser connects to `/admin/ws`; the web layer upgrades and calls [`serve`]
//! 2. The connection is registered and receives `connection_established` first
//! 3. A producer calls one of the `Hub::broadcast_*` methods (or publishes an
//!    `events::AdminEvent` handled by [`HubEventHandler`])
//! 4. The coordinator enqueues one shared envelope on every connection
//! 5. Each outbound pump serializes it and writes a text frame
//!
//! # Modules
//!
//! - `broadcast`: Typed producer API and the stock notification helpers
//! - `config`: Queue capacity and deadline tuning
//! - `connection`: Connection identity, outbound queue and the session entry point
//! - `coordinator`: The `Hub` handle and the task that owns the active set
//! - `message`: Envelope, payload and client message definitions
//! - `pump`: Inbound and outbound socket pumps
//! - `registry`: Read-only view of the active set and lifetime counters

pub mod broadcast;
pub mod config;
pub mod connection;
pub mod coordinator;
pub mod domain_event_handler;
pub mod error;
pub mod message;
pub mod pump;
pub mod registry;

pub use broadcast::MessageBroadcaster;
pub use config::HubConfig;
pub use connection::{serve, Connection, ConnectionId, ConnectionInfo, ConnectionKey};
pub use coordinator::{Coordinator, Hub};
pub use domain_event_handler::HubEventHandler;
pub use error::Error;
pub use message::{Envelope, Kind, Payload};
pub use registry::HubCountersSnapshot;
