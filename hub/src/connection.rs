use crate::coordinator::Hub;
use crate::message::Envelope;
use crate::pump;
use axum::extract::ws::WebSocket;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use log::*;
use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use utoipa::ToSchema;

/// Receiving half of a connection's outbound queue, drained by its outbound pump.
pub type Outbox = mpsc::Receiver<Arc<Envelope>>;

/// Unique identifier for a connection (server-generated).
///
/// Derived from the wall clock at accept time, so uniqueness is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(format!("client_{}", unix_nanos()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn unix_nanos() -> i64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000))
}

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Names one registration rather than one id.
///
/// Ids are not guaranteed unique, so the hub only acts on an unregister whose
/// serial matches the connection currently holding that id. A pump that
/// outlives a replaced connection therefore cannot remove its successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionKey {
    id: ConnectionId,
    serial: u64,
}

impl ConnectionKey {
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub(crate) fn serial(&self) -> u64 {
        self.serial
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}

/// Metadata exposed to monitoring endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub connected_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
}

/// The hub's side of one client session: identity plus the only strong sender
/// into the client's outbound queue. Dropping it closes the queue.
#[derive(Debug)]
pub struct Connection {
    info: ConnectionInfo,
    serial: u64,
    sender: mpsc::Sender<Arc<Envelope>>,
}

impl Connection {
    /// Creates a connection with a fresh id and an outbound queue of `capacity` envelopes.
    pub fn open(capacity: usize, remote_addr: Option<SocketAddr>) -> (Self, Outbox) {
        Self::open_with_id(ConnectionId::generate(), capacity, remote_addr)
    }

    pub fn open_with_id(
        id: ConnectionId,
        capacity: usize,
        remote_addr: Option<SocketAddr>,
    ) -> (Self, Outbox) {
        let (sender, outbox) = mpsc::channel(capacity.max(1));
        let connection = Self {
            info: ConnectionInfo {
                id,
                connected_at: Utc::now(),
                remote_addr: remote_addr.map(|addr| addr.to_string()),
            },
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
            sender,
        };
        (connection, outbox)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.info.id
    }

    pub fn key(&self) -> ConnectionKey {
        ConnectionKey {
            id: self.info.id.clone(),
            serial: self.serial,
        }
    }

    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    pub(crate) fn serial(&self) -> u64 {
        self.serial
    }

    /// Handle for answering this client directly, without going through the hub.
    pub fn replier(&self) -> Replier {
        Replier {
            key: self.key(),
            sender: self.sender.downgrade(),
        }
    }

    pub(crate) fn try_enqueue(
        &self,
        envelope: Arc<Envelope>,
    ) -> Result<(), TrySendError<Arc<Envelope>>> {
        self.sender.try_send(envelope)
    }
}

/// Weak handle on a connection's outbound queue used for 1:1 replies (pong,
/// subscription acknowledgements). Holding it never keeps the queue open.
#[derive(Debug, Clone)]
pub struct Replier {
    key: ConnectionKey,
    sender: mpsc::WeakSender<Arc<Envelope>>,
}

impl Replier {
    pub fn id(&self) -> &ConnectionId {
        self.key.id()
    }

    pub fn key(&self) -> &ConnectionKey {
        &self.key
    }

    /// Enqueues `envelope` without blocking. Returns false when the queue is
    /// full or already closed; the reply is then dropped.
    pub fn reply(&self, envelope: Envelope) -> bool {
        let Some(sender) = self.sender.upgrade() else {
            return false;
        };
        match sender.try_send(Arc::new(envelope)) {
            Ok(()) => true,
            Err(TrySendError::Full(envelope)) => {
                debug!(
                    "Dropping {} reply for connection {}: outbound queue full",
                    envelope.kind(),
                    self.key
                );
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Runs one upgraded WebSocket session to completion.
///
/// Registers the connection with the hub, spawns the inbound pump and drives
/// the outbound pump on the current task. The inbound pump finishing tells the
/// outbound pump to close the socket.
pub async fn serve(hub: Hub, socket: WebSocket, remote_addr: Option<SocketAddr>) {
    let config = hub.config().clone();
    let (connection, outbox) = Connection::open(config.queue_capacity, remote_addr);
    let key = connection.key();
    let replier = connection.replier();

    debug!("Accepted WebSocket connection {key} from {remote_addr:?}");

    let (sink, stream) = socket.split();
    hub.register(connection);

    let (reader_done_tx, reader_done) = oneshot::channel();
    let inbound_hub = hub.clone();
    let read_deadline = config.read_deadline;
    tokio::spawn(async move {
        pump::inbound(stream, replier, inbound_hub, read_deadline).await;
        let _ = reader_done_tx.send(());
    });
    pump::outbound(sink, outbox, reader_done, hub, key, &config).await;
}
