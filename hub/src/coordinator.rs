use crate::config::HubConfig;
use crate::connection::{Connection, ConnectionId, ConnectionInfo, ConnectionKey};
use crate::message::{ConnectionEstablished, Envelope, Payload, WELCOME_MESSAGE};
use crate::registry::{HubCountersSnapshot, Registry};
use chrono::Utc;
use log::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{
    self, error::TrySendError, Receiver, Sender, UnboundedReceiver, UnboundedSender,
};

/// Broadcasts that may wait for the coordinator before new ones are dropped.
pub const BROADCAST_BACKLOG: usize = 256;

/// Cloneable handle to the hub.
///
/// Membership changes and broadcasts are sent to the coordinator task, which
/// applies them one at a time. Introspection reads go straight to the registry.
#[derive(Debug, Clone)]
pub struct Hub {
    register_tx: UnboundedSender<Connection>,
    unregister_tx: UnboundedSender<ConnectionKey>,
    broadcast_tx: Sender<Arc<Envelope>>,
    registry: Arc<Registry>,
    config: HubConfig,
}

/// Owner of the active connection set. Runs as a single task for the life of
/// the process; see [`Coordinator::run`].
pub struct Coordinator {
    active: HashMap<ConnectionId, Connection>,
    registry: Arc<Registry>,
    register_rx: UnboundedReceiver<Connection>,
    unregister_rx: UnboundedReceiver<ConnectionKey>,
    broadcast_rx: Receiver<Arc<Envelope>>,
}

impl Hub {
    /// Builds a hub handle and the coordinator that serves it. The caller is
    /// responsible for running the coordinator.
    pub fn new(config: HubConfig) -> (Self, Coordinator) {
        let (register_tx, register_rx) = mpsc::unbounded_channel();
        let (unregister_tx, unregister_rx) = mpsc::unbounded_channel();
        let (broadcast_tx, broadcast_rx) = mpsc::channel(BROADCAST_BACKLOG);
        let registry = Arc::new(Registry::new());

        let hub = Self {
            register_tx,
            unregister_tx,
            broadcast_tx,
            registry: Arc::clone(&registry),
            config,
        };
        let coordinator = Coordinator {
            active: HashMap::new(),
            registry,
            register_rx,
            unregister_rx,
            broadcast_rx,
        };
        (hub, coordinator)
    }

    /// Builds a hub and spawns its coordinator on the current tokio runtime.
    pub fn spawn(config: HubConfig) -> Self {
        let (hub, coordinator) = Self::new(config);
        tokio::spawn(coordinator.run());
        hub
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn register(&self, connection: Connection) {
        if self.register_tx.send(connection).is_err() {
            warn!("WebSocket hub is not running; dropping new connection");
        }
    }

    /// Removes a connection and closes its outbound queue. Keys that are not
    /// currently registered are ignored, including keys of a connection whose
    /// id has since been taken over by a newer one.
    pub fn unregister(&self, key: ConnectionKey) {
        if self.unregister_tx.send(key).is_err() {
            debug!("WebSocket hub is not running; ignoring unregister");
        }
    }

    /// Queues `envelope` for fan-out to every registered connection.
    /// Never blocks and never reports delivery. When [`BROADCAST_BACKLOG`]
    /// broadcasts are already waiting, `envelope` is dropped.
    pub fn broadcast(&self, envelope: Envelope) {
        match self.broadcast_tx.try_send(Arc::new(envelope)) {
            Ok(()) => {}
            Err(TrySendError::Full(envelope)) => {
                warn!(
                    "WebSocket hub is behind; dropping {} broadcast",
                    envelope.kind()
                );
                self.registry.counters().broadcast_dropped();
            }
            Err(TrySendError::Closed(_)) => {
                debug!("WebSocket hub is not running; dropping broadcast");
            }
        }
    }

    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    pub fn connection_info(&self) -> Vec<ConnectionInfo> {
        self.registry.connection_info()
    }

    pub fn counters(&self) -> HubCountersSnapshot {
        self.registry.counters_snapshot()
    }
}

impl Coordinator {
    /// Serializes every register, unregister and broadcast request.
    ///
    /// Pending registrations are applied before unregistrations, and both before
    /// broadcasts. Returns once every `Hub` handle has been dropped.
    pub async fn run(mut self) {
        info!("WebSocket hub started");

        loop {
            tokio::select! {
                biased;

                Some(connection) = self.register_rx.recv() => self.register(connection),
                Some(key) = self.unregister_rx.recv() => self.unregister(&key),
                Some(envelope) = self.broadcast_rx.recv() => self.broadcast(envelope),
                else => break,
            }
        }

        info!(
            "WebSocket hub stopped, closing {} connection(s)",
            self.active.len()
        );
    }

    fn register(&mut self, connection: Connection) {
        let id = connection.id().clone();
        let welcome = Envelope::now(Payload::ConnectionEstablished(ConnectionEstablished {
            client_id: id.clone(),
            server_time: Utc::now(),
            message: WELCOME_MESSAGE.to_string(),
        }));

        if let Err(e) = connection.try_enqueue(Arc::new(welcome)) {
            warn!(
                "Evicting WebSocket connection {id} at registration: {}",
                describe(&e)
            );
            self.registry.counters().eviction();
            return;
        }

        self.registry.insert(connection.info().clone());
        if self.active.insert(id.clone(), connection).is_some() {
            warn!("WebSocket connection id {id} was reused; the previous connection was replaced");
            self.registry.counters().connection_closed();
        }
        self.registry.counters().connection_opened();

        info!(
            "WebSocket client connected: {id} (active={})",
            self.active.len()
        );
    }

    fn unregister(&mut self, key: &ConnectionKey) {
        let id = key.id();
        match self.active.get(id) {
            Some(connection) if connection.serial() == key.serial() => {
                self.active.remove(id);
                self.registry.remove(id);
                self.registry.counters().connection_closed();
                info!(
                    "WebSocket client disconnected: {id} (active={})",
                    self.active.len()
                );
            }
            Some(_) => debug!("Ignoring unregister for replaced WebSocket connection {id}"),
            None => {}
        }
    }

    fn broadcast(&mut self, envelope: Arc<Envelope>) {
        if self.active.is_empty() {
            trace!("No WebSocket clients for {} broadcast", envelope.kind());
            return;
        }

        let mut delivered = 0u64;
        let mut evicted = Vec::new();

        for (id, connection) in self.active.iter() {
            match connection.try_enqueue(Arc::clone(&envelope)) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("Evicting WebSocket connection {id}: {}", describe(&e));
                    evicted.push(id.clone());
                }
            }
        }

        for id in &evicted {
            self.active.remove(id);
            self.registry.remove(id);
            self.registry.counters().eviction();
            self.registry.counters().connection_closed();
        }
        self.registry.counters().envelopes_enqueued(delivered);

        debug!(
            "Broadcast {} to {} connection(s) ({} evicted)",
            envelope.kind(),
            delivered,
            evicted.len()
        );
    }
}

fn describe<T>(err: &TrySendError<T>) -> &'static str {
    match err {
        TrySendError::Full(_) => "outbound queue full",
        TrySendError::Closed(_) => "outbound queue closed",
    }
}
