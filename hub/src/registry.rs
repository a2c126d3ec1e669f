use crate::connection::{ConnectionId, ConnectionInfo};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use utoipa::ToSchema;

/// Read-mostly mirror of the hub's active set.
///
/// Only the hub coordinator writes to it; any task may read a snapshot.
/// Snapshots are consistent with some point in time but may already be stale
/// when the caller looks at them.
#[derive(Debug, Default)]
pub struct Registry {
    connections: RwLock<HashMap<ConnectionId, ConnectionInfo>>,
    counters: HubCounters,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, info: ConnectionInfo) {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(info.id.clone(), info);
    }

    pub(crate) fn remove(&self, id: &ConnectionId) {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    pub(crate) fn counters(&self) -> &HubCounters {
        &self.counters
    }

    pub fn connection_count(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Metadata for every registered connection, oldest first.
    pub fn connection_info(&self) -> Vec<ConnectionInfo> {
        let mut infos: Vec<ConnectionInfo> = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        infos.sort_by(|a, b| a.connected_at.cmp(&b.connected_at));
        infos
    }

    pub fn counters_snapshot(&self) -> HubCountersSnapshot {
        self.counters.snapshot()
    }
}

/// Lifetime totals maintained by the coordinator.
#[derive(Debug, Default)]
pub struct HubCounters {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    envelopes_enqueued: AtomicU64,
    evictions: AtomicU64,
    broadcasts_dropped: AtomicU64,
}

impl HubCounters {
    pub(crate) fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn envelopes_enqueued(&self, count: u64) {
        self.envelopes_enqueued.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn broadcast_dropped(&self) {
        self.broadcasts_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> HubCountersSnapshot {
        HubCountersSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            envelopes_enqueued: self.envelopes_enqueued.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            broadcasts_dropped: self.broadcasts_dropped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct HubCountersSnapshot {
    pub connections_opened: u64,
    /// Includes evictions.
    pub connections_closed: u64,
    pub envelopes_enqueued: u64,
    pub evictions: u64,
    /// Broadcasts refused because the coordinator's backlog was full.
    pub broadcasts_dropped: u64,
}
