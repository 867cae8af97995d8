//! # Worker Module
//!
//! A simulated backend. Each worker owns the mapping from connection id to
//! the load value fixed at admission time, and aggregates its own load on
//! demand. Workers are thread-safe: the connection map is a `DashMap`, so a
//! worker shared behind an `Arc` can admit, close, and report concurrently.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;

use crate::core::error::{DispatchError, DispatchResult};
use crate::core::types::{ConnectionId, WorkerId};

/// A backend worker holding a set of open connections and their loads.
pub struct Worker {
    id: WorkerId,
    /// Open connections and the load fixed for each at admission.
    /// Never holds an entry for a closed connection.
    connections: DashMap<ConnectionId, f64>,
    /// Lifetime admissions, including connections since closed.
    admissions: AtomicU64,
    last_admission: RwLock<Option<DateTime<Utc>>>,
}

impl Worker {
    /// Create an empty worker.
    pub fn new(id: WorkerId) -> Self {
        Self {
            id,
            connections: DashMap::new(),
            admissions: AtomicU64::new(0),
            last_admission: RwLock::new(None),
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Admit a connection with the given load.
    ///
    /// Admitting an id that is already open is reported as
    /// [`DispatchError::DuplicateConnection`] and leaves the existing entry
    /// untouched.
    pub fn add_connection(
        &self,
        id: impl Into<ConnectionId>,
        load: f64,
    ) -> DispatchResult<()> {
        match self.connections.entry(id.into()) {
            Entry::Occupied(entry) => Err(DispatchError::DuplicateConnection {
                id: entry.key().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(load);
                self.admissions.fetch_add(1, Ordering::Relaxed);
                *self.last_admission.write() = Some(Utc::now());
                Ok(())
            }
        }
    }

    /// Close a connection, returning the load it freed.
    ///
    /// Closing an id that is not open is a no-op and returns `None`, so
    /// repeated closes are harmless.
    pub fn close_connection(&self, id: &ConnectionId) -> Option<f64> {
        self.connections.remove(id).map(|(_, load)| load)
    }

    /// Whether the given connection is currently open on this worker.
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    /// Sum of the loads of all open connections. `0.0` when idle.
    pub fn load(&self) -> f64 {
        self.connections.iter().map(|entry| *entry.value()).sum()
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Percentage rendering of the current load, e.g. `"42.50%"`.
    pub fn describe(&self) -> String {
        format!("{:.2}%", self.load())
    }

    /// Snapshot of this worker's state for monitoring.
    pub fn stats(&self) -> WorkerStats {
        WorkerStats {
            worker: self.id,
            connections: self.connection_count(),
            load: self.load(),
            admissions: self.admissions.load(Ordering::Relaxed),
            last_admission: *self.last_admission.read(),
        }
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("connections", &self.connection_count())
            .field("load", &self.load())
            .finish()
    }
}

/// Point-in-time view of a single worker.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStats {
    pub worker: WorkerId,
    pub connections: usize,
    pub load: f64,
    pub admissions: u64,
    pub last_admission: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker() -> Worker {
        Worker::new(WorkerId::new(0))
    }

    #[test]
    fn empty_worker_has_zero_load() {
        let w = worker();
        assert_eq!(w.load(), 0.0);
        assert!(w.is_empty());
        assert_eq!(w.describe(), "0.00%");
    }

    #[test]
    fn duplicate_admission_is_rejected_and_load_kept() {
        let w = worker();
        w.add_connection("c1", 4.0).unwrap();
        let err = w.add_connection("c1", 9.0).unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateConnection { .. }));
        assert_eq!(w.load(), 4.0);
    }

    #[test]
    fn admissions_counter_survives_closes() {
        let w = worker();
        w.add_connection("c1", 2.0).unwrap();
        w.close_connection(&ConnectionId::from("c1"));
        w.add_connection("c2", 3.0).unwrap();
        assert_eq!(w.stats().admissions, 2);
        assert_eq!(w.stats().connections, 1);
    }
}
