//! # Dispatcher Module
//!
//! Routes incoming connections onto the worker pool and grows the pool when
//! aggregate load calls for it. Each admission is one transition: draw a
//! load value, pick a worker at random, admit the connection there, record
//! the owner in the reverse index, then run the scale-out check.
//!
//! Placement is uniform over the pool and blind to per-worker load. That
//! naive policy is the point of the simulator; the model seam exists for
//! deterministic tests, not for smarter routing.
//!
//! The dispatcher is thread-safe: workers are shared behind `Arc`, pool
//! membership sits behind a `parking_lot::RwLock`, and the reverse index is
//! a `DashMap`. The grow decision reads the average and appends under a
//! single pool write lock, so concurrent admissions during a load spike
//! still add workers one at a time.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::config::SimulatorConfig;
use crate::core::error::{DispatchError, DispatchResult};
use crate::core::types::{ConnectionId, WorkerId};
use crate::pool::scaling::{ScaleDecision, ScalePolicy};
use crate::pool::worker::{Worker, WorkerStats};
use crate::traffic::{TrafficModel, UniformModel};

/// Routes connections to a pool of workers and scales the pool out.
///
/// The pool is append-only and starts with at least one worker, so it is
/// never empty. The reverse index maps every open connection to its owning
/// worker; it is a derived cache kept consistent with the workers' own
/// maps, which remain the source of truth.
pub struct Dispatcher {
    /// Ordered worker pool. Order matters only for deterministic display
    /// and iteration, never for routing.
    pool: RwLock<Vec<Arc<Worker>>>,
    /// Reverse index: open connection id → owning worker.
    owners: DashMap<ConnectionId, Arc<Worker>>,
    model: Mutex<Box<dyn TrafficModel>>,
    policy: ScalePolicy,
    admissions: AtomicU64,
    closes: AtomicU64,
    scale_events: AtomicU64,
}

impl Dispatcher {
    /// Dispatcher with default configuration and an entropy-seeded uniform
    /// traffic model.
    pub fn new() -> Self {
        Self::build(SimulatorConfig::default(), Box::new(UniformModel::default()))
    }

    /// Dispatcher from a validated configuration, drawing traffic from a
    /// [`UniformModel`] over the configured load range (seeded when the
    /// configuration carries a seed).
    pub fn with_config(config: SimulatorConfig) -> DispatchResult<Self> {
        config.validate()?;
        let model = UniformModel::from_config(&config);
        Ok(Self::build(config, Box::new(model)))
    }

    /// Dispatcher with a caller-supplied traffic model. This is the full
    /// injection point used by deterministic tests.
    pub fn with_model(
        config: SimulatorConfig,
        model: Box<dyn TrafficModel>,
    ) -> DispatchResult<Self> {
        config.validate()?;
        Ok(Self::build(config, model))
    }

    fn build(config: SimulatorConfig, model: Box<dyn TrafficModel>) -> Self {
        let pool: Vec<Arc<Worker>> = (0..config.initial_workers)
            .map(|index| Arc::new(Worker::new(WorkerId::new(index))))
            .collect();

        Self {
            pool: RwLock::new(pool),
            owners: DashMap::new(),
            model: Mutex::new(model),
            policy: ScalePolicy::new(config.scale_threshold),
            admissions: AtomicU64::new(0),
            closes: AtomicU64::new(0),
            scale_events: AtomicU64::new(0),
        }
    }

    /// Admit a connection: draw its load, place it on a random worker, and
    /// run the scale-out check.
    ///
    /// An id that is already open anywhere in the pool is rejected with
    /// [`DispatchError::DuplicateConnection`] and changes nothing.
    pub fn add_connection(&self, id: impl Into<ConnectionId>) -> DispatchResult<()> {
        let id = id.into();

        match self.owners.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(DispatchError::DuplicateConnection { id });
            }
            Entry::Vacant(slot) => {
                let (worker, load) = {
                    let pool = self.pool.read();
                    let mut model = self.model.lock();
                    let load = model.connection_load();
                    let index = model.pick_worker(pool.len());
                    (Arc::clone(&pool[index]), load)
                };

                worker.add_connection(id.clone(), load)?;
                slot.insert(Arc::clone(&worker));

                debug!(
                    connection = %id,
                    worker = %worker.id(),
                    load,
                    "placed connection"
                );
            }
        }

        self.admissions.fetch_add(1, Ordering::Relaxed);
        self.ensure_capacity()
    }

    /// Close a connection by id.
    ///
    /// Returns `true` if the connection was open. Closing an unknown id is
    /// a no-op returning `false`, so repeated closes are harmless.
    pub fn close_connection(&self, id: &ConnectionId) -> bool {
        match self.owners.remove(id) {
            Some((id, worker)) => {
                let freed = worker.close_connection(&id);
                self.closes.fetch_add(1, Ordering::Relaxed);
                debug!(
                    connection = %id,
                    worker = %worker.id(),
                    load = freed.unwrap_or(0.0),
                    "closed connection"
                );
                freed.is_some()
            }
            None => false,
        }
    }

    /// Pool-wide average load: the sum of worker loads over the worker
    /// count.
    ///
    /// The pool is never empty through normal use; [`DispatchError::EmptyPool`]
    /// marks an invariant violation rather than a condition callers should
    /// plan for.
    pub fn average_load(&self) -> DispatchResult<f64> {
        Self::average_of(&self.pool.read())
    }

    /// Grow the pool by one empty worker when the average load is above the
    /// policy threshold. Runs under the pool write lock so the read and the
    /// append are one step.
    fn ensure_capacity(&self) -> DispatchResult<()> {
        let mut pool = self.pool.write();
        let average = Self::average_of(&pool)?;

        if let ScaleDecision::Grow = self.policy.evaluate(average) {
            let id = WorkerId::new(pool.len());
            pool.push(Arc::new(Worker::new(id)));
            self.scale_events.fetch_add(1, Ordering::Relaxed);
            info!(
                worker = %id,
                average_load = average,
                threshold = self.policy.threshold(),
                workers = pool.len(),
                "average load above threshold, scaled out"
            );
        }

        Ok(())
    }

    fn average_of(pool: &[Arc<Worker>]) -> DispatchResult<f64> {
        if pool.is_empty() {
            return Err(DispatchError::EmptyPool);
        }
        let total: f64 = pool.iter().map(|worker| worker.load()).sum();
        Ok(total / pool.len() as f64)
    }

    /// Whether the given connection is currently open.
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.owners.contains_key(id)
    }

    /// Number of workers in the pool. Non-decreasing over the dispatcher's
    /// lifetime.
    pub fn worker_count(&self) -> usize {
        self.pool.read().len()
    }

    /// Number of open connections across the pool.
    pub fn connection_count(&self) -> usize {
        self.owners.len()
    }

    /// Snapshot of the pool in order. Workers are shared, not copied.
    pub fn workers(&self) -> Vec<Arc<Worker>> {
        self.pool.read().clone()
    }

    /// Each worker's percentage rendering joined in pool order, e.g.
    /// `"[95.00%, 0.00%]"`.
    pub fn describe(&self) -> String {
        let pool = self.pool.read();
        let parts: Vec<String> = pool.iter().map(|worker| worker.describe()).collect();
        format!("[{}]", parts.join(", "))
    }

    /// Aggregate snapshot for monitoring.
    pub fn stats(&self) -> DispatchResult<DispatcherStats> {
        let pool = self.pool.read();
        let average_load = Self::average_of(&pool)?;

        Ok(DispatcherStats {
            workers: pool.len(),
            connections: self.owners.len(),
            average_load,
            admissions: self.admissions.load(Ordering::Relaxed),
            closes: self.closes.load(Ordering::Relaxed),
            scale_events: self.scale_events.load(Ordering::Relaxed),
            per_worker: pool.iter().map(|worker| worker.stats()).collect(),
        })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("workers", &self.worker_count())
            .field("connections", &self.connection_count())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Point-in-time view of the dispatcher and its pool.
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStats {
    pub workers: usize,
    pub connections: usize,
    pub average_load: f64,
    pub admissions: u64,
    pub closes: u64,
    pub scale_events: u64,
    pub per_worker: Vec<WorkerStats>,
}
