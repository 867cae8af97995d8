//! # Loadsim: a load-balancing simulator
//!
//! A logical simulation of admission and scale-out behavior: a pool of
//! backend [`Worker`]s each tracking per-connection load, and a
//! [`Dispatcher`] that places incoming connections on a worker chosen
//! uniformly at random and appends one empty worker whenever the pool-wide
//! average load exceeds a threshold. There is no network I/O, persistence,
//! or authentication; the crate models the control logic only.
//!
//! ```
//! use loadsim::{ConnectionId, Dispatcher};
//!
//! let dispatcher = Dispatcher::new();
//! dispatcher.add_connection("conn-1")?;
//! println!("{}", dispatcher.describe());
//! dispatcher.close_connection(&ConnectionId::from("conn-1"));
//! # Ok::<(), loadsim::DispatchError>(())
//! ```
//!
//! Randomness (load values and worker placement) flows through the
//! [`TrafficModel`] trait, so tests inject scripted sequences and
//! reproducible runs use a seeded [`UniformModel`].

/// Error types, configuration, and identifier types.
pub mod core;

/// Structured logging setup.
pub mod observability;

/// Workers, the dispatcher, and the scale-out policy.
pub mod pool;

/// The pluggable randomness seam: load generation and worker placement.
pub mod traffic;

pub use crate::core::config::{
    SimulatorConfig, DEFAULT_LOAD_MAX, DEFAULT_LOAD_MIN, DEFAULT_SCALE_THRESHOLD,
};
pub use crate::core::error::{DispatchError, DispatchResult};
pub use crate::core::types::{ConnectionId, WorkerId};
pub use crate::observability::{init_logging, LogConfig, LogFormat};
pub use crate::pool::dispatcher::{Dispatcher, DispatcherStats};
pub use crate::pool::scaling::{ScaleDecision, ScalePolicy};
pub use crate::pool::worker::{Worker, WorkerStats};
pub use crate::traffic::{TrafficModel, UniformModel};
