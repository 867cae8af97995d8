//! The worker pool: individual workers, the dispatcher that routes
//! connections onto them, and the scale-out policy that grows the pool.

pub mod dispatcher;
pub mod scaling;
pub mod worker;

pub use dispatcher::{Dispatcher, DispatcherStats};
pub use scaling::{ScaleDecision, ScalePolicy};
pub use worker::{Worker, WorkerStats};
