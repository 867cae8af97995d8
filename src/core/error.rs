//! # Error Handling Module
//!
//! All failures the simulator can report, built on `thiserror`. The taxonomy
//! is small because the core is pure in-memory computation: caller misuse
//! (re-admitting an id that is still open), one invariant violation (average
//! load over an empty pool), and configuration loading problems.

use thiserror::Error;

use crate::core::types::ConnectionId;

/// Main result type used throughout the simulator.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Error types for the simulator.
///
/// The `#[error("...")]` attribute from `thiserror` implements `Display`
/// with the given message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    /// The connection id is already open somewhere in the pool.
    ///
    /// Admitting an id twice is caller misuse; the simulator reports it
    /// instead of silently overwriting the existing entry.
    #[error("connection {id} is already open")]
    DuplicateConnection { id: ConnectionId },

    /// Average load was requested on an empty worker pool.
    ///
    /// Unreachable through normal use: a dispatcher always holds at least
    /// one worker and never removes any. Reported loudly rather than
    /// letting a division produce NaN.
    #[error("average load requested on an empty worker pool")]
    EmptyPool,

    /// Configuration loading or validation failed.
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl DispatchError {
    /// Create a configuration error from any displayable message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
