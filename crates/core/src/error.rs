//! Error types for completion cells
//!
//! All fallible operations return [`Result`]. Transform errors raised by
//! caller-supplied callbacks are carried as [`Error::Callback`] so they can
//! surface from whichever call triggered the failing stage.

use crate::state::FutureState;
use std::time::Duration;
use thiserror::Error;

/// Boxed error produced by a caller-supplied callback
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All pipedfuture errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A blocking read hit its deadline before the cell reached a terminal state
    #[error("timed out after {waited:?} waiting for a result")]
    Timeout {
        /// How long the reader waited
        waited: Duration,
    },

    /// The result was requested from a cancelled cell
    #[error("future was cancelled")]
    Cancelled,

    /// Operation is not valid for the cell's current state
    #[error("cannot {operation} a {state} future")]
    InvalidState {
        /// State the cell was in
        state: FutureState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// A caller-supplied callback failed
    #[error("callback failed: {source}")]
    Callback {
        /// Error returned by the callback
        #[source]
        source: BoxError,
    },
}

/// Result type for pipedfuture operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an error returned from a callback.
    ///
    /// Accepts anything convertible into a boxed error, including plain
    /// strings: `Error::callback("negative input")`.
    pub fn callback(source: impl Into<BoxError>) -> Self {
        Error::Callback {
            source: source.into(),
        }
    }

    /// Check if this error is retryable.
    ///
    /// Only timeouts are: the cell may still complete later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if this is a cancellation error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Check if this error came out of a callback.
    pub fn is_callback(&self) -> bool {
        matches!(self, Error::Callback { .. })
    }
}
