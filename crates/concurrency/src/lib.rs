//! Completion cells for pipedfuture
//!
//! This crate implements the two cells built on one mutex/condvar monitor:
//! - [`Promise`]: a plain single-result cell with done-callbacks
//! - [`PipedFuture`]: a cell whose result flows through an ordered pipeline
//!   of stages, with other cells splicable as stages
//!
//! Stage execution is synchronous: it runs on whichever thread assigns the
//! result or registers a stage on a finished cell.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod monitor;
pub mod piped;
pub mod promise;

pub use piped::PipedFuture;
pub use promise::Promise;

// Re-export the contract from core for convenience
pub use pipedfuture_core::Completion;
