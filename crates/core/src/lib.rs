//! Core types for pipedfuture
//!
//! This crate defines what every completion cell in the workspace agrees on:
//! - [`Completion`]: the contract a cell must satisfy to be spliced into a pipeline
//! - [`FutureState`]: the terminal-state flag tracked by every cell
//! - [`Error`]: timeout, cancellation, invalid-state and callback failures
//! - [`FutureConfig`] and [`PipelineMetrics`]: per-cell settings and counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod state;
pub mod traits;

pub use config::FutureConfig;
pub use error::{BoxError, Error, Result};
pub use metrics::PipelineMetrics;
pub use state::FutureState;
pub use traits::Completion;
