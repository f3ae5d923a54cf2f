//! # pipedfuture
//!
//! Completion cells with pipelined callbacks.
//!
//! A [`PipedFuture`] holds one result that an ordered chain of stages keeps
//! rewriting: the first stage is fed the assigned value, each following stage
//! the previous stage's output, and the last stage's output is what
//! [`PipedFuture::result`] returns.
//!
//! ## Quick Start
//!
//! ```
//! use pipedfuture::prelude::*;
//!
//! let cell = FutureBuilder::new().description("double").piped();
//! cell.add_done_callback(|f: &PipedFuture<i32>| Ok(f.result(None)? * 2))?;
//!
//! cell.set_result(21)?;
//! assert_eq!(cell.result(None)?, 42);
//!
//! // A stage added after completion runs immediately
//! cell.add_done_callback(|f: &PipedFuture<i32>| Ok(f.result(None)? + 1))?;
//! assert_eq!(cell.result(None)?, 43);
//! # Ok::<(), pipedfuture::Error>(())
//! ```
//!
//! ## Splicing
//!
//! Any [`Completion`] can be embedded as a stage with
//! [`PipedFuture::add_done_future`]. The host hands the dependency its
//! current value, the dependency's own pipeline runs, and the dependency's
//! final result becomes the host's next value:
//!
//! ```
//! use pipedfuture::prelude::*;
//!
//! let inc = |f: &PipedFuture<i32>| -> pipedfuture::Result<i32> { Ok(f.result(None)? + 1) };
//!
//! let embedded = PipedFuture::new();
//! embedded.add_done_callback(inc)?;
//!
//! let host = PipedFuture::new();
//! host.add_done_callback(inc)?;
//! host.add_done_future(embedded.clone())?;
//! host.add_done_callback(inc)?;
//!
//! host.set_result(0)?;
//! assert_eq!(host.result(None)?, 3);
//! assert_eq!(embedded.result(None)?, 2);
//! # Ok::<(), pipedfuture::Error>(())
//! ```
//!
//! ## Crates
//!
//! - `pipedfuture-core` - the [`Completion`] contract, [`FutureState`], [`Error`]
//! - `pipedfuture-concurrency` - [`Promise`] and [`PipedFuture`]

#![warn(missing_docs)]

mod builder;

pub mod prelude;

pub use builder::FutureBuilder;

pub use pipedfuture_concurrency::{PipedFuture, Promise};
pub use pipedfuture_core::{
    BoxError, Completion, Error, FutureConfig, FutureState, PipelineMetrics, Result,
};
