//! Convenient imports for pipedfuture.
//!
//! ```
//! use pipedfuture::prelude::*;
//!
//! let promise: Promise<u8> = FutureBuilder::new().promise();
//! assert_eq!(promise.state(), FutureState::Pending);
//! ```

// Cells and their configuration
pub use crate::builder::FutureBuilder;
pub use pipedfuture_concurrency::{PipedFuture, Promise};

// Contract and state
pub use pipedfuture_core::{Completion, FutureConfig, FutureState, PipelineMetrics};

// Error handling
pub use pipedfuture_core::{Error, Result};
