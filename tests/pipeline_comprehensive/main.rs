//! Pipeline Comprehensive Test Suite
//!
//! Exercises the facade crate end to end: stage ordering, splicing of plain
//! and pipelined cells, error propagation, and multi-threaded assignment and
//! registration.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test pipeline_comprehensive
//!
//! # Run splicing tests only
//! cargo test --test pipeline_comprehensive splicing::
//! ```

use parking_lot::Mutex;
use pipedfuture::prelude::*;
use std::sync::Arc;

pub mod errors;
pub mod properties;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Install a test subscriber so `RUST_LOG`-style output shows up with `--nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
}

/// Stage adding one to the current result; fails if run before completion
pub fn inc(f: &PipedFuture<i64>) -> Result<i64> {
    assert!(f.done(), "stage ran on an unfinished cell");
    Ok(f.result(None)? + 1)
}

/// Stage adding `n` to the current result
pub fn add(n: i64) -> impl Fn(&PipedFuture<i64>) -> Result<i64> + Send + Sync + 'static {
    move |f: &PipedFuture<i64>| Ok(f.result(None)? + n)
}

/// Call log shared between stages
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// `inc` that records the description of the cell it was called with
pub fn logged_inc(log: &CallLog) -> impl Fn(&PipedFuture<i64>) -> Result<i64> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |f: &PipedFuture<i64>| {
        log.lock().push(f.description().unwrap_or("?").to_string());
        inc(f)
    }
}

/// Pipelined cell with a description
pub fn named(name: &str) -> PipedFuture<i64> {
    FutureBuilder::new().description(name).piped()
}
