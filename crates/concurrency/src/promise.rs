//! Plain completion cell
//!
//! [`Promise`] is the conventional single-result cell: a value is assigned,
//! waiters wake up, done-callbacks run. Callbacks observe the cell but their
//! outcome never changes its result; a failing callback is logged and the
//! remaining callbacks still run.
//!
//! It is the simplest [`Completion`] implementation and the "plain
//! dependency" a [`PipedFuture`](crate::PipedFuture) can splice.

use crate::monitor::{Cancel, Monitor};
use pipedfuture_core::{Completion, FutureConfig, FutureState, PipelineMetrics, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type DoneCallback<T> = Arc<dyn Fn(&Promise<T>) -> Result<()> + Send + Sync>;

/// A thread-safe single-result cell with done-callbacks.
///
/// Cloning yields another handle to the same cell.
///
/// # Example
///
/// ```
/// use pipedfuture_concurrency::Promise;
///
/// let promise = Promise::new();
/// promise.set_result("ready").unwrap();
/// assert_eq!(promise.result(None).unwrap(), "ready");
/// ```
pub struct Promise<T> {
    inner: Arc<Monitor<T, DoneCallback<T>>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Create a pending promise
    pub fn new() -> Self {
        Self::with_config(FutureConfig::new())
    }

    /// Create a pending promise with explicit settings
    pub fn with_config(config: FutureConfig) -> Self {
        Self {
            inner: Arc::new(Monitor::new(config)),
        }
    }

    /// Description from the config, if any
    pub fn description(&self) -> Option<&str> {
        self.inner.config().description.as_deref()
    }

    /// Current lifecycle state
    pub fn state(&self) -> FutureState {
        self.inner.state()
    }

    /// Finished or cancelled
    pub fn done(&self) -> bool {
        self.state().is_terminal()
    }

    /// Cancelled before anyone started it
    pub fn cancelled(&self) -> bool {
        self.state() == FutureState::Cancelled
    }

    /// Claimed by a producer but not finished
    pub fn running(&self) -> bool {
        self.state() == FutureState::Running
    }

    /// Counters for this cell
    pub fn metrics(&self) -> PipelineMetrics {
        self.inner.metrics()
    }

    /// Block until terminal and return the result.
    ///
    /// `None` waits forever.
    pub fn result(&self, timeout: Option<Duration>) -> Result<T> {
        self.inner.wait_result(timeout)
    }

    /// [`result`](Self::result) with the configured default timeout
    pub fn wait(&self) -> Result<T> {
        self.result(self.inner.config().default_timeout)
    }

    /// Assign the result and run every registered callback.
    ///
    /// May be called again on a finished promise: the value is replaced,
    /// waiters are woken and the callbacks run again.
    pub fn set_result(&self, value: T) -> Result<()> {
        self.inner.assign_and_run(value, &|index, callback| {
            self.invoke(index, callback);
            Ok(())
        })?;
        tracing::debug!(description = self.inner.config().label(), "promise finished");
        Ok(())
    }

    /// Cancel a pending promise, running its callbacks.
    ///
    /// Returns `false` if the promise is already running or finished.
    pub fn cancel(&self) -> bool {
        let outcome = self.inner.cancel();
        if outcome == Cancel::Cancelled {
            tracing::debug!(description = self.inner.config().label(), "promise cancelled");
            // callbacks swallow their errors, so the pass cannot fail
            let _ = self.inner.run_all(&|index, callback| {
                self.invoke(index, callback);
                Ok(())
            });
        }
        outcome.accepted()
    }

    /// Move a pending promise to running; `false` iff it was cancelled.
    pub fn try_start_running(&self) -> bool {
        self.inner.try_start_running()
    }

    /// Register a callback run when the promise finishes or is cancelled.
    ///
    /// Runs immediately if the promise is already done. The callback's
    /// result only matters for logging: errors are reported through
    /// `tracing` and do not stop other callbacks.
    pub fn add_done_callback<F>(&self, callback: F)
    where
        F: Fn(&Promise<T>) -> Result<()> + Send + Sync + 'static,
    {
        let callback: DoneCallback<T> = Arc::new(callback);
        let _ = self.inner.add_callback(callback, &|index, callback| {
            self.invoke(index, callback);
            Ok(())
        });
    }

    fn invoke(&self, index: usize, callback: &DoneCallback<T>) {
        match callback(self) {
            Ok(()) => self.inner.record_invocation(true),
            Err(e) => {
                self.inner.record_invocation(false);
                tracing::error!(
                    description = self.inner.config().label(),
                    callback = index,
                    error = %e,
                    "done callback failed"
                );
            }
        }
    }
}

impl<T: Clone + Send + 'static> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Completion<T> for Promise<T> {
    fn state(&self) -> FutureState {
        Promise::state(self)
    }

    fn result(&self, timeout: Option<Duration>) -> Result<T> {
        Promise::result(self, timeout)
    }

    fn cancel(&self) -> bool {
        Promise::cancel(self)
    }

    fn set_result(&self, value: T) -> Result<()> {
        Promise::set_result(self, value)
    }

    fn try_start_running(&self) -> bool {
        Promise::try_start_running(self)
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("description", &self.inner.config().description)
            .field("state", &self.inner.state())
            .field("callbacks", &self.inner.callback_count())
            .finish()
    }
}
