//! Pipelined completion cell
//!
//! A [`PipedFuture`] is a completion cell whose result is rewritten by an
//! ordered chain of stages. Each stage is a callback receiving the cell
//! itself; whatever it returns becomes the cell's result, and the next stage
//! reads that value back through [`PipedFuture::result`].
//!
//! ```text
//! set_result(v) ──► stage 1 ──► stage 2 ──► ... ──► stage N ──► result()
//!                    commit      commit               commit
//! ```
//!
//! ## Ordering
//!
//! - Stages registered before completion run in registration order when a
//!   result is assigned.
//! - A stage registered on a finished cell runs immediately, before
//!   `add_done_callback` returns, against the latest result.
//! - Assigning again re-runs the whole pipeline against the new value.
//! - A stage registered on a cancelled cell runs too; it sees `Cancelled`
//!   from [`PipedFuture::result`] and that error is returned.
//! - Stages of one cell never run concurrently. One thread at a time drains
//!   the cell's queue of pending runs, and no lock is held while a stage
//!   runs, so stages may call into other cells. Readers only take the state
//!   lock and are woken on every commit.
//!
//! A caller that finds another thread draining the cell waits for its own
//! run to finish, unless it is itself inside a stage: a registration made
//! from a stage is queued and returns `Ok` immediately, its outcome logged
//! by the draining thread. A stage that assigns a cell whose pipeline is
//! blocked waiting on the stage's own cell is a splice cycle and deadlocks.
//!
//! ## Failure
//!
//! A stage error aborts that run of the pipeline. Nothing is committed for
//! the failing stage, the previous result stays current, and the error is
//! returned from the call that triggered the run.
//!
//! ## Splicing
//!
//! [`PipedFuture::add_done_future`] embeds another [`Completion`] as a stage:
//! the host hands its current result to the dependency, the dependency's own
//! pipeline runs, and its final result flows back as the host's next value.

use crate::monitor::Monitor;
use pipedfuture_core::{Completion, FutureConfig, FutureState, PipelineMetrics, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type Stage<T> = Arc<dyn Fn(&PipedFuture<T>) -> Result<T> + Send + Sync>;

/// A completion cell whose result flows through an ordered pipeline of stages.
///
/// Cloning yields another handle to the same cell.
///
/// # Example
///
/// ```
/// use pipedfuture_concurrency::PipedFuture;
///
/// let cell = PipedFuture::new();
/// cell.add_done_callback(|f: &PipedFuture<i32>| Ok(f.result(None)? + 1)).unwrap();
/// cell.add_done_callback(|f: &PipedFuture<i32>| Ok(f.result(None)? * 10)).unwrap();
///
/// cell.set_result(1).unwrap();
/// assert_eq!(cell.result(None).unwrap(), 20);
/// ```
pub struct PipedFuture<T> {
    inner: Arc<Monitor<T, Stage<T>>>,
}

impl<T> Clone for PipedFuture<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> PipedFuture<T> {
    /// Create an empty, pending cell
    pub fn new() -> Self {
        Self::with_config(FutureConfig::new())
    }

    /// Create an empty, pending cell with explicit settings
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

    /// Number of registered stages
    pub fn stage_count(&self) -> usize {
        self.inner.callback_count()
    }

    /// Counters for this cell
    pub fn metrics(&self) -> PipelineMetrics {
        self.inner.metrics()
    }

    /// Block until terminal and return the current result.
    ///
    /// The current result is the output of the most recently executed stage,
    /// or the assigned value if no stage has run since. `None` waits forever.
    pub fn result(&self, timeout: Option<Duration>) -> Result<T> {
        self.inner.wait_result(timeout)
    }

    /// [`result`](Self::result) with the configured default timeout
    pub fn wait(&self) -> Result<T> {
        self.result(self.inner.config().default_timeout)
    }

    /// Assign the result and run the pipeline.
    ///
    /// Unlike a conventional completion cell this may be called on a cell
    /// that is already finished: the value replaces the current result and
    /// every registered stage runs again, in order, starting from it.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the cell was cancelled
    /// - the first error returned by a stage; later stages do not run
    pub fn set_result(&self, value: T) -> Result<()> {
        self.inner
            .assign_and_run(value, &|index, stage| self.run_stage(index, stage))
    }

    /// Cancel a pending cell.
    ///
    /// Stages already registered are not run. Returns `false` if the cell is
    /// already running or finished.
    pub fn cancel(&self) -> bool {
        let outcome = self.inner.cancel();
        tracing::debug!(
            description = self.inner.config().label(),
            ?outcome,
            "cancel requested"
        );
        outcome.accepted()
    }

    /// Move a pending cell to running; `false` iff it was cancelled.
    pub fn try_start_running(&self) -> bool {
        self.inner.try_start_running()
    }

    /// Append a stage to the pipeline.
    ///
    /// The stage receives the cell and returns its next result. If the cell
    /// is already done the stage runs now and its error (if any) is returned
    /// from this call; on a cancelled cell that is `Cancelled`, as read by
    /// the stage. The stage stays registered either way and takes part in
    /// later re-runs.
    ///
    /// If an assignment is in flight on another thread, the stage runs after
    /// that assignment's pipeline, never interleaved with it.
    pub fn add_done_callback<F>(&self, stage: F) -> Result<()>
    where
        F: Fn(&PipedFuture<T>) -> Result<T> + Send + Sync + 'static,
    {
        let stage: Stage<T> = Arc::new(stage);
        self.inner
            .add_callback(stage, &|index, stage| self.run_stage(index, stage))
    }

    /// Splice another cell into the pipeline.
    ///
    /// When this stage runs, `dependency` is started with
    /// [`try_start_running`](Completion::try_start_running) and given this
    /// cell's current result. Its own callbacks run synchronously, and the
    /// value it reports afterwards becomes this cell's result. A plain
    /// [`Promise`](crate::Promise) therefore passes the value through
    /// unchanged, while a `PipedFuture` contributes its pipeline's output.
    ///
    /// A dependency that is already cancelled is skipped: nothing is
    /// assigned to it and this cell's value passes through unchanged.
    pub fn add_done_future<D>(&self, dependency: D) -> Result<()>
    where
        D: Completion<T> + 'static,
    {
        self.add_done_callback(move |host: &PipedFuture<T>| {
            let current = host.result(None)?;
            if !dependency.try_start_running() {
                tracing::debug!(
                    description = host.inner.config().label(),
                    "spliced future cancelled, skipping"
                );
                return Ok(current);
            }
            dependency.set_result(current)?;
            dependency.result(None)
        })
    }

    fn run_stage(&self, index: usize, stage: &Stage<T>) -> Result<()> {
        tracing::trace!(description = self.inner.config().label(), stage = index, "running stage");
        match stage(self) {
            Ok(value) => {
                self.inner.commit(value);
                Ok(())
            }
            Err(e) => {
                self.inner.record_invocation(false);
                tracing::debug!(
                    description = self.inner.config().label(),
                    stage = index,
                    error = %e,
                    "stage failed, keeping previous result"
                );
                Err(e)
            }
        }
    }
}

impl<T: Clone + Send + 'static> Default for PipedFuture<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Completion<T> for PipedFuture<T> {
    fn state(&self) -> FutureState {
        PipedFuture::state(self)
    }

    fn result(&self, timeout: Option<Duration>) -> Result<T> {
        PipedFuture::result(self, timeout)
    }

    fn cancel(&self) -> bool {
        PipedFuture::cancel(self)
    }

    fn set_result(&self, value: T) -> Result<()> {
        PipedFuture::set_result(self, value)
    }

    fn try_start_running(&self) -> bool {
        PipedFuture::try_start_running(self)
    }
}

impl<T> fmt::Debug for PipedFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipedFuture")
            .field("description", &self.inner.config().description)
            .field("state", &self.inner.state())
            .field("stages", &self.inner.callback_count())
            .finish()
    }
}
