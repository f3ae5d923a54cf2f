//! Mutex/condvar monitor shared by both cell types
//!
//! Holds the terminal-state flag, the current result, the registered
//! callbacks and the metrics behind one `parking_lot::Mutex`, paired with a
//! `Condvar` that is signalled on every change a reader could care about.
//!
//! ## Passes and the drainer
//!
//! Callback execution is organised in *passes*: an optional assignment
//! followed by a contiguous range of callbacks. At most one thread, the
//! drainer, executes passes for a cell; other threads append their pass to
//! the cell's queue under the state lock. No lock is held while a callback
//! runs, so a callback may freely call into other cells.
//!
//! A submitter that is not the drainer either waits for its pass to finish
//! (and receives its outcome) or, if it is itself draining some cell, returns
//! immediately and leaves the outcome to the drainer. Only threads holding
//! no drain ever block on another cell's drainer on behalf of a registration,
//! which rules out the host/dependency wait cycle. The drainer re-entering
//! its own cell runs the pass inline.

use parking_lot::{Condvar, Mutex, MutexGuard};
use pipedfuture_core::{Error, FutureConfig, FutureState, PipelineMetrics, Result};
use std::cell::Cell;
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

thread_local! {
    /// Number of cells the current thread is draining
    static DRAINING: Cell<usize> = Cell::new(0);
}

fn draining_any() -> bool {
    DRAINING.with(|d| d.get() > 0)
}

/// One unit of callback execution
struct Pass<T> {
    /// Value to store before the callbacks run
    assign: Option<T>,
    /// Callbacks to run, by registration index
    callbacks: Range<usize>,
}

/// Outcome slot for a submitter waiting on another thread's drain
#[derive(Default)]
struct Ticket {
    outcome: Mutex<Option<Result<()>>>,
    done: Condvar,
}

impl Ticket {
    fn complete(&self, outcome: Result<()>) {
        *self.outcome.lock() = Some(outcome);
        self.done.notify_all();
    }

    fn wait(&self) -> Result<()> {
        let mut outcome = self.outcome.lock();
        loop {
            if let Some(outcome) = outcome.take() {
                return outcome;
            }
            self.done.wait(&mut outcome);
        }
    }
}

struct Job<T> {
    pass: Pass<T>,
    ticket: Option<Arc<Ticket>>,
}

/// Everything guarded by the state lock
struct Slot<T, C> {
    state: FutureState,
    /// `None` until the first assignment
    result: Option<T>,
    callbacks: Vec<C>,
    metrics: PipelineMetrics,
    drainer: Option<ThreadId>,
    jobs: VecDeque<Job<T>>,
    /// Assignments submitted but not executed yet
    queued_assignments: usize,
}

/// Outcome of a cancellation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cancel {
    /// Running or finished; nothing changed
    Refused,
    /// Was already cancelled
    AlreadyCancelled,
    /// Moved from pending to cancelled by this call
    Cancelled,
}

impl Cancel {
    pub(crate) fn accepted(self) -> bool {
        !matches!(self, Cancel::Refused)
    }
}

/// How a submitter that finds another drainer behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    /// Block until the pass ran and return its outcome
    Always,
    /// Block only if this thread is not draining any cell
    UnlessDraining,
}

/// Runs one callback; `usize` is its registration index
pub(crate) type Exec<'a, C> = &'a dyn Fn(usize, &C) -> Result<()>;

/// Clears drain bookkeeping, also when a callback panics
struct DrainGuard<'a, T, C> {
    monitor: &'a Monitor<T, C>,
}

impl<'a, T, C> DrainGuard<'a, T, C> {
    fn enter(monitor: &'a Monitor<T, C>) -> Self {
        DRAINING.with(|d| d.set(d.get() + 1));
        Self { monitor }
    }
}

impl<T, C> Drop for DrainGuard<'_, T, C> {
    fn drop(&mut self) {
        DRAINING.with(|d| d.set(d.get() - 1));
        if thread::panicking() {
            let mut slot = self.monitor.slot.lock();
            slot.drainer = None;
            for job in slot.jobs.drain(..) {
                if let Some(ticket) = job.ticket {
                    ticket.complete(Err(Error::callback("callback panicked while draining")));
                }
            }
        }
    }
}

pub(crate) struct Monitor<T, C> {
    config: FutureConfig,
    slot: Mutex<Slot<T, C>>,
    changed: Condvar,
}

impl<T, C: Clone> Monitor<T, C> {
    pub(crate) fn new(config: FutureConfig) -> Self {
        Self {
            config,
            slot: Mutex::new(Slot {
                state: FutureState::Pending,
                result: None,
                callbacks: Vec::new(),
                metrics: PipelineMetrics::default(),
                drainer: None,
                jobs: VecDeque::new(),
                queued_assignments: 0,
            }),
            changed: Condvar::new(),
        }
    }

    pub(crate) fn config(&self) -> &FutureConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T, C>> {
        self.slot.lock()
    }

    pub(crate) fn state(&self) -> FutureState {
        self.lock().state
    }

    pub(crate) fn metrics(&self) -> PipelineMetrics {
        self.lock().metrics
    }

    pub(crate) fn callback_count(&self) -> usize {
        self.lock().callbacks.len()
    }

    /// Assign `value` and run every callback registered so far.
    ///
    /// Returns once the pass has run, on this thread or on the drainer's.
    pub(crate) fn assign_and_run(&self, value: T, exec: Exec<'_, C>) -> Result<()> {
        let mut slot = self.lock();
        let callbacks = 0..slot.callbacks.len();
        slot.queued_assignments += 1;
        let pass = Pass {
            assign: Some(value),
            callbacks,
        };
        self.dispatch(slot, pass, Wait::Always, exec)
    }

    /// Register a callback, running it if the cell is terminal or an
    /// assignment is already queued ahead of it.
    pub(crate) fn add_callback(&self, callback: C, exec: Exec<'_, C>) -> Result<()> {
        let mut slot = self.lock();
        slot.callbacks.push(callback);
        slot.metrics.stages_registered += 1;
        if !slot.state.is_terminal() && slot.queued_assignments == 0 {
            return Ok(());
        }
        let index = slot.callbacks.len() - 1;
        let pass = Pass {
            assign: None,
            callbacks: index..index + 1,
        };
        self.dispatch(slot, pass, Wait::UnlessDraining, exec)
    }

    /// Run every registered callback without assigning.
    pub(crate) fn run_all(&self, exec: Exec<'_, C>) -> Result<()> {
        let slot = self.lock();
        let pass = Pass {
            assign: None,
            callbacks: 0..slot.callbacks.len(),
        };
        self.dispatch(slot, pass, Wait::UnlessDraining, exec)
    }

    fn dispatch(
        &self,
        mut slot: MutexGuard<'_, Slot<T, C>>,
        pass: Pass<T>,
        wait: Wait,
        exec: Exec<'_, C>,
    ) -> Result<()> {
        let me = thread::current().id();
        match slot.drainer {
            Some(drainer) if drainer == me => {
                drop(slot);
                self.execute(pass, exec)
            }
            Some(_) => {
                let block = wait == Wait::Always || !draining_any();
                let ticket = block.then(|| Arc::new(Ticket::default()));
                slot.jobs.push_back(Job {
                    pass,
                    ticket: ticket.clone(),
                });
                drop(slot);
                match ticket {
                    Some(ticket) => ticket.wait(),
                    None => Ok(()),
                }
            }
            None => {
                slot.drainer = Some(me);
                drop(slot);
                let _guard = DrainGuard::enter(self);
                let outcome = self.execute(pass, exec);
                self.drain(exec);
                outcome
            }
        }
    }

    /// Run queued jobs until the queue is empty, then give up the drain.
    fn drain(&self, exec: Exec<'_, C>) {
        loop {
            let job = {
                let mut slot = self.lock();
                match slot.jobs.pop_front() {
                    Some(job) => job,
                    None => {
                        slot.drainer = None;
                        return;
                    }
                }
            };
            let outcome = self.execute(job.pass, exec);
            match job.ticket {
                Some(ticket) => ticket.complete(outcome),
                None => {
                    if let Err(e) = outcome {
                        tracing::warn!(
                            description = self.config.label(),
                            error = %e,
                            "queued callback failed with no caller waiting"
                        );
                    }
                }
            }
        }
    }

    fn execute(&self, pass: Pass<T>, exec: Exec<'_, C>) -> Result<()> {
        if let Some(value) = pass.assign {
            self.assign(value)?;
            tracing::debug!(
                description = self.config.label(),
                callbacks = pass.callbacks.len(),
                "result assigned, running callbacks"
            );
        }
        let start = pass.callbacks.start;
        let callbacks = self.lock().callbacks[pass.callbacks].to_vec();
        for (offset, callback) in callbacks.iter().enumerate() {
            exec(start + offset, callback)?;
        }
        Ok(())
    }

    /// Store `value` and mark the cell finished, waking every waiter.
    ///
    /// Allowed on a finished cell: the value is overwritten.
    fn assign(&self, value: T) -> Result<()> {
        let mut slot = self.lock();
        slot.queued_assignments = slot.queued_assignments.saturating_sub(1);
        if slot.state == FutureState::Cancelled {
            return Err(Error::InvalidState {
                state: slot.state,
                operation: "set the result of",
            });
        }
        slot.result = Some(value);
        slot.state = FutureState::Finished;
        slot.metrics.assignments += 1;
        self.changed.notify_all();
        Ok(())
    }

    /// Replace the current result with a stage's output.
    pub(crate) fn commit(&self, value: T) {
        let mut slot = self.lock();
        slot.result = Some(value);
        slot.metrics.stages_executed += 1;
        self.changed.notify_all();
    }

    /// Count a callback invocation that did not commit anything.
    pub(crate) fn record_invocation(&self, ok: bool) {
        let mut slot = self.lock();
        if ok {
            slot.metrics.stages_executed += 1;
        } else {
            slot.metrics.stages_failed += 1;
        }
    }

    pub(crate) fn cancel(&self) -> Cancel {
        let mut slot = self.lock();
        match slot.state {
            FutureState::Running | FutureState::Finished => Cancel::Refused,
            FutureState::Cancelled => Cancel::AlreadyCancelled,
            FutureState::Pending => {
                slot.state = FutureState::Cancelled;
                self.changed.notify_all();
                Cancel::Cancelled
            }
        }
    }

    pub(crate) fn try_start_running(&self) -> bool {
        let mut slot = self.lock();
        match slot.state {
            FutureState::Cancelled => false,
            FutureState::Pending => {
                slot.state = FutureState::Running;
                true
            }
            FutureState::Running | FutureState::Finished => true,
        }
    }
}

impl<T: Clone, C: Clone> Monitor<T, C> {
    /// Block until the cell is terminal, then clone out the current result.
    pub(crate) fn wait_result(&self, timeout: Option<Duration>) -> Result<T> {
        let mut slot = self.lock();
        // computed on first wait; inner `None` means the deadline overflowed
        let mut deadline: Option<Option<Instant>> = None;
        loop {
            match slot.state {
                FutureState::Cancelled => return Err(Error::Cancelled),
                FutureState::Finished => {
                    return slot.result.clone().ok_or(Error::InvalidState {
                        state: slot.state,
                        operation: "read the result of",
                    });
                }
                FutureState::Pending | FutureState::Running => {}
            }

            let until = timeout.and_then(|t| {
                *deadline.get_or_insert_with(|| Instant::now().checked_add(t))
            });
            match (timeout, until) {
                (Some(waited), Some(until)) => {
                    let timed_out = self.changed.wait_until(&mut slot, until).timed_out();
                    if timed_out && !slot.state.is_terminal() {
                        return Err(Error::Timeout { waited });
                    }
                }
                _ => self.changed.wait(&mut slot),
            }
        }
    }
}
