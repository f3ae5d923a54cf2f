//! The completion contract
//!
//! [`Completion`] is what a pipelined cell needs from anything it splices
//! into its pipeline. Both cells in `pipedfuture-concurrency` implement it,
//! and so can any other single-result primitive (promises, deferred values,
//! thread-pool handles) that honours the semantics below.

use crate::error::Result;
use crate::state::FutureState;
use std::sync::Arc;
use std::time::Duration;

/// A thread-safe, terminal-state-tracked cell holding one result of type `T`.
///
/// # Contract
///
/// - `set_result` may be called on an already finished cell. It overwrites
///   the stored value and wakes every waiter again. This departs from the
///   usual write-once completion contract; pipelines rely on it.
/// - `try_start_running` returns `false` iff the cell was cancelled.
/// - `result` blocks until the cell is terminal or the timeout expires.
///
/// Callback registration is not part of the trait: its callback receives the
/// concrete cell type. See `Promise::add_done_callback` and
/// `PipedFuture::add_done_callback`.
pub trait Completion<T>: Send + Sync {
    /// Current lifecycle state
    fn state(&self) -> FutureState;

    /// Finished or cancelled
    fn done(&self) -> bool {
        self.state().is_terminal()
    }

    /// Cancelled before anyone started it
    fn cancelled(&self) -> bool {
        self.state() == FutureState::Cancelled
    }

    /// Claimed by a producer but not finished yet
    fn running(&self) -> bool {
        self.state() == FutureState::Running
    }

    /// Block until the cell is terminal and return its current result.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`](crate::Error::Timeout) if `timeout` elapses first
    /// - [`Error::Cancelled`](crate::Error::Cancelled) if the cell was cancelled
    fn result(&self, timeout: Option<Duration>) -> Result<T>;

    /// Cancel the cell.
    ///
    /// Returns `false` if the cell is running or finished, `true` if it is
    /// now (or already was) cancelled.
    fn cancel(&self) -> bool;

    /// Assign the result, marking the cell finished and running its callbacks.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`](crate::Error::InvalidState) if the cell was
    /// cancelled. Pipelined cells also propagate callback errors.
    fn set_result(&self, value: T) -> Result<()>;

    /// Move a pending cell to running.
    ///
    /// Returns `false` iff the cell is cancelled. Running and finished cells
    /// are left as they are and return `true`.
    fn try_start_running(&self) -> bool;
}

impl<T, C> Completion<T> for Arc<C>
where
    C: Completion<T> + ?Sized,
{
    fn state(&self) -> FutureState {
        (**self).state()
    }

    fn result(&self, timeout: Option<Duration>) -> Result<T> {
        (**self).result(timeout)
    }

    fn cancel(&self) -> bool {
        (**self).cancel()
    }

    fn set_result(&self, value: T) -> Result<()> {
        (**self).set_result(value)
    }

    fn try_start_running(&self) -> bool {
        (**self).try_start_running()
    }
}
