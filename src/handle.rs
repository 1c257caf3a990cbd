//! Result handles for submitted tasks.
//!
//! Every `submit` produces a [`TaskHandle`] shared between the submitting
//! caller and the worker that eventually executes the task. The handle is
//! the only way completion, failure, or cancellation becomes visible to the
//! caller; dropping it never affects the task itself.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::error::TaskError;

/// A unit of work as stored on the shared queue.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// A task that was queued but never started, as returned by
/// [`ThreadPool::shutdown_now`](crate::pool::ThreadPool::shutdown_now).
///
/// The caller may run it on its own thread or drop it.
pub struct Task {
    job: Job,
}

impl Task {
    pub(crate) fn new(job: Job) -> Self {
        Self { job }
    }

    /// Executes the task on the calling thread.
    pub fn run(self) {
        (self.job)();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

/// Completion state shared between the caller side and the worker side.
struct Inner<T> {
    outcome: Option<Result<T, TaskError>>,
    cancelled: bool,
}

pub(crate) struct Shared<T> {
    inner: Mutex<Inner<T>>,
    cvar: Condvar,
}

impl<T> Shared<T> {
    fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { outcome: None, cancelled: false }),
            cvar: Condvar::new(),
        }
    }

    /// Worker side: claims the task for execution. Returns false when the
    /// handle was cancelled before the task started, in which case the
    /// worker skips the body entirely.
    fn begin(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        !inner.cancelled
    }

    /// Worker side: records the outcome and wakes all waiters. A handle
    /// cancelled mid-run stays cancelled; the late result is discarded.
    fn complete(&self, result: Result<T, TaskError>) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.cancelled {
            inner.outcome = Some(result);
        }
        drop(inner);
        self.cvar.notify_all();
    }

    fn is_done(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.outcome.is_some() || inner.cancelled
    }

    fn is_cancelled(&self) -> bool {
        self.inner.lock().unwrap().cancelled
    }

    fn cancel(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.outcome.is_some() || inner.cancelled {
            return false;
        }
        inner.cancelled = true;
        drop(inner);
        self.cvar.notify_all();
        true
    }

    fn wait(&self) {
        let mut inner = self.inner.lock().unwrap();
        while inner.outcome.is_none() && !inner.cancelled {
            inner = self.cvar.wait(inner).unwrap();
        }
    }

    /// Returns true when the task reached a terminal state within `timeout`.
    fn wait_timeout(&self, timeout: Duration) -> bool {
        let inner = self.inner.lock().unwrap();
        let (inner, _) = self
            .cvar
            .wait_timeout_while(inner, timeout, |i| i.outcome.is_none() && !i.cancelled)
            .unwrap();
        inner.outcome.is_some() || inner.cancelled
    }

    fn take_outcome(&self) -> Result<T, TaskError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.outcome.take() {
            Some(result) => result,
            None => Err(TaskError::Cancelled),
        }
    }

    /// Non-blocking removal of a terminal outcome, used by the coordinator.
    fn try_take(&self) -> Option<Result<T, TaskError>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.outcome.take() {
            Some(result) => Some(result),
            None if inner.cancelled => Some(Err(TaskError::Cancelled)),
            None => None,
        }
    }
}

/// Caller-visible handle for one submitted task.
///
/// Completion is observed with [`is_done`](TaskHandle::is_done) or the
/// blocking [`join`](TaskHandle::join) family. Cancellation is cooperative:
/// a cancel issued before the task starts keeps it from running at all,
/// while a cancel issued mid-run only discards the eventual result.
pub struct TaskHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("done", &self.shared.is_done())
            .field("cancelled", &self.shared.is_cancelled())
            .finish()
    }
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Builds a handle plus the queueable job resolving it.
    ///
    /// The job claims the handle, runs `f` with panic containment, and
    /// records the outcome. Panics become [`TaskError::Panicked`].
    pub(crate) fn new_pair<F>(f: F) -> (TaskHandle<T>, Job)
    where
        F: FnOnce() -> Result<T, TaskError> + Send + 'static,
    {
        let shared = Arc::new(Shared::new());
        let worker_side = Arc::clone(&shared);
        let job: Job = Box::new(move || {
            if !worker_side.begin() {
                return;
            }
            let result = match panic::catch_unwind(AssertUnwindSafe(f)) {
                Ok(result) => result,
                Err(payload) => Err(TaskError::Panicked(panic_message(payload))),
            };
            worker_side.complete(result);
        });
        (TaskHandle { shared }, job)
    }
}

impl<T> TaskHandle<T> {
    /// Requests cancellation. Returns true when the handle transitioned to
    /// cancelled, false when the task had already completed or was already
    /// cancelled. Best-effort: a task already running is not interrupted.
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// Whether the task reached a terminal state (completed, failed, or
    /// cancelled).
    pub fn is_done(&self) -> bool {
        self.shared.is_done()
    }

    /// Blocks until the task reaches a terminal state.
    pub fn wait(&self) {
        self.shared.wait();
    }

    /// Blocks for at most `timeout`; returns whether the task is done.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.shared.wait_timeout(timeout)
    }

    /// Blocks until done and returns the outcome.
    pub fn join(self) -> Result<T, TaskError> {
        self.shared.wait();
        self.shared.take_outcome()
    }

    /// Like [`join`](TaskHandle::join) but bounded by a wall-clock
    /// deadline; yields [`TaskError::Timeout`] past it.
    pub fn join_timeout(self, timeout: Duration) -> Result<T, TaskError> {
        if !self.shared.wait_timeout(timeout) {
            return Err(TaskError::Timeout(timeout));
        }
        self.shared.take_outcome()
    }

    pub(crate) fn try_take(&self) -> Option<Result<T, TaskError>> {
        self.shared.try_take()
    }
}

/// Renders a panic payload as text, covering the common `String` and
/// `&str` payload shapes.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast_ref::<&str>() {
            Some(message) => (*message).to_string(),
            None => "unknown panic".to_string(),
        },
    }
}
