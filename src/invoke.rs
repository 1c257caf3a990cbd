//! Multi-task coordination: first-success and wait-all semantics on top of
//! submission.
//!
//! Both families submit every task up front and then watch the resulting
//! handles. `invoke_any` polls on a fixed interval; `invoke_all` spins
//! with a scheduler yield, which is deliberately simple at the cost of CPU
//! (the no-timeout variant has no natural sleep point). Timeouts are
//! wall-clock deadlines checked by the same polling, so their precision is
//! bounded by the poll interval. Neither timeout variant cancels tasks
//! that are still running; they are left to finish on their own.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::InvokeError;
use crate::handle::TaskHandle;
use crate::pool::ThreadPool;

impl ThreadPool {
    /// Runs every task and returns the value of the first one to complete
    /// successfully. The remaining tasks keep running; no cancellation is
    /// issued.
    ///
    /// # Errors
    /// - [`InvokeError::EmptyTaskSet`] for an empty input
    /// - [`InvokeError::Pool`] when the pool is shut down
    /// - [`InvokeError::AllFailed`] when every task fails, carrying the
    ///   last observed cause
    pub fn invoke_any<T, E, F, I>(&self, tasks: I) -> Result<T, InvokeError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display,
    {
        self.invoke_any_inner(tasks, None)
    }

    /// [`invoke_any`](ThreadPool::invoke_any) bounded by a wall-clock
    /// deadline; yields [`InvokeError::Timeout`] once it passes with no
    /// success and no full-failure aggregate.
    pub fn invoke_any_timeout<T, E, F, I>(
        &self,
        tasks: I,
        timeout: Duration,
    ) -> Result<T, InvokeError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display,
    {
        self.invoke_any_inner(tasks, Some(timeout))
    }

    fn invoke_any_inner<T, E, F, I>(
        &self,
        tasks: I,
        timeout: Option<Duration>,
    ) -> Result<T, InvokeError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display,
    {
        let tasks: Vec<F> = tasks.into_iter().collect();
        if tasks.is_empty() {
            return Err(InvokeError::EmptyTaskSet);
        }
        self.ensure_accepting()?;
        let deadline = timeout.map(|t| Instant::now() + t);

        let handles = tasks
            .into_iter()
            .map(|task| self.submit_fallible(task))
            .collect::<Result<Vec<_>, _>>()?;
        let total = handles.len();
        let mut failures = 0usize;

        loop {
            for handle in &handles {
                if !handle.is_done() {
                    continue;
                }
                // A taken outcome reports None on later sweeps, so each
                // failure is counted exactly once.
                match handle.try_take() {
                    Some(Ok(value)) => return Ok(value),
                    Some(Err(cause)) => {
                        failures += 1;
                        if failures >= total {
                            debug!(count = total, "every task in invoke_any failed");
                            return Err(InvokeError::AllFailed { count: total, last: cause });
                        }
                    }
                    None => {}
                }
            }
            if let (Some(deadline), Some(timeout)) = (deadline, timeout) {
                if Instant::now() >= deadline {
                    return Err(InvokeError::Timeout(timeout));
                }
            }
            std::thread::sleep(self.config.invoke_poll_interval);
        }
    }

    /// Runs every task to completion (success or failure both count as
    /// done) and returns the handles in original submission order.
    ///
    /// # Errors
    /// [`InvokeError::Pool`] when the pool is shut down.
    pub fn invoke_all<T, E, F, I>(&self, tasks: I) -> Result<Vec<TaskHandle<T>>, InvokeError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display,
    {
        self.invoke_all_inner(tasks, None)
    }

    /// [`invoke_all`](ThreadPool::invoke_all) bounded by a wall-clock
    /// deadline. At the deadline the handles are returned as-is: some may
    /// report not-done, and their tasks are NOT cancelled.
    pub fn invoke_all_timeout<T, E, F, I>(
        &self,
        tasks: I,
        timeout: Duration,
    ) -> Result<Vec<TaskHandle<T>>, InvokeError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display,
    {
        self.invoke_all_inner(tasks, Some(timeout))
    }

    fn invoke_all_inner<T, E, F, I>(
        &self,
        tasks: I,
        timeout: Option<Duration>,
    ) -> Result<Vec<TaskHandle<T>>, InvokeError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display,
    {
        self.ensure_accepting()?;
        let deadline = timeout.map(|t| Instant::now() + t);

        let handles = tasks
            .into_iter()
            .map(|task| self.submit_fallible(task))
            .collect::<Result<Vec<_>, _>>()?;

        while !handles.iter().all(TaskHandle::is_done) {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    debug!("invoke_all deadline passed with tasks still running");
                    break;
                }
            }
            std::thread::yield_now();
        }
        Ok(handles)
    }
}
