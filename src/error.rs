use std::time::Duration;
use thiserror::Error;

/// Errors raised by pool construction and life-cycle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("thread count must be greater than zero")]
    InvalidThreadCount,
    #[error("pool has been shut down, new tasks are rejected")]
    ShutDown,
    #[error("pool is already paused")]
    AlreadyPaused,
    #[error("pool is not paused")]
    NotPaused,
    #[error("failed to spawn worker thread: {0}")]
    SpawnFailed(String),
}

/// Outcome-side failures carried by a [`TaskHandle`](crate::handle::TaskHandle).
///
/// A task that panics resolves its handle to `Panicked` with the panic
/// payload rendered as text. A fallible task submitted through
/// `submit_fallible` resolves to `Failed` when it returns an error.
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error("task failed: {0}")]
    Failed(String),
    #[error("task was cancelled")]
    Cancelled,
    #[error("no result within {0:?}")]
    Timeout(Duration),
}

/// Errors raised by the multi-task coordinator (`invoke_any` / `invoke_all`).
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("task set is empty")]
    EmptyTaskSet,
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("all {count} tasks failed, last cause: {last}")]
    AllFailed { count: usize, last: TaskError },
    #[error("no task completed within {0:?}")]
    Timeout(Duration),
}
