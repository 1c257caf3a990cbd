use std::time::Duration;

/// Tuning knobs for a [`ThreadPool`](crate::pool::ThreadPool).
///
/// All intervals bound internal polling loops; they shape wake-up latency
/// only and never change the observable contract of any operation.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// How long a worker blocks on an empty queue before re-checking its
    /// shutdown flags. Bounds how quickly a kill is observed.
    pub worker_poll_interval: Duration,

    /// Interval between `is_busy()` probes inside `wait_until_idle`.
    pub idle_poll_interval: Duration,

    /// Interval between completion scans inside `invoke_any`.
    pub invoke_poll_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_poll_interval: Duration::from_millis(10),
            idle_poll_interval: Duration::from_millis(25),
            invoke_poll_interval: Duration::from_millis(100),
        }
    }
}

/// Default settle delay for the cached growth policy: how long a submission
/// waits before re-checking queue depth and possibly spawning a worker.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);
