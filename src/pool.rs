//! # Pool Controller
//!
//! [`ThreadPool`] owns the shared task queue, the worker collection, and
//! the life-cycle flags, and is the primary API surface of the crate.
//!
//! ## Life cycle
//! - `pause` / `resume`: flip every worker's pause gate; not idempotent
//! - `shutdown`: reject new work, let workers drain the queue, drop the
//!   worker handles (the threads detach and finish on their own)
//! - `shutdown_now`: additionally kill every worker and hand back the
//!   tasks that never started
//!
//! ## Thread Safety
//! - Every life-cycle flag is its own atomic; no compound invariant spans
//!   more than one flag, so no coarse pool-wide lock exists
//! - `is_busy`, `queue_size` and `thread_count` are point-in-time,
//!   race-tolerant reads

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::PoolConfig;
use crate::error::{PoolError, TaskError};
use crate::growth::{CachedGrowth, FixedGrowth, GrowthPolicy};
use crate::handle::{Task, TaskHandle};
use crate::queue::TaskQueue;
use crate::worker::{self, WorkerHandle};

/// A managed pool of worker threads consuming a shared FIFO queue.
///
/// Construct through [`fixed`](ThreadPool::fixed),
/// [`cached`](ThreadPool::cached) or
/// [`single_thread`](ThreadPool::single_thread).
pub struct ThreadPool {
    queue: TaskQueue,
    workers: Mutex<Vec<WorkerHandle>>,
    thread_count: AtomicUsize,
    next_worker_id: AtomicUsize,
    paused: AtomicBool,
    shutdown: AtomicBool,
    shutdown_now: AtomicBool,
    policy: Box<dyn GrowthPolicy>,
    pub(crate) config: PoolConfig,
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("thread_count", &self.thread_count())
            .field("queue_size", &self.queue_size())
            .field("paused", &self.paused.load(Ordering::SeqCst))
            .field("shutdown", &self.shutdown.load(Ordering::SeqCst))
            .field("policy", &self.policy)
            .finish()
    }
}

impl ThreadPool {
    /// Creates a pool with exactly `threads` workers, all spawned up
    /// front. The count never grows or shrinks.
    ///
    /// # Errors
    /// [`PoolError::InvalidThreadCount`] when `threads == 0`.
    pub fn fixed(threads: usize) -> Result<Self, PoolError> {
        Self::fixed_with_config(threads, PoolConfig::default())
    }

    pub fn fixed_with_config(threads: usize, config: PoolConfig) -> Result<Self, PoolError> {
        if threads == 0 {
            return Err(PoolError::InvalidThreadCount);
        }
        Self::with_policy(Box::new(FixedGrowth::new(threads)), config)
    }

    /// Creates a pool with a single worker; tasks execute sequentially in
    /// submission order.
    pub fn single_thread() -> Result<Self, PoolError> {
        Self::fixed(1)
    }

    /// Creates a pool that starts empty and spawns one worker per
    /// submission still queued after the settle delay (see
    /// [`CachedGrowth`]).
    pub fn cached() -> Result<Self, PoolError> {
        Self::with_policy(Box::new(CachedGrowth::default()), PoolConfig::default())
    }

    pub fn cached_with_settle_delay(settle_delay: Duration) -> Result<Self, PoolError> {
        Self::with_policy(Box::new(CachedGrowth::new(settle_delay)), PoolConfig::default())
    }

    /// Creates a pool driven by an arbitrary growth policy.
    pub fn with_policy(
        policy: Box<dyn GrowthPolicy>,
        config: PoolConfig,
    ) -> Result<Self, PoolError> {
        let pool = Self {
            queue: TaskQueue::new(),
            workers: Mutex::new(Vec::new()),
            thread_count: AtomicUsize::new(0),
            next_worker_id: AtomicUsize::new(0),
            paused: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            shutdown_now: AtomicBool::new(false),
            policy,
            config,
        };
        for _ in 0..pool.policy.initial_workers() {
            pool.spawn_worker()?;
        }
        info!(threads = pool.thread_count(), policy = ?pool.policy, "thread pool created");
        Ok(pool)
    }

    /// Enqueues a fire-and-forget task.
    ///
    /// # Errors
    /// [`PoolError::ShutDown`] after any shutdown.
    pub fn execute<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.ensure_accepting()?;
        self.queue.push(Box::new(f));
        self.policy.after_submit(self);
        Ok(())
    }

    /// Enqueues a value-producing task and returns its handle. A panic in
    /// the task resolves the handle to [`TaskError::Panicked`].
    pub fn submit<T, F>(&self, f: F) -> Result<TaskHandle<T>, PoolError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.ensure_accepting()?;
        let (handle, job) = TaskHandle::new_pair(move || Ok(f()));
        self.queue.push(job);
        self.policy.after_submit(self);
        Ok(handle)
    }

    /// Enqueues a fallible task; an `Err` return resolves the handle to
    /// [`TaskError::Failed`] carrying the rendered error.
    pub fn submit_fallible<T, E, F>(&self, f: F) -> Result<TaskHandle<T>, PoolError>
    where
        T: Send + 'static,
        E: fmt::Display,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        self.ensure_accepting()?;
        let (handle, job) =
            TaskHandle::new_pair(move || f().map_err(|e| TaskError::Failed(e.to_string())));
        self.queue.push(job);
        self.policy.after_submit(self);
        Ok(handle)
    }

    /// Pauses every worker. Tasks already running are unaffected; no new
    /// task passes a pause checkpoint until [`resume`](ThreadPool::resume).
    ///
    /// # Errors
    /// [`PoolError::AlreadyPaused`] when the pool is already paused.
    pub fn pause(&self) -> Result<(), PoolError> {
        self.paused
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| PoolError::AlreadyPaused)?;
        for worker in self.workers.lock().unwrap().iter() {
            worker.shared.set_paused(true);
        }
        debug!("pool paused");
        Ok(())
    }

    /// Resumes every worker, waking any checkpoint currently blocked.
    ///
    /// # Errors
    /// [`PoolError::NotPaused`] when the pool is not paused.
    pub fn resume(&self) -> Result<(), PoolError> {
        self.paused
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| PoolError::NotPaused)?;
        for worker in self.workers.lock().unwrap().iter() {
            worker.shared.set_paused(false);
        }
        debug!("pool resumed");
        Ok(())
    }

    /// Drops every queued, not-yet-started task. Running tasks are
    /// unaffected.
    pub fn clear(&self) {
        let dropped = self.queue.drain().len();
        debug!(dropped, "queue cleared");
    }

    /// Graceful shutdown: rejects all further submissions and signals each
    /// worker to drain the queue and exit. The controller drops its worker
    /// handles; callers observe completion through
    /// [`wait_until_idle`](ThreadPool::wait_until_idle).
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let mut workers = self.workers.lock().unwrap();
        for worker in workers.iter() {
            worker.shared.mark_dead();
        }
        workers.clear();
        info!("pool shut down, workers draining");
    }

    /// Immediate shutdown: kills every worker and returns the tasks that
    /// were queued but never started. Tasks already running finish on
    /// their own; nothing interrupts them.
    pub fn shutdown_now(&self) -> Vec<Task> {
        self.shutdown.store(true, Ordering::SeqCst);
        self.shutdown_now.store(true, Ordering::SeqCst);
        let mut workers = self.workers.lock().unwrap();
        for worker in workers.iter() {
            worker.shared.kill();
        }
        workers.clear();
        drop(workers);
        let unstarted: Vec<Task> = self.queue.drain().into_iter().map(Task::new).collect();
        info!(unstarted = unstarted.len(), "pool shut down immediately");
        unstarted
    }

    /// Whether any worker is executing or the queue holds pending tasks.
    /// Unconditionally `false` once [`shutdown_now`](ThreadPool::shutdown_now)
    /// has run.
    pub fn is_busy(&self) -> bool {
        if self.shutdown_now.load(Ordering::SeqCst) {
            return false;
        }
        let any_worker_busy = self
            .workers
            .lock()
            .unwrap()
            .iter()
            .any(|worker| worker.shared.is_busy());
        any_worker_busy || !self.queue.is_empty()
    }

    /// Blocks the caller until [`is_busy`](ThreadPool::is_busy) reports
    /// false, polling on a fixed interval.
    pub fn wait_until_idle(&self) {
        while self.is_busy() {
            std::thread::sleep(self.config.idle_poll_interval);
        }
    }

    /// Number of tasks currently queued. Point-in-time and race-tolerant:
    /// the value may be stale by the time the caller acts on it.
    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    /// Number of workers ever created by the active policy. Fixed for the
    /// fixed/single policies, monotonically non-decreasing for cached.
    pub fn thread_count(&self) -> usize {
        self.thread_count.load(Ordering::SeqCst)
    }

    /// Spawns one more worker on behalf of a growth policy.
    ///
    /// Workers created here do not inherit a pause already in effect;
    /// only a later `pause` call reaches them.
    pub(crate) fn grow_one(&self) {
        if let Err(err) = self.spawn_worker() {
            tracing::error!(error = %err, "growth policy failed to add a worker");
        }
    }

    pub(crate) fn ensure_accepting(&self) -> Result<(), PoolError> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Err(PoolError::ShutDown);
        }
        Ok(())
    }

    fn spawn_worker(&self) -> Result<(), PoolError> {
        let id = self.next_worker_id.fetch_add(1, Ordering::SeqCst);
        let handle = worker::spawn(id, self.queue.consumer(), self.config.worker_poll_interval)
            .map_err(|e| PoolError::SpawnFailed(e.to_string()))?;
        self.workers.lock().unwrap().push(handle);
        self.thread_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
