//! Growth policies deciding how many workers a pool runs.
//!
//! A policy is consulted exactly twice: once at construction for the
//! initial worker count, and once after every successful submission. The
//! post-submit hook runs on the submitting thread.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::config::DEFAULT_SETTLE_DELAY;
use crate::pool::ThreadPool;

/// Strategy governing initial and dynamic worker count.
pub trait GrowthPolicy: Send + Sync + fmt::Debug {
    /// Number of workers spawned when the pool is constructed.
    fn initial_workers(&self) -> usize;

    /// Invoked once per successful submission, never per dequeue.
    fn after_submit(&self, pool: &ThreadPool);
}

/// A fixed number of workers, all pre-spawned at construction. The single
/// pool variant is `FixedGrowth::new(1)`.
#[derive(Debug, Clone, Copy)]
pub struct FixedGrowth {
    workers: usize,
}

impl FixedGrowth {
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }
}

impl GrowthPolicy for FixedGrowth {
    fn initial_workers(&self) -> usize {
        self.workers
    }

    fn after_submit(&self, _pool: &ThreadPool) {}
}

/// Grows the pool by one worker per submission that is still queued after
/// a settle delay.
///
/// The pool starts with zero workers. After each submission the hook
/// sleeps for the settle delay on the submitting thread, re-checks queue
/// depth, and spawns exactly one worker if at least one task is still
/// unconsumed. Growth is monotonic: idle workers are never probed or
/// reused, and threads are never pruned. Because each submission runs its
/// own check, a concurrent burst can add one worker per submission even
/// when earlier workers have gone idle.
#[derive(Debug, Clone, Copy)]
pub struct CachedGrowth {
    settle_delay: Duration,
}

impl CachedGrowth {
    pub fn new(settle_delay: Duration) -> Self {
        Self { settle_delay }
    }
}

impl Default for CachedGrowth {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

impl GrowthPolicy for CachedGrowth {
    fn initial_workers(&self) -> usize {
        0
    }

    fn after_submit(&self, pool: &ThreadPool) {
        std::thread::sleep(self.settle_delay);
        if pool.queue_size() > 0 {
            debug!(
                queue_size = pool.queue_size(),
                threads = pool.thread_count(),
                "queue still backed up after settle delay, growing pool"
            );
            pool.grow_one();
        }
    }
}
