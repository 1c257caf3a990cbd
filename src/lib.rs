// taskpool — a managed worker-thread pool.
//
// A pool owns a shared unbounded FIFO queue and a set of worker threads
// consuming it, with explicit life-cycle control (pause/resume, graceful
// and immediate shutdown), runtime introspection (queue depth, busy state,
// thread count), and multi-task coordination (first-success and wait-all,
// each with an optional timeout).
//
// Entry points: `ThreadPool::fixed(n)`, `ThreadPool::cached()`,
// `ThreadPool::single_thread()`.

pub mod config;
pub mod error;
pub mod growth;
pub mod handle;
pub mod logging;
pub mod pool;

mod invoke;
mod queue;
mod worker;

// Re-export commonly used types
pub use config::{PoolConfig, DEFAULT_SETTLE_DELAY};
pub use error::{InvokeError, PoolError, TaskError};
pub use growth::{CachedGrowth, FixedGrowth, GrowthPolicy};
pub use handle::{Task, TaskHandle};
pub use pool::ThreadPool;
