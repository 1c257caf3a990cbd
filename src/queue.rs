use std::fmt;

use flume::{Receiver, Sender};

use crate::handle::Job;

/// The shared task queue feeding all workers of a pool.
///
/// A thin wrapper over an unbounded flume channel. Producers are the
/// submitting caller threads going through the controller, which owns this
/// handle; each worker holds a clone of the consuming half and removes
/// jobs concurrently.
///
/// # Thread Safety
/// - Safe for concurrent producers and consumers
/// - Removal order is strict FIFO relative to insertions
///
/// # Caveats
/// `len` and `is_empty` are snapshots and may be stale by the time the
/// value is used.
pub(crate) struct TaskQueue {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue").field("len", &self.len()).finish()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Hands out the consuming half for a worker. Workers hold only the
    /// receiver, so dropping the pool's queue disconnects them.
    pub fn consumer(&self) -> Receiver<Job> {
        self.receiver.clone()
    }

    /// Enqueues a job. The queue is unbounded, so this never blocks.
    pub fn push(&self, job: Job) {
        // The receiver half lives in self, so the channel cannot be
        // disconnected while this handle exists.
        let _ = self.sender.send(job);
    }

    /// Number of jobs currently queued (snapshot).
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether the queue currently holds no jobs (snapshot).
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Removes and returns every queued job.
    pub fn drain(&self) -> Vec<Job> {
        self.receiver.drain().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn jobs_come_out_in_fifo_order() {
        let queue = TaskQueue::new();
        let order = Arc::new(AtomicUsize::new(0));
        for i in 0..4 {
            let order = order.clone();
            queue.push(Box::new(move || {
                // Each job asserts it runs exactly in submission position.
                assert_eq!(order.fetch_add(1, Ordering::SeqCst), i);
            }));
        }
        assert_eq!(queue.len(), 4);
        let consumer = queue.consumer();
        while let Ok(job) = consumer.try_recv() {
            job();
        }
        assert_eq!(order.load(Ordering::SeqCst), 4);
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_removes_everything() {
        let queue = TaskQueue::new();
        for _ in 0..3 {
            queue.push(Box::new(|| {}));
        }
        let drained = queue.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn consumer_times_out_on_empty_queue() {
        let queue = TaskQueue::new();
        let consumer = queue.consumer();
        let res = consumer.recv_timeout(std::time::Duration::from_millis(10));
        assert!(matches!(res, Err(flume::RecvTimeoutError::Timeout)));
    }
}
