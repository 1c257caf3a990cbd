//! # Worker Thread Module
//!
//! One worker owns one OS thread running a take-execute loop against the
//! pool's shared queue.
//!
//! ## Key Concepts
//! - Loop contract: pause checkpoint, dequeue, pause checkpoint, execute
//! - Graceful stop (`dead`): keep draining queued tasks, never block for
//!   new ones
//! - Immediate stop (`killed`): exit at the next checkpoint; a running
//!   task is not interrupted
//!
//! ## Design Principles
//! - Error isolation: a panicking task never takes the worker down
//! - All cross-thread flags are individual atomics; no compound invariant
//!   spans more than one flag

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use flume::{Receiver, RecvTimeoutError};
use tracing::{debug, error};

use crate::handle::{panic_message, Job};

/// Binary wait-gate implementing pause/resume.
///
/// Un-pausing always wakes every blocked checkpoint if one is pending and
/// is a no-op otherwise; the wake is idempotent.
pub(crate) struct PauseGate {
    paused: Mutex<bool>,
    cvar: Condvar,
}

impl PauseGate {
    fn new() -> Self {
        Self {
            paused: Mutex::new(false),
            cvar: Condvar::new(),
        }
    }

    fn set_paused(&self, paused: bool) {
        let mut flag = self.paused.lock().unwrap();
        *flag = paused;
        drop(flag);
        if !paused {
            self.cvar.notify_all();
        }
    }

    /// Blocks while the gate is paused. A kill also releases the gate so a
    /// paused worker can terminate.
    fn wait_while_paused(&self, killed: &AtomicBool) {
        let mut flag = self.paused.lock().unwrap();
        while *flag && !killed.load(Ordering::SeqCst) {
            flag = self.cvar.wait(flag).unwrap();
        }
    }

    fn wake(&self) {
        self.cvar.notify_all();
    }
}

/// Flags shared between a worker thread and the pool controller.
pub(crate) struct WorkerShared {
    /// Set around task execution; read by `is_busy`.
    busy: AtomicBool,
    /// Graceful-stop request: drain the queue, then exit.
    dead: AtomicBool,
    /// Immediate-stop request: exit at the next checkpoint.
    killed: AtomicBool,
    /// Set once by the worker when its loop has exited.
    done: AtomicBool,
    gate: PauseGate,
}

impl WorkerShared {
    fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            dead: AtomicBool::new(false),
            killed: AtomicBool::new(false),
            done: AtomicBool::new(false),
            gate: PauseGate::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    fn is_dead(&self) -> bool {
        self.dead.load(Ordering::SeqCst)
    }

    fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    /// Graceful stop: the worker keeps draining remaining queued tasks but
    /// exits once the queue runs empty.
    pub fn mark_dead(&self) {
        self.dead.store(true, Ordering::SeqCst);
    }

    /// Immediate stop: clears the busy flag, releases a paused checkpoint,
    /// and makes the loop exit at its next flag check. The task currently
    /// running, if any, is not interrupted.
    pub fn kill(&self) {
        self.dead.store(true, Ordering::SeqCst);
        self.killed.store(true, Ordering::SeqCst);
        self.busy.store(false, Ordering::SeqCst);
        self.gate.wake();
    }

    pub fn set_paused(&self, paused: bool) {
        self.gate.set_paused(paused);
    }
}

/// One spawned worker: its shared flags plus the detachable thread handle.
/// The controller drops the whole handle on shutdown, detaching the thread
/// while it drains.
pub(crate) struct WorkerHandle {
    pub shared: Arc<WorkerShared>,
    #[allow(dead_code)]
    thread: JoinHandle<()>,
}

/// Spawns a named worker thread running the take-execute loop.
pub(crate) fn spawn(
    id: usize,
    queue: Receiver<Job>,
    poll_interval: Duration,
) -> std::io::Result<WorkerHandle> {
    let shared = Arc::new(WorkerShared::new());
    let loop_shared = Arc::clone(&shared);
    let thread = std::thread::Builder::new()
        .name(format!("taskpool-worker-{id}"))
        .spawn(move || run_loop(id, loop_shared, queue, poll_interval))?;
    Ok(WorkerHandle { shared, thread })
}

/// The worker main loop.
///
/// The pause gate is checked both before the dequeue and after it, so a
/// pause requested between dequeue and execution still keeps the fetched
/// task from starting. When `dead` is set the dequeue degrades to a
/// non-blocking drain; the bounded `recv_timeout` otherwise keeps the loop
/// responsive to kill without a dedicated wakeup channel.
fn run_loop(id: usize, shared: Arc<WorkerShared>, queue: Receiver<Job>, poll_interval: Duration) {
    debug!(worker = id, "worker started");
    loop {
        if shared.is_killed() {
            break;
        }
        // Checkpoint A.
        shared.gate.wait_while_paused(&shared.killed);
        if shared.is_killed() {
            break;
        }

        let job = if shared.is_dead() {
            match queue.try_recv() {
                Ok(job) => job,
                Err(_) => break,
            }
        } else {
            match queue.recv_timeout(poll_interval) {
                Ok(job) => job,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        };

        // Checkpoint B.
        shared.gate.wait_while_paused(&shared.killed);
        if shared.is_killed() {
            break;
        }

        shared.busy.store(true, Ordering::SeqCst);
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            error!(worker = id, panic = %panic_message(payload), "task panicked");
        }
        shared.busy.store(false, Ordering::SeqCst);
    }
    shared.done.store(true, Ordering::SeqCst);
    debug!(worker = id, "worker exited");
}
