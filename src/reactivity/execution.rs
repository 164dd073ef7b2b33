// ============================================================================
// spark-components - Execution Contexts
//
// Where a job runs (worker) and where its outcome is reported (notifier).
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::thread;

use parking_lot::Mutex;
use tracing::error;

use crate::core::error::RejectedTaskError;

/// A unit of work handed to a context.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks somewhere.
///
/// A context that cannot take a task returns [`RejectedTaskError`]; the task
/// has then been dropped and will never run.
pub trait ExecutionContext: Send + Sync {
    fn execute(&self, task: Task) -> Result<(), RejectedTaskError>;
}

// =============================================================================
// IMMEDIATE
// =============================================================================

/// Runs every task inline, on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateContext;

impl ExecutionContext for ImmediateContext {
    fn execute(&self, task: Task) -> Result<(), RejectedTaskError> {
        task();
        Ok(())
    }
}

// =============================================================================
// THREAD
// =============================================================================

/// Runs every task on a fresh, named OS thread.
#[derive(Debug, Clone)]
pub struct ThreadContext {
    name: String,
}

impl ThreadContext {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ThreadContext {
    fn default() -> Self {
        Self::named("spark-worker")
    }
}

impl ExecutionContext for ThreadContext {
    fn execute(&self, task: Task) -> Result<(), RejectedTaskError> {
        match thread::Builder::new().name(self.name.clone()).spawn(task) {
            Ok(_) => Ok(()),
            Err(source) => {
                error!(context = %self.name, error = %source, "failed to spawn worker thread");
                Err(RejectedTaskError {
                    context: self.name.clone(),
                    source,
                })
            }
        }
    }
}

// =============================================================================
// QUEUE
// =============================================================================

/// Queues tasks until the owning loop pumps them with `run_pending`.
///
/// Stands in for a UI main loop: results posted here are delivered on
/// whichever thread calls `run_pending`.
#[derive(Default)]
pub struct QueueContext {
    queue: Mutex<VecDeque<Task>>,
}

impl QueueContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run queued tasks, including ones queued while running. Returns how many
    /// ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Pop under the lock, run outside it.
            let next = self.queue.lock().pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl ExecutionContext for QueueContext {
    fn execute(&self, task: Task) -> Result<(), RejectedTaskError> {
        self.queue.lock().push_back(task);
        Ok(())
    }
}

impl fmt::Debug for QueueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueContext")
            .field("pending", &self.pending())
            .finish()
    }
}
