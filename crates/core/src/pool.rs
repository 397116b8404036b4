// Copyright 2025 Benchrank Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bounded worker pool.
//!
//! Every fan-out step (page scans, solution downloads, benchmark runs) is
//! expressed as a [`Task`] and scheduled on a [`WorkerPool`]. The pool owns
//! a bounded queue whose capacity equals the number of workers, so
//! [`WorkerPool::submit`] waits while the queue is full. That wait is the
//! only backpressure in the system.
//!
//! Completion is observed through a [`TaskGroup`]: every task submitted
//! through a group is counted, and [`TaskGroup::wait`] resolves once all of
//! them have run.
//!
//! The pool has no error channel. Tasks log their own failures; a task that
//! panics is logged here and the worker moves on to the next task.

use crate::error::{Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error};

/// A unit of work with its inputs moved in.
pub struct Task {
    label: String,
    future: BoxFuture<'static, ()>,
}

impl Task {
    /// Create a task from a label and an owned future.
    pub fn new<F>(label: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            label: label.into(),
            future: future.boxed(),
        }
    }

    /// Label used when logging about this task.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("label", &self.label).finish()
    }
}

/// Fixed set of workers pulling from one bounded queue.
pub struct WorkerPool {
    sender: mpsc::Sender<Task>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `size` workers behind a queue of capacity `size`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(size: NonZeroUsize) -> Self {
        let (sender, receiver) = mpsc::channel::<Task>(size.get());
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size.get())
            .map(|id| tokio::spawn(worker(id, Arc::clone(&receiver))))
            .collect();

        debug!(workers = size.get(), "worker pool started");
        Self { sender, workers }
    }

    /// Pool with a single worker: tasks run one at a time.
    pub fn serial() -> Self {
        Self::new(NonZeroUsize::MIN)
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue a task, waiting while the queue is full.
    pub async fn submit(&self, task: Task) -> Result<()> {
        self.sender.send(task).await.map_err(|_| Error::PoolClosed)
    }

    /// Open a join barrier over tasks submitted to this pool.
    pub fn group(&self) -> TaskGroup<'_> {
        TaskGroup {
            pool: self,
            tracker: TaskTracker::new(),
            submitted: AtomicUsize::new(0),
        }
    }

    /// Close the queue and wait for every worker to drain it and exit.
    pub async fn shutdown(self) {
        let WorkerPool { sender, workers } = self;
        drop(sender);
        for handle in workers {
            if let Err(e) = handle.await {
                error!(error = %e, "worker terminated abnormally");
            }
        }
        debug!("worker pool stopped");
    }
}

async fn worker(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Task>>>) {
    loop {
        // Lock is released before the task runs so other workers can pull.
        let next = receiver.lock().await.recv().await;
        let Some(task) = next else {
            break;
        };

        let Task { label, future } = task;
        if AssertUnwindSafe(future).catch_unwind().await.is_err() {
            error!(worker = id, task = %label, "task panicked");
        }
    }
}

/// Counted completion signal for one phase of work.
pub struct TaskGroup<'a> {
    pool: &'a WorkerPool,
    tracker: TaskTracker,
    submitted: AtomicUsize,
}

impl TaskGroup<'_> {
    /// Submit a task to the pool and count it in this group.
    pub async fn submit(&self, task: Task) -> Result<()> {
        let Task { label, future } = task;
        let tracked = Task {
            label,
            future: self.tracker.track_future(future).boxed(),
        };
        self.pool.submit(tracked).await?;
        self.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Number of tasks submitted so far.
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Wait until every task submitted through this group has finished.
    ///
    /// Returns the number of tasks that were submitted.
    pub async fn wait(self) -> usize {
        self.tracker.close();
        self.tracker.wait().await;
        self.submitted.into_inner()
    }
}
