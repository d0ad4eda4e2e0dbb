//! Bounded worker pool for download tasks.
//!
//! The calling thread is the producer. It runs the first task itself, then
//! spawns the workers and feeds the remaining tasks through a bounded
//! channel in order. A full channel blocks the producer. After the last
//! task, one [`Job::Stop`] per worker is sent and every worker is joined
//! before [`MirrorWorkerPool::run`] returns.

use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::{bounded, Receiver};

use super::entry::CancelToken;
use crate::config::{clamp_workers, DEFAULT_WORKERS};

/// Message sent to a worker.
enum Job<T> {
    Task(T),
    Stop,
}

/// What happened to the tasks handed to [`MirrorWorkerPool::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Tasks passed to the executor.
    pub executed: usize,
    /// Tasks never executed because of cancellation.
    pub abandoned: usize,
    /// Whether cancellation stopped the run early.
    pub interrupted: bool,
}

/// Fixed-size pool of OS threads.
#[derive(Debug, Clone, Copy)]
pub struct MirrorWorkerPool {
    workers: usize,
}

impl MirrorWorkerPool {
    /// Create a pool; `workers` is clamped to the supported range.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: clamp_workers(workers),
        }
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Execute every task exactly once unless `cancel` is set.
    ///
    /// Once cancellation is observed no further task starts. Tasks already
    /// running finish; tasks still queued are dropped.
    pub fn run<I, T, F>(&self, tasks: I, cancel: &CancelToken, execute: F) -> PoolReport
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
        T: Send,
        F: Fn(T) + Sync,
    {
        let mut tasks = tasks.into_iter();
        let total = tasks.len();

        let Some(first) = tasks.next() else {
            return PoolReport::default();
        };

        if cancel.is_cancelled() {
            return PoolReport {
                executed: 0,
                abandoned: total,
                interrupted: true,
            };
        }

        execute(first);
        let executed = AtomicUsize::new(1);

        let workers = queue_capacity(self.workers, total);
        if workers > 0 {
            let (tx, rx) = bounded::<Job<T>>(workers);
            let execute = &execute;
            let executed = &executed;

            thread::scope(|s| {
                let handles: Vec<_> = (0..workers)
                    .map(|id| {
                        let rx = rx.clone();
                        s.spawn(move || worker_loop(id, rx, cancel, execute, executed))
                    })
                    .collect();
                // Workers hold the only receivers, so sends fail if they all died.
                drop(rx);

                for task in tasks {
                    if cancel.is_cancelled() {
                        tracing::info!("Cancellation requested, no more tasks will be queued");
                        break;
                    }
                    if tx.send(Job::Task(task)).is_err() {
                        break;
                    }
                }

                for _ in 0..workers {
                    if tx.send(Job::Stop).is_err() {
                        break;
                    }
                }

                for handle in handles {
                    if let Err(payload) = handle.join() {
                        panic::resume_unwind(payload);
                    }
                }
            });
        }

        let executed = executed.load(Ordering::SeqCst);
        let abandoned = total - executed;
        PoolReport {
            executed,
            abandoned,
            interrupted: abandoned > 0 && cancel.is_cancelled(),
        }
    }
}

impl Default for MirrorWorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

/// Slots in the task queue for `tasks` tasks, one per spawned worker.
///
/// The caller runs the first task, so the queue never holds every task.
fn queue_capacity(workers: usize, tasks: usize) -> usize {
    workers.min(tasks.saturating_sub(1))
}

fn worker_loop<T, F>(
    id: usize,
    rx: Receiver<Job<T>>,
    cancel: &CancelToken,
    execute: &F,
    executed: &AtomicUsize,
) where
    F: Fn(T),
{
    tracing::trace!(worker = id, "Worker started");
    for job in rx.iter() {
        match job {
            Job::Stop => break,
            // Drain without executing once cancelled.
            Job::Task(_) if cancel.is_cancelled() => continue,
            Job::Task(task) => {
                execute(task);
                executed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
    tracing::trace!(worker = id, "Worker stopped");
}
