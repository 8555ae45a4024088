//! # Worker Pool
//!
//! A fixed set of named worker threads fed from one job channel. Generation
//! submits one job per sub-region and blocks until the whole batch has
//! reported back, which is the barrier between two passes.
//!
//! ## Architecture
//!
//! ```text
//!   run_batch ──> [job channel] ──> worldgen-0 ──┐
//!                                ──> worldgen-1 ──┼──> [batch channel] ──> run_batch
//!                                ──> worldgen-N ──┘      (one report per job)
//! ```
//!
//! A panicking job is caught on its worker, reported as a failure of the
//! batch, and the worker keeps serving jobs.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Sender};

use crate::error::{WorldGenError, WorldGenResult};

/// A unit of work submitted to the pool.
pub type Job = Box<dyn FnOnce() -> WorldGenResult<()> + Send + 'static>;

type Envelope = Box<dyn FnOnce() + Send + 'static>;

/// Statistics of one completed batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Jobs submitted.
    pub jobs: usize,
    /// Jobs that returned an error.
    pub failed: usize,
    /// Jobs that panicked.
    pub panicked: usize,
}

/// Bounded set of worker threads.
pub struct WorkerPool {
    sender: Option<Sender<Envelope>>,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}

impl WorkerPool {
    /// Starts `worker_count` threads (at least one).
    ///
    /// # Errors
    ///
    /// Returns `WorkerSpawn` if a thread cannot be created.
    pub fn new(worker_count: usize) -> WorldGenResult<Self> {
        let (sender, receiver) = unbounded::<Envelope>();
        let mut workers = Vec::with_capacity(worker_count.max(1));

        for worker_id in 0..worker_count.max(1) {
            let rx = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("worldgen-{worker_id}"))
                .spawn(move || {
                    // Ends when the pool drops its sender.
                    while let Ok(envelope) = rx.recv() {
                        envelope();
                    }
                })
                .map_err(|e| WorldGenError::WorkerSpawn(e.to_string()))?;
            workers.push(handle);
        }

        tracing::debug!(workers = workers.len(), "worker pool started");
        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Runs every job of `jobs` on the pool and waits for all of them.
    ///
    /// All jobs run to completion even when some fail; the first error is
    /// returned afterwards.
    ///
    /// # Errors
    ///
    /// Returns `TaskPanicked` if any job panicked, otherwise the first error a
    /// job returned, or `PoolClosed` if the workers are gone.
    pub fn run_batch<I>(&self, label: &'static str, jobs: I) -> WorldGenResult<BatchStats>
    where
        I: IntoIterator<Item = Job>,
    {
        let sender = self.sender.as_ref().ok_or(WorldGenError::PoolClosed)?;
        let (done_tx, done_rx) = unbounded::<thread::Result<WorldGenResult<()>>>();

        let mut stats = BatchStats::default();
        for job in jobs {
            let done = done_tx.clone();
            let envelope: Envelope = Box::new(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(job));
                // The batch only stops listening once every job reported.
                let _ = done.send(outcome);
            });
            sender.send(envelope).map_err(|_| WorldGenError::PoolClosed)?;
            stats.jobs += 1;
        }
        drop(done_tx);

        let mut first_error = None;
        for _ in 0..stats.jobs {
            match done_rx.recv() {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => {
                    stats.failed += 1;
                    first_error.get_or_insert(e);
                }
                Ok(Err(_)) => stats.panicked += 1,
                Err(_) => return Err(WorldGenError::PoolClosed),
            }
        }

        if stats.panicked > 0 {
            tracing::warn!(pass = label, panicked = stats.panicked, "tasks panicked");
            return Err(WorldGenError::TaskPanicked {
                pass: label,
                failed: stats.panicked,
            });
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("worker thread exited by panic");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_batch_runs_every_job() {
        let pool = WorkerPool::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let jobs = (0..100).map(|_| {
            let counter = Arc::clone(&counter);
            Box::new(move || {
                counter.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }) as Job
        });

        let stats = pool.run_batch("count", jobs).unwrap();
        assert_eq!(stats.jobs, 100);
        // The batch is a barrier: every increment is visible here.
        assert_eq!(counter.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_panic_is_reported_and_worker_survives() {
        let pool = WorkerPool::new(1).unwrap();

        let jobs: Vec<Job> = vec![
            Box::new(|| Ok(())),
            Box::new(|| -> WorldGenResult<()> { panic!("boom") }),
            Box::new(|| Ok(())),
        ];
        let err = pool.run_batch("explode", jobs).unwrap_err();
        assert_eq!(
            err,
            WorldGenError::TaskPanicked {
                pass: "explode",
                failed: 1
            }
        );

        let stats = pool.run_batch("after", vec![Box::new(|| Ok(())) as Job]).unwrap();
        assert_eq!(stats.jobs, 1);
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn test_first_error_is_returned() {
        let pool = WorkerPool::new(2).unwrap();
        let jobs: Vec<Job> = vec![
            Box::new(|| Ok(())),
            Box::new(|| Err(WorldGenError::NoBiomeForLevel(7))),
        ];
        assert_eq!(pool.run_batch("fail", jobs).unwrap_err(), WorldGenError::NoBiomeForLevel(7));
        assert_eq!(pool.run_batch("empty", Vec::new()).unwrap(), BatchStats::default());
    }
}
