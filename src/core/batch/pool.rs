use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::enumerate::Task;
use super::report::{BatchReport, TaskOutcome, TaskReport};
use crate::error::{Error, Result};

/// Completed count out of a fixed total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Whole-batch cancellation. Tasks already running finish; the rest are
/// recorded as cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fixed-size pool; at most `worker_count` tasks are in flight.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    worker_count: usize,
    cancel: CancelToken,
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(Error::InvalidArgument {
                arg: "worker_count",
                value: worker_count.to_string(),
            });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("endocrop-worker-{i}"))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;
        Ok(Self {
            pool,
            worker_count,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run `transform` over every task. A task's error or panic is recorded
    /// against that task only; the pool always returns a full report.
    ///
    /// `on_progress` is called once per finished task, serialized, with a
    /// strictly increasing completed count.
    pub fn run<F, P>(&self, tasks: Vec<Task>, transform: F, on_progress: P) -> BatchReport
    where
        F: Fn(&Task) -> Result<()> + Sync,
        P: Fn(Progress) + Sync,
    {
        let started_at = Utc::now();
        let total = tasks.len();
        let completed = Mutex::new(0usize);

        let entries: Vec<TaskReport> = self.pool.install(|| {
            tasks
                .into_par_iter()
                .with_max_len(1)
                .map(|task| {
                    let outcome = if self.cancel.is_cancelled() {
                        TaskOutcome::Cancelled
                    } else {
                        let result = catch_unwind(AssertUnwindSafe(|| transform(&task)))
                            .unwrap_or_else(|payload| Err(Error::Panic(panic_message(payload))));
                        match result {
                            Ok(()) => {
                                debug!("Done: {:?} -> {:?}", task.source, task.destination);
                                TaskOutcome::Completed
                            }
                            Err(e) => {
                                warn!("Error processing {:?}: {}", task.source, e);
                                TaskOutcome::Failed {
                                    reason: e.to_string(),
                                }
                            }
                        }
                    };
                    {
                        let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
                        *done += 1;
                        on_progress(Progress {
                            completed: *done,
                            total,
                        });
                    }
                    TaskReport { task, outcome }
                })
                .collect()
        });

        BatchReport {
            started_at,
            finished_at: Utc::now(),
            entries,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn tasks(n: usize) -> Vec<Task> {
        (1..=n)
            .map(|i| Task {
                source: PathBuf::from(format!("in/{i}.png")),
                destination: PathBuf::from(format!("out/{i}.jpg")),
            })
            .collect()
    }

    #[test]
    fn zero_workers_rejected() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn one_failure_does_not_affect_siblings() {
        let pool = WorkerPool::new(3).unwrap();
        let report = pool.run(
            tasks(5),
            |task| {
                if task.source.ends_with("3.png") {
                    Err(Error::decode(&task.source, "truncated"))
                } else {
                    Ok(())
                }
            },
            |_| {},
        );
        assert_eq!(report.completed(), 4);
        assert_eq!(report.failed(), 1);
        let (task, reason) = report.failures().next().unwrap();
        assert_eq!(task.source, PathBuf::from("in/3.png"));
        assert!(reason.contains("truncated"));
        // submission order is preserved
        let sources: Vec<_> = report.entries.iter().map(|e| e.task.source.clone()).collect();
        assert_eq!(sources, tasks(5).into_iter().map(|t| t.source).collect::<Vec<_>>());
    }

    #[test]
    fn panics_are_isolated() {
        let pool = WorkerPool::new(2).unwrap();
        let report = pool.run(
            tasks(4),
            |task| {
                if task.source.ends_with("2.png") {
                    panic!("decoder blew up");
                }
                Ok(())
            },
            |_| {},
        );
        assert_eq!(report.completed(), 3);
        assert!(matches!(
            report.outcome_of(&PathBuf::from("in/2.png")),
            Some(TaskOutcome::Failed { reason }) if reason.contains("decoder blew up")
        ));
    }

    #[test]
    fn progress_is_monotonic_and_complete() {
        let pool = WorkerPool::new(4).unwrap();
        let seen = Mutex::new(Vec::new());
        pool.run(tasks(20), |_| Ok(()), |p| seen.lock().unwrap().push(p));

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 20);
        assert!(seen.iter().all(|p| p.total == 20));
        let counts: Vec<usize> = seen.iter().map(|p| p.completed).collect();
        assert_eq!(counts, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn slow_progress_callback_cannot_reorder_counts() {
        let pool = WorkerPool::new(2).unwrap();
        let seen = Mutex::new(Vec::new());
        pool.run(
            tasks(2),
            |_| Ok(()),
            |p| {
                if p.completed == 1 {
                    std::thread::sleep(Duration::from_millis(200));
                }
                seen.lock().unwrap().push(p.completed);
            },
        );
        assert_eq!(seen.into_inner().unwrap(), vec![1, 2]);
    }

    #[test]
    fn never_exceeds_worker_count() {
        let pool = WorkerPool::new(2).unwrap();
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        pool.run(
            tasks(8),
            |_| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(10));
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            },
            |_| {},
        );
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn cancelled_batch_runs_nothing() {
        let cancel = CancelToken::new();
        let pool = WorkerPool::new(2).unwrap().with_cancel_token(cancel.clone());
        cancel.cancel();
        let ran = AtomicUsize::new(0);
        let report = pool.run(
            tasks(5),
            |_| {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            |_| {},
        );
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(report.cancelled(), 5);
    }

    #[test]
    fn cancel_mid_run_stops_remaining_tasks() {
        let pool = WorkerPool::new(1).unwrap();
        let cancel = pool.cancel_token();
        let report = pool.run(
            tasks(6),
            |task| {
                if task.source.ends_with("2.png") {
                    cancel.cancel();
                }
                Ok(())
            },
            |_| {},
        );
        assert!(report.completed() >= 2);
        assert!(report.cancelled() >= 1);
        assert_eq!(report.completed() + report.cancelled(), 6);
    }
}
