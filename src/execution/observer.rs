use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Events emitted by the [`super::ParseWorker`] over a job's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Submitted { request_id: u64, source: String, bytes: usize },
    Started { request_id: u64 },
    Finished {
        request_id: u64,
        succeeded: bool,
        elapsed: Duration,
    },
}

/// Observer hook for worker events.
pub trait WorkerObserver: Send + Sync {
    fn on_event(&self, event: &WorkerEvent);
}

/// A simple stderr logger for worker events.
#[derive(Default)]
pub struct StdErrWorkerObserver;

impl WorkerObserver for StdErrWorkerObserver {
    fn on_event(&self, event: &WorkerEvent) {
        eprintln!("{event:?}");
    }
}

/// Running counters for a worker.
///
/// The worker updates these while jobs run; callers can snapshot them at any time.
pub struct WorkerMetrics {
    jobs_submitted: AtomicU64,
    jobs_succeeded: AtomicU64,
    jobs_failed: AtomicU64,
    busy_ns: AtomicU64,

    active_jobs: AtomicUsize,
    max_active_jobs: AtomicUsize,
}

impl WorkerMetrics {
    pub fn new() -> Self {
        Self {
            jobs_submitted: AtomicU64::new(0),
            jobs_succeeded: AtomicU64::new(0),
            jobs_failed: AtomicU64::new(0),
            busy_ns: AtomicU64::new(0),
            active_jobs: AtomicUsize::new(0),
            max_active_jobs: AtomicUsize::new(0),
        }
    }

    pub fn on_submit(&self) {
        let _ = self.jobs_submitted.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_job_start(&self) {
        let now = self.active_jobs.fetch_add(1, Ordering::SeqCst) + 1;
        update_max_usize(&self.max_active_jobs, now);
    }

    pub fn on_job_end(&self, succeeded: bool, elapsed: Duration) {
        let counter = if succeeded { &self.jobs_succeeded } else { &self.jobs_failed };
        let _ = counter.fetch_add(1, Ordering::SeqCst);
        let add = elapsed.as_nanos().min(u64::MAX as u128) as u64;
        let _ = self.busy_ns.fetch_add(add, Ordering::SeqCst);
        let _ = self.active_jobs.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> WorkerMetricsSnapshot {
        WorkerMetricsSnapshot {
            jobs_submitted: self.jobs_submitted.load(Ordering::SeqCst),
            jobs_succeeded: self.jobs_succeeded.load(Ordering::SeqCst),
            jobs_failed: self.jobs_failed.load(Ordering::SeqCst),
            busy: Duration::from_nanos(self.busy_ns.load(Ordering::SeqCst)),
            active_jobs: self.active_jobs.load(Ordering::SeqCst),
            max_active_jobs: self.max_active_jobs.load(Ordering::SeqCst),
        }
    }
}

impl Default for WorkerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn update_max_usize(dst: &AtomicUsize, now: usize) {
    loop {
        let cur = dst.load(Ordering::SeqCst);
        if now <= cur {
            break;
        }
        if dst.compare_exchange(cur, now, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            break;
        }
    }
}

/// Immutable snapshot of [`WorkerMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerMetricsSnapshot {
    pub jobs_submitted: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
    pub busy: Duration,
    pub active_jobs: usize,
    pub max_active_jobs: usize,
}

impl fmt::Display for WorkerMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "jobs={}/{} ok, failed={}, active={}, max_active={}, busy={:?}",
            self.jobs_succeeded,
            self.jobs_submitted,
            self.jobs_failed,
            self.active_jobs,
            self.max_active_jobs,
            self.busy
        )
    }
}
