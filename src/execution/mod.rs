//! Background parsing.
//!
//! [`ParseWorker`] moves workbook decoding and normalization off the caller's thread. Callers
//! hand over a [`ParseRequest`] (owned bytes plus a source label) and get back a
//! [`ParseHandle`] that resolves to either a [`ParseResponse`] or an [`ErrorResponse`].
//!
//! Each job builds all of its state locally; the worker shares only its counters and the
//! optional observer between jobs.

mod observer;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use serde::Serialize;

use crate::error::{BillError, BillResult};
use crate::ingestion::{parse_with_source, IngestionSeverity, ParseOptions};
use crate::types::Workbook;

pub use observer::{StdErrWorkerObserver, WorkerEvent, WorkerMetrics, WorkerMetricsSnapshot, WorkerObserver};

/// Configuration for the [`ParseWorker`].
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Number of background threads. One is enough for a single interactive user.
    pub num_threads: usize,
    /// Options applied to every parse.
    pub parse: ParseOptions,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            num_threads: 1,
            parse: ParseOptions::default(),
        }
    }
}

/// A spreadsheet to parse.
#[derive(Debug, Clone)]
pub struct ParseRequest {
    /// Label used in responses and observer events (usually the file name).
    pub source: String,
    pub bytes: Vec<u8>,
}

impl ParseRequest {
    pub fn new(source: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            bytes,
        }
    }

    /// Read `path` into a request labelled with the file name.
    pub fn from_path(path: impl AsRef<Path>) -> BillResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { source, bytes })
    }
}

/// Successful parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResponse {
    pub request_id: u64,
    pub source: String,
    pub workbook: Workbook,
}

/// Failed parse, reduced to a user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub request_id: u64,
    pub source: String,
    pub severity: IngestionSeverity,
    pub message: String,
}

/// What a [`ParseHandle`] resolves to.
pub type ParseOutcome = Result<ParseResponse, ErrorResponse>;

/// Pending result of a submitted parse.
#[derive(Debug)]
pub struct ParseHandle {
    request_id: u64,
    source: String,
    rx: Receiver<ParseOutcome>,
}

impl ParseHandle {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Block until the parse finishes.
    pub fn wait(self) -> ParseOutcome {
        match self.rx.recv() {
            Ok(outcome) => outcome,
            Err(_) => Err(self.lost()),
        }
    }

    /// Return the result if it is ready, without blocking.
    pub fn try_result(&self) -> Option<ParseOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.lost())),
        }
    }

    /// Block for at most `timeout`. `None` means the parse is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ParseOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(self.lost())),
        }
    }

    fn lost(&self) -> ErrorResponse {
        let err = BillError::Worker {
            message: "parse task ended without a result".to_string(),
        };
        ErrorResponse {
            request_id: self.request_id,
            source: self.source.clone(),
            severity: IngestionSeverity::Critical,
            message: err.to_string(),
        }
    }
}

/// Runs workbook parses on a dedicated thread pool.
pub struct ParseWorker {
    pool: ThreadPool,
    parse: ParseOptions,
    next_id: AtomicU64,
    observer: Option<Arc<dyn WorkerObserver>>,
    metrics: Arc<WorkerMetrics>,
}

impl ParseWorker {
    /// Create a worker. Fails if the thread pool cannot be built.
    pub fn new(opts: WorkerOptions) -> BillResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.max(1))
            .thread_name(|i| format!("billsheet-parse-{i}"))
            .build()
            .map_err(|e| BillError::Worker {
                message: format!("failed to build thread pool: {e}"),
            })?;

        Ok(Self {
            pool,
            parse: opts.parse,
            next_id: AtomicU64::new(0),
            observer: None,
            metrics: Arc::new(WorkerMetrics::new()),
        })
    }

    /// Attach an observer for worker events.
    pub fn with_observer(mut self, observer: Arc<dyn WorkerObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to the worker's counters.
    pub fn metrics(&self) -> Arc<WorkerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Queue `request` and return immediately.
    pub fn submit(&self, request: ParseRequest) -> ParseHandle {
        let request_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = mpsc::channel();

        self.metrics.on_submit();
        emit(
            &self.observer,
            WorkerEvent::Submitted {
                request_id,
                source: request.source.clone(),
                bytes: request.bytes.len(),
            },
        );

        let handle = ParseHandle {
            request_id,
            source: request.source.clone(),
            rx,
        };

        let parse = self.parse.clone();
        let observer = self.observer.clone();
        let metrics = Arc::clone(&self.metrics);
        self.pool.spawn(move || {
            metrics.on_job_start();
            emit(&observer, WorkerEvent::Started { request_id });
            let start = Instant::now();

            let outcome = run_job(request_id, request, &parse);

            let elapsed = start.elapsed();
            metrics.on_job_end(outcome.is_ok(), elapsed);
            emit(
                &observer,
                WorkerEvent::Finished {
                    request_id,
                    succeeded: outcome.is_ok(),
                    elapsed,
                },
            );
            // The caller may have dropped the handle; nobody is left to tell.
            let _ = tx.send(outcome);
        });

        handle
    }

    /// Submit and wait.
    pub fn parse_blocking(&self, request: ParseRequest) -> ParseOutcome {
        self.submit(request).wait()
    }
}

fn run_job(request_id: u64, request: ParseRequest, parse: &ParseOptions) -> ParseOutcome {
    let ParseRequest { source, bytes } = request;
    let result = catch_unwind(AssertUnwindSafe(|| parse_with_source(&source, &bytes, parse)));

    match result {
        Ok(Ok(workbook)) => Ok(ParseResponse {
            request_id,
            source,
            workbook,
        }),
        Ok(Err(e)) => Err(ErrorResponse {
            request_id,
            severity: IngestionSeverity::for_error(&e),
            message: e.to_string(),
            source,
        }),
        Err(_) => {
            log::error!("parse of '{source}' panicked");
            Err(ErrorResponse {
                request_id,
                source,
                severity: IngestionSeverity::Critical,
                message: "parse task panicked".to_string(),
            })
        }
    }
}

fn emit(observer: &Option<Arc<dyn WorkerObserver>>, event: WorkerEvent) {
    if let Some(obs) = observer {
        obs.on_event(&event);
    }
}
