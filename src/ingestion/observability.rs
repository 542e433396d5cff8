use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::BillError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl IngestionSeverity {
    /// Classify a failed parse.
    pub fn for_error(e: &BillError) -> Self {
        match e {
            BillError::Io(_) => IngestionSeverity::Critical,
            BillError::Excel(calamine::Error::Io(_)) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        }
    }
}

/// Context about a parse attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Human-readable source label (file name or path).
    pub source: String,
    /// Size of the input buffer.
    pub bytes: usize,
}

/// Minimal stats reported on a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of sheets in the workbook.
    pub sheets: usize,
    /// Number of records across all sheets.
    pub rows: usize,
}

/// Observer interface for parse outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when a parse succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when a parse fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &BillError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &BillError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &BillError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &BillError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs parse events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!(
            "[parse][ok] source={} bytes={} sheets={} rows={}",
            ctx.source, ctx.bytes, stats.sheets, stats.rows
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &BillError) {
        eprintln!(
            "[parse][{:?}] source={} bytes={} err={}",
            severity, ctx.source, ctx.bytes, error
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &BillError) {
        eprintln!(
            "[ALERT][parse][{:?}] source={} bytes={} err={}",
            severity, ctx.source, ctx.bytes, error
        );
    }
}

/// Forwards parse events to the [`log`] facade: `info` on success, `error` for
/// [`IngestionSeverity::Critical`] failures and `warn` for the rest.
#[derive(Debug, Default)]
pub struct LogObserver;

impl IngestionObserver for LogObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        log::info!(
            "parsed {} ({} bytes): {} sheets, {} rows",
            ctx.source,
            ctx.bytes,
            stats.sheets,
            stats.rows
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &BillError) {
        log::log!(log_level(severity), "failed to parse {} ({:?}): {}", ctx.source, severity, error);
    }
}

fn log_level(severity: IngestionSeverity) -> log::Level {
    match severity {
        IngestionSeverity::Critical => log::Level::Error,
        IngestionSeverity::Error | IngestionSeverity::Warning => log::Level::Warn,
        IngestionSeverity::Info => log::Level::Info,
    }
}

/// Appends parse events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append_line(&format!(
            "{} ok source={} bytes={} sheets={} rows={}",
            unix_ts(),
            ctx.source,
            ctx.bytes,
            stats.sheets,
            stats.rows
        ));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &BillError) {
        self.append_line(&format!(
            "{} fail severity={:?} source={} err={}",
            unix_ts(),
            severity,
            ctx.source,
            error
        ));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &BillError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} source={} err={}",
            unix_ts(),
            severity,
            ctx.source,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::{log_level, IngestionSeverity};
    use crate::error::BillError;

    #[test]
    fn io_failures_are_critical_and_log_at_error() {
        let io = BillError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let sev = IngestionSeverity::for_error(&io);
        assert_eq!(sev, IngestionSeverity::Critical);
        assert_eq!(log_level(sev), log::Level::Error);
    }

    #[test]
    fn input_failures_log_at_warn() {
        let parse = BillError::Parse {
            message: "workbook has no sheets".to_string(),
        };
        let sev = IngestionSeverity::for_error(&parse);
        assert_eq!(sev, IngestionSeverity::Error);
        assert_eq!(log_level(sev), log::Level::Warn);
    }
}
