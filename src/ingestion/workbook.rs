//! Workbook parser: bytes in, [`Workbook`] out.
//!
//! Most callers should use [`parse_workbook`] (in-memory buffer) or
//! [`parse_workbook_from_path`]. Both:
//!
//! - auto-detect the container (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`)
//! - normalize every sheet, in file order, with [`super::normalize_rows`]; the grid is the
//!   sheet's rectangular used range, so data right of the last header label is keyed `""`
//! - optionally report success/failure/alerts to an [`IngestionObserver`]

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use calamine::{open_workbook_auto_from_rs, Reader};

use crate::error::{BillError, BillResult};
use crate::types::Workbook;

use super::normalize::normalize_rows;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Options controlling workbook parsing.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ParseOptions {
    /// Reject inputs larger than this many bytes. `None` (default) means no limit.
    pub max_input_bytes: Option<usize>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("max_input_bytes", &self.max_input_bytes)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Parse an in-memory spreadsheet into a [`Workbook`].
///
/// Every sheet in the file appears in the result, in file order; a sheet without rows maps
/// to an empty [`crate::types::Sheet`]. The whole call either succeeds or fails: there is no
/// partially-parsed workbook.
///
/// # Examples
///
/// ```no_run
/// use billsheet::ingestion::{parse_workbook, ParseOptions};
///
/// # fn main() -> Result<(), billsheet::BillError> {
/// let bytes = std::fs::read("bill.xlsx")?;
/// let workbook = parse_workbook(&bytes, &ParseOptions::default())?;
/// for (name, sheet) in workbook.iter() {
///     println!("{name}: {} rows", sheet.row_count());
/// }
/// # Ok(())
/// # }
/// ```
pub fn parse_workbook(bytes: &[u8], options: &ParseOptions) -> BillResult<Workbook> {
    parse_with_source("<memory>", bytes, options)
}

/// Read a spreadsheet file and parse it with [`parse_workbook`].
///
/// A read failure is reported as [`BillError::Io`].
pub fn parse_workbook_from_path(path: impl AsRef<Path>, options: &ParseOptions) -> BillResult<Workbook> {
    let path = path.as_ref();
    let source = path.display().to_string();
    match std::fs::read(path) {
        Ok(bytes) => parse_with_source(&source, &bytes, options),
        Err(e) => {
            let err = BillError::from(e);
            report(options, &IngestionContext { source, bytes: 0 }, Err(&err));
            Err(err)
        }
    }
}

/// Parse `bytes`, labelling observer events with `source`.
pub fn parse_with_source(source: &str, bytes: &[u8], options: &ParseOptions) -> BillResult<Workbook> {
    let ctx = IngestionContext {
        source: source.to_string(),
        bytes: bytes.len(),
    };

    let result = decode(bytes, options.max_input_bytes);
    match &result {
        Ok(wb) => report(options, &ctx, Ok(wb)),
        Err(e) => report(options, &ctx, Err(e)),
    }
    result
}

fn decode(bytes: &[u8], max_input_bytes: Option<usize>) -> BillResult<Workbook> {
    if let Some(limit) = max_input_bytes {
        if bytes.len() > limit {
            return Err(BillError::InputTooLarge {
                size: bytes.len(),
                limit,
            });
        }
    }

    let mut source = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let names: Vec<String> = source.sheet_names().to_vec();
    if names.is_empty() {
        return Err(BillError::Parse {
            message: "workbook has no sheets".to_string(),
        });
    }

    let mut workbook = Workbook::new();
    for name in names {
        let range = source.worksheet_range(&name)?;
        let sheet = normalize_rows(range.rows());
        log::debug!(
            "sheet '{name}': {}x{} cells -> {} records",
            range.height(),
            range.width(),
            sheet.row_count()
        );
        workbook.push_sheet(name, sheet);
    }

    Ok(workbook)
}

fn report(options: &ParseOptions, ctx: &IngestionContext, outcome: Result<&Workbook, &BillError>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match outcome {
        Ok(wb) => obs.on_success(
            ctx,
            IngestionStats {
                sheets: wb.sheet_count(),
                rows: wb.total_rows(),
            },
        ),
        Err(e) => {
            let sev = IngestionSeverity::for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}
