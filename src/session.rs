//! Headless session controller.
//!
//! A [`Session`] is the state machine a front end drives:
//!
//! ```text
//! Idle ──upload──▶ Processing ──ok──▶ Success ──upload──▶ Processing
//!                      │  ▲                │
//!                      │  └──upload────────┘ (a newer upload supersedes the pending one)
//!                      └──err──▶ Error ──reset──▶ Idle
//! ```
//!
//! It holds the parsed workbook and the active sheet, builds previews, and produces
//! downloadable [`Artifact`]s. A failed render or export moves the session to `Error`.

use std::fmt;

use chrono::NaiveDate;

use crate::error::{BillError, BillResult};
use crate::execution::{ParseHandle, ParseOutcome, ParseRequest, ParseWorker};
use crate::export::{
    document_file_name, document_title, export_spreadsheet, render_document, spreadsheet_file_name,
    RenderOptions, DEFAULT_SHEET_NAME,
};
use crate::types::{Record, Sheet, Workbook};

/// Number of records shown in a preview.
pub const PREVIEW_ROWS: usize = 10;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Processing { request_id: u64 },
    Success,
    Error { message: String },
}

impl SessionStatus {
    pub fn name(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Processing { .. } => "processing",
            SessionStatus::Success => "success",
            SessionStatus::Error { .. } => "error",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First rows of the active sheet, borrowed from the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview<'a> {
    pub sheet_name: &'a str,
    pub columns: Vec<&'a str>,
    pub rows: &'a [Record],
    /// Records not shown.
    pub remaining: usize,
}

/// A generated file ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Upload → preview → export state machine.
#[derive(Debug, Default)]
pub struct Session {
    status: SessionStatus,
    workbook: Option<Workbook>,
    active_sheet: Option<String>,
    render_options: RenderOptions,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_render_options(render_options: RenderOptions) -> Self {
        Self {
            render_options,
            ..Self::default()
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn workbook(&self) -> Option<&Workbook> {
        self.workbook.as_ref()
    }

    pub fn active_sheet(&self) -> Option<&str> {
        self.active_sheet.as_deref()
    }

    /// Submit `request` to `worker` and move to `Processing`.
    ///
    /// Allowed from `Idle`, `Success` and `Processing` (the new upload supersedes the
    /// pending one). From `Error`, call [`Session::reset`] first.
    pub fn upload(&mut self, worker: &ParseWorker, request: ParseRequest) -> BillResult<ParseHandle> {
        self.ensure_can_upload()?;
        let handle = worker.submit(request);
        self.begin_upload(handle.request_id())?;
        Ok(handle)
    }

    /// Move to `Processing` for a parse identified by `request_id`.
    pub fn begin_upload(&mut self, request_id: u64) -> BillResult<()> {
        self.ensure_can_upload()?;
        self.workbook = None;
        self.active_sheet = None;
        self.status = SessionStatus::Processing { request_id };
        Ok(())
    }

    /// Apply a parse result.
    ///
    /// Returns `false` (and changes nothing) when the result does not belong to the upload
    /// currently in flight, e.g. a slower earlier upload finishing after a newer one.
    pub fn complete(&mut self, outcome: ParseOutcome) -> bool {
        let outcome_id = match &outcome {
            Ok(resp) => resp.request_id,
            Err(err) => err.request_id,
        };
        match self.status {
            SessionStatus::Processing { request_id } if request_id == outcome_id => {}
            _ => {
                log::debug!("ignoring stale parse result {outcome_id} (session is {})", self.status);
                return false;
            }
        }

        match outcome {
            Ok(resp) => {
                self.active_sheet = resp.workbook.first_sheet_name().map(str::to_string);
                self.workbook = Some(resp.workbook);
                self.status = SessionStatus::Success;
            }
            Err(err) => {
                log::warn!("parse of '{}' failed: {}", err.source, err.message);
                self.workbook = None;
                self.active_sheet = None;
                self.status = SessionStatus::Error { message: err.message };
            }
        }
        true
    }

    /// Leave `Error` for `Idle`, dropping any loaded data.
    pub fn reset(&mut self) -> BillResult<()> {
        if !matches!(self.status, SessionStatus::Error { .. }) {
            return Err(self.invalid("reset"));
        }
        self.workbook = None;
        self.active_sheet = None;
        self.status = SessionStatus::Idle;
        Ok(())
    }

    /// Make `name` the active sheet.
    pub fn select_sheet(&mut self, name: &str) -> BillResult<()> {
        let workbook = self.loaded("select a sheet")?;
        if workbook.sheet(name).is_none() {
            return Err(BillError::UnknownSheet { name: name.to_string() });
        }
        self.active_sheet = Some(name.to_string());
        Ok(())
    }

    /// The first [`PREVIEW_ROWS`] records of the active sheet.
    pub fn preview(&self) -> Option<Preview<'_>> {
        let (name, sheet) = self.active()?;
        let rows = sheet.preview(PREVIEW_ROWS);
        Some(Preview {
            sheet_name: name,
            columns: sheet.columns(),
            rows,
            remaining: sheet.row_count() - rows.len(),
        })
    }

    /// Render the active sheet as a PDF bill dated `date`.
    pub fn generate_document(&mut self, date: NaiveDate) -> BillResult<Artifact> {
        self.loaded("generate a document")?;
        let result = self.active_or_err().and_then(|(name, sheet)| {
            let bytes = render_document(&sheet.records, &document_title(name, date), &self.render_options)?;
            Ok(Artifact {
                file_name: document_file_name(name, date),
                content_type: PDF_CONTENT_TYPE,
                bytes,
            })
        });
        self.settle(result)
    }

    /// Export the active sheet as a single-sheet workbook downloaded as `{name}.xlsx`.
    pub fn export_spreadsheet(&mut self, name: &str) -> BillResult<Artifact> {
        self.loaded("export a spreadsheet")?;
        let result = self.active_or_err().and_then(|(_, sheet)| {
            let bytes = export_spreadsheet(&sheet.records, DEFAULT_SHEET_NAME)?;
            Ok(Artifact {
                file_name: spreadsheet_file_name(name),
                content_type: XLSX_CONTENT_TYPE,
                bytes,
            })
        });
        self.settle(result)
    }

    fn settle(&mut self, result: BillResult<Artifact>) -> BillResult<Artifact> {
        if let Err(e) = &result {
            log::warn!("session action failed: {e}");
            self.status = SessionStatus::Error { message: e.to_string() };
        }
        result
    }

    fn active(&self) -> Option<(&str, &Sheet)> {
        let name = self.active_sheet.as_deref()?;
        let sheet = self.workbook.as_ref()?.sheet(name)?;
        Some((name, sheet))
    }

    fn active_or_err(&self) -> BillResult<(&str, &Sheet)> {
        self.active().ok_or_else(|| BillError::UnknownSheet {
            name: self.active_sheet.clone().unwrap_or_default(),
        })
    }

    fn loaded(&self, action: &'static str) -> BillResult<&Workbook> {
        match (&self.status, &self.workbook) {
            (SessionStatus::Success, Some(wb)) => Ok(wb),
            _ => Err(self.invalid(action)),
        }
    }

    fn ensure_can_upload(&self) -> BillResult<()> {
        match self.status {
            SessionStatus::Error { .. } => Err(self.invalid("upload")),
            _ => Ok(()),
        }
    }

    fn invalid(&self, action: &'static str) -> BillError {
        BillError::InvalidTransition {
            from: self.status.name(),
            action,
        }
    }
}
