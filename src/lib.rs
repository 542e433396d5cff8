//! `billsheet` turns loosely-structured spreadsheets into uniform records and back out into
//! single-sheet workbooks or paginated PDF bills.
//!
//! ## Pipeline
//!
//! 1. [`ingestion::parse_workbook`] decodes `.xlsx`/`.xls` bytes (also `.xlsm`, `.xlsb`,
//!    `.ods`) and normalizes every sheet: the first row is the header, every later row becomes
//!    a [`types::Record`] with exactly the header's keys, missing cells are
//!    [`types::Value::Blank`].
//! 2. A front end picks a sheet (see [`session::Session`]) and shows a preview.
//! 3. [`export::render_document`] lays the records out as an A4 table with a title, banded
//!    rows and `Page i of n` footers; [`export::export_spreadsheet`] writes them back to a
//!    single-sheet `.xlsx`.
//!
//! Parsing can run off the caller's thread through [`execution::ParseWorker`].
//!
//! ## Quick example
//!
//! ```rust
//! use billsheet::export::{export_spreadsheet, layout_document, RenderOptions};
//! use billsheet::ingestion::{parse_workbook, ParseOptions};
//! use billsheet::types::{Record, Value};
//!
//! let records: Vec<Record> = vec![
//!     [("Name", Value::from("A")), ("Amount", Value::from(100i64))].into_iter().collect(),
//!     [("Name", Value::from("B")), ("Amount", Value::Blank)].into_iter().collect(),
//! ];
//!
//! let xlsx = export_spreadsheet(&records, "Sheet1").unwrap();
//! let workbook = parse_workbook(&xlsx, &ParseOptions::default()).unwrap();
//! assert_eq!(workbook.sheet("Sheet1").unwrap().records, records);
//!
//! let layout = layout_document(&records, "Bill", &RenderOptions::default()).unwrap();
//! assert_eq!(layout.footer(0), "Page 1 of 1");
//! ```
//!
//! ## Modules
//!
//! - [`types`]: `Value`, `Record`, `Sheet`, `Workbook`
//! - [`ingestion`]: cell coercion, sheet normalization, workbook parsing, observers
//! - [`export`]: spreadsheet exporter and PDF renderer
//! - [`execution`]: background parse worker
//! - [`session`]: headless upload/preview/export state machine
//! - [`error`]: the crate-wide error type

pub mod error;
pub mod execution;
pub mod export;
pub mod ingestion;
pub mod session;
pub mod types;

pub use error::{BillError, BillResult};
pub use export::{export_spreadsheet, render_document};
pub use ingestion::parse_workbook;
