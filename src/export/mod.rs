//! Output side of the pipeline.
//!
//! - [`spreadsheet`]: records → single-sheet `.xlsx` (the inverse of ingestion)
//! - [`document`]: records → paginated PDF bill

pub mod document;
pub mod spreadsheet;

pub use document::{
    document_file_name, document_title, layout_document, render_document, today, DocumentLayout, PageSize,
    RenderOptions, Rgb,
};
pub use spreadsheet::{export_spreadsheet, spreadsheet_file_name, DEFAULT_SHEET_NAME};
