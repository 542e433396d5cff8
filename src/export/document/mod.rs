//! Document renderer: records → paginated A4 PDF bill.
//!
//! Rendering runs in two passes. [`layout_document`] computes columns, wraps text and
//! paginates; [`write_pdf`] then draws each page and stamps `Page {i} of {n}` footers, which
//! are only known once pagination is complete.

mod layout;
mod metrics;
mod naming;
mod options;
mod pdf;

use crate::error::BillResult;
use crate::types::Record;

pub use layout::{
    footer_text, layout_document, wrap_text, ColumnLayout, DocumentLayout, PageLayout, RowKind, RowLayout,
};
pub use metrics::{text_width, FontFace};
pub use naming::{document_file_name, document_title, sanitize_file_stem, today};
pub use options::{mm, PageSize, RenderOptions, Rgb};
pub use pdf::write_pdf;

/// Render `records` as a paginated PDF titled `title`.
///
/// Columns are the keys of the first record. Fails with
/// [`crate::BillError::EmptyInput`] when `records` is empty, so callers should check
/// [`crate::types::Sheet::is_empty`] before offering a download.
///
/// ```no_run
/// use billsheet::export::{document_file_name, document_title, render_document, today, RenderOptions};
/// use billsheet::ingestion::{parse_workbook, ParseOptions};
///
/// # fn main() -> Result<(), billsheet::BillError> {
/// let workbook = parse_workbook(&std::fs::read("bill.xlsx")?, &ParseOptions::default())?;
/// let sheet = workbook.sheet("Jan").expect("sheet exists");
/// let pdf = render_document(&sheet.records, &document_title("Jan", today()), &RenderOptions::default())?;
/// std::fs::write(document_file_name("Jan", today()), pdf)?;
/// # Ok(())
/// # }
/// ```
pub fn render_document(records: &[Record], title: &str, options: &RenderOptions) -> BillResult<Vec<u8>> {
    let layout = layout_document(records, title, options)?;
    log::debug!(
        "rendering '{title}': {} rows, {} columns, {} pages",
        layout.body_row_count(),
        layout.columns.len(),
        layout.page_count()
    );
    write_pdf(&layout, options)
}
