use rust_xlsxwriter::Workbook as XlsxWorkbook;

use crate::error::BillResult;
use crate::types::{Record, Value};

/// Sheet name used when the caller has no better label.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Write `records` into a single-sheet `.xlsx` named `sheet_label`.
///
/// The header row comes from the first record's keys; values of later records are looked up
/// by key. Blank (or missing) values are written as empty text cells, so a trailing row of
/// blanks stays inside the used range and [`crate::ingestion::parse_workbook`] reads it back
/// as a record of [`Value::Blank`]s.
///
/// Empty input produces a valid workbook with one empty sheet.
pub fn export_spreadsheet(records: &[Record], sheet_label: &str) -> BillResult<Vec<u8>> {
    let mut wb = XlsxWorkbook::new();
    let ws = wb.add_worksheet();
    ws.set_name(sheet_label)?;

    let columns: Vec<&str> = records.first().map(|r| r.keys().collect()).unwrap_or_default();
    for (col, label) in columns.iter().enumerate() {
        ws.write_string(0, col as u16, *label)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, label) in columns.iter().enumerate() {
            let col = col as u16;
            match record.get(label) {
                None | Some(Value::Blank) => {
                    ws.write_string(row, col, "")?;
                }
                Some(Value::Text(s)) => {
                    ws.write_string(row, col, s)?;
                }
                Some(Value::Number(n)) => {
                    ws.write_number(row, col, *n)?;
                }
                Some(Value::Bool(b)) => {
                    ws.write_boolean(row, col, *b)?;
                }
            }
        }
    }

    log::debug!(
        "exporting {} records x {} columns to sheet '{sheet_label}'",
        records.len(),
        columns.len()
    );
    Ok(wb.save_to_buffer()?)
}

/// Download name for an exported workbook.
pub fn spreadsheet_file_name(name: &str) -> String {
    format!("{name}.xlsx")
}
