use chrono::NaiveDate;
use lopdf::Document;
use rust_xlsxwriter::Workbook as XlsxWorkbook;

use billsheet::export::{
    document_file_name, document_title, layout_document, render_document, RenderOptions,
};
use billsheet::ingestion::{parse_workbook, ParseOptions};
use billsheet::types::{Record, Value};
use billsheet::BillError;

fn uncompressed() -> RenderOptions {
    RenderOptions {
        compress: false,
        ..Default::default()
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn line_items(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            [
                ("Description", Value::from(format!("Line item number {i}"))),
                ("Amount", Value::from(i as f64 * 1.5)),
            ]
            .into_iter()
            .collect()
        })
        .collect()
}

#[test]
fn empty_records_are_rejected() {
    let err = render_document(&[], "Bill", &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, BillError::EmptyInput { .. }));
}

#[test]
fn single_cell_document_has_one_row_and_one_page() {
    let records: Vec<Record> = vec![[("Total", Value::from(42i64))].into_iter().collect()];
    let opts = uncompressed();

    let layout = layout_document(&records, "Bill", &opts).unwrap();
    assert_eq!(layout.body_row_count(), 1);
    assert_eq!(layout.page_count(), 1);

    let pdf = render_document(&records, "Bill", &opts).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.5"));
    assert!(contains(&pdf, b"(Page 1 of 1)"));
    assert!(contains(&pdf, b"(Total)"));
    assert!(contains(&pdf, b"(42)"));

    let doc = Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn long_tables_paginate_with_final_page_count_in_every_footer() {
    let records = line_items(150);
    let opts = uncompressed();
    let pages = layout_document(&records, "Bill", &opts).unwrap().page_count();
    assert!(pages > 1);

    let pdf = render_document(&records, "Bill", &opts).unwrap();
    let doc = Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), pages);
    for i in 1..=pages {
        let footer = format!("(Page {i} of {pages})");
        assert!(contains(&pdf, footer.as_bytes()), "missing {footer}");
    }
}

#[test]
fn compressed_output_is_a_valid_pdf() {
    let records = line_items(40);
    let opts = RenderOptions::default();
    let pages = layout_document(&records, "Bill", &opts).unwrap().page_count();

    let pdf = render_document(&records, "Bill", &opts).unwrap();
    let doc = Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), pages);
}

#[test]
fn empty_sheet_from_a_workbook_cannot_be_rendered() {
    let mut wb = XlsxWorkbook::new();
    let jan = wb.add_worksheet();
    jan.set_name("Jan").unwrap();
    jan.write_string(0, 0, "Name").unwrap();
    for row in 1..=3u32 {
        jan.write_string(row, 0, format!("n{row}")).unwrap();
    }
    wb.add_worksheet().set_name("Feb").unwrap();
    let bytes = wb.save_to_buffer().unwrap();

    let parsed = parse_workbook(&bytes, &ParseOptions::default()).unwrap();
    let opts = RenderOptions::default();
    assert!(render_document(&parsed.sheet("Jan").unwrap().records, "Jan", &opts).is_ok());

    let err = render_document(&parsed.sheet("Feb").unwrap().records, "Feb", &opts).unwrap_err();
    assert!(matches!(err, BillError::EmptyInput { .. }));
}

#[test]
fn naming_follows_sheet_and_date() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    assert_eq!(document_file_name("Jan Bills", date), "jan_bills_2025-01-31.pdf");
    assert_eq!(document_title("Jan Bills", date), "Jan Bills - 1/31/2025");
}
