use chrono::NaiveDate;
use rust_xlsxwriter::Workbook as XlsxWorkbook;

use billsheet::execution::{ErrorResponse, ParseRequest, ParseWorker, WorkerOptions};
use billsheet::export::RenderOptions;
use billsheet::ingestion::IngestionSeverity;
use billsheet::session::{Session, SessionStatus, PDF_CONTENT_TYPE, PREVIEW_ROWS, XLSX_CONTENT_TYPE};
use billsheet::BillError;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
}

/// `Jan` with 25 data rows, then an empty `Feb`.
fn workbook_bytes() -> Vec<u8> {
    let mut wb = XlsxWorkbook::new();
    let jan = wb.add_worksheet();
    jan.set_name("Jan").unwrap();
    jan.write_string(0, 0, "Name").unwrap();
    jan.write_string(0, 1, "Amount").unwrap();
    for row in 1..=25u32 {
        jan.write_string(row, 0, format!("customer {row}")).unwrap();
        jan.write_number(row, 1, row as f64 * 10.0).unwrap();
    }
    wb.add_worksheet().set_name("Feb").unwrap();
    wb.save_to_buffer().unwrap()
}

fn loaded_session(worker: &ParseWorker) -> Session {
    let mut session = Session::new();
    let handle = session
        .upload(worker, ParseRequest::new("bill.xlsx", workbook_bytes()))
        .unwrap();
    assert!(matches!(session.status(), SessionStatus::Processing { .. }));
    assert!(session.complete(handle.wait()));
    session
}

#[test]
fn upload_selects_first_sheet_and_previews_ten_rows() {
    let worker = ParseWorker::new(WorkerOptions::default()).unwrap();
    let session = loaded_session(&worker);

    assert_eq!(session.status(), &SessionStatus::Success);
    assert_eq!(session.active_sheet(), Some("Jan"));

    let preview = session.preview().unwrap();
    assert_eq!(preview.columns, vec!["Name", "Amount"]);
    assert_eq!(preview.rows.len(), PREVIEW_ROWS);
    assert_eq!(preview.remaining, 15);

    // The preview must not have truncated the sheet used for export.
    assert_eq!(session.workbook().unwrap().sheet("Jan").unwrap().row_count(), 25);
}

#[test]
fn generates_pdf_and_xlsx_artifacts() {
    let worker = ParseWorker::new(WorkerOptions::default()).unwrap();
    let mut session = loaded_session(&worker);

    let pdf = session.generate_document(date()).unwrap();
    assert_eq!(pdf.file_name, "jan_2024-05-02.pdf");
    assert_eq!(pdf.content_type, PDF_CONTENT_TYPE);
    assert!(pdf.bytes.starts_with(b"%PDF"));

    let xlsx = session.export_spreadsheet("jan-export").unwrap();
    assert_eq!(xlsx.file_name, "jan-export.xlsx");
    assert_eq!(xlsx.content_type, XLSX_CONTENT_TYPE);
    assert_eq!(session.status(), &SessionStatus::Success);
}

#[test]
fn render_options_flow_into_generated_documents() {
    let worker = ParseWorker::new(WorkerOptions::default()).unwrap();
    let opts = RenderOptions {
        compress: false,
        ..Default::default()
    };
    let mut session = Session::with_render_options(opts);
    let handle = session
        .upload(&worker, ParseRequest::new("bill.xlsx", workbook_bytes()))
        .unwrap();
    assert!(session.complete(handle.wait()));

    let pdf = session.generate_document(date()).unwrap();
    let footer: &[u8] = b"(Page 1 of 1)";
    assert!(pdf.bytes.windows(footer.len()).any(|w| w == footer));
    assert!(pdf.bytes.windows(6).any(|w| w == b"(Jan -"));
}

#[test]
fn rendering_an_empty_sheet_moves_to_error_then_reset_to_idle() {
    let worker = ParseWorker::new(WorkerOptions::default()).unwrap();
    let mut session = loaded_session(&worker);

    session.select_sheet("Feb").unwrap();
    let err = session.generate_document(date()).unwrap_err();
    assert!(matches!(err, BillError::EmptyInput { .. }));
    assert!(matches!(session.status(), SessionStatus::Error { .. }));

    // Error only leaves through reset.
    let err = session
        .upload(&worker, ParseRequest::new("again.xlsx", workbook_bytes()))
        .unwrap_err();
    assert!(matches!(err, BillError::InvalidTransition { from: "error", .. }));

    session.reset().unwrap();
    assert_eq!(session.status(), &SessionStatus::Idle);
    assert!(session.workbook().is_none());
}

#[test]
fn unknown_sheet_is_rejected() {
    let worker = ParseWorker::new(WorkerOptions::default()).unwrap();
    let mut session = loaded_session(&worker);

    let err = session.select_sheet("Mar").unwrap_err();
    assert!(matches!(err, BillError::UnknownSheet { .. }));
    assert_eq!(session.active_sheet(), Some("Jan"));
}

#[test]
fn failed_parse_lands_in_error_without_data() {
    let worker = ParseWorker::new(WorkerOptions::default()).unwrap();
    let mut session = Session::new();

    let handle = session
        .upload(&worker, ParseRequest::new("broken.xlsx", b"garbage".to_vec()))
        .unwrap();
    assert!(session.complete(handle.wait()));

    assert!(matches!(session.status(), SessionStatus::Error { .. }));
    assert!(session.workbook().is_none());
    assert!(session.preview().is_none());
}

#[test]
fn newer_upload_wins_over_stale_result() {
    let worker = ParseWorker::new(WorkerOptions::default()).unwrap();
    let mut session = Session::new();

    let first = session
        .upload(&worker, ParseRequest::new("old.xlsx", b"garbage".to_vec()))
        .unwrap();
    let second = session
        .upload(&worker, ParseRequest::new("new.xlsx", workbook_bytes()))
        .unwrap();

    assert!(!session.complete(first.wait()));
    assert!(matches!(session.status(), SessionStatus::Processing { .. }));

    assert!(session.complete(second.wait()));
    assert_eq!(session.status(), &SessionStatus::Success);
}

#[test]
fn actions_before_a_workbook_is_loaded_are_invalid() {
    let mut session = Session::new();

    assert!(matches!(
        session.generate_document(date()),
        Err(BillError::InvalidTransition { from: "idle", .. })
    ));
    assert!(matches!(session.reset(), Err(BillError::InvalidTransition { .. })));
    assert!(!session.complete(Err(ErrorResponse {
        request_id: 99,
        source: "x".to_string(),
        severity: IngestionSeverity::Error,
        message: "boom".to_string(),
    })));
    assert_eq!(session.status(), &SessionStatus::Idle);
}
