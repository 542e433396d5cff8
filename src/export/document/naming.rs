use chrono::{Local, NaiveDate};

/// Today's date on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Replace every character outside `[A-Za-z0-9]` with `_` and lower-case the rest.
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Download name for a rendered bill: `{sheet_sanitized}_{YYYY-MM-DD}.pdf`.
///
/// Same sheet name on the same day gives the same file name.
pub fn document_file_name(sheet_name: &str, date: NaiveDate) -> String {
    format!("{}_{}.pdf", sanitize_file_stem(sheet_name), date.format("%Y-%m-%d"))
}

/// Title printed at the top of a rendered bill: `{sheet} - {M/D/YYYY}`.
pub fn document_title(sheet_name: &str, date: NaiveDate) -> String {
    format!("{sheet_name} - {}", date.format("%-m/%-d/%Y"))
}
