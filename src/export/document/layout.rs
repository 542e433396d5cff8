//! Pure layout pass: records in, pages of positioned rows out.
//!
//! Nothing here touches PDF objects, so pagination can be inspected (and tested) directly.
//! Page footers depend on the final page count and are produced by [`DocumentLayout::footer`]
//! once layout has finished.

use crate::error::{BillError, BillResult};
use crate::types::Record;

use super::metrics::{text_width, FontFace};
use super::options::RenderOptions;

/// One table column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub label: String,
    /// Left edge, in points from the left page edge.
    pub x: f32,
    pub width: f32,
}

/// What a placed row holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// The header band (repeated at the top of every page).
    Header,
    /// A data row; `index` is the record's position in the input.
    Body { index: usize, striped: bool },
}

/// A row placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub kind: RowKind,
    /// Top edge, in points from the top of the page.
    pub top: f32,
    pub height: f32,
    /// Wrapped text lines, one entry per column.
    pub cells: Vec<Vec<String>>,
}

/// Rows placed on one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub rows: Vec<RowLayout>,
}

impl PageLayout {
    /// Data rows on this page (header band excluded).
    pub fn body_rows(&self) -> impl Iterator<Item = &RowLayout> {
        self.rows.iter().filter(|r| matches!(r.kind, RowKind::Body { .. }))
    }
}

/// Fully paginated document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub columns: Vec<ColumnLayout>,
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total data rows across all pages.
    pub fn body_row_count(&self) -> usize {
        self.pages.iter().map(|p| p.body_rows().count()).sum()
    }

    /// Footer stamp for the 0-based `page_index`.
    pub fn footer(&self, page_index: usize) -> String {
        footer_text(page_index + 1, self.page_count())
    }

    /// Right edge of the table.
    pub fn table_right(&self) -> f32 {
        self.columns.last().map(|c| c.x + c.width).unwrap_or_default()
    }
}

/// `Page {page} of {total}`.
pub fn footer_text(page: usize, total: usize) -> String {
    format!("Page {page} of {total}")
}

/// Lay out `records` as a paginated table.
///
/// Columns are the keys of `records[0]`, in order. Fails with [`BillError::EmptyInput`] when
/// `records` is empty and with [`BillError::LimitExceeded`] when the table needs more than
/// [`RenderOptions::max_pages`] pages.
pub fn layout_document(records: &[Record], title: &str, opts: &RenderOptions) -> BillResult<DocumentLayout> {
    let first = records
        .first()
        .ok_or(BillError::EmptyInput { operation: "render document" })?;
    let labels: Vec<&str> = first.keys().collect();

    let texts: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            labels
                .iter()
                .map(|l| r.get(l).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    let columns = size_columns(&labels, &texts, opts);
    let pad = opts.cell_padding;
    let advance = opts.line_advance();

    let header_cells: Vec<Vec<String>> = columns
        .iter()
        .map(|c| wrap_text(&c.label, FontFace::Bold, opts.font_size, c.width - 2.0 * pad))
        .collect();
    let header_height = row_height(&header_cells, advance, pad);

    let body_space = opts.table_bottom() - opts.table_top - header_height - 2.0 * pad;
    let max_lines = ((body_space / advance).floor() as usize).max(1);

    let mut pages = vec![PageLayout::default()];
    let mut y = place_header(&mut pages, opts.table_top, header_height, &header_cells);

    for (index, row) in texts.iter().enumerate() {
        let mut cells: Vec<Vec<String>> = row
            .iter()
            .zip(&columns)
            .map(|(text, c)| wrap_text(text, FontFace::Regular, opts.font_size, c.width - 2.0 * pad))
            .collect();
        for lines in &mut cells {
            if lines.len() > max_lines {
                log::warn!("row {index}: clipping cell from {} to {max_lines} lines", lines.len());
                lines.truncate(max_lines);
            }
        }
        let height = row_height(&cells, advance, pad);

        let page_has_body = pages.last().is_some_and(|p| p.body_rows().next().is_some());
        if y + height > opts.table_bottom() && page_has_body {
            if pages.len() >= opts.max_pages {
                return Err(BillError::LimitExceeded {
                    message: format!(
                        "{} records need more than {} pages",
                        records.len(),
                        opts.max_pages
                    ),
                });
            }
            pages.push(PageLayout::default());
            y = place_header(&mut pages, opts.table_top, header_height, &header_cells);
        }

        if let Some(page) = pages.last_mut() {
            page.rows.push(RowLayout {
                kind: RowKind::Body {
                    index,
                    striped: index % 2 == 0,
                },
                top: y,
                height,
                cells,
            });
        }
        y += height;
    }

    Ok(DocumentLayout {
        title: title.to_string(),
        columns,
        pages,
    })
}

fn place_header(pages: &mut [PageLayout], top: f32, height: f32, cells: &[Vec<String>]) -> f32 {
    if let Some(page) = pages.last_mut() {
        page.rows.push(RowLayout {
            kind: RowKind::Header,
            top,
            height,
            cells: cells.to_vec(),
        });
    }
    top + height
}

fn row_height(cells: &[Vec<String>], advance: f32, pad: f32) -> f32 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    lines as f32 * advance + 2.0 * pad
}

// Natural widths (widest cell plus padding), scaled to fill the printable width.
fn size_columns(labels: &[&str], texts: &[Vec<String>], opts: &RenderOptions) -> Vec<ColumnLayout> {
    let pad = opts.cell_padding;
    let available = opts.printable_width();
    let min_width = 2.0 * pad + opts.font_size;

    let natural: Vec<f32> = labels
        .iter()
        .enumerate()
        .map(|(c, label)| {
            let header = text_width(label, FontFace::Bold, opts.font_size);
            let widest = texts
                .iter()
                .filter_map(|row| row.get(c))
                .map(|t| text_width(t, FontFace::Regular, opts.font_size))
                .fold(header, f32::max);
            (widest + 2.0 * pad).clamp(min_width, available.max(min_width))
        })
        .collect();

    let total: f32 = natural.iter().sum();
    let scale = if total > 0.0 { available / total } else { 1.0 };

    let mut x = opts.margin_left;
    labels
        .iter()
        .zip(natural)
        .map(|(label, w)| {
            let width = w * scale;
            let col = ColumnLayout {
                label: label.to_string(),
                x,
                width,
            };
            x += width;
            col
        })
        .collect()
}

/// Greedy word wrap of `text` to `max_width` points.
///
/// Explicit newlines start new lines; words wider than a line are broken between characters.
/// Every line holds at least one character, so a very narrow column never loops forever.
pub fn wrap_text(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let space = text_width(" ", face, size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for word in paragraph.split_whitespace() {
            let word_w = text_width(word, face, size);
            let joined_w = if current.is_empty() {
                word_w
            } else {
                current_w + space + word_w
            };

            if joined_w <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_w = joined_w;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_w = 0.0;
            }

            if word_w <= max_width {
                current.push_str(word);
                current_w = word_w;
                continue;
            }

            for ch in word.chars() {
                let ch_w = text_width(ch.encode_utf8(&mut [0u8; 4]), face, size);
                if !current.is_empty() && current_w + ch_w > max_width {
                    lines.push(std::mem::take(&mut current));
                    current_w = 0.0;
                }
                current.push(ch);
                current_w += ch_w;
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::{footer_text, layout_document, wrap_text, RowKind};
    use crate::error::BillError;
    use crate::export::document::metrics::FontFace;
    use crate::export::document::options::RenderOptions;
    use crate::types::{Record, Value};

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs.iter().cloned().collect()
    }

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                record(&[
                    ("Item", Value::from(format!("item {i}"))),
                    ("Amount", Value::from(i as i64)),
                ])
            })
            .collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = layout_document(&[], "Bill", &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, BillError::EmptyInput { .. }));
    }

    #[test]
    fn single_record_fits_one_page() {
        let recs = vec![record(&[("Total", Value::from(42i64))])];
        let layout = layout_document(&recs, "Bill", &RenderOptions::default()).unwrap();

        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.body_row_count(), 1);
        assert_eq!(layout.footer(0), "Page 1 of 1");
        assert_eq!(layout.columns.len(), 1);
        assert_eq!(layout.pages[0].rows[0].kind, RowKind::Header);
    }

    #[test]
    fn overflow_breaks_pages_and_repeats_header() {
        let recs = records(200);
        let opts = RenderOptions::default();
        let layout = layout_document(&recs, "Bill", &opts).unwrap();

        assert!(layout.page_count() > 1);
        assert_eq!(layout.body_row_count(), 200);
        for page in &layout.pages {
            assert_eq!(page.rows[0].kind, RowKind::Header);
            for row in &page.rows {
                assert!(row.top + row.height <= opts.table_bottom() + 0.01);
            }
        }
        let last = layout.page_count();
        assert_eq!(layout.footer(last - 1), footer_text(last, last));
    }

    #[test]
    fn rows_keep_input_order_and_alternate_stripes() {
        let layout = layout_document(&records(5), "Bill", &RenderOptions::default()).unwrap();
        let kinds: Vec<RowKind> = layout.pages[0].body_rows().map(|r| r.kind).collect();
        assert_eq!(kinds[0], RowKind::Body { index: 0, striped: true });
        assert_eq!(kinds[1], RowKind::Body { index: 1, striped: false });
        assert_eq!(kinds[4], RowKind::Body { index: 4, striped: true });
    }

    #[test]
    fn columns_fill_printable_width() {
        let opts = RenderOptions::default();
        let layout = layout_document(&records(3), "Bill", &opts).unwrap();
        let width: f32 = layout.columns.iter().map(|c| c.width).sum();
        assert!((width - opts.printable_width()).abs() < 0.5);
        assert_eq!(layout.columns[0].x, opts.margin_left);
    }

    #[test]
    fn page_budget_is_enforced() {
        let opts = RenderOptions {
            max_pages: 1,
            ..Default::default()
        };
        let err = layout_document(&records(500), "Bill", &opts).unwrap_err();
        assert!(matches!(err, BillError::LimitExceeded { .. }));
    }

    #[test]
    fn zero_renders_as_zero_not_blank() {
        let recs = vec![record(&[("Qty", Value::Number(0.0)), ("Note", Value::Blank)])];
        let layout = layout_document(&recs, "Bill", &RenderOptions::default()).unwrap();
        let row = layout.pages[0].body_rows().next().unwrap();
        assert_eq!(row.cells[0], vec!["0".to_string()]);
        assert_eq!(row.cells[1], vec![String::new()]);
    }

    #[test]
    fn wrap_splits_on_words_and_long_tokens() {
        let lines = wrap_text("alpha beta gamma", FontFace::Regular, 10.0, 60.0);
        assert!(lines.len() >= 2);
        assert_eq!(lines.join(" "), "alpha beta gamma");

        let long = "x".repeat(100);
        let lines = wrap_text(&long, FontFace::Regular, 10.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), long);

        assert_eq!(wrap_text("", FontFace::Regular, 10.0, 50.0), vec![String::new()]);
        assert_eq!(wrap_text("a\nb", FontFace::Regular, 10.0, 500.0), vec!["a", "b"]);
    }

    #[test]
    fn tall_cells_are_clipped_to_a_page() {
        let text = vec!["word"; 5000].join(" ");
        let recs = vec![record(&[("Notes", Value::from(text))])];
        let opts = RenderOptions::default();
        let layout = layout_document(&recs, "Bill", &opts).unwrap();

        assert_eq!(layout.page_count(), 1);
        let row = layout.pages[0].body_rows().next().unwrap();
        assert!(row.top + row.height <= opts.table_bottom() + 0.01);
    }
}
