use calamine::Data;

use crate::types::{Record, Sheet, Value};

use super::coerce::{coerce, header_label};

/// Normalize a raw row grid into a [`Sheet`].
///
/// Behavior:
/// - The first row is the header; its cells become the record keys, in column order
/// - Every following row becomes one [`Record`] with exactly the header's keys
/// - Positions past the end of a short row are [`Value::Blank`]
/// - Cells past the end of the header row are dropped
/// - An empty grid yields an empty sheet
///
/// A grid read from a worksheet is rectangular: a header row shorter than the used range is
/// padded with empty cells, which become the label `""`. So through
/// [`super::parse_workbook`], a data cell to the right of the last header label lands under
/// the key `""` rather than being dropped.
///
/// Duplicate header labels are not deduplicated: the right-most column wins, and the key
/// stays at the position of its first occurrence.
pub fn normalize_rows<I, R>(rows: I) -> Sheet
where
    I: IntoIterator<Item = R>,
    R: AsRef<[Data]>,
{
    let mut rows = rows.into_iter();
    let header: Vec<String> = match rows.next() {
        Some(first) => first.as_ref().iter().map(header_label).collect(),
        None => return Sheet::default(),
    };

    let records = rows
        .map(|row| {
            let row = row.as_ref();
            let mut record = Record::with_capacity(header.len());
            for (idx, label) in header.iter().enumerate() {
                let value = row.get(idx).map(coerce).unwrap_or(Value::Blank);
                record.insert(label.as_str(), value);
            }
            record
        })
        .collect();

    Sheet::new(records)
}

#[cfg(test)]
mod tests {
    use calamine::Data;

    use super::normalize_rows;
    use crate::types::Value;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn name_amount_scenario() {
        let grid = vec![
            vec![s("Name"), s("Amount")],
            vec![s("A"), Data::Float(100.0)],
            vec![s("B"), s("")],
        ];
        let sheet = normalize_rows(&grid);

        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.columns(), vec!["Name", "Amount"]);
        assert_eq!(sheet.records[0].get("Name"), Some(&Value::Text("A".into())));
        assert_eq!(sheet.records[0].get("Amount"), Some(&Value::Number(100.0)));
        assert_eq!(sheet.records[1].get("Amount"), Some(&Value::Blank));
    }

    #[test]
    fn short_rows_are_padded_to_header_width() {
        let grid = vec![vec![s("a"), s("b"), s("c")], vec![s("x")], vec![]];
        let sheet = normalize_rows(&grid);

        for record in &sheet.records {
            assert_eq!(record.len(), 3);
        }
        assert_eq!(sheet.records[0].get("c"), Some(&Value::Blank));
        assert!(sheet.records[1].values().all(Value::is_blank));
    }

    #[test]
    fn cells_past_header_are_dropped() {
        let grid = vec![vec![s("a")], vec![s("x"), s("extra")]];
        let sheet = normalize_rows(&grid);
        assert_eq!(sheet.records[0].len(), 1);
    }

    #[test]
    fn empty_grid_and_header_only_yield_no_records() {
        let empty: Vec<Vec<Data>> = Vec::new();
        assert!(normalize_rows(&empty).is_empty());
        assert!(normalize_rows(&vec![vec![s("a"), s("b")]]).is_empty());
    }

    #[test]
    fn duplicate_headers_keep_last_value() {
        let grid = vec![
            vec![s("Total"), s("Item"), s("Total")],
            vec![Data::Float(1.0), s("pen"), Data::Float(2.0)],
        ];
        let sheet = normalize_rows(&grid);

        let record = &sheet.records[0];
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Total", "Item"]);
        assert_eq!(record.get("Total"), Some(&Value::Number(2.0)));
    }
}
