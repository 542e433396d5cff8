//! Core data model produced by ingestion.
//!
//! A [`Workbook`] is an ordered list of named [`Sheet`]s; a sheet is an ordered list of
//! [`Record`]s; a record maps header labels to coerced [`Value`]s. Every record in a sheet
//! carries the same key set, so the first record's keys describe the sheet's columns.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A single coerced cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No data. Displays as the empty string; distinct from `Number(0.0)`.
    #[default]
    Blank,
    /// Non-empty UTF-8 text.
    Text(String),
    /// Numeric cell (integers are stored as `f64`, like the spreadsheet itself does).
    Number(f64),
    /// Boolean cell.
    Bool(bool),
}

impl Value {
    /// Returns `true` for [`Value::Blank`].
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Blank)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Blank => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => fmt_number(*n, f),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

// Integral values print without a fraction (`100`, not `100.0`).
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Value::Blank
        } else {
            Value::Text(s.to_string())
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        if s.is_empty() { Value::Blank } else { Value::Text(s) }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Blank => serializer.serialize_str(""),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// An ordered mapping from header label to [`Value`].
///
/// Keys keep insertion order. Inserting a key that already exists replaces its value but
/// keeps its original position, so a sheet with duplicate header labels yields one key whose
/// value comes from the right-most duplicate column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `n` fields.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            fields: Vec::with_capacity(n),
        }
    }

    /// Insert or overwrite a field. Returns the previous value if the key existed.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    /// Look up a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterate keys in header order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate values in header order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    /// Iterate `(key, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// The normalized rows of one sheet (header row excluded).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    /// Records in source row order.
    pub records: Vec<Record>,
}

impl Sheet {
    /// Create a sheet from records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the sheet has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column labels, taken from the first record. Empty for an empty sheet.
    pub fn columns(&self) -> Vec<&str> {
        self.records
            .first()
            .map(|r| r.keys().collect())
            .unwrap_or_default()
    }

    /// A borrowed view of at most the first `n` records.
    pub fn preview(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }
}

impl Serialize for Sheet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for r in &self.records {
            seq.serialize_element(r)?;
        }
        seq.end()
    }
}

/// Parsed workbook: sheet names (unique, in file order) mapped to their [`Sheet`]s.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<(String, Sheet)>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet. A sheet with the same name is replaced in place.
    pub fn push_sheet(&mut self, name: impl Into<String>, sheet: Sheet) {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = sheet,
            None => self.sheets.push((name, sheet)),
        }
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Sheet names in file order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    /// Name of the first sheet, if any.
    pub fn first_sheet_name(&self) -> Option<&str> {
        self.sheets.first().map(|(n, _)| n.as_str())
    }

    /// Iterate `(name, sheet)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Total number of records across all sheets.
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|(_, s)| s.row_count()).sum()
    }

    /// Returns `true` if the workbook has no sheets.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl Serialize for Workbook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sheets.len()))?;
        for (name, sheet) in &self.sheets {
            map.serialize_entry(name, sheet)?;
        }
        map.end()
    }
}
