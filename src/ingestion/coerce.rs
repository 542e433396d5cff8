use calamine::Data;

use crate::types::Value;

/// Coerce a raw calamine cell into a [`Value`].
///
/// Total over every [`Data`] variant:
/// - `Empty` and empty strings become [`Value::Blank`]
/// - strings, numbers and booleans pass through (integers widen to `f64`)
/// - date/time cells keep their raw serial number
/// - anything else (ISO date strings, durations, cell errors) is stringified
pub fn coerce(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Blank,
        Data::String(s) if s.is_empty() => Value::Blank,
        Data::String(s) => Value::Text(s.clone()),
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::Number(dt.as_f64()),
        other => Value::from(other.to_string()),
    }
}

/// Coerce a header cell into its label text.
pub fn header_label(cell: &Data) -> String {
    coerce(cell).to_string()
}

#[cfg(test)]
mod tests {
    use calamine::{CellErrorType, Data};

    use super::{coerce, header_label};
    use crate::types::Value;

    #[test]
    fn missing_cells_are_blank() {
        assert_eq!(coerce(&Data::Empty), Value::Blank);
        assert_eq!(coerce(&Data::String(String::new())), Value::Blank);
    }

    #[test]
    fn primitives_pass_through() {
        assert_eq!(coerce(&Data::String("Ada".into())), Value::Text("Ada".into()));
        assert_eq!(coerce(&Data::Float(98.5)), Value::Number(98.5));
        assert_eq!(coerce(&Data::Int(7)), Value::Number(7.0));
        assert_eq!(coerce(&Data::Bool(false)), Value::Bool(false));
        assert_eq!(coerce(&Data::Float(0.0)), Value::Number(0.0));
    }

    #[test]
    fn other_cells_are_stringified() {
        assert_eq!(
            coerce(&Data::DateTimeIso("2024-01-31".into())),
            Value::Text("2024-01-31".into())
        );
        match coerce(&Data::Error(CellErrorType::Div0)) {
            Value::Text(s) => assert!(s.contains("DIV")),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn numeric_headers_render_without_fraction() {
        assert_eq!(header_label(&Data::Float(2024.0)), "2024");
        assert_eq!(header_label(&Data::Empty), "");
    }
}
