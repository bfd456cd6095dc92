//! Cell coercion helpers shared by the importer and exporter.
//!
//! Uploaded workbooks are loosely typed: prices may arrive as numbers or as
//! `"$1,234.50"` strings, SKUs as numbers or text. Everything the importer
//! compares goes through [`normalize`] so that sheet names, header cells and
//! area names all match the same way.

use calamine::{Data, Range};
use regex::Regex;
use std::sync::OnceLock;

/// Trim and lowercase. The single matching rule for names and header cells.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Text of a cell as a user would read it. Whole floats print without a
/// fractional part (`12.0` → `"12"`).
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// True when the cell holds anything other than blank text
pub fn is_populated(cell: &Data) -> bool {
    match cell {
        Data::Empty => false,
        Data::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn non_numeric() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^0-9.\-]+").expect("valid currency pattern"))
}

/// Drop every character except digits, `.` and `-`
pub fn strip_non_numeric(text: &str) -> String {
    non_numeric().replace_all(text, "").into_owned()
}

/// Currency text to a number: `"$1,234.50"` → `1234.5`. Anything that does
/// not survive stripping as a number is `0`.
pub fn parse_currency(text: &str) -> f64 {
    let stripped = strip_non_numeric(text);
    if stripped.is_empty() {
        return 0.0;
    }
    stripped
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Currency value of a cell. Numeric cells pass through unchanged.
pub fn currency_cell(cell: &Data) -> f64 {
    match cell {
        Data::Float(f) if f.is_finite() => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => parse_currency(s),
        _ => 0.0,
    }
}

/// Plain numeric value of a cell (`" 12 "` parses, `"12 cs"` does not)
pub fn number_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) if f.is_finite() => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Some(0.0);
            }
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        Data::Empty => Some(0.0),
        _ => None,
    }
}

/// A worksheet as rows of cells, with column 0 always being sheet column A.
///
/// calamine ranges start at the first used cell; the leading empty columns are
/// restored here so "first cell" always means column A.
pub struct SheetRows {
    rows: Vec<Vec<Data>>,
}

impl SheetRows {
    pub fn from_range(range: &Range<Data>) -> Self {
        let lead = range.start().map(|(_, col)| col as usize).unwrap_or(0);
        let rows = range
            .rows()
            .map(|row| {
                let mut cells = Vec::with_capacity(lead + row.len());
                cells.resize(lead, Data::Empty);
                cells.extend(row.iter().cloned());
                cells
            })
            .collect();
        Self { rows }
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<Data>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &[Data] {
        self.rows.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cell at (row, col); out-of-range cells read as empty
    pub fn cell(&self, row: usize, col: usize) -> &Data {
        static EMPTY: Data = Data::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Normalized text of a cell
    pub fn key(&self, row: usize, col: usize) -> String {
        normalize(&cell_text(self.cell(row, col)))
    }

    /// Indices of the rows whose first cell normalizes to `key`
    pub fn rows_starting_with<'a>(&'a self, key: &'a str) -> impl Iterator<Item = usize> + 'a {
        (0..self.rows.len()).filter(move |&row| self.key(row, 0) == key)
    }
}
