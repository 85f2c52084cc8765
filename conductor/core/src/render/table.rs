//! Table tab

use serde_json::Value;

use crate::query::Row;

/// Rows and columns as display text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableView {
    /// Column headers, from the first row's keys
    pub columns: Vec<String>,
    /// Cell text, one inner vec per displayed row, aligned with `columns`
    pub rows: Vec<Vec<String>>,
    /// Footer when the service reported more rows than are shown
    pub truncation_note: Option<String>,
}

impl TableView {
    /// Build the table from the first `limit` rows
    pub fn build(rows: &[Row], columns: &[String], row_count: usize, limit: usize) -> Self {
        let cells = rows
            .iter()
            .take(limit)
            .map(|row| columns.iter().map(|col| cell_text(row.get(col))).collect())
            .collect();

        let truncation_note = (row_count > limit)
            .then(|| format!("Showing first {limit} of {row_count} rows"));

        Self {
            columns: columns.to_vec(),
            rows: cells,
            truncation_note,
        }
    }

    /// Display width of each column (header or widest cell, in chars)
    pub fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Text for one cell. Absent and null cells are empty.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    }
}
