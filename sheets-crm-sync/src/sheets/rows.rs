//! Header-keyed spreadsheet rows

use indexmap::IndexMap;
use serde_json::Value;

/// One data row: column header to cell text, in sheet column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetRow {
    cells: IndexMap<String, String>,
}

impl SheetRow {
    /// Cell under the given header, if the column exists
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Cell under the given header, or "" if the column is missing
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for SheetRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Convert a raw value range into rows keyed by the first row
///
/// Fewer than two raw rows yields no rows. Short rows are padded with empty
/// cells; cells beyond the header are dropped. A repeated header keeps the
/// rightmost cell.
pub fn rows_from_values(values: &[Vec<Value>]) -> Vec<SheetRow> {
    let Some((header_row, data_rows)) = values.split_first() else {
        return Vec::new();
    };
    if data_rows.is_empty() {
        return Vec::new();
    }

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();

    data_rows
        .iter()
        .map(|raw| {
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let cell = raw.get(idx).map(cell_text).unwrap_or_default();
                    (header.clone(), cell)
                })
                .collect::<SheetRow>()
        })
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
