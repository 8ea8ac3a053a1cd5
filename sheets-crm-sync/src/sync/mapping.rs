//! Sheet column to CRM field mapping

use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use log::{info, warn};
use serde::Deserialize;

use crate::api::Payload;
use crate::sheets::SheetRow;

/// Ordered mapping from sheet column to CRM field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMapping {
    sheet_to_crm: IndexMap<String, String>,
}

impl FieldMapping {
    /// Build a mapping from (sheet column, CRM field) pairs
    ///
    /// A sheet column given twice keeps its last CRM field.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut sheet_to_crm = IndexMap::new();
        for (sheet_col, crm_field) in pairs {
            let sheet_col = sheet_col.into();
            let crm_field = crm_field.into();
            if sheet_col.trim().is_empty() {
                bail!("Mapping contains an empty sheet column (CRM field '{}')", crm_field);
            }
            if let Some(previous) = sheet_to_crm.insert(sheet_col.clone(), crm_field) {
                warn!(
                    "Sheet column '{}' mapped more than once; dropping earlier target '{}'",
                    sheet_col, previous
                );
            }
        }
        Ok(Self { sheet_to_crm })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sheet_to_crm
            .iter()
            .map(|(sheet_col, crm_field)| (sheet_col.as_str(), crm_field.as_str()))
    }

    pub fn len(&self) -> usize {
        self.sheet_to_crm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheet_to_crm.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct MappingRecord {
    sheet_col: String,
    crm_field: String,
}

/// Load a `sheet_col,crm_field` CSV mapping file
pub fn load_mapping(path: &Path) -> Result<FieldMapping> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open mapping file: {}", path.display()))?;

    let mut pairs = Vec::new();
    for (idx, record) in reader.deserialize::<MappingRecord>().enumerate() {
        let line = idx + 2; // header is line 1
        let record = record.with_context(|| {
            format!("Invalid mapping file {} at line {}", path.display(), line)
        })?;
        if record.sheet_col.is_empty() {
            bail!("Mapping file {} line {}: sheet_col is empty", path.display(), line);
        }
        if record.crm_field.is_empty() {
            bail!("Mapping file {} line {}: crm_field is empty", path.display(), line);
        }
        pairs.push((record.sheet_col, record.crm_field));
    }

    let mapping = FieldMapping::from_pairs(pairs)?;
    info!("Loaded {} column mappings from {}", mapping.len(), path.display());
    Ok(mapping)
}

/// Build the update payload for one row
///
/// Missing columns map to "", values are trimmed, and when two columns
/// target the same CRM field the later mapping entry wins.
pub fn map_row(row: &SheetRow, mapping: &FieldMapping) -> Payload {
    let mut payload = Payload::with_capacity(mapping.len());
    for (sheet_col, crm_field) in mapping.iter() {
        payload.insert(crm_field.to_string(), row.value(sheet_col).trim().to_string());
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(cells: &[(&str, &str)]) -> SheetRow {
        cells.iter().copied().collect()
    }

    fn mapping_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_map_row_trims_and_fills_missing() {
        let mapping =
            FieldMapping::from_pairs([("name", "full_name"), ("phone", "phone_number")]).unwrap();
        let payload = map_row(&row(&[("email", "a@x.com"), ("name", "  Alice ")]), &mapping);

        assert_eq!(payload.get("full_name").map(String::as_str), Some("Alice"));
        assert_eq!(payload.get("phone_number").map(String::as_str), Some(""));
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_map_row_preserves_mapping_order() {
        let mapping = FieldMapping::from_pairs([("b", "second"), ("a", "first")]).unwrap();
        let payload = map_row(&row(&[("a", "1"), ("b", "2")]), &mapping);

        assert_eq!(payload.keys().collect::<Vec<_>>(), vec!["second", "first"]);
    }

    #[test]
    fn test_duplicate_target_last_write_wins() {
        let mapping =
            FieldMapping::from_pairs([("first", "name"), ("last", "name")]).unwrap();
        let payload = map_row(&row(&[("first", "Ada"), ("last", "Lovelace")]), &mapping);

        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("name").map(String::as_str), Some("Lovelace"));
    }

    #[test]
    fn test_map_row_is_deterministic() {
        let mapping = FieldMapping::from_pairs([("x", "f1"), ("y", "f2"), ("z", "f1")]).unwrap();
        let input = row(&[("x", "1"), ("y", " 2 "), ("z", "3")]);

        let first = map_row(&input, &mapping);
        let second = map_row(&input, &mapping);

        assert_eq!(first, second);
        assert_eq!(
            first.iter().collect::<Vec<_>>(),
            second.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_repeated_sheet_column_keeps_last_target() {
        let mapping = FieldMapping::from_pairs([("name", "a"), ("name", "b")]).unwrap();

        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![("name", "b")]);
    }

    #[test]
    fn test_empty_sheet_column_rejected() {
        assert!(FieldMapping::from_pairs([("", "full_name")]).is_err());
    }

    #[test]
    fn test_load_mapping() {
        let file = mapping_file("sheet_col,crm_field\nname,full_name\n company , account_name \n");
        let mapping = load_mapping(file.path()).unwrap();

        assert_eq!(
            mapping.iter().collect::<Vec<_>>(),
            vec![("name", "full_name"), ("company", "account_name")]
        );
    }

    #[test]
    fn test_load_mapping_columns_by_header() {
        let file = mapping_file("crm_field,sheet_col\nfull_name,name\n");
        let mapping = load_mapping(file.path()).unwrap();

        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![("name", "full_name")]);
    }

    #[test]
    fn test_load_mapping_rejects_empty_sheet_col() {
        let file = mapping_file("sheet_col,crm_field\nname,full_name\n,orphan\n");
        let err = load_mapping(file.path()).unwrap_err();

        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_load_mapping_missing_header() {
        let file = mapping_file("column,field\nname,full_name\n");

        assert!(load_mapping(file.path()).is_err());
    }

    #[test]
    fn test_load_mapping_missing_file() {
        let err = load_mapping(Path::new("/nonexistent/mapping.csv")).unwrap_err();

        assert!(err.to_string().contains("Failed to open mapping file"));
    }
}
