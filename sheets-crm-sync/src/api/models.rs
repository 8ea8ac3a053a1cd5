//! CRM response models

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Update body: CRM field name to value, in mapping order
pub type Payload = IndexMap<String, String>;

/// Keys checked, in order, for a record identifier
pub const RECORD_ID_KEYS: [&str; 2] = ["id", "record_id"];

/// Opaque record returned by the lookup endpoint
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrmRecord {
    fields: Map<String, Value>,
}

impl CrmRecord {
    /// Identifier under `id`, else `record_id`
    ///
    /// The first key holding a non-blank value (not null, false, zero or
    /// empty) is chosen before trimming, so an `id` of only whitespace yields
    /// no identifier rather than falling through to `record_id`.
    pub fn record_id(&self) -> Option<String> {
        RECORD_ID_KEYS
            .iter()
            .filter_map(|key| self.fields.get(*key))
            .find(|value| is_present(value))
            .map(id_text)
            .filter(|id| !id.is_empty())
    }
}

impl From<Value> for CrmRecord {
    /// Non-object items become records without fields
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

/// Whether a JSON value carries anything (non-null, non-false, non-zero, non-empty)
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Lookup response: either an `{"items": [...]}` envelope or a bare list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LookupBody {
    List(Vec<Value>),
    Envelope {
        #[serde(default)]
        items: Option<Vec<Value>>,
    },
}

impl LookupBody {
    pub fn into_items(self) -> Vec<Value> {
        match self {
            LookupBody::List(items) => items,
            LookupBody::Envelope { items } => items.unwrap_or_default(),
        }
    }

    /// First matched record, if any
    ///
    /// An empty first item (`{}`, `null`) counts as no match.
    pub fn first_record(self) -> Option<CrmRecord> {
        self.into_items()
            .into_iter()
            .next()
            .filter(is_present)
            .map(CrmRecord::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> CrmRecord {
        CrmRecord::from(value)
    }

    #[test]
    fn test_record_id_prefers_id() {
        let rec = record(json!({"id": "42", "record_id": "7"}));
        assert_eq!(rec.record_id().as_deref(), Some("42"));
    }

    #[test]
    fn test_record_id_falls_back_when_id_empty() {
        let rec = record(json!({"id": null, "record_id": " 8 "}));
        assert_eq!(rec.record_id().as_deref(), Some("8"));

        let rec = record(json!({"id": "", "record_id": "7"}));
        assert_eq!(rec.record_id().as_deref(), Some("7"));

        let rec = record(json!({"id": 0, "record_id": "7"}));
        assert_eq!(rec.record_id().as_deref(), Some("7"));

        let rec = record(json!({"id": false, "record_id": "7"}));
        assert_eq!(rec.record_id().as_deref(), Some("7"));
    }

    #[test]
    fn test_whitespace_id_does_not_fall_back() {
        let rec = record(json!({"id": "  ", "record_id": "7"}));
        assert_eq!(rec.record_id(), None);
    }

    #[test]
    fn test_numeric_record_id() {
        let rec = record(json!({"id": 42}));
        assert_eq!(rec.record_id().as_deref(), Some("42"));

        let rec = record(json!({"record_id": 0}));
        assert_eq!(rec.record_id(), None);
    }

    #[test]
    fn test_missing_record_id() {
        assert_eq!(record(json!({"name": "Alice"})).record_id(), None);
        assert_eq!(record(json!("not an object")).record_id(), None);
    }

    #[test]
    fn test_lookup_body_shapes() {
        let envelope: LookupBody = serde_json::from_str(r#"{"items":[{"id":"1"},{"id":"2"}]}"#).unwrap();
        assert_eq!(envelope.first_record().unwrap().record_id().as_deref(), Some("1"));

        let list: LookupBody = serde_json::from_str(r#"[{"id":"9"}]"#).unwrap();
        assert_eq!(list.first_record().unwrap().record_id().as_deref(), Some("9"));

        let empty: LookupBody = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert!(empty.first_record().is_none());

        let absent: LookupBody = serde_json::from_str(r#"{"total":0}"#).unwrap();
        assert!(absent.first_record().is_none());

        let null_items: LookupBody = serde_json::from_str(r#"{"items":null}"#).unwrap();
        assert!(null_items.first_record().is_none());
    }

    #[test]
    fn test_empty_first_item_is_no_match() {
        let empty_object: LookupBody = serde_json::from_str(r#"{"items":[{}]}"#).unwrap();
        assert!(empty_object.first_record().is_none());

        let null_item: LookupBody = serde_json::from_str(r#"[null, {"id":"1"}]"#).unwrap();
        assert!(null_item.first_record().is_none());
    }

    #[test]
    fn test_lookup_body_rejects_scalars() {
        assert!(serde_json::from_str::<LookupBody>("\"nope\"").is_err());
        assert!(serde_json::from_str::<LookupBody>("3").is_err());
    }
}
