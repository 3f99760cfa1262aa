//! Content-derived material identifiers.
//!
//! A record is flattened into `parent_child` keys, the identity field is
//! removed, and the sorted `key:value` pairs are hashed with SHA-256. Two
//! records with the same flattened content always share an identifier.

use std::collections::BTreeMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::steel::ingest::error::Result;
use crate::steel::ingest::model::MetadataRecord;

/// Field holding the derived identifier. It is never part of its own hash.
pub const IDENTITY_FIELD: &str = "material_id";

/// Separator joining nested keys to their parent key.
const KEY_SEPARATOR: char = '_';

/// Returns the hexadecimal identifier of a nested key-value record.
pub fn identify(record: &Value) -> String {
    let mut flat = flatten(record);
    flat.remove(IDENTITY_FIELD);

    let concatenated: String = flat
        .iter()
        .map(|(key, value)| format!("{key}:{value}"))
        .collect();

    hex::encode(Sha256::digest(concatenated.as_bytes()))
}

/// Flattens nested objects into a single level. Arrays stay leaf values.
pub fn flatten(record: &Value) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    flatten_into(record, "", &mut flat);
    flat
}

fn flatten_into(value: &Value, path: &str, flat: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(entries) => {
            for (key, nested) in entries {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}{KEY_SEPARATOR}{key}")
                };
                flatten_into(nested, &child, flat);
            }
        }
        Value::String(text) => {
            flat.insert(path.to_string(), text.clone());
        }
        leaf => {
            flat.insert(path.to_string(), leaf.to_string());
        }
    }
}

impl MetadataRecord {
    /// Computes the record's identifier from its current content and stores it
    /// in `material_id`, replacing any stale value.
    pub fn assign_material_id(&mut self) -> Result<&str> {
        self.material_id = None;
        let id = identify(&serde_json::to_value(&*self)?);
        Ok(self.material_id.insert(id).as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::steel::ingest::model::{ScalarValue, Supplier};

    #[test]
    fn identifier_is_fixed_length_hex() {
        let id = identify(&json!({"grade": "DX51D"}));
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn key_order_does_not_matter() {
        let lhs = json!({"grade": "DX51D", "composition": {"C": 0.02, "Mn": 0.2}});
        let mut rhs = serde_json::Map::new();
        rhs.insert("composition".into(), json!({"Mn": 0.2, "C": 0.02}));
        rhs.insert("grade".into(), json!("DX51D"));

        assert_eq!(identify(&lhs), identify(&Value::Object(rhs)));
    }

    #[test]
    fn stale_identity_field_is_ignored() {
        let plain = json!({"grade": "DX51D", "supplier": "source1"});
        let stale = json!({"grade": "DX51D", "supplier": "source1", "material_id": "abc"});

        assert_eq!(identify(&plain), identify(&stale));
    }

    #[test]
    fn content_changes_change_the_identifier() {
        let lhs = json!({"grade": "DX51D"});
        let rhs = json!({"grade": "DX52D"});
        assert_ne!(identify(&lhs), identify(&rhs));
    }

    #[test]
    fn nested_keys_are_joined_with_underscore_and_lists_stay_leaves() {
        let flat = flatten(&json!({
            "description_i18n": {"de": "Kantenriss"},
            "tags": ["a", "b"],
        }));

        assert_eq!(flat.get("description_i18n_de").map(String::as_str), Some("Kantenriss"));
        assert_eq!(flat.get("tags").map(String::as_str), Some(r#"["a","b"]"#));
    }

    #[test]
    fn hash_matches_concatenated_sorted_pairs() {
        let record = json!({"supplier": "source1", "grade": "DX51D"});
        let expected = hex::encode(Sha256::digest(b"grade:DX51Dsupplier:source1"));
        assert_eq!(identify(&record), expected);
    }

    #[test]
    fn assigned_identifier_is_stable_across_reassignment() {
        let mut record = MetadataRecord::new(Supplier::Source1);
        record.grade = Some("DX51D".into());
        record
            .composition
            .insert("C".into(), ScalarValue::Number(0.02));

        let first = record.assign_material_id().unwrap().to_string();
        let second = record.assign_material_id().unwrap().to_string();
        assert_eq!(first, second);

        let mut twin = record.clone();
        twin.material_id = Some("stale".into());
        assert_eq!(twin.assign_material_id().unwrap(), first);
    }
}
