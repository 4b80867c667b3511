//! Field Normalizer
//!
//! Upstream metadata sources disagree on key names for the same concept.
//! Everything is funneled into [`FieldRecord`] before any rule sees it.

use crate::semantic::types::FieldRecord;
use serde_json::Value;
use tracing::debug;

const NAME_KEYS: &[&str] = &["name", "fieldName", "col", "field"];
const TYPE_KEYS: &[&str] = &["type", "dataType", "dtype", "datatype"];
const COMMENT_KEYS: &[&str] = &["comment", "businessDefinition", "description"];

const INTEGER_TYPES: &[&str] = &[
    "int", "integer", "bigint", "smallint", "tinyint", "mediumint", "int2", "int4", "int8",
    "serial", "bigserial",
];
const DECIMAL_TYPES: &[&str] = &["decimal", "numeric", "double", "float", "real", "number", "money"];

/// Canonicalize raw field objects. Records without a resolvable name are dropped.
pub fn normalize_fields(table_name: &str, raw: &[Value]) -> Vec<FieldRecord> {
    let fields: Vec<FieldRecord> = raw.iter().filter_map(normalize_one).collect();

    if fields.len() != raw.len() {
        debug!(
            "Normalizer dropped {} nameless field(s) from '{}'",
            raw.len() - fields.len(),
            table_name
        );
    }

    fields
}

fn normalize_one(raw: &Value) -> Option<FieldRecord> {
    let obj = raw.as_object()?;
    let name = first_non_empty(obj, NAME_KEYS)?;

    Some(FieldRecord {
        name,
        data_type: first_non_empty(obj, TYPE_KEYS).unwrap_or_default(),
        comment: first_non_empty(obj, COMMENT_KEYS),
        is_primary_key: resolve_primary_key(obj),
    })
}

fn first_non_empty(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Explicit flag, then `isPrimary`, then a `key: "PK"` marker
fn resolve_primary_key(obj: &serde_json::Map<String, Value>) -> bool {
    if let Some(flag) = obj
        .get("isPrimaryKey")
        .or_else(|| obj.get("primaryKey"))
        .and_then(Value::as_bool)
    {
        return flag;
    }

    if let Some(flag) = obj.get("isPrimary").and_then(Value::as_bool) {
        return flag;
    }

    obj.get("key")
        .and_then(Value::as_str)
        .map(|k| k.trim().eq_ignore_ascii_case("PK"))
        .unwrap_or(false)
}

/// Lowercased base type name: `NUMERIC(10, 2)` is `numeric`, `int unsigned` is `int`
pub fn base_type(data_type: &str) -> String {
    let t = data_type.trim().to_lowercase();
    let head = t.split('(').next().unwrap_or_default();
    head.split_whitespace().next().unwrap_or_default().to_string()
}

pub fn is_integer_type(data_type: &str) -> bool {
    INTEGER_TYPES.contains(&base_type(data_type).as_str())
}

pub fn is_numeric_type(data_type: &str) -> bool {
    let base = base_type(data_type);
    INTEGER_TYPES.contains(&base.as_str()) || DECIMAL_TYPES.contains(&base.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_resolves_aliases() {
        let raw = vec![
            json!({ "fieldName": "user_id", "dtype": "bigint", "key": "PK" }),
            json!({ "col": "email", "datatype": "varchar", "businessDefinition": "Contact mail" }),
        ];

        let fields = normalize_fields("users", &raw);

        assert_eq!(
            fields,
            vec![
                FieldRecord::new("user_id", "bigint").primary_key(),
                FieldRecord::new("email", "varchar").with_comment("Contact mail"),
            ]
        );
    }

    #[test]
    fn test_first_non_empty_alias_wins() {
        let raw = vec![json!({ "name": "  ", "fieldName": "status", "type": "", "dataType": "int" })];

        let fields = normalize_fields("orders", &raw);

        assert_eq!(fields[0].name, "status");
        assert_eq!(fields[0].data_type, "int");
    }

    #[test]
    fn test_drops_nameless_records() {
        let raw = vec![
            json!({ "type": "int" }),
            json!({ "name": "" }),
            json!("not an object"),
            json!({ "field": "amount" }),
        ];

        let fields = normalize_fields("orders", &raw);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "amount");
        assert_eq!(fields[0].data_type, "");
    }

    #[test]
    fn test_primary_key_precedence() {
        let explicit_false = json!({ "name": "id", "isPrimaryKey": false, "isPrimary": true, "key": "PK" });
        let is_primary = json!({ "name": "id", "isPrimary": true, "key": "" });
        let marker = json!({ "name": "id", "key": "pk" });

        let fields = normalize_fields("t", &[explicit_false, is_primary, marker]);

        assert!(!fields[0].is_primary_key);
        assert!(fields[1].is_primary_key);
        assert!(fields[2].is_primary_key);
    }

    #[test]
    fn test_numeric_types_match_whole_base_name() {
        assert_eq!(base_type(" DECIMAL(10, 2) "), "decimal");
        assert_eq!(base_type("double precision"), "double");
        assert!(is_numeric_type("BIGINT(20) UNSIGNED"));
        assert!(is_numeric_type("numeric(18,4)"));
        assert!(is_integer_type("int4"));

        for non_numeric in ["interval", "point", "varchar(20) -- printable", "string", ""] {
            assert!(!is_numeric_type(non_numeric), "{} is not numeric", non_numeric);
        }
    }
}
