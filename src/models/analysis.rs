//! Analysis-related models and DTOs

use crate::semantic::classifier::ClassificationRule;
use crate::semantic::gatekeeper::GateRule;
use crate::semantic::{FieldSemanticProfile, TableInput, TableSemanticProfile};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One table as submitted over the wire. Fields are raw objects so every
/// key alias the normalizer understands is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TableRequest {
    #[validate(length(max = 128, message = "Table name must be at most 128 characters"))]
    #[serde(default)]
    pub table_name: String,

    #[serde(default)]
    pub comment: Option<String>,

    #[validate(length(max = 2000, message = "At most 2000 fields per table"))]
    #[serde(default)]
    pub fields: Vec<serde_json::Value>,
}

impl TableRequest {
    pub fn to_input(&self) -> TableInput {
        TableInput::from_raw(self.table_name.clone(), self.comment.clone(), &self.fields)
    }
}

/// Replace the estimator score of an existing profile
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    pub profile: TableSemanticProfile,

    pub ai_score: f64,

    #[validate(length(min = 1, max = 64, message = "Analyst name is required"))]
    pub analyst: String,

    #[validate(length(max = 500))]
    #[serde(default)]
    pub note: Option<String>,
}

/// Field-level classification only
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub table_name: String,
    pub fields: Vec<FieldSemanticProfile>,
}

/// Both rule catalogs, in evaluation order
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesResponse {
    pub gate_rules: Vec<GateRule>,
    pub classification_rules: Vec<ClassificationRule>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_request_accepts_aliases() {
        let req: TableRequest = serde_json::from_value(json!({
            "tableName": "user_profile",
            "fields": [
                { "fieldName": "id", "dataType": "bigint", "isPrimaryKey": true },
                { "col": "mobile", "dtype": "varchar" },
                { "type": "int" }
            ]
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        let input = req.to_input();
        assert_eq!(input.fields.len(), 2);
        assert!(input.fields[0].is_primary_key);
    }

    #[test]
    fn test_long_table_name_rejected() {
        let req = TableRequest {
            table_name: "t".repeat(129),
            comment: None,
            fields: vec![],
        };
        assert!(req.validate().is_err());
    }
}
