//! Rule-based estimator
//!
//! Deterministic stand-in for a model-backed estimator. It reads only the
//! table name, comment and field metadata, so identical input always yields
//! an identical estimate.

use crate::estimator::{EstimateRequest, EstimatorError, SemanticEstimate, SemanticEstimator};
use crate::semantic::classifier::sensitivity_of;
use crate::semantic::fusion::round2;
use crate::semantic::normalizer::{base_type, is_integer_type, is_numeric_type};
use crate::semantic::types::{FieldRecord, FieldSuggestion};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

const BASE_SCORE: f64 = 0.5;

const BUSINESS_NOUNS: &[&str] = &[
    "user", "customer", "member", "order", "product", "account", "payment", "invoice",
    "contract", "employee", "supplier", "store", "sku",
];
const LAYER_PREFIXES: &[&str] = &["t", "tb", "tbl", "ods", "dwd", "dws", "dim"];
const EVENT_MARKERS: &[&str] = &["log", "trace", "history", "detail", "event"];
const SCRATCH_MARKERS: &[&str] = &["tmp", "temp", "bak"];

/// Template used when a table arrives without any field metadata
fn default_fields() -> Vec<FieldRecord> {
    vec![
        FieldRecord::new("id", "bigint").primary_key(),
        FieldRecord::new("name", "varchar"),
        FieldRecord::new("create_time", "datetime"),
    ]
}

pub struct RuleBasedEstimator {
    latency: Duration,
}

impl RuleBasedEstimator {
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
        }
    }

    /// Simulated response latency, useful for exercising timeouts and progress
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn build_estimate(request: &EstimateRequest) -> SemanticEstimate {
        let table = request.table_name.trim().to_lowercase();
        let tokens: Vec<&str> = table.split('_').filter(|t| !t.is_empty()).collect();
        let business_name = business_name(&tokens);

        let mut score = BASE_SCORE;
        let mut evidence = Vec::new();
        let mut tags = Vec::new();

        let comment = request
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| c.chars().count() > 2);
        match comment {
            Some(c) => {
                score += 0.2;
                evidence.push(format!("Table comment states its purpose: \"{}\"", c));
            }
            None => evidence.push("No table comment to confirm business meaning".to_string()),
        }

        if let Some(noun) = tokens.iter().find(|t| BUSINESS_NOUNS.contains(*t)) {
            score += 0.1;
            evidence.push(format!("Table name refers to business entity '{}'", noun));
            tags.push("master-data".to_string());
        }

        if tokens.iter().any(|t| EVENT_MARKERS.contains(t)) {
            tags.push("event".to_string());
            evidence.push("Table name suggests an event or log stream".to_string());
        }

        if SCRATCH_MARKERS.iter().any(|m| table.contains(m)) {
            score -= 0.3;
            tags.push("scratch".to_string());
            evidence.push("Table name suggests a temporary or backup copy".to_string());
        }

        let fields = if request.fields.is_empty() {
            score -= 0.2;
            tags.push("needs-fields".to_string());
            evidence.push("No field metadata supplied; suggestions use the default field template".to_string());
            default_fields()
        } else {
            let commented = request
                .fields
                .iter()
                .filter(|f| f.comment.as_deref().is_some_and(|c| !c.trim().is_empty()))
                .count();
            let ratio = commented as f64 / request.fields.len() as f64;
            score += 0.2 * ratio;
            evidence.push(format!(
                "{}/{} fields carry a comment",
                commented,
                request.fields.len()
            ));
            request.fields.clone()
        };

        if fields
            .iter()
            .any(|f| sensitivity_of(&f.normalized_name()).is_sensitive())
        {
            tags.push("sensitive".to_string());
        }

        let description = comment
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} records", business_name));

        let field_suggestions = fields
            .iter()
            .map(|f| suggest_field(f, &business_name))
            .collect();

        SemanticEstimate {
            ai_score: round2(score.clamp(0.0, 1.0)),
            business_name,
            description,
            evidence,
            tags,
            field_suggestions,
        }
    }
}

impl Default for RuleBasedEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SemanticEstimator for RuleBasedEstimator {
    fn name(&self) -> &str {
        "rule-based"
    }

    async fn estimate(&self, request: &EstimateRequest) -> Result<SemanticEstimate, EstimatorError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let estimate = Self::build_estimate(request);
        debug!(
            "Rule-based estimate for '{}': {:.2}",
            request.table_name, estimate.ai_score
        );
        Ok(estimate)
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn business_name(tokens: &[&str]) -> String {
    let meaningful: Vec<&str> = match tokens.split_first() {
        Some((first, rest)) if LAYER_PREFIXES.contains(first) && !rest.is_empty() => rest.to_vec(),
        _ => tokens.to_vec(),
    };
    meaningful
        .iter()
        .map(|t| title_case(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn logical_type(data_type: &str) -> &'static str {
    let base = base_type(data_type);
    if is_integer_type(data_type) {
        "integer"
    } else if is_numeric_type(data_type) {
        "decimal"
    } else if base.contains("date") || base.starts_with("time") {
        "temporal"
    } else if base.starts_with("bool") || base == "bit" {
        "boolean"
    } else if base.is_empty() {
        "unknown"
    } else {
        "text"
    }
}

fn unit_of(normalized_name: &str) -> Option<String> {
    if ["amount", "price", "fee", "cost"].iter().any(|m| normalized_name.contains(m)) {
        Some("currency".to_string())
    } else if normalized_name.ends_with("_count") || normalized_name.contains("qty") {
        Some("count".to_string())
    } else {
        None
    }
}

fn suggest_field(field: &FieldRecord, table_business_name: &str) -> FieldSuggestion {
    let name = field.normalized_name();
    let generated_term = name
        .split('_')
        .filter(|t| !t.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");
    let comment = field
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    FieldSuggestion {
        field_name: field.name.clone(),
        business_term: comment.map(str::to_string).unwrap_or_else(|| generated_term.clone()),
        business_definition: comment
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} of the {}", generated_term, table_business_name)),
        logical_type: logical_type(&field.data_type).to_string(),
        unit: unit_of(&name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(table: &str, fields: Vec<FieldRecord>, comment: Option<&str>) -> EstimateRequest {
        EstimateRequest {
            table_name: table.to_string(),
            fields,
            comment: comment.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_documented_entity_scores_high() {
        let req = request(
            "t_customer",
            vec![
                FieldRecord::new("id", "bigint").primary_key().with_comment("Customer id"),
                FieldRecord::new("total_amount", "decimal(10,2)"),
            ],
            Some("Customer master"),
        );

        let est = RuleBasedEstimator::new().estimate(&req).await.unwrap();

        // 0.5 + 0.2 comment + 0.1 noun + 0.2 * 1/2 commented fields
        assert_eq!(est.ai_score, 0.9);
        assert_eq!(est.business_name, "Customer");
        assert_eq!(est.description, "Customer master");
        assert!(est.tags.contains(&"master-data".to_string()));
        assert_eq!(est.field_suggestions.len(), 2);
        assert_eq!(est.field_suggestions[0].business_term, "Customer id");
        assert_eq!(est.field_suggestions[1].business_term, "Total Amount");
        assert_eq!(est.field_suggestions[1].logical_type, "decimal");
        assert_eq!(est.field_suggestions[1].unit.as_deref(), Some("currency"));
    }

    #[tokio::test]
    async fn test_empty_fields_use_default_template() {
        let est = RuleBasedEstimator::new()
            .estimate(&request("tmp_orders_backup", vec![], None))
            .await
            .unwrap();

        // 0.5 - 0.3 scratch - 0.2 no fields
        assert_eq!(est.ai_score, 0.0);
        let names: Vec<&str> = est.field_suggestions.iter().map(|s| s.field_name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "create_time"]);
        assert!(est.tags.contains(&"needs-fields".to_string()));
        assert!(est.tags.contains(&"scratch".to_string()));
    }

    #[test]
    fn test_is_deterministic() {
        let req = request("order_log", vec![FieldRecord::new("log_id", "bigint")], None);
        let first = tokio_test::block_on(RuleBasedEstimator::new().estimate(&req)).unwrap();
        let second = tokio_test::block_on(RuleBasedEstimator::new().estimate(&req)).unwrap();
        assert_eq!(first, second);
        assert!(first.tags.contains(&"event".to_string()));
    }

    #[test]
    fn test_business_name_strips_layer_prefix_only_when_followed() {
        assert_eq!(business_name(&["dwd", "order", "item"]), "Order Item");
        assert_eq!(business_name(&["dim"]), "Dim");
    }

    #[test]
    fn test_logical_type_uses_base_type_name() {
        assert_eq!(logical_type("BIGINT(20)"), "integer");
        assert_eq!(logical_type("decimal(10,2)"), "decimal");
        assert_eq!(logical_type("timestamp with time zone"), "temporal");
        assert_eq!(logical_type("datetime"), "temporal");
        assert_eq!(logical_type("interval"), "text");
        assert_eq!(logical_type("point"), "text");
        assert_eq!(logical_type(""), "unknown");
    }
}
