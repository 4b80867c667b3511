//! Statistics Aggregator
//!
//! Recomputes mutually exclusive field buckets with the priority
//! Identifier > Time > State > BusinessAttribute, then derives the three
//! review dimensions: coverage, completeness and risk.
//!
//! Buckets are re-derived from names and role labels on purpose; they do
//! not reuse the role classifier's decision chain.

use crate::semantic::classifier::{sensitivity_of, MATCHED_RULE_CONFIDENCE};
use crate::semantic::types::{
    CompletenessDimension, CompletenessStatus, CoverageDimension, FieldBuckets, FieldRecord,
    FieldSemanticProfile, GateDetails, GateVerdict, ReviewStatistics, RiskDimension,
    SensitivityTier, ThreeDimensionalMetrics,
};
use std::collections::HashMap;

pub const NO_FIELD_DATA: &str = "no field data";
pub const UNKNOWN_ROLE: &str = "Unknown";

/// Bucket a field lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Identifier,
    Time,
    State,
    BusinessAttribute,
}

/// Optional knowledge about the table beyond the raw field list
#[derive(Debug, Clone, Default)]
pub struct AggregationContext {
    /// Gate details, authoritative for completeness when present
    pub gate: Option<GateDetails>,
    /// Lowercased field name -> role label
    pub roles: HashMap<String, String>,
    /// Lowercased field name -> sensitivity tier
    pub sensitivity: HashMap<String, SensitivityTier>,
}

impl AggregationContext {
    pub fn from_profiles(gate: Option<GateDetails>, profiles: &[FieldSemanticProfile]) -> Self {
        let mut ctx = Self {
            gate,
            ..Self::default()
        };
        for p in profiles {
            let key = p.field_name.trim().to_lowercase();
            ctx.roles.insert(key.clone(), p.role.label().to_string());
            ctx.sensitivity.insert(key, p.sensitivity_tier);
        }
        ctx
    }

    /// Attach or replace a role label, e.g. from a reviewer edit
    pub fn with_role(mut self, field_name: &str, label: impl Into<String>) -> Self {
        self.roles.insert(field_name.trim().to_lowercase(), label.into());
        self
    }

    fn role_of(&self, key: &str) -> Option<&str> {
        self.roles
            .get(key)
            .map(String::as_str)
            .filter(|label| !label.is_empty() && *label != UNKNOWN_ROLE)
    }
}

/// Each predicate below is only consulted after every higher-priority one failed
pub fn bucket_of(field: &FieldRecord, role: Option<&str>) -> Bucket {
    let name = field.normalized_name();

    if role == Some("Identifier") || field.is_primary_key || name == "id" || name.ends_with("_id") {
        return Bucket::Identifier;
    }

    let time_like = ["time", "date", "created", "updated", "deleted"]
        .iter()
        .any(|p| name.contains(p))
        || name.starts_with("dt_")
        || name.ends_with("_at");
    if role == Some("Time") || time_like {
        return Bucket::Time;
    }

    let state_like =
        ["status", "state", "flag"].iter().any(|p| name.contains(p)) || name.ends_with("_yn");
    if role == Some("State") || state_like {
        return Bucket::State;
    }

    Bucket::BusinessAttribute
}

pub fn aggregate(fields: &[FieldRecord], context: Option<&AggregationContext>) -> ThreeDimensionalMetrics {
    if fields.is_empty() {
        return empty_metrics();
    }

    let fallback_ctx = AggregationContext::default();
    let ctx = context.unwrap_or(&fallback_ctx);

    let mut buckets = FieldBuckets::default();
    let mut covered_fields = 0;
    let mut sensitive_fields = Vec::new();
    let mut unresolved_fields = Vec::new();

    for field in fields {
        let key = field.normalized_name();
        let role = ctx.role_of(&key);

        match bucket_of(field, role) {
            Bucket::Identifier => buckets.identifiers += 1,
            Bucket::Time => buckets.time_fields += 1,
            Bucket::State => buckets.state_fields += 1,
            Bucket::BusinessAttribute => buckets.business_attrs += 1,
        }

        if role.is_some() {
            covered_fields += 1;
        } else {
            unresolved_fields.push(field.name.clone());
        }

        let tier = ctx
            .sensitivity
            .get(&key)
            .copied()
            .unwrap_or_else(|| sensitivity_of(&key));
        if tier.is_sensitive() {
            sensitive_fields.push(field.name.clone());
        }
    }

    let total_fields = fields.len();
    let (has_primary_key, has_lifecycle_field, is_eligible_table_type) = match &ctx.gate {
        Some(details) => (
            details.has_primary_key,
            details.has_lifecycle_field,
            details.is_eligible_table_type,
        ),
        // Without a gate verdict fall back to the bucket counts
        None => (buckets.identifiers > 0, buckets.time_fields > 0, true),
    };

    let mut issues = Vec::new();
    if !has_primary_key {
        issues.push("missing primary key".to_string());
    }
    if !has_lifecycle_field {
        issues.push("missing lifecycle field".to_string());
    }
    if !is_eligible_table_type {
        issues.push("ineligible table type".to_string());
    }

    ThreeDimensionalMetrics {
        total_field_count: total_fields,
        buckets,
        coverage: CoverageDimension {
            covered_fields,
            total_fields,
            ratio: covered_fields as f64 / total_fields as f64,
        },
        completeness: CompletenessDimension {
            status: if issues.is_empty() {
                CompletenessStatus::Complete
            } else {
                CompletenessStatus::Incomplete
            },
            issues,
        },
        risk: RiskDimension {
            count: sensitive_fields.len() + unresolved_fields.len(),
            sensitive_fields,
            unresolved_fields,
        },
    }
}

fn empty_metrics() -> ThreeDimensionalMetrics {
    ThreeDimensionalMetrics {
        total_field_count: 0,
        buckets: FieldBuckets::default(),
        coverage: CoverageDimension {
            covered_fields: 0,
            total_fields: 0,
            ratio: 0.0,
        },
        completeness: CompletenessDimension {
            status: CompletenessStatus::Incomplete,
            issues: vec![NO_FIELD_DATA.to_string()],
        },
        risk: RiskDimension {
            count: 0,
            sensitive_fields: Vec::new(),
            unresolved_fields: Vec::new(),
        },
    }
}

/// Counters used to route a table into review queues
pub fn review_statistics(
    fields: &[FieldSemanticProfile],
    gate: &GateVerdict,
    metrics: &ThreeDimensionalMetrics,
) -> ReviewStatistics {
    ReviewStatistics {
        pending_review_field_count: fields
            .iter()
            .filter(|f| f.role_confidence < MATCHED_RULE_CONFIDENCE)
            .count(),
        gate_failed_item_count: gate.reasons.len(),
        risk_item_count: metrics.risk.count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::classifier::RoleClassifier;
    use crate::semantic::gatekeeper::Gatekeeper;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn fields(names: &[&str]) -> Vec<FieldRecord> {
        names.iter().map(|n| FieldRecord::new(*n, "varchar")).collect()
    }

    #[test]
    fn test_priority_resolves_overlaps() {
        // status_id: Identifier beats State; created_status: Time beats State
        let input = fields(&["status_id", "created_status", "is_active_yn", "amount", "dt_pay", "paid_at"]);

        let metrics = aggregate(&input, None);

        assert_eq!(
            metrics.buckets,
            FieldBuckets {
                identifiers: 1,
                time_fields: 3,
                state_fields: 1,
                business_attrs: 1,
            }
        );
        assert_eq!(metrics.buckets.total(), input.len());
    }

    #[test]
    fn test_role_labels_feed_buckets() {
        let input = fields(&["amount", "phase_code", "settled"]);
        let ctx = AggregationContext::default()
            .with_role("amount", "Identifier")
            .with_role("settled", "Time")
            .with_role("phase_code", "State");

        let metrics = aggregate(&input, Some(&ctx));

        assert_eq!(metrics.buckets.identifiers, 1);
        assert_eq!(metrics.buckets.time_fields, 1);
        assert_eq!(metrics.buckets.state_fields, 1);
        assert_eq!(metrics.coverage.ratio, 1.0);
    }

    #[test]
    fn test_zero_fields_is_defined_terminal_case() {
        let metrics = aggregate(&[], None);

        assert_eq!(metrics.buckets, FieldBuckets::default());
        assert_eq!(metrics.completeness.status, CompletenessStatus::Incomplete);
        assert_eq!(metrics.completeness.issues, vec![NO_FIELD_DATA.to_string()]);
        assert_eq!(metrics.risk.count, 0);
        assert_eq!(metrics.coverage.ratio, 0.0);
    }

    #[test]
    fn test_gate_details_take_precedence() {
        let input = vec![
            FieldRecord::new("id", "bigint").primary_key(),
            FieldRecord::new("mobile", "varchar"),
            FieldRecord::new("create_time", "datetime"),
        ];
        let verdict = Gatekeeper::new().evaluate("tmp_customer", &input);
        let profiles = RoleClassifier::classify_all(&input);
        let ctx = AggregationContext::from_profiles(Some(verdict.details), &profiles);

        let metrics = aggregate(&input, Some(&ctx));

        assert_eq!(metrics.completeness.status, CompletenessStatus::Incomplete);
        assert_eq!(metrics.completeness.issues, vec!["ineligible table type".to_string()]);
        assert_eq!(metrics.coverage.covered_fields, 3);
        assert_eq!(metrics.risk.sensitive_fields, vec!["mobile".to_string()]);
        assert_eq!(metrics.risk.count, 1);
    }

    #[test]
    fn test_fallback_completeness_and_unresolved_roles() {
        let input = fields(&["amount", "user_password"]);

        let metrics = aggregate(&input, None);

        assert_eq!(
            metrics.completeness.issues,
            vec!["missing primary key".to_string(), "missing lifecycle field".to_string()]
        );
        assert_eq!(metrics.coverage.covered_fields, 0);
        // one sensitive + two unresolved
        assert_eq!(metrics.risk.count, 3);
        assert_eq!(metrics.risk.sensitive_fields, vec!["user_password".to_string()]);
    }

    #[test]
    fn test_unknown_label_is_not_coverage() {
        let input = fields(&["amount", "price"]);
        let ctx = AggregationContext::default()
            .with_role("amount", UNKNOWN_ROLE)
            .with_role("price", "BusinessAttribute");

        let metrics = aggregate(&input, Some(&ctx));

        assert_eq!(metrics.coverage.covered_fields, 1);
        assert_eq!(metrics.coverage.ratio, 0.5);
        assert_eq!(metrics.risk.unresolved_fields, vec!["amount".to_string()]);
    }

    #[test]
    fn test_review_statistics() {
        let input = vec![
            FieldRecord::new("id", "bigint").primary_key(),
            FieldRecord::new("nickname", "varchar"),
            FieldRecord::new("phone", "varchar"),
        ];
        let verdict = Gatekeeper::new().evaluate("member", &input);
        let profiles = RoleClassifier::classify_all(&input);
        let ctx = AggregationContext::from_profiles(Some(verdict.details), &profiles);
        let metrics = aggregate(&input, Some(&ctx));

        let review = review_statistics(&profiles, &verdict, &metrics);

        assert_eq!(review.pending_review_field_count, 2);
        assert_eq!(review.gate_failed_item_count, 1);
        assert_eq!(review.risk_item_count, 1);
    }

    proptest! {
        #[test]
        fn prop_buckets_reconcile_to_field_count(
            specs in proptest::collection::vec(("[a-z_]{1,14}", any::<bool>()), 0..20),
            labels in proptest::collection::vec(
                proptest::option::of(prop_oneof![
                    Just("Identifier"), Just("Time"), Just("State"), Just("Unknown"), Just("Audit")
                ]),
                20,
            ),
        ) {
            let input: Vec<FieldRecord> = specs
                .iter()
                .map(|(n, pk)| {
                    let mut f = FieldRecord::new(n.as_str(), "int");
                    f.is_primary_key = *pk;
                    f
                })
                .collect();
            let mut ctx = AggregationContext::default();
            for (field, label) in input.iter().zip(labels.iter()) {
                if let Some(label) = label {
                    ctx = ctx.with_role(&field.name, *label);
                }
            }

            let metrics = aggregate(&input, Some(&ctx));

            prop_assert_eq!(metrics.buckets.total(), input.len());
            prop_assert_eq!(metrics.total_field_count, input.len());
        }
    }
}
