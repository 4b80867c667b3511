//! Field Role Classifier
//!
//! Every field gets exactly one role from a fixed-order rule chain; the
//! first matching rule wins. Sensitivity is computed separately and never
//! influences the role.

use crate::semantic::types::{FieldRecord, FieldRole, FieldSemanticProfile, SensitivityTier};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

pub const MATCHED_RULE_CONFIDENCE: f64 = 0.9;
pub const FALLBACK_CONFIDENCE: f64 = 0.6;
pub const FALLBACK_RULE_ID: &str = "C-06";

static SENSITIVE_L4: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"password|secret|pwd").expect("valid L4 pattern"));
static SENSITIVE_L3: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"mobile|phone|id_card|bank_card").expect("valid L3 pattern"));
static SENSITIVE_L2: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"name|email|address").expect("valid L2 pattern"));

static AUDIT_NAMES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"create_by|update_by|is_deleted|version|tenant_id").expect("valid audit pattern")
});
static STATUS_NAMES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"status|state|phase|stage|flag").expect("valid status pattern"));

/// What the rule predicates are allowed to look at
#[derive(Debug, Clone)]
pub struct FieldFacts {
    /// Lowercased, trimmed name
    pub name: String,
    pub is_primary_key: bool,
}

impl From<&FieldRecord> for FieldFacts {
    fn from(field: &FieldRecord) -> Self {
        Self {
            name: field.normalized_name(),
            is_primary_key: field.is_primary_key,
        }
    }
}

/// One link of the classification chain
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRule {
    pub id: &'static str,
    pub role: FieldRole,
    pub confidence: f64,
    pub description: &'static str,
    #[serde(skip)]
    pub matches: fn(&FieldFacts) -> bool,
}

fn is_audit(f: &FieldFacts) -> bool {
    let timestamp_like = f.name.ends_with("_time") || f.name.ends_with("_at");
    AUDIT_NAMES.is_match(&f.name)
        || (timestamp_like && (f.name.contains("create") || f.name.contains("update")))
}

fn is_identifier(f: &FieldFacts) -> bool {
    f.is_primary_key || f.name == "id" || f.name.ends_with("_id")
}

fn is_status(f: &FieldFacts) -> bool {
    STATUS_NAMES.is_match(&f.name)
}

fn is_event_hint(f: &FieldFacts) -> bool {
    f.name.ends_with("_time") || f.name.ends_with("_date") || f.name.ends_with("_at")
}

// Unreachable while C-01 claims every `_id` suffix: kept so narrowing C-01
// to the primary-key flag alone makes foreign keys classify without
// reordering the chain.
fn is_foreign_key(f: &FieldFacts) -> bool {
    f.name.ends_with("_id") && !f.is_primary_key
}

fn always(_: &FieldFacts) -> bool {
    true
}

/// Chain order is part of the contract: Audit must precede Identifier so
/// `tenant_id` and `*_create_time` land in Audit.
static RULES: Lazy<Vec<ClassificationRule>> = Lazy::new(|| {
    vec![
        ClassificationRule {
            id: "C-03",
            role: FieldRole::Audit,
            confidence: MATCHED_RULE_CONFIDENCE,
            description: "create_by/update_by/is_deleted/version/tenant_id, or a create/update timestamp",
            matches: is_audit,
        },
        ClassificationRule {
            id: "C-01",
            role: FieldRole::Identifier,
            confidence: MATCHED_RULE_CONFIDENCE,
            description: "Flagged primary key, named 'id', or ends with '_id'",
            matches: is_identifier,
        },
        ClassificationRule {
            id: "C-04",
            role: FieldRole::Status,
            confidence: MATCHED_RULE_CONFIDENCE,
            description: "Name mentions status/state/phase/stage/flag",
            matches: is_status,
        },
        ClassificationRule {
            id: "C-05",
            role: FieldRole::EventHint,
            confidence: MATCHED_RULE_CONFIDENCE,
            description: "Ends with _time, _date or _at",
            matches: is_event_hint,
        },
        ClassificationRule {
            id: "C-02",
            role: FieldRole::ForeignKey,
            confidence: MATCHED_RULE_CONFIDENCE,
            description: "Ends with '_id' and is not the primary key",
            matches: is_foreign_key,
        },
        ClassificationRule {
            id: FALLBACK_RULE_ID,
            role: FieldRole::BusinessAttribute,
            confidence: FALLBACK_CONFIDENCE,
            description: "Fallback for anything no other rule claims",
            matches: always,
        },
    ]
});

/// Stateless role classifier over the static rule chain
pub struct RoleClassifier;

impl RoleClassifier {
    /// Ordered rule catalog
    pub fn rules() -> &'static [ClassificationRule] {
        &RULES
    }

    pub fn classify(field: &FieldRecord) -> FieldSemanticProfile {
        let facts = FieldFacts::from(field);
        let sensitivity_tier = sensitivity_of(&facts.name);
        let rule = Self::first_match(&facts);
        debug!(
            "Field '{}' -> {:?} via {} (sensitivity {:?})",
            field.name, rule.role, rule.id, sensitivity_tier
        );

        FieldSemanticProfile {
            field_name: field.name.clone(),
            data_type: field.data_type.clone(),
            role: rule.role,
            role_confidence: rule.confidence,
            sensitivity_tier,
            rule_hit_id: rule.id.to_string(),
            suggestion: None,
            risk_flags: Vec::new(),
        }
    }

    pub fn classify_all(fields: &[FieldRecord]) -> Vec<FieldSemanticProfile> {
        fields.iter().map(Self::classify).collect()
    }

    fn first_match(facts: &FieldFacts) -> &'static ClassificationRule {
        let rules = Self::rules();
        rules
            .iter()
            .find(|rule| (rule.matches)(facts))
            // The chain ends in an always-true rule
            .unwrap_or(&rules[rules.len() - 1])
    }
}

/// Most specific tier wins
pub fn sensitivity_of(normalized_name: &str) -> SensitivityTier {
    if SENSITIVE_L4.is_match(normalized_name) {
        SensitivityTier::L4
    } else if SENSITIVE_L3.is_match(normalized_name) {
        SensitivityTier::L3
    } else if SENSITIVE_L2.is_match(normalized_name) {
        SensitivityTier::L2
    } else {
        SensitivityTier::L1
    }
}
