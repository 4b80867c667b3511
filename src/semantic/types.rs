//! Shared types for the semantic engine
//!
//! Field and enum names here are the contract surface consumed by the UI,
//! the audit log and the batch pipeline. They serialize in camelCase.

use crate::profiling::RiskFlag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// FIELDS
// =============================================================================

/// A field record after normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    /// Display name, case preserved
    pub name: String,
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_primary_key: bool,
}

impl FieldRecord {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            comment: None,
            is_primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Lowercased, trimmed name used by every matching rule
    pub fn normalized_name(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// Semantic role of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldRole {
    Identifier,
    ForeignKey,
    BusinessAttribute,
    Status,
    EventHint,
    Audit,
}

impl FieldRole {
    pub fn label(&self) -> &'static str {
        match self {
            FieldRole::Identifier => "Identifier",
            FieldRole::ForeignKey => "ForeignKey",
            FieldRole::BusinessAttribute => "BusinessAttribute",
            FieldRole::Status => "Status",
            FieldRole::EventHint => "EventHint",
            FieldRole::Audit => "Audit",
        }
    }
}

/// Sensitivity tiers, L4 being the most sensitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensitivityTier {
    L1,
    L2,
    L3,
    L4,
}

impl SensitivityTier {
    pub fn is_sensitive(&self) -> bool {
        matches!(self, SensitivityTier::L3 | SensitivityTier::L4)
    }
}

/// Classification result for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSemanticProfile {
    pub field_name: String,
    pub data_type: String,
    pub role: FieldRole,
    pub role_confidence: f64,
    pub sensitivity_tier: SensitivityTier,
    pub rule_hit_id: String,

    // Additive evidence, filled in by the analyzer when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<FieldSuggestion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_flags: Vec<RiskFlag>,
}

/// Business meaning proposed by the estimator for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSuggestion {
    pub field_name: String,
    pub business_term: String,
    pub business_definition: String,
    pub logical_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

// =============================================================================
// GATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateResult {
    Pass,
    Review,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDetails {
    pub has_primary_key: bool,
    pub has_lifecycle_field: bool,
    pub is_eligible_table_type: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemediationPriority {
    High,
    Medium,
    Low,
}

/// A structured action item attached to a failed gate check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
    /// Kind of artifact in `template`, e.g. "sql"
    pub kind: String,
    pub title: String,
    pub description: String,
    pub template: String,
    pub priority: RemediationPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateVerdict {
    pub result: GateResult,
    pub details: GateDetails,
    pub reasons: Vec<String>,
    pub remediations: Vec<Remediation>,
}

// =============================================================================
// SCORES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRuleScore {
    pub naming_score: f64,
    pub behavior_score: f64,
    pub comment_score: f64,
    pub total: f64,
}

/// Normalized share of each signal in the fused score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub rule: f64,
    pub field: f64,
    pub ai: f64,
}

impl ScoreBreakdown {
    pub fn sum(&self) -> f64 {
        self.rule + self.field + self.ai
    }
}

// =============================================================================
// STATISTICS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletenessStatus {
    Complete,
    Incomplete,
}

/// Mutually exclusive bucket counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBuckets {
    pub identifiers: usize,
    pub time_fields: usize,
    pub state_fields: usize,
    pub business_attrs: usize,
}

impl FieldBuckets {
    pub fn total(&self) -> usize {
        self.identifiers + self.time_fields + self.state_fields + self.business_attrs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageDimension {
    pub covered_fields: usize,
    pub total_fields: usize,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessDimension {
    pub status: CompletenessStatus,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskDimension {
    pub count: usize,
    pub sensitive_fields: Vec<String>,
    pub unresolved_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDimensionalMetrics {
    pub total_field_count: usize,
    pub buckets: FieldBuckets,
    pub coverage: CoverageDimension,
    pub completeness: CompletenessDimension,
    pub risk: RiskDimension,
}

/// Routing counters for human review queues; always recomputable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatistics {
    pub pending_review_field_count: usize,
    pub gate_failed_item_count: usize,
    pub risk_item_count: usize,
}

// =============================================================================
// PROFILE
// =============================================================================

/// Record of an analyst replacing the estimator score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiOverride {
    pub previous_score: f64,
    pub analyst: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub overridden_at: DateTime<Utc>,
}

/// The aggregate produced by one analysis call for one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSemanticProfile {
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub gate: GateVerdict,
    pub rule_score: TableRuleScore,
    pub rule_evidence: Vec<String>,
    pub fields: Vec<FieldSemanticProfile>,
    pub field_score: f64,
    pub ai_score: f64,
    pub ai_evidence: Vec<String>,
    pub business_name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub final_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub metrics: ThreeDimensionalMetrics,
    pub review: ReviewStatistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_override: Option<AiOverride>,
    pub analyzed_at: DateTime<Utc>,
}
