//! Table analysis
//!
//! One call per table: normalize, gate, classify, score, ask the estimator,
//! fuse, aggregate. The estimator call is the only suspension point and the
//! only thing that can fail.

use crate::estimator::{EstimateRequest, EstimatorError, SemanticEstimate, SemanticEstimator};
use crate::profiling::{derive_risk_flags, ProfilingCache};
use crate::semantic::classifier::RoleClassifier;
use crate::semantic::fusion;
use crate::semantic::gatekeeper::Gatekeeper;
use crate::semantic::normalizer::normalize_fields;
use crate::semantic::rule_scorer::RuleScorer;
use crate::semantic::statistics::{aggregate, review_statistics, AggregationContext};
use crate::semantic::types::*;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_ESTIMATOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the analyzer needs to know about one table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInput {
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
}

impl TableInput {
    pub fn new(table_name: impl Into<String>, fields: Vec<FieldRecord>) -> Self {
        Self {
            table_name: table_name.into(),
            comment: None,
            fields,
        }
    }

    /// Build from raw, alias-laden field objects
    pub fn from_raw(
        table_name: impl Into<String>,
        comment: Option<String>,
        raw_fields: &[serde_json::Value],
    ) -> Self {
        let table_name = table_name.into();
        let fields = normalize_fields(&table_name, raw_fields);
        Self {
            table_name,
            comment,
            fields,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverrideError {
    #[error("Override score must be a number within [0, 1], got {0}")]
    ScoreOutOfRange(f64),
}

/// Produces [`TableSemanticProfile`]s
pub struct SemanticAnalyzer {
    gatekeeper: Gatekeeper,
    estimator: Arc<dyn SemanticEstimator>,
    profiling: Option<ProfilingCache>,
    estimator_timeout: Duration,
}

impl SemanticAnalyzer {
    pub fn new(estimator: Arc<dyn SemanticEstimator>) -> Self {
        Self {
            gatekeeper: Gatekeeper::new(),
            estimator,
            profiling: None,
            estimator_timeout: DEFAULT_ESTIMATOR_TIMEOUT,
        }
    }

    pub fn with_profiling(mut self, cache: ProfilingCache) -> Self {
        self.profiling = Some(cache);
        self
    }

    pub fn with_estimator_timeout(mut self, timeout: Duration) -> Self {
        self.estimator_timeout = timeout;
        self
    }

    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gatekeeper
    }

    pub fn estimator_name(&self) -> &str {
        self.estimator.name()
    }

    /// Run the full analysis for one table
    pub async fn analyze(&self, input: &TableInput) -> Result<TableSemanticProfile, EstimatorError> {
        let table_name = input.table_name.as_str();
        let fields = &input.fields;

        let gate = self.gatekeeper.evaluate(table_name, fields);
        let mut field_profiles = RoleClassifier::classify_all(fields);
        let (rule_score, rule_evidence) =
            RuleScorer::score(table_name, fields, input.comment.as_deref());

        let estimate = self.estimate(input).await?;

        attach_suggestions(&mut field_profiles, &estimate);
        self.attach_risk_flags(table_name, &mut field_profiles).await;

        let field_score = fusion::field_score(&field_profiles);
        let (final_score, score_breakdown) = fusion::fuse(&rule_score, field_score, estimate.ai_score);

        let context = AggregationContext::from_profiles(Some(gate.details), &field_profiles);
        let metrics = aggregate(fields, Some(&context));
        let review = review_statistics(&field_profiles, &gate, &metrics);

        info!(
            "📊 Analyzed '{}': gate={:?}, rule={:.2}, field={:.2}, ai={:.2}, final={:.2}",
            table_name, gate.result, rule_score.total, field_score, estimate.ai_score, final_score
        );

        Ok(TableSemanticProfile {
            table_name: input.table_name.clone(),
            comment: input.comment.clone(),
            gate,
            rule_score,
            rule_evidence,
            fields: field_profiles,
            field_score,
            ai_score: estimate.ai_score,
            ai_evidence: estimate.evidence,
            business_name: estimate.business_name,
            description: estimate.description,
            tags: estimate.tags,
            final_score,
            score_breakdown,
            metrics,
            review,
            ai_override: None,
            analyzed_at: Utc::now(),
        })
    }

    async fn estimate(&self, input: &TableInput) -> Result<SemanticEstimate, EstimatorError> {
        let request = EstimateRequest {
            table_name: input.table_name.clone(),
            fields: input.fields.clone(),
            comment: input.comment.clone(),
        };

        let outcome = tokio::time::timeout(self.estimator_timeout, self.estimator.estimate(&request)).await;
        let result = match outcome {
            Ok(result) => result.and_then(SemanticEstimate::validated),
            Err(_) => Err(EstimatorError::Timeout(self.estimator_timeout.as_millis() as u64)),
        };

        if let Err(e) = &result {
            warn!(
                "⚠️  Estimator '{}' failed for '{}': {}",
                self.estimator.name(),
                input.table_name,
                e
            );
        }
        result
    }

    async fn attach_risk_flags(&self, table_name: &str, profiles: &mut [FieldSemanticProfile]) {
        let signals = match &self.profiling {
            Some(cache) => cache.get(table_name).await,
            None => None,
        };

        for profile in profiles.iter_mut() {
            let field_signals = signals.as_ref().and_then(|s| s.field(&profile.field_name));
            profile.risk_flags = derive_risk_flags(
                field_signals,
                &profile.data_type,
                profile.role,
                profile.sensitivity_tier,
            );
        }
    }
}

fn attach_suggestions(profiles: &mut [FieldSemanticProfile], estimate: &SemanticEstimate) {
    for profile in profiles.iter_mut() {
        profile.suggestion = estimate
            .field_suggestions
            .iter()
            .find(|s| s.field_name.trim().eq_ignore_ascii_case(profile.field_name.trim()))
            .cloned();
    }
}

impl TableSemanticProfile {
    /// Copy of this profile with the estimator score replaced by an analyst's
    /// and the fused score recomputed. `self` is left untouched.
    pub fn with_ai_override(
        &self,
        ai_score: f64,
        analyst: impl Into<String>,
        note: Option<String>,
    ) -> Result<Self, OverrideError> {
        if !ai_score.is_finite() || !(0.0..=1.0).contains(&ai_score) {
            return Err(OverrideError::ScoreOutOfRange(ai_score));
        }

        let analyst = analyst.into();
        let mut next = self.clone();
        let (final_score, score_breakdown) = fusion::fuse(&self.rule_score, self.field_score, ai_score);

        next.ai_evidence.push(format!(
            "Analyst {} overrode estimator score {:.2} -> {:.2}",
            analyst, self.ai_score, ai_score
        ));
        next.ai_override = Some(AiOverride {
            previous_score: self.ai_override.as_ref().map_or(self.ai_score, |o| o.previous_score),
            analyst,
            note,
            overridden_at: Utc::now(),
        });
        next.ai_score = ai_score;
        next.final_score = final_score;
        next.score_breakdown = score_breakdown;

        Ok(next)
    }
}
