//! Semantic Estimator boundary
//!
//! The estimator supplies the "AI" side of the fused score: a confidence
//! for the table as a whole plus narrative evidence and per-field business
//! suggestions. It may be an LLM, an analyst, or the rule-based stand-in in
//! [`rule_based`]. The engine only ever talks to the trait.

pub mod rule_based;

pub use rule_based::RuleBasedEstimator;

use crate::semantic::types::{FieldRecord, FieldSuggestion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    #[error("Estimator timed out after {0} ms")]
    Timeout(u64),

    #[error("Estimator unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed estimator response: {0}")]
    MalformedResponse(String),
}

/// Input handed to the estimator for one table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub table_name: String,
    pub fields: Vec<FieldRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticEstimate {
    pub ai_score: f64,
    pub business_name: String,
    pub description: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub field_suggestions: Vec<FieldSuggestion>,
}

impl SemanticEstimate {
    /// Reject non-finite scores and clamp the rest into [0, 1]
    pub fn validated(mut self) -> Result<Self, EstimatorError> {
        if !self.ai_score.is_finite() {
            return Err(EstimatorError::MalformedResponse(format!(
                "aiScore is not a finite number ({})",
                self.ai_score
            )));
        }
        self.ai_score = self.ai_score.clamp(0.0, 1.0);
        Ok(self)
    }
}

/// Capability interface for anything that can estimate table semantics
#[async_trait]
pub trait SemanticEstimator: Send + Sync {
    /// Short identifier used in logs and evidence
    fn name(&self) -> &str;

    async fn estimate(&self, request: &EstimateRequest) -> Result<SemanticEstimate, EstimatorError>;
}
