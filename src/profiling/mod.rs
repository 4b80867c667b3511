//! Profiling boundary
//!
//! Statistical profiling (null ratios, cardinality, top values) happens in
//! a separate service. This module only models its output, derives risk
//! flags from it, and caches it per table. Signals are additive evidence and
//! never required for a valid profile.

pub mod cache;
pub mod flags;

pub use cache::ProfilingCache;
pub use flags::derive_risk_flags;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfilingError {
    #[error("Field '{field}': {metric} must be within [0, 1], got {value}")]
    RatioOutOfRange {
        field: String,
        metric: &'static str,
        value: f64,
    },

    #[error("Signals are for table '{actual}', expected '{expected}'")]
    TableMismatch { expected: String, actual: String },
}

/// Per-field statistics produced by the profiling service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSignals {
    pub field_name: String,
    pub null_ratio: f64,
    pub distinct_count: u64,
    pub top3_concentration: f64,
    #[serde(default)]
    pub top_values: Vec<String>,
    /// Sampled row count, when the profiler reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

/// Signals for one table, as stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSignals {
    pub table_name: String,
    pub fields: Vec<FieldSignals>,
    #[serde(default = "Utc::now")]
    pub profiled_at: DateTime<Utc>,
}

impl TableSignals {
    pub fn new(table_name: impl Into<String>, fields: Vec<FieldSignals>) -> Self {
        Self {
            table_name: table_name.into(),
            fields,
            profiled_at: Utc::now(),
        }
    }

    /// Check ratios and that the signals belong to `expected_table`
    pub fn validate(&self, expected_table: &str) -> Result<(), ProfilingError> {
        if !self.table_name.trim().eq_ignore_ascii_case(expected_table.trim()) {
            return Err(ProfilingError::TableMismatch {
                expected: expected_table.to_string(),
                actual: self.table_name.clone(),
            });
        }

        for field in &self.fields {
            for (metric, value) in [
                ("nullRatio", field.null_ratio),
                ("top3Concentration", field.top3_concentration),
            ] {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(ProfilingError::RatioOutOfRange {
                        field: field.field_name.clone(),
                        metric,
                        value,
                    });
                }
            }
        }
        Ok(())
    }

    /// Case-insensitive lookup by field name
    pub fn field(&self, name: &str) -> Option<&FieldSignals> {
        let wanted = name.trim();
        self.fields
            .iter()
            .find(|f| f.field_name.trim().eq_ignore_ascii_case(wanted))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskFlag {
    HighNull,
    LowUniqueness,
    EnumNotStable,
    DirtyType,
    #[serde(rename = "SENSITIVE_L3")]
    SensitiveL3,
    #[serde(rename = "SENSITIVE_L4")]
    SensitiveL4,
}
