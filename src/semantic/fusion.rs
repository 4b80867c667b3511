//! Score Fusion
//!
//! Blends the structural rule score, the mean field-role confidence and the
//! estimator score into one final score.
//!
//! `final = round2(0.55 * ai + 0.45 * (rule + field) / 2)`
//!
//! The breakdown is a separate, normalized view (0.225 / 0.225 / 0.55 of the
//! raw components) for display. It is never fed back into `final`, so the
//! two can differ slightly.

use crate::semantic::types::{FieldSemanticProfile, ScoreBreakdown, TableRuleScore};

pub const AI_WEIGHT: f64 = 0.55;
pub const RULE_SIDE_WEIGHT: f64 = 0.45;
pub const RULE_BREAKDOWN_WEIGHT: f64 = 0.225;
pub const FIELD_BREAKDOWN_WEIGHT: f64 = 0.225;

/// Confidence assumed for a table without any field profiles
pub const DEFAULT_FIELD_CONFIDENCE: f64 = 0.5;

/// Arithmetic mean of role confidences
pub fn field_score(fields: &[FieldSemanticProfile]) -> f64 {
    if fields.is_empty() {
        return DEFAULT_FIELD_CONFIDENCE;
    }

    let sum: f64 = fields
        .iter()
        .map(|f| {
            if f.role_confidence.is_finite() {
                f.role_confidence
            } else {
                DEFAULT_FIELD_CONFIDENCE
            }
        })
        .sum();
    sum / fields.len() as f64
}

pub fn fuse(rule: &TableRuleScore, field_score: f64, ai_score: f64) -> (f64, ScoreBreakdown) {
    let rule_side = (rule.total + field_score) / 2.0;
    let final_score = round2(AI_WEIGHT * ai_score + RULE_SIDE_WEIGHT * rule_side);

    (final_score, breakdown(rule.total, field_score, ai_score))
}

fn breakdown(rule: f64, field: f64, ai: f64) -> ScoreBreakdown {
    let rule_part = RULE_BREAKDOWN_WEIGHT * rule;
    let field_part = FIELD_BREAKDOWN_WEIGHT * field;
    let ai_part = AI_WEIGHT * ai;
    let sum = rule_part + field_part + ai_part;

    // With nothing to attribute, report the configured weights
    if sum <= 0.0 || !sum.is_finite() {
        return ScoreBreakdown {
            rule: RULE_BREAKDOWN_WEIGHT,
            field: FIELD_BREAKDOWN_WEIGHT,
            ai: AI_WEIGHT,
        };
    }

    ScoreBreakdown {
        rule: rule_part / sum,
        field: field_part / sum,
        ai: ai_part / sum,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::types::{FieldRole, SensitivityTier};
    use proptest::prelude::*;

    fn rule(total: f64) -> TableRuleScore {
        TableRuleScore {
            naming_score: 0.8,
            behavior_score: 0.9,
            comment_score: 1.0,
            total,
        }
    }

    fn profile(confidence: f64) -> FieldSemanticProfile {
        FieldSemanticProfile {
            field_name: "f".to_string(),
            data_type: "int".to_string(),
            role: FieldRole::BusinessAttribute,
            role_confidence: confidence,
            sensitivity_tier: SensitivityTier::L1,
            rule_hit_id: "C-06".to_string(),
            suggestion: None,
            risk_flags: Vec::new(),
        }
    }

    #[test]
    fn test_field_score_is_mean() {
        let fields = vec![profile(0.9), profile(0.6), profile(0.9)];
        assert!((field_score(&fields) - 0.8).abs() < 1e-9);
        assert_eq!(field_score(&[]), DEFAULT_FIELD_CONFIDENCE);
        assert!((field_score(&[profile(f64::NAN), profile(0.9)]) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_final_score_formula() {
        // 0.55 * 0.8 + 0.45 * (0.91 + 0.8) / 2 = 0.82475
        let (final_score, _) = fuse(&rule(0.91), 0.8, 0.8);
        assert_eq!(final_score, 0.82);
    }

    #[test]
    fn test_all_zero_breakdown_still_sums_to_one() {
        let (final_score, parts) = fuse(&rule(0.0), 0.0, 0.0);
        assert_eq!(final_score, 0.0);
        assert!((parts.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_is_diagnostic_not_identical() {
        let (final_score, parts) = fuse(&rule(0.91), 0.8, 0.3);

        // Re-weighting raw components by the breakdown does not reproduce final
        let replayed = parts.rule * 0.91 + parts.field * 0.8 + parts.ai * 0.3;
        assert!((replayed - final_score).abs() > 1e-6);

        // Ranking agrees: a higher estimator score raises both views
        let (higher_final, higher_parts) = fuse(&rule(0.91), 0.8, 0.9);
        assert!(higher_final > final_score);
        assert!(higher_parts.ai > parts.ai);
        assert!(parts.ai > 0.0 && parts.rule > 0.0 && parts.field > 0.0);
    }

    proptest! {
        #[test]
        fn prop_breakdown_sums_to_one(
            total in 0.0f64..=1.0,
            field in 0.0f64..=1.0,
            ai in 0.0f64..=1.0,
        ) {
            let (final_score, parts) = fuse(&rule(total), field, ai);
            prop_assert!((parts.sum() - 1.0).abs() < 1e-9);
            prop_assert!((0.0..=1.0).contains(&final_score));
        }
    }
}
