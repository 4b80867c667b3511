//! Table Rule Scorer
//!
//! Structural quality score computed from naming, behavior-field density and
//! comment presence. Independent of any estimator output.

use crate::semantic::types::{FieldRecord, TableRuleScore};
use once_cell::sync::Lazy;
use regex::Regex;

const NAMING_WEIGHT: f64 = 0.3;
const BEHAVIOR_WEIGHT: f64 = 0.3;
const COMMENT_WEIGHT: f64 = 0.4;

const NAMING_SCORE: f64 = 0.8;
const ENTITY_BEHAVIOR_SCORE: f64 = 0.9;
const EVENT_BEHAVIOR_SCORE: f64 = 0.4;
const BEHAVIOR_RATIO_THRESHOLD: f64 = 0.4;
const COMMENT_PRESENT_SCORE: f64 = 1.0;
const COMMENT_MISSING_SCORE: f64 = 0.5;

static BEHAVIOR_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time|date|operator|action").expect("valid behavior pattern"));

pub struct RuleScorer;

impl RuleScorer {
    /// Score a table. Evidence is emitted in evaluation order: naming, behavior, comment.
    pub fn score(
        table_name: &str,
        fields: &[FieldRecord],
        comment: Option<&str>,
    ) -> (TableRuleScore, Vec<String>) {
        let mut evidence = Vec::with_capacity(3);

        let name_len = table_name.chars().count();
        let naming_score = if name_len > 3 {
            evidence.push(format!("Table name '{}' is descriptive ({} chars)", table_name, name_len));
            NAMING_SCORE
        } else {
            evidence.push(format!("Table name '{}' is too short to be descriptive", table_name));
            0.0
        };

        let behavior_count = fields
            .iter()
            .filter(|f| BEHAVIOR_FIELD.is_match(&f.normalized_name()))
            .count();
        let behavior_ratio = if fields.is_empty() {
            0.0
        } else {
            behavior_count as f64 / fields.len() as f64
        };
        let behavior_score = if behavior_ratio < BEHAVIOR_RATIO_THRESHOLD {
            evidence.push(format!(
                "Behavior fields {}/{} ({:.0}%), entity-like table",
                behavior_count,
                fields.len(),
                behavior_ratio * 100.0
            ));
            ENTITY_BEHAVIOR_SCORE
        } else {
            evidence.push(format!(
                "Behavior fields {}/{} ({:.0}%), event/behavior-like table",
                behavior_count,
                fields.len(),
                behavior_ratio * 100.0
            ));
            EVENT_BEHAVIOR_SCORE
        };

        let comment = comment.filter(|c| !c.is_empty());
        let comment_score = match comment {
            Some(c) if c.chars().count() > 2 => {
                evidence.push(format!("Table comment present: \"{}\"", c.trim()));
                COMMENT_PRESENT_SCORE
            }
            _ => {
                evidence.push("Table comment missing or too short".to_string());
                COMMENT_MISSING_SCORE
            }
        };

        let total = NAMING_WEIGHT * naming_score
            + BEHAVIOR_WEIGHT * behavior_score
            + COMMENT_WEIGHT * comment_score;

        (
            TableRuleScore {
                naming_score,
                behavior_score,
                comment_score,
                total: total.clamp(0.0, 1.0),
            },
            evidence,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALLOWED: [f64; 6] = [0.0, 0.4, 0.5, 0.8, 0.9, 1.0];

    #[test]
    fn test_lengths_are_measured_on_raw_text() {
        let (score, _) = RuleScorer::score("abc", &[], Some("ab"));
        assert_eq!(score.naming_score, 0.0);
        assert_eq!(score.comment_score, 0.5);

        let (score, _) = RuleScorer::score("abcd", &[], Some("abc"));
        assert_eq!(score.naming_score, 0.8);
        assert_eq!(score.comment_score, 1.0);

        let (score, _) = RuleScorer::score(" abc", &[], Some(""));
        assert_eq!(score.naming_score, 0.8);
        assert_eq!(score.comment_score, 0.5);
    }

    #[test]
    fn test_entity_table_with_comment() {
        let fields = vec![
            FieldRecord::new("id", "bigint"),
            FieldRecord::new("name", "varchar"),
            FieldRecord::new("create_time", "datetime"),
        ];

        let (score, evidence) = RuleScorer::score("user_profile", &fields, Some("User profiles"));

        assert_eq!(score.naming_score, 0.8);
        assert_eq!(score.behavior_score, 0.9);
        assert_eq!(score.comment_score, 1.0);
        assert!((score.total - 0.91).abs() < 1e-9);
        assert_eq!(evidence.len(), 3);
        assert!(evidence[0].starts_with("Table name"));
        assert!(evidence[1].starts_with("Behavior fields 1/3"));
        assert!(evidence[2].starts_with("Table comment present"));
    }

    #[test]
    fn test_behavior_heavy_short_name_no_comment() {
        let fields = vec![
            FieldRecord::new("action", "varchar"),
            FieldRecord::new("operator_time", "datetime"),
            FieldRecord::new("log_id", "bigint"),
        ];

        let (score, _) = RuleScorer::score("log", &fields, Some("ab"));

        assert_eq!(score.naming_score, 0.0);
        assert_eq!(score.behavior_score, 0.4);
        assert_eq!(score.comment_score, 0.5);
        assert!((score.total - 0.32).abs() < 1e-9);
    }

    #[test]
    fn test_zero_fields_count_as_entity_like() {
        let (score, evidence) = RuleScorer::score("orders", &[], None);
        assert_eq!(score.behavior_score, 0.9);
        assert!(evidence[1].contains("0/0"));
    }

    proptest! {
        #[test]
        fn prop_scores_stay_in_discrete_set(
            table in ".{0,12}",
            names in proptest::collection::vec("[a-z_]{1,12}", 0..8),
            comment in proptest::option::of(".{0,8}"),
        ) {
            let fields: Vec<FieldRecord> = names.iter().map(|n| FieldRecord::new(n.as_str(), "int")).collect();
            let (score, evidence) = RuleScorer::score(&table, &fields, comment.as_deref());

            prop_assert!(ALLOWED.contains(&score.naming_score));
            prop_assert!(ALLOWED.contains(&score.behavior_score));
            prop_assert!(ALLOWED.contains(&score.comment_score));
            prop_assert!((0.0..=1.0).contains(&score.total));
            prop_assert_eq!(evidence.len(), 3);
        }
    }
}
