//! Gatekeeper
//!
//! Decides whether a table is eligible for governance at all.
//! Hard rules reject, soft rules route the table to human review.
//!
//! - T-02: the table must expose a primary key
//! - T-03: the table must carry a lifecycle (audit timestamp) field
//! - T-04: temporary/backup/relation tables are rejected, log-like tables are graylisted

use crate::semantic::types::{
    FieldRecord, GateDetails, GateResult, GateVerdict, Remediation, RemediationPriority,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static HARD_REJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tmp|temp|bak|_rel$").expect("valid hard-reject pattern"));

static GRAYLIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"log|trace|history|detail$").expect("valid graylist pattern"));

static LIFECYCLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"create_time|update_time|created_at|updated_at|valid_from")
        .expect("valid lifecycle pattern")
});

/// Catalog entry describing one gate rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateRule {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Verdict the rule forces when it fails
    pub on_failure: GateResult,
}

/// Applies T-02, T-03 and T-04 to a table
pub struct Gatekeeper {
    rules: Vec<GateRule>,
}

impl Gatekeeper {
    pub fn new() -> Self {
        Self {
            rules: Self::default_rules(),
        }
    }

    pub fn rules(&self) -> &[GateRule] {
        &self.rules
    }

    /// Evaluate every rule and derive the verdict.
    ///
    /// All checks always run so the reasons list is complete; the verdict
    /// precedence is REJECT > REVIEW > PASS.
    pub fn evaluate(&self, table_name: &str, fields: &[FieldRecord]) -> GateVerdict {
        let lowered = table_name.trim().to_lowercase();
        let mut reasons = Vec::new();
        let mut remediations = Vec::new();

        // T-04
        let mut is_eligible_table_type = true;
        if let Some(hit) = HARD_REJECT.find(&lowered) {
            is_eligible_table_type = false;
            reasons.push(format!(
                "T-04: table '{}' matches hard-reject pattern '{}' (temporary, backup or relation table)",
                table_name,
                hit.as_str()
            ));
        }

        let graylisted = match GRAYLIST.find(&lowered) {
            Some(hit) => {
                reasons.push(format!(
                    "T-04: table '{}' matches graylist pattern '{}', manual review required",
                    table_name,
                    hit.as_str()
                ));
                true
            }
            None => false,
        };

        // T-02
        let has_primary_key = fields.iter().any(is_primary_key_candidate);
        if !has_primary_key {
            reasons.push(
                "T-02: no primary key found (no flagged key, no 'id' or '*_id' column)".to_string(),
            );
            remediations.push(Self::primary_key_remediation(table_name));
        }

        // T-03
        let has_lifecycle_field = fields.iter().any(is_lifecycle_field);
        if !has_lifecycle_field {
            reasons.push(
                "T-03: no lifecycle field found (create_time, update_time, created_at, updated_at, valid_from)"
                    .to_string(),
            );
            remediations.push(Self::lifecycle_remediation(table_name));
        }

        let result = if !is_eligible_table_type {
            GateResult::Reject
        } else if graylisted || !has_primary_key || !has_lifecycle_field {
            GateResult::Review
        } else {
            GateResult::Pass
        };

        debug!(
            "Gate for '{}': {:?} (pk={}, lifecycle={}, eligible={}, graylisted={})",
            table_name, result, has_primary_key, has_lifecycle_field, is_eligible_table_type, graylisted
        );

        GateVerdict {
            result,
            details: GateDetails {
                has_primary_key,
                has_lifecycle_field,
                is_eligible_table_type,
            },
            reasons,
            remediations,
        }
    }

    fn primary_key_remediation(table_name: &str) -> Remediation {
        Remediation {
            kind: "sql".to_string(),
            title: "Add a primary key".to_string(),
            description: "Pick one: a surrogate auto-increment key, or a constraint over the existing business key."
                .to_string(),
            template: format!(
                "-- Option A: surrogate key\n\
                 ALTER TABLE {t} ADD COLUMN id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY FIRST;\n\n\
                 -- Option B: business key\n\
                 ALTER TABLE {t} ADD CONSTRAINT pk_{t} PRIMARY KEY (<business_key_columns>);",
                t = table_name
            ),
            priority: RemediationPriority::High,
        }
    }

    fn lifecycle_remediation(table_name: &str) -> Remediation {
        Remediation {
            kind: "sql".to_string(),
            title: "Add audit columns".to_string(),
            description: "Record creation/update time and the acting user on every row.".to_string(),
            template: format!(
                "ALTER TABLE {t}\n  \
                 ADD COLUMN create_time DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,\n  \
                 ADD COLUMN update_time DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,\n  \
                 ADD COLUMN create_user_id BIGINT NULL,\n  \
                 ADD COLUMN update_user_id BIGINT NULL;",
                t = table_name
            ),
            priority: RemediationPriority::Medium,
        }
    }

    fn default_rules() -> Vec<GateRule> {
        vec![
            GateRule {
                id: "T-02".to_string(),
                name: "Primary Key Present".to_string(),
                description: "A field is flagged primary key, is named 'id', or ends with '_id'".to_string(),
                on_failure: GateResult::Review,
            },
            GateRule {
                id: "T-03".to_string(),
                name: "Lifecycle Field Present".to_string(),
                description: "A field tracks row creation, update or validity time".to_string(),
                on_failure: GateResult::Review,
            },
            GateRule {
                id: "T-04".to_string(),
                name: "Eligible Table Type".to_string(),
                description: "Rejects tmp/temp/bak/*_rel tables; graylists log/trace/history/*detail tables"
                    .to_string(),
                on_failure: GateResult::Reject,
            },
        ]
    }
}

impl Default for Gatekeeper {
    fn default() -> Self {
        Self::new()
    }
}

/// T-02 predicate
pub(crate) fn is_primary_key_candidate(field: &FieldRecord) -> bool {
    if field.is_primary_key {
        return true;
    }
    let name = field.normalized_name();
    name == "id" || name.ends_with("_id")
}

/// T-03 predicate
pub(crate) fn is_lifecycle_field(field: &FieldRecord) -> bool {
    LIFECYCLE.is_match(&field.normalized_name())
}
