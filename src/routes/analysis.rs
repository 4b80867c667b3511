//! Analysis API Routes
//!
//! Full single-table analysis plus the gate and classification stages on
//! their own, the rule catalogs, and analyst overrides.

use crate::error::{validation_error, ApiResult};
use crate::models::{
    ClassifyResponse, OverrideRequest, RulesResponse, SuccessResponse, TableRequest,
};
use crate::semantic::{FieldSemanticProfile, GateVerdict, RoleClassifier, TableSemanticProfile};
use crate::state::SharedState;
use axum::{extract::State, Json};
use tracing::info;
use validator::Validate;

// ==================== Handlers ====================

/// Run the full pipeline for one table
pub async fn analyze_table(
    State(state): State<SharedState>,
    Json(payload): Json<TableRequest>,
) -> ApiResult<Json<SuccessResponse<TableSemanticProfile>>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let profile = state.analyzer.analyze(&payload.to_input()).await?;

    Ok(Json(SuccessResponse::with_data(
        format!("Table '{}' analyzed", profile.table_name),
        profile,
    )))
}

/// Gatekeeper verdict only
pub async fn gate_table(
    State(state): State<SharedState>,
    Json(payload): Json<TableRequest>,
) -> ApiResult<Json<SuccessResponse<GateVerdict>>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let input = payload.to_input();
    let verdict = state.analyzer.gatekeeper().evaluate(&input.table_name, &input.fields);

    Ok(Json(SuccessResponse::with_data(
        format!("Gate result: {:?}", verdict.result),
        verdict,
    )))
}

/// Field role classification only
pub async fn classify_fields(Json(payload): Json<TableRequest>) -> ApiResult<Json<ClassifyResponse>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let input = payload.to_input();
    let fields: Vec<FieldSemanticProfile> = RoleClassifier::classify_all(&input.fields);

    Ok(Json(ClassifyResponse {
        table_name: input.table_name,
        fields,
    }))
}

/// List gate and classification rules
pub async fn list_rules(State(state): State<SharedState>) -> Json<RulesResponse> {
    Json(RulesResponse {
        gate_rules: state.analyzer.gatekeeper().rules().to_vec(),
        classification_rules: RoleClassifier::rules().to_vec(),
    })
}

/// Replace the estimator score of a profile and re-fuse
pub async fn override_ai_score(
    Json(payload): Json<OverrideRequest>,
) -> ApiResult<Json<SuccessResponse<TableSemanticProfile>>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let updated = payload.profile.with_ai_override(
        payload.ai_score,
        payload.analyst.clone(),
        payload.note.clone(),
    )?;

    info!(
        "✏️  {} overrode estimator score for '{}': {:.2} -> {:.2}",
        payload.analyst, updated.table_name, payload.profile.ai_score, updated.ai_score
    );

    Ok(Json(SuccessResponse::with_data(
        format!("Final score is now {:.2}", updated.final_score),
        updated,
    )))
}
