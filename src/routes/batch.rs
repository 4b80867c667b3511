//! Batch API Routes
//!
//! Start a batch in the background, poll its progress, cancel it.

use crate::batch::{BatchSnapshot, BatchSummary};
use crate::error::{not_found_error, validation_error, ApiResult};
use crate::models::{BatchStartedResponse, MessageResponse, StartBatchRequest, SuccessResponse};
use crate::semantic::TableInput;
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

// ==================== Handlers ====================

pub async fn start_batch(
    State(state): State<SharedState>,
    Json(payload): Json<StartBatchRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<BatchStartedResponse>>)> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let tables: Vec<TableInput> = payload.tables.iter().map(|t| t.to_input()).collect();
    let total = tables.len();

    let handle = state.runner.start(tables);
    let batch_id = state.batches.register(handle.into_control()).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(SuccessResponse::with_data(
            format!("Batch started with {} tables", total),
            BatchStartedResponse {
                batch_id,
                total,
                concurrency: state.runner.concurrency(),
            },
        )),
    ))
}

pub async fn list_batches(State(state): State<SharedState>) -> Json<Vec<BatchSummary>> {
    Json(state.batches.list().await)
}

/// Progress and per-table outcomes so far
pub async fn get_batch(
    State(state): State<SharedState>,
    Path(batch_id): Path<Uuid>,
) -> ApiResult<Json<BatchSnapshot>> {
    state
        .batches
        .get(batch_id)
        .await
        .map(Json)
        .ok_or_else(|| not_found_error(format!("Batch {} not found", batch_id)))
}

pub async fn cancel_batch(
    State(state): State<SharedState>,
    Path(batch_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    match state.batches.cancel(batch_id).await {
        Some(true) => Ok(Json(MessageResponse::new(format!(
            "Batch {} will stop before its next table",
            batch_id
        )))),
        Some(false) => Ok(Json(MessageResponse::new(format!(
            "Batch {} already finished",
            batch_id
        )))),
        None => Err(not_found_error(format!("Batch {} not found", batch_id))),
    }
}

/// Forget a finished batch and its results
pub async fn delete_batch(
    State(state): State<SharedState>,
    Path(batch_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    match state.batches.remove(batch_id).await {
        Some(true) => Ok(Json(MessageResponse::new(format!(
            "Batch {} deleted",
            batch_id
        )))),
        Some(false) => Err(validation_error(format!(
            "Batch {} is still running; cancel it first",
            batch_id
        ))),
        None => Err(not_found_error(format!("Batch {} not found", batch_id))),
    }
}
