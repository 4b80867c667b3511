//! Profiling API Routes
//!
//! Load, read and invalidate cached profiling signals per table.

use crate::error::{not_found_error, ApiResult};
use crate::models::{MessageResponse, SuccessResponse};
use crate::profiling::TableSignals;
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

pub async fn put_signals(
    State(state): State<SharedState>,
    Path(table): Path<String>,
    Json(signals): Json<TableSignals>,
) -> ApiResult<Json<MessageResponse>> {
    signals.validate(&table)?;

    let count = signals.fields.len();
    state.profiling.insert(signals).await;
    info!("📥 Stored profiling signals for '{}' ({} fields)", table, count);

    Ok(Json(MessageResponse::new(format!(
        "Stored signals for {} fields of '{}'",
        count, table
    ))))
}

pub async fn get_signals(
    State(state): State<SharedState>,
    Path(table): Path<String>,
) -> ApiResult<Json<SuccessResponse<TableSignals>>> {
    let signals = state
        .profiling
        .get(&table)
        .await
        .ok_or_else(|| not_found_error(format!("No profiling signals for '{}'", table)))?;

    Ok(Json(SuccessResponse::with_data("Profiling signals", signals)))
}

pub async fn invalidate_signals(
    State(state): State<SharedState>,
    Path(table): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if state.profiling.invalidate(&table).await {
        Ok(Json(MessageResponse::new(format!(
            "Profiling signals for '{}' invalidated",
            table
        ))))
    } else {
        Err(not_found_error(format!("No profiling signals for '{}'", table)))
    }
}
