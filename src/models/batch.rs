//! Batch-related models and DTOs

use crate::models::TableRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartBatchRequest {
    #[validate(length(min = 1, max = 1000, message = "Between 1 and 1000 tables per batch"))]
    #[validate(nested)]
    pub tables: Vec<TableRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStartedResponse {
    pub batch_id: Uuid,
    pub total: usize,
    pub concurrency: usize,
}
