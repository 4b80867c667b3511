//! Batch analysis
//!
//! Fans a list of tables out over a bounded worker pool. Each table is
//! analyzed independently: a failed or timed-out estimator call marks that
//! table only, and cancellation stops tables that have not started yet while
//! keeping everything already finished.

pub mod runner;
pub mod store;

pub use runner::{BatchControl, BatchHandle, BatchRunner};
pub use store::{BatchStore, BatchSummary};

use crate::semantic::types::TableSemanticProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchState {
    Running,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Success,
    Error,
    Cancelled,
}

/// Result for one table of a batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOutcome {
    /// Position of the table in the submitted list
    pub index: usize,
    pub table_name: String,
    pub status: TableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<TableSemanticProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableOutcome {
    pub fn success(index: usize, profile: TableSemanticProfile) -> Self {
        Self {
            index,
            table_name: profile.table_name.clone(),
            status: TableStatus::Success,
            profile: Some(profile),
            error: None,
        }
    }

    pub fn error(index: usize, table_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            index,
            table_name: table_name.into(),
            status: TableStatus::Error,
            profile: None,
            error: Some(error.into()),
        }
    }

    pub fn cancelled(index: usize, table_name: impl Into<String>) -> Self {
        Self {
            index,
            table_name: table_name.into(),
            status: TableStatus::Cancelled,
            profile: None,
            error: None,
        }
    }
}

/// Point-in-time view of a batch, published on every change
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSnapshot {
    pub batch_id: Uuid,
    pub state: BatchState,
    pub total: usize,
    /// Tables whose analysis finished, successfully or not
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Most recently started table while the batch is running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_table: Option<String>,
    pub outcomes: Vec<TableOutcome>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchSnapshot {
    pub fn new(batch_id: Uuid, total: usize) -> Self {
        Self {
            batch_id,
            state: BatchState::Running,
            total,
            completed: 0,
            failed: 0,
            cancelled: 0,
            current_table: None,
            outcomes: Vec::with_capacity(total),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.completed - self.failed
    }

    pub fn is_finished(&self) -> bool {
        self.state != BatchState::Running
    }

    /// Record one finished table and update the counters
    pub fn record(&mut self, outcome: TableOutcome) {
        match outcome.status {
            TableStatus::Success => self.completed += 1,
            TableStatus::Error => {
                self.completed += 1;
                self.failed += 1;
            }
            TableStatus::Cancelled => self.cancelled += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Profiles of every successfully analyzed table, in submission order
    pub fn profiles(&self) -> Vec<&TableSemanticProfile> {
        let mut outcomes: Vec<&TableOutcome> = self.outcomes.iter().collect();
        outcomes.sort_by_key(|o| o.index);
        outcomes.into_iter().filter_map(|o| o.profile.as_ref()).collect()
    }
}
