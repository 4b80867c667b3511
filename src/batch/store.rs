//! Registry of batches started over the API

use crate::batch::{BatchControl, BatchSnapshot, BatchState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Lightweight listing entry (no per-table profiles)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub state: BatchState,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub started_at: DateTime<Utc>,
}

impl From<&BatchSnapshot> for BatchSummary {
    fn from(snapshot: &BatchSnapshot) -> Self {
        Self {
            batch_id: snapshot.batch_id,
            state: snapshot.state,
            total: snapshot.total,
            completed: snapshot.completed,
            failed: snapshot.failed,
            cancelled: snapshot.cancelled,
            started_at: snapshot.started_at,
        }
    }
}

/// Finished batches kept when no retention is configured
pub const DEFAULT_RETENTION: usize = 100;

/// Running batches are always kept. Finished ones are pruned down to the
/// newest `retention` whenever a new batch is registered.
#[derive(Clone)]
pub struct BatchStore {
    batches: Arc<RwLock<HashMap<Uuid, BatchControl>>>,
    retention: usize,
}

impl Default for BatchStore {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }
}

impl BatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: usize) -> Self {
        Self {
            batches: Arc::new(RwLock::new(HashMap::new())),
            retention,
        }
    }

    pub async fn register(&self, control: BatchControl) -> Uuid {
        let id = control.batch_id();
        let mut batches = self.batches.write().await;
        batches.insert(id, control);
        prune_finished(&mut batches, self.retention);
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<BatchSnapshot> {
        let batches = self.batches.read().await;
        batches.get(&id).map(BatchControl::progress)
    }

    /// `None` if the batch is unknown, otherwise whether cancellation took effect
    pub async fn cancel(&self, id: Uuid) -> Option<bool> {
        let batches = self.batches.read().await;
        batches.get(&id).map(BatchControl::cancel)
    }

    /// Drop a finished batch. `None` if unknown, `Some(false)` while still running.
    pub async fn remove(&self, id: Uuid) -> Option<bool> {
        let mut batches = self.batches.write().await;
        let finished = batches.get(&id)?.progress().is_finished();
        if finished {
            batches.remove(&id);
        }
        Some(finished)
    }

    /// Summaries, newest first
    pub async fn list(&self) -> Vec<BatchSummary> {
        let batches = self.batches.read().await;
        let mut summaries: Vec<BatchSummary> = batches
            .values()
            .map(|c| BatchSummary::from(&c.progress()))
            .collect();
        summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        summaries
    }
}

fn prune_finished(batches: &mut HashMap<Uuid, BatchControl>, retention: usize) {
    let mut finished: Vec<(Uuid, DateTime<Utc>)> = batches
        .values()
        .map(BatchControl::progress)
        .filter(|p| p.is_finished())
        .map(|p| (p.batch_id, p.started_at))
        .collect();

    if finished.len() <= retention {
        return;
    }

    // Newest first
    finished.sort_by(|a, b| b.1.cmp(&a.1));
    let to_remove: Vec<Uuid> = finished.into_iter().skip(retention).map(|(id, _)| id).collect();
    for id in &to_remove {
        batches.remove(id);
    }

    tracing::info!("Pruned {} finished batches", to_remove.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchRunner;
    use crate::estimator::fake::{Script, ScriptedEstimator};
    use crate::estimator::RuleBasedEstimator;
    use crate::semantic::{FieldRecord, SemanticAnalyzer, TableInput};

    fn customer() -> TableInput {
        TableInput::new("customer", vec![FieldRecord::new("id", "bigint").primary_key()])
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let analyzer = SemanticAnalyzer::new(Arc::new(RuleBasedEstimator::new()));
        let runner = BatchRunner::new(Arc::new(analyzer), 2);
        let store = BatchStore::new();

        let handle = runner.start(vec![TableInput::new(
            "customer",
            vec![FieldRecord::new("id", "bigint").primary_key()],
        )]);
        let id = store.register(handle.control().clone()).await;
        let final_snapshot = handle.wait().await;

        let stored = store.get(id).await.unwrap();
        assert_eq!(stored.state, final_snapshot.state);
        assert_eq!(stored.completed, 1);
        assert_eq!(store.list().await.len(), 1);

        assert_eq!(store.cancel(id).await, Some(false));
        assert!(store.get(Uuid::new_v4()).await.is_none());
        assert_eq!(store.cancel(Uuid::new_v4()).await, None);
    }

    #[tokio::test]
    async fn test_remove_only_finished_batches() {
        let estimator = Arc::new(
            ScriptedEstimator::new(0.8)
                .with("customer", Script::Delayed(std::time::Duration::from_millis(300), 0.8)),
        );
        let runner = BatchRunner::new(Arc::new(SemanticAnalyzer::new(estimator)), 1);
        let store = BatchStore::new();

        let handle = runner.start(vec![customer()]);
        let id = store.register(handle.control().clone()).await;

        assert_eq!(store.remove(id).await, Some(false));
        assert!(store.get(id).await.is_some());

        handle.wait().await;
        assert_eq!(store.remove(id).await, Some(true));
        assert!(store.get(id).await.is_none());
        assert_eq!(store.remove(id).await, None);
    }

    #[tokio::test]
    async fn test_register_prunes_oldest_finished() {
        let analyzer = SemanticAnalyzer::new(Arc::new(RuleBasedEstimator::new()));
        let runner = BatchRunner::new(Arc::new(analyzer), 1);
        let store = BatchStore::with_retention(2);

        let mut ids = Vec::new();
        for _ in 0..4 {
            let handle = runner.start(vec![customer()]);
            ids.push(store.register(handle.control().clone()).await);
            handle.wait().await;
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        // The fourth registration pruned while it was itself still running
        let kept: Vec<Uuid> = store.list().await.iter().map(|s| s.batch_id).collect();
        assert_eq!(kept, vec![ids[3], ids[2], ids[1]]);

        let handle = runner.start(vec![customer()]);
        let newest = store.register(handle.control().clone()).await;
        handle.wait().await;

        let kept: Vec<Uuid> = store.list().await.iter().map(|s| s.batch_id).collect();
        assert_eq!(kept, vec![newest, ids[3], ids[2]]);
    }
}
