//! Bounded-concurrency batch runner

use crate::batch::{BatchSnapshot, BatchState, TableOutcome};
use crate::semantic::{SemanticAnalyzer, TableInput};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Runs [`SemanticAnalyzer::analyze`] over many tables with at most
/// `concurrency` estimator calls in flight.
#[derive(Clone)]
pub struct BatchRunner {
    analyzer: Arc<SemanticAnalyzer>,
    concurrency: usize,
}

/// Progress and cancellation for a running batch. Cheap to clone; the
/// background task keeps running when every control is dropped.
#[derive(Clone)]
pub struct BatchControl {
    batch_id: Uuid,
    progress: watch::Receiver<BatchSnapshot>,
    cancel: Arc<watch::Sender<bool>>,
}

impl BatchControl {
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    /// Latest published snapshot
    pub fn progress(&self) -> BatchSnapshot {
        self.progress.borrow().clone()
    }

    /// Receiver that is notified on every progress change
    pub fn subscribe(&self) -> watch::Receiver<BatchSnapshot> {
        self.progress.clone()
    }

    /// Stop the batch before the next table starts. Tables already in
    /// flight run to completion. Returns false if the batch already finished.
    pub fn cancel(&self) -> bool {
        if self.progress.borrow().is_finished() {
            return false;
        }
        self.cancel.send_replace(true);
        info!("🛑 Cancellation requested for batch {}", self.batch_id);
        true
    }
}

/// A started batch: its control plus the task driving it
pub struct BatchHandle {
    control: BatchControl,
    task: JoinHandle<BatchSnapshot>,
}

impl BatchHandle {
    pub fn control(&self) -> &BatchControl {
        &self.control
    }

    pub fn batch_id(&self) -> Uuid {
        self.control.batch_id
    }

    pub fn progress(&self) -> BatchSnapshot {
        self.control.progress()
    }

    pub fn cancel(&self) -> bool {
        self.control.cancel()
    }

    /// Detach the driving task and keep only the control
    pub fn into_control(self) -> BatchControl {
        self.control
    }

    /// Wait for the batch to finish and return the final snapshot
    pub async fn wait(self) -> BatchSnapshot {
        match self.task.await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("⚠️  Batch {} driver task failed: {}", self.control.batch_id, e);
                self.control.progress()
            }
        }
    }
}

impl BatchRunner {
    pub fn new(analyzer: Arc<SemanticAnalyzer>, concurrency: usize) -> Self {
        Self {
            analyzer,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Start analyzing `tables` in the background
    pub fn start(&self, tables: Vec<TableInput>) -> BatchHandle {
        let batch_id = Uuid::new_v4();
        let (progress_tx, progress_rx) = watch::channel(BatchSnapshot::new(batch_id, tables.len()));
        let (cancel_tx, cancel_rx) = watch::channel(false);

        info!(
            "🚀 Starting batch {} with {} tables (concurrency {})",
            batch_id,
            tables.len(),
            self.concurrency
        );

        let task = tokio::spawn(drive(
            self.analyzer.clone(),
            tables,
            self.concurrency,
            Arc::new(progress_tx),
            cancel_rx,
        ));

        BatchHandle {
            control: BatchControl {
                batch_id,
                progress: progress_rx,
                cancel: Arc::new(cancel_tx),
            },
            task,
        }
    }

    /// Analyze `tables` and wait for the final snapshot
    pub async fn run(&self, tables: Vec<TableInput>) -> BatchSnapshot {
        self.start(tables).wait().await
    }
}

async fn drive(
    analyzer: Arc<SemanticAnalyzer>,
    tables: Vec<TableInput>,
    concurrency: usize,
    progress: Arc<watch::Sender<BatchSnapshot>>,
    cancel: watch::Receiver<bool>,
) -> BatchSnapshot {
    let names: Vec<String> = tables.iter().map(|t| t.table_name.clone()).collect();
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut set = JoinSet::new();

    for (index, table) in tables.into_iter().enumerate() {
        let analyzer = analyzer.clone();
        let semaphore = semaphore.clone();
        let progress = progress.clone();
        let cancel = cancel.clone();

        set.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return TableOutcome::cancelled(index, table.table_name);
            };
            if *cancel.borrow() {
                debug!("Skipping '{}' after cancellation", table.table_name);
                return TableOutcome::cancelled(index, table.table_name);
            }

            progress.send_modify(|s| s.current_table = Some(table.table_name.clone()));

            match analyzer.analyze(&table).await {
                Ok(profile) => TableOutcome::success(index, profile),
                Err(e) => TableOutcome::error(index, table.table_name, e.to_string()),
            }
        });
    }

    let mut finished = HashSet::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(outcome) => {
                finished.insert(outcome.index);
                progress.send_modify(|s| s.record(outcome));
            }
            Err(e) => warn!("⚠️  Batch worker task failed: {}", e),
        }
    }

    // Workers that panicked never reported; their tables count as errors
    for (index, name) in names.into_iter().enumerate() {
        if !finished.contains(&index) {
            progress.send_modify(|s| {
                s.record(TableOutcome::error(index, name, "analysis task aborted"))
            });
        }
    }

    let was_cancelled = *cancel.borrow();
    progress.send_modify(|s| {
        s.outcomes.sort_by_key(|o| o.index);
        s.current_table = None;
        s.finished_at = Some(Utc::now());
        s.state = if was_cancelled && s.cancelled > 0 {
            BatchState::Cancelled
        } else {
            BatchState::Completed
        };
    });

    let snapshot = progress.borrow().clone();
    info!(
        "✅ Batch {} finished: {} succeeded, {} failed, {} cancelled",
        snapshot.batch_id,
        snapshot.succeeded(),
        snapshot.failed,
        snapshot.cancelled
    );
    snapshot
}
